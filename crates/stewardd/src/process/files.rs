use std::io::{self, Write};
use std::path::Path;

use tempfile::Builder;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Writes the provided bytes to the path using an atomic persist step.
///
/// Data is flushed and fsync'd before the temporary file is renamed into
/// place, so the managed server never reads a half-written configuration.
/// A bare file name is written relative to the working directory.
pub(crate) fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let prefix = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "target path did not name a file",
            )
        })?;

    let mut builder = Builder::new();
    builder.prefix(prefix);
    #[cfg(unix)]
    {
        use std::fs::Permissions;
        builder.permissions(Permissions::from_mode(0o644));
    }

    let mut file = builder.tempfile_in(directory)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|error| error.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    #[rstest]
    fn replaces_existing_contents() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("mongod.conf");
        fs::write(&path, "stale: true\n").expect("seed file");

        atomic_write(&path, b"net:\n  port: 27017\n").expect("write should succeed");

        assert_eq!(
            fs::read_to_string(&path).expect("read back"),
            "net:\n  port: 27017\n"
        );
    }

    #[rstest]
    fn leaves_no_temporary_files_behind() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("mongod.conf");

        atomic_write(&path, b"").expect("write should succeed");

        let entries: Vec<_> = fs::read_dir(dir.path())
            .expect("list dir")
            .filter_map(Result::ok)
            .map(|entry| entry.file_name())
            .collect();
        assert_eq!(entries, [std::ffi::OsString::from("mongod.conf")]);
    }

    #[rstest]
    fn missing_directory_is_an_error() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("absent").join("mongod.conf");
        assert!(atomic_write(&path, b"x").is_err());
    }
}
