//! Mock process spawner.

use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::Child;

use mockall::mock;

use crate::process::ProcessSpawner;

mock! {
    pub Spawner {}

    impl ProcessSpawner for Spawner {
        fn spawn(&self, executable: &Path, arguments: &[OsString]) -> io::Result<Child>;
    }
}
