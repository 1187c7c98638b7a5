//! Follows the managed server's log file and echoes reformatted lines.
//!
//! Server log lines begin with a 28 byte timestamp, a space, a one letter
//! severity and a column of padding. Lines in that shape lose the prefix
//! before they are echoed; every other line passes through unchanged.

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

const TAIL_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::tail");

const SEPARATOR_INDEX: usize = 28;
const SEVERITY_INDEX: usize = 29;
const PREFIX_LEN: usize = 30;
const MIN_LINE_LEN: usize = 31;
const SEVERITIES: &[u8] = b"IWEFD";

/// Bytes held back while waiting for a newline before they are echoed as a
/// line of their own.
pub const MAX_PARTIAL_LINE: usize = 64 * 1024;

/// Returns the byte offset where the message body of a server log line
/// starts, or `None` when the line does not carry the timestamp prefix.
#[must_use]
pub fn message_start(line: &[u8]) -> Option<usize> {
    if line.len() < MIN_LINE_LEN || line.get(SEPARATOR_INDEX) != Some(&b' ') {
        return None;
    }
    if !line
        .get(SEVERITY_INDEX)
        .is_some_and(|severity| SEVERITIES.contains(severity))
    {
        return None;
    }
    let padding = line
        .iter()
        .skip(PREFIX_LEN)
        .take_while(|byte| **byte == b' ')
        .count();
    Some(PREFIX_LEN + padding)
}

/// Strips the timestamp and severity prefix from a server log line.
///
/// Invalid UTF-8 is replaced lossily.
#[must_use]
pub fn reformat_line(line: &[u8]) -> Cow<'_, str> {
    let body = message_start(line)
        .and_then(|start| line.get(start..))
        .unwrap_or(line);
    String::from_utf8_lossy(body)
}

/// Read position within a growing log file.
#[derive(Debug)]
pub struct LogCursor {
    path: PathBuf,
    offset: u64,
    partial: Vec<u8>,
    line_limit: usize,
}

impl LogCursor {
    /// Opens a cursor at the current end of `path`, so only lines written
    /// from now on are reported. A missing file starts at offset zero.
    ///
    /// # Errors
    ///
    /// Returns metadata errors other than `NotFound`.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let offset = match fs::metadata(&path) {
            Ok(metadata) => metadata.len(),
            Err(error) if error.kind() == io::ErrorKind::NotFound => 0,
            Err(error) => return Err(error),
        };
        Ok(Self {
            path,
            offset,
            partial: Vec::new(),
            line_limit: MAX_PARTIAL_LINE,
        })
    }

    /// Opens a cursor at the start of `path`.
    #[must_use]
    pub fn from_start(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            offset: 0,
            partial: Vec::new(),
            line_limit: MAX_PARTIAL_LINE,
        }
    }

    /// Caps the bytes held back for an unterminated line. Zero is treated
    /// as one.
    #[must_use]
    pub fn with_line_limit(mut self, limit: usize) -> Self {
        self.line_limit = limit.max(1);
        self
    }

    /// File being followed.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Offset of the next unread byte.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Reads whatever has been appended since the last poll and returns the
    /// complete lines, reformatted. A trailing partial line is kept for the
    /// next poll unless it has reached the line limit, in which case it is
    /// returned as a line of its own.
    ///
    /// # Errors
    ///
    /// Returns IO errors other than the file being absent.
    pub fn poll(&mut self) -> io::Result<Vec<String>> {
        let length = match fs::metadata(&self.path) {
            Ok(metadata) => metadata.len(),
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(error),
        };
        if length < self.offset {
            debug!(
                target: TAIL_TARGET,
                file = %self.path.display(),
                previous = self.offset,
                length,
                "log file shrank; restarting from the beginning"
            );
            self.offset = 0;
            self.partial.clear();
        }
        if length == self.offset {
            return Ok(Vec::new());
        }

        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(self.offset))?;
        let read = file
            .take(length - self.offset)
            .read_to_end(&mut self.partial)?;
        self.offset += u64::try_from(read).map_err(io::Error::other)?;
        let mut lines = self.take_complete_lines();
        if self.partial.len() >= self.line_limit {
            debug!(
                target: TAIL_TARGET,
                file = %self.path.display(),
                held = self.partial.len(),
                "unterminated line reached the limit; flushing"
            );
            lines.push(reformat_line(&self.partial).into_owned());
            self.partial.clear();
        }
        Ok(lines)
    }

    fn take_complete_lines(&mut self) -> Vec<String> {
        let Some(last_newline) = self.partial.iter().rposition(|byte| *byte == b'\n') else {
            return Vec::new();
        };
        let remainder = self.partial.split_off(last_newline + 1);
        let mut complete = std::mem::replace(&mut self.partial, remainder);
        complete.pop();
        complete
            .split(|byte| *byte == b'\n')
            .map(|line| {
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                reformat_line(line).into_owned()
            })
            .collect()
    }
}

/// Destination for echoed log lines.
pub trait LineSink {
    /// Emits one line.
    ///
    /// # Errors
    ///
    /// Propagates failures from the underlying writer.
    fn emit(&mut self, line: &str) -> io::Result<()>;
}

/// Sink writing one line per call to any [`Write`] implementation.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    /// Wraps `writer`.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the wrapped writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> LineSink for WriterSink<W> {
    fn emit(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.writer, "{line}")?;
        self.writer.flush()
    }
}

/// Polls `cursor` once and forwards every new line to `sink` in order.
/// Returns the number of lines forwarded.
///
/// # Errors
///
/// Returns read errors from the cursor and write errors from the sink.
pub fn pump(cursor: &mut LogCursor, sink: &mut dyn LineSink) -> io::Result<usize> {
    let lines = cursor.poll()?;
    for line in &lines {
        sink.emit(line)?;
    }
    Ok(lines.len())
}
