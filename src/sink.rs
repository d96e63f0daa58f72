//! Output sinks (§5): file, archive, or null. The engine only needs
//! `Write`; callers choose what backs it.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// How the local output file should be opened before a body is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenMode {
    /// Resume: append to an existing file.
    Append,
    /// Overwrite any existing file.
    Truncate,
    /// Fail if the file already exists.
    Exclusive,
}

/// Opens `path` per `mode`, the four sink-opening modes named in §5 (the
/// temp-file `O_CREAT|O_TRUNC` case is just `Truncate` against a
/// caller-chosen temp path).
pub fn open_file_sink(path: &Path, mode: OpenMode) -> io::Result<File> {
    match mode {
        OpenMode::Append => OpenOptions::new().create(true).append(true).open(path),
        OpenMode::Truncate => OpenOptions::new().create(true).write(true).truncate(true).open(path),
        OpenMode::Exclusive => OpenOptions::new().create_new(true).write(true).open(path),
    }
}

/// A sink that discards everything written to it (used for spider mode and
/// existence probes, where the body is never wanted).
#[derive(Debug, Default)]
pub struct NullSink;

impl Write for NullSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
