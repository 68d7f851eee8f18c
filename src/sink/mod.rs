//! Append-only, size-bounded, rotating text sinks

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub mod registry;

pub use registry::SinkRegistry;

/// One rotating log destination.
///
/// Appends go to `path`; once an incoming write would push a non-empty file
/// past `max_bytes`, existing content shifts through `path.1`, `path.2`, …
/// keeping at most `backup_count` rotated files. `max_bytes == 0` means
/// unbounded, `backup_count == 0` disables rotation.
#[derive(Debug)]
pub struct RotatingSink {
    path: PathBuf,
    max_bytes: u64,
    backup_count: usize,
    file: File,
    written: u64,
}

impl RotatingSink {
    pub fn open(path: PathBuf, max_bytes: u64, backup_count: usize) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            path,
            max_bytes,
            backup_count,
            file,
            written,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one composed line, rolling over first if it would not fit.
    /// The line is never split across files.
    pub fn append(&mut self, text: &str) -> io::Result<()> {
        let incoming = text.len() as u64;
        if self.should_rollover(incoming) {
            self.rollover()?;
        }

        self.file.write_all(text.as_bytes())?;
        self.written += incoming;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }

    fn should_rollover(&self, incoming: u64) -> bool {
        self.max_bytes > 0
            && self.backup_count > 0
            && self.written > 0
            && self.written + incoming > self.max_bytes
    }

    fn rollover(&mut self) -> io::Result<()> {
        self.file.flush()?;

        for index in (1..self.backup_count).rev() {
            let source = backup_path(&self.path, index);
            if source.exists() {
                fs::rename(&source, backup_path(&self.path, index + 1))?;
            }
        }
        fs::rename(&self.path, backup_path(&self.path, 1))?;

        self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

fn backup_path(path: &Path, index: usize) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{}", index));
    PathBuf::from(name)
}
