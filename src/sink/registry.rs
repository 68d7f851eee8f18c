//! Per-host sink registry
//!
//! Lazily creates one rotating sink per host identifier and reuses it for
//! the rest of the process lifetime.

use eyre::{Context, Result};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs;
use std::path::PathBuf;

use super::RotatingSink;

#[derive(Debug)]
pub struct SinkRegistry {
    folder: PathBuf,
    max_bytes: u64,
    backup_count: usize,
    sinks: HashMap<String, RotatingSink>,
}

impl SinkRegistry {
    /// Create a registry rooted at `folder`, creating the folder if needed.
    pub fn new(folder: PathBuf, max_bytes: u64, backup_count: usize) -> Result<Self> {
        fs::create_dir_all(&folder)
            .with_context(|| format!("Failed to create log folder: {}", folder.display()))?;

        Ok(Self {
            folder,
            max_bytes,
            backup_count,
            sinks: HashMap::new(),
        })
    }

    /// Resolve the sink for `host`, opening it on first use. The same host
    /// identifier always maps to the same sink instance.
    pub fn get_or_create(&mut self, host: &str) -> Result<&mut RotatingSink> {
        match self.sinks.entry(host.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let path = self.folder.join(sanitize(host));
                let sink = RotatingSink::open(path, self.max_bytes, self.backup_count)
                    .with_context(|| format!("Failed to open log sink for host: {}", host))?;
                log::debug!("Opened log sink for host: {}", host);
                Ok(entry.insert(sink))
            }
        }
    }

    pub fn flush_all(&mut self) -> Result<()> {
        for (host, sink) in &mut self.sinks {
            sink.flush().with_context(|| format!("Failed to flush sink for host: {}", host))?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

/// Host identifiers become file names; keep them inside the log folder.
fn sanitize(host: &str) -> String {
    host.replace(['/', '\\'], "_")
}
