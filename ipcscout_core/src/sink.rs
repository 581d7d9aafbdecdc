use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from persisting discovered identifiers. Any of these is fatal to
/// the discovery job that hit it.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Sink I/O error: {0}")]
    Io(String),

    #[error("Sink is not open for writing")]
    NotOpen,
}

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        SinkError::Io(err.to_string())
    }
}

/// Append-only destination for accessible identifiers.
pub trait ResultSink: Send {
    /// Discards anything a previous run left behind and prepares for writing.
    fn reset(&mut self) -> Result<(), SinkError>;

    /// Persists one identifier before returning.
    fn append(&mut self, identifier: &str) -> Result<(), SinkError>;

    /// Number of identifiers appended since the last reset.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: ResultSink + ?Sized> ResultSink for Box<S> {
    fn reset(&mut self) -> Result<(), SinkError> {
        (**self).reset()
    }

    fn append(&mut self, identifier: &str) -> Result<(), SinkError> {
        (**self).append(identifier)
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}

/// Keeps identifiers in memory, in append order.
#[derive(Debug, Default, Clone)]
pub struct InMemorySink {
    entries: Vec<String>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl ResultSink for InMemorySink {
    fn reset(&mut self) -> Result<(), SinkError> {
        self.entries.clear();
        Ok(())
    }

    fn append(&mut self, identifier: &str) -> Result<(), SinkError> {
        self.entries.push(identifier.to_string());
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// One UTF-8 text file, one identifier per line.
///
/// Every append goes straight to the file and is flushed, so a crash loses
/// at most the identifier being written.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Option<File>,
    written: usize,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
            written: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for FileSink {
    fn reset(&mut self) -> Result<(), SinkError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                SinkError::Io(format!(
                    "Failed to create output directory {:?}: {}",
                    parent, e
                ))
            })?;
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| {
                SinkError::Io(format!(
                    "Failed to open output file {:?}: {}",
                    self.path, e
                ))
            })?;
        self.file = Some(file);
        self.written = 0;
        Ok(())
    }

    fn append(&mut self, identifier: &str) -> Result<(), SinkError> {
        let file = self.file.as_mut().ok_or(SinkError::NotOpen)?;
        let mut line = String::with_capacity(identifier.len() + 1);
        line.push_str(identifier);
        line.push('\n');
        file.write_all(line.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| {
                SinkError::Io(format!(
                    "Failed to write to output file {:?}: {}",
                    self.path, e
                ))
            })?;
        self.written += 1;
        Ok(())
    }

    fn len(&self) -> usize {
        self.written
    }
}

/// Reads back what a [`FileSink`] persisted, in the order it was written.
pub fn read_persisted(path: &Path) -> Result<Vec<String>, SinkError> {
    let file = File::open(path)
        .map_err(|e| SinkError::Io(format!("Failed to open {:?}: {}", path, e)))?;
    let mut identifiers = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| SinkError::Io(format!("Failed to read {:?}: {}", path, e)))?;
        if !line.is_empty() {
            identifiers.push(line);
        }
    }
    Ok(identifiers)
}
