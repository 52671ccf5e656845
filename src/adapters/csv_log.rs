//! Flat-file sample logs for the test modes.
//!
//! Each log is a comma-separated text file in a configured directory.
//! `begin` truncates the file and writes the header; every row after
//! that is appended and flushed, so a run cut short by power loss keeps
//! everything sampled up to that point.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use log::{debug, info};

use crate::app::ports::RecordSink;
use crate::error::RecordError;

pub struct CsvRecorder {
    dir: PathBuf,
    current: Option<(PathBuf, File)>,
}

impl CsvRecorder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            current: None,
        }
    }
}

impl RecordSink for CsvRecorder {
    fn begin(&mut self, name: &str, header: &[&str]) -> Result<(), RecordError> {
        fs::create_dir_all(&self.dir).map_err(|e| RecordError::Create(e.kind()))?;
        let path = self.dir.join(name);
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| RecordError::Create(e.kind()))?;
        writeln!(file, "{}", header.join(", ")).map_err(|e| RecordError::Write(e.kind()))?;
        info!("recording to {}", path.display());
        self.current = Some((path, file));
        Ok(())
    }

    fn append(&mut self, fields: &[String]) -> Result<(), RecordError> {
        let Some((path, file)) = self.current.as_mut() else {
            return Err(RecordError::Write(std::io::ErrorKind::NotFound));
        };
        writeln!(file, "{}", fields.join(",")).map_err(|e| RecordError::Write(e.kind()))?;
        file.flush().map_err(|e| RecordError::Write(e.kind()))?;
        debug!("{}: {} fields", path.display(), fields.len());
        Ok(())
    }
}
