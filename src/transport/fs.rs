use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::constants::files::TEMP_SUFFIX;
use crate::constants::transport::SKIP_SCHEMA_MSG;
use crate::errors::PipelineError;

/// Counters for a JSONL read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadStats {
    /// Lines decoded into records.
    pub read: usize,
    /// Lines skipped because required members were missing or mistyped.
    pub skipped: usize,
}

/// Streaming line-delimited JSON reader.
///
/// Blank lines are ignored. Lines that parse as JSON but do not fit `T` are
/// skipped with a warning; lines that are not JSON at all end the stream with
/// [`PipelineError::Corrupt`].
pub struct JsonlReader<T> {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_no: usize,
    stats: ReadStats,
    _record: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    /// Open `path` for reading.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PipelineError> {
        let path = path.into();
        let file = File::open(&path).map_err(|err| PipelineError::file(&path, err))?;
        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
            line_no: 0,
            stats: ReadStats::default(),
            _record: PhantomData,
        })
    }

    /// File being read.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Counters so far.
    pub fn stats(&self) -> ReadStats {
        self.stats
    }
}

impl<T: DeserializeOwned> Iterator for JsonlReader<T> {
    type Item = Result<T, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(PipelineError::file(&self.path, err))),
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<T>(&line) {
                Ok(record) => {
                    self.stats.read += 1;
                    return Some(Ok(record));
                }
                Err(err) if err.classify() == Category::Data => {
                    warn!(
                        path = %self.path.display(),
                        line = self.line_no,
                        error = %err,
                        "{}",
                        SKIP_SCHEMA_MSG
                    );
                    self.stats.skipped += 1;
                }
                Err(err) => {
                    return Some(Err(PipelineError::Corrupt {
                        path: self.path.clone(),
                        line: self.line_no,
                        details: err.to_string(),
                    }));
                }
            }
        }
    }
}

/// Read every record of `path`, skipping schema misfits.
pub fn read_jsonl<T: DeserializeOwned>(
    path: impl Into<PathBuf>,
) -> Result<(Vec<T>, ReadStats), PipelineError> {
    let mut reader = JsonlReader::open(path)?;
    let mut records = Vec::new();
    for record in reader.by_ref() {
        records.push(record?);
    }
    Ok((records, reader.stats()))
}

/// Line-delimited JSON writer that publishes atomically.
///
/// Lines go to `<path>.tmp`; [`AtomicJsonlWriter::commit`] flushes, syncs, and
/// renames the temp file over `path`. A writer dropped without committing
/// removes its temp file, so readers never see a partial file.
pub struct AtomicJsonlWriter {
    target: PathBuf,
    tmp_path: PathBuf,
    writer: Option<BufWriter<File>>,
    written: usize,
}

impl AtomicJsonlWriter {
    /// Create the temp file next to `target`, creating parent directories.
    pub fn create(target: impl Into<PathBuf>) -> Result<Self, PipelineError> {
        let target = target.into();
        ensure_parent_dir(&target)?;
        let tmp_path = temp_path_for(&target);
        let file = File::create(&tmp_path).map_err(|err| PipelineError::file(&tmp_path, err))?;
        Ok(Self {
            target,
            tmp_path,
            writer: Some(BufWriter::new(file)),
            written: 0,
        })
    }

    /// Append one record as a JSON line.
    pub fn write<T: Serialize>(&mut self, record: &T) -> Result<(), PipelineError> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(PipelineError::Configuration(format!(
                "writer for '{}' is already committed",
                self.target.display()
            )));
        };
        serde_json::to_writer(&mut *writer, record)?;
        writer
            .write_all(b"\n")
            .map_err(|err| PipelineError::file(&self.tmp_path, err))?;
        self.written += 1;
        Ok(())
    }

    /// Append every record of `records`.
    pub fn write_all<'a, T, I>(&mut self, records: I) -> Result<(), PipelineError>
    where
        T: Serialize + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        for record in records {
            self.write(record)?;
        }
        Ok(())
    }

    /// Lines written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush, sync, and move the temp file into place. Returns the line count.
    pub fn commit(mut self) -> Result<usize, PipelineError> {
        if let Some(writer) = self.writer.take() {
            let file = writer
                .into_inner()
                .map_err(|err| PipelineError::file(&self.tmp_path, err.into_error()))?;
            file.sync_all()
                .map_err(|err| PipelineError::file(&self.tmp_path, err))?;
        }
        fs::rename(&self.tmp_path, &self.target).map_err(|err| {
            let _ = fs::remove_file(&self.tmp_path);
            PipelineError::file(&self.target, err)
        })?;
        Ok(self.written)
    }
}

impl Drop for AtomicJsonlWriter {
    fn drop(&mut self) {
        if self.writer.take().is_some() {
            let _ = fs::remove_file(&self.tmp_path);
        }
    }
}

/// Write `records` to `path` through an [`AtomicJsonlWriter`].
pub fn write_jsonl<T: Serialize>(
    path: impl Into<PathBuf>,
    records: &[T],
) -> Result<usize, PipelineError> {
    let mut writer = AtomicJsonlWriter::create(path)?;
    writer.write_all(records)?;
    writer.commit()
}

/// Write a pretty JSON document atomically.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), PipelineError> {
    ensure_parent_dir(path)?;
    let raw = serde_json::to_vec_pretty(value)?;
    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, raw).map_err(|err| PipelineError::file(&tmp_path, err))?;
    fs::rename(&tmp_path, path).map_err(|err| PipelineError::file(path, err))?;
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

fn ensure_parent_dir(path: &Path) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|err| PipelineError::file(parent, err))?;
    }
    Ok(())
}
