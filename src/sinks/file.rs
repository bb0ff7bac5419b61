//! Rotating file sink
//!
//! Appends encoded lines to a file and rolls it over once it would exceed the
//! configured size. Rolled files are renamed with a timestamp, pruned by
//! count and age, and optionally gzip-compressed.

use crate::core::{LoggerError, Record, Result, Sink};
use chrono::{Local, NaiveDateTime};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";
const COMPRESS_SUFFIX: &str = ".gz";
const MEGABYTE: u64 = 1024 * 1024;

/// Rollover rules for a file sink. Zero means unbounded for every limit.
///
/// # Examples
///
/// ```
/// use switchlog::FileRotationPolicy;
///
/// let policy: FileRotationPolicy =
///     serde_json::from_str(r#"{"maxsize": 100, "maxbackups": 7, "compress": true}"#).unwrap();
/// assert_eq!(policy.max_size_mb, 100);
/// assert_eq!(policy.max_age_days, 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRotationPolicy {
    /// Size in megabytes a file may reach before it is rolled over
    #[serde(rename = "maxsize")]
    pub max_size_mb: u64,
    /// Days to keep rolled files
    #[serde(rename = "maxage")]
    pub max_age_days: u32,
    /// Number of rolled files to keep
    #[serde(rename = "maxbackups")]
    pub max_backups: u32,
    /// Gzip rolled files
    pub compress: bool,
}

impl FileRotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size_mb(mut self, megabytes: u64) -> Self {
        self.max_size_mb = megabytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age_days(mut self, days: u32) -> Self {
        self.max_age_days = days;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: u32) -> Self {
        self.max_backups = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    fn max_bytes(&self) -> Option<u64> {
        (self.max_size_mb > 0).then(|| self.max_size_mb.saturating_mul(MEGABYTE))
    }
}

struct FileState {
    file: Option<File>,
    size: u64,
}

/// File sink with size-triggered rollover.
///
/// Writes go straight to the file without user-space buffering, so a record
/// is handed to the OS before `write` returns.
pub struct RotatingFileSink {
    path: PathBuf,
    name: String,
    policy: FileRotationPolicy,
    max_bytes: Option<u64>,
    state: Mutex<FileState>,
}

impl RotatingFileSink {
    /// Open (or create) `path` for appending.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::InvalidSinkConfig`] for an empty path, or an IO
    /// error if the directory or file cannot be created.
    pub fn open(path: impl AsRef<Path>, policy: FileRotationPolicy) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.as_os_str().is_empty() {
            return Err(LoggerError::invalid_sink_config(
                "log file path must not be empty",
            ));
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, size) = Self::open_file(&path)?;
        let max_bytes = policy.max_bytes();

        Ok(Self {
            name: path.display().to_string(),
            path,
            policy,
            max_bytes,
            state: Mutex::new(FileState {
                file: Some(file),
                size,
            }),
        })
    }

    #[cfg(test)]
    fn with_max_bytes(mut self, bytes: u64) -> Self {
        self.max_bytes = Some(bytes);
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn policy(&self) -> &FileRotationPolicy {
        &self.policy
    }

    /// Bytes written to the current file.
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.state.lock().size
    }

    fn open_file(path: &Path) -> Result<(File, u64)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::io_operation(
                    "open log file",
                    format!("Failed to open '{}'", path.display()),
                    e,
                )
            })?;
        let size = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok((file, size))
    }

    fn file_parts(&self) -> (String, String) {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("app")
            .to_string();
        let ext = self
            .path
            .extension()
            .and_then(|s| s.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        (stem, ext)
    }

    fn backup_path(&self) -> PathBuf {
        let (stem, ext) = self.file_parts();
        let mut stamp = Local::now().naive_local();
        loop {
            let name = format!("{}-{}{}", stem, stamp.format(BACKUP_TIME_FORMAT), ext);
            let candidate = self.path.with_file_name(&name);
            let compressed = self
                .path
                .with_file_name(format!("{}{}", name, COMPRESS_SUFFIX));
            if !candidate.exists() && !compressed.exists() {
                return candidate;
            }
            // Another rollover already took this millisecond
            stamp += chrono::Duration::milliseconds(1);
        }
    }

    fn rotate(&self, state: &mut FileState) -> Result<()> {
        // Release the handle before renaming
        drop(state.file.take());

        let backup = self.backup_path();
        if let Err(e) = fs::rename(&self.path, &backup) {
            if e.kind() != std::io::ErrorKind::NotFound {
                let (file, size) = Self::open_file(&self.path)?;
                state.file = Some(file);
                state.size = size;
                return Err(LoggerError::file_rotation(
                    self.name.clone(),
                    format!("Failed to rename to '{}': {}", backup.display(), e),
                ));
            }
        }

        let (file, size) = Self::open_file(&self.path)?;
        state.file = Some(file);
        state.size = size;

        self.prune_backups();
        Ok(())
    }

    /// Rolled files for this sink, newest first.
    fn backups(&self) -> Vec<(NaiveDateTime, PathBuf)> {
        let (stem, ext) = self.file_parts();
        let prefix = format!("{}-", stem);
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(dir) => dir.to_path_buf(),
            None => PathBuf::from("."),
        };

        let Ok(entries) = fs::read_dir(&dir) else {
            return Vec::new();
        };

        let mut backups: Vec<(NaiveDateTime, PathBuf)> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let file_name = entry.file_name().to_str()?.to_string();
                let rest = file_name.strip_prefix(&prefix)?;
                let rest = rest.strip_suffix(COMPRESS_SUFFIX).unwrap_or(rest);
                let stamp = rest.strip_suffix(ext.as_str())?;
                let time = NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_FORMAT).ok()?;
                Some((time, entry.path()))
            })
            .collect();

        backups.sort_by(|a, b| b.0.cmp(&a.0));
        backups
    }

    fn prune_backups(&self) {
        let mut backups = self.backups();

        let mut doomed = Vec::new();
        if self.policy.max_backups > 0 && backups.len() > self.policy.max_backups as usize {
            doomed.extend(backups.split_off(self.policy.max_backups as usize));
        }
        if self.policy.max_age_days > 0 {
            let max_age = chrono::Duration::days(i64::from(self.policy.max_age_days));
            let cutoff = Local::now().naive_local() - max_age;
            let (keep, old): (Vec<_>, Vec<_>) =
                backups.into_iter().partition(|(time, _)| *time >= cutoff);
            backups = keep;
            doomed.extend(old);
        }

        for (_, path) in doomed {
            if let Err(e) = fs::remove_file(&path) {
                eprintln!(
                    "[LOGGER WARNING] Failed to remove old log file {}: {}",
                    path.display(),
                    e
                );
            }
        }

        if self.policy.compress {
            for (_, path) in backups {
                let is_compressed = path
                    .to_str()
                    .map(|p| p.ends_with(COMPRESS_SUFFIX))
                    .unwrap_or(true);
                if !is_compressed {
                    if let Err(e) = compress_file(&path) {
                        eprintln!("[LOGGER WARNING] {}", e);
                    }
                }
            }
        }
    }
}

/// Gzip `path` to `path.gz`, removing the original only once the compressed
/// copy is complete.
fn compress_file(path: &Path) -> Result<()> {
    use std::io::{BufReader, BufWriter};

    let mut gz_name = path.as_os_str().to_owned();
    gz_name.push(COMPRESS_SUFFIX);
    let gz_path = PathBuf::from(gz_name);
    let mut tmp_name = gz_path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let compress = || -> std::io::Result<()> {
        let mut reader = BufReader::with_capacity(64 * 1024, File::open(path)?);
        let output = BufWriter::with_capacity(64 * 1024, File::create(&tmp_path)?);
        let mut encoder = flate2::write::GzEncoder::new(output, flate2::Compression::default());
        std::io::copy(&mut reader, &mut encoder)?;
        encoder.finish()?.flush()?;
        fs::rename(&tmp_path, &gz_path)
    };

    if let Err(e) = compress() {
        let _ = fs::remove_file(&tmp_path);
        return Err(LoggerError::io_operation(
            "compress log file",
            format!("Failed to compress '{}'", path.display()),
            e,
        ));
    }

    fs::remove_file(path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Compressed but could not remove '{}'", path.display()),
            e,
        )
    })
}

impl Sink for RotatingFileSink {
    fn write(&self, _record: &Record, line: &str) -> Result<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let len = line.len() as u64;

        if let Some(max) = self.max_bytes {
            if state.size > 0 && state.size + len > max {
                if let Err(e) = self.rotate(state) {
                    // Keep writing to the current file rather than lose the record
                    eprintln!("[LOGGER WARNING] Log rotation failed: {}", e);
                }
            }
        }

        if state.file.is_none() {
            let (file, size) = Self::open_file(&self.path)?;
            state.size = size;
            state.file = Some(file);
        }
        if let Some(file) = state.file.as_mut() {
            file.write_all(line.as_bytes())
                .map_err(|e| LoggerError::sink_write(&self.name, e))?;
        }
        state.size += len;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        if let Some(ref mut file) = self.state.lock().file {
            file.flush()
                .map_err(|e| LoggerError::sink_write(&self.name, e))?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        if let Some(mut file) = self.state.get_mut().file.take() {
            let _ = file.flush();
        }
    }
}
