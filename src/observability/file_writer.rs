//! Size-rotated, line-oriented trace file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::infrastructure::sync::lock;

/// Size and retention limits for a [`FileWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Rotate once the live file grows past this many bytes.
    pub max_bytes: u64,
    /// Rotated files kept next to the live file.
    pub max_backups: usize,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            max_backups: 3,
        }
    }
}

/// Appends lines to a trace file, rotating it when it gets too large.
///
/// The file is opened lazily on the first write. When the live file exceeds
/// [`RotationPolicy::max_bytes`] it is renamed to `<file name>.<unix millis>`
/// and a fresh file is started; only the newest
/// [`RotationPolicy::max_backups`] rotated files are kept.
pub struct FileWriter {
    path: PathBuf,
    policy: RotationPolicy,
    handle: Mutex<Option<File>>,
}

impl FileWriter {
    pub const fn new(path: PathBuf, policy: RotationPolicy) -> Self {
        Self {
            path,
            policy,
            handle: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `line` plus a newline and flushes.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when rotating, opening, or writing
    /// the file fails.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut handle = lock(&self.handle);

        let oversized = fs::metadata(&self.path).is_ok_and(|meta| meta.len() > self.policy.max_bytes);
        if oversized {
            *handle = None;
            self.rotate()?;
        }

        if handle.is_none() {
            *handle = Some(OpenOptions::new().create(true).append(true).open(&self.path)?);
        }

        if let Some(file) = handle.as_mut() {
            writeln!(file, "{line}")?;
            file.flush()?;
        }
        Ok(())
    }

    fn rotate(&self) -> io::Result<()> {
        if self.path.exists() {
            let stamp = chrono::Utc::now().timestamp_millis();
            fs::rename(&self.path, self.backup_path(stamp))?;
        }
        self.prune_backups()
    }

    fn backup_path(&self, stamp: i64) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(format!(".{stamp}"));
        self.path.with_file_name(name)
    }

    /// Deletes the oldest rotated files beyond the retention limit.
    fn prune_backups(&self) -> io::Result<()> {
        let (Some(dir), Some(file_name)) = (self.path.parent(), self.path.file_name().and_then(|n| n.to_str())) else {
            return Ok(());
        };
        let prefix = format!("{file_name}.");
        let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };

        let mut backups: Vec<(i64, PathBuf)> = fs::read_dir(dir)?
            .filter_map(std::result::Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                let stamp = name.strip_prefix(&prefix)?.parse::<i64>().ok()?;
                Some((stamp, entry.path()))
            })
            .collect();

        backups.sort_by(|a, b| b.0.cmp(&a.0));
        for (_, stale) in backups.iter().skip(self.policy.max_backups) {
            let _ = fs::remove_file(stale);
        }

        Ok(())
    }
}

impl std::fmt::Debug for FileWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWriter")
            .field("path", &self.path)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
