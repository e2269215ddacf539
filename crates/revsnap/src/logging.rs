//! Logging setup for the revsnap CLI.
//!
//! Two layers: a rolling file under the logs directory for the full
//! story, and a console layer on stderr so tables and JSON on stdout
//! stay clean. The file writer rotates at a fixed size and keeps a
//! bounded chain of archives.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str =
    "revsnap=info,revsnap_ingest=info,revsnap_compare=info,revsnap_db=info";
const LOG_BASE_NAME: &str = "revsnap";
const MAX_LOG_FILES: usize = 5;
const MAX_LOG_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Initialize tracing with a rolling file writer and stderr output.
///
/// RUST_LOG overrides the default filter. The console follows the same
/// filter unless --verbose lifts it to debug.
pub fn init_logging(verbose: bool) -> Result<()> {
    let log_dir =
        crate::cli::config::ensure_logs_dir().context("Failed to create logs directory")?;
    let file_writer = SharedRollingWriter::new(log_dir, LOG_BASE_NAME)
        .context("Failed to initialize rolling log writer")?;

    let file_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let console_filter = if verbose {
        EnvFilter::new("debug")
    } else {
        file_filter.clone()
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(console_filter),
        )
        .init();

    Ok(())
}

struct RollingLogFile {
    dir: PathBuf,
    base: String,
    max_files: usize,
    max_size: u64,
    file: File,
    written: u64,
}

impl RollingLogFile {
    fn open(dir: PathBuf, base: &str, max_files: usize, max_size: u64) -> io::Result<Self> {
        fs::create_dir_all(&dir)?;
        let base = sanitize_base(base);
        let (file, written) = open_append(&dir.join(format!("{base}.log")))?;
        let mut rolling = Self {
            dir,
            base,
            max_files: max_files.max(1),
            max_size,
            file,
            written,
        };
        if rolling.written >= rolling.max_size {
            rolling.rotate()?;
        }
        Ok(rolling)
    }

    fn active_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.base))
    }

    fn archived_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}.log.{}", self.base, index))
    }

    /// Shift the archive chain by one and start a fresh active file.
    /// With max_files == 1 the active file is simply truncated.
    fn rotate(&mut self) -> io::Result<()> {
        let _ = self.file.flush();

        let last = self.max_files - 1;
        if last == 0 {
            let _ = fs::remove_file(self.active_path());
        } else {
            let oldest = self.archived_path(last);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for index in (1..last).rev() {
                let src = self.archived_path(index);
                if src.exists() {
                    fs::rename(&src, self.archived_path(index + 1))?;
                }
            }
            let active = self.active_path();
            if active.exists() {
                fs::rename(&active, self.archived_path(1))?;
            }
        }

        let (file, written) = open_append(&self.active_path())?;
        self.file = file;
        self.written = written;
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<(File, u64)> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let written = file.metadata()?.len();
    Ok((file, written))
}

impl Write for RollingLogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_size {
            self.rotate()?;
        }
        let count = self.file.write(buf)?;
        self.written += count as u64;
        Ok(count)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

#[derive(Clone)]
struct SharedRollingWriter {
    inner: Arc<Mutex<RollingLogFile>>,
}

impl SharedRollingWriter {
    fn new(dir: PathBuf, base: &str) -> Result<Self> {
        let rolling = RollingLogFile::open(dir, base, MAX_LOG_FILES, MAX_LOG_FILE_SIZE)
            .with_context(|| format!("Failed to open log file for {base}"))?;
        Ok(Self {
            inner: Arc::new(Mutex::new(rolling)),
        })
    }
}

struct SharedRollingWriterGuard {
    inner: Arc<Mutex<RollingLogFile>>,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedRollingWriter {
    type Writer = SharedRollingWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedRollingWriterGuard {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Write for SharedRollingWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        guard.flush()
    }
}

fn sanitize_base(base: &str) -> String {
    base.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_keeps_bounded_chain() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut log = RollingLogFile::open(dir.path().to_path_buf(), "test", 3, 32).unwrap();

        for _ in 0..10 {
            log.write_all(b"0123456789abcdef").unwrap();
        }
        log.flush().unwrap();

        assert!(dir.path().join("test.log").exists());
        assert!(dir.path().join("test.log.1").exists());
        assert!(dir.path().join("test.log.2").exists());
        assert!(!dir.path().join("test.log.3").exists());
    }

    #[test]
    fn test_open_resumes_existing_size() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("resume.log"), b"previous line\n").unwrap();

        let log = RollingLogFile::open(dir.path().to_path_buf(), "resume", 3, 1024).unwrap();
        assert_eq!(log.written, 14);
    }

    #[test]
    fn test_oversized_file_rotates_on_open() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("big.log"), vec![b'x'; 64]).unwrap();

        let log = RollingLogFile::open(dir.path().to_path_buf(), "big", 3, 32).unwrap();
        assert_eq!(log.written, 0);
        assert!(dir.path().join("big.log.1").exists());
    }

    #[test]
    fn test_sanitize_base() {
        assert_eq!(sanitize_base("revsnap"), "revsnap");
        assert_eq!(sanitize_base("rev snap/1"), "rev_snap_1");
    }
}
