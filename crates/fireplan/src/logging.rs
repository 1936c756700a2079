//! File-based tracing setup for host applications.
//!
//! The dispatcher and core emit `tracing` events; this installs a subscriber
//! that writes them to `{dir}/fireplan.log`.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

pub const LOG_FILE_NAME: &str = "fireplan.log";

/// Trim the log to its most recent `keep` bytes once it grows past `max`.
/// Returns whether the file was trimmed.
fn trim_log(log_path: &Path, max: u64, keep: u64) -> io::Result<bool> {
    let len = match fs::metadata(log_path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if len <= max {
        return Ok(false);
    }

    let mut tail = Vec::new();
    {
        let mut file = File::open(log_path)?;
        file.seek(SeekFrom::Start(len.saturating_sub(keep)))?;
        file.read_to_end(&mut tail)?;
    }

    // Drop the partial first line
    let start = tail
        .iter()
        .position(|&b| b == b'\n')
        .map_or(0, |i| i + 1);

    let mut file = File::create(log_path)?;
    file.write_all(b"--- log trimmed, older entries removed ---\n")?;
    file.write_all(&tail[start..])?;
    Ok(true)
}

/// Hands out writers to one shared log file
#[derive(Clone)]
struct SharedFile(Arc<Mutex<File>>);

struct SharedFileWriter(Arc<Mutex<File>>);

impl Write for SharedFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()
    }
}

impl<'a> MakeWriter<'a> for SharedFile {
    type Writer = SharedFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SharedFileWriter(self.0.clone())
    }
}

/// Filter used when `RUST_LOG` is not set
pub fn default_filter(level: &str) -> String {
    format!("fireplan={level},fireplan_core=warn")
}

/// Initialize logging to `{data_dir}/fireplan.log`.
///
/// The file is trimmed to its last `keep_bytes` once it exceeds `max_bytes`.
/// `RUST_LOG` overrides the configured level when set. Returns the log file
/// path. Fails if a global subscriber is already installed.
pub fn init_logging(data_dir: &Path, config: &LoggingConfig) -> color_eyre::Result<PathBuf> {
    fs::create_dir_all(data_dir)?;
    let log_path = data_dir.join(LOG_FILE_NAME);

    let trimmed = match trim_log(&log_path, config.max_bytes, config.keep_bytes) {
        Ok(trimmed) => trimmed,
        Err(e) => {
            eprintln!("Warning: failed to trim log file: {e}");
            false
        }
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(&config.level)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(SharedFile(Arc::new(Mutex::new(file))))
                .with_ansi(false)
                .with_target(true)
                .with_thread_names(true),
        )
        .try_init()?;

    tracing::info!(
        log_path = %log_path.display(),
        trimmed,
        "fireplan logging initialized"
    );
    Ok(log_path)
}
