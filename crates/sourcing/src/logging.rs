use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILE_NAME: &str = "sourcing.log";

/// A log past this size is moved aside before the run starts
const MAX_LOG_SIZE: u64 = 5 * 1024 * 1024;

/// Default data directory, `~/.sourcing/`
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".sourcing")
}

/// `sourcing.log` -> `sourcing.log.1`
fn previous_log_path(log_path: &Path) -> PathBuf {
    let mut name = log_path.as_os_str().to_owned();
    name.push(".1");
    PathBuf::from(name)
}

/// Move an oversized log to `<name>.1`, replacing the previous generation.
/// Returns whether a rotation happened.
fn rotate_log(log_path: &Path) -> io::Result<bool> {
    let size = match fs::metadata(log_path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if size <= MAX_LOG_SIZE {
        return Ok(false);
    }

    let previous = previous_log_path(log_path);
    if previous.exists() {
        fs::remove_file(&previous)?;
    }
    fs::rename(log_path, previous)?;
    Ok(true)
}

/// Initialize logging to `{data_dir}/sourcing.log`.
///
/// `RUST_LOG` takes precedence over `level`. The core library reports through
/// return values, so its target is kept at `warn`. Stdout stays free for
/// reports.
pub fn init_logging(data_dir: &Path, level: &str) -> color_eyre::Result<()> {
    fs::create_dir_all(data_dir)?;

    let log_path = data_dir.join(LOG_FILE_NAME);
    let rotated = rotate_log(&log_path).unwrap_or_else(|e| {
        eprintln!("Warning: could not rotate {}: {e}", log_path.display());
        false
    });

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sourcing={level},sourcing_core=warn")));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    if rotated {
        tracing::info!(previous = %previous_log_path(&log_path).display(), "log rotated");
    }
    tracing::info!(log_path = %log_path.display(), "logging initialized");
    Ok(())
}
