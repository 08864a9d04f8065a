use std::{env, fs, path::Path, path::PathBuf, sync::Once};

use dirs::home_dir;

use crate::errors::BillError;

const DEFAULT_DIR_NAME: &str = ".bill_core";

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::from_default_env().add_directive("bill_core=info".parse().unwrap());

        fmt().with_env_filter(filter).init();
    });
}

/// Returns the application-specific data directory, defaulting to
/// `~/.bill_core`. `BILL_CORE_HOME` overrides it.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("BILL_CORE_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Creates `path` and any missing parents.
pub fn ensure_dir(path: &Path) -> Result<(), BillError> {
    fs::create_dir_all(path)?;
    Ok(())
}
