use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{
    errors::BillError,
    utils::{app_data_dir, ensure_dir},
};

const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";

static DEFAULT_CATEGORY_SUGGESTIONS: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "Housing",
        "Utilities",
        "Insurance",
        "Subscriptions",
        "Transport",
        "Health",
        "Other",
    ]
    .into_iter()
    .map(String::from)
    .collect()
});

/// User preferences for the bill book front ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Display-only currency code; amounts themselves are currency-agnostic.
    pub currency: String,
    /// Preset suggestions offered when a category is entered.
    #[serde(default = "Config::default_suggestions")]
    pub category_suggestions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: "USD".into(),
            category_suggestions: Self::default_suggestions(),
        }
    }
}

impl Config {
    fn default_suggestions() -> Vec<String> {
        DEFAULT_CATEGORY_SUGGESTIONS.clone()
    }
}

/// Loads and saves the configuration file under the application data dir.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, BillError> {
        Self::from_base(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, BillError> {
        Self::from_base(base)
    }

    fn from_base(base: PathBuf) -> Result<Self, BillError> {
        ensure_dir(&base)?;
        Ok(Self {
            path: base.join(CONFIG_FILE),
        })
    }

    /// Reads the config, falling back to defaults when the file is absent.
    pub fn load(&self) -> Result<Config, BillError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), BillError> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), BillError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
