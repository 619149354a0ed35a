use config::{Config, ConfigError};
use serde::Deserialize;
use std::{
    env,
    path::{Path, PathBuf},
    result::Result,
};
use url::Url;

/// One category → remote model binding from the `[[models]]` tables.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
    pub category: String,
    pub id: String,
    pub threshold: f32,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiSection {
    key: String,
    base_url: String,
    batch_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct SheetSection {
    rows_path: PathBuf,
    summary_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    api: ApiSection,
    sheet: SheetSection,
    models: Vec<ModelEntry>,
}

#[derive(Debug, Clone)]
pub struct Api {
    pub key: String,
    pub base_url: Url,
    pub batch_interval_ms: u64,
}

impl Api {
    pub fn model_outputs_url(&self, model_id: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("/v2/models/{}/outputs", model_id));
        url
    }
}

#[derive(Debug, Clone)]
pub struct Sheet {
    pub rows_path: PathBuf,
    pub summary_path: PathBuf,
}

#[derive(Debug)]
pub struct CheckerConfig {
    pub api: Api,
    pub sheet: Sheet,
    pub models: Vec<ModelEntry>,
}

impl CheckerConfig {
    /// Load config.toml from `APP_DIR`, falling back to the repo's `config/`
    /// directory next to the manifest. Constructed once in `main` and passed
    /// down; nothing reads it ambiently.
    pub fn load() -> Result<Self, ConfigError> {
        let root = env::var("APP_DIR").unwrap_or_else(|_| {
            let dir =
                env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR or APP_DIR is required");
            let dir = Path::new(&dir).parent().unwrap().display().to_string();
            format!("{}/config", dir)
        });
        let path = format!("{root}/config.toml");
        let cfg_file: ConfigFile = Config::builder()
            .add_source(config::File::with_name(&path))
            .build()?
            .try_deserialize()?;

        let ConfigFile { api, sheet, models } = cfg_file;

        let key = env::var("CLARIFAI_API_KEY").unwrap_or(api.key);
        let base_url = Url::parse(&api.base_url)
            .map_err(|e| ConfigError::Message(format!("api.base_url is invalid: {e}")))?;

        let root = PathBuf::from(root);
        let sheet = Sheet {
            rows_path: resolve_path(&root, sheet.rows_path),
            summary_path: resolve_path(&root, sheet.summary_path),
        };

        Ok(CheckerConfig {
            api: Api {
                key,
                base_url,
                batch_interval_ms: api.batch_interval_ms,
            },
            sheet,
            models,
        })
    }
}

fn resolve_path(root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}
