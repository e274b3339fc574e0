use gallery::DetailMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_APP_ID: &str = "kz2028@nyu.edu";

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AppConfig {
    pub log_level: String,
    pub base_url: String,
    pub app_id: String,
    pub detail_mode: DetailMode,
    pub cache_path: PathBuf,
    pub photos_dir: PathBuf,
}

#[derive(Default)]
pub struct AppConfigOverrides {
    pub log_level: Option<String>,
    pub base_url: Option<String>,
    pub app_id: Option<String>,
    pub detail_mode: Option<DetailMode>,
    pub photos_dir: Option<PathBuf>,
}

fn default_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".petgallery")
}

fn default_config_path() -> PathBuf {
    default_dir().join("config")
}

impl AppConfig {
    pub fn load_from(path: Option<PathBuf>) -> Self {
        let path = path.unwrap_or_else(default_config_path);
        let cfg = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Toml).required(false))
            .build()
            .unwrap_or_default();

        let log_level = cfg
            .get_string("log_level")
            .unwrap_or_else(|_| "info".to_string());
        let base_url = cfg
            .get_string("base_url")
            .unwrap_or_else(|_| api_client::DEFAULT_BASE_URL.to_string());
        let app_id = cfg
            .get_string("app_id")
            .unwrap_or_else(|_| DEFAULT_APP_ID.to_string());
        let detail_mode = cfg
            .get_string("detail_mode")
            .ok()
            .and_then(|m| m.parse().ok())
            .unwrap_or_default();
        let cache_path = cfg
            .get_string("cache_path")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_dir());
        let photos_dir = cfg
            .get_string("photos_dir")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::document_dir().unwrap_or_else(|| cache_path.clone()));

        Self {
            log_level,
            base_url,
            app_id,
            detail_mode,
            cache_path,
            photos_dir,
        }
    }

    pub fn apply_overrides(mut self, ov: &AppConfigOverrides) -> Self {
        if let Some(l) = &ov.log_level {
            self.log_level = l.clone();
        }
        if let Some(u) = &ov.base_url {
            self.base_url = u.clone();
        }
        if let Some(a) = &ov.app_id {
            self.app_id = a.clone();
        }
        if let Some(m) = ov.detail_mode {
            self.detail_mode = m;
        }
        if let Some(p) = &ov.photos_dir {
            self.photos_dir = p.clone();
        }
        self
    }

    pub fn save_to(&self, path: Option<PathBuf>) -> std::io::Result<()> {
        let path = path.unwrap_or_else(default_config_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = toml::to_string(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, data)
    }
}
