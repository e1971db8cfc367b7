use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories_next::ProjectDirs;

pub const ENV_CONFIG_DIR: &str = "THREADPAPER_CONFIG_DIR";
pub const CONFIG_FILE_NAME: &str = "threadpaper.toml";

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "Threadpaper";
const APPLICATION: &str = "threadpaper";

#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: PathBuf,
}

impl AppPaths {
    pub fn discover() -> Result<Self> {
        Self::resolve(env::var_os(ENV_CONFIG_DIR))
    }

    /// A non-empty override wins over the platform config directory.
    fn resolve(override_dir: Option<OsString>) -> Result<Self> {
        if let Some(config_dir) = override_dir.filter(|dir| !dir.is_empty()) {
            return Ok(Self {
                config_dir: PathBuf::from(config_dir),
            });
        }
        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)
            .ok_or_else(|| anyhow!("failed to determine user directories"))?;
        Ok(Self {
            config_dir: project_dirs.config_dir().to_path_buf(),
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }
}
