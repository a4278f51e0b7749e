//! Project settings: `tias.toml`, environment overrides and CLI flags, in
//! increasing order of precedence.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tias_snapshot::{BUILD_DIR_NAME, GENERATED_DIR_NAME};
use tias_tiers::TierConfig;

pub const CONFIG_FILE_NAME: &str = "tias.toml";
pub const ENV_PROJECT_ROOT: &str = "TIAS_PROJECT_ROOT";
pub const ENV_SAVES_DIR: &str = "TIAS_SAVES_DIR";

const LOGS_DIR_NAME: &str = "logs";
const TEMPLATES_FILE: &str = "templates/TISpaceBodyTemplate.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Savegame directory is not configured")]
    SavesDirUnset,
}

/// On-disk shape of `tias.toml`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub saves_dir: Option<PathBuf>,
    pub build_dir: Option<PathBuf>,
    pub generated_dir: Option<PathBuf>,
    pub templates_file: Option<PathBuf>,
    pub logs_dir: Option<PathBuf>,
    pub tiers: TierConfig,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Values supplied on the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub project_root: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub saves_dir: Option<PathBuf>,
}

/// Fully resolved settings; every path is absolute or rooted at `project_root`.
#[derive(Debug, Clone)]
pub struct Settings {
    pub project_root: PathBuf,
    pub saves_dir: Option<PathBuf>,
    pub build_dir: PathBuf,
    pub generated_dir: PathBuf,
    pub templates_file: PathBuf,
    pub logs_dir: PathBuf,
    pub tiers: TierConfig,
}

impl Settings {
    pub fn load(overrides: &Overrides) -> Result<Self, ConfigError> {
        let project_root = match &overrides.project_root {
            Some(root) => root.clone(),
            None => match std::env::var_os(ENV_PROJECT_ROOT) {
                Some(root) => PathBuf::from(root),
                None => std::env::current_dir().map_err(|source| ConfigError::Read {
                    path: PathBuf::from("."),
                    source,
                })?,
            },
        };

        let file = match &overrides.config {
            Some(path) => ConfigFile::load(path)?,
            None => {
                let default = project_root.join(CONFIG_FILE_NAME);
                if default.is_file() {
                    ConfigFile::load(&default)?
                } else {
                    log::debug!("No {CONFIG_FILE_NAME} in {}; using defaults", project_root.display());
                    ConfigFile::default()
                }
            }
        };

        let env_saves = std::env::var_os(ENV_SAVES_DIR).map(PathBuf::from);
        Ok(Self::resolve(project_root, file, env_saves, overrides))
    }

    /// Merges the layers without touching the environment.
    #[must_use]
    pub fn resolve(
        project_root: PathBuf,
        file: ConfigFile,
        env_saves_dir: Option<PathBuf>,
        overrides: &Overrides,
    ) -> Self {
        let rooted = |path: PathBuf| {
            if path.is_absolute() {
                path
            } else {
                project_root.join(path)
            }
        };

        let saves_dir = overrides
            .saves_dir
            .clone()
            .or(env_saves_dir)
            .or(file.saves_dir)
            .map(&rooted);
        let build_dir = rooted(file.build_dir.unwrap_or_else(|| PathBuf::from(BUILD_DIR_NAME)));
        let templates_file = file
            .templates_file
            .map_or_else(|| build_dir.join(TEMPLATES_FILE), &rooted);

        Self {
            saves_dir,
            generated_dir: rooted(
                file.generated_dir
                    .unwrap_or_else(|| PathBuf::from(GENERATED_DIR_NAME)),
            ),
            logs_dir: rooted(file.logs_dir.unwrap_or_else(|| PathBuf::from(LOGS_DIR_NAME))),
            build_dir,
            templates_file,
            tiers: file.tiers,
            project_root,
        }
    }
}
