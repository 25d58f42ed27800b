use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};
use once_cell::sync::Lazy;

static DEFAULT_DB_NAME: &str = "listmgr.sqlite3";
pub static ENV_DATA_DIR: &str = "LISTMGR_DATA_DIR";

static PROJECT_DIRS: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("dev", "listmgr", "listmgr"));

/// Where the store directory was taken from, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataDirSource {
    Flag,
    Environment,
    DevTree,
    Platform,
    Home,
    WorkingDir,
}

impl fmt::Display for DataDirSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DataDirSource::Flag => "--data-dir",
            DataDirSource::Environment => ENV_DATA_DIR,
            DataDirSource::DevTree => "dev tree",
            DataDirSource::Platform => "platform data dir",
            DataDirSource::Home => "home dir",
            DataDirSource::WorkingDir => "working dir",
        };
        f.write_str(label)
    }
}

/// Location of the local list store.
#[derive(Debug, Clone)]
pub struct AppConfig {
    data_dir: PathBuf,
    db_path: PathBuf,
    source: DataDirSource,
}

impl AppConfig {
    /// Pick the store directory and make sure it exists.
    pub fn discover(flag: Option<PathBuf>) -> Result<Self> {
        let env_dir = env::var(ENV_DATA_DIR).ok();
        let (data_dir, source) = locate(flag, env_dir.as_deref())?;
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("creating list store directory {}", data_dir.display()))?;
        tracing::debug!(data_dir = %data_dir.display(), %source, "resolved list store");
        Ok(Self::with_source(data_dir, source))
    }

    pub fn from_data_dir(data_dir: PathBuf) -> Self {
        Self::with_source(data_dir, DataDirSource::Flag)
    }

    fn with_source(data_dir: PathBuf, source: DataDirSource) -> Self {
        Self {
            db_path: data_dir.join(DEFAULT_DB_NAME),
            data_dir,
            source,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn source(&self) -> DataDirSource {
        self.source
    }
}

fn locate(flag: Option<PathBuf>, env_dir: Option<&str>) -> Result<(PathBuf, DataDirSource)> {
    if let Some(dir) = flag {
        return Ok((dir, DataDirSource::Flag));
    }
    if let Some(dir) = env_dir.map(str::trim).filter(|dir| !dir.is_empty()) {
        return Ok((PathBuf::from(dir), DataDirSource::Environment));
    }
    if cfg!(debug_assertions) {
        let dev = Path::new(env!("CARGO_MANIFEST_DIR")).join("../tmp/dev-listmgr");
        return Ok((dev, DataDirSource::DevTree));
    }
    if let Some(project) = PROJECT_DIRS.as_ref() {
        return Ok((project.data_dir().to_path_buf(), DataDirSource::Platform));
    }
    if let Some(base) = BaseDirs::new() {
        return Ok((base.home_dir().join(".listmgr"), DataDirSource::Home));
    }
    let cwd = env::current_dir().context("reading working directory")?;
    Ok((cwd.join(".listmgr"), DataDirSource::WorkingDir))
}
