use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{GalleryError, Result};
use crate::state::catalog::MANIFEST_FILE;
use crate::state::store::SqliteStore;

/// Command line flags. Each one overrides the matching config file entry.
#[derive(Parser, Debug)]
#[command(name = "gallery-viewer", about = "Browse, describe and comment on a folder of images")]
pub struct Args {
    /// Folder containing the images and their manifest
    #[arg(long)]
    pub images_dir: Option<PathBuf>,
    /// Manifest path (defaults to <images-dir>/manifest.json)
    #[arg(long)]
    pub manifest: Option<PathBuf>,
    /// SQLite database holding descriptions, comments and rotations
    #[arg(long)]
    pub database: Option<PathBuf>,
    /// Config file to read instead of the default location
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Regenerate the manifest from the images folder before starting
    #[arg(long)]
    pub scan: bool,
}

/// Settings read from `config.toml`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub images_dir: PathBuf,
    pub manifest: Option<PathBuf>,
    pub database: PathBuf,
    /// tracing filter directive, overridden by RUST_LOG
    pub log_filter: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from("images"),
            manifest: None,
            database: SqliteStore::default_path(),
            log_filter: "info".to_string(),
        }
    }
}

impl GalleryConfig {
    /// ~/.config/gallery-viewer/config.toml on Linux
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gallery-viewer").join("config.toml"))
    }

    pub fn parse(path: &Path, contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|source| GalleryError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read the config file, or defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse(path, &contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Config from the file named by `args` (or the default location),
    /// with the command line flags applied on top.
    pub fn resolve(args: &Args) -> Result<Self> {
        let path = args.config.clone().or_else(Self::default_path);
        let mut config = match path {
            Some(path) => Self::load(&path)?,
            None => Self::default(),
        };
        config.apply_args(args);
        Ok(config)
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(dir) = &args.images_dir {
            self.images_dir = dir.clone();
        }
        if let Some(manifest) = &args.manifest {
            self.manifest = Some(manifest.clone());
        }
        if let Some(database) = &args.database {
            self.database = database.clone();
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.manifest
            .clone()
            .unwrap_or_else(|| self.images_dir.join(MANIFEST_FILE))
    }
}
