use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for Notebox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteboxConfig {
    pub storage: StorageConfig,
    #[serde(default)]
    pub titles: TitleConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where note bodies and snapshots live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// User-chosen storage location
    pub notes_dir: PathBuf,
    /// Live bodies, relative to `notes_dir`
    #[serde(default = "default_notes_subdir")]
    pub notes_subdir: String,
    /// Trashed bodies, relative to `notes_dir`
    #[serde(default = "default_trash_subdir")]
    pub trash_subdir: String,
    /// Body file extension
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Snapshot directory, relative to `notes_dir`
    #[serde(default = "default_state_dir")]
    pub state_dir: String,
}

/// Titles given to newly created items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleConfig {
    pub root: String,
    pub directory: String,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Upper bound on notes scanned concurrently
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Fallback log level when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_notes_subdir() -> String {
    "notes".to_string()
}

fn default_trash_subdir() -> String {
    "trash".to_string()
}

fn default_extension() -> String {
    "md".to_string()
}

fn default_state_dir() -> String {
    ".notebox".to_string()
}

fn default_max_workers() -> usize {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            root: "Root Folder".to_string(),
            directory: "New Folder".to_string(),
            note: "New Note".to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl StorageConfig {
    pub fn new(notes_dir: PathBuf) -> Self {
        Self {
            notes_dir,
            notes_subdir: default_notes_subdir(),
            trash_subdir: default_trash_subdir(),
            extension: default_extension(),
            state_dir: default_state_dir(),
        }
    }

    pub fn live_dir(&self) -> PathBuf {
        self.notes_dir.join(&self.notes_subdir)
    }

    pub fn trash_dir(&self) -> PathBuf {
        self.notes_dir.join(&self.trash_subdir)
    }

    pub fn snapshot_dir(&self) -> PathBuf {
        self.notes_dir.join(&self.state_dir)
    }
}

impl Default for NoteboxConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::new(PathBuf::from(".")),
            titles: TitleConfig::default(),
            search: SearchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl NoteboxConfig {
    pub fn with_notes_dir(notes_dir: PathBuf) -> Self {
        Self {
            storage: StorageConfig::new(notes_dir),
            ..Self::default()
        }
    }

    /// Parse config from YAML
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Load config from a file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> crate::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Self::from_yaml(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}
