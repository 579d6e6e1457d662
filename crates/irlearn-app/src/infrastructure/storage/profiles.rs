//! Profile persistence: one TOML file per learned remote.
//!
//! The workflow only depends on the [`ProfileStore`] trait; the on-disk
//! representation is an implementation detail of [`TomlProfileStore`].
//! Files live under the platform data directory (overridable via config):
//! - Linux:    `~/.local/share/irlearn/profiles/<name>.toml`
//! - Windows:  `%APPDATA%\IRLearn\profiles\<name>.toml`
//! - macOS:    `~/Library/Application Support/IRLearn/profiles/<name>.toml`

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use irlearn_core::RemoteProfile;
use thiserror::Error;
use tracing::{debug, info};

/// Error type for profile storage operations.
#[derive(Debug, Error)]
pub enum ProfileStoreError {
    /// No profile exists at the given path.
    #[error("no profile found at {path}")]
    NotFound { path: PathBuf },

    /// The file exists but is not a valid stored profile.
    #[error("profile at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A file system I/O error occurred.
    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The profile could not be serialized.
    #[error("failed to serialize profile: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The platform data directory could not be determined.
    #[error("could not determine platform data directory")]
    NoPlatformDataDir,
}

/// Trait abstracting where finished profiles go.
///
/// The production implementation writes TOML files; test implementations
/// record calls or inject failures.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Persists `profile`, returning the location it was written to.
    async fn store(&self, profile: &RemoteProfile) -> Result<PathBuf, ProfileStoreError>;

    /// Loads a previously stored profile.
    async fn load(&self, path: &Path) -> Result<RemoteProfile, ProfileStoreError>;
}

/// File-per-profile TOML store rooted at a directory.
pub struct TomlProfileStore {
    dir: PathBuf,
}

impl TomlProfileStore {
    /// Creates a store rooted at `dir`.  The directory is created lazily on
    /// the first `store()`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Resolves the default profile directory for this platform.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileStoreError::NoPlatformDataDir`] when the base
    /// directory cannot be determined from the environment.
    pub fn default_dir() -> Result<PathBuf, ProfileStoreError> {
        platform_data_dir()
            .map(|base| base.join("profiles"))
            .ok_or(ProfileStoreError::NoPlatformDataDir)
    }

    /// The path a profile with this name is stored at.
    pub fn profile_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.toml", sanitize_file_stem(name)))
    }

    /// Enumerates the stored profile files in this store, sorted by name.
    pub async fn list(&self) -> Result<Vec<PathBuf>, ProfileStoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            // A store nothing was saved to yet is empty, not an error.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ProfileStoreError::Io {
                    path: self.dir.clone(),
                    source: e,
                })
            }
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|source| {
            ProfileStoreError::Io {
                path: self.dir.clone(),
                source,
            }
        })? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "toml") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

#[async_trait]
impl ProfileStore for TomlProfileStore {
    async fn store(&self, profile: &RemoteProfile) -> Result<PathBuf, ProfileStoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| ProfileStoreError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.profile_path(&profile.name);
        let content = toml::to_string_pretty(profile)?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|source| ProfileStoreError::Io {
                path: path.clone(),
                source,
            })?;

        info!(
            profile = %profile.name,
            buttons = profile.buttons.len(),
            path = %path.display(),
            "profile stored"
        );
        Ok(path)
    }

    async fn load(&self, path: &Path) -> Result<RemoteProfile, ProfileStoreError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProfileStoreError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(source) => {
                return Err(ProfileStoreError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let profile = toml::from_str(&content).map_err(|source| ProfileStoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "profile loaded");
        Ok(profile)
    }
}

/// Maps a user-chosen profile name to a safe file stem.
///
/// Anything outside `[A-Za-z0-9._-]` becomes `_`, so "Living Room" and
/// "Living/Room" land on distinct-but-legal file names.
fn sanitize_file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "unnamed".to_string()
    } else {
        stem
    }
}

/// Resolves the platform data base directory for the application.
fn platform_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("IRLearn"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_DATA_HOME or ~/.local/share
        let base = std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local").join("share"))
            })?;
        Some(base.join("irlearn"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("IRLearn")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}
