//! On-disk cache of class lists, one JSON file per base class.
//!
//! Each file records the discovery settings it was produced under; a file
//! written under different settings counts as a miss. Any failure disables caching for the rest of the run; callers fall back
//! to live discovery.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    superclass: String,
    #[serde(default)]
    key: String,
    classes: Vec<String>,
}

#[derive(Debug)]
pub struct ClassCache {
    superclass: String,
    key: String,
    cache_file: PathBuf,
    disabled: bool,
    cached: Option<Vec<String>>,
}

impl ClassCache {
    /// Cache under the user cache directory, e.g. `~/.cache/<app>/`.
    pub fn new(app: &str, superclass: &str) -> Self {
        Self::in_dir(&Self::default_dir(app), superclass)
    }

    /// `<user cache dir>/<app>`, or below the temp dir if there is none.
    pub fn default_dir(app: &str) -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(app)
    }

    pub fn in_dir(dir: &Path, superclass: &str) -> Self {
        let file_name: String = superclass
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
            .collect();
        Self {
            superclass: superclass.to_string(),
            key: String::new(),
            cache_file: dir.join(format!("{}.json", file_name)),
            disabled: false,
            cached: None,
        }
    }

    /// Ties the cache to the settings that determine its content.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self.cached = None;
        self
    }

    pub fn path(&self) -> &Path {
        &self.cache_file
    }

    pub fn disable(&mut self) {
        self.disabled = true;
    }

    pub fn is_cached(&mut self) -> bool {
        self.load().is_some()
    }

    /// Cached class names, read from disk on first use.
    pub fn load(&mut self) -> Option<Vec<String>> {
        if self.disabled {
            return None;
        }
        if self.cached.is_none() {
            self.cached = self.read();
        }
        self.cached.clone()
    }

    fn read(&mut self) -> Option<Vec<String>> {
        if !self.cache_file.exists() {
            return None;
        }
        let result = (|| -> std::io::Result<CacheFile> {
            let mut file = File::open(&self.cache_file)?;
            FileExt::lock_shared(&file)?;
            let mut content = String::new();
            let read = file.read_to_string(&mut content);
            let _ = FileExt::unlock(&file);
            read?;
            serde_json::from_str(&content).map_err(std::io::Error::other)
        })();
        match result {
            Ok(cache) if cache.superclass == self.superclass && cache.key == self.key => {
                Some(cache.classes)
            }
            Ok(_) => {
                tracing::debug!(path = %self.cache_file.display(), "Class cache written under other settings");
                None
            }
            Err(e) => {
                tracing::warn!(path = %self.cache_file.display(), error = %e, "Class cache unreadable, disabling");
                self.disabled = true;
                None
            }
        }
    }

    /// Stores `classes`; returns false (and disables the cache) on failure.
    pub fn save(&mut self, classes: &[String]) -> bool {
        if self.disabled {
            return false;
        }
        let data = CacheFile {
            superclass: self.superclass.clone(),
            key: self.key.clone(),
            classes: classes.to_vec(),
        };
        let result = (|| -> std::io::Result<()> {
            if let Some(dir) = self.cache_file.parent() {
                fs::create_dir_all(dir)?;
            }
            let json = serde_json::to_string_pretty(&data).map_err(std::io::Error::other)?;
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(false)
                .open(&self.cache_file)?;
            FileExt::lock_exclusive(&file)?;
            let written = file.set_len(0).and_then(|()| file.write_all(json.as_bytes()));
            let _ = FileExt::unlock(&file);
            written
        })();
        match result {
            Ok(()) => {
                self.cached = Some(classes.to_vec());
                true
            }
            Err(e) => {
                tracing::warn!(path = %self.cache_file.display(), error = %e, "Failed to write class cache, disabling");
                self.disabled = true;
                false
            }
        }
    }

    /// Removes the cache file.
    pub fn reset(&mut self) -> bool {
        self.cached = None;
        if !self.cache_file.exists() {
            return true;
        }
        match fs::remove_file(&self.cache_file) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %self.cache_file.display(), error = %e, "Failed to remove class cache");
                false
            }
        }
    }
}
