//! Profile loading with embedded fallbacks
//!
//! Built-in profiles are compiled into the binary from `profiles/`. An
//! optional external directory (from `PROFILES_DIR`) is searched first, so a
//! file there with the same name overrides the embedded profile.
//!
//! A profile argument that ends in `.yaml`/`.yml` or contains `/` is a path
//! to a custom profile file and bypasses both lookups.

use rust_embed::RustEmbed;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ProfileError;
use crate::models::Profile;

/// Embedded built-in profiles
#[derive(RustEmbed)]
#[folder = "profiles/"]
#[include = "*.yaml"]
struct EmbeddedProfiles;

/// Resolves profile names and paths to parsed profiles
#[derive(Debug, Clone, Default)]
pub struct ProfileLoader {
    /// External profiles directory (from PROFILES_DIR env var)
    profiles_dir: Option<PathBuf>,
}

impl ProfileLoader {
    /// `profiles_dir` should be `Some` only if PROFILES_DIR was set.
    pub fn new(profiles_dir: Option<PathBuf>) -> Self {
        Self { profiles_dir }
    }

    /// Embedded profiles only
    pub fn embedded() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var_os("PROFILES_DIR").map(PathBuf::from))
    }

    /// Load a profile by built-in name or by file path.
    pub fn load(&self, name_or_path: &str) -> Result<Profile, ProfileError> {
        if is_profile_path(name_or_path) {
            let path = Path::new(name_or_path);
            if !path.exists() {
                return Err(ProfileError::FileNotFound(path.to_path_buf()));
            }
            tracing::debug!(path = %path.display(), "Loading profile from file");
            let text = fs::read_to_string(path)?;
            return Profile::from_yaml(&text, &path.display().to_string());
        }

        let file_name = format!("{name_or_path}.yaml");
        let bytes = self
            .read_named(&file_name)?
            .ok_or_else(|| ProfileError::NotFound {
                name: name_or_path.to_string(),
                available: self.list(),
            })?;
        let text = String::from_utf8(bytes.into_owned())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Profile::from_yaml(&text, &file_name)
    }

    /// Names of all built-in profiles (merged view of embedded + external),
    /// sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = EmbeddedProfiles::iter()
            .filter_map(|file| file.strip_suffix(".yaml").map(str::to_string))
            .collect();

        if let Some(ref dir) = self.profiles_dir {
            if let Ok(entries) = fs::read_dir(dir) {
                for entry in entries.flatten() {
                    if let Some(name) = entry.file_name().to_str() {
                        if let Some(stem) = name.strip_suffix(".yaml") {
                            names.insert(stem.to_string());
                        }
                    }
                }
            }
        }

        names.into_iter().collect()
    }

    fn read_named(&self, file_name: &str) -> Result<Option<Cow<'static, [u8]>>, ProfileError> {
        if let Some(ref dir) = self.profiles_dir {
            let full_path = dir.join(file_name);
            if full_path.exists() {
                tracing::trace!(path = %full_path.display(), "Loading profile from filesystem");
                return Ok(Some(Cow::Owned(fs::read(&full_path)?)));
            }
        }

        Ok(EmbeddedProfiles::get(file_name).map(|f| {
            tracing::trace!(profile = %file_name, "Loading profile from embedded assets");
            f.data
        }))
    }
}

fn is_profile_path(name_or_path: &str) -> bool {
    name_or_path.ends_with(".yaml") || name_or_path.ends_with(".yml") || name_or_path.contains('/')
}
