use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

pub const MANIFEST_FILE_NAME: &str = "ui-manifest.json";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read asset manifest '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed asset manifest: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("asset manifest must be a JSON object keyed by relative asset path")]
    NotAnObject,
    #[error("asset manifest entry '{0}' is not a relative asset path")]
    InvalidEntry(String),
}

/// Ordered list of relative asset paths that make up the website bundle.
///
/// The manifest file maps every relative path to itself; only the keys are
/// meaningful and their order in the file is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetManifest {
    entries: Vec<String>,
}

impl AssetManifest {
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ManifestError> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(map) = value else {
            return Err(ManifestError::NotAnObject);
        };

        let mut entries = Vec::with_capacity(map.len());
        for key in map.keys() {
            if key.trim().is_empty() || key.starts_with('/') {
                return Err(ManifestError::InvalidEntry(key.clone()));
            }
            entries.push(key.clone());
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for AssetManifest {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(Into::into).collect(),
        }
    }
}
