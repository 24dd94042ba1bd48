use std::path::PathBuf;

use ui_assets_core::manifest::MANIFEST_FILE_NAME;
use ui_assets_core::runtime_config::{RuntimeConfigBundle, RuntimeConfigResolution};

/// Overrides the location of the bundled asset manifest.
pub const MANIFEST_PATH_ENV: &str = "UI_MANIFEST_PATH";

/// Per-invocation configuration read from the process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployerSettings {
    pub manifest_path: PathBuf,
    pub runtime_config: RuntimeConfigResolution,
}

impl DeployerSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let manifest_path = lookup(MANIFEST_PATH_ENV)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".").join(MANIFEST_FILE_NAME));

        Self {
            manifest_path,
            runtime_config: RuntimeConfigBundle::resolve(&lookup),
        }
    }
}
