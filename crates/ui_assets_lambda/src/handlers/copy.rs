use thiserror::Error;
use tracing::{info, warn};
use ui_assets_core::contract::{
    CopyTarget, ResourceProperties, ValidationError, MISSING_PROPERTIES_MESSAGE,
    RUNTIME_CONFIG_WRITE_FAILED_MESSAGE, UNEXPECTED_EVENT_MESSAGE,
};
use ui_assets_core::manifest::{AssetManifest, ManifestError};
use ui_assets_core::runtime_config::{RuntimeConfigResolution, RUNTIME_CONFIG_FILE};
use ui_assets_core::storage_keys::source_object_key;

use crate::adapters::object_store::ObjectStore;
use crate::settings::DeployerSettings;

const RUNTIME_CONFIG_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("missing resource property: {0}")]
    MissingProperties(#[from] ValidationError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error("failed to copy '{source_key}' to '{destination_key}': {message}")]
    Copy {
        source_key: String,
        destination_key: String,
        message: String,
    },
    #[error("failed to serialize runtime configuration: {0}")]
    SerializeRuntimeConfig(#[source] serde_json::Error),
    #[error("failed to write '{key}' after variable replacement: {message}")]
    RuntimeConfigWrite { key: String, message: String },
}

impl CopyError {
    /// Message reported to CloudFormation; the detailed text is only logged.
    pub fn callback_message(&self) -> &'static str {
        match self {
            Self::MissingProperties(_) => MISSING_PROPERTIES_MESSAGE,
            Self::SerializeRuntimeConfig(_) | Self::RuntimeConfigWrite { .. } => {
                RUNTIME_CONFIG_WRITE_FAILED_MESSAGE
            }
            Self::Manifest(_) | Self::Copy { .. } => UNEXPECTED_EVENT_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopySummary {
    pub assets_copied: usize,
    pub runtime_config_replaced: bool,
}

/// Validates the resource properties, loads the bundled manifest, and copies
/// every listed asset into the deployment bucket.
pub fn deploy_assets(
    properties: &ResourceProperties,
    settings: &DeployerSettings,
    store: &dyn ObjectStore,
) -> Result<CopySummary, CopyError> {
    let target = properties.copy_target()?;
    let manifest = AssetManifest::load(&settings.manifest_path)?;
    copy_assets(&target, &manifest, &settings.runtime_config, store)
}

pub fn copy_assets(
    target: &CopyTarget,
    manifest: &AssetManifest,
    runtime_config: &RuntimeConfigResolution,
    store: &dyn ObjectStore,
) -> Result<CopySummary, CopyError> {
    let replacement = match runtime_config {
        RuntimeConfigResolution::Complete(bundle) => {
            let body = bundle
                .to_json_bytes()
                .map_err(CopyError::SerializeRuntimeConfig)?;
            Some(body)
        }
        RuntimeConfigResolution::Incomplete { missing } => {
            warn!(
                component = "copy",
                missing = ?missing,
                "runtime configuration incomplete; {RUNTIME_CONFIG_FILE} will be copied verbatim"
            );
            None
        }
    };

    info!(
        component = "copy",
        source_bucket = %target.source_bucket,
        source_prefix = %target.source_prefix,
        destination_bucket = %target.destination_bucket,
        assets = manifest.len(),
        "copying website assets"
    );

    let mut summary = CopySummary {
        assets_copied: 0,
        runtime_config_replaced: false,
    };

    for key in manifest.entries() {
        let source_key = source_object_key(&target.source_prefix, key);
        store
            .copy_object(
                &target.source_bucket,
                &source_key,
                &target.destination_bucket,
                key,
            )
            .map_err(|message| CopyError::Copy {
                source_key: format!("s3://{}/{source_key}", target.source_bucket),
                destination_key: format!("s3://{}/{key}", target.destination_bucket),
                message,
            })?;
        summary.assets_copied += 1;

        if key != RUNTIME_CONFIG_FILE {
            continue;
        }
        if let Some(body) = &replacement {
            store
                .put_object(
                    &target.destination_bucket,
                    key,
                    body,
                    RUNTIME_CONFIG_CONTENT_TYPE,
                )
                .map_err(|message| CopyError::RuntimeConfigWrite {
                    key: key.clone(),
                    message,
                })?;
            summary.runtime_config_replaced = true;
            info!(component = "copy", key = %key, "replaced runtime configuration");
        }
    }

    info!(
        component = "copy",
        assets_copied = summary.assets_copied,
        runtime_config_replaced = summary.runtime_config_replaced,
        "website assets copied"
    );
    Ok(summary)
}
