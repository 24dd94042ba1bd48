use serde::{Deserialize, Serialize};

/// Manifest entry whose destination copy is replaced with the runtime bundle.
pub const RUNTIME_CONFIG_FILE: &str = "runtimeConfig.json";

pub const API_ENDPOINT_ENV: &str = "ApiEndpoint";
pub const AWS_REGION_ENV: &str = "AwsRegion";
pub const USER_POOL_ID_ENV: &str = "UserPoolId";
pub const USER_POOL_CLIENT_ID_ENV: &str = "PoolClientId";
pub const DATA_BUCKET_NAME_ENV: &str = "DataBucketName";

/// Values the website reads at startup from `runtimeConfig.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuntimeConfigBundle {
    #[serde(rename = "API_ENDPOINT")]
    pub api_endpoint: String,
    #[serde(rename = "AWS_REGION")]
    pub aws_region: String,
    #[serde(rename = "USER_POOL_ID")]
    pub user_pool_id: String,
    #[serde(rename = "USER_POOL_CLIENT_ID")]
    pub user_pool_client_id: String,
    #[serde(rename = "DATA_BUCKET_NAME")]
    pub data_bucket_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeConfigResolution {
    Complete(RuntimeConfigBundle),
    /// At least one variable is unset or blank; substitution is skipped.
    Incomplete { missing: Vec<&'static str> },
}

impl RuntimeConfigResolution {
    pub fn bundle(&self) -> Option<&RuntimeConfigBundle> {
        match self {
            Self::Complete(bundle) => Some(bundle),
            Self::Incomplete { .. } => None,
        }
    }
}

impl RuntimeConfigBundle {
    /// Resolves the bundle through `lookup`, normally `std::env::var`.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> RuntimeConfigResolution {
        let mut missing = Vec::new();
        let mut read = |name: &'static str| match lookup(name) {
            Some(value) if !value.trim().is_empty() => value,
            _ => {
                missing.push(name);
                String::new()
            }
        };

        let bundle = Self {
            api_endpoint: read(API_ENDPOINT_ENV),
            aws_region: read(AWS_REGION_ENV),
            user_pool_id: read(USER_POOL_ID_ENV),
            user_pool_client_id: read(USER_POOL_CLIENT_ID_ENV),
            data_bucket_name: read(DATA_BUCKET_NAME_ENV),
        };

        if missing.is_empty() {
            RuntimeConfigResolution::Complete(bundle)
        } else {
            RuntimeConfigResolution::Incomplete { missing }
        }
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
