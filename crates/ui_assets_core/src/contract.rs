use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const UNEXPECTED_EVENT_MESSAGE: &str = "Unexpected event received from CloudFormation";
pub const MISSING_PROPERTIES_MESSAGE: &str =
    "Failed to retrieve required values from the CloudFormation event";
pub const RUNTIME_CONFIG_WRITE_FAILED_MESSAGE: &str =
    "Failed to write file to s3 after variable replacement";
pub const CREATE_SUCCEEDED_MESSAGE: &str = "Resource creation successful!";
pub const DELETE_SUCCEEDED_MESSAGE: &str = "Resource deletion successful!";
pub const REASON_PREFIX: &str = "See the details in CloudWatch Log Stream: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestType {
    Create,
    Update,
    Delete,
    Other(String),
}

impl RequestType {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Create" => Self::Create,
            "Update" => Self::Update,
            "Delete" => Self::Delete,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Other(raw) => raw,
        }
    }
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Properties configured on the custom resource in the stack template.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_code_bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_code_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_buckets: Option<Vec<String>>,
}

/// A CloudFormation custom-resource lifecycle event.
///
/// Every field is optional on the wire so that an incomplete event still
/// deserializes and can be answered with a FAILED callback.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceEvent {
    #[serde(default)]
    pub request_type: Option<String>,
    #[serde(rename = "ResponseURL", default)]
    pub response_url: Option<String>,
    #[serde(default)]
    pub stack_id: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub logical_resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub resource_properties: ResourceProperties,
}

impl CustomResourceEvent {
    /// Recovers the callback URL and correlation identifiers from an event
    /// that failed to deserialize as a whole.
    pub fn salvage(raw: &Value) -> Self {
        let text = |field: &str| raw.get(field).and_then(Value::as_str).map(str::to_string);
        Self {
            request_type: text("RequestType"),
            response_url: text("ResponseURL"),
            stack_id: text("StackId"),
            request_id: text("RequestId"),
            logical_resource_id: text("LogicalResourceId"),
            physical_resource_id: text("PhysicalResourceId"),
            resource_type: text("ResourceType"),
            resource_properties: ResourceProperties::default(),
        }
    }

    pub fn request_type(&self) -> Option<RequestType> {
        self.request_type.as_deref().map(RequestType::parse)
    }

    pub fn callback_url(&self) -> Option<&str> {
        self.response_url
            .as_deref()
            .filter(|value| !value.trim().is_empty())
    }
}

/// Source and destination of an asset deployment, validated from
/// [`ResourceProperties`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyTarget {
    pub source_bucket: String,
    pub source_prefix: String,
    pub destination_bucket: String,
}

impl ResourceProperties {
    pub fn copy_target(&self) -> Result<CopyTarget, ValidationError> {
        Ok(CopyTarget {
            source_bucket: required(&self.website_code_bucket, "WebsiteCodeBucket")?,
            source_prefix: required(&self.website_code_prefix, "WebsiteCodePrefix")?,
            destination_bucket: required(&self.deployment_bucket, "DeploymentBucket")?,
        })
    }

    pub fn purge_targets(&self) -> Result<&[String], ValidationError> {
        self.ui_buckets
            .as_deref()
            .ok_or_else(|| ValidationError::new("UiBuckets is required"))
    }
}

/// Blank values count as missing.
fn required(value: &Option<String>, name: &str) -> Result<String, ValidationError> {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(ValidationError::new(format!("{name} is required"))),
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallbackStatus {
    Success,
    Failed,
}

impl CallbackStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallbackData {
    #[serde(rename = "Message")]
    pub message: String,
}

/// Terminal status reported to the CloudFormation callback URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CallbackResponse {
    pub status: CallbackStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub data: CallbackData,
}

impl CallbackResponse {
    pub fn new(
        event: &CustomResourceEvent,
        log_stream_name: &str,
        status: CallbackStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            reason: format!("{REASON_PREFIX}{log_stream_name}"),
            physical_resource_id: log_stream_name.to_string(),
            stack_id: event.stack_id.clone().unwrap_or_default(),
            request_id: event.request_id.clone().unwrap_or_default(),
            logical_resource_id: event.logical_resource_id.clone().unwrap_or_default(),
            data: CallbackData {
                message: message.into(),
            },
        }
    }

    pub fn success(
        event: &CustomResourceEvent,
        log_stream_name: &str,
        message: impl Into<String>,
    ) -> Self {
        Self::new(event, log_stream_name, CallbackStatus::Success, message)
    }

    pub fn failed(
        event: &CustomResourceEvent,
        log_stream_name: &str,
        message: impl Into<String>,
    ) -> Self {
        Self::new(event, log_stream_name, CallbackStatus::Failed, message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}
