use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use ui_assets_core::contract::CallbackResponse;

use crate::adapters::run_blocking;

/// Delivers the terminal status of an invocation to CloudFormation.
pub trait CallbackSender {
    fn send(&self, response_url: &str, response: &CallbackResponse) -> Result<(), String>;
}

/// Builds the `PUT` CloudFormation expects on the pre-signed response URL.
///
/// The pre-signed URL is signed without a content type, so the header must
/// be present and empty.
pub fn build_callback_request(
    client: &reqwest::Client,
    response_url: &str,
    response: &CallbackResponse,
) -> Result<reqwest::Request, String> {
    let body = serde_json::to_vec(response)
        .map_err(|error| format!("failed to serialize callback response: {error}"))?;

    client
        .put(response_url)
        .header(CONTENT_TYPE, "")
        .header(CONTENT_LENGTH, body.len())
        .body(body)
        .build()
        .map_err(|error| format!("invalid callback request: {error}"))
}

#[derive(Debug, Clone, Default)]
pub struct HttpCallbackSender {
    client: reqwest::Client,
}

impl HttpCallbackSender {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl CallbackSender for HttpCallbackSender {
    fn send(&self, response_url: &str, response: &CallbackResponse) -> Result<(), String> {
        let request = build_callback_request(&self.client, response_url, response)?;
        let reply = run_blocking(self.client.execute(request))
            .map_err(|error| format!("failed to send callback: {error}"))?;

        let status = reply.status();
        tracing::info!(
            component = "callback",
            status_code = status.as_u16(),
            status_text = status.canonical_reason().unwrap_or(""),
            "callback delivered"
        );
        if status.is_success() {
            Ok(())
        } else {
            Err(format!("callback rejected with status {status}"))
        }
    }
}
