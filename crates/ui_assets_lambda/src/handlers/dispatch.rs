use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};
use ui_assets_core::contract::{
    CallbackResponse, CustomResourceEvent, RequestType, CREATE_SUCCEEDED_MESSAGE,
    DELETE_SUCCEEDED_MESSAGE, UNEXPECTED_EVENT_MESSAGE,
};

use crate::adapters::callback::CallbackSender;
use crate::adapters::object_store::ObjectStore;
use crate::handlers::copy::deploy_assets;
use crate::handlers::purge::handle_purge_request;
use crate::settings::DeployerSettings;

/// Details of the Lambda invocation echoed back to CloudFormation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    pub log_stream_name: String,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("event has no ResponseURL; status cannot be reported to CloudFormation")]
    MissingCallbackUrl,
    #[error("failed to deliver {status} callback: {message}")]
    Callback {
        status: &'static str,
        message: String,
    },
}

/// Routes one custom-resource lifecycle event and reports its outcome.
///
/// Exactly one callback is sent per event that carries a callback URL,
/// whatever happens while the operation runs.
pub struct Dispatcher<'a> {
    pub store: &'a dyn ObjectStore,
    pub callback: &'a dyn CallbackSender,
    pub settings: &'a DeployerSettings,
}

impl Dispatcher<'_> {
    pub fn handle(
        &self,
        raw: Value,
        context: &InvocationContext,
    ) -> Result<CallbackResponse, DispatchError> {
        let (event, malformed) = match CustomResourceEvent::deserialize(&raw) {
            Ok(event) => (event, None),
            Err(error) => (CustomResourceEvent::salvage(&raw), Some(error.to_string())),
        };

        let Some(response_url) = event.callback_url().map(str::to_string) else {
            error!(
                component = "dispatch",
                request_id = event.request_id.as_deref().unwrap_or(""),
                "event has no ResponseURL; no callback can be sent"
            );
            return Err(DispatchError::MissingCallbackUrl);
        };

        let response = match malformed {
            Some(message) => {
                error!(component = "dispatch", error = %message, "malformed lifecycle event");
                exception_response(&event, context, &format!("malformed event: {message}"))
            }
            None => self.respond(&event, context),
        };

        self.send(&response_url, response)
    }

    fn respond(
        &self,
        event: &CustomResourceEvent,
        context: &InvocationContext,
    ) -> CallbackResponse {
        match panic::catch_unwind(AssertUnwindSafe(|| self.run_operation(event, context))) {
            Ok(response) => response,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(component = "dispatch", error = %message, "operation panicked");
                exception_response(event, context, &message)
            }
        }
    }

    fn run_operation(
        &self,
        event: &CustomResourceEvent,
        context: &InvocationContext,
    ) -> CallbackResponse {
        let log_stream = context.log_stream_name.as_str();
        let Some(request_type) = event.request_type() else {
            return exception_response(event, context, "event has no RequestType");
        };

        info!(
            component = "dispatch",
            request_type = %request_type,
            request_id = event.request_id.as_deref().unwrap_or(""),
            stack_id = event.stack_id.as_deref().unwrap_or(""),
            logical_resource_id = event.logical_resource_id.as_deref().unwrap_or(""),
            "request received"
        );

        match request_type {
            RequestType::Create | RequestType::Update => {
                match deploy_assets(&event.resource_properties, self.settings, self.store) {
                    Ok(_) => CallbackResponse::success(event, log_stream, CREATE_SUCCEEDED_MESSAGE),
                    Err(error) => {
                        error!(component = "dispatch", error = %error, "asset deployment failed");
                        CallbackResponse::failed(event, log_stream, error.callback_message())
                    }
                }
            }
            RequestType::Delete => {
                let outcome = handle_purge_request(&event.resource_properties, self.store);
                match outcome {
                    Ok(_) => CallbackResponse::success(event, log_stream, DELETE_SUCCEEDED_MESSAGE),
                    Err(error) => {
                        error!(component = "dispatch", error = %error, "bucket purge failed");
                        CallbackResponse::failed(event, log_stream, error.callback_message())
                    }
                }
            }
            RequestType::Other(raw) => {
                warn!(component = "dispatch", request_type = %raw, "unexpected request type");
                CallbackResponse::failed(event, log_stream, UNEXPECTED_EVENT_MESSAGE)
            }
        }
    }

    fn send(
        &self,
        response_url: &str,
        response: CallbackResponse,
    ) -> Result<CallbackResponse, DispatchError> {
        info!(
            component = "dispatch",
            status = response.status.as_str(),
            message = %response.data.message,
            "sending callback"
        );
        self.callback
            .send(response_url, &response)
            .map_err(|message| {
                error!(component = "dispatch", error = %message, "callback delivery failed");
                DispatchError::Callback {
                    status: response.status.as_str(),
                    message,
                }
            })?;
        Ok(response)
    }
}

fn exception_response(
    event: &CustomResourceEvent,
    context: &InvocationContext,
    message: &str,
) -> CallbackResponse {
    CallbackResponse::failed(
        event,
        &context.log_stream_name,
        format!("Exception during processing: {message}"),
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}
