use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use ui_assets_lambda::adapters::callback::HttpCallbackSender;
use ui_assets_lambda::adapters::s3::S3ObjectStore;
use ui_assets_lambda::handlers::dispatch::{Dispatcher, InvocationContext};
use ui_assets_lambda::settings::DeployerSettings;
use ui_assets_lambda::telemetry::init_tracing;

struct RuntimeDependencies {
    store: S3ObjectStore,
    callback: HttpCallbackSender,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<Value, Error> {
    let settings = DeployerSettings::from_env();
    let context = InvocationContext {
        log_stream_name: log_stream_name(&event.context),
    };

    let dispatcher = Dispatcher {
        store: &deps.store,
        callback: &deps.callback,
        settings: &settings,
    };
    let response = dispatcher.handle(event.payload, &context)?;
    Ok(serde_json::to_value(response)?)
}

fn log_stream_name(context: &lambda_runtime::Context) -> String {
    let from_context = context.env_config.log_stream.clone();
    if from_context.is_empty() {
        std::env::var("AWS_LAMBDA_LOG_STREAM_NAME").unwrap_or_default()
    } else {
        from_context
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let deps = RuntimeDependencies {
        store: S3ObjectStore::new(aws_sdk_s3::Client::new(&aws_config)),
        callback: HttpCallbackSender::new(reqwest::Client::new()),
    };

    lambda_runtime::run(service_fn(|event| handle_request(event, &deps))).await
}
