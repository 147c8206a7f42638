use aws_config::BehaviorVersion;
use lambda_http::{run, service_fn, Error};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod event_handler;
mod record;
mod request_handler;
mod store;
mod writer;

#[cfg(test)]
mod test_support;

use config::Env;
use event_handler::function_handler;
use store::DynamoStore;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let store = DynamoStore::new(aws_sdk_dynamodb::Client::new(&config));

    run(service_fn(|event| function_handler(&store, Env, event))).await
}
