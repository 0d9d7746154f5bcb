use std::net::SocketAddr;
use std::sync::Arc;
use lambda_http::{run, Error};
use tracing::info;
use book_api::catalog::controller::router;
use book_api::core::clock::SystemClock;
use book_api::core::controller::AppState;
use book_api::core::domain::Configuration;
use book_api::utils::logging::setup_tracing;

// See https://docs.aws.amazon.com/lambda/latest/dg/lambda-rust.html
// https://docs.aws.amazon.com/lambda/latest/dg/rust-http-events.html

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Configuration::from_env()?;
    setup_tracing(config.log_level.as_str());

    let lambda = std::env::var("AWS_LAMBDA_RUNTIME_API").is_ok();
    let bind_address = config.bind_address.clone();
    info!(name = config.name.as_str(), store = %config.store, lambda, "starting book service");
    let state = AppState::build(config, Arc::new(SystemClock)).await?;

    if lambda {
        run(router(state)).await
    } else {
        let addr: SocketAddr = bind_address.parse()?;
        info!("listening on {}", addr);
        axum::Server::bind(&addr).serve(router(state).into_make_service()).await?;
        Ok(())
    }
}
