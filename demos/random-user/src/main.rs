//! Random user demo
//!
//! Drives the request controller against the randomuser.me API: one
//! automatically triggered request, one manual trigger with an extra payload,
//! and a final dump of the Prometheus metrics.
//!
//! # Running the Demo
//!
//! ```bash
//! RUST_LOG=random_user=info,composable_request_runtime=debug cargo run -p random-user
//! ```
//!
//! Set `RANDOM_USER_URL` to point at another server with the same API.

#![allow(missing_docs)]

use anyhow::Context;
use composable_request_core::{
    GlobalConfig, HttpMethod, Payload, RequestDescription, RequestOptions, ViewState,
};
use composable_request_reqwest::ReqwestClient;
use composable_request_runtime::metrics::PrometheusMetrics;
use composable_request_runtime::{RequestController, RequestHandle};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_BASE_URL: &str = "https://randomuser.me";

#[derive(Debug, Clone, Deserialize)]
struct Name {
    first: String,
    last: String,
}

#[derive(Debug, Clone, Deserialize)]
struct User {
    name: Name,
    email: String,
}

type Users = Vec<User>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "random_user=info,composable_request_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut metrics = PrometheusMetrics::new();
    metrics.install().context("installing metrics recorder")?;

    let base_url =
        std::env::var("RANDOM_USER_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    tracing::info!(%base_url, "Starting random user demo");

    // randomuser.me has no `code` field; an `error` field marks a failure
    let config = GlobalConfig::new()
        .with_default_options(
            RequestOptions::new()
                .with_base_url(base_url)
                .with_method(HttpMethod::Get)
                .with_header("accept", "application/json"),
        )
        .with_classify_error(|response| response.body.get("error").is_some())
        .with_format_response(|response| response.body["results"].clone())
        .with_on_logical_error(|response, merged| {
            tracing::error!(url = %merged.url, body = %response.body, "API reported an error");
        })
        .with_on_transport_error(|error| {
            tracing::error!(%error, "Could not reach the API");
        });

    let controller = RequestController::new(Arc::new(ReqwestClient::new()), config);

    println!("=== Automatic trigger ===");
    let (state, users) = controller
        .use_request::<Users>(
            RequestDescription::new("/api/")
                .with_data("results", 3)
                .with_data("inc", "name,email"),
        )
        .await;
    println!("State right after use_request: loading={}", state.loading);
    print_state(&wait_for_settlement(&users).await);

    println!("\n=== Manual trigger with extra payload ===");
    let extra: Payload = [("results".to_string(), json!(5)), ("nat".to_string(), json!("fr"))]
        .into_iter()
        .collect();
    match users.trigger(Some(extra)).await {
        Ok(response) => println!("HTTP {}", response.status),
        Err(error) => println!("Request failed: {error}"),
    }
    print_state(&users.view_state().await);

    if let Some(scrape) = metrics.render() {
        println!("\n=== Metrics ===\n{scrape}");
    }

    Ok(())
}

async fn wait_for_settlement(handle: &RequestHandle<Users>) -> ViewState<Users> {
    let mut transitions = handle.subscribe();
    while handle.state(|s| s.loading).await {
        if transitions.recv().await.is_err() {
            break;
        }
    }
    handle.view_state().await
}

fn print_state(state: &ViewState<Users>) {
    println!("loading={} error={}", state.loading, state.error);
    for user in state.data.iter().flatten() {
        println!("  {} {} <{}>", user.name.first, user.name.last, user.email);
    }
}
