//! Ingestion job-dispatch core: broker client, wire envelope/task model,
//! client orchestrator, trace aggregator, and submission/fetch API.

mod app;
mod broker;
mod core;
mod error;
mod model;
mod orchestrator;
mod service;
mod trace;
mod utils;

use app::CoreApp;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let exit_code = CoreApp::run().await?;
    std::process::exit(exit_code);
}
