mod app;
mod commands;
mod config;
mod endpoint;
mod logging;
mod outcome;
mod render;
mod sink;
mod trigger;
mod ui;

#[tokio::main]
async fn main() {
    if let Err(e) = app::run().await {
        tracing::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
