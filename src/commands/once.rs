//! Single non-interactive trigger with line output.

use std::sync::Arc;

use crate::config::MelodyqConfig;
use crate::endpoint::HttpEndpoint;
use crate::sink::StdoutSink;
use crate::trigger::{RecordingTrigger, TriggerEvent};

/// Fires one trigger, prints every region update to stdout and waits for the result.
///
/// Analysis failures are shown as status text like any other outcome and do not
/// make the command fail.
///
/// # Errors
/// - If the HTTP client cannot be built
pub async fn handle_once(config: &MelodyqConfig) -> Result<(), anyhow::Error> {
    tracing::info!("=== melodyq Once ===");

    let endpoint = HttpEndpoint::new(&config.server)?;
    tracing::info!("Analysis endpoint: {}", endpoint.url());

    let recording_trigger = RecordingTrigger::new(Arc::new(endpoint), Arc::new(StdoutSink::new()));
    let state = recording_trigger.fire(TriggerEvent).await;

    tracing::debug!("Single trigger ended in {state}");
    Ok(())
}
