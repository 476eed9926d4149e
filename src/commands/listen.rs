//! Interactive trigger screen.
//!
//! Shows the status and results regions full-screen and starts one analysis cycle
//! per key press until the user quits.

use std::sync::Arc;

use crate::config::MelodyqConfig;
use crate::endpoint::HttpEndpoint;
use crate::sink::SharedDisplay;
use crate::trigger::{self, RecordingTrigger};
use crate::ui::{KeyboardSource, TriggerScreen};

/// Runs the interactive screen against the configured service.
///
/// Requests still pending when the user quits are abandoned.
///
/// # Errors
/// - If the terminal cannot be set up or drawn
/// - If the HTTP client cannot be built
pub async fn handle_listen(config: &MelodyqConfig) -> Result<(), anyhow::Error> {
    tracing::info!("=== melodyq Listen Started ===");

    let endpoint = match HttpEndpoint::new(&config.server) {
        Ok(endpoint) => endpoint,
        Err(e) => {
            tracing::error!("Failed to set up endpoint: {e}");
            let mut screen = TriggerScreen::new(&config.server.endpoint_url())?;
            screen.show_error(&format!("Setup Error:\n\n{e}"))?;
            screen.cleanup()?;
            return Err(e);
        }
    };
    tracing::info!("Analysis endpoint: {}", endpoint.url());

    let mut screen = TriggerScreen::new(endpoint.url())?;
    let display = SharedDisplay::new();
    let recording_trigger = RecordingTrigger::new(Arc::new(endpoint), Arc::new(display.clone()));
    let mut source = KeyboardSource::new();

    let in_flight = trigger::drive(&mut source, &recording_trigger, || {
        screen.draw(&display.snapshot())
    })
    .await;

    screen.cleanup()?;

    let in_flight = in_flight?;
    if !in_flight.is_empty() {
        tracing::info!("Abandoning {} pending request(s)", in_flight.len());
    }

    tracing::info!("=== melodyq Listen Finished ===");
    Ok(())
}
