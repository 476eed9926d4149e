//! The record trigger: one user action, one analysis request, one render.
//!
//! A trigger immediately shows the in-progress text, then waits for the endpoint
//! and writes the terminal state to the sink. Triggers are not serialized: firing
//! again while a request is pending starts a second request, and whichever
//! finishes last owns the regions.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

use crate::endpoint::AnalysisEndpoint;
use crate::render::{self, TerminalState};
use crate::sink::UiSink;

/// How long a source may block waiting for input before the loop gets control back.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A user-initiated request to record and analyse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEvent;

/// What a trigger source produced during one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSignal {
    Trigger(TriggerEvent),
    /// Nothing happened within the timeout
    Idle,
    /// The source is done; no more triggers will come
    Closed,
}

/// Emits trigger events.
pub trait TriggerSource {
    /// Waits up to `timeout` for the next signal.
    ///
    /// # Errors
    /// - If the underlying input cannot be read
    fn poll_trigger(&mut self, timeout: Duration) -> anyhow::Result<SourceSignal>;
}

/// Binds an analysis endpoint to a UI sink.
pub struct RecordingTrigger<E, S> {
    endpoint: Arc<E>,
    sink: Arc<S>,
}

impl<E, S> Clone for RecordingTrigger<E, S> {
    fn clone(&self) -> Self {
        Self {
            endpoint: Arc::clone(&self.endpoint),
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<E, S> RecordingTrigger<E, S>
where
    E: AnalysisEndpoint + 'static,
    S: UiSink + 'static,
{
    pub fn new(endpoint: Arc<E>, sink: Arc<S>) -> Self {
        Self { endpoint, sink }
    }

    /// Runs one full cycle and returns the state it ended in.
    pub async fn fire(&self, event: TriggerEvent) -> TerminalState {
        self.begin(event);
        self.complete().await
    }

    /// Shows the in-progress text and clears the results, whatever was shown before.
    pub fn begin(&self, _event: TriggerEvent) {
        tracing::info!("Trigger received, requesting analysis");
        self.sink.show(&render::in_progress());
    }

    /// Issues the request and renders its outcome. Never fails: every error ends
    /// up as status text.
    pub async fn complete(&self) -> TerminalState {
        let result = self.endpoint.process_audio().await;
        let (state, shown) = render::outcome(&result);

        match &result {
            Ok(_) => tracing::info!("Analysis finished: {state}"),
            Err(e) => tracing::warn!("Analysis request failed: {e}"),
        }
        if state == TerminalState::SuccessError {
            let status = &shown.status;
            tracing::warn!("Analysis service reported an error: {status}");
        }

        // Only the regions a state owns are written; the rest keep what `begin` left.
        self.sink.set_status(&shown.status);
        if state == TerminalState::SuccessWithResults {
            self.sink.set_results(&shown.results);
            self.sink.set_matches(&shown.matches);
        }

        state
    }
}

/// Pulls events from `source` until it closes, starting one independent cycle per
/// trigger. `on_tick` runs after every poll (the screen redraws there).
///
/// Returns the cycles still in flight so the caller can wait for or drop them.
///
/// # Errors
/// - If the source fails to poll
/// - If `on_tick` fails
pub async fn drive<Src, E, S, F>(
    source: &mut Src,
    trigger: &RecordingTrigger<E, S>,
    mut on_tick: F,
) -> anyhow::Result<JoinSet<TerminalState>>
where
    Src: TriggerSource,
    E: AnalysisEndpoint + 'static,
    S: UiSink + 'static,
    F: FnMut() -> anyhow::Result<()>,
{
    let mut in_flight = JoinSet::new();

    loop {
        match source.poll_trigger(POLL_INTERVAL)? {
            SourceSignal::Trigger(event) => {
                trigger.begin(event);
                let cycle = trigger.clone();
                in_flight.spawn(async move { cycle.complete().await });
            }
            SourceSignal::Idle => {}
            SourceSignal::Closed => break,
        }

        on_tick()?;

        while let Some(finished) = in_flight.try_join_next() {
            if let Err(e) = finished {
                tracing::error!("Analysis task ended abnormally: {e}");
            }
        }

        // Lets pending cycles make progress on a single-threaded runtime.
        tokio::task::yield_now().await;
    }

    Ok(in_flight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::RequestOutcome;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    /// Records every write so tests can check ordering.
    #[derive(Default)]
    struct RecordingSink {
        writes: Mutex<Vec<(&'static str, String)>>,
    }

    impl RecordingSink {
        fn writes(&self) -> Vec<(&'static str, String)> {
            self.writes.lock().unwrap().clone()
        }

        fn last(&self, region: &str) -> Option<String> {
            self.writes()
                .into_iter()
                .rev()
                .find(|(r, _)| *r == region)
                .map(|(_, text)| text)
        }
    }

    impl UiSink for RecordingSink {
        fn set_status(&self, text: &str) {
            self.writes.lock().unwrap().push(("status", text.to_string()));
        }

        fn set_results(&self, text: &str) {
            self.writes.lock().unwrap().push(("results", text.to_string()));
        }

        fn set_matches(&self, lines: &[String]) {
            self.writes.lock().unwrap().push(("matches", lines.join("|")));
        }
    }

    /// Emits exactly one trigger, then closes.
    #[derive(Default)]
    struct OneShotSource {
        fired: bool,
    }

    impl TriggerSource for OneShotSource {
        fn poll_trigger(&mut self, _timeout: Duration) -> anyhow::Result<SourceSignal> {
            if self.fired {
                Ok(SourceSignal::Closed)
            } else {
                self.fired = true;
                Ok(SourceSignal::Trigger(TriggerEvent))
            }
        }
    }

    /// Answers each request with the next scripted result.
    struct ScriptedEndpoint {
        replies: Mutex<VecDeque<oneshot::Receiver<anyhow::Result<RequestOutcome>>>>,
    }

    impl ScriptedEndpoint {
        fn immediate(replies: Vec<anyhow::Result<RequestOutcome>>) -> Self {
            let receivers = replies
                .into_iter()
                .map(|reply| {
                    let (tx, rx) = oneshot::channel();
                    tx.send(reply).ok();
                    rx
                })
                .collect();
            Self {
                replies: Mutex::new(receivers),
            }
        }

        fn gated(count: usize) -> (Self, Vec<oneshot::Sender<anyhow::Result<RequestOutcome>>>) {
            let (senders, receivers): (Vec<_>, VecDeque<_>) =
                (0..count).map(|_| oneshot::channel()).unzip();
            let endpoint = Self {
                replies: Mutex::new(receivers),
            };
            (endpoint, senders)
        }

        /// Replies not yet claimed by a request.
        fn unclaimed(&self) -> usize {
            self.replies.lock().unwrap().len()
        }

        /// Yields until only `count` replies are left unclaimed.
        async fn wait_for_unclaimed(&self, count: usize) {
            while self.unclaimed() > count {
                tokio::task::yield_now().await;
            }
        }
    }

    #[async_trait]
    impl AnalysisEndpoint for ScriptedEndpoint {
        async fn process_audio(&self) -> anyhow::Result<RequestOutcome> {
            let reply = self.replies.lock().unwrap().pop_front();
            match reply {
                Some(rx) => rx.await.unwrap_or_else(|_| Err(anyhow::anyhow!("script dropped"))),
                None => Err(anyhow::anyhow!("no scripted reply")),
            }
        }
    }

    fn outcome(value: serde_json::Value) -> anyhow::Result<RequestOutcome> {
        Ok(serde_json::from_value(value).unwrap())
    }

    fn trigger_with(
        replies: Vec<anyhow::Result<RequestOutcome>>,
    ) -> (RecordingTrigger<ScriptedEndpoint, RecordingSink>, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let trigger = RecordingTrigger::new(
            Arc::new(ScriptedEndpoint::immediate(replies)),
            Arc::clone(&sink),
        );
        (trigger, sink)
    }

    #[tokio::test]
    async fn test_begin_shows_progress_and_clears_results() {
        let (trigger, sink) = trigger_with(vec![]);
        sink.set_status("Processing completed!");
        sink.set_results("Tone intervals: 1, 2");

        sink.set_matches(&["Ode to Joy".to_string()]);

        trigger.begin(TriggerEvent);

        assert_eq!(sink.last("status").as_deref(), Some("Recording... Please wait."));
        assert_eq!(sink.last("results").as_deref(), Some(""));
        assert_eq!(sink.last("matches").as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_fire_with_intervals() {
        let (trigger, sink) = trigger_with(vec![outcome(json!({"success": true, "tone_intervals": [1, 2, 3]}))]);

        let state = trigger.fire(TriggerEvent).await;

        assert_eq!(state, TerminalState::SuccessWithResults);
        assert_eq!(
            sink.writes(),
            vec![
                ("status", "Recording... Please wait.".to_string()),
                ("results", String::new()),
                ("matches", String::new()),
                ("status", "Processing completed!".to_string()),
                ("results", "Tone intervals: 1, 2, 3".to_string()),
                ("matches", String::new()),
            ]
        );
    }

    #[tokio::test]
    async fn test_fire_without_intervals_only_writes_status() {
        let (trigger, sink) = trigger_with(vec![outcome(
            json!({"success": true, "tone_intervals": [], "message": "nothing heard"}),
        )]);

        let state = trigger.fire(TriggerEvent).await;

        assert_eq!(state, TerminalState::SuccessNoResults);
        assert_eq!(sink.writes().len(), 4);
        assert_eq!(sink.last("status").as_deref(), Some("nothing heard"));
        assert_eq!(sink.last("results").as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_fire_application_error() {
        let (trigger, sink) = trigger_with(vec![outcome(json!({"success": false, "error": "mic unavailable"}))]);

        assert_eq!(trigger.fire(TriggerEvent).await, TerminalState::SuccessError);
        assert_eq!(sink.last("status").as_deref(), Some("Error: mic unavailable"));
    }

    #[tokio::test]
    async fn test_fire_transport_failure() {
        let (trigger, sink) = trigger_with(vec![Err(anyhow::anyhow!("timeout"))]);

        assert_eq!(trigger.fire(TriggerEvent).await, TerminalState::TransportFailure);
        assert_eq!(sink.last("status").as_deref(), Some("Error: timeout"));
        assert_eq!(sink.last("results").as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_refire_resets_previous_results() {
        let (trigger, sink) = trigger_with(vec![
            outcome(json!({"success": true, "tone_intervals": [1]})),
            outcome(json!({"success": true, "tone_intervals": [1]})),
        ]);

        trigger.fire(TriggerEvent).await;
        let first = (sink.last("status"), sink.last("results"));
        trigger.fire(TriggerEvent).await;
        let second = (sink.last("status"), sink.last("results"));

        assert_eq!(first, second);
        assert_eq!(second.1.as_deref(), Some("Tone intervals: 1"));
    }

    #[tokio::test]
    async fn test_songs_cleared_by_later_outcomes() {
        let (trigger, sink) = trigger_with(vec![
            outcome(json!({
                "success": true,
                "tone_intervals": [1],
                "songs": [{"song_id": 3, "title": "Ode to Joy", "audio_url": "http://s/3.mp3"}]
            })),
            outcome(json!({"success": true, "tone_intervals": []})),
            outcome(json!({"success": false, "error": "mic unavailable"})),
            Err(anyhow::anyhow!("timeout")),
        ]);

        assert_eq!(trigger.fire(TriggerEvent).await, TerminalState::SuccessWithResults);
        assert_eq!(sink.last("matches").as_deref(), Some("Ode to Joy (http://s/3.mp3)"));

        for expected in [
            TerminalState::SuccessNoResults,
            TerminalState::SuccessError,
            TerminalState::TransportFailure,
        ] {
            assert_eq!(trigger.fire(TriggerEvent).await, expected);
            assert_eq!(sink.last("matches").as_deref(), Some(""));
            assert_eq!(sink.last("results").as_deref(), Some(""));
        }
    }

    #[tokio::test]
    async fn test_overlapping_cycles_last_finisher_wins() {
        let (endpoint, mut senders) = ScriptedEndpoint::gated(2);
        let endpoint = Arc::new(endpoint);
        let sink = Arc::new(RecordingSink::default());
        let trigger = RecordingTrigger::new(Arc::clone(&endpoint), Arc::clone(&sink));

        let second_reply = senders.pop().unwrap();
        let first_reply = senders.pop().unwrap();

        // Both cycles claim their request before either reply arrives.
        trigger.begin(TriggerEvent);
        let first_cycle = trigger.clone();
        let first = tokio::spawn(async move { first_cycle.complete().await });
        endpoint.wait_for_unclaimed(1).await;

        trigger.begin(TriggerEvent);
        let second_cycle = trigger.clone();
        let second = tokio::spawn(async move { second_cycle.complete().await });
        endpoint.wait_for_unclaimed(0).await;

        second_reply
            .send(outcome(json!({"success": false, "error": "second"})))
            .ok();
        assert_eq!(second.await.unwrap(), TerminalState::SuccessError);
        assert_eq!(sink.last("status").as_deref(), Some("Error: second"));

        first_reply
            .send(outcome(json!({"success": false, "error": "first"})))
            .ok();
        assert_eq!(first.await.unwrap(), TerminalState::SuccessError);
        assert_eq!(sink.last("status").as_deref(), Some("Error: first"));
    }

    #[tokio::test]
    async fn test_drive_one_shot() {
        let (trigger, sink) = trigger_with(vec![outcome(json!({"success": true, "tone_intervals": [0.5]}))]);
        let mut source = OneShotSource::default();
        let mut ticks = 0;

        let mut in_flight = drive(&mut source, &trigger, || {
            ticks += 1;
            Ok(())
        })
        .await
        .unwrap();
        while let Some(state) = in_flight.join_next().await {
            assert_eq!(state.unwrap(), TerminalState::SuccessWithResults);
        }

        assert_eq!(ticks, 1);
        assert_eq!(sink.last("results").as_deref(), Some("Tone intervals: 0.5"));
    }

    #[tokio::test]
    async fn test_drive_stops_on_tick_error() {
        let (trigger, _sink) = trigger_with(vec![Err(anyhow::anyhow!("unused"))]);
        let mut source = OneShotSource::default();

        let result = drive(&mut source, &trigger, || Err(anyhow::anyhow!("draw failed"))).await;
        assert!(result.is_err());
    }
}
