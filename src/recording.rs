//! Voice capture sessions.
//!
//! The device owns capture state: `start` fires one POST and returns, the
//! device stops on its own after `SilenceTimeout` of silence or
//! `MaxSpeechLength` in total. The client has no completion notification, so
//! [`CompletionPolicy`] makes the wait explicit: sleep for a fixed delay, or
//! poll the audio listing until the capture file shows up.

use std::time::Duration;

use crate::assets::{AssetEntry, AssetKind};
use crate::client::MistyClient;
use crate::defaults::{capture, endpoints, keys};
use crate::error::MistyError;
use crate::http::{ApiResponse, Params};

/// Parameters of one capture. `RequireKeyPhrase` is always sent as `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub file_name: String,
    pub max_speech_length_ms: u64,
    pub silence_timeout_ms: u64,
    pub overwrite_existing: bool,
}

impl Default for CaptureRequest {
    fn default() -> Self {
        Self {
            file_name: capture::FILE_NAME.to_string(),
            max_speech_length_ms: capture::MAX_SPEECH_LENGTH_MS,
            silence_timeout_ms: capture::SILENCE_TIMEOUT_MS,
            overwrite_existing: true,
        }
    }
}

impl CaptureRequest {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Default::default()
        }
    }

    pub fn with_max_speech_length_ms(mut self, ms: u64) -> Self {
        self.max_speech_length_ms = ms;
        self
    }

    pub fn with_silence_timeout_ms(mut self, ms: u64) -> Self {
        self.silence_timeout_ms = ms;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite_existing = overwrite;
        self
    }

    pub const fn max_speech_length(&self) -> Duration {
        Duration::from_millis(self.max_speech_length_ms)
    }

    /// Request body for the capture endpoint.
    pub fn to_params(&self) -> Params {
        Params::new()
            .with(keys::FILE_NAME, self.file_name.clone())
            .with("MaxSpeechLength", self.max_speech_length_ms)
            .with("SilenceTimeout", self.silence_timeout_ms)
            .with("OverwriteExisting", self.overwrite_existing)
            .with("RequireKeyPhrase", false)
    }
}

/// How to decide a capture has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionPolicy {
    /// Sleep for a fixed duration.
    FixedDelay(Duration),
    /// Poll the audio listing until the capture file appears.
    PollListing { interval: Duration, timeout: Duration },
}

impl CompletionPolicy {
    /// Fixed delay covering the longest possible capture plus a grace period.
    pub fn fixed_for(request: &CaptureRequest) -> Self {
        Self::FixedDelay(request.max_speech_length() + capture::COMPLETION_GRACE)
    }

    /// Listing poll bounded by the longest possible capture plus grace.
    pub fn poll_for(request: &CaptureRequest) -> Self {
        Self::PollListing {
            interval: capture::POLL_INTERVAL,
            timeout: request.max_speech_length() + capture::COMPLETION_GRACE,
        }
    }
}

/// How a wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The fixed delay elapsed; completion is assumed, not observed.
    Elapsed(Duration),
    /// The capture file was listed after `polls` listing requests.
    Appeared { polls: u32 },
    /// A file listed under the name before the start changed after `polls`
    /// listing requests.
    Replaced { polls: u32 },
    /// The name was already listed (or the listing was unreadable) and no
    /// change was seen; the full timeout elapsed, so the device has stopped on
    /// its own bounds but the listing never confirmed the new file.
    Unverified(Duration),
    /// The file never appeared before the timeout.
    TimedOut { polls: u32 },
}

impl CaptureOutcome {
    pub const fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
}

/// Start/stop/wait for voice captures on one device.
#[derive(Debug, Clone)]
pub struct RecordingController {
    client: MistyClient,
}

impl RecordingController {
    pub const fn new(client: MistyClient) -> Self {
        Self { client }
    }

    /// Ask the device to start capturing. Does not wait or verify.
    pub async fn start(&self, request: &CaptureRequest) -> Result<ApiResponse, MistyError> {
        tracing::info!(
            file = %request.file_name,
            max_speech_length_ms = request.max_speech_length_ms,
            silence_timeout_ms = request.silence_timeout_ms,
            "starting speech capture"
        );
        let response = self
            .client
            .post(endpoints::SPEECH_CAPTURE, Some(&request.to_params()))
            .await?;
        if !response.is_success() {
            tracing::warn!(status = response.status(), "capture start rejected");
        }
        Ok(response)
    }

    /// Ask the device to stop any capture. Valid with no capture running.
    pub async fn stop(&self) -> Result<ApiResponse, MistyError> {
        tracing::info!("stopping recording");
        let response = self.client.post(endpoints::RECORDING_STOP, None).await?;
        if !response.is_success() {
            tracing::warn!(status = response.status(), "recording stop rejected");
        }
        Ok(response)
    }

    /// Wait for `request`'s capture according to `policy`.
    ///
    /// Polling treats any entry listed under the capture name as done, so a
    /// file left by an earlier capture satisfies the first poll. [`record`]
    /// snapshots the listing before starting to rule that out.
    /// Listing failures while polling are logged and the poll continues.
    ///
    /// [`record`]: RecordingController::record
    pub async fn wait_for_completion(
        &self,
        request: &CaptureRequest,
        policy: CompletionPolicy,
    ) -> Result<CaptureOutcome, MistyError> {
        self.wait_from(request, policy, Baseline::Absent).await
    }

    /// Start a capture and wait for it. A rejected start is an error.
    ///
    /// With [`CompletionPolicy::PollListing`] the audio listing is read before
    /// the start. When the capture name is already listed, only a change of
    /// its entry counts as completion; an entry that never changes yields
    /// [`CaptureOutcome::Unverified`] after the full timeout.
    pub async fn record(
        &self,
        request: &CaptureRequest,
        policy: CompletionPolicy,
    ) -> Result<CaptureOutcome, MistyError> {
        let baseline = match policy {
            CompletionPolicy::FixedDelay(_) => Baseline::Absent,
            CompletionPolicy::PollListing { .. } => self.baseline(request).await,
        };
        let response = self.start(request).await?;
        if !response.is_success() {
            return Err(MistyError::rejection(response.status(), response.text()));
        }
        self.wait_from(request, policy, baseline).await
    }

    async fn baseline(&self, request: &CaptureRequest) -> Baseline {
        match self.client.assets(AssetKind::Audio).list().await {
            Ok(listing) => listing
                .entries()
                .iter()
                .find(|entry| entry.name() == request.file_name)
                .cloned()
                .map_or(Baseline::Absent, |entry| {
                    tracing::info!(file = %request.file_name, "capture name already listed before start");
                    Baseline::Present(entry)
                }),
            Err(e) => {
                tracing::warn!(err = %e, "listing before capture failed");
                Baseline::Unknown
            }
        }
    }

    async fn wait_from(
        &self,
        request: &CaptureRequest,
        policy: CompletionPolicy,
        baseline: Baseline,
    ) -> Result<CaptureOutcome, MistyError> {
        match policy {
            CompletionPolicy::FixedDelay(delay) => {
                tracing::info!(delay_ms = delay.as_millis() as u64, "waiting for capture to finish");
                tokio::time::sleep(delay).await;
                Ok(CaptureOutcome::Elapsed(delay))
            }
            CompletionPolicy::PollListing { timeout, .. } if baseline == Baseline::Unknown => {
                tracing::warn!(file = %request.file_name, timeout_ms = timeout.as_millis() as u64, "cannot observe completion, waiting for the timeout");
                tokio::time::sleep(timeout).await;
                Ok(CaptureOutcome::Unverified(timeout))
            }
            CompletionPolicy::PollListing { interval, timeout } => {
                let previous = match &baseline {
                    Baseline::Present(entry) => Some(entry),
                    _ => None,
                };
                self.poll_listing(request, interval, timeout, previous).await
            }
        }
    }

    async fn poll_listing(
        &self,
        request: &CaptureRequest,
        interval: Duration,
        timeout: Duration,
        previous: Option<&AssetEntry>,
    ) -> Result<CaptureOutcome, MistyError> {
        let deadline = tokio::time::Instant::now() + timeout;
        let audio = self.client.assets(AssetKind::Audio);
        let mut polls = 0u32;
        loop {
            polls += 1;
            match audio.list().await {
                Ok(listing) => {
                    let current = listing
                        .entries()
                        .iter()
                        .find(|entry| entry.name() == request.file_name);
                    match (current, previous) {
                        (Some(_), None) => {
                            tracing::info!(file = %request.file_name, polls, "capture file is available");
                            return Ok(CaptureOutcome::Appeared { polls });
                        }
                        (Some(entry), Some(old)) if entry != old => {
                            tracing::info!(file = %request.file_name, polls, "capture file was replaced");
                            return Ok(CaptureOutcome::Replaced { polls });
                        }
                        _ => {}
                    }
                }
                Err(e) => tracing::debug!(err = %e, "listing failed while polling"),
            }
            if tokio::time::Instant::now() + interval > deadline {
                if previous.is_some() {
                    tokio::time::sleep_until(deadline).await;
                    tracing::warn!(file = %request.file_name, polls, "listed entry never changed, assuming the capture finished");
                    return Ok(CaptureOutcome::Unverified(timeout));
                }
                tracing::warn!(file = %request.file_name, polls, "capture file did not appear in time");
                return Ok(CaptureOutcome::TimedOut { polls });
            }
            tokio::time::sleep(interval).await;
        }
    }
}

/// What the audio listing held under the capture name before the start.
#[derive(Debug, Clone, PartialEq)]
enum Baseline {
    Absent,
    Present(AssetEntry),
    /// The listing could not be read.
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::http::HttpMethod;
    use crate::testing::{FakeTransport, Reply};
    use serde_json::json;
    use std::sync::Arc;

    fn controller(transport: Arc<FakeTransport>) -> RecordingController {
        MistyClient::with_transport(ClientConfig::new("http://robot").unwrap(), transport)
            .unwrap()
            .recording()
    }

    #[test]
    fn capture_body_has_fixed_key_phrase_flag() {
        let body = CaptureRequest::new("x.wav")
            .with_max_speech_length_ms(10_000)
            .with_silence_timeout_ms(5_000)
            .to_params()
            .to_json();
        assert_eq!(
            body,
            json!({
                "FileName": "x.wav",
                "MaxSpeechLength": 10000,
                "SilenceTimeout": 5000,
                "OverwriteExisting": true,
                "RequireKeyPhrase": false
            })
        );
    }

    #[test]
    fn defaults() {
        let request = CaptureRequest::default();
        assert_eq!(request.file_name, "capture_Dialogue.wav");
        assert_eq!(
            CompletionPolicy::fixed_for(&request),
            CompletionPolicy::FixedDelay(Duration::from_millis(11_000))
        );
    }

    #[tokio::test]
    async fn start_posts_capture_and_stop_posts_no_body() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(Reply::json(200, json!({"result": true, "status": "Success"})));
        transport.push(Reply::json(200, json!({"result": true, "status": "Success"})));
        let ctl = controller(transport.clone());

        ctl.start(&CaptureRequest::new("x.wav").with_overwrite(false))
            .await
            .unwrap();
        ctl.stop().await.unwrap();

        let sent = transport.requests();
        assert_eq!(sent[0].method, HttpMethod::Post);
        assert_eq!(sent[0].url, "http://robot/api/audio/speech/capture");
        let body = sent[0].body.as_ref().unwrap();
        assert_eq!(body["OverwriteExisting"], json!(false));
        assert_eq!(body["RequireKeyPhrase"], json!(false));
        assert_eq!(sent[1].url, "http://robot/api/audio/recording/stop");
        assert!(sent[1].body.is_none());
    }

    #[tokio::test]
    async fn stop_returns_rejections_as_responses() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(Reply::text(400, "not recording"));
        let resp = controller(transport).stop().await.unwrap();
        assert_eq!(resp.status(), 400);
    }

    #[tokio::test(start_paused = true)]
    async fn fixed_delay_sleeps_for_the_delay() {
        let ctl = controller(Arc::new(FakeTransport::new()));
        let before = tokio::time::Instant::now();
        let outcome = ctl
            .wait_for_completion(
                &CaptureRequest::default(),
                CompletionPolicy::FixedDelay(Duration::from_secs(11)),
            )
            .await
            .unwrap();
        assert_eq!(outcome, CaptureOutcome::Elapsed(Duration::from_secs(11)));
        assert!(before.elapsed() >= Duration::from_secs(11));
    }

    #[tokio::test(start_paused = true)]
    async fn polling_tolerates_errors_until_file_appears() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(Reply::json(200, json!({"result": ["old.wav"]})));
        transport.push(Reply::text(500, "busy"));
        transport.push(Reply::json(200, json!({"result": [{"name": "x.wav"}]})));
        let ctl = controller(transport.clone());

        let outcome = ctl
            .wait_for_completion(
                &CaptureRequest::new("x.wav"),
                CompletionPolicy::PollListing {
                    interval: Duration::from_millis(500),
                    timeout: Duration::from_secs(10),
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome, CaptureOutcome::Appeared { polls: 3 });
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn polling_times_out() {
        let transport = Arc::new(FakeTransport::new());
        for _ in 0..10 {
            transport.push(Reply::json(200, json!([])));
        }
        let ctl = controller(transport);
        let outcome = ctl
            .wait_for_completion(
                &CaptureRequest::new("x.wav"),
                CompletionPolicy::PollListing {
                    interval: Duration::from_secs(1),
                    timeout: Duration::from_secs(3),
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome, CaptureOutcome::TimedOut { polls: 4 });
    }

    #[tokio::test]
    async fn record_fails_on_rejected_start() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(Reply::text(503, "busy"));
        let err = controller(transport.clone())
            .record(
                &CaptureRequest::default(),
                CompletionPolicy::FixedDelay(Duration::from_secs(60)),
            )
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn previously_listed_name_is_not_taken_as_done() {
        let transport = Arc::new(FakeTransport::new());
        let stale = json!({"result": ["capture_Dialogue.wav"], "status": "Success"});
        transport.push(Reply::json(200, stale.clone()));
        transport.push(Reply::json(200, json!({"result": true, "status": "Success"})));
        for _ in 0..40 {
            transport.push(Reply::json(200, stale.clone()));
        }
        let ctl = controller(transport.clone());
        let request = CaptureRequest::default();

        let before = tokio::time::Instant::now();
        let outcome = ctl
            .record(&request, CompletionPolicy::poll_for(&request))
            .await
            .unwrap();

        assert_eq!(outcome, CaptureOutcome::Unverified(Duration::from_secs(11)));
        assert!(before.elapsed() >= Duration::from_secs(11));
        let sent = transport.requests();
        assert_eq!(sent[0].method, HttpMethod::Get);
        assert_eq!(sent[0].url, "http://robot/api/audio/list");
        assert_eq!(sent[1].method, HttpMethod::Post);
        assert_eq!(sent[1].url, "http://robot/api/audio/speech/capture");
    }

    #[tokio::test(start_paused = true)]
    async fn changed_entry_counts_as_replaced() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(Reply::json(200, json!({"result": [{"name": "x.wav", "size": 10}]})));
        transport.push(Reply::json(200, json!({"result": true})));
        transport.push(Reply::json(200, json!({"result": [{"name": "x.wav", "size": 10}]})));
        transport.push(Reply::json(200, json!({"result": [{"name": "x.wav", "size": 64}]})));
        let ctl = controller(transport.clone());
        let request = CaptureRequest::new("x.wav");

        let outcome = ctl
            .record(&request, CompletionPolicy::poll_for(&request))
            .await
            .unwrap();
        assert_eq!(outcome, CaptureOutcome::Replaced { polls: 2 });
        assert_eq!(transport.requests().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn new_name_appears_after_start() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(Reply::json(200, json!({"result": ["old.wav"]})));
        transport.push(Reply::json(200, json!({"result": true})));
        transport.push(Reply::json(200, json!({"result": ["old.wav", "x.wav"]})));
        let ctl = controller(transport);
        let request = CaptureRequest::new("x.wav");

        let outcome = ctl
            .record(&request, CompletionPolicy::poll_for(&request))
            .await
            .unwrap();
        assert_eq!(outcome, CaptureOutcome::Appeared { polls: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn unreadable_listing_before_start_waits_full_timeout() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(Reply::text(500, "busy"));
        transport.push(Reply::json(200, json!({"result": true})));
        let ctl = controller(transport.clone());
        let request = CaptureRequest::new("x.wav");

        let before = tokio::time::Instant::now();
        let outcome = ctl
            .record(
                &request,
                CompletionPolicy::PollListing {
                    interval: Duration::from_millis(500),
                    timeout: Duration::from_secs(4),
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome, CaptureOutcome::Unverified(Duration::from_secs(4)));
        assert!(before.elapsed() >= Duration::from_secs(4));
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn fixed_delay_record_skips_the_listing() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(Reply::json(200, json!({"result": true})));
        let outcome = controller(transport.clone())
            .record(
                &CaptureRequest::new("x.wav"),
                CompletionPolicy::FixedDelay(Duration::from_millis(1)),
            )
            .await
            .unwrap();
        assert_eq!(outcome, CaptureOutcome::Elapsed(Duration::from_millis(1)));
        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, HttpMethod::Post);
    }
}
