//! Client-side orchestration of one chart analysis at a time.
//!
//! The [`Orchestrator`] owns the credential, the selected chart and the
//! outcome of the last analysis, and moves between
//!
//! ```text
//! NoImage ─select─▶ ImageSelected ─analyze─▶ Loading ─▶ Success | Error
//!    ▲                    │  ▲                               │
//!    └──────clear─────────┘  └───────────select──────────────┘
//! ```
//!
//! `analyze` borrows the orchestrator mutably for the whole request, so only
//! one request can be in flight.

mod credential;
mod relay_client;

pub use credential::{initial_credential, CredentialStore};
pub use relay_client::{HttpRelayClient, LocalRelay, RelayClient};

use crate::analysis::AnalysisResult;
use crate::chart::ChartImage;
use crate::error::{ImageError, PersistError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;

/// Lifecycle state as seen by a front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    NoImage,
    ImageSelected,
    Loading,
    Success,
    Error,
}

/// Drives the request lifecycle for a single viewer.
pub struct Orchestrator {
    relay: Arc<dyn RelayClient>,
    store: Box<dyn CredentialStore>,
    credential: String,
    image: Option<ChartImage>,
    analysis: Option<AnalysisResult>,
    error: Option<String>,
    loading: bool,
    state_tx: watch::Sender<ClientState>,
}

impl Orchestrator {
    /// Create an orchestrator. The starting credential is `default_credential`
    /// when non-empty, otherwise whatever `store` holds.
    pub fn new(
        relay: Arc<dyn RelayClient>,
        store: Box<dyn CredentialStore>,
        default_credential: Option<&str>,
    ) -> Self {
        let credential = initial_credential(default_credential, &*store);
        let (state_tx, _) = watch::channel(ClientState::NoImage);
        Self {
            relay,
            store,
            credential,
            image: None,
            analysis: None,
            error: None,
            loading: false,
            state_tx,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ClientState {
        if self.loading {
            ClientState::Loading
        } else if self.image.is_none() {
            ClientState::NoImage
        } else if self.analysis.is_some() {
            ClientState::Success
        } else if self.error.is_some() {
            ClientState::Error
        } else {
            ClientState::ImageSelected
        }
    }

    /// Watch state transitions (e.g. to show a spinner while Loading).
    pub fn subscribe(&self) -> watch::Receiver<ClientState> {
        self.state_tx.subscribe()
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn has_credential(&self) -> bool {
        !self.credential.is_empty()
    }

    /// Replace the credential and persist it right away.
    ///
    /// The new value is used for this session even if persisting fails.
    pub fn set_credential(&mut self, credential: impl Into<String>) -> Result<(), PersistError> {
        self.credential = credential.into();
        self.store.save(&self.credential).inspect_err(|e| {
            tracing::warn!("{e}; keeping the key for this session only");
        })
    }

    pub fn image(&self) -> Option<&ChartImage> {
        self.image.as_ref()
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Read a chart from disk and make it current.
    ///
    /// On failure the previous image and outcome are left untouched.
    pub async fn select_image(&mut self, path: &Path) -> Result<(), ImageError> {
        let image = ChartImage::from_path(path).await?;
        self.set_image(image);
        Ok(())
    }

    /// Make an in-memory chart current.
    pub fn select_image_bytes(&mut self, bytes: &[u8], format: &str) -> Result<(), ImageError> {
        let image =
            ChartImage::from_bytes(bytes, format).ok_or_else(|| ImageError::UnsupportedFormat {
                path: PathBuf::from("<memory>"),
                format: format.to_string(),
            })?;
        self.set_image(image);
        Ok(())
    }

    fn set_image(&mut self, image: ChartImage) {
        self.image = Some(image);
        self.analysis = None;
        self.error = None;
        self.publish();
    }

    /// Drop the chart and anything derived from it.
    pub fn clear_image(&mut self) {
        self.image = None;
        self.analysis = None;
        self.error = None;
        self.publish();
    }

    /// Whether [`analyze`](Self::analyze) would send a request.
    pub fn can_analyze(&self) -> bool {
        self.image.is_some() && self.has_credential() && !self.loading
    }

    /// Analyze the current chart.
    ///
    /// Returns `false` without contacting the relay when there is no chart or
    /// no credential. Otherwise the orchestrator ends in `Success` or `Error`,
    /// including when the returned future is dropped before the relay answers.
    pub async fn analyze(&mut self) -> bool {
        let image = match &self.image {
            Some(image) if self.can_analyze() => image.clone(),
            _ => {
                tracing::debug!("Analyze ignored in state {:?}", self.state());
                return false;
            }
        };
        let relay = Arc::clone(&self.relay);
        let credential = self.credential.clone();

        self.loading = true;
        self.error = None;
        self.publish();

        let mut pending = PendingAnalysis {
            orchestrator: self,
            settled: false,
        };
        let outcome = relay.analyze(image.as_data_uri(), &credential).await;
        pending.settle(outcome.map_err(|e| {
            tracing::debug!("Analysis failed: {e:?}");
            e.to_string()
        }));
        true
    }

    fn settle(&mut self, outcome: Result<AnalysisResult, String>) {
        self.loading = false;
        match outcome {
            Ok(analysis) => {
                self.analysis = Some(analysis);
                self.error = None;
            }
            Err(message) => {
                self.analysis = None;
                self.error = Some(message);
            }
        }
        self.publish();
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.state());
    }
}

/// Message recorded when an in-flight analysis is abandoned.
const CANCELLED: &str = "Analysis was cancelled";

/// Settles the orchestrator when an `analyze` future completes or is dropped.
struct PendingAnalysis<'a> {
    orchestrator: &'a mut Orchestrator,
    settled: bool,
}

impl PendingAnalysis<'_> {
    fn settle(&mut self, outcome: Result<AnalysisResult, String>) {
        self.settled = true;
        self.orchestrator.settle(outcome);
    }
}

impl Drop for PendingAnalysis<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!("Analysis dropped while in flight");
            self.orchestrator.settle(Err(CANCELLED.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::credential::tests::MemoryStore;
    use super::*;
    use crate::analysis::Signal;
    use crate::error::ClientError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeRelay {
        replies: Mutex<Vec<Result<AnalysisResult, ClientError>>>,
        calls: AtomicUsize,
    }

    impl FakeRelay {
        fn new(replies: Vec<Result<AnalysisResult, ClientError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RelayClient for FakeRelay {
        async fn analyze(
            &self,
            _image: &str,
            _api_key: &str,
        ) -> Result<AnalysisResult, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies.lock().unwrap().remove(0)
        }
    }

    fn buy() -> AnalysisResult {
        serde_json::from_str(
            r#"{"signal":"BUY","confidence":80,"technical":[],"fundamental":[],"reasoning":"ok"}"#,
        )
        .unwrap()
    }

    fn orchestrator(relay: Arc<FakeRelay>, key: &str) -> Orchestrator {
        Orchestrator::new(relay, Box::new(MemoryStore::with(key)), None)
    }

    #[tokio::test]
    async fn test_starts_with_stored_credential_and_no_image() {
        let o = orchestrator(FakeRelay::new(vec![]), "stored");
        assert_eq!(o.credential(), "stored");
        assert_eq!(o.state(), ClientState::NoImage);
    }

    #[tokio::test]
    async fn test_build_time_default_beats_stored() {
        let o = Orchestrator::new(
            FakeRelay::new(vec![]),
            Box::new(MemoryStore::with("stored")),
            Some("built-in"),
        );
        assert_eq!(o.credential(), "built-in");
    }

    #[tokio::test]
    async fn test_set_credential_persists() {
        let store = MemoryStore::default();
        let cell = store.value.clone();
        let mut o = Orchestrator::new(FakeRelay::new(vec![]), Box::new(store), None);

        o.set_credential("fresh").unwrap();
        assert_eq!(o.credential(), "fresh");
        assert_eq!(cell.lock().unwrap().as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_set_credential_survives_persist_failure() {
        let store = MemoryStore {
            fail: true,
            ..Default::default()
        };
        let mut o = Orchestrator::new(FakeRelay::new(vec![]), Box::new(store), None);

        assert!(o.set_credential("session-only").is_err());
        assert_eq!(o.credential(), "session-only");
    }

    #[tokio::test]
    async fn test_analyze_without_image_is_noop() {
        let relay = FakeRelay::new(vec![Ok(buy())]);
        let mut o = orchestrator(relay.clone(), "k1");

        assert!(!o.analyze().await);
        assert_eq!(relay.calls.load(Ordering::SeqCst), 0);
        assert_eq!(o.state(), ClientState::NoImage);
    }

    #[tokio::test]
    async fn test_analyze_without_credential_is_noop() {
        let relay = FakeRelay::new(vec![Ok(buy())]);
        let mut o = orchestrator(relay.clone(), "");
        o.select_image_bytes(&[0xFF, 0xD8], "jpeg").unwrap();

        assert!(!o.analyze().await);
        assert_eq!(relay.calls.load(Ordering::SeqCst), 0);
        assert_eq!(o.state(), ClientState::ImageSelected);
    }

    #[tokio::test]
    async fn test_successful_analysis() {
        let relay = FakeRelay::new(vec![Ok(buy())]);
        let mut o = orchestrator(relay.clone(), "k1");
        o.select_image_bytes(&[0xFF, 0xD8], "jpeg").unwrap();
        assert_eq!(o.state(), ClientState::ImageSelected);

        assert!(o.analyze().await);
        assert_eq!(o.state(), ClientState::Success);
        let analysis = o.analysis().unwrap();
        assert_eq!(analysis.signal, Signal::Buy);
        assert_eq!(analysis.confidence, 80);
        assert!(o.error().is_none());
    }

    #[tokio::test]
    async fn test_failed_analysis_settles_in_error() {
        let relay = FakeRelay::new(vec![Err(ClientError::Relay {
            status: 500,
            message: "No analysis generated from AI".into(),
        })]);
        let mut o = orchestrator(relay, "k1");
        o.select_image_bytes(&[0xFF, 0xD8], "jpeg").unwrap();

        assert!(o.analyze().await);
        assert_eq!(o.state(), ClientState::Error);
        assert_eq!(o.error(), Some("No analysis generated from AI"));
        assert!(o.analysis().is_none());
    }

    #[tokio::test]
    async fn test_retry_after_error_replaces_error() {
        let relay = FakeRelay::new(vec![
            Err(ClientError::Transport("connection refused".into())),
            Ok(buy()),
        ]);
        let mut o = orchestrator(relay.clone(), "k1");
        o.select_image_bytes(&[0xFF, 0xD8], "jpeg").unwrap();

        o.analyze().await;
        assert_eq!(o.state(), ClientState::Error);
        o.analyze().await;
        assert_eq!(o.state(), ClientState::Success);
        assert!(o.error().is_none());
        assert_eq!(relay.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_selecting_new_image_clears_result() {
        let relay = FakeRelay::new(vec![Ok(buy())]);
        let mut o = orchestrator(relay, "k1");
        o.select_image_bytes(&[0xFF, 0xD8], "jpeg").unwrap();
        o.analyze().await;
        assert_eq!(o.state(), ClientState::Success);

        o.select_image_bytes(&[0x89, 0x50], "png").unwrap();
        assert!(o.analysis().is_none());
        assert!(o.error().is_none());
        assert_eq!(o.state(), ClientState::ImageSelected);
        assert!(o
            .image()
            .unwrap()
            .as_data_uri()
            .starts_with("data:image/png"));
    }

    #[tokio::test]
    async fn test_selecting_new_image_clears_error() {
        let relay = FakeRelay::new(vec![Err(ClientError::InvalidResponse)]);
        let mut o = orchestrator(relay, "k1");
        o.select_image_bytes(&[0xFF, 0xD8], "jpeg").unwrap();
        o.analyze().await;
        assert_eq!(o.error(), Some("Failed to analyze image"));

        o.select_image_bytes(&[0xFF, 0xD9], "jpeg").unwrap();
        assert!(o.error().is_none());
        assert_eq!(o.state(), ClientState::ImageSelected);
    }

    #[tokio::test]
    async fn test_clear_returns_to_no_image() {
        let relay = FakeRelay::new(vec![Ok(buy())]);
        let mut o = orchestrator(relay, "k1");
        o.select_image_bytes(&[0xFF, 0xD8], "jpeg").unwrap();
        o.analyze().await;

        o.clear_image();
        assert_eq!(o.state(), ClientState::NoImage);
        assert!(o.image().is_none());
        assert!(o.analysis().is_none());
    }

    #[tokio::test]
    async fn test_unsupported_bytes_keep_previous_image() {
        let mut o = orchestrator(FakeRelay::new(vec![]), "k1");
        o.select_image_bytes(&[0xFF, 0xD8], "jpeg").unwrap();

        assert!(o.select_image_bytes(b"%PDF", "pdf").is_err());
        assert!(o
            .image()
            .unwrap()
            .as_data_uri()
            .starts_with("data:image/jpeg"));
    }

    struct SilentRelay;

    #[async_trait]
    impl RelayClient for SilentRelay {
        async fn analyze(
            &self,
            _image: &str,
            _api_key: &str,
        ) -> Result<AnalysisResult, ClientError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_abandoned_analysis_settles_in_error() {
        let mut o = Orchestrator::new(
            Arc::new(SilentRelay),
            Box::new(MemoryStore::with("k1")),
            None,
        );
        let rx = o.subscribe();
        o.select_image_bytes(&[0xFF, 0xD8], "jpeg").unwrap();

        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(50), o.analyze()).await;
        assert!(timed_out.is_err());

        assert_eq!(o.state(), ClientState::Error);
        assert_eq!(*rx.borrow(), ClientState::Error);
        assert_eq!(o.error(), Some(CANCELLED));
        assert!(o.can_analyze());

        o.select_image_bytes(&[0x89, 0x50], "png").unwrap();
        assert_eq!(o.state(), ClientState::ImageSelected);
        o.clear_image();
        assert_eq!(o.state(), ClientState::NoImage);
    }

    #[tokio::test]
    async fn test_subscribers_see_final_state() {
        let relay = FakeRelay::new(vec![Ok(buy())]);
        let mut o = orchestrator(relay, "k1");
        let rx = o.subscribe();

        o.select_image_bytes(&[0xFF, 0xD8], "jpeg").unwrap();
        assert_eq!(*rx.borrow(), ClientState::ImageSelected);

        o.analyze().await;
        assert_eq!(*rx.borrow(), ClientState::Success);
    }
}
