use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use gamegen_core::{
    ContentPolicy, GameBundle, GeneratedFile, GenerationEvent, GenerationRequest, extract_files,
};

use crate::errors::GenerationError;
use crate::prompt::{SYSTEM_PROMPT, build_game_prompt};
use crate::provider::{CompletionProvider, CompletionRequest};

/// Summary attached to a successful generation.
const COMPLETION_SUMMARY: &str = "game generation complete";

/// Session behavior options.
#[derive(Clone, Debug)]
pub struct SessionOptions {
    /// Bounded event buffer between the session task and the consumer.
    pub event_buffer_capacity: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            event_buffer_capacity: 64,
        }
    }
}

/// Orchestrates one generation request against a completion provider.
///
/// Both entry points validate the request, build the prompt, call the
/// provider once (the only suspension point), and apply the extractor with
/// its raw-output fallback. Nothing is retried automatically; a provider
/// fault terminates the request.
#[derive(Clone)]
pub struct GenerationSession {
    provider: Arc<dyn CompletionProvider>,
    options: SessionOptions,
}

impl GenerationSession {
    /// Creates a session with default options.
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self::with_options(provider, SessionOptions::default())
    }

    /// Creates a session with explicit options.
    pub fn with_options(provider: Arc<dyn CompletionProvider>, options: SessionOptions) -> Self {
        Self { provider, options }
    }

    /// Validates the request and starts the lifecycle event sequence on its
    /// own task.
    ///
    /// Events arrive in strict order `Progress*`, `FileReady*`, then exactly
    /// one `Complete` or `Failure`. The sequence is finite and cannot be
    /// restarted; dropping the stream stops event production.
    pub fn run_streaming(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationStream, GenerationError> {
        request.validate()?;
        let run_id = uuid::Uuid::new_v4();
        info!(%run_id, provider = %self.provider.id(), "starting game generation");

        let (tx, rx) = mpsc::channel(self.options.event_buffer_capacity);
        tokio::spawn(generation_task(
            self.provider.clone(),
            request.prompt,
            run_id,
            tx,
        ));
        Ok(GenerationStream { run_id, rx })
    }

    /// Performs the same work in one call and returns the raw file map.
    pub async fn run_once(
        &self,
        request: &GenerationRequest,
    ) -> Result<BTreeMap<String, String>, GenerationError> {
        request.validate()?;
        let content = self
            .provider
            .complete(CompletionRequest {
                system_prompt: SYSTEM_PROMPT.to_string(),
                user_prompt: build_game_prompt(&request.prompt),
            })
            .await?;
        if content.trim().is_empty() {
            return Err(GenerationError::EmptyCompletion);
        }
        Ok(files_with_fallback(&content))
    }

    /// Generates once and packages the result for non-streaming delivery:
    /// whole-set policy check, then base64 encoding of every file.
    pub async fn run_bundle(
        &self,
        request: &GenerationRequest,
        policy: &dyn ContentPolicy,
    ) -> Result<GameBundle, GenerationError> {
        let files = self.run_once(request).await?;
        Ok(GameBundle::from_files(&files, COMPLETION_SUMMARY, policy)?)
    }
}

/// Extraction plus the raw-output fallback shared by both entry points: with
/// no marker pairs and no HTML signal, the untrimmed provider output becomes
/// `index.html`.
fn files_with_fallback(content: &str) -> BTreeMap<String, String> {
    let mut files = extract_files(content);
    if files.is_empty() {
        files.insert("index.html".to_string(), content.to_string());
    }
    files
}

/// Lifecycle event sequence for one streaming run.
#[derive(Debug)]
pub struct GenerationStream {
    run_id: uuid::Uuid,
    rx: mpsc::Receiver<GenerationEvent>,
}

impl GenerationStream {
    /// Returns the run id for log correlation.
    pub fn run_id(&self) -> uuid::Uuid {
        self.run_id
    }

    /// Waits for the next lifecycle event; `None` once the sequence ends.
    pub async fn next_event(&mut self) -> Option<GenerationEvent> {
        self.rx.recv().await
    }

    #[cfg(test)]
    pub(crate) fn from_parts(run_id: uuid::Uuid, rx: mpsc::Receiver<GenerationEvent>) -> Self {
        Self { run_id, rx }
    }
}

async fn generation_task(
    provider: Arc<dyn CompletionProvider>,
    prompt: String,
    run_id: uuid::Uuid,
    tx: mpsc::Sender<GenerationEvent>,
) {
    if !send_event(
        &tx,
        GenerationEvent::Progress {
            message: "connecting to model provider".to_string(),
            chars_so_far: 0,
        },
    )
    .await
    {
        return;
    }

    debug!(%run_id, "requesting completion");
    let completion = provider
        .complete(CompletionRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_prompt: build_game_prompt(&prompt),
        })
        .await;

    let content = match completion {
        Ok(content) if !content.trim().is_empty() => content,
        Ok(_) => {
            warn!(%run_id, "provider returned an empty completion");
            let _ = send_event(
                &tx,
                GenerationEvent::Failure {
                    message: "model returned no usable content".to_string(),
                },
            )
            .await;
            return;
        }
        Err(err) => {
            warn!(%run_id, error = %err, "completion failed");
            let _ = send_event(
                &tx,
                GenerationEvent::Failure {
                    message: err.to_string(),
                },
            )
            .await;
            return;
        }
    };

    if !send_event(
        &tx,
        GenerationEvent::Progress {
            message: "parsing model response".to_string(),
            chars_so_far: content.chars().count() / 2,
        },
    )
    .await
    {
        return;
    }

    let mut files: BTreeMap<String, GeneratedFile> = BTreeMap::new();
    for (name, text) in files_with_fallback(&content) {
        files.insert(name.clone(), GeneratedFile::from_raw(name, &text));
    }
    for file in files.values() {
        if !send_event(&tx, GenerationEvent::FileReady { file: file.clone() }).await {
            return;
        }
    }
    let _ = send_event(
        &tx,
        GenerationEvent::Complete {
            files,
            summary: COMPLETION_SUMMARY.to_string(),
        },
    )
    .await;
}

async fn send_event(tx: &mpsc::Sender<GenerationEvent>, event: GenerationEvent) -> bool {
    tx.send(event).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use gamegen_core::ValidationError;

    use crate::errors::ProviderError;
    use crate::provider::ProviderId;

    enum FakeBehavior {
        Text(&'static str),
        Fail(ProviderError),
    }

    struct FakeProvider {
        calls: Arc<AtomicUsize>,
        behavior: FakeBehavior,
    }

    impl FakeProvider {
        fn text(text: &'static str) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    calls: calls.clone(),
                    behavior: FakeBehavior::Text(text),
                },
                calls,
            )
        }

        fn failing(err: ProviderError) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                behavior: FakeBehavior::Fail(err),
            }
        }
    }

    #[async_trait::async_trait]
    impl CompletionProvider for FakeProvider {
        fn id(&self) -> ProviderId {
            ProviderId::new("fake")
        }

        async fn complete(&self, _req: CompletionRequest) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                FakeBehavior::Text(text) => Ok((*text).to_string()),
                FakeBehavior::Fail(err) => Err(err.clone()),
            }
        }
    }

    fn session_with(provider: FakeProvider) -> GenerationSession {
        GenerationSession::new(Arc::new(provider))
    }

    async fn collect_events(mut stream: GenerationStream) -> Vec<GenerationEvent> {
        let mut events = Vec::new();
        while let Some(event) = stream.next_event().await {
            events.push(event);
        }
        events
    }

    const TWO_FILE_RESPONSE: &str = "<FILE:index.html>\n<html>hi</html>\n</FILE:index.html>\n<FILE:script.js>\nlet s = 0;\n</FILE:script.js>";

    #[tokio::test]
    async fn streaming_success_emits_ordered_lifecycle() {
        gamegen_core::init_observability();
        let (provider, _) = FakeProvider::text(TWO_FILE_RESPONSE);
        let stream = session_with(provider)
            .run_streaming(GenerationRequest::new("a pong clone"))
            .expect("start");
        let events = collect_events(stream).await;

        assert_eq!(events.len(), 5);
        assert!(matches!(
            &events[0],
            GenerationEvent::Progress { message, chars_so_far: 0 } if message.contains("connecting")
        ));
        assert!(matches!(
            &events[1],
            GenerationEvent::Progress { message, .. } if message.contains("parsing")
        ));
        assert!(matches!(&events[2], GenerationEvent::FileReady { .. }));
        assert!(matches!(&events[3], GenerationEvent::FileReady { .. }));
        match &events[4] {
            GenerationEvent::Complete { files, summary } => {
                assert_eq!(files.len(), 2);
                assert_eq!(summary, "game generation complete");
                assert_eq!(
                    files["index.html"].decoded().expect("decodes"),
                    "<html>hi</html>"
                );
            }
            other => panic!("expected Complete, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn parsing_progress_reports_half_the_content_length() {
        let (provider, _) = FakeProvider::text("<div>abcd</div>");
        let stream = session_with(provider)
            .run_streaming(GenerationRequest::new("tiny"))
            .expect("start");
        let events = collect_events(stream).await;
        assert!(matches!(
            &events[1],
            GenerationEvent::Progress { chars_so_far, .. } if *chars_so_far == "<div>abcd</div>".len() / 2
        ));
    }

    #[tokio::test]
    async fn empty_completion_becomes_single_failure() {
        let (provider, _) = FakeProvider::text("   \n  ");
        let stream = session_with(provider)
            .run_streaming(GenerationRequest::new("a pong clone"))
            .expect("start");
        let events = collect_events(stream).await;

        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[1],
            GenerationEvent::Failure { message } if message.contains("no usable content")
        ));
    }

    #[tokio::test]
    async fn provider_fault_becomes_failure_with_cause_text() {
        let provider =
            FakeProvider::failing(ProviderError::transport("fake", "connection refused"));
        let stream = session_with(provider)
            .run_streaming(GenerationRequest::new("a pong clone"))
            .expect("start");
        let events = collect_events(stream).await;

        assert!(matches!(
            events.last(),
            Some(GenerationEvent::Failure { message }) if message.contains("connection refused")
        ));
        assert!(!events.iter().any(|e| matches!(e, GenerationEvent::FileReady { .. })));
    }

    #[tokio::test]
    async fn unmarked_response_without_html_signal_falls_back_to_raw_index() {
        let (provider, _) = FakeProvider::text("plain text with no markup at all");
        let files = session_with(provider)
            .run_once(&GenerationRequest::new("a pong clone"))
            .await
            .expect("files");
        assert_eq!(files.len(), 1);
        assert_eq!(files["index.html"], "plain text with no markup at all");
    }

    #[tokio::test]
    async fn run_once_extracts_marked_files() {
        let (provider, _) = FakeProvider::text(TWO_FILE_RESPONSE);
        let files = session_with(provider)
            .run_once(&GenerationRequest::new("a pong clone"))
            .await
            .expect("files");
        assert_eq!(files.len(), 2);
        assert_eq!(files["script.js"], "let s = 0;");
    }

    #[tokio::test]
    async fn run_once_surfaces_empty_completion_error() {
        let (provider, _) = FakeProvider::text("");
        let err = session_with(provider)
            .run_once(&GenerationRequest::new("a pong clone"))
            .await
            .expect_err("should fail");
        assert!(matches!(err, GenerationError::EmptyCompletion));
    }

    #[tokio::test]
    async fn run_bundle_encodes_files_after_the_whole_set_check() {
        use gamegen_core::PermissiveGuard;

        let (provider, _) = FakeProvider::text(TWO_FILE_RESPONSE);
        let bundle = session_with(provider)
            .run_bundle(&GenerationRequest::new("a pong clone"), &PermissiveGuard)
            .await
            .expect("bundle");
        assert_eq!(bundle.message, "game generation complete");
        assert_eq!(bundle.files.len(), 2);
        assert_ne!(bundle.files["index.html"], "<html>hi</html>");
    }

    #[tokio::test]
    async fn run_bundle_surfaces_whole_set_policy_rejection() {
        use gamegen_core::RuleGuard;

        let (provider, _) = FakeProvider::text(
            "<FILE:script.js>\nconst code = eval(payload);\n</FILE:script.js>",
        );
        let err = session_with(provider)
            .run_bundle(&GenerationRequest::new("a pong clone"), &RuleGuard)
            .await
            .expect_err("should reject");
        assert!(matches!(err, GenerationError::Policy(rejection) if rejection.reason.contains("script.js")));
    }

    #[tokio::test]
    async fn blank_prompt_is_rejected_before_the_provider_is_called() {
        let (provider, calls) = FakeProvider::text(TWO_FILE_RESPONSE);
        let session = session_with(provider);

        let err = session
            .run_streaming(GenerationRequest::new("   "))
            .expect_err("should reject");
        assert!(matches!(
            err,
            GenerationError::Validation(ValidationError::BlankPrompt)
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn over_long_prompt_is_rejected_before_the_provider_is_called() {
        let (provider, calls) = FakeProvider::text(TWO_FILE_RESPONSE);
        let session = session_with(provider);

        let err = session
            .run_once(&GenerationRequest::new("x".repeat(1001)))
            .await
            .expect_err("should reject");
        assert!(matches!(
            err,
            GenerationError::Validation(ValidationError::PromptTooLong { len: 1001 })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
