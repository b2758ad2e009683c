//! Deferred brief generation: run the brief crew off the request path and push the result.
//!
//! Each full-brief request gets its own detached task. A semaphore caps how many crews run
//! at once; waiting for a slot happens inside the task, so the webhook never blocks.
//! Whatever happens, the task makes exactly one send attempt and then ends.

use crate::channels::ChannelHandle;
use crate::crew::{Crew, PipelineError, USER_REQUEST_KEY};
use crate::llm::LlmBackend;
use crate::replies;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BriefOutcome {
    Success,
    Failure,
}

/// Text to deliver for one full-brief request. Consumed by the single send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BriefResult {
    pub text: String,
    pub outcome: BriefOutcome,
}

impl BriefResult {
    fn success(text: String) -> Self {
        Self {
            text,
            outcome: BriefOutcome::Success,
        }
    }

    fn failure() -> Self {
        Self {
            text: replies::BRIEF_APOLOGY.to_string(),
            outcome: BriefOutcome::Failure,
        }
    }
}

/// Spawns brief tasks. Cheap to clone; all clones share one concurrency limit.
#[derive(Clone)]
pub struct BriefDispatcher {
    crew: Arc<Crew>,
    llm: Arc<dyn LlmBackend>,
    channel: Arc<dyn ChannelHandle>,
    limiter: Arc<Semaphore>,
    timeout: Duration,
}

impl BriefDispatcher {
    pub fn new(
        crew: Arc<Crew>,
        llm: Arc<dyn LlmBackend>,
        channel: Arc<dyn ChannelHandle>,
        max_concurrent: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            crew,
            llm,
            channel,
            limiter: Arc::new(Semaphore::new(max_concurrent.max(1))),
            timeout,
        }
    }

    /// Crew slots currently free.
    pub fn available_slots(&self) -> usize {
        self.limiter.available_permits()
    }

    /// Start a detached task for `body` and return immediately. Callers may drop the handle.
    pub fn spawn(&self, body: String, destination: String) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move { this.generate_and_deliver(body, destination).await })
    }

    /// Wait for a slot, run the crew, send exactly one message. Never returns an error.
    pub async fn generate_and_deliver(&self, body: String, destination: String) {
        let task_id = uuid::Uuid::new_v4();
        let permit = match self.limiter.clone().acquire_owned().await {
            Ok(p) => p,
            Err(_) => {
                log::error!("brief {}: limiter closed, dropping request", task_id);
                return;
            }
        };
        log::info!("brief {}: started for {}", task_id, destination);

        let result = self.generate(&body).await;
        drop(permit);
        if let BriefOutcome::Failure = result.outcome {
            log::info!("brief {}: sending apology to {}", task_id, destination);
        }

        match self.channel.send_message(&destination, &result.text).await {
            Ok(()) => log::info!("brief {}: delivered to {}", task_id, destination),
            Err(e) => log::error!("brief {}: delivery to {} failed: {}", task_id, destination, e),
        }
    }

    /// Run the crew under the timeout and map any failure to the apology.
    pub async fn generate(&self, body: &str) -> BriefResult {
        let inputs = [(USER_REQUEST_KEY, body)];
        let run = self.crew.kickoff(self.llm.as_ref(), &inputs);
        let res = match tokio::time::timeout(self.timeout, run).await {
            Ok(res) => res,
            Err(_) => Err(PipelineError::Timeout(self.timeout.as_secs())),
        };
        match res {
            Ok(out) => BriefResult::success(out.final_output().to_string()),
            Err(e) => {
                log::error!("brief crew {} failed: {}", self.crew.name(), e);
                BriefResult::failure()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::ChannelError;
    use crate::crew::project_brief_crew;
    use crate::llm::{ChatMessage, LlmError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StageLlm {
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        fail_at: Option<usize>,
        delay: Duration,
    }

    impl StageLlm {
        fn new(fail_at: Option<usize>, delay: Duration) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                fail_at,
                delay,
            }
        }
    }

    #[async_trait]
    impl LlmBackend for StageLlm {
        fn model(&self) -> &str {
            "stage"
        }

        async fn chat(&self, _messages: Vec<ChatMessage>) -> Result<String, LlmError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if self.fail_at == Some(n) {
                return Err(LlmError::Api("503 upstream stack trace".to_string()));
            }
            Ok(format!("etapa {}", n))
        }
    }

    #[derive(Default)]
    struct RecordingChannel {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl ChannelHandle for RecordingChannel {
        fn id(&self) -> &str {
            "recording"
        }

        async fn send_message(&self, to: &str, text: &str) -> Result<(), ChannelError> {
            self.sent.lock().unwrap().push((to.to_string(), text.to_string()));
            if self.fail {
                return Err(ChannelError::Api("500".to_string()));
            }
            Ok(())
        }
    }

    fn dispatcher(
        llm: Arc<StageLlm>,
        channel: Arc<RecordingChannel>,
        max: usize,
        timeout: Duration,
    ) -> BriefDispatcher {
        BriefDispatcher::new(Arc::new(project_brief_crew()), llm, channel, max, timeout)
    }

    #[tokio::test]
    async fn success_sends_final_stage_output_once() {
        let llm = Arc::new(StageLlm::new(None, Duration::ZERO));
        let channel = Arc::new(RecordingChannel::default());
        let d = dispatcher(llm.clone(), channel.clone(), 2, Duration::from_secs(10));
        d.spawn("descrição longa".into(), "whatsapp:+5511".into())
            .await
            .unwrap();
        assert_eq!(llm.calls.load(Ordering::SeqCst), 4);
        let sent = channel.sent.lock().unwrap();
        assert_eq!(sent.as_slice(), &[("whatsapp:+5511".to_string(), "etapa 4".to_string())]);
    }

    #[tokio::test]
    async fn pipeline_failure_sends_apology() {
        let llm = Arc::new(StageLlm::new(Some(3), Duration::ZERO));
        let channel = Arc::new(RecordingChannel::default());
        let d = dispatcher(llm.clone(), channel.clone(), 2, Duration::from_secs(10));
        let result = d.generate("x").await;
        assert_eq!(result.outcome, BriefOutcome::Failure);
        assert_eq!(result.text, replies::BRIEF_APOLOGY);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 3);
        assert!(channel.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn spawned_failure_delivers_apology_once() {
        let llm = Arc::new(StageLlm::new(Some(2), Duration::ZERO));
        let channel = Arc::new(RecordingChannel::default());
        let d = dispatcher(llm.clone(), channel.clone(), 2, Duration::from_secs(10));
        d.spawn("x".into(), "whatsapp:+1".into()).await.unwrap();
        assert_eq!(llm.calls.load(Ordering::SeqCst), 2);
        let sent = channel.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "whatsapp:+1");
        assert_eq!(sent[0].1, replies::BRIEF_APOLOGY);
        assert!(!sent[0].1.contains("503"));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_sends_apology() {
        let llm = Arc::new(StageLlm::new(None, Duration::from_secs(120)));
        let channel = Arc::new(RecordingChannel::default());
        let d = dispatcher(llm, channel.clone(), 1, Duration::from_secs(60));
        d.spawn("x".into(), "whatsapp:+1".into()).await.unwrap();
        let sent = channel.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, replies::BRIEF_APOLOGY);
    }

    #[tokio::test]
    async fn delivery_failure_ends_task_without_retry() {
        let llm = Arc::new(StageLlm::new(None, Duration::ZERO));
        let channel = Arc::new(RecordingChannel {
            sent: Mutex::new(Vec::new()),
            fail: true,
        });
        let d = dispatcher(llm, channel.clone(), 1, Duration::from_secs(10));
        d.spawn("x".into(), "whatsapp:+1".into()).await.unwrap();
        assert_eq!(channel.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_crews_respect_limit() {
        let llm = Arc::new(StageLlm::new(None, Duration::from_millis(50)));
        let channel = Arc::new(RecordingChannel::default());
        let d = dispatcher(llm.clone(), channel.clone(), 2, Duration::from_secs(60));
        let handles: Vec<_> = (0..5)
            .map(|i| d.spawn(format!("pedido {i}"), format!("whatsapp:+{i}")))
            .collect();
        for h in handles {
            h.await.unwrap();
        }
        assert!(llm.peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 20);
        assert_eq!(channel.sent.lock().unwrap().len(), 5);
        assert_eq!(d.available_slots(), 2);
    }
}
