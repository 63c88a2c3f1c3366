//! Full-loop integration tests
//!
//! Drives the agent with scripted model and page doubles: terminal answers,
//! budget exhaustion, tool failures, unparseable output, and degraded
//! grounding.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use webpilot::agent::{Prediction, StepObserver};
use webpilot::core::{Message, Result, WebpilotError};
use webpilot::llm::{GenerateOptions, LlmProvider, LlmResponse};
use webpilot::{Agent, Config, Page};

/// Model double that replays canned responses, then a fallback.
struct ScriptedLlm {
    responses: Mutex<VecDeque<String>>,
    fallback: String,
    calls: AtomicUsize,
    model_missing: bool,
}

impl ScriptedLlm {
    fn new(responses: &[&str]) -> Self {
        Self::with_fallback(responses, "Action: Wait")
    }

    fn with_fallback(responses: &[&str], fallback: &str) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
            fallback: fallback.to_string(),
            calls: AtomicUsize::new(0),
            model_missing: false,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn chat(
        &self,
        _model: &str,
        _messages: &[Message],
        _options: Option<GenerateOptions>,
    ) -> Result<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let content = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        Ok(LlmResponse {
            content,
            usage: None,
            model: "scripted".to_string(),
        })
    }

    async fn is_model_available(&self, _model: &str) -> Result<bool> {
        Ok(!self.model_missing)
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(vec!["scripted".to_string()])
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Page double with one markable element, recording interactions.
#[derive(Default)]
struct StubPage {
    fail_marking: bool,
    clicks: Mutex<Vec<(f64, f64)>>,
}

#[async_trait]
impl Page for StubPage {
    async fn evaluate(&self, script: &str) -> Result<Value> {
        if script == "markPage()" {
            if self.fail_marking {
                return Err(WebpilotError::browser("page still rendering"));
            }
            return Ok(json!([
                {"x": 40.0, "y": 80.0, "type": "input", "text": "", "ariaLabel": "Search"}
            ]));
        }
        Ok(Value::Null)
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(vec![0x89, 0x50, 0x4e, 0x47])
    }

    async fn click_at(&self, x: f64, y: f64) -> Result<()> {
        self.clicks.lock().unwrap().push((x, y));
        Ok(())
    }

    async fn type_at(&self, _x: f64, _y: f64, _text: &str) -> Result<()> {
        Ok(())
    }

    async fn scroll_window(&self, _delta_y: i64) -> Result<()> {
        Ok(())
    }

    async fn scroll_at(&self, _x: f64, _y: f64, _delta_y: i64) -> Result<()> {
        Ok(())
    }

    async fn go_back(&self) -> Result<()> {
        Ok(())
    }

    async fn goto(&self, _url: &str) -> Result<()> {
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok("https://example.com/".to_string())
    }
}

/// Observer double collecting every decide turn.
#[derive(Default)]
struct RecordingObserver {
    turns: Mutex<Vec<(usize, Prediction)>>,
}

impl StepObserver for RecordingObserver {
    fn on_decide(&self, step: usize, prediction: &Prediction, _screenshot: &[u8]) {
        self.turns.lock().unwrap().push((step, prediction.clone()));
    }
}

/// Config with the delays zeroed so tests run instantly.
fn test_config() -> Config {
    let mut config = Config::default();
    config.tools.wait_secs = 0;
    config.grounding.retry_delay_ms = 0;
    config.grounding.max_attempts = 2;
    config
}

fn agent_with(llm: Arc<ScriptedLlm>) -> Agent {
    Agent::with_provider(test_config(), llm)
}

#[tokio::test]
async fn test_answer_ends_loop_and_is_extracted() {
    let llm = Arc::new(ScriptedLlm::new(&[
        "The search box is element 0, I'll click it.\nAction: Click [0]",
        "That worked, I know the answer.\nAction: ANSWER; [Paris]",
    ]));
    let page = Arc::new(StubPage::default());

    let answer = agent_with(llm.clone())
        .run_with_budget("capital of France?", page.clone(), 10)
        .await
        .unwrap();

    assert_eq!(answer, Some("Paris".to_string()));
    assert_eq!(llm.calls(), 2);
    // The click resolved to the marked element's coordinates.
    assert_eq!(page.clicks.lock().unwrap().as_slice(), &[(40.0, 80.0)]);
}

#[tokio::test]
async fn test_budget_exhaustion_returns_no_answer() {
    // The model never answers; the loop must run exactly max_steps decide
    // turns and give up.
    let llm = Arc::new(ScriptedLlm::new(&[]));
    let page = Arc::new(StubPage::default());

    let answer = agent_with(llm.clone())
        .run_with_budget("unanswerable", page, 5)
        .await
        .unwrap();

    assert_eq!(answer, None);
    assert_eq!(llm.calls(), 5);
}

#[tokio::test]
async fn test_zero_budget_never_calls_the_model() {
    let llm = Arc::new(ScriptedLlm::new(&[]));
    let page = Arc::new(StubPage::default());

    let answer = agent_with(llm.clone())
        .run_with_budget("task", page, 0)
        .await
        .unwrap();

    assert_eq!(answer, None);
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn test_tool_failure_does_not_abort_the_task() {
    let llm = Arc::new(ScriptedLlm::new(&[
        "Action: Click [99]",
        "Action: ANSWER; [done]",
    ]));
    let page = Arc::new(StubPage::default());
    let observer = Arc::new(RecordingObserver::default());

    let answer = agent_with(llm.clone())
        .with_observer(observer.clone())
        .run_with_budget("task", page.clone(), 10)
        .await
        .unwrap();

    // The out-of-range click became an observation and the loop went on.
    assert_eq!(answer, Some("done".to_string()));
    assert!(page.clicks.lock().unwrap().is_empty());
    assert_eq!(observer.turns.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_unparseable_output_reenters_decide() {
    let llm = Arc::new(ScriptedLlm::new(&[
        "I am not sure what to do here.",
        "Action: ANSWER; [ok]",
    ]));
    let page = Arc::new(StubPage::default());
    let observer = Arc::new(RecordingObserver::default());

    let answer = agent_with(llm.clone())
        .with_observer(observer.clone())
        .run_with_budget("task", page, 10)
        .await
        .unwrap();

    assert_eq!(answer, Some("ok".to_string()));
    assert_eq!(llm.calls(), 2);

    let turns = observer.turns.lock().unwrap();
    assert!(matches!(turns[0].1, Prediction::Retry { .. }));
    assert!(matches!(turns[1].1, Prediction::Answer { .. }));
    // No tool ran in between: steps are consecutive decide turns.
    assert_eq!((turns[0].0, turns[1].0), (1, 2));
}

#[tokio::test]
async fn test_degraded_grounding_still_reaches_an_answer() {
    let llm = Arc::new(ScriptedLlm::new(&["Action: ANSWER; [blind answer]"]));
    let page = Arc::new(StubPage {
        fail_marking: true,
        ..Default::default()
    });

    let answer = agent_with(llm)
        .run_with_budget("task", page, 10)
        .await
        .unwrap();

    assert_eq!(answer, Some("blind answer".to_string()));
}

#[tokio::test]
async fn test_answer_without_text_yields_empty_answer() {
    let llm = Arc::new(ScriptedLlm::new(&["Action: ANSWER"]));
    let page = Arc::new(StubPage::default());

    let answer = agent_with(llm)
        .run_with_budget("task", page, 10)
        .await
        .unwrap();

    assert_eq!(answer, Some(String::new()));
}

#[tokio::test]
async fn test_initialize_rejects_missing_model() {
    let llm = Arc::new(ScriptedLlm {
        model_missing: true,
        ..ScriptedLlm::new(&[])
    });
    let err = agent_with(llm).initialize().await.unwrap_err();
    assert!(matches!(err, WebpilotError::ModelNotFound(_)));
}
