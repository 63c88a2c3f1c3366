//! Agent orchestrator
//!
//! Runs the perception-decide-act loop for one task: ground the page, ask
//! the model for an action, dispatch it, record the observation, repeat.
//! The loop is an explicit state machine bounded by a step budget; reaching
//! the budget abandons the task without an answer.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::agent::observer::{NoopObserver, StepObserver};
use crate::agent::parser::{self, Prediction, ToolKind};
use crate::agent::prompt;
use crate::agent::state::AgentState;
use crate::browser::{Annotator, Page};
use crate::core::{Config, Result, WebpilotError};
use crate::llm::{GenerateOptions, LlmProvider, OllamaClient};
use crate::tools::ToolRegistry;

/// States of the control loop. One `Decide` entry is one budgeted turn.
enum Phase {
    /// Perceive the page and ask the model for the next action
    Decide,
    /// Execute the chosen tool
    Act { tool: ToolKind, args: Vec<String> },
    /// Append the observation to the scratchpad
    Remember { observation: String },
    /// Terminal: the model answered
    Done { answer: String },
}

/// Drives the browsing loop for one task at a time.
pub struct Agent {
    config: Config,
    llm: Arc<dyn LlmProvider>,
    annotator: Annotator,
    tools: ToolRegistry,
    observer: Arc<dyn StepObserver>,
}

impl Agent {
    /// Create an agent backed by Ollama, per the configuration.
    pub fn new(config: Config) -> Self {
        let llm = Arc::new(OllamaClient::from_config(&config));
        Self::with_provider(config, llm)
    }

    /// Create an agent with a custom model provider.
    pub fn with_provider(config: Config, llm: Arc<dyn LlmProvider>) -> Self {
        let annotator = Annotator::from_config(&config.grounding);
        let tools = ToolRegistry::from_config(&config.tools);
        Self {
            config,
            llm,
            annotator,
            tools,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Replace the step observer.
    pub fn with_observer(mut self, observer: Arc<dyn StepObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Get current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Verify the configured model is available before the first turn.
    pub async fn initialize(&self) -> Result<()> {
        let model = &self.config.model.name;
        if !self.llm.is_model_available(model).await? {
            return Err(WebpilotError::ModelNotFound(model.clone()));
        }
        Ok(())
    }

    /// Run a task against a page with the configured step budget. Returns
    /// the model's answer, or `None` when the budget ran out first.
    pub async fn run(&self, task: &str, page: Arc<dyn Page>) -> Result<Option<String>> {
        self.run_with_budget(task, page, self.config.agent.max_steps)
            .await
    }

    /// Run a task with an explicit step budget.
    pub async fn run_with_budget(
        &self,
        task: &str,
        page: Arc<dyn Page>,
        max_steps: usize,
    ) -> Result<Option<String>> {
        info!(task, max_steps, "starting browsing task");

        let mut state = AgentState::new(task, page);
        let mut steps = 0usize;
        let mut phase = Phase::Decide;

        loop {
            phase = match phase {
                Phase::Decide => {
                    if steps >= max_steps {
                        warn!(steps, "step budget exhausted, abandoning task");
                        return Ok(None);
                    }
                    steps += 1;
                    self.decide(&mut state, steps).await?
                }

                Phase::Act { tool, args } => {
                    let observation = self
                        .tools
                        .dispatch(tool, &args, state.page.as_ref(), &state.bboxes)
                        .await;
                    debug!(step = steps, %tool, %observation, "tool dispatched");
                    state.observation = Some(observation.clone());
                    Phase::Remember { observation }
                }

                Phase::Remember { observation } => {
                    state.scratchpad.record(&observation);
                    Phase::Decide
                }

                Phase::Done { answer } => {
                    info!(steps, "task answered");
                    return Ok(Some(answer));
                }
            };
        }
    }

    /// One decide turn: annotate, format, call the model, parse.
    async fn decide(&self, state: &mut AgentState, step: usize) -> Result<Phase> {
        let grounding = self.annotator.annotate(state.page.as_ref()).await?;
        state.apply_grounding(grounding);

        let messages = prompt::build_messages(state);
        let options = GenerateOptions {
            temperature: Some(self.config.model.temperature),
            ..Default::default()
        };
        let response = self
            .llm
            .chat(&self.config.model.name, &messages, Some(options))
            .await?;

        let prediction = parser::parse(&response.content);
        self.observer.on_decide(step, &prediction, &state.screenshot);
        state.prediction = Some(prediction.clone());

        Ok(match prediction {
            Prediction::Answer { args } => Phase::Done {
                answer: args.into_iter().next().unwrap_or_default(),
            },
            Prediction::Retry { reason } => {
                // Not an error: re-enter Decide without touching the
                // scratchpad.
                debug!(step, %reason, "unusable model output, re-deciding");
                Phase::Decide
            }
            Prediction::Tool { tool, args } => Phase::Act { tool, args },
        })
    }
}
