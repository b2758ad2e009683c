//! Sequential multi-agent crew runner.
//!
//! A crew is an ordered list of stages; each stage pairs an agent persona with a task.
//! Stages run one after another and every stage sees the outputs of all earlier stages,
//! so later stages (consolidation, validation) build on research and debate.
//! Crews are immutable once built and are shared across tasks through `Arc`.

mod plans;

use crate::llm::{ChatMessage, LlmBackend, LlmError};
use std::sync::Arc;
use std::time::Instant;

pub use plans::{
    project_brief_crew, self_description_crew, APPROVED_PROMPT_KEY, BOT_APPROVED_PROMPT,
    USER_REQUEST_KEY,
};

/// Agent persona: who answers a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSpec {
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

impl AgentSpec {
    pub fn new(role: impl Into<String>, goal: impl Into<String>, backstory: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
        }
    }

    fn system_prompt(&self) -> String {
        format!(
            "Você é {}. {}\n\nSeu objetivo pessoal é: {}",
            self.role, self.backstory, self.goal
        )
    }
}

/// What a stage must produce. `description` may contain `{key}` placeholders filled from kickoff inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub description: String,
    pub expected_output: String,
}

impl TaskSpec {
    pub fn new(description: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            expected_output: expected_output.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Stage {
    pub agent: Arc<AgentSpec>,
    pub task: TaskSpec,
}

/// Output of one finished stage.
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub role: String,
    pub output: String,
}

/// Result of a full crew run. The last stage's output is the crew's answer.
#[derive(Debug, Clone)]
pub struct CrewOutput {
    pub stages: Vec<StageOutput>,
    pub duration_ms: u64,
}

impl CrewOutput {
    pub fn final_output(&self) -> &str {
        self.stages.last().map(|s| s.output.as_str()).unwrap_or("")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("crew {0} has no stages")]
    NoStages(String),
    #[error("stage {stage} ({role}) failed: {source}")]
    Stage {
        stage: usize,
        role: String,
        #[source]
        source: LlmError,
    },
    #[error("crew produced empty output")]
    EmptyOutput,
    #[error("crew timed out after {0}s")]
    Timeout(u64),
}

/// Ordered stages run sequentially against one LLM backend.
#[derive(Debug, Clone)]
pub struct Crew {
    name: String,
    stages: Vec<Stage>,
}

impl Crew {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
        }
    }

    /// Append a stage.
    pub fn stage(mut self, agent: Arc<AgentSpec>, task: TaskSpec) -> Self {
        self.stages.push(Stage { agent, task });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run every stage in order. Inputs fill `{key}` placeholders in task descriptions.
    /// Stops at the first failing stage.
    pub async fn kickoff(
        &self,
        llm: &dyn LlmBackend,
        inputs: &[(&str, &str)],
    ) -> Result<CrewOutput, PipelineError> {
        if self.stages.is_empty() {
            return Err(PipelineError::NoStages(self.name.clone()));
        }
        let started = Instant::now();
        let total = self.stages.len();
        log::info!("crew {}: starting {} stage(s) on {}", self.name, total, llm.model());

        let mut done: Vec<StageOutput> = Vec::with_capacity(total);
        for (i, stage) in self.stages.iter().enumerate() {
            let stage_no = i + 1;
            log::info!(
                "crew {}: stage {}/{} ({})",
                self.name,
                stage_no,
                total,
                stage.agent.role
            );
            let messages = stage_messages(stage, inputs, &done);
            let output = llm
                .chat(messages)
                .await
                .map_err(|source| PipelineError::Stage {
                    stage: stage_no,
                    role: stage.agent.role.clone(),
                    source,
                })?;
            log::debug!(
                "crew {}: stage {} produced {} chars",
                self.name,
                stage_no,
                output.len()
            );
            done.push(StageOutput {
                role: stage.agent.role.clone(),
                output,
            });
        }

        let out = CrewOutput {
            stages: done,
            duration_ms: started.elapsed().as_millis() as u64,
        };
        if out.final_output().trim().is_empty() {
            return Err(PipelineError::EmptyOutput);
        }
        log::info!("crew {}: finished in {} ms", self.name, out.duration_ms);
        Ok(out)
    }
}

/// Replace each `{key}` with its value. Unknown placeholders stay as written.
pub fn render_template(template: &str, inputs: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in inputs {
        out = out.replace(&format!("{{{}}}", key), value);
    }
    out
}

/// Messages for one stage: persona as system message, task plus prior outputs as the user turn.
fn stage_messages(stage: &Stage, inputs: &[(&str, &str)], previous: &[StageOutput]) -> Vec<ChatMessage> {
    let mut prompt = format!(
        "Tarefa atual: {}\n\nEste é o resultado esperado: {}\n",
        render_template(&stage.task.description, inputs),
        stage.task.expected_output
    );
    if !previous.is_empty() {
        prompt.push_str("\nContexto das tarefas anteriores:\n");
        for p in previous {
            prompt.push_str("\n--- ");
            prompt.push_str(&p.role);
            prompt.push_str(" ---\n");
            prompt.push_str(p.output.trim());
            prompt.push('\n');
        }
    }
    prompt.push_str("\nComece! Entregue sua resposta final completa.");
    vec![
        ChatMessage::system(stage.agent.system_prompt()),
        ChatMessage::user(prompt),
    ]
}
