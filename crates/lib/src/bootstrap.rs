//! Startup self-description: the six-agent crew describes the bot from its approved prompt.

use crate::crew::{self_description_crew, PipelineError, APPROVED_PROMPT_KEY, BOT_APPROVED_PROMPT};
use crate::llm::LlmBackend;

/// Run the self-description crew and return its final report.
pub async fn self_describe(llm: &dyn LlmBackend) -> Result<String, PipelineError> {
    let crew = self_description_crew();
    let out = crew
        .kickoff(llm, &[(APPROVED_PROMPT_KEY, BOT_APPROVED_PROMPT)])
        .await?;
    Ok(out.final_output().to_string())
}

/// Run [`self_describe`] at serve time. Failures are logged; startup continues.
pub async fn run_at_startup(llm: &dyn LlmBackend) {
    log::info!("bootstrap: running self-description crew");
    match self_describe(llm).await {
        Ok(report) => log::info!("bootstrap: self-description finished\n{}", report),
        Err(e) => log::warn!("bootstrap: self-description failed, continuing: {}", e),
    }
}
