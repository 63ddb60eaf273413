// ABOUTME: Sanitized raw engine command execution.
// ABOUTME: Only commands starting with `docker` are run, cut at shell separators.

use crate::runtime::{Engine, EngineError, EngineResult};
use chrono::{DateTime, Utc};
use serde::Serialize;

const ALLOWED_PREFIX: &str = "docker";
const EMPTY_SUCCESS: &str = "Command executed successfully";

/// Outcome of a raw command. A failing command is still a successful call.
#[derive(Debug, Clone, Serialize)]
pub struct CommandResult {
    pub success: bool,
    pub command: String,
    pub output: String,
    pub source: String,
    pub timestamp: DateTime<Utc>,
}

/// Cut the command at the first `&`, `;` or `|` and require a `docker` prefix.
pub fn sanitize_command(command: &str) -> EngineResult<String> {
    let head = command
        .split(['&', ';', '|'])
        .next()
        .unwrap_or_default()
        .trim();

    if head.is_empty() {
        return Err(EngineError::Validation("command is required".to_string()));
    }
    if !head.starts_with(ALLOWED_PREFIX) {
        return Err(EngineError::Validation(
            "only docker commands are allowed; commands must start with \"docker\"".to_string(),
        ));
    }
    Ok(head.to_string())
}

/// Run a sanitized command through the engine's execution context.
pub async fn run_command<E>(engine: &E, command: &str) -> EngineResult<CommandResult>
where
    E: Engine + ?Sized,
{
    let sanitized = sanitize_command(command)?;
    let mut words = sanitized.split_whitespace().map(str::to_string);
    let program = words.next().unwrap_or_default();
    let args: Vec<String> = words.collect();

    tracing::info!(command = %sanitized, source = %engine.source(), "running engine command");
    let output = engine.run_engine_command(&program, &args).await?;

    let stdout = output.stdout_text().into_owned();
    let (success, text) = if output.success() {
        let text = if !stdout.is_empty() {
            stdout
        } else if !output.stderr.trim().is_empty() {
            output.stderr.clone()
        } else {
            EMPTY_SUCCESS.to_string()
        };
        (true, text)
    } else if !output.stderr.trim().is_empty() {
        (false, output.stderr.clone())
    } else {
        (false, format!("{program} exited with status {}", output.exit_code))
    };

    Ok(CommandResult {
        success,
        command: sanitized,
        output: text,
        source: engine.source().to_string(),
        timestamp: Utc::now(),
    })
}
