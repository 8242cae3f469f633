use anyhow::{Context, Result};
use colored::Colorize;
use ws_call::{CallResult, ClassifiedError};

/// Plain-text lines describing a failed call.
#[must_use]
pub fn failure_lines(err: &ClassifiedError) -> Vec<String> {
    match err {
        ClassifiedError::RemoteFault { code, reason } => vec![
            format!("SOAP Fault Code: {code}"),
            format!("SOAP Fault String: {reason}"),
        ],
        ClassifiedError::Timeout => vec!["Call timed out before a response arrived".to_owned()],
        ClassifiedError::CommunicationFailure { message } => {
            vec![format!("Communication failure: {message}")]
        }
        ClassifiedError::Unknown { message } => vec![format!("Unexpected failure: {message}")],
    }
}

/// # Errors
/// Fails only if the result cannot be serialized.
pub fn to_json(result: &CallResult<String>) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize call result")
}

pub fn print_human(result: &CallResult<String>) {
    match result {
        CallResult::Success(body) if body.is_empty() => {
            eprintln!("{}", "(empty response)".dimmed());
        }
        CallResult::Success(body) => println!("{body}"),
        CallResult::Failure(err) => {
            eprintln!("{} {}", "call failed:".red().bold(), err.kind());
            for line in failure_lines(err) {
                eprintln!("{line}");
            }
        }
    }
}
