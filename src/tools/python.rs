use crate::tools::registry::Capability;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

pub const DEFAULT_PYTHON_BIN: &str = "python3";
pub const DEFAULT_CODE_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-stream cap on captured output.
const MAX_OUTPUT: usize = 20_000;

/// `python_exec`: runs the input as a Python program in a subprocess.
///
/// A non-zero exit is not an error: the traceback is exactly what the model
/// needs to see. Only failing to run the interpreter at all, or running past
/// the timeout, is reported as a capability failure.
pub struct PythonExecTool {
    python_bin: String,
    timeout: Duration,
}

impl PythonExecTool {
    pub fn new(python_bin: impl Into<String>, timeout: Duration) -> Self {
        Self {
            python_bin: python_bin.into(),
            timeout,
        }
    }
}

impl Default for PythonExecTool {
    fn default() -> Self {
        Self::new(DEFAULT_PYTHON_BIN, DEFAULT_CODE_TIMEOUT)
    }
}

/// Drop a surrounding markdown code fence, if any.
fn strip_code_fence(code: &str) -> &str {
    let trimmed = code.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // skip the language tag line
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim_end()
}

fn truncate(text: &str) -> String {
    if text.len() <= MAX_OUTPUT {
        return text.to_string();
    }
    let cut = text
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= MAX_OUTPUT)
        .last()
        .unwrap_or(0);
    format!("{}...[truncated, {} bytes total]", &text[..cut], text.len())
}

#[async_trait]
impl Capability for PythonExecTool {
    fn name(&self) -> &str {
        "python_exec"
    }

    fn description(&self) -> &str {
        "Execute a Python program and return its exit code, stdout and stderr. \
         Use print() to show results."
    }

    fn input_description(&self) -> &str {
        "Complete Python source code to run"
    }

    async fn invoke(&self, input: &str) -> Result<String> {
        let code = strip_code_fence(input);
        if code.is_empty() {
            return Err(AppError::CapabilityInvocation(
                "python_exec needs some code to run".to_string(),
            ));
        }

        let mut cmd = Command::new(&self.python_bin);
        cmd.arg("-c")
            .arg(code)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(AppError::CapabilityInvocation(format!(
                    "Failed to run '{}': {}",
                    self.python_bin, e
                )))
            }
            Err(_) => {
                return Err(AppError::CapabilityInvocation(format!(
                    "Code execution timed out after {:.1}s",
                    self.timeout.as_secs_f64()
                )))
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let exit_code = output.status.code().unwrap_or(-1);
        tracing::debug!(exit_code, "Python program finished");

        let mut rendered = format!("exit code: {}\nstdout:\n{}", exit_code, truncate(&stdout));
        if !stderr.trim().is_empty() {
            rendered.push_str("\nstderr:\n");
            rendered.push_str(&truncate(&stderr));
        }
        Ok(rendered)
    }
}
