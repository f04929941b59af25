//! pdftotext backend
//!
//! Streams the PDF through `pdftotext - -` (stdin in, stdout out) under a
//! wall-clock budget. The child is spawned with `kill_on_drop`, so dropping the
//! future on timeout also terminates the process.

use std::io::ErrorKind;
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{ExtractError, TextExtractor};
use crate::config::ExtractorConfig;

/// Configuration for the pdftotext extractor
#[derive(Debug, Clone)]
pub struct PdfToTextConfig {
    /// Path to pdftotext executable (default: "pdftotext" - uses PATH)
    pub program: String,
    /// Arguments; the defaults read the PDF from stdin and write text to stdout
    pub args: Vec<String>,
    /// Wall-clock budget for one run (default: 15s)
    pub timeout: Duration,
}

impl Default for PdfToTextConfig {
    fn default() -> Self {
        Self {
            program: "pdftotext".to_string(),
            args: vec!["-".to_string(), "-".to_string()],
            timeout: Duration::from_secs(15),
        }
    }
}

impl From<&ExtractorConfig> for PdfToTextConfig {
    fn from(config: &ExtractorConfig) -> Self {
        Self {
            program: config.pdftotext_path.clone(),
            timeout: config.timeout,
            ..Self::default()
        }
    }
}

/// Text extractor backed by the pdftotext command-line tool
pub struct PdfToTextExtractor {
    config: PdfToTextConfig,
}

impl PdfToTextExtractor {
    pub fn new(config: PdfToTextConfig) -> Self {
        Self { config }
    }

    fn spawn_error(&self, err: std::io::Error) -> ExtractError {
        if err.kind() == ErrorKind::NotFound {
            ExtractError::ToolUnavailable {
                tool: self.config.program.clone(),
            }
        } else {
            ExtractError::Io(err)
        }
    }

    async fn run(&self, pdf_data: &[u8]) -> Result<Output, ExtractError> {
        let mut child = Command::new(&self.config.program)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| std::io::Error::new(ErrorKind::Other, "child stdin was not captured"))?;

        // Feed stdin while draining stdout/stderr so a large document can't
        // deadlock on a full pipe.
        let write_input = async move {
            stdin.write_all(pdf_data).await?;
            stdin.shutdown().await
        };
        let (written, output) = tokio::join!(write_input, child.wait_with_output());
        let output = output?;

        if let Err(e) = written {
            // A tool that rejects its input early closes the pipe on us; its
            // exit status is the better diagnostic in that case.
            if output.status.success() {
                return Err(ExtractError::Io(e));
            }
            tracing::debug!("{} closed stdin early: {}", self.config.program, e);
        }

        Ok(output)
    }
}

#[async_trait]
impl TextExtractor for PdfToTextExtractor {
    fn name(&self) -> &str {
        &self.config.program
    }

    async fn is_available(&self) -> bool {
        // Old poppler releases exit non-zero for -v, so only spawnability counts
        let result = Command::new(&self.config.program)
            .arg("-v")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        result.is_ok()
    }

    async fn extract(&self, pdf_data: &[u8]) -> Result<String, ExtractError> {
        let tool = &self.config.program;
        tracing::debug!(bytes = pdf_data.len(), "Attempting to run {}", tool);

        let output = match tokio::time::timeout(self.config.timeout, self.run(pdf_data)).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                tracing::warn!("{} could not run: {}", tool, e);
                return Err(e);
            }
            Err(_) => {
                tracing::warn!("{} timed out after {:?}", tool, self.config.timeout);
                return Err(ExtractError::Timeout {
                    tool: tool.clone(),
                    timeout: self.config.timeout,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::warn!(
                code = ?output.status.code(),
                "{} execution failed. Stderr: {}",
                tool,
                stderr
            );
            return Err(ExtractError::Failed {
                tool: tool.clone(),
                code: output.status.code(),
                stderr,
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        tracing::info!(bytes = text.len(), "{} executed successfully", tool);

        if text.is_empty() {
            tracing::warn!("{} produced no text output; PDF might be image-based or empty", tool);
        }

        Ok(text)
    }
}
