//! PDF Text Extraction
//!
//! Converts uploaded PDF bytes into plain text for brand details.
//!
//! The extractor is a trait so that the subprocess backend can be swapped for an
//! in-process library without touching the upload handler.
//!
//! ## Requirements
//!
//! - `pdftotext` (poppler-utils) must be installed and available in PATH
//!   - Ubuntu/Debian: `apt-get install poppler-utils`
//!   - macOS: `brew install poppler`

mod pdftotext;

pub use pdftotext::{PdfToTextConfig, PdfToTextExtractor};

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Text extraction errors
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The extraction program is not installed or not on PATH
    #[error(
        "{tool} command not found: please ensure poppler-utils is installed and in the system PATH"
    )]
    ToolUnavailable { tool: String },

    #[error("{tool} timed out after {}s", .timeout.as_secs())]
    Timeout { tool: String, timeout: Duration },

    /// The program ran and exited with a failure status
    #[error("{tool} execution failed (exit code {code:?}): {stderr}")]
    Failed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Text extractor trait
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Short name of the backend, used in logs
    fn name(&self) -> &str;

    /// Check if the backend can run on this host
    async fn is_available(&self) -> bool;

    /// Extract plain text from PDF bytes.
    ///
    /// Output is trimmed. An empty string is a valid result (image-only or
    /// empty PDFs); callers decide what to do with it.
    async fn extract(&self, pdf_data: &[u8]) -> Result<String, ExtractError>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted extractor for handler tests

    use std::time::Duration;

    use async_trait::async_trait;

    use super::{ExtractError, TextExtractor};

    type Script = Box<dyn Fn(&[u8]) -> Result<String, ExtractError> + Send + Sync>;

    pub struct ScriptedExtractor {
        script: Script,
        delay: Option<Duration>,
    }

    impl ScriptedExtractor {
        /// Returns the input bytes as text, trimmed like pdftotext output
        pub fn echo() -> Self {
            Self::new(|data| Ok(String::from_utf8_lossy(data).trim().to_string()))
        }

        pub fn failing<F>(make_error: F) -> Self
        where
            F: Fn() -> ExtractError + Send + Sync + 'static,
        {
            Self::new(move |_| Err(make_error()))
        }

        pub fn new<F>(script: F) -> Self
        where
            F: Fn(&[u8]) -> Result<String, ExtractError> + Send + Sync + 'static,
        {
            Self {
                script: Box::new(script),
                delay: None,
            }
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    #[async_trait]
    impl TextExtractor for ScriptedExtractor {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn extract(&self, pdf_data: &[u8]) -> Result<String, ExtractError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            (self.script)(pdf_data)
        }
    }
}
