//! Shared stdin reader and the terminal confirmation gate.
//!
//! The shell reads commands and the gate reads answers from the same stdin,
//! so both go through one line reader.

use std::io::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use webmcp_tools::{ConfirmationDecision, ConfirmationGate, ConfirmationRequest};

/// Line reader over stdin.
#[derive(Clone)]
pub struct Terminal {
    lines: Arc<Mutex<Lines<BufReader<Stdin>>>>,
}

impl Terminal {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines())),
        }
    }

    /// Print `prompt` and read one line. `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout or stdin fails.
    pub async fn read_line(&self, prompt: &str) -> std::io::Result<Option<String>> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;
        self.lines.lock().await.next_line().await
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

/// Asks the operator at the terminal.
#[derive(Clone)]
pub struct TerminalGate {
    terminal: Terminal,
}

impl TerminalGate {
    #[must_use]
    pub const fn new(terminal: Terminal) -> Self {
        Self { terminal }
    }
}

#[async_trait]
impl ConfirmationGate for TerminalGate {
    async fn request_confirmation(&self, request: &ConfirmationRequest) -> ConfirmationDecision {
        let prompt = format!("{} [y/N] ", request.prompt);
        match self.terminal.read_line(&prompt).await {
            Ok(Some(answer)) => ConfirmationDecision {
                approved: is_yes(&answer),
            },
            // Closed or broken terminal: nobody approved.
            Ok(None) => ConfirmationDecision::DECLINED,
            Err(e) => {
                tracing::warn!(error = %e, "Confirmation prompt failed");
                ConfirmationDecision::DECLINED
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
