use crate::utils::error::{Result, SweepError};
use crate::utils::is_non_interactive;
use async_trait::async_trait;
use dialoguer::Confirm;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Enter pressed during the countdown.
    UserRequested,
    /// Ctrl-C.
    Interrupted,
    /// Prompt answered with anything but yes.
    Declined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Cancelled(CancelReason),
}

/// Decides whether a pending deletion may start. `resolve` takes the gate by
/// value, so each gate yields exactly one decision.
#[async_trait]
pub trait ConfirmationGate: Send {
    async fn resolve(self, pending: usize) -> Result<Decision>;
}

/// Proceeds when the window elapses unless a cancel signal arrives first.
pub struct CountdownGate {
    window: Duration,
    cancel: UnboundedReceiver<CancelReason>,
}

impl CountdownGate {
    pub fn new(window: Duration, cancel: UnboundedReceiver<CancelReason>) -> Self {
        Self { window, cancel }
    }
}

#[async_trait]
impl ConfirmationGate for CountdownGate {
    async fn resolve(self, pending: usize) -> Result<Decision> {
        let Self { window, mut cancel } = self;
        debug!("countdown of {:?} before deleting {} branches", window, pending);

        let expiry = tokio::time::sleep(window);
        tokio::pin!(expiry);
        let mut signals_open = true;

        loop {
            // Cancel is polled first so that a signal ready at the same
            // instant as expiry wins.
            tokio::select! {
                biased;
                signal = cancel.recv(), if signals_open => match signal {
                    Some(reason) => return Ok(Decision::Cancelled(reason)),
                    None => signals_open = false,
                },
                _ = &mut expiry => return Ok(Decision::Proceed),
            }
        }
    }
}

/// Blocking source of a yes/no answer for a question.
pub type AnswerSource = Box<dyn FnOnce(String) -> bool + Send + 'static>;

/// Asks a yes/no question and proceeds only on yes; a cancel signal while
/// waiting counts as a refusal.
pub struct PromptGate {
    prompt: String,
    answer: AnswerSource,
    cancel: UnboundedReceiver<CancelReason>,
}

impl PromptGate {
    /// Prompts on the terminal. Fails when nobody can answer.
    pub fn new(prompt: impl Into<String>, cancel: UnboundedReceiver<CancelReason>) -> Result<Self> {
        if is_non_interactive() {
            return Err(SweepError::invalid_args(
                "Cannot prompt for confirmation in non-interactive mode. Use --confirm countdown instead.",
            ));
        }

        Ok(Self::with_answer(prompt, cancel, ask_terminal))
    }

    pub fn with_answer<F>(
        prompt: impl Into<String>,
        cancel: UnboundedReceiver<CancelReason>,
        answer: F,
    ) -> Self
    where
        F: FnOnce(String) -> bool + Send + 'static,
    {
        Self {
            prompt: prompt.into(),
            answer: Box::new(answer),
            cancel,
        }
    }
}

fn ask_terminal(question: String) -> bool {
    Confirm::new()
        .with_prompt(question)
        .default(false)
        .interact()
        .unwrap_or(false)
}

#[async_trait]
impl ConfirmationGate for PromptGate {
    async fn resolve(self, pending: usize) -> Result<Decision> {
        let Self {
            prompt,
            answer,
            mut cancel,
        } = self;
        let question = format!("{} ({} branches)", prompt, pending);
        let answered = tokio::task::spawn_blocking(move || answer(question));

        tokio::select! {
            biased;
            Some(reason) = cancel.recv() => Ok(Decision::Cancelled(reason)),
            answered = answered => match answered {
                Ok(true) => Ok(Decision::Proceed),
                Ok(false) => Ok(Decision::Cancelled(CancelReason::Declined)),
                Err(e) => Err(SweepError::invalid_state(format!(
                    "confirmation prompt failed: {}",
                    e
                ))),
            },
        }
    }
}
