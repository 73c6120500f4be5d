//! UI-agnostic conversation state
//!
//! The conversation is a plain value that only changes through the
//! transitions on [`ConversationState`]. None of them perform I/O, so the
//! terminal front-end, the one-shot CLI and the tests all drive the same
//! state machine: Idle -> Waiting (submit) -> Resolved | Failed -> Idle.

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{ExchangeError, SubmitError};

/// Assistant message appended when an exchange fails for any reason
pub const ERROR_PLACEHOLDER: &str = "⚠️ An error occurred while contacting the assistant.";

/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
        }
    }
}

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// The text of a submitted message, waiting to be sent to the endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingExchange {
    text: String,
}

impl PendingExchange {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// What the network call produced for one exchange
pub type ExchangeOutcome = Result<String, ExchangeError>;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationState {
    messages: Vec<Message>,
    pending_input: String,
    is_waiting: bool,
    chart_visible: bool,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    // Store operations

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn set_waiting(&mut self, waiting: bool) {
        self.is_waiting = waiting;
    }

    pub fn set_chart_visible(&mut self, visible: bool) {
        self.chart_visible = visible;
    }

    pub fn set_pending_input(&mut self, input: impl Into<String>) {
        self.pending_input = input.into();
    }

    /// Draft line as edited by the UI
    pub fn pending_input_mut(&mut self) -> &mut String {
        &mut self.pending_input
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    pub fn is_waiting(&self) -> bool {
        self.is_waiting
    }

    pub fn chart_visible(&self) -> bool {
        self.chart_visible
    }

    // Transitions

    /// Start an exchange with `text`. Any text is accepted, including an
    /// empty string. Rejected only while a previous exchange is waiting,
    /// in which case the state is left untouched.
    pub fn submit(&mut self, text: impl Into<String>) -> Result<PendingExchange, SubmitError> {
        if self.is_waiting {
            return Err(SubmitError::ExchangeInFlight);
        }

        let text = text.into();
        self.append(Message::user(text.clone()));
        self.pending_input.clear();
        self.set_waiting(true);

        Ok(PendingExchange { text })
    }

    /// Submit whatever is currently in the draft line
    pub fn submit_pending(&mut self) -> Result<PendingExchange, SubmitError> {
        if self.is_waiting {
            return Err(SubmitError::ExchangeInFlight);
        }
        let text = std::mem::take(&mut self.pending_input);
        self.submit(text)
    }

    pub fn on_success(&mut self, reply: impl Into<String>) {
        let reply = reply.into();
        if mentions_chart(&reply) {
            self.set_chart_visible(true);
        }
        self.append(Message::assistant(reply));
        self.set_waiting(false);
    }

    /// The chart flag is deliberately left alone here
    pub fn on_failure(&mut self) {
        self.append(Message::assistant(ERROR_PLACEHOLDER));
        self.set_waiting(false);
    }

    pub fn resolve(&mut self, outcome: ExchangeOutcome) {
        match outcome {
            Ok(reply) => {
                info!(chars = reply.chars().count(), "assistant replied");
                self.on_success(reply);
            }
            Err(e) => {
                error!("Error contacting assistant: {}", e);
                self.on_failure();
            }
        }
    }
}

/// True when the reply refers to the generated chart file. Full Unicode
/// lowercasing, so e.g. the Kelvin sign folds to `k` but a long s does not
/// fold to `s`.
pub fn mentions_chart(reply: &str) -> bool {
    reply.to_lowercase().contains("stock.png")
}
