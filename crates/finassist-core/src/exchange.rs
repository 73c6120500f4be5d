//! Exchange controller: one user turn, one network call

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ExchangeError, SubmitError};
use crate::state::{ConversationState, ExchangeOutcome, PendingExchange};

/// Transport for a single chat request
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send(&self, user_input: &str) -> Result<String, ExchangeError>;
}

/// Perform the network half of an exchange. Kept separate from the state
/// so a front-end can run it on a background task and `resolve` later.
pub async fn dispatch<B>(backend: &B, pending: PendingExchange) -> ExchangeOutcome
where
    B: ChatBackend + ?Sized,
{
    debug!(chars = pending.text().chars().count(), "dispatching exchange");
    backend.send(pending.text()).await
}

pub struct ExchangeController<B> {
    backend: B,
}

impl<B: ChatBackend> ExchangeController<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Run a whole exchange against `state`. Failures of the network call
    /// end up in the conversation as the placeholder message; only the
    /// in-flight guard is reported to the caller.
    pub async fn submit(
        &self,
        state: &mut ConversationState,
        text: impl Into<String>,
    ) -> Result<(), SubmitError> {
        let pending = state.submit(text)?;
        let outcome = dispatch(&self.backend, pending).await;
        state.resolve(outcome);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Message, ERROR_PLACEHOLDER};
    use std::sync::Mutex;

    /// Replies with a fixed script and records what it was sent
    struct ScriptedBackend {
        replies: Mutex<Vec<Option<String>>>,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<Option<&str>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().rev().map(|r| r.map(String::from)).collect()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn send(&self, user_input: &str) -> Result<String, ExchangeError> {
            self.seen.lock().unwrap().push(user_input.to_string());
            match self.replies.lock().unwrap().pop().flatten() {
                Some(reply) => Ok(reply),
                None => Err(serde_json::from_str::<serde_json::Value>("{").unwrap_err().into()),
            }
        }
    }

    #[tokio::test]
    async fn test_successful_exchange() {
        let controller = ExchangeController::new(ScriptedBackend::new(vec![Some("see stock.png attached")]));
        let mut state = ConversationState::new();
        state.set_pending_input("AAPL price?");

        controller.submit(&mut state, "AAPL price?").await.unwrap();

        assert_eq!(
            state.messages(),
            &[
                Message::user("AAPL price?"),
                Message::assistant("see stock.png attached"),
            ]
        );
        assert!(state.chart_visible());
        assert!(!state.is_waiting());
        assert_eq!(state.pending_input(), "");
        assert_eq!(*controller.backend().seen.lock().unwrap(), vec!["AAPL price?"]);
    }

    #[tokio::test]
    async fn test_failed_exchange_keeps_session_usable() {
        let controller = ExchangeController::new(ScriptedBackend::new(vec![None, Some("AAPL is up 2%")]));
        let mut state = ConversationState::new();

        controller.submit(&mut state, "first").await.unwrap();
        assert_eq!(state.last(), Some(&Message::assistant(ERROR_PLACEHOLDER)));
        assert!(!state.is_waiting());

        controller.submit(&mut state, "second").await.unwrap();
        assert_eq!(state.len(), 4);
        assert_eq!(state.last(), Some(&Message::assistant("AAPL is up 2%")));
        assert!(!state.chart_visible());
    }

    #[tokio::test]
    async fn test_dispatch_sends_pending_text() {
        let backend = ScriptedBackend::new(vec![Some("ok")]);
        let mut state = ConversationState::new();
        let pending = state.submit("  spaced  ").unwrap();

        let outcome = dispatch(&backend, pending).await;
        assert_eq!(outcome.unwrap(), "ok");
        assert_eq!(*backend.seen.lock().unwrap(), vec!["  spaced  "]);
        assert!(state.is_waiting());
    }
}
