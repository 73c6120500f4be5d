pub mod client;
pub mod config;
pub mod error;
pub mod exchange;
pub mod state;

// Re-export main types for convenience
pub use client::AssistantClient;
pub use config::Config;
pub use error::{ChartError, ExchangeError, SubmitError};
pub use exchange::{dispatch, ChatBackend, ExchangeController};
pub use state::{
    mentions_chart, ConversationState, ExchangeOutcome, Message, PendingExchange, Sender,
    ERROR_PLACEHOLDER,
};
