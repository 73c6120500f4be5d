//! Error types for talking to the assistant endpoint

use reqwest::StatusCode;
use thiserror::Error;

/// Why an exchange failed. The cause is logged but never shown to the
/// user; every variant renders as the same placeholder message.
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("assistant returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed reply: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("chart request failed with status: {0}")]
    Status(StatusCode),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Returned when a submission is attempted while another exchange is
/// still waiting on the network.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    #[error("an exchange is already in flight")]
    ExchangeInFlight,
}
