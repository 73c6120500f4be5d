//! One-shot `ask` command

use std::io::Write;

use anyhow::Result;
use finassist_core::{dispatch, ChatBackend, ConversationState};

/// Run a single exchange and print the assistant's message (the reply, or
/// the placeholder on failure). Returns whether the exchange succeeded.
pub async fn ask_once<B, W>(backend: &B, chart_url: &str, text: String, out: &mut W) -> Result<bool>
where
    B: ChatBackend + ?Sized,
    W: Write,
{
    let mut state = ConversationState::new();

    let pending = state.submit(text)?;
    let outcome = dispatch(backend, pending).await;
    let succeeded = outcome.is_ok();
    state.resolve(outcome);

    if let Some(reply) = state.last() {
        writeln!(out, "{}", reply.text)?;
    }
    if state.chart_visible() {
        writeln!(out, "\n📊 Chart: {}", chart_url)?;
    }

    Ok(succeeded)
}
