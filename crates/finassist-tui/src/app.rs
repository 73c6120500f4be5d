use std::path::PathBuf;

use ratatui::layout::Rect;
use tokio::task::JoinHandle;
use tracing::{error, info};

use finassist_core::{
    dispatch, AssistantClient, ChartError, Config, ConversationState, ExchangeOutcome, SubmitError,
};

pub struct App {
    pub should_quit: bool,

    // Conversation (messages, draft line, waiting and chart flags)
    pub conversation: ConversationState,
    pub input_cursor: usize, // cursor position in the draft, in chars

    // Chat pane scroll state
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations
    pub chat_area: Option<Rect>,

    // Background work
    pub exchange_task: Option<JoinHandle<ExchangeOutcome>>,
    pub download_task: Option<JoinHandle<Result<u64, ChartError>>>,

    pub status: Option<String>,
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub client: AssistantClient,
    pub config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            should_quit: false,
            conversation: ConversationState::new(),
            input_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_area: None,
            exchange_task: None,
            download_task: None,
            status: None,
            animation_frame: 0,
            client: AssistantClient::from_config(&config),
            config,
        }
    }

    /// Send the draft line to the assistant on a background task
    pub fn submit_input(&mut self) {
        match self.conversation.submit_pending() {
            Ok(pending) => {
                self.input_cursor = 0;
                self.status = None;
                let client = self.client.clone();
                self.exchange_task = Some(tokio::spawn(async move {
                    dispatch(&client, pending).await
                }));
                self.scroll_to_bottom();
            }
            Err(SubmitError::ExchangeInFlight) => {
                self.status = Some("Still waiting for the assistant...".to_string());
            }
        }
    }

    pub fn chart_download_path(&self) -> PathBuf {
        PathBuf::from(&self.config.chart_file_name)
    }

    pub fn start_chart_download(&mut self) {
        if !self.conversation.chart_visible() {
            self.status = Some("No chart to download yet".to_string());
            return;
        }
        if self.download_task.is_some() {
            return;
        }

        let client = self.client.clone();
        let path = self.chart_download_path();
        self.status = Some(format!("Downloading chart to {}...", path.display()));
        self.download_task = Some(tokio::spawn(async move {
            client.download_chart(&path).await
        }));
    }

    /// Apply the results of any finished background tasks
    pub async fn poll_tasks(&mut self) {
        if self.exchange_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.exchange_task.take() {
                match task.await {
                    Ok(outcome) => self.conversation.resolve(outcome),
                    Err(e) => {
                        error!("exchange task did not complete: {}", e);
                        self.conversation.on_failure();
                    }
                }
                self.scroll_to_bottom();
            }
        }

        if self.download_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.download_task.take() {
                let path = self.chart_download_path();
                self.status = Some(match task.await {
                    Ok(Ok(bytes)) => {
                        info!(bytes, path = %path.display(), "chart downloaded");
                        format!("Chart saved to {} ({} bytes)", path.display(), bytes)
                    }
                    Ok(Err(e)) => {
                        error!("chart download failed: {}", e);
                        format!("Chart download failed: {}", e)
                    }
                    Err(e) => {
                        error!("chart download task did not complete: {}", e);
                        "Chart download failed".to_string()
                    }
                });
            }
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.conversation.is_waiting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Draft line editing, cursor counted in chars for UTF-8 safety

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(self.conversation.pending_input(), self.input_cursor);
        self.conversation.pending_input_mut().insert(byte_pos, c);
        self.input_cursor += 1;
    }

    pub fn delete_char_before_cursor(&mut self) {
        if self.input_cursor > 0 {
            self.input_cursor -= 1;
            let byte_pos = char_to_byte_index(self.conversation.pending_input(), self.input_cursor);
            self.conversation.pending_input_mut().remove(byte_pos);
        }
    }

    pub fn delete_char_at_cursor(&mut self) {
        if self.input_cursor < self.input_len() {
            let byte_pos = char_to_byte_index(self.conversation.pending_input(), self.input_cursor);
            self.conversation.pending_input_mut().remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.input_cursor = self.input_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.input_cursor = (self.input_cursor + 1).min(self.input_len());
    }

    pub fn cursor_home(&mut self) {
        self.input_cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.input_cursor = self.input_len();
    }

    fn input_len(&self) -> usize {
        self.conversation.pending_input().chars().count()
    }

    // Chat scrolling

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max_scroll = self.total_chat_lines().saturating_sub(self.visible_chat_height());
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max_scroll);
    }

    pub fn scroll_page_up(&mut self) {
        self.scroll_up(self.visible_chat_height() / 2);
    }

    pub fn scroll_page_down(&mut self) {
        self.scroll_down(self.visible_chat_height() / 2);
    }

    /// Scroll chat to bottom so the newest message (or "Thinking...") is visible
    pub fn scroll_to_bottom(&mut self) {
        let total_lines = self.total_chat_lines();
        let visible_height = self.visible_chat_height();

        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }

    fn visible_chat_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    /// Rendered line count of the chat pane, mirroring the layout in `ui`
    pub fn total_chat_lines(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in self.conversation.messages() {
            total_lines = total_lines.saturating_add(1); // "You:" or "AI:"
            let mut content_lines = 0u16;
            for line in msg.text.lines() {
                // Character count, not byte length
                let char_count = line.chars().count();
                let rows = char_count.div_ceil(wrap_width).max(1);
                content_lines = content_lines.saturating_add(rows as u16);
            }
            // An empty message still renders one line
            total_lines = total_lines.saturating_add(content_lines.max(1));
            total_lines = total_lines.saturating_add(1); // blank line after message
        }

        if self.conversation.is_waiting() {
            total_lines = total_lines.saturating_add(2); // "AI:" + "Thinking..."
        }

        total_lines
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
