use std::io::{self, Stderr};
use std::time::Duration;
use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind, MouseEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use futures_util::StreamExt;
use tokio::sync::mpsc;

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

/// Tick interval; drives the "Thinking..." animation and task polling
const TICK_RATE: Duration = Duration::from_millis(300);

/// Everything the main loop reacts to
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// The next draw reads the new size
    Resize,
    Tick,
}

/// Merges terminal input and the tick timer into one channel
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(forward_terminal_events(tx.clone()));
        tokio::spawn(forward_ticks(tx));
        Self { rx }
    }

    /// `None` once both producers have stopped
    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

fn translate(event: Event) -> Option<AppEvent> {
    match event {
        // Presses only, releases are dropped
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
        Event::Mouse(mouse) => Some(AppEvent::Mouse(mouse)),
        Event::Resize(..) => Some(AppEvent::Resize),
        _ => None,
    }
}

async fn forward_terminal_events(tx: mpsc::UnboundedSender<AppEvent>) {
    let mut reader = event::EventStream::new();
    while let Some(result) = reader.next().await {
        let event = match result {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("terminal event error: {}", e);
                continue;
            }
        };
        if let Some(app_event) = translate(event) {
            if tx.send(app_event).is_err() {
                break;
            }
        }
    }
}

async fn forward_ticks(tx: mpsc::UnboundedSender<AppEvent>) {
    let mut interval = tokio::time::interval(TICK_RATE);
    loop {
        interval.tick().await;
        if tx.send(AppEvent::Tick).is_err() {
            break;
        }
    }
}

pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    execute!(io::stderr(), EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(io::stderr());
    let terminal = Terminal::new(backend)?;

    Ok(terminal)
}

pub fn restore() -> Result<()> {
    execute!(io::stderr(), DisableMouseCapture, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

/// Install panic hook to restore terminal on panic
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore();
        original_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    fn key(kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn test_translate_keeps_presses_only() {
        assert!(matches!(translate(key(KeyEventKind::Press)), Some(AppEvent::Key(_))));
        assert!(translate(key(KeyEventKind::Release)).is_none());
        assert!(matches!(translate(Event::Resize(80, 24)), Some(AppEvent::Resize)));
        assert!(translate(Event::FocusGained).is_none());
    }
}
