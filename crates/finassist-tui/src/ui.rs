use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use finassist_core::Sender;
use crate::app::App;

const INPUT_PLACEHOLDER: &str = "Ask me about stocks, plotting, or finance...";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, body_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);

    if app.conversation.chart_visible() {
        let [chat_area, chart_area] = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(5),
        ])
        .areas(body_area);
        render_chat(app, frame, chat_area);
        render_chart_panel(app, frame, chart_area);
    } else {
        render_chat(app, frame, body_area);
    }

    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Financial Assistant ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::Black));
    frame.render_widget(header, area);
}

fn chat_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = Vec::new();

    for msg in app.conversation.messages() {
        let (label, color) = match msg.sender {
            Sender::User => ("You:", Color::Cyan),
            Sender::Assistant => ("AI:", Color::Yellow),
        };
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));

        // Message text is shown exactly as sent or received
        let body_start = lines.len();
        for line in msg.text.lines() {
            lines.push(Line::from(line.to_string()));
        }
        if lines.len() == body_start {
            lines.push(Line::default());
        }
        lines.push(Line::default());
    }

    if app.conversation.is_waiting() {
        lines.push(Line::from(Span::styled(
            "AI:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store area and inner size for mouse hit-testing and scroll calculations
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", app.client.chat_url()));

    let chat_text = if app.conversation.is_empty() && !app.conversation.is_waiting() {
        Text::from(Span::styled(
            INPUT_PLACEHOLDER,
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Text::from(chat_lines(app))
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_chart_panel(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" 📊 Chart Preview ");

    let lines = vec![
        Line::from(vec![
            Span::styled("Chart: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                app.client.chart_url().to_string(),
                Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
            ),
        ]),
        Line::from(vec![
            Span::styled("⬇️ Download Chart ", Style::default().fg(Color::Magenta).bold()),
            Span::styled(
                format!("(Ctrl+D saves {})", app.config.chart_file_name),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
    ];

    let panel = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(panel, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let border_color = if app.conversation.is_waiting() {
        Color::DarkGray
    } else {
        Color::Yellow
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Ask ");

    // Horizontal scrolling keeps the cursor inside the box
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;
    let scroll_offset = input_scroll_offset(cursor_pos, inner_width);

    let draft = app.conversation.pending_input();
    let input = if draft.is_empty() {
        Paragraph::new(Span::styled(INPUT_PLACEHOLDER, Style::default().fg(Color::DarkGray)))
    } else {
        let visible_text: String = draft.chars().skip(scroll_offset).take(inner_width).collect();
        Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan))
    };

    frame.render_widget(input.block(input_block), area);

    let cursor_x = (cursor_pos - scroll_offset) as u16;
    frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
}

fn input_scroll_offset(cursor_pos: usize, inner_width: usize) -> usize {
    if inner_width == 0 || cursor_pos < inner_width {
        0
    } else {
        cursor_pos - inner_width + 1
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![
        Span::styled(" Enter ", Style::default().bg(Color::Blue).fg(Color::White)),
        Span::raw(" send  "),
        Span::styled(" PgUp/PgDn ", Style::default().bg(Color::Blue).fg(Color::White)),
        Span::raw(" scroll  "),
    ];
    if app.conversation.chart_visible() {
        spans.push(Span::styled(" Ctrl+D ", Style::default().bg(Color::Blue).fg(Color::White)));
        spans.push(Span::raw(" download chart  "));
    }
    spans.push(Span::styled(" Esc ", Style::default().bg(Color::Blue).fg(Color::White)));
    spans.push(Span::raw(" quit "));

    if let Some(status) = &app.status {
        spans.push(Span::styled(
            format!(" {}", status),
            Style::default().fg(Color::Yellow),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
