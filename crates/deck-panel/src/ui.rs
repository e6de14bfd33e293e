use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use deck_core::{ConnectionState, EntryKind};

use crate::app::App;

pub fn draw(frame: &mut Frame, app: &App) {
    let root = frame.size();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(root);

    draw_transcript(frame, layout[0], app);
    draw_typing(frame, layout[1], app);
    draw_input(frame, layout[2], app);
    draw_footer(frame, layout[3], app);
}

fn draw_transcript(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Line::from(vec![
            Span::raw("Browser Agent "),
            link_badge(app),
        ]));

    if app.store.is_empty() {
        let welcome = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "👋 Привет! Напиши задачу, и агент выполнит её в браузере.",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(Span::styled(
                "Например: «открой example.com и найди контакты»",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .block(block);
        frame.render_widget(welcome, area);
        return;
    }

    // Keep the tail of the log in view; the list has no scroll state.
    let visible = area.height.saturating_sub(2) as usize;
    let skip = app.store.len().saturating_sub(visible);
    let items: Vec<ListItem> = app
        .store
        .entries()
        .skip(skip)
        .map(|entry| ListItem::new(Span::styled(entry.text.clone(), entry_style(entry.kind))))
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn draw_typing(frame: &mut Frame, area: Rect, app: &App) {
    if !app.session.typing() {
        return;
    }
    let line = Line::from(Span::styled(
        " Выполняю...",
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_input(frame: &mut Frame, area: Rect, app: &App) {
    let (text, style) = if app.input.is_empty() {
        let placeholder = if app.session.can_interrupt() {
            "Агент работает..."
        } else {
            "Напиши задачу..."
        };
        (placeholder, Style::default().fg(Color::DarkGray))
    } else {
        (app.input.as_str(), Style::default())
    };
    let paragraph = Paragraph::new(Span::styled(text, style))
        .block(Block::default().borders(Borders::ALL).title("Задача"));
    frame.render_widget(paragraph, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![keycap("Enter"), Span::raw(" отправить  ")];
    if app.session.can_interrupt() {
        let pause_label = if app.session.paused() {
            " продолжить  "
        } else {
            " пауза  "
        };
        spans.push(keycap("Ctrl+P"));
        spans.push(Span::raw(pause_label));
        spans.push(keycap("Ctrl+X"));
        spans.push(Span::raw(" стоп  "));
    }
    spans.push(keycap("Ctrl+L"));
    spans.push(Span::raw(" очистить  "));
    spans.push(keycap("Esc"));
    spans.push(Span::raw(" выход"));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn link_badge(app: &App) -> Span<'static> {
    match app.session.connection() {
        ConnectionState::Connected if app.session.paused() => {
            Span::styled("⏸ пауза", Style::default().fg(Color::Yellow))
        }
        ConnectionState::Connected => Span::styled("● online", Style::default().fg(Color::Green)),
        ConnectionState::Connecting => {
            Span::styled("● connecting", Style::default().fg(Color::Yellow))
        }
        ConnectionState::Disconnected => {
            Span::styled("● offline", Style::default().fg(Color::DarkGray))
        }
    }
}

fn entry_style(kind: EntryKind) -> Style {
    match kind {
        EntryKind::User => Style::default().fg(Color::Cyan),
        EntryKind::Agent => Style::default().fg(Color::Green),
        EntryKind::Tool => Style::default().fg(Color::DarkGray),
        EntryKind::System => Style::default().fg(Color::Yellow),
        EntryKind::Error => Style::default().fg(Color::Red),
    }
}

fn keycap(label: &str) -> Span<'static> {
    Span::styled(
        format!("[{label}]"),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
}
