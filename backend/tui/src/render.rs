//! TUI Rendering
//!
//! Translates `AppState` into Ratatui widgets. The output pane is rebuilt
//! from a fresh [`SessionView`] every frame.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use mathmentor_core::{ChatMessage, Role};
use mathmentor_session::{Notice, NoticeLevel, SessionView};

use crate::app::{AppState, Field};

const HELP: &str = "Tab/Shift-Tab focus | F2 Show Solution | F3 Generate Hint | F4 Check Answer | Esc quit";

/// Main draw function.
pub fn draw_ui(f: &mut Frame, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(f.size());

    draw_form(f, columns[0], state);
    draw_outputs(f, columns[1], state);
}

fn draw_form(f: &mut Frame, area: Rect, state: &AppState) {
    let mut constraints: Vec<Constraint> = Field::ALL.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Length(3)); // Status
    constraints.push(Constraint::Min(0)); // Help

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in Field::ALL.iter().enumerate() {
        let text = match field {
            Field::ApiKey => "*".repeat(state.api_key.chars().count()),
            other => state.input(*other).to_string(),
        };
        let border = if *field == state.focus {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let widget = Paragraph::new(text).block(
            Block::default()
                .title(field.title())
                .borders(Borders::ALL)
                .border_style(border),
        );
        f.render_widget(widget, rows[i]);
    }

    let status = if state.busy {
        Line::from(Span::styled("Working...", Style::default().fg(Color::Cyan)))
    } else {
        state.status.as_ref().map(notice_line).unwrap_or_default()
    };
    f.render_widget(
        Paragraph::new(status).block(Block::default().title("Status").borders(Borders::ALL)),
        rows[Field::ALL.len()],
    );

    f.render_widget(
        Paragraph::new(HELP)
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true }),
        rows[Field::ALL.len() + 1],
    );
}

fn draw_outputs(f: &mut Frame, area: Rect, state: &AppState) {
    let view = SessionView::render(&state.session);
    let mut lines: Vec<Line> = Vec::new();

    for notice in [&view.ocr_notice, &view.notice].into_iter().flatten() {
        lines.push(notice_line(notice));
        lines.push(Line::default());
    }

    for (title, body) in view.sections() {
        lines.push(Line::from(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD).fg(Color::Green),
        )));
        lines.extend(body.lines().map(|l| Line::from(l.to_string())));
        lines.push(Line::default());
    }

    if !view.history.is_empty() {
        lines.push(Line::from(Span::styled(
            "Conversation",
            Style::default().add_modifier(Modifier::BOLD).fg(Color::Green),
        )));
        for message in &view.history {
            lines.extend(history_lines(message));
        }
    }

    if lines.is_empty() {
        lines.push(Line::from("Type a problem or load an image, then press F2, F3 or F4."));
    }

    let title = format!("MathMentor ({} messages)", view.history.len());
    let widget = Paragraph::new(Text::from(lines))
        .block(Block::default().title(title).borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn history_lines(message: &ChatMessage) -> Vec<Line<'static>> {
    let color = match message.role {
        Role::User => Color::Cyan,
        Role::Assistant => Color::Magenta,
    };
    let mut body = message.content.lines();
    let first = Line::from(vec![
        Span::styled(format!("{}: ", message.role.as_str()), Style::default().fg(color)),
        Span::raw(body.next().unwrap_or_default().to_string()),
    ]);
    std::iter::once(first)
        .chain(body.map(|l| Line::from(format!("  {l}"))))
        .collect()
}

fn notice_line(notice: &Notice) -> Line<'static> {
    let color = match notice.level {
        NoticeLevel::Success => Color::Green,
        NoticeLevel::Warning => Color::Yellow,
        NoticeLevel::Error => Color::Red,
    };
    Line::from(Span::styled(notice.text.clone(), Style::default().fg(color)))
}
