//! Main client UI renderer.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};

use crate::client::state::{Alert, ClientApp, Screen};

use super::{browse, details, high_scores, profile, quiz, welcome};

/// Render the client UI based on current state.
pub fn render(frame: &mut Frame, app: &ClientApp) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).split(area);
    render_header(frame, chunks[0], app);

    match &app.screen {
        Screen::Welcome { selected } => welcome::render(frame, chunks[1], app, *selected),
        Screen::Browse(view) => browse::render(frame, chunks[1], app, view),
        Screen::Details(view) => details::render(frame, chunks[1], app, view),
        Screen::Play(view) => quiz::render(frame, chunks[1], app, view),
        Screen::HighScores { .. } => high_scores::render(frame, chunks[1], app),
        Screen::Profile { selected } => profile::render(frame, chunks[1], app, *selected),
    }

    if let Some(alert) = &app.alert {
        render_alert(frame, area, alert);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let who = if app.user.is_anonymous() {
        Span::styled("not signed in", Style::default().fg(Color::DarkGray))
    } else {
        let name = app
            .user_profile
            .as_ref()
            .map(|profile| profile.display_name().to_string())
            .unwrap_or_else(|| app.user.id().to_string());
        Span::styled(name, Style::default().fg(Color::Green))
    };

    let line = Line::from(vec![
        Span::styled(" QUIZ HUB ", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" "),
        who,
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_alert(frame: &mut Frame, area: Rect, alert: &Alert) {
    let height = (alert.lines.len() as u16 + 4).min(area.height);
    let popup = centered(area, 60, height);

    let mut lines: Vec<Line> = alert
        .lines
        .iter()
        .map(|line| Line::from(Span::styled(line.as_str(), Style::default().fg(Color::White))))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[Enter] to close",
        Style::default().fg(Color::DarkGray),
    )));

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(format!(" {} ", alert.title))
                .title_style(Style::default().fg(Color::Red).bold())
                .padding(Padding::horizontal(1)),
        );

    frame.render_widget(Clear, popup);
    frame.render_widget(widget, popup);
}

/// A `width` percent wide, `height` rows tall rectangle in the middle of `area`.
pub(super) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height),
        Constraint::Fill(1),
    ])
    .areas(area);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - width) / 2),
        Constraint::Percentage(width),
        Constraint::Percentage((100 - width) / 2),
    ])
    .areas(middle);
    center
}

/// Bottom line listing the keys of a screen.
pub(super) fn render_controls(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text.to_string())
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

/// Bordered block in the style shared by all screens.
pub(super) fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {} ", title))
        .title_style(Style::default().fg(Color::Cyan))
        .padding(Padding::horizontal(1))
}

/// Cut `text` to `max` characters, marking the cut with an ellipsis.
pub(super) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let truncated: String = text.chars().take(max).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 5), "abcde...");
    }

    #[test]
    fn test_centered_stays_inside() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered(area, 60, 6);
        assert_eq!(popup.height, 6);
        assert!(popup.x >= area.x && popup.right() <= area.right());
        assert!(popup.y >= area.y && popup.bottom() <= area.bottom());
    }
}
