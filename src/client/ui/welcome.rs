//! Welcome screen with the main menu.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::client::state::{ClientApp, MenuItem};
use crate::library::Collection;

use super::render::render_controls;

pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp, selected: usize) {
    let menu_height = MenuItem::ALL.len() as u16 + 8;
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(menu_height),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);
    let [_, column, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(40),
        Constraint::Fill(1),
    ])
    .areas(chunks[1]);

    let count = app.library.get(Collection::ActiveAll).len();
    let subtitle = if app.library.is_loaded(Collection::ActiveAll) {
        format!("{} questions · 10 per quiz", count)
    } else {
        "loading questions...".to_string()
    };

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "QUIZ HUB",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(subtitle.fg(Color::DarkGray)),
        Line::from(""),
    ];

    for (index, item) in MenuItem::ALL.iter().enumerate() {
        let is_selected = index == selected;
        let style = if is_selected {
            Style::default().fg(Color::Yellow).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        let marker = if is_selected { "> " } else { "  " };
        content.push(Line::from(vec![
            Span::styled(marker, style),
            Span::styled(item.label(), style),
        ]));
    }

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, column);

    render_controls(frame, chunks[3], "j/k navigate  ·  enter select  ·  q quit");
}
