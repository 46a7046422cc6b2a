//! Question list with search, filters and pages.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::client::state::{BrowseView, ClientApp};
use crate::library::Collection;

use super::render::{panel, render_controls, truncate};

const TITLE_LENGTH: usize = 48;

pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp, view: &BrowseView) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Search and filters
        Constraint::Min(5),    // Rows
        Constraint::Length(1), // Page
        Constraint::Length(1), // Controls
    ])
    .margin(1)
    .split(area);

    render_search(frame, chunks[0], app, view.editing);

    if !app.library.is_loaded(Collection::ActiveAll) {
        let waiting = Paragraph::new("Loading questions...")
            .alignment(Alignment::Center)
            .fg(Color::Yellow);
        frame.render_widget(waiting, chunks[1]);
        return;
    }

    let page = app.browse_page();
    let lines: Vec<Line> = if page.rows.is_empty() {
        vec![Line::from("No questions match".fg(Color::DarkGray))]
    } else {
        page.rows
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let is_selected = index == view.selected;
                let style = if is_selected {
                    Style::default().fg(Color::Yellow).bold()
                } else {
                    Style::default().fg(Color::White)
                };
                let star = if app.favorites.contains(&question.id) {
                    "★ "
                } else {
                    "  "
                };
                Line::from(vec![
                    Span::styled(if is_selected { "> " } else { "  " }, style),
                    Span::styled(star, Style::default().fg(Color::Yellow)),
                    Span::styled(format!("{:<50}", truncate(&question.title, TITLE_LENGTH)), style),
                    Span::styled(
                        format!("{:<10}", question.difficulty.display_name()),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::styled(
                        question.category.display_name(),
                        Style::default().fg(Color::DarkGray),
                    ),
                ])
            })
            .collect()
    };
    frame.render_widget(Paragraph::new(lines).block(panel("Questions")), chunks[1]);

    let footer = format!(
        "page {} of {}  ·  {} matches  ·  {} per page",
        page.number, page.total_pages, page.total_matches, app.page_size
    );
    let widget = Paragraph::new(footer)
        .alignment(Alignment::Right)
        .fg(Color::DarkGray);
    frame.render_widget(widget, chunks[2]);

    let controls = if view.editing {
        "type to search  ·  enter/esc done"
    } else {
        "/ search  ·  d difficulty  ·  c category  ·  x clear  ·  h/l page  ·  enter open  ·  f favorite  ·  q back"
    };
    render_controls(frame, chunks[3], controls);
}

fn render_search(frame: &mut Frame, area: Rect, app: &ClientApp, editing: bool) {
    let query = &app.query;
    let text_style = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };
    let cursor = if editing { "_" } else { "" };
    let difficulty = query
        .difficulty
        .map(|d| d.display_name())
        .unwrap_or("any");
    let category = query.category.map(|c| c.display_name()).unwrap_or("any");
    let lock = if query.category_locked() { " (locked)" } else { "" };

    let line = Line::from(vec![
        Span::styled("Search: ", Style::default().fg(Color::DarkGray)),
        Span::styled(query.text.as_str(), text_style),
        Span::styled(cursor, text_style),
        Span::styled("   Difficulty: ", Style::default().fg(Color::DarkGray)),
        Span::styled(difficulty, Style::default().fg(Color::Cyan)),
        Span::styled("   Category: ", Style::default().fg(Color::DarkGray)),
        Span::styled(category, Style::default().fg(Color::Cyan)),
        Span::styled(lock, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line).block(panel("Filter")), area);
}
