//! Leaderboards, one tab per bucket.

use ratatui::prelude::*;
use ratatui::widgets::{Cell, Paragraph, Row, Table, Tabs};

use crate::client::state::ClientApp;
use crate::models::{Bucket, HighScoreEntry};

use super::render::{panel, render_controls};

pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Tabs
        Constraint::Min(5),    // Table
        Constraint::Length(1), // Controls
    ])
    .margin(1)
    .split(area);

    let selected = app.selected_bucket();
    let index = Bucket::ALL
        .iter()
        .position(|bucket| *bucket == selected)
        .unwrap_or(0);
    let tabs = Tabs::new(Bucket::ALL.iter().map(|bucket| bucket.display_name()))
        .select(index)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Cyan).bold());
    frame.render_widget(tabs, chunks[0]);

    if !app.leaderboards.is_loaded(selected) {
        let waiting = Paragraph::new("Loading high scores...")
            .alignment(Alignment::Center)
            .fg(Color::Yellow);
        frame.render_widget(waiting, chunks[1]);
    } else {
        render_board(frame, chunks[1], app, selected);
    }

    render_controls(frame, chunks[2], "h/l switch board  ·  q back");
}

fn render_board(frame: &mut Frame, area: Rect, app: &ClientApp, bucket: Bucket) {
    let entries = app.leaderboards.get(bucket);
    if entries.is_empty() {
        let empty = Paragraph::new("No scores yet")
            .alignment(Alignment::Center)
            .fg(Color::DarkGray)
            .block(panel(bucket.display_name()));
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(["#", "Player", "Owner", "Category", "Wrong", "Time", "Date"])
        .style(Style::default().fg(Color::Cyan).bold());
    let rows = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| score_row(app, index + 1, entry));
    let widths = [
        Constraint::Length(3),
        Constraint::Length(17),
        Constraint::Length(18),
        Constraint::Length(18),
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Length(11),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(panel(bucket.display_name()));
    frame.render_widget(table, area);
}

fn score_row<'a>(app: &ClientApp, rank: usize, entry: &'a HighScoreEntry) -> Row<'a> {
    let rank_style = match rank {
        1 => Style::default().fg(Color::Yellow).bold(),
        2 => Style::default().fg(Color::White),
        3 => Style::default().fg(Color::LightRed),
        _ => Style::default().fg(Color::DarkGray),
    };
    let category = entry
        .category
        .map(|category| category.display_name())
        .unwrap_or("-");

    Row::new([
        Cell::from(rank.to_string()).style(rank_style),
        Cell::from(entry.player_name.as_str()),
        Cell::from(app.profiles.owner_label(&entry.owner_id)).style(Style::default().fg(Color::Green)),
        Cell::from(category),
        Cell::from(entry.wrong_answer_count.to_string()),
        Cell::from(format!("{:.1}s", entry.score_time)),
        Cell::from(entry.date.format("%Y-%m-%d").to_string()).style(Style::default().fg(Color::DarkGray)),
    ])
}
