//! High-score form shown under the results.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::client::state::{PlayView, ScoreEntry};
use crate::scores::{PLAYER_NAME_MAX, PLAYER_NAME_MIN};

use super::render::panel;

/// Render the form. `qualifies` is `None` while the leaderboard loads.
pub fn render(frame: &mut Frame, area: Rect, view: &PlayView, qualifies: Option<bool>, rank: Option<usize>) {
    let mut content = Vec::with_capacity(4);

    match (qualifies, view.entry) {
        (_, ScoreEntry::Recorded) => {
            let text = match rank {
                Some(rank) => format!("Saved! You are #{} on the leaderboard.", rank),
                None => "Saved!".to_string(),
            };
            content.push(Line::from(Span::styled(text, Style::default().fg(Color::Green).bold())));
        }
        (_, ScoreEntry::NotRecorded) => {
            content.push(Line::from(Span::styled(
                "Someone beat you to it, the score did not make the board.",
                Style::default().fg(Color::Yellow),
            )));
        }
        (_, ScoreEntry::Skipped) => {
            content.push(Line::from("Score not saved.".fg(Color::DarkGray)));
        }
        (_, ScoreEntry::Sending) => {
            content.push(Line::from("Saving score...".fg(Color::Yellow)));
        }
        (None, ScoreEntry::Open) => {
            content.push(Line::from("Checking leaderboard...".fg(Color::Yellow)));
        }
        (Some(false), ScoreEntry::Open) => {
            content.push(Line::from(
                "Complete a full quiz with a better score to reach the leaderboard.".fg(Color::DarkGray),
            ));
        }
        (Some(true), ScoreEntry::Open) => {
            content.push(Line::from(Span::styled(
                "New high score!",
                Style::default().fg(Color::Green).bold(),
            )));
            content.push(Line::from(vec![
                Span::styled("Enter your name: ", Style::default().fg(Color::White)),
                Span::styled(view.name_input.as_str(), Style::default().fg(Color::Yellow)),
                Span::styled("_", Style::default().fg(Color::Yellow)),
            ]));
            match &view.name_error {
                Some(err) => content.push(Line::from(Span::styled(
                    err.as_str(),
                    Style::default().fg(Color::Red),
                ))),
                None => content.push(Line::from(
                    format!("{} to {} characters", PLAYER_NAME_MIN, PLAYER_NAME_MAX).fg(Color::DarkGray),
                )),
            }
        }
    }

    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .block(panel("High Score"));
    frame.render_widget(widget, area);
}
