//! Results of a finished quiz.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::client::state::{ClientApp, PlayView, ScoreEntry};
use crate::models::HighScoreEntry;

use super::name_entry;
use super::render::{panel, render_controls, truncate};

const QUESTION_PREVIEW_LENGTH: usize = 45;

/// Render the results screen.
pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp, view: &PlayView) {
    let Some(result) = view.session.result() else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(6), // Score summary
        Constraint::Min(6),    // Answers breakdown
        Constraint::Length(7), // High score form
        Constraint::Length(1), // Controls
    ])
    .margin(1)
    .split(area);

    render_score_summary(frame, chunks[0], result.wrong_answers, result.score_time, result.questions_played);
    render_answers(frame, chunks[1], view);

    let board = app.leaderboards.get(result.bucket());
    let qualifies = app.run_qualifies();
    name_entry::render(frame, chunks[2], view, qualifies, rank_of(board, view));

    let controls = if app.name_entry_active() {
        "enter save  ·  esc skip"
    } else if view.entry == ScoreEntry::Sending {
        "saving..."
    } else {
        "r play again  ·  n new quiz  ·  q back"
    };
    render_controls(frame, chunks[3], controls);
}

fn render_score_summary(frame: &mut Frame, area: Rect, wrong: u32, time: f64, total: usize) {
    let correct = total.saturating_sub(wrong as usize);
    let grade_color = match (correct * 100).checked_div(total).unwrap_or(0) {
        90..=100 => Color::Green,
        70..=89 => Color::Cyan,
        50..=69 => Color::Yellow,
        _ => Color::Red,
    };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "RESULTS",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("{} / {} correct", correct, total),
                Style::default().fg(grade_color).bold(),
            ),
            Span::styled(
                format!("   {} wrong   {:.1}s", wrong, time),
                Style::default().fg(Color::Gray),
            ),
        ]),
        Line::from(""),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

fn render_answers(frame: &mut Frame, area: Rect, view: &PlayView) {
    let lines: Vec<Line> = view
        .session
        .pool()
        .iter()
        .zip(view.session.answers())
        .enumerate()
        .map(|(index, (question, answer))| {
            let (symbol, color) = match answer {
                Some(record) if record.correct => ("+", Color::Green),
                Some(_) => ("-", Color::Red),
                None => ("?", Color::DarkGray),
            };

            Line::from(vec![
                Span::styled(format!(" {} ", symbol), Style::default().fg(color)),
                Span::styled(
                    format!("{:2}. ", index + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    truncate(&question.title, QUESTION_PREVIEW_LENGTH),
                    Style::default().fg(Color::Gray),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(panel("Your Answers")), area);
}

/// 1-based rank of this run's recorded entry on the refreshed board.
fn rank_of(board: &[HighScoreEntry], view: &PlayView) -> Option<usize> {
    if view.entry != ScoreEntry::Recorded {
        return None;
    }
    let name = view.name_input.trim();
    let result = view.session.result()?;
    board
        .iter()
        .position(|entry| {
            entry.player_name == name
                && entry.wrong_answer_count == result.wrong_answers
                && (entry.score_time - result.score_time).abs() < f64::EPSILON
        })
        .map(|index| index + 1)
}
