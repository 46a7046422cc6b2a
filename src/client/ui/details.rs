//! Single question view with owner actions.

use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Wrap};

use crate::client::state::{ClientApp, DetailsView};
use crate::models::Question;

use super::render::{panel, render_controls};

pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp, view: &DetailsView) {
    let chunks = Layout::vertical([Constraint::Min(5), Constraint::Length(1)])
        .margin(1)
        .split(area);

    let Some(question) = app.details_question() else {
        let waiting = Paragraph::new("Loading question...")
            .alignment(Alignment::Center)
            .fg(Color::Yellow);
        frame.render_widget(waiting, chunks[0]);
        render_controls(frame, chunks[1], "q back");
        return;
    };

    let owned = app.details_is_owned();
    let widget = Paragraph::new(question_lines(app, question, owned))
        .wrap(Wrap { trim: false })
        .scroll((view.scroll, 0))
        .block(panel(&question.title));
    frame.render_widget(widget, chunks[0]);

    let controls = if view.confirm_delete {
        "Delete this question?  y confirm  ·  n cancel"
    } else if owned {
        "j/k scroll  ·  f favorite  ·  a activate/deactivate  ·  d delete  ·  q back"
    } else {
        "j/k scroll  ·  f favorite  ·  q back"
    };
    render_controls(frame, chunks[1], controls);
}

fn question_lines<'a>(app: &ClientApp, question: &'a Question, owned: bool) -> Vec<Line<'a>> {
    let favorite = if app.favorites.contains(&question.id) {
        Span::styled("★ favorite", Style::default().fg(Color::Yellow))
    } else {
        Span::raw("")
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(question.difficulty.display_name(), Style::default().fg(Color::Cyan).bold()),
            Span::styled("  ·  ", Style::default().fg(Color::DarkGray)),
            Span::styled(question.category.display_name(), Style::default().fg(Color::Cyan)),
            Span::styled("  ·  ", Style::default().fg(Color::DarkGray)),
            favorite,
        ]),
        Line::from(vec![
            Span::styled("by ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                app.profiles.owner_label(&question.owner_id),
                Style::default().fg(Color::Green),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            question.question_text.as_str(),
            Style::default().fg(Color::White).bold(),
        )),
        Line::from(""),
    ];

    for (index, option) in question.options.iter().enumerate() {
        let (marker, style) = if option.is_correct {
            ("+", Style::default().fg(Color::Green).bold())
        } else {
            (" ", Style::default().fg(Color::Gray))
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", marker), style),
            Span::styled(format!("{}. ", option_label(index)), style),
            Span::styled(option.text.as_str(), style),
        ]));
    }

    if !question.answer_explanation.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Explanation",
            Style::default().fg(Color::Cyan),
        )));
        lines.push(Line::from(question.answer_explanation.as_str()));
    }

    if let Some(url) = &question.image_url {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Image: ", Style::default().fg(Color::DarkGray)),
            Span::styled(url.as_str(), Style::default().fg(Color::Blue).underlined()),
        ]));
    }

    if owned {
        let (status, color) = if question.is_active {
            ("active", Color::Green)
        } else {
            ("inactive", Color::Red)
        };
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Status: ", Style::default().fg(Color::DarkGray)),
            Span::styled(status, Style::default().fg(color).bold()),
        ]));
    }

    lines
}

/// `A`, `B`, ... for the option at `index`.
pub(super) fn option_label(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}
