//! Play screen: quiz selection, preview and the running quiz.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Wrap};

use crate::client::state::{ClientApp, PlayView, SelectStep};
use crate::models::{Category, Difficulty, Question, Selection};
use crate::quiz::{AnswerRecord, Phase};

use super::details::option_label;
use super::render::{panel, render_controls, truncate};
use super::results;

/// Render the play screen.
pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp, view: &PlayView) {
    match view.session.phase() {
        Phase::Idle if view.kangaroo => render_waiting(frame, area),
        Phase::Idle => render_selection(frame, area, view),
        Phase::Previewing => render_preview(frame, area, view),
        Phase::InProgress => render_running(frame, area, view),
        Phase::Finished => results::render(frame, area, app, view),
    }
}

fn render_waiting(frame: &mut Frame, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    let waiting = Paragraph::new("Loading kangaroo questions...")
        .alignment(Alignment::Center)
        .fg(Color::Yellow);
    frame.render_widget(waiting, chunks[1]);
    render_controls(frame, chunks[3], "q back");
}

fn render_selection(frame: &mut Frame, area: Rect, view: &PlayView) {
    let (title, labels): (&str, Vec<&'static str>) = match view.step {
        SelectStep::Difficulty => (
            "Choose a difficulty",
            Selection::<Difficulty>::choices()
                .iter()
                .map(Selection::<Difficulty>::display_name)
                .collect(),
        ),
        SelectStep::Category => (
            "Choose a category",
            Selection::<Category>::choices()
                .iter()
                .map(Selection::<Category>::display_name)
                .collect(),
        ),
    };

    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(labels.len() as u16 + 4),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);
    let [_, column, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(36),
        Constraint::Fill(1),
    ])
    .areas(chunks[1]);

    let mut lines = Vec::with_capacity(labels.len() + 2);
    if let Some(difficulty) = view.difficulty {
        lines.push(Line::from(
            format!("Difficulty: {}", difficulty.display_name()).fg(Color::DarkGray),
        ));
        lines.push(Line::from(""));
    }
    for (index, label) in labels.iter().enumerate() {
        let is_selected = index == view.cursor;
        let style = if is_selected {
            Style::default().fg(Color::Yellow).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        let marker = if is_selected { "> " } else { "  " };
        lines.push(Line::from(vec![
            Span::styled(marker, style),
            Span::styled(*label, style),
        ]));
    }

    let widget = Paragraph::new(lines).block(panel(title));
    frame.render_widget(widget, column);
    render_controls(frame, chunks[3], "j/k navigate  ·  enter select  ·  q back");
}

fn render_preview(frame: &mut Frame, area: Rect, view: &PlayView) {
    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(5),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    let session = &view.session;
    let summary = format!(
        "{}  ·  {}  ·  {} questions",
        session.difficulty().map(|d| d.display_name()).unwrap_or("-"),
        session.category().map(|c| c.display_name()).unwrap_or("-"),
        session.pool().len()
    );
    let widget = Paragraph::new(summary)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Cyan).bold());
    frame.render_widget(widget, chunks[0]);

    let lines: Vec<Line> = session
        .pool()
        .iter()
        .enumerate()
        .map(|(index, question)| {
            Line::from(vec![
                Span::styled(format!("{:2}. ", index + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(truncate(&question.title, 60), Style::default().fg(Color::White)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(panel("Your quiz")), chunks[1]);

    let controls = if view.kangaroo {
        "enter start  ·  s reshuffle  ·  q quit"
    } else {
        "enter start  ·  s reshuffle  ·  q back"
    };
    render_controls(frame, chunks[2], controls);
}

fn render_running(frame: &mut Frame, area: Rect, view: &PlayView) {
    let session = &view.session;
    let Some(question) = session.current_question() else {
        return;
    };
    let answer = session.current_answer();

    let chunks = Layout::vertical([
        Constraint::Length(1), // Progress
        Constraint::Length(5), // Question text
        Constraint::Min(6),    // Options
        Constraint::Length(4), // Feedback
        Constraint::Length(1), // Controls
    ])
    .margin(1)
    .split(area);

    let progress = Line::from(vec![
        Span::styled(
            format!("Question {} of {}", session.current_index() + 1, session.pool().len()),
            Style::default().fg(Color::Cyan).bold(),
        ),
        Span::styled(
            format!("   {:.1}s", session.elapsed_secs()),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(
            format!("   wrong: {}", session.wrong_answers()),
            Style::default().fg(Color::Red),
        ),
    ]);
    frame.render_widget(Paragraph::new(progress).alignment(Alignment::Center), chunks[0]);

    let text = Paragraph::new(question.question_text.as_str())
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White).bold())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" {} ", question.title))
                .title_style(Style::default().fg(Color::Cyan))
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(text, chunks[1]);

    render_options(frame, chunks[2], question, view.option_cursor, answer);
    render_feedback(frame, chunks[3], question, answer);

    let controls = match answer {
        None => "j/k select  ·  enter answer  ·  q back",
        Some(_) if session.current_index() + 1 < session.pool().len() => "enter next question  ·  q back",
        Some(_) => "finishing...",
    };
    render_controls(frame, chunks[4], controls);
}

fn render_options(
    frame: &mut Frame,
    area: Rect,
    question: &Question,
    cursor: usize,
    answer: Option<AnswerRecord>,
) {
    let mut lines: Vec<Line> = Vec::with_capacity(question.options.len() * 2);

    for (index, option) in question.options.iter().enumerate() {
        let style = match answer {
            None if index == cursor => Style::default().fg(Color::Yellow).bold(),
            None => Style::default().fg(Color::Gray),
            Some(_) if option.is_correct => Style::default().fg(Color::Green).bold(),
            Some(record) if record.option == index => Style::default().fg(Color::Red).bold(),
            Some(_) => Style::default().fg(Color::DarkGray),
        };
        let marker = match answer {
            None if index == cursor => ">",
            Some(record) if record.option == index => "*",
            _ => " ",
        };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", marker), style),
            Span::styled(format!("{}. ", option_label(index)), style),
            Span::styled(option.text.as_str(), style),
        ]));
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines).block(panel("Options")), area);
}

fn render_feedback(frame: &mut Frame, area: Rect, question: &Question, answer: Option<AnswerRecord>) {
    let Some(record) = answer else {
        return;
    };

    let verdict = if record.correct {
        Span::styled("Correct!", Style::default().fg(Color::Green).bold())
    } else {
        Span::styled("Wrong answer", Style::default().fg(Color::Red).bold())
    };
    let mut lines = vec![Line::from(verdict)];
    if !question.answer_explanation.is_empty() {
        lines.push(Line::from(Span::styled(
            question.answer_explanation.as_str(),
            Style::default().fg(Color::Gray),
        )));
    }

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);
    frame.render_widget(widget, area);
}
