//! Profile screen: favorites and the user's own questions.

use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Tabs};

use crate::client::state::ClientApp;
use crate::library::Collection;
use crate::view_state::ProfileTab;

use super::render::{panel, render_controls, truncate};

pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp, selected: usize) {
    let chunks = Layout::vertical([
        Constraint::Length(2), // Who
        Constraint::Length(1), // Tabs
        Constraint::Min(5),    // Rows
        Constraint::Length(1), // Controls
    ])
    .margin(1)
    .split(area);

    let mut who = vec![Span::styled(
        app.user_profile
            .as_ref()
            .map(|profile| profile.display_name().to_string())
            .unwrap_or_else(|| app.user.id().to_string()),
        Style::default().fg(Color::Green).bold(),
    )];
    if let Some(bio) = app.user_profile.as_ref().and_then(|profile| profile.bio.as_deref()) {
        who.push(Span::styled(format!("  {}", bio), Style::default().fg(Color::DarkGray)));
    }
    frame.render_widget(Paragraph::new(Line::from(who)), chunks[0]);

    let tab = app.view_state.profile_tab;
    let favorites_title = if app.favorites.is_loaded() {
        format!("{} ({})", ProfileTab::Favorites.title(), app.favorites.len())
    } else {
        ProfileTab::Favorites.title().to_string()
    };
    let tabs = Tabs::new([favorites_title, ProfileTab::MyQuestions.title().to_string()])
        .select(match tab {
            ProfileTab::Favorites => 0,
            ProfileTab::MyQuestions => 1,
        })
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Cyan).bold());
    frame.render_widget(tabs, chunks[1]);

    let loaded = match tab {
        ProfileTab::Favorites => app.favorites.is_loaded(),
        ProfileTab::MyQuestions => app.library.is_loaded(Collection::Mine),
    };
    let rows = app.profile_rows();

    let lines: Vec<Line> = if !loaded {
        vec![Line::from("Loading...".fg(Color::Yellow))]
    } else if rows.is_empty() {
        let empty = match tab {
            ProfileTab::Favorites => "No favorites yet",
            ProfileTab::MyQuestions => "You have not written any questions yet",
        };
        vec![Line::from(empty.fg(Color::DarkGray))]
    } else {
        rows.iter()
            .enumerate()
            .map(|(index, question)| {
                let is_selected = index == selected;
                let style = if is_selected {
                    Style::default().fg(Color::Yellow).bold()
                } else {
                    Style::default().fg(Color::White)
                };
                let mut spans = vec![
                    Span::styled(if is_selected { "> " } else { "  " }, style),
                    Span::styled(format!("{:<50}", truncate(&question.title, 48)), style),
                    Span::styled(
                        format!("{:<10}", question.difficulty.display_name()),
                        Style::default().fg(Color::Cyan),
                    ),
                ];
                if tab == ProfileTab::MyQuestions && !question.is_active {
                    spans.push(Span::styled("inactive", Style::default().fg(Color::Red)));
                }
                Line::from(spans)
            })
            .collect()
    };
    frame.render_widget(Paragraph::new(lines).block(panel(tab.title())), chunks[2]);

    let controls = match tab {
        ProfileTab::Favorites => "tab switch  ·  enter open  ·  f unfavorite  ·  q back",
        ProfileTab::MyQuestions => "tab switch  ·  enter open  ·  a activate/deactivate  ·  q back",
    };
    render_controls(frame, chunks[3], controls);
}
