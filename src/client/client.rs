//! Terminal client: the UI loop and the background tasks it starts.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::{GithubClient, HubClient, QuizHubApi};
use crate::config::Config;
use crate::favorites;
use crate::library;
use crate::models::CurrentUser;
use crate::quiz::Phase;
use crate::scores;
use crate::terminal::{AppTerminal, TerminalGuard};
use crate::view_state::{ProfileTab, ViewStateStore};
use crate::QuizHubError;

use super::events::{AppEvent, Request};
use super::state::{Back, ClientApp, Screen};
use super::ui;

/// Starts background work for [`Request`]s and reports back through the
/// event channel.
struct Backend {
    api: Arc<dyn QuizHubApi>,
    github: GithubClient,
    store: ViewStateStore,
    events: UnboundedSender<AppEvent>,
}

impl Backend {
    fn dispatch(&self, request: Request, user: &CurrentUser) {
        let api = Arc::clone(&self.api);
        let events = self.events.clone();

        match request {
            Request::LoadUser => {
                tokio::spawn(async move {
                    let user = match api.current_user().await {
                        Ok(user) => user,
                        Err(e) => {
                            log::warn!("Error fetching current user: {}", e);
                            CurrentUser::anonymous()
                        }
                    };
                    let details = if user.is_anonymous() {
                        None
                    } else {
                        api.user_details().await.unwrap_or_else(|e| {
                            log::warn!("Error fetching user details: {}", e);
                            None
                        })
                    };
                    let _ = events.send(AppEvent::UserLoaded { user, details });
                });
            }
            Request::LoadCollection {
                generation,
                collection,
            } => {
                let user = user.clone();
                tokio::spawn(async move {
                    let result = library::fetch_collection(api.as_ref(), collection, &user).await;
                    let _ = events.send(AppEvent::CollectionLoaded {
                        generation,
                        collection,
                        result,
                    });
                });
            }
            Request::LoadFavorites => {
                tokio::spawn(async move {
                    let result = api.favorites().await;
                    let _ = events.send(AppEvent::FavoritesLoaded(result));
                });
            }
            Request::SyncFavorite(toggle) => {
                tokio::spawn(async move {
                    let result = favorites::sync_favorite(api.as_ref(), &toggle).await;
                    let _ = events.send(AppEvent::FavoriteSynced { toggle, result });
                });
            }
            Request::SyncActive(toggle) => {
                tokio::spawn(async move {
                    let result = api.toggle_active(&toggle.id).await;
                    let _ = events.send(AppEvent::ActiveSynced { toggle, result });
                });
            }
            Request::DeleteQuestion(id) => {
                tokio::spawn(async move {
                    let result = api.delete_question(&id).await;
                    let _ = events.send(AppEvent::QuestionDeleted { id, result });
                });
            }
            Request::LoadQuestion { generation, id } => {
                tokio::spawn(async move {
                    let result = api.question(&id).await;
                    let _ = events.send(AppEvent::QuestionLoaded { generation, result });
                });
            }
            Request::LoadScores(bucket) => {
                tokio::spawn(async move {
                    let result = api.high_scores(bucket).await;
                    let _ = events.send(AppEvent::ScoresLoaded { bucket, result });
                });
            }
            Request::SubmitScore { token, body } => {
                tokio::spawn(async move {
                    let result = scores::submit_and_refresh(api.as_ref(), &body).await;
                    let _ = events.send(AppEvent::ScoreSubmitted {
                        token,
                        bucket: body.bucket,
                        result,
                    });
                });
            }
            Request::LoadProfiles(owner_ids) => {
                for owner_id in owner_ids {
                    let github = self.github.clone();
                    let events = self.events.clone();
                    tokio::spawn(async move {
                        let profile = github.profile(&owner_id).await;
                        let _ = events.send(AppEvent::ProfileLoaded { owner_id, profile });
                    });
                }
            }
            Request::SaveViewState(state) => {
                if let Err(e) = self.store.save(&state) {
                    log::warn!("{}", e);
                }
            }
        }
    }
}

/// Run the terminal client until the user quits.
pub async fn run(config: &Config) -> Result<(), QuizHubError> {
    let api: Arc<dyn QuizHubApi> = Arc::new(HubClient::new(config)?);
    let github = GithubClient::new(config)?;
    let store = ViewStateStore::new(&config.state_file);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut app = ClientApp::new(tx.clone(), store.load());
    let backend = Backend {
        api,
        github,
        store,
        events: tx,
    };

    log::info!("client started against {}", config.base_url);

    let mut guard = TerminalGuard::enter()?;
    let result = run_tui(guard.terminal(), &mut app, &backend, &mut rx);
    guard.restore()?;
    result
}

fn run_tui(
    terminal: &mut AppTerminal,
    app: &mut ClientApp,
    backend: &Backend,
    rx: &mut UnboundedReceiver<AppEvent>,
) -> Result<(), QuizHubError> {
    loop {
        while let Ok(event) = rx.try_recv() {
            app.apply_event(event);
        }
        for request in app.take_requests() {
            backend.dispatch(request, &app.user);
        }

        if app.should_quit {
            break;
        }

        app.set_viewport(terminal.size()?.width);
        terminal.draw(|frame| ui::render(frame, app))?;

        // Handle input with timeout so completions are picked up promptly
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                handle_input(app, key);
            }
        }
    }

    log::info!("client stopped");
    Ok(())
}

/// Handle keyboard input.
fn handle_input(app: &mut ClientApp, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.alert.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.dismiss_alert();
        }
        return;
    }

    match &app.screen {
        Screen::Welcome { .. } => handle_welcome(app, key.code),
        Screen::Browse(view) => {
            if view.editing {
                handle_search(app, key.code);
            } else {
                handle_browse(app, key.code);
            }
        }
        Screen::Details(_) => handle_details(app, key.code),
        Screen::Play(_) => handle_play(app, key.code),
        Screen::HighScores { .. } => handle_high_scores(app, key.code),
        Screen::Profile { .. } => handle_profile(app, key.code),
    }
}

fn handle_welcome(app: &mut ClientApp, key: KeyCode) {
    match key {
        KeyCode::Up | KeyCode::Char('k') => app.menu_move(false),
        KeyCode::Down | KeyCode::Char('j') => app.menu_move(true),
        KeyCode::Enter | KeyCode::Char(' ') => app.activate_menu(),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => app.should_quit = true,
        _ => {}
    }
}

fn handle_search(app: &mut ClientApp, key: KeyCode) {
    match key {
        KeyCode::Char(c) => app.search_push(c),
        KeyCode::Backspace => app.search_pop(),
        KeyCode::Enter | KeyCode::Esc => app.set_search_editing(false),
        _ => {}
    }
}

fn handle_browse(app: &mut ClientApp, key: KeyCode) {
    match key {
        KeyCode::Up | KeyCode::Char('k') => app.browse_move(false),
        KeyCode::Down | KeyCode::Char('j') => app.browse_move(true),
        KeyCode::Left | KeyCode::Char('h') => app.change_page(false),
        KeyCode::Right | KeyCode::Char('l') => app.change_page(true),
        KeyCode::Char('/') => app.set_search_editing(true),
        KeyCode::Char('d') => app.cycle_difficulty_filter(),
        KeyCode::Char('c') => app.cycle_category_filter(),
        KeyCode::Char('x') => app.clear_filters(),
        KeyCode::Char('f') => {
            if let Some(id) = app.selected_browse_question().map(|q| q.id.clone()) {
                app.toggle_favorite(&id);
            }
        }
        KeyCode::Enter => {
            if let Some(id) = app.selected_browse_question().map(|q| q.id.clone()) {
                app.open_details(&id, Back::Browse);
            }
        }
        KeyCode::Char('q') | KeyCode::Esc => app.go_home(),
        _ => {}
    }
}

fn handle_details(app: &mut ClientApp, key: KeyCode) {
    let Screen::Details(view) = &app.screen else {
        return;
    };
    let id = view.id.clone();
    let confirming = view.confirm_delete;

    match key {
        KeyCode::Up | KeyCode::Char('k') => app.details_scroll(false),
        KeyCode::Down | KeyCode::Char('j') => app.details_scroll(true),
        KeyCode::Char('f') => app.toggle_favorite(&id),
        KeyCode::Char('a') if app.details_is_owned() => app.toggle_active(&id),
        KeyCode::Char('d') if app.details_is_owned() => app.request_delete(),
        KeyCode::Char('y') if confirming => app.request_delete(),
        KeyCode::Char('n') if confirming => app.cancel_delete(),
        KeyCode::Char('q') | KeyCode::Esc if confirming => app.cancel_delete(),
        KeyCode::Char('q') | KeyCode::Esc => app.close_details(),
        _ => {}
    }
}

fn handle_play(app: &mut ClientApp, key: KeyCode) {
    if app.name_entry_active() {
        match key {
            KeyCode::Char(c) => app.name_push(c),
            KeyCode::Backspace => app.name_pop(),
            KeyCode::Enter => app.play_confirm(),
            KeyCode::Esc => app.skip_score(),
            _ => {}
        }
        return;
    }

    let Some(phase) = app.play_view().map(|view| view.session.phase()) else {
        return;
    };

    match key {
        KeyCode::Up | KeyCode::Char('k') => app.play_move(false),
        KeyCode::Down | KeyCode::Char('j') => app.play_move(true),
        KeyCode::Enter | KeyCode::Char(' ') => app.play_confirm(),
        KeyCode::Char('s') if phase == Phase::Previewing => app.play_again(),
        KeyCode::Char('r') if phase == Phase::Finished => app.play_again(),
        KeyCode::Char('n') if phase == Phase::Finished => app.new_quiz(),
        KeyCode::Char('q') | KeyCode::Esc => app.play_back(),
        _ => {}
    }
}

fn handle_high_scores(app: &mut ClientApp, key: KeyCode) {
    match key {
        KeyCode::Left | KeyCode::Char('h') => app.bucket_move(false),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => app.bucket_move(true),
        KeyCode::Char('q') | KeyCode::Esc => app.go_home(),
        _ => {}
    }
}

fn handle_profile(app: &mut ClientApp, key: KeyCode) {
    let selected = app.selected_profile_question().map(|q| q.id.clone());

    match key {
        KeyCode::Tab | KeyCode::Left | KeyCode::Right => app.switch_profile_tab(),
        KeyCode::Up | KeyCode::Char('k') => app.profile_move(false),
        KeyCode::Down | KeyCode::Char('j') => app.profile_move(true),
        KeyCode::Enter => {
            if let Some(id) = selected {
                app.open_details(&id, Back::Profile);
            }
        }
        KeyCode::Char('f') if app.view_state.profile_tab == ProfileTab::Favorites => {
            if let Some(id) = selected {
                app.toggle_favorite(&id);
            }
        }
        KeyCode::Char('a') if app.view_state.profile_tab == ProfileTab::MyQuestions => {
            if let Some(id) = selected {
                app.toggle_active(&id);
            }
        }
        KeyCode::Char('q') | KeyCode::Esc => app.go_home(),
        _ => {}
    }
}
