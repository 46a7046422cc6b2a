//! Client state management.
//!
//! [`ClientApp`] is mutated only by the UI loop: key handlers call its
//! methods and background completions arrive through
//! [`ClientApp::apply_event`]. Work that needs the network is queued as
//! [`Request`]s and picked up by the loop.

use std::mem;

use chrono::Utc;
use tokio::sync::mpsc::UnboundedSender;

use crate::api::{ApiError, ProfileCache};
use crate::favorites::Favorites;
use crate::library::{Collection, ManageError, QuestionLibrary};
use crate::models::{Bucket, Category, CurrentUser, Difficulty, GithubProfile, Question, Selection};
use crate::quiz::{Phase, QuizSession};
use crate::scores::{self, Leaderboards, PLAYER_NAME_MAX};
use crate::search::{self, QuestionQuery};
use crate::view_state::{ProfileTab, ViewState};

use super::events::{AppEvent, Request};

/// Terminal cells are treated as this many pixels wide when picking a page size.
pub const PIXELS_PER_CELL: u32 = 8;

/// Entries of the welcome menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Play,
    Kangaroo,
    Browse,
    HighScores,
    Profile,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 6] = [
        MenuItem::Play,
        MenuItem::Kangaroo,
        MenuItem::Browse,
        MenuItem::HighScores,
        MenuItem::Profile,
        MenuItem::Quit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Play => "Play",
            MenuItem::Kangaroo => "Kangaroo",
            MenuItem::Browse => "List of all questions",
            MenuItem::HighScores => "High Scores",
            MenuItem::Profile => "Profile",
            MenuItem::Quit => "Quit",
        }
    }
}

/// Modal popup shown over the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub lines: Vec<String>,
}

/// Screen a details view returns to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Back {
    Browse,
    Profile,
}

#[derive(Debug, Clone, Default)]
pub struct BrowseView {
    /// Row within the current page.
    pub selected: usize,
    /// Keys go to the search text while set.
    pub editing: bool,
}

#[derive(Debug, Clone)]
pub struct DetailsView {
    pub id: String,
    /// Latest copy fetched for this view.
    pub question: Option<Question>,
    pub back: Back,
    pub scroll: u16,
    pub confirm_delete: bool,
}

/// Which choice the play menu is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectStep {
    Difficulty,
    Category,
}

/// Progress of the high-score form on the results screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreEntry {
    Open,
    Sending,
    Recorded,
    NotRecorded,
    Skipped,
}

/// The play screen. Owns the quiz session, so leaving the screen drops
/// the session and its timers.
pub struct PlayView {
    pub session: QuizSession<AppEvent>,
    /// Entered through the Kangaroo menu item.
    pub kangaroo: bool,
    pub step: SelectStep,
    pub cursor: usize,
    /// Difficulty picked while the category is being chosen.
    pub difficulty: Option<Selection<Difficulty>>,
    pub option_cursor: usize,
    pub name_input: String,
    pub name_error: Option<String>,
    pub entry: ScoreEntry,
    finished_seen: bool,
    /// The finished run's leaderboard has been re-requested and not arrived.
    board_pending: bool,
}

impl PlayView {
    fn new(events: UnboundedSender<AppEvent>, kangaroo: bool) -> Self {
        Self {
            session: QuizSession::new(events),
            kangaroo,
            step: SelectStep::Difficulty,
            cursor: 0,
            difficulty: None,
            option_cursor: 0,
            name_input: String::new(),
            name_error: None,
            entry: ScoreEntry::Open,
            finished_seen: false,
            board_pending: false,
        }
    }

    fn clear_run(&mut self) {
        self.option_cursor = 0;
        self.name_input.clear();
        self.name_error = None;
        self.entry = ScoreEntry::Open;
        self.finished_seen = false;
        self.board_pending = false;
    }

    fn back_to_selection(&mut self) {
        self.session.reset(true);
        self.clear_run();
        self.step = SelectStep::Difficulty;
        self.cursor = 0;
        self.difficulty = None;
    }

    pub fn choice_count(&self) -> usize {
        match self.step {
            SelectStep::Difficulty => Selection::<Difficulty>::choices().len(),
            SelectStep::Category => Selection::<Category>::choices().len(),
        }
    }
}

pub enum Screen {
    Welcome { selected: usize },
    Browse(BrowseView),
    Details(DetailsView),
    Play(Box<PlayView>),
    HighScores { selected: usize },
    Profile { selected: usize },
}

/// One page of the browse list.
#[derive(Debug)]
pub struct PageView<'a> {
    pub rows: Vec<&'a Question>,
    pub number: usize,
    pub total_pages: usize,
    pub total_matches: usize,
}

/// Client application state.
pub struct ClientApp {
    pub screen: Screen,
    pub user: CurrentUser,
    pub user_profile: Option<GithubProfile>,
    pub library: QuestionLibrary,
    pub favorites: Favorites,
    pub leaderboards: Leaderboards,
    pub profiles: ProfileCache,
    pub view_state: ViewState,
    pub query: QuestionQuery,
    pub page_size: usize,
    pub alert: Option<Alert>,
    pub should_quit: bool,
    generation: u64,
    requests: Vec<Request>,
    events: UnboundedSender<AppEvent>,
}

impl ClientApp {
    /// Create the app on the welcome screen and queue the startup loads.
    pub fn new(events: UnboundedSender<AppEvent>, view_state: ViewState) -> Self {
        let mut app = Self {
            screen: Screen::Welcome { selected: 0 },
            user: CurrentUser::anonymous(),
            user_profile: None,
            library: QuestionLibrary::new(),
            favorites: Favorites::new(),
            leaderboards: Leaderboards::new(),
            profiles: ProfileCache::new(),
            view_state,
            query: QuestionQuery::default(),
            page_size: search::page_size_for_width(0),
            alert: None,
            should_quit: false,
            generation: 0,
            requests: Vec::new(),
            events,
        };
        app.requests.push(Request::LoadUser);
        app.load(Collection::ActiveAll);
        app
    }

    /// Requests queued since the last call.
    pub fn take_requests(&mut self) -> Vec<Request> {
        mem::take(&mut self.requests)
    }

    /// Bumped on every navigation; screen-bound completions carry it.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn load(&mut self, collection: Collection) {
        self.requests.push(Request::LoadCollection {
            generation: self.generation,
            collection,
        });
    }

    fn navigate(&mut self, screen: Screen) {
        if let Screen::Play(view) = &mut self.screen {
            view.session.abandon();
        }
        self.generation += 1;
        self.screen = screen;
    }

    pub fn show_alert(&mut self, title: impl Into<String>, lines: Vec<String>) {
        self.alert = Some(Alert {
            title: title.into(),
            lines,
        });
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    fn report(&mut self, title: &str, err: &ApiError) {
        log::error!("{}: {}", title, err);
        self.show_alert(title, err.user_messages());
    }

    fn report_manage(&mut self, title: &str, err: &ManageError) {
        log::warn!("{}: {}", title, err);
        self.show_alert(title, err.user_messages());
    }

    // Welcome

    pub fn go_home(&mut self) {
        self.navigate(Screen::Welcome { selected: 0 });
    }

    pub fn menu_move(&mut self, down: bool) {
        if let Screen::Welcome { selected } = &mut self.screen {
            *selected = step(*selected, MenuItem::ALL.len(), down);
        }
    }

    pub fn activate_menu(&mut self) {
        let Screen::Welcome { selected } = &self.screen else {
            return;
        };
        match MenuItem::ALL[*selected % MenuItem::ALL.len()] {
            MenuItem::Play => self.open_play(false),
            MenuItem::Kangaroo => self.open_play(true),
            MenuItem::Browse => self.open_browse(),
            MenuItem::HighScores => self.open_high_scores(),
            MenuItem::Profile => self.open_profile(),
            MenuItem::Quit => self.should_quit = true,
        }
    }

    // Browse

    pub fn open_browse(&mut self) {
        self.navigate(Screen::Browse(BrowseView::default()));
        self.load(Collection::ActiveAll);
        if !self.user.is_anonymous() && !self.favorites.is_loaded() {
            self.requests.push(Request::LoadFavorites);
        }
        self.clamp_page();
    }

    /// Questions passing the current query, in backend order.
    pub fn browse_matches(&self) -> Vec<&Question> {
        search::filter(self.library.get(Collection::ActiveAll), &self.query)
    }

    pub fn browse_page(&self) -> PageView<'_> {
        let matches = self.browse_matches();
        let page = search::paginate(&matches, self.view_state.current_page, self.page_size);
        PageView {
            rows: page.items.to_vec(),
            number: page.number,
            total_pages: page.total_pages,
            total_matches: matches.len(),
        }
    }

    /// Recompute the page size for a terminal `columns` wide.
    pub fn set_viewport(&mut self, columns: u16) {
        let page_size = search::page_size_for_width(u32::from(columns) * PIXELS_PER_CELL);
        if page_size != self.page_size {
            self.page_size = page_size;
            self.clamp_page();
        }
    }

    fn set_page(&mut self, page: usize) {
        if self.view_state.current_page != page {
            self.view_state.current_page = page;
            self.requests
                .push(Request::SaveViewState(self.view_state.clone()));
            if let Screen::Browse(view) = &mut self.screen {
                view.selected = 0;
            }
        }
    }

    /// Pull the current page back into range after the result set changed.
    pub fn clamp_page(&mut self) {
        if !self.library.is_loaded(Collection::ActiveAll) {
            return;
        }
        let total = search::total_pages(self.browse_matches().len(), self.page_size);
        let page = search::clamp_page(self.view_state.current_page, total);
        self.set_page(page);
    }

    pub fn change_page(&mut self, forward: bool) {
        let total = search::total_pages(self.browse_matches().len(), self.page_size);
        let current = self.view_state.current_page;
        let page = if forward {
            (current + 1).min(total.max(1))
        } else {
            current.saturating_sub(1).max(1)
        };
        self.set_page(page);
    }

    pub fn browse_move(&mut self, down: bool) {
        let rows = self.browse_page().rows.len();
        if let Screen::Browse(view) = &mut self.screen {
            view.selected = step(view.selected, rows, down);
        }
    }

    pub fn set_search_editing(&mut self, editing: bool) {
        if let Screen::Browse(view) = &mut self.screen {
            view.editing = editing;
        }
    }

    pub fn search_push(&mut self, c: char) {
        self.query.text.push(c);
        self.clamp_page();
    }

    pub fn search_pop(&mut self) {
        self.query.text.pop();
        self.clamp_page();
    }

    /// Cycle the difficulty filter through the difficulties present, then none.
    pub fn cycle_difficulty_filter(&mut self) {
        let offered = search::available_difficulties(self.library.get(Collection::ActiveAll));
        let next = cycle(self.query.difficulty, &offered);
        self.query.set_difficulty(next);
        self.clamp_page();
    }

    /// Cycle the category filter; does nothing while it is locked.
    pub fn cycle_category_filter(&mut self) {
        if self.query.category_locked() {
            return;
        }
        let offered = search::available_categories(self.library.get(Collection::ActiveAll));
        let next = cycle(self.query.category, &offered);
        self.query.set_category(next);
        self.clamp_page();
    }

    pub fn clear_filters(&mut self) {
        self.query.clear();
        self.clamp_page();
    }

    pub fn selected_browse_question(&self) -> Option<&Question> {
        let Screen::Browse(view) = &self.screen else {
            return None;
        };
        self.browse_page().rows.get(view.selected).copied()
    }

    // Details

    pub fn open_details(&mut self, id: &str, back: Back) {
        let cached = self.cached_question(id).cloned();
        if let Some(question) = &cached {
            self.claim_profiles(vec![question.owner_id.clone()]);
        }

        self.navigate(Screen::Details(DetailsView {
            id: id.to_string(),
            question: cached,
            back,
            scroll: 0,
            confirm_delete: false,
        }));
        self.requests.push(Request::LoadQuestion {
            generation: self.generation,
            id: id.to_string(),
        });
    }

    fn cached_question(&self, id: &str) -> Option<&Question> {
        self.library
            .find(id)
            .or_else(|| self.favorites.questions().iter().find(|q| q.id == id))
    }

    /// The question shown by the details view. Cached collections win
    /// because optimistic updates are applied there.
    pub fn details_question(&self) -> Option<&Question> {
        let Screen::Details(view) = &self.screen else {
            return None;
        };
        self.library.find(&view.id).or(view.question.as_ref())
    }

    pub fn details_scroll(&mut self, down: bool) {
        if let Screen::Details(view) = &mut self.screen {
            view.scroll = if down {
                view.scroll.saturating_add(1)
            } else {
                view.scroll.saturating_sub(1)
            };
        }
    }

    pub fn close_details(&mut self) {
        let Screen::Details(view) = &self.screen else {
            return;
        };
        match view.back {
            Back::Browse => self.open_browse(),
            Back::Profile => self.open_profile(),
        }
    }

    pub fn details_is_owned(&self) -> bool {
        self.details_question()
            .is_some_and(|q| !self.user.is_anonymous() && q.is_owned_by(self.user.id()))
    }

    /// First press arms the confirmation, the second sends the delete.
    pub fn request_delete(&mut self) {
        let Screen::Details(view) = &self.screen else {
            return;
        };
        let id = view.id.clone();
        if let Err(e) = self.library.owned(&id, &self.user).map(|_| ()) {
            self.report_manage("Cannot delete", &e);
            return;
        }

        if let Screen::Details(view) = &mut self.screen {
            if view.confirm_delete {
                view.confirm_delete = false;
                self.requests.push(Request::DeleteQuestion(id));
            } else {
                view.confirm_delete = true;
            }
        }
    }

    pub fn cancel_delete(&mut self) {
        if let Screen::Details(view) = &mut self.screen {
            view.confirm_delete = false;
        }
    }

    // Favorites and owner actions

    pub fn toggle_favorite(&mut self, id: &str) {
        if self.user.is_anonymous() {
            self.show_alert(
                "Log in required",
                vec!["Favorites are only available when logged in".to_string()],
            );
            return;
        }
        let Some(question) = self.cached_question(id).cloned() else {
            return;
        };

        let toggle = self.favorites.toggle(&question);
        self.requests.push(Request::SyncFavorite(toggle));
    }

    pub fn toggle_active(&mut self, id: &str) {
        match self.library.begin_toggle_active(id, &self.user) {
            Ok(toggle) => self.requests.push(Request::SyncActive(toggle)),
            Err(e) => self.report_manage("Cannot change status", &e),
        }
    }

    // Profile

    pub fn open_profile(&mut self) {
        if self.user.is_anonymous() {
            self.show_alert(
                "Log in required",
                vec!["Start the client with a session cookie to see your profile".to_string()],
            );
            return;
        }
        self.navigate(Screen::Profile { selected: 0 });
        self.requests.push(Request::LoadFavorites);
        self.load(Collection::Mine);
    }

    pub fn profile_rows(&self) -> &[Question] {
        match self.view_state.profile_tab {
            ProfileTab::Favorites => self.favorites.questions(),
            ProfileTab::MyQuestions => self.library.get(Collection::Mine),
        }
    }

    pub fn switch_profile_tab(&mut self) {
        self.view_state.profile_tab = self.view_state.profile_tab.toggled();
        self.requests
            .push(Request::SaveViewState(self.view_state.clone()));
        if let Screen::Profile { selected } = &mut self.screen {
            *selected = 0;
        }
    }

    pub fn profile_move(&mut self, down: bool) {
        let rows = self.profile_rows().len();
        if let Screen::Profile { selected } = &mut self.screen {
            *selected = step(*selected, rows, down);
        }
    }

    pub fn selected_profile_question(&self) -> Option<&Question> {
        let Screen::Profile { selected } = &self.screen else {
            return None;
        };
        self.profile_rows().get(*selected)
    }

    // High scores

    pub fn open_high_scores(&mut self) {
        self.navigate(Screen::HighScores { selected: 0 });
        for bucket in Bucket::ALL {
            self.requests.push(Request::LoadScores(bucket));
        }
    }

    pub fn selected_bucket(&self) -> Bucket {
        match &self.screen {
            Screen::HighScores { selected } => Bucket::ALL[*selected % Bucket::ALL.len()],
            _ => Bucket::Random,
        }
    }

    pub fn bucket_move(&mut self, forward: bool) {
        if let Screen::HighScores { selected } = &mut self.screen {
            *selected = step(*selected, Bucket::ALL.len(), forward);
        }
    }

    fn claim_profiles(&mut self, owner_ids: Vec<String>) {
        let claimed = self
            .profiles
            .claim_missing(owner_ids.iter().map(String::as_str));
        if !claimed.is_empty() {
            self.requests.push(Request::LoadProfiles(claimed));
        }
    }

    // Play

    pub fn open_play(&mut self, kangaroo: bool) {
        let view = PlayView::new(self.events.clone(), kangaroo);
        self.navigate(Screen::Play(Box::new(view)));
        self.load(Collection::Kangaroo);
        if kangaroo {
            self.draw_kangaroo();
        } else {
            self.load(Collection::Active);
        }
    }

    pub fn play_view(&self) -> Option<&PlayView> {
        match &self.screen {
            Screen::Play(view) => Some(view.as_ref()),
            _ => None,
        }
    }

    fn draw_kangaroo(&mut self) {
        if self.library.is_loaded(Collection::Kangaroo) {
            self.draw(Selection::Only(Difficulty::Kangaroo), Selection::Random);
        }
    }

    fn draw(&mut self, difficulty: Selection<Difficulty>, category: Selection<Category>) {
        let collection = pool_source(difficulty);
        if !self.library.is_loaded(collection) {
            self.show_alert("Please wait", vec!["Questions are still loading".to_string()]);
            return;
        }

        let Screen::Play(view) = &mut self.screen else {
            return;
        };
        let source = self.library.get(collection);
        let outcome = view
            .session
            .select_questions(source, difficulty, category, &mut rand::thread_rng());
        view.clear_run();

        if let Err(e) = outcome {
            self.show_alert("No quiz", vec![e.to_string()]);
        }
    }

    /// Move the highlighted menu entry or answer option.
    pub fn play_move(&mut self, down: bool) {
        let Screen::Play(view) = &mut self.screen else {
            return;
        };
        match view.session.phase() {
            Phase::Idle => {
                view.cursor = step(view.cursor, view.choice_count(), down);
            }
            Phase::InProgress if view.session.current_answer().is_none() => {
                let options = view
                    .session
                    .current_question()
                    .map(|q| q.options.len())
                    .unwrap_or(0);
                view.option_cursor = step(view.option_cursor, options, down);
            }
            _ => {}
        }
    }

    /// Enter on the play screen: choose, start, answer or advance.
    pub fn play_confirm(&mut self) {
        let Screen::Play(view) = &mut self.screen else {
            return;
        };

        match view.session.phase() {
            Phase::Idle => match view.step {
                SelectStep::Difficulty => {
                    let choices = Selection::<Difficulty>::choices();
                    let Some(difficulty) = choices.get(view.cursor).copied() else {
                        return;
                    };
                    if difficulty.is_kangaroo() {
                        self.draw(difficulty, Selection::Random);
                    } else {
                        view.difficulty = Some(difficulty);
                        view.step = SelectStep::Category;
                        view.cursor = 0;
                    }
                }
                SelectStep::Category => {
                    let choices = Selection::<Category>::choices();
                    let Some(category) = choices.get(view.cursor).copied() else {
                        return;
                    };
                    let difficulty = view.difficulty.unwrap_or(Selection::Random);
                    self.draw(difficulty, category);
                }
            },
            Phase::Previewing => {
                view.option_cursor = 0;
                if let Err(e) = view.session.start() {
                    self.show_alert("Cannot start", vec![e.to_string()]);
                }
            }
            Phase::InProgress => {
                if view.session.current_answer().is_none() {
                    let index = view.session.current_index();
                    view.session.answer(index, view.option_cursor);
                } else if view.session.next() {
                    view.option_cursor = 0;
                }
                self.after_session_change();
            }
            Phase::Finished => self.submit_score(),
        }
    }

    /// Esc on the play screen steps back one level.
    pub fn play_back(&mut self) {
        let Screen::Play(view) = &mut self.screen else {
            return;
        };
        match view.session.phase() {
            Phase::Idle if view.step == SelectStep::Category => {
                view.step = SelectStep::Difficulty;
                view.cursor = 0;
                view.difficulty = None;
            }
            Phase::Previewing | Phase::InProgress if !view.kangaroo => view.back_to_selection(),
            _ => self.go_home(),
        }
    }

    /// Soft reset with a freshly drawn pool for the same selections.
    pub fn play_again(&mut self) {
        let Screen::Play(view) = &mut self.screen else {
            return;
        };
        let Some(difficulty) = view.session.difficulty() else {
            return;
        };
        view.session.reset(false);
        view.clear_run();

        let source = self.library.get(pool_source(difficulty));
        if let Err(e) = view.session.reshuffle(source, &mut rand::thread_rng()) {
            self.show_alert("No quiz", vec![e.to_string()]);
        }
    }

    /// Hard reset back to the difficulty menu.
    pub fn new_quiz(&mut self) {
        let Screen::Play(view) = &mut self.screen else {
            return;
        };
        view.back_to_selection();
        if view.kangaroo {
            self.draw_kangaroo();
        }
    }

    /// `None` while the bucket's leaderboard is still loading.
    pub fn run_qualifies(&self) -> Option<bool> {
        let view = self.play_view()?;
        let result = view.session.result()?;
        if !result.is_full_run() {
            return Some(false);
        }
        if view.board_pending || !self.leaderboards.is_loaded(result.bucket()) {
            return None;
        }
        Some(self.leaderboards.qualifies(&result))
    }

    /// Whether keys should go to the player-name field.
    pub fn name_entry_active(&self) -> bool {
        self.play_view().is_some_and(|view| {
            view.session.phase() == Phase::Finished && view.entry == ScoreEntry::Open
        }) && self.run_qualifies() == Some(true)
    }

    pub fn name_push(&mut self, c: char) {
        if let Screen::Play(view) = &mut self.screen {
            if view.name_input.chars().count() < PLAYER_NAME_MAX {
                view.name_input.push(c);
            }
            view.name_error = None;
        }
    }

    pub fn name_pop(&mut self) {
        if let Screen::Play(view) = &mut self.screen {
            view.name_input.pop();
            view.name_error = None;
        }
    }

    pub fn skip_score(&mut self) {
        if let Screen::Play(view) = &mut self.screen {
            if view.entry == ScoreEntry::Open {
                view.entry = ScoreEntry::Skipped;
            }
        }
    }

    fn submit_score(&mut self) {
        if !self.name_entry_active() {
            return;
        }
        let Screen::Play(view) = &mut self.screen else {
            return;
        };
        let Some(result) = view.session.result() else {
            return;
        };

        match scores::new_high_score(&result, &view.name_input, &self.user, Utc::now()) {
            Ok(body) => {
                view.entry = ScoreEntry::Sending;
                view.name_error = None;
                self.requests.push(Request::SubmitScore {
                    token: result.token,
                    body,
                });
            }
            Err(e) => view.name_error = Some(e.to_string()),
        }
    }

    /// Refresh the run's leaderboard the first time a run is seen finished.
    fn after_session_change(&mut self) {
        let Screen::Play(view) = &mut self.screen else {
            return;
        };
        if view.finished_seen || view.session.phase() != Phase::Finished {
            return;
        }
        view.finished_seen = true;
        if let Some(result) = view.session.result() {
            view.board_pending = true;
            self.requests.push(Request::LoadScores(result.bucket()));
        }
    }

    /// A failed refresh falls back to whatever board was loaded before.
    fn board_arrived(&mut self, bucket: Bucket) {
        if let Screen::Play(view) = &mut self.screen {
            if view.session.result().is_some_and(|result| result.bucket() == bucket) {
                view.board_pending = false;
            }
        }
    }

    // Background completions

    /// Apply one completion from a background task.
    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Session(event) => {
                if let Screen::Play(view) = &mut self.screen {
                    if view.session.handle_event(event) {
                        self.after_session_change();
                    }
                }
            }
            AppEvent::UserLoaded { user, details } => {
                log::info!("current user: {}", user.id());
                self.user = user;
                self.user_profile = details;
                if !self.user.is_anonymous() {
                    self.requests.push(Request::LoadFavorites);
                }
            }
            AppEvent::CollectionLoaded {
                generation,
                collection,
                result,
            } => match result {
                Ok(questions) => {
                    log::debug!("loaded {} questions for {:?}", questions.len(), collection);
                    self.library.set(collection, questions);
                    if generation == self.generation {
                        self.after_collection(collection);
                    }
                }
                Err(e) if generation == self.generation => {
                    self.report("Could not load questions", &e);
                }
                Err(e) => log::warn!("stale load of {:?} failed: {}", collection, e),
            },
            AppEvent::FavoritesLoaded(result) => match result {
                Ok(questions) => self.favorites.load(questions),
                Err(e) if matches!(self.screen, Screen::Profile { .. }) => {
                    self.report("Could not load favorites", &e);
                }
                Err(e) => log::warn!("favorites not loaded: {}", e),
            },
            AppEvent::FavoriteSynced { toggle, result } => {
                if let Err(e) = self.favorites.settle(toggle, result) {
                    self.report("Could not update favorites", &e);
                }
            }
            AppEvent::ActiveSynced { toggle, result } => {
                if let Err(e) = self.library.settle_toggle_active(toggle, &self.user, result) {
                    self.report_manage("Could not change status", &e);
                }
            }
            AppEvent::QuestionDeleted { id, result } => match result {
                Ok(()) => {
                    log::info!("question {} deleted", id);
                    self.library.remove(&id);
                    self.favorites.remove(&id);
                    if matches!(&self.screen, Screen::Details(view) if view.id == id) {
                        self.close_details();
                    }
                }
                Err(e) => self.report("Could not delete question", &e),
            },
            AppEvent::QuestionLoaded { generation, result } => {
                if generation != self.generation {
                    log::debug!("dropping question load from generation {}", generation);
                    return;
                }
                match result {
                    Ok(question) => {
                        self.claim_profiles(vec![question.owner_id.clone()]);
                        self.library.upsert(&question, &self.user);
                        self.favorites.replace(&question);
                        if let Screen::Details(view) = &mut self.screen {
                            view.question = Some(question);
                        }
                    }
                    Err(e) => self.report("Could not load question", &e),
                }
            }
            AppEvent::ScoresLoaded { bucket, result } => {
                self.board_arrived(bucket);
                match result {
                    Ok(entries) => {
                        self.leaderboards.set(bucket, entries);
                        let owners = self
                            .leaderboards
                            .get(bucket)
                            .iter()
                            .map(|entry| entry.owner_id.clone())
                            .collect();
                        self.claim_profiles(owners);
                    }
                    Err(e) if matches!(self.screen, Screen::HighScores { .. }) => {
                        self.report("Could not load high scores", &e);
                    }
                    Err(e) => log::warn!("{} high scores not loaded: {}", bucket.key(), e),
                }
            }
            AppEvent::ScoreSubmitted {
                token,
                bucket,
                result,
            } => {
                let current = self
                    .play_view()
                    .is_some_and(|view| view.session.token() == token);
                match result {
                    Ok(submission) => {
                        let recorded = submission.recorded.is_some();
                        self.leaderboards.set(bucket, submission.board);
                        if let Screen::Play(view) = &mut self.screen {
                            if current {
                                view.entry = if recorded {
                                    ScoreEntry::Recorded
                                } else {
                                    ScoreEntry::NotRecorded
                                };
                            }
                        }
                    }
                    Err(e) if current => {
                        if let Screen::Play(view) = &mut self.screen {
                            view.entry = ScoreEntry::Open;
                        }
                        self.report("Could not save high score", &e);
                    }
                    Err(e) => log::warn!("high score of an earlier run failed: {}", e),
                }
            }
            AppEvent::ProfileLoaded { owner_id, profile } => {
                self.profiles.insert(owner_id, profile);
            }
        }
    }

    fn after_collection(&mut self, collection: Collection) {
        let waiting_for_kangaroo = matches!(
            &self.screen,
            Screen::Play(view) if view.kangaroo && view.session.phase() == Phase::Idle
        );
        match collection {
            Collection::ActiveAll if matches!(self.screen, Screen::Browse(_)) => self.clamp_page(),
            Collection::Kangaroo if waiting_for_kangaroo => self.draw_kangaroo(),
            _ => {}
        }
    }
}

/// Collection a pool for `difficulty` is drawn from.
fn pool_source(difficulty: Selection<Difficulty>) -> Collection {
    if difficulty.is_kangaroo() {
        Collection::Kangaroo
    } else {
        Collection::Active
    }
}

/// Wrapping cursor movement over `len` entries.
fn step(index: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    let index = index.min(len - 1);
    if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    }
}

/// `None`, then each value of `all`, then `None` again.
fn cycle<T: Copy + PartialEq>(current: Option<T>, all: &[T]) -> Option<T> {
    match current {
        None => all.first().copied(),
        Some(value) => all
            .iter()
            .position(|candidate| *candidate == value)
            .and_then(|index| all.get(index + 1))
            .copied(),
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use super::*;
    use crate::models::{AnswerOption, HighScoreEntry};
    use crate::quiz::QUIZ_LENGTH;
    use crate::scores::Submission;

    fn question(id: usize, difficulty: Difficulty, owner: &str) -> Question {
        Question {
            id: id.to_string(),
            title: format!("Question {}", id),
            difficulty,
            category: if difficulty == Difficulty::Kangaroo {
                Category::Kangaroo
            } else {
                Category::Geography
            },
            question_text: format!("Text {}", id),
            options: vec![
                AnswerOption::new("right", true),
                AnswerOption::new("wrong", false),
                AnswerOption::new("wrong", false),
                AnswerOption::new("wrong", false),
            ],
            answer_explanation: String::new(),
            is_active: true,
            owner_id: owner.to_string(),
            image_url: None,
        }
    }

    fn questions(count: usize) -> Vec<Question> {
        (0..count)
            .map(|i| question(i, Difficulty::Easy, "owner"))
            .collect()
    }

    fn app() -> (ClientApp, UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ClientApp::new(tx, ViewState::default()), rx)
    }

    fn deliver(app: &mut ClientApp, collection: Collection, questions: Vec<Question>) {
        let generation = app.generation();
        app.apply_event(AppEvent::CollectionLoaded {
            generation,
            collection,
            result: Ok(questions),
        });
    }

    fn logged_in(app: &mut ClientApp) {
        app.apply_event(AppEvent::UserLoaded {
            user: CurrentUser::new("me"),
            details: None,
        });
        app.take_requests();
    }

    #[test]
    fn test_startup_requests() {
        let (mut app, _rx) = app();
        let requests = app.take_requests();
        assert_eq!(requests[0], Request::LoadUser);
        assert_eq!(
            requests[1],
            Request::LoadCollection {
                generation: 0,
                collection: Collection::ActiveAll
            }
        );
        assert!(app.take_requests().is_empty());
    }

    #[test]
    fn test_page_is_clamped_when_filters_shrink_results() {
        let (mut app, _rx) = app();
        app.view_state.current_page = 3;
        app.open_browse();
        deliver(&mut app, Collection::ActiveAll, questions(20));
        app.take_requests();

        // 20 results at 8 per page
        assert_eq!(app.browse_page().total_pages, 3);
        assert_eq!(app.browse_page().rows.len(), 4);

        app.search_push('1');
        // "Question 1" and "Question 10".."Question 19"
        assert_eq!(app.browse_matches().len(), 11);
        assert_eq!(app.view_state.current_page, 2);
        assert!(app
            .take_requests()
            .contains(&Request::SaveViewState(app.view_state.clone())));

        app.search_push('9');
        assert_eq!(app.view_state.current_page, 1);
        assert_eq!(app.browse_page().rows.len(), 1);
    }

    #[test]
    fn test_viewport_changes_page_size() {
        let (mut app, _rx) = app();
        app.open_browse();
        deliver(&mut app, Collection::ActiveAll, questions(30));

        app.set_viewport(80);
        assert_eq!(app.page_size, 8);
        app.set_viewport(100);
        assert_eq!(app.page_size, 9);
        app.set_viewport(200);
        assert_eq!(app.page_size, 12);

        app.change_page(true);
        app.change_page(true);
        app.change_page(true);
        assert_eq!(app.view_state.current_page, 3);
        app.change_page(false);
        assert_eq!(app.view_state.current_page, 2);
    }

    #[test]
    fn test_kangaroo_filter_locks_category() {
        let (mut app, _rx) = app();
        app.open_browse();
        let mixed = [Difficulty::Hard, Difficulty::Kangaroo, Difficulty::Easy, Difficulty::Medium]
            .into_iter()
            .enumerate()
            .map(|(i, difficulty)| question(i, difficulty, "owner"))
            .collect();
        deliver(&mut app, Collection::ActiveAll, mixed);

        app.cycle_category_filter();
        assert_eq!(app.query.category, Some(Category::Geography));
        app.cycle_category_filter();
        assert_eq!(app.query.category, None);
        app.cycle_category_filter();

        for _ in 0..4 {
            app.cycle_difficulty_filter();
        }
        assert_eq!(app.query.difficulty, Some(Difficulty::Kangaroo));
        assert_eq!(app.query.category, None);
        app.cycle_category_filter();
        assert_eq!(app.query.category, None);

        app.cycle_difficulty_filter();
        assert_eq!(app.query.difficulty, None);
    }

    #[test]
    fn test_stale_question_load_is_dropped() {
        let (mut app, _rx) = app();
        app.open_details("5", Back::Browse);
        let stale = app.generation();
        app.go_home();
        app.open_details("6", Back::Browse);

        app.apply_event(AppEvent::QuestionLoaded {
            generation: stale,
            result: Ok(question(5, Difficulty::Easy, "owner")),
        });
        let Screen::Details(view) = &app.screen else {
            panic!("expected details screen");
        };
        assert!(view.question.is_none());

        let current = app.generation();
        app.apply_event(AppEvent::QuestionLoaded {
            generation: current,
            result: Ok(question(6, Difficulty::Easy, "owner")),
        });
        assert_eq!(app.details_question().unwrap().id, "6");
    }

    #[test]
    fn test_favorites_need_login_and_roll_back() {
        let (mut app, _rx) = app();
        deliver(&mut app, Collection::ActiveAll, questions(3));

        app.toggle_favorite("1");
        assert!(app.alert.is_some());
        app.dismiss_alert();

        logged_in(&mut app);
        app.toggle_favorite("1");
        assert!(app.favorites.contains("1"));
        let requests = app.take_requests();
        let Some(Request::SyncFavorite(toggle)) = requests.last().cloned() else {
            panic!("expected a favorite sync");
        };

        app.apply_event(AppEvent::FavoriteSynced {
            toggle,
            result: Err(ApiError::Status {
                status: 500,
                message: None,
            }),
        });
        assert!(!app.favorites.contains("1"));
        assert!(app.alert.is_some());
    }

    #[test]
    fn test_delete_requires_ownership_and_confirmation() {
        let (mut app, _rx) = app();
        logged_in(&mut app);
        deliver(
            &mut app,
            Collection::ActiveAll,
            vec![
                question(1, Difficulty::Easy, "me"),
                question(2, Difficulty::Easy, "other"),
            ],
        );

        app.open_details("2", Back::Browse);
        app.take_requests();
        app.request_delete();
        assert!(app.alert.is_some());
        assert!(app.take_requests().is_empty());
        app.dismiss_alert();

        app.open_details("1", Back::Browse);
        app.take_requests();
        app.request_delete();
        assert!(app.take_requests().is_empty());
        app.request_delete();
        assert_eq!(
            app.take_requests(),
            vec![Request::DeleteQuestion("1".to_string())]
        );

        app.apply_event(AppEvent::QuestionDeleted {
            id: "1".to_string(),
            result: Ok(()),
        });
        assert!(app.library.find("1").is_none());
        assert!(matches!(app.screen, Screen::Browse(_)));
    }

    #[test]
    fn test_active_toggle_rollback() {
        let (mut app, _rx) = app();
        logged_in(&mut app);
        app.open_profile();
        deliver(
            &mut app,
            Collection::Mine,
            vec![question(1, Difficulty::Hard, "me")],
        );
        app.take_requests();

        app.toggle_active("1");
        assert!(!app.library.find("1").unwrap().is_active);
        let Some(Request::SyncActive(toggle)) = app.take_requests().pop() else {
            panic!("expected an active sync");
        };

        app.apply_event(AppEvent::ActiveSynced {
            toggle,
            result: Err(ApiError::Status {
                status: 403,
                message: Some("Forbidden".to_string()),
            }),
        });
        assert!(app.library.find("1").unwrap().is_active);
    }

    #[test]
    fn test_deactivated_question_leaves_browse() {
        let (mut app, _rx) = app();
        logged_in(&mut app);
        app.open_browse();
        deliver(
            &mut app,
            Collection::ActiveAll,
            vec![question(1, Difficulty::Easy, "me"), question(2, Difficulty::Easy, "me")],
        );
        deliver(
            &mut app,
            Collection::Mine,
            vec![question(1, Difficulty::Easy, "me"), question(2, Difficulty::Easy, "me")],
        );
        app.take_requests();

        app.toggle_active("1");
        let ids: Vec<&str> = app.browse_matches().iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);
        let Some(Request::SyncActive(toggle)) = app.take_requests().pop() else {
            panic!("expected an active sync");
        };

        // a second press while the first is in flight changes nothing
        app.toggle_active("2");
        app.take_requests();
        app.toggle_active("2");
        assert!(app.alert.is_some());
        assert!(app.take_requests().is_empty());
        assert!(!app.library.find("2").unwrap().is_active);

        app.apply_event(AppEvent::ActiveSynced {
            toggle,
            result: Ok(()),
        });
        assert!(app.browse_matches().iter().all(|q| q.is_active));
        assert!(app.browse_matches().is_empty());
    }

    #[test]
    fn test_profile_requires_login() {
        let (mut app, _rx) = app();
        app.open_profile();
        assert!(matches!(app.screen, Screen::Welcome { .. }));
        assert!(app.alert.is_some());
    }

    #[tokio::test]
    async fn test_full_run_submits_high_score() {
        let (mut app, _rx) = app();
        app.open_play(false);
        deliver(&mut app, Collection::Active, questions(12));
        deliver(&mut app, Collection::Kangaroo, Vec::new());
        app.take_requests();

        // Random difficulty, then Random category
        app.play_confirm();
        assert_eq!(app.play_view().unwrap().step, SelectStep::Category);
        app.play_confirm();
        assert_eq!(app.play_view().unwrap().session.phase(), Phase::Previewing);

        app.play_confirm();
        assert_eq!(app.play_view().unwrap().session.phase(), Phase::InProgress);

        for _ in 0..QUIZ_LENGTH {
            app.play_confirm(); // answer with the first option
            app.play_confirm(); // next
        }
        let view = app.play_view().unwrap();
        assert_eq!(view.session.phase(), Phase::Finished);
        assert_eq!(view.session.wrong_answers(), 0);
        assert_eq!(
            app.take_requests(),
            vec![Request::LoadScores(Bucket::Random)]
        );

        assert_eq!(app.run_qualifies(), None);
        app.apply_event(AppEvent::ScoresLoaded {
            bucket: Bucket::Random,
            result: Ok(Vec::new()),
        });
        assert_eq!(app.run_qualifies(), Some(true));
        assert!(app.name_entry_active());

        app.name_push('A');
        app.name_push('l');
        app.play_confirm();
        assert!(app.play_view().unwrap().name_error.is_some());
        assert!(app.take_requests().is_empty());

        app.name_push('a');
        app.play_confirm();
        let requests = app.take_requests();
        let Some(Request::SubmitScore { token, body }) = requests.first().cloned() else {
            panic!("expected a submission");
        };
        assert_eq!(body.player_name, "Ala");
        assert_eq!(body.bucket, Bucket::Random);
        assert_eq!(app.play_view().unwrap().entry, ScoreEntry::Sending);

        app.apply_event(AppEvent::ScoreSubmitted {
            token,
            bucket: Bucket::Random,
            result: Ok(Submission {
                recorded: None,
                board: Vec::<HighScoreEntry>::new(),
            }),
        });
        assert_eq!(app.play_view().unwrap().entry, ScoreEntry::NotRecorded);
    }

    #[tokio::test]
    async fn test_board_from_before_the_run_is_not_trusted() {
        let (mut app, _rx) = app();
        app.apply_event(AppEvent::ScoresLoaded {
            bucket: Bucket::Random,
            result: Ok(Vec::new()),
        });
        app.open_play(false);
        deliver(&mut app, Collection::Active, questions(12));
        app.play_confirm();
        app.play_confirm();
        app.play_confirm();
        for _ in 0..QUIZ_LENGTH {
            app.play_confirm();
            app.play_confirm();
        }
        assert!(app.leaderboards.is_loaded(Bucket::Random));
        assert_eq!(app.run_qualifies(), None);
        assert!(!app.name_entry_active());

        // another bucket's board does not settle this run
        app.apply_event(AppEvent::ScoresLoaded {
            bucket: Bucket::Easy,
            result: Ok(Vec::new()),
        });
        assert_eq!(app.run_qualifies(), None);

        app.apply_event(AppEvent::ScoresLoaded {
            bucket: Bucket::Random,
            result: Ok(Vec::new()),
        });
        assert_eq!(app.run_qualifies(), Some(true));
    }

    #[tokio::test]
    async fn test_short_run_never_qualifies() {
        let (mut app, _rx) = app();
        app.open_play(false);
        deliver(&mut app, Collection::Active, questions(3));
        app.play_confirm();
        app.play_confirm();
        app.play_confirm();
        for _ in 0..3 {
            app.play_confirm();
            app.play_confirm();
        }
        assert_eq!(app.run_qualifies(), Some(false));
        assert!(!app.name_entry_active());
    }

    #[tokio::test]
    async fn test_leaving_play_drops_the_session() {
        let (mut app, _rx) = app();
        app.open_play(false);
        deliver(&mut app, Collection::Active, questions(10));
        app.play_confirm();
        app.play_confirm();
        app.play_confirm();
        let token = app.play_view().unwrap().session.token();

        app.go_home();
        assert!(app.play_view().is_none());
        // late ticks of the dropped run are harmless
        app.apply_event(AppEvent::Session(crate::quiz::SessionEvent::Tick(token)));
        assert!(matches!(app.screen, Screen::Welcome { .. }));
    }

    #[tokio::test]
    async fn test_kangaroo_menu_draws_once_loaded() {
        let (mut app, _rx) = app();
        app.open_play(true);
        assert_eq!(app.play_view().unwrap().session.phase(), Phase::Idle);

        let roos = (0..12)
            .map(|i| question(i, Difficulty::Kangaroo, "owner"))
            .collect();
        deliver(&mut app, Collection::Kangaroo, roos);

        let view = app.play_view().unwrap();
        assert_eq!(view.session.phase(), Phase::Previewing);
        assert_eq!(view.session.pool().len(), QUIZ_LENGTH);
        assert!(view.session.pool().iter().all(Question::is_kangaroo));
    }

    #[test]
    fn test_step_and_cycle() {
        assert_eq!(step(0, 3, false), 2);
        assert_eq!(step(2, 3, true), 0);
        assert_eq!(step(7, 3, true), 0);
        assert_eq!(step(0, 0, true), 0);
        assert_eq!(cycle(None, &[1, 2]), Some(1));
        assert_eq!(cycle(Some(1), &[1, 2]), Some(2));
        assert_eq!(cycle(Some(2), &[1, 2]), None);
    }

}
