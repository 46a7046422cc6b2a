//! Small pieces of UI state remembered between runs.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileTab {
    #[default]
    Favorites,
    MyQuestions,
}

impl ProfileTab {
    pub fn toggled(self) -> Self {
        match self {
            ProfileTab::Favorites => ProfileTab::MyQuestions,
            ProfileTab::MyQuestions => ProfileTab::Favorites,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ProfileTab::Favorites => "Favorites",
            ProfileTab::MyQuestions => "My Questions",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewState {
    pub profile_tab: ProfileTab,
    /// 1-indexed browse page.
    pub current_page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            profile_tab: ProfileTab::default(),
            current_page: 1,
        }
    }
}

#[derive(Debug)]
pub enum ViewStateError {
    Io(io::Error),
    Encode(serde_json::Error),
}

impl fmt::Display for ViewStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewStateError::Io(e) => write!(f, "Failed to write view state: {}", e),
            ViewStateError::Encode(e) => write!(f, "Failed to encode view state: {}", e),
        }
    }
}

impl std::error::Error for ViewStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewStateError::Io(e) => Some(e),
            ViewStateError::Encode(e) => Some(e),
        }
    }
}

impl From<io::Error> for ViewStateError {
    fn from(err: io::Error) -> Self {
        ViewStateError::Io(err)
    }
}

impl From<serde_json::Error> for ViewStateError {
    fn from(err: serde_json::Error) -> Self {
        ViewStateError::Encode(err)
    }
}

/// JSON file holding a [`ViewState`].
#[derive(Debug, Clone)]
pub struct ViewStateStore {
    path: PathBuf,
}

impl ViewStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored state. A missing or unreadable file yields the default.
    pub fn load(&self) -> ViewState {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return ViewState::default(),
            Err(e) => {
                log::warn!("Could not read {}: {}", self.path.display(), e);
                return ViewState::default();
            }
        };

        match serde_json::from_str::<ViewState>(&content) {
            Ok(mut state) => {
                state.current_page = state.current_page.max(1);
                state
            }
            Err(e) => {
                log::warn!("Ignoring corrupt view state {}: {}", self.path.display(), e);
                ViewState::default()
            }
        }
    }

    /// Write `state` through a temporary file so readers never see a partial file.
    pub fn save(&self, state: &ViewState) -> Result<(), ViewStateError> {
        let json = serde_json::to_string_pretty(state)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
