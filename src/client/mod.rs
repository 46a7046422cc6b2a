//! Interactive terminal client.
//!
//! One loop owns the [`ClientApp`] state: it draws, reads keys and applies
//! completions that background tasks send back as [`AppEvent`]s.

mod client;
mod events;
mod state;
mod ui;

pub use client::run;
pub use events::{AppEvent, Request};
pub use state::{Back, ClientApp, MenuItem, PlayView, Screen, ScoreEntry, SelectStep};
