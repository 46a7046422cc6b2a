//! Screens of the terminal client. Rendering only reads [`ClientApp`].
//!
//! [`ClientApp`]: crate::client::state::ClientApp

mod browse;
mod details;
mod high_scores;
mod name_entry;
mod profile;
mod quiz;
mod render;
mod results;
mod welcome;

pub use render::render;
