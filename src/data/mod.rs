mod loader;

pub use loader::{load_draft, load_edit, LoadError};
