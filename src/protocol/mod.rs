mod messages;

pub use messages::{validation_messages, ErrorBody, ImageUpload, NewHighScore};
