mod health;
mod models;
pub mod openai_types;
mod transcriptions;

pub use health::health_handler;
pub use models::models_handler;
pub use transcriptions::{LANE_HEADER, transcriptions_handler};
