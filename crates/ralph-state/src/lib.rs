pub mod model;
pub mod paths;
pub mod store;
pub mod templates;

pub use model::{MultiSpecState, RunState, SpecProgress, Status, STATE_VERSION, parse_status_or_continue};
pub use store::*;
