pub mod controller;
pub mod session;

pub use controller::{Completion, Intent, LiveWindow, ViewEvent, ViewState, SCROLL_LOOKBACK_ROWS};
pub use session::LiveSession;
