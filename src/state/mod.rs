pub mod logs_state;

pub use logs_state::{LogsAction, LogsState};
