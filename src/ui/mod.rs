pub mod log_table;

pub use log_table::{severity_cell, LogTable};
