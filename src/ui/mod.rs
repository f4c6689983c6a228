//! UI utilities for terminal output
//!
//! Progress spinners, suppressed in quiet mode.

mod spinner;

pub use spinner::{create_spinner, finish_spinner, finish_spinner_with_status};
