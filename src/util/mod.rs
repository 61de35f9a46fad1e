//! Text helpers shared by the scrapers and the command-line output.
//!
//! - **Cleaning**: whitespace and control-character normalization for scraped text
//! - **Width**: Unicode-aware width calculation and truncation for terminal columns

mod text;

pub use text::{clean_text, display_width, strip_control_chars, truncate_to_width};
