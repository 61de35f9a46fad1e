//! Ranked movie chart scraper with lazy per-title hydration and a JSON cache.
//!
//! The [`catalog::MovieManager`] is the entry point: it discovers the chart,
//! hydrates individual titles on demand (with retries), and saves or loads the
//! accumulated collection. Front ends only consume its records.

pub mod catalog;
pub mod config;
pub mod http;
pub mod retry;
pub mod scrape;
pub mod util;
