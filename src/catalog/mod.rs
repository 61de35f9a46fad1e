//! The movie catalog: chart discovery, per-title hydration and the JSON cache.
//!
//! - [`MovieManager`] - owns the collection and runs every scrape
//! - [`MovieRecord`] - one chart entry, either a stub or hydrated
//! - [`CatalogError`] - typed failures carrying the subject they concern
//!
//! # Example
//!
//! ```ignore
//! use cinerank::catalog::MovieManager;
//! use cinerank::config::Config;
//!
//! let mut manager = MovieManager::new(Config::default())?;
//! manager.load_from_file("movie_data.json".as_ref());
//! let top = manager.discover(10, false).await?;
//! let first = manager.get_by_rank(1).await?;
//! manager.save_to_file("movie_data.json".as_ref());
//! ```

mod manager;
mod store;
mod types;

pub use manager::MovieManager;
pub use store::PersistError;
pub use types::{
    CatalogError, DiscoveryError, MovieDetails, MovieRecord, Movies, NotFound, NOT_AVAILABLE,
};
