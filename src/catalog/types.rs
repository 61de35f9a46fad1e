use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::http::FetchError;

/// Placeholder stored in hydrated text fields the title page did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// The in-memory collection, keyed and ordered by chart rank.
pub type Movies = BTreeMap<u32, MovieRecord>;

// ============================================================================
// Error Types
// ============================================================================

/// Failures of the chart scrape.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("chart page unreachable: {0}")]
    Unreachable(#[source] FetchError),
    #[error("no chart rows matched any selector")]
    NoCandidates,
}

/// Something the catalog looked for does not exist.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotFound {
    #[error("no search result for \"{0}\"")]
    SearchResult(String),
    #[error("no title id in link {href} for \"{title}\"")]
    TitleId { title: String, href: String },
    #[error("no storyline on the plot summary page of {0}")]
    Storyline(String),
    #[error("no movie with rank {0}")]
    Rank(u32),
}

/// Errors surfaced by [`MovieManager`](super::MovieManager) operations.
///
/// Every variant names its subject so a front end can show a useful message
/// without inspecting the cause chain.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Not found: {0}")]
    NotFound(#[from] NotFound),

    /// A page needed for a single lookup stage could not be fetched
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// A title lookup kept failing until its attempt budget ran out
    #[error("Failed to get details for {title} after {attempts} attempts: {source}")]
    Hydration {
        title: String,
        attempts: u32,
        #[source]
        source: Box<CatalogError>,
    },
}

// ============================================================================
// Records
// ============================================================================

/// One chart entry.
///
/// Starts as a stub holding only rank and title. A successful lookup replaces
/// it with a hydrated record (`details_fetched == true`) whose text fields are
/// filled in or set to [`NOT_AVAILABLE`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieRecord {
    pub rank: u32,
    pub title: String,
    #[serde(default)]
    pub details_fetched: bool,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default, alias = "genre", deserialize_with = "genre_list")]
    pub genres: Vec<String>,
    /// Short plot from the title page.
    #[serde(default)]
    pub description: Option<String>,
    /// Long-form storyline, or a copy of `description` when the plot summary
    /// page had none.
    #[serde(default)]
    pub storyline: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub fetched_at: Option<DateTime<Utc>>,
}

/// On-disk shape of a [`MovieRecord`].
///
/// Stubs carry only their identity. Hydrated records always carry `genres`
/// and `poster_url`, as `[]` and `null` when the title page had none.
#[derive(Serialize)]
struct RecordRepr<'a> {
    rank: u32,
    title: &'a str,
    details_fetched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    imdb_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    year: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    director: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rating: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    genres: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    storyline: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    poster_url: Option<Option<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fetched_at: Option<&'a DateTime<Utc>>,
}

impl<'a> From<&'a MovieRecord> for RecordRepr<'a> {
    fn from(record: &'a MovieRecord) -> Self {
        let hydrated = record.details_fetched;
        Self {
            rank: record.rank,
            title: &record.title,
            details_fetched: hydrated,
            imdb_id: record.imdb_id.as_deref(),
            url: record.url.as_deref(),
            year: record.year.as_deref(),
            director: record.director.as_deref(),
            rating: record.rating.as_deref(),
            genres: (hydrated || !record.genres.is_empty()).then_some(record.genres.as_slice()),
            description: record.description.as_deref(),
            storyline: record.storyline.as_deref(),
            poster_url: (hydrated || record.poster_url.is_some())
                .then(|| record.poster_url.as_deref()),
            fetched_at: record.fetched_at.as_ref(),
        }
    }
}

impl Serialize for MovieRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        RecordRepr::from(self).serialize(serializer)
    }
}

impl MovieRecord {
    pub fn stub(rank: u32, title: impl Into<String>) -> Self {
        Self {
            rank,
            title: title.into(),
            details_fetched: false,
            imdb_id: None,
            url: None,
            year: None,
            director: None,
            rating: None,
            genres: Vec::new(),
            description: None,
            storyline: None,
            poster_url: None,
            fetched_at: None,
        }
    }

    /// Genres joined for display, or [`NOT_AVAILABLE`] when there are none.
    pub fn genre_label(&self) -> String {
        if self.genres.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            self.genres.join(", ")
        }
    }
}

/// Everything a title lookup produces. Carries no rank: the caller decides
/// where in the collection it belongs.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetails {
    pub title: String,
    pub imdb_id: String,
    pub url: String,
    pub year: String,
    pub director: String,
    pub rating: String,
    pub genres: Vec<String>,
    pub description: String,
    pub storyline: String,
    pub poster_url: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl MovieDetails {
    pub fn into_record(self, rank: u32) -> MovieRecord {
        MovieRecord {
            rank,
            title: self.title,
            details_fetched: true,
            imdb_id: Some(self.imdb_id),
            url: Some(self.url),
            year: Some(self.year),
            director: Some(self.director),
            rating: Some(self.rating),
            genres: self.genres,
            description: Some(self.description),
            storyline: Some(self.storyline),
            poster_url: self.poster_url,
            fetched_at: Some(self.fetched_at),
        }
    }
}

/// Older cache files store genres as one comma-joined string.
#[derive(Deserialize)]
#[serde(untagged)]
enum GenreField {
    List(Vec<String>),
    Joined(String),
}

fn genre_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match GenreField::deserialize(deserializer)? {
        GenreField::List(list) => list,
        GenreField::Joined(joined) if joined.trim() == NOT_AVAILABLE => Vec::new(),
        GenreField::Joined(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_owned)
            .collect(),
    })
}
