use chrono::Utc;
use std::path::Path;

use super::store::{read_movies, write_movies};
use super::types::{
    CatalogError, DiscoveryError, MovieDetails, MovieRecord, Movies, NotFound, NOT_AVAILABLE,
};
use crate::config::Config;
use crate::http::{build_client, fetch_page, FetchError};
use crate::retry::RetryPolicy;
use crate::scrape::{chart, plot, title};

/// Owns the movie collection and every network path that fills it.
///
/// All operations run sequentially on the calling task; nothing is spawned.
/// Mutating operations take `&mut self`, so one manager serves one writer at
/// a time. Share it behind a `tokio::sync::Mutex` if several tasks need it.
#[derive(Debug)]
pub struct MovieManager {
    client: reqwest::Client,
    config: Config,
    movies: Movies,
}

/// Output of lookup stages 1-3: search, id extraction, title page.
struct TitleLookup {
    imdb_id: String,
    url: String,
    page: title::TitlePage,
}

impl MovieManager {
    /// Creates a manager with an empty collection and a client carrying the
    /// configured request headers.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self, FetchError> {
        let client = build_client(&config)?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: Config, client: reqwest::Client) -> Self {
        Self {
            client,
            config,
            movies: Movies::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The whole collection in rank order.
    pub fn movies(&self) -> &Movies {
        &self.movies
    }

    pub fn get(&self, rank: u32) -> Option<&MovieRecord> {
        self.movies.get(&rank)
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    fn up_to(&self, limit: u32) -> Movies {
        self.movies
            .range(..=limit)
            .map(|(rank, record)| (*rank, record.clone()))
            .collect()
    }

    fn site(&self) -> &str {
        self.config.site_url.trim_end_matches('/')
    }

    fn search_url(&self, movie_title: &str) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("q", movie_title)
            .finish();
        format!("{}/find/?{}", self.site(), query)
    }

    fn title_url(&self, imdb_id: &str) -> String {
        format!("{}/title/{}/", self.site(), imdb_id)
    }

    fn plot_url(&self, imdb_id: &str) -> String {
        format!("{}/title/{}/plotsummary/", self.site(), imdb_id)
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        fetch_page(&self.client, url, self.config.request_timeout()).await
    }

    // ========================================================================
    // Discovery
    // ========================================================================

    /// Returns the chart entries ranked `1..=limit`, scraping the chart first
    /// when needed.
    ///
    /// A non-empty collection is served as-is unless `force_refresh` is set;
    /// no request is made in that case. A forced refresh replaces the whole
    /// collection, hydrated records included, but only once the new chart
    /// has been scraped successfully.
    ///
    /// Finding fewer than `limit` entries is logged, not treated as an error.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Discovery`] when the chart page cannot be fetched or no
    /// candidate matcher finds any row.
    pub async fn discover(
        &mut self,
        limit: u32,
        force_refresh: bool,
    ) -> Result<Movies, CatalogError> {
        if !self.movies.is_empty() && !force_refresh {
            return Ok(self.up_to(limit));
        }

        let html = self
            .fetch(&self.config.chart_url)
            .await
            .map_err(DiscoveryError::Unreachable)?;

        let scan = chart::parse_chart(&html, limit as usize).ok_or(DiscoveryError::NoCandidates)?;

        if force_refresh {
            self.movies.clear();
        }

        for entry in scan.entries {
            self.movies
                .insert(entry.rank, MovieRecord::stub(entry.rank, entry.title));
        }

        let found = self.up_to(limit);
        if found.len() < limit as usize {
            tracing::warn!(
                found = found.len(),
                expected = limit,
                candidates = scan.candidates,
                matcher = scan.matcher,
                "Chart yielded fewer movies than requested"
            );
        } else {
            tracing::info!(
                count = found.len(),
                candidates = scan.candidates,
                matcher = scan.matcher,
                "Chart discovered"
            );
        }

        Ok(found)
    }

    // ========================================================================
    // Hydration
    // ========================================================================

    /// Looks up one title using the configured retry policy.
    ///
    /// See [`get_details_with`](Self::get_details_with).
    pub async fn get_details(&self, movie_title: &str) -> Result<MovieDetails, CatalogError> {
        self.get_details_with(movie_title, &self.config.retry_policy())
            .await
    }

    /// Looks up one title: search, extract its id, read the title page, then
    /// try the plot summary page for a long-form storyline.
    ///
    /// The first three stages are retried together under `policy`. Fields the
    /// title page lacks become [`NOT_AVAILABLE`]. A failed storyline lookup is
    /// not an error: the short plot is used in its place.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Hydration`] with the last attempt's error once every
    /// attempt has failed.
    pub async fn get_details_with(
        &self,
        movie_title: &str,
        policy: &RetryPolicy,
    ) -> Result<MovieDetails, CatalogError> {
        let lookup = policy
            .run(movie_title, |_| self.lookup_title(movie_title))
            .await
            .map_err(|exhausted| CatalogError::Hydration {
                title: movie_title.to_string(),
                attempts: exhausted.attempts,
                source: Box::new(exhausted.last),
            })?;

        let TitleLookup { imdb_id, url, page } = lookup;
        let description = page.plot.unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let storyline = match self.get_long_form(&imdb_id).await {
            Ok(storyline) => storyline,
            Err(e) => {
                tracing::debug!(
                    imdb_id = %imdb_id,
                    error = %e,
                    "No storyline, using plot summary"
                );
                description.clone()
            }
        };

        Ok(MovieDetails {
            title: movie_title.to_string(),
            imdb_id,
            url,
            year: page.year.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            director: page.director.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            rating: page.rating.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            genres: page.genres,
            description,
            storyline,
            poster_url: page.poster_url,
            fetched_at: Utc::now(),
        })
    }

    async fn lookup_title(&self, movie_title: &str) -> Result<TitleLookup, CatalogError> {
        let search_html = self.fetch(&self.search_url(movie_title)).await?;

        let href = title::find_title_link(&search_html)
            .ok_or_else(|| NotFound::SearchResult(movie_title.to_string()))?;

        let imdb_id = title::extract_title_id(&href).ok_or_else(|| NotFound::TitleId {
            title: movie_title.to_string(),
            href: href.clone(),
        })?;

        let url = self.title_url(&imdb_id);
        let page_html = self.fetch(&url).await?;

        Ok(TitleLookup {
            imdb_id,
            url,
            page: title::parse_title_page(&page_html),
        })
    }

    /// Fetches the long-form storyline from a title's plot summary page.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Fetch`] when the page cannot be fetched, or
    /// [`NotFound::Storyline`] when it lacks the storyline block.
    pub async fn get_long_form(&self, imdb_id: &str) -> Result<String, CatalogError> {
        let html = self.fetch(&self.plot_url(imdb_id)).await?;
        plot::parse_storyline(&html).ok_or_else(|| NotFound::Storyline(imdb_id.to_string()).into())
    }

    /// Re-reads only the poster link from a title page. Failures are logged
    /// and yield `None`.
    pub async fn poster_url(&self, imdb_id: &str) -> Option<String> {
        match self.fetch(&self.title_url(imdb_id)).await {
            Ok(html) => title::parse_poster_url(&html),
            Err(e) => {
                tracing::warn!(imdb_id = %imdb_id, error = %e, "Failed to fetch poster");
                None
            }
        }
    }

    /// Returns the record at `rank`, hydrating it first if it is still a stub.
    ///
    /// An unknown rank triggers a (cache-first) discovery with `limit = rank`.
    /// Hydrated records are returned without any request. The hydrated record
    /// always keeps the rank it was requested under.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Discovery`] from the discovery attempt
    /// - [`NotFound::Rank`] when the rank is still unknown afterwards
    /// - [`CatalogError::Hydration`] when the title lookup fails
    pub async fn get_by_rank(&mut self, rank: u32) -> Result<MovieRecord, CatalogError> {
        if !self.movies.contains_key(&rank) {
            self.discover(rank, false).await?;
        }

        let movie = self.movies.get(&rank).ok_or(NotFound::Rank(rank))?;
        if movie.details_fetched {
            return Ok(movie.clone());
        }

        let movie_title = movie.title.clone();
        let record = self.get_details(&movie_title).await?.into_record(rank);
        self.movies.insert(rank, record.clone());
        tracing::info!(rank = rank, title = %record.title, "Movie details fetched");

        Ok(record)
    }

    /// Hydrates every stub up to `max_rank` (or every known rank) in ascending
    /// order and returns those entries.
    ///
    /// Discovers the chart first when the collection is empty, using
    /// `max_rank` or the configured default limit. A failed lookup is logged
    /// and skipped. Successful lookups are spaced by the configured pacing
    /// delay.
    ///
    /// # Errors
    ///
    /// Only discovery failures are returned; per-movie failures never are.
    pub async fn hydrate_all(&mut self, max_rank: Option<u32>) -> Result<Movies, CatalogError> {
        if self.movies.is_empty() {
            let limit = max_rank.unwrap_or(self.config.default_limit);
            self.discover(limit, false).await?;
        }

        let ranks: Vec<u32> = self
            .movies
            .keys()
            .copied()
            .filter(|rank| max_rank.map_or(true, |max| *rank <= max))
            .collect();

        let pending: Vec<u32> = ranks
            .iter()
            .copied()
            .filter(|rank| !self.movies[rank].details_fetched)
            .collect();

        let pacing = self.config.pacing();
        let mut previous_succeeded = false;
        let mut failed = 0usize;

        for rank in pending {
            if previous_succeeded && !pacing.is_zero() {
                tokio::time::sleep(pacing).await;
            }

            tracing::info!(rank = rank, title = %self.movies[&rank].title, "Fetching details");
            match self.get_by_rank(rank).await {
                Ok(_) => previous_succeeded = true,
                Err(e) => {
                    failed += 1;
                    previous_succeeded = false;
                    tracing::warn!(rank = rank, error = %e, "Skipping movie after failed lookup");
                }
            }
        }

        if failed > 0 {
            tracing::warn!(failed = failed, total = ranks.len(), "Some movies could not be hydrated");
        }

        Ok(ranks
            .iter()
            .filter_map(|rank| self.movies.get(rank).map(|m| (*rank, m.clone())))
            .collect())
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Writes the whole collection to `path`. Returns `false` (and logs) on
    /// failure instead of erroring.
    pub fn save_to_file(&self, path: &Path) -> bool {
        match write_movies(path, &self.movies) {
            Ok(()) => {
                tracing::info!(path = %path.display(), count = self.movies.len(), "Saved movie data");
                true
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Error saving movie data");
                false
            }
        }
    }

    /// Replaces the collection with the contents of `path` and returns it.
    ///
    /// A missing file or an unreadable one yields an empty map and leaves the
    /// current collection untouched; errors are logged, never returned.
    pub fn load_from_file(&mut self, path: &Path) -> Movies {
        match read_movies(path) {
            Ok(Some(movies)) => {
                tracing::info!(path = %path.display(), count = movies.len(), "Loaded movie data");
                self.movies = movies;
                self.movies.clone()
            }
            Ok(None) => {
                tracing::info!(path = %path.display(), "No saved movie data");
                Movies::new()
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Error loading movie data");
                Movies::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn manager(site: &str) -> MovieManager {
        MovieManager::new(Config {
            chart_url: format!("{site}/chart/top/"),
            site_url: format!("{site}/"),
            ..Config::default()
        })
        .unwrap()
    }

    #[test]
    fn test_urls_are_built_from_site() {
        let m = manager("https://example.com");
        assert_eq!(
            m.search_url("The Good, the Bad & the Ugly"),
            "https://example.com/find/?q=The+Good%2C+the+Bad+%26+the+Ugly"
        );
        assert_eq!(m.title_url("tt0060196"), "https://example.com/title/tt0060196/");
        assert_eq!(
            m.plot_url("tt0060196"),
            "https://example.com/title/tt0060196/plotsummary/"
        );
    }

    #[test]
    fn test_up_to_is_inclusive() {
        let mut m = manager("https://example.com");
        for rank in 1..=5 {
            m.movies.insert(rank, MovieRecord::stub(rank, format!("Movie {rank}")));
        }
        let subset = m.up_to(3);
        assert_eq!(subset.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_load_missing_file_keeps_collection() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = manager("https://example.com");
        m.movies.insert(1, MovieRecord::stub(1, "Ikiru"));

        let loaded = m.load_from_file(&dir.path().join("absent.json"));

        assert!(loaded.is_empty());
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_load_corrupt_file_keeps_collection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movie_data.json");
        std::fs::write(&path, "not json").unwrap();
        let mut m = manager("https://example.com");
        m.movies.insert(1, MovieRecord::stub(1, "Ikiru"));

        assert!(m.load_from_file(&path).is_empty());
        assert_eq!(m.get(1).map(|r| r.title.as_str()), Some("Ikiru"));
    }

    #[test]
    fn test_save_failure_returns_false() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let m = manager("https://example.com");

        assert!(!m.save_to_file(&blocker.join("movie_data.json")));
    }

    #[test]
    fn test_default_pacing_and_policy() {
        let m = manager("https://example.com");
        assert_eq!(m.config().pacing(), Duration::from_secs(1));
        assert_eq!(m.config().retry_policy(), RetryPolicy::new(3, Duration::from_secs(2)));
    }
}
