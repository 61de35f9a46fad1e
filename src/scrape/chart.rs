//! Ranked chart extraction.
//!
//! The chart markup changes every few redesigns, so candidate rows are located
//! with an ordered list of matchers tried in turn; the first matcher that finds
//! any node decides the candidate set. Titles inside a candidate are found the
//! same way with a shorter fallback list.
use scraper::{ElementRef, Html, Selector};

use super::inline_text;

/// One strategy for locating chart rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateMatcher {
    pub name: &'static str,
    css: &'static str,
}

impl CandidateMatcher {
    pub const fn new(name: &'static str, css: &'static str) -> Self {
        Self { name, css }
    }

    /// All nodes this strategy considers chart rows, in document order.
    pub fn candidates<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        match Selector::parse(self.css) {
            Ok(selector) => document.select(&selector).collect(),
            Err(e) => {
                tracing::warn!(matcher = self.name, error = ?e, "Unparseable chart selector");
                Vec::new()
            }
        }
    }
}

/// Chart row strategies, most specific first.
pub const CANDIDATE_MATCHERS: &[CandidateMatcher] = &[
    CandidateMatcher::new("summary-item", ".ipc-metadata-list-summary-item"),
    CandidateMatcher::new("list-item", ".ipc-metadata-list-item"),
    CandidateMatcher::new(
        "main-column-list-item",
        "[data-testid='chart-layout-main-column'] .ipc-metadata-list-item",
    ),
    CandidateMatcher::new("title-link-wrapper", ".ipc-title-link-wrapper"),
];

/// Where to look for the title text inside one chart row.
const TITLE_SELECTORS: &[&str] = &[".ipc-title__text", ".ipc-metadata-list-item__label", "a"];

/// A chart row reduced to its position and display title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartEntry {
    pub rank: u32,
    pub title: String,
}

/// Outcome of scanning a chart page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartScan {
    /// Name of the matcher that produced the candidate set.
    pub matcher: &'static str,
    /// Total candidate rows on the page, before applying the limit.
    pub candidates: usize,
    /// Rows within the limit that yielded a title. Rows without one are
    /// skipped and leave their rank unused.
    pub entries: Vec<ChartEntry>,
}

/// Scans a chart page with the default matcher chain.
///
/// Returns `None` when no matcher finds a single candidate row.
pub fn parse_chart(html: &str, limit: usize) -> Option<ChartScan> {
    parse_chart_with(html, limit, CANDIDATE_MATCHERS)
}

/// Scans a chart page with an explicit matcher chain.
///
/// Ranks are 1-based positions among the candidate rows, so the rank of a row
/// does not depend on whether earlier rows yielded a title.
pub fn parse_chart_with(
    html: &str,
    limit: usize,
    matchers: &[CandidateMatcher],
) -> Option<ChartScan> {
    let document = Html::parse_document(html);

    let (matcher, rows) = matchers.iter().find_map(|m| {
        let rows = m.candidates(&document);
        (!rows.is_empty()).then_some((m, rows))
    })?;

    tracing::debug!(matcher = matcher.name, rows = rows.len(), "Chart rows located");

    let entries = rows
        .iter()
        .take(limit)
        .enumerate()
        .filter_map(|(index, row)| {
            let title = row_title(*row)?;
            Some(ChartEntry {
                rank: u32::try_from(index + 1).ok()?,
                title: strip_rank_prefix(&title).to_string(),
            })
        })
        .collect();

    Some(ChartScan {
        matcher: matcher.name,
        candidates: rows.len(),
        entries,
    })
}

fn row_title(row: ElementRef<'_>) -> Option<String> {
    TITLE_SELECTORS.iter().find_map(|css| {
        let selector = Selector::parse(css).ok()?;
        row.select(&selector)
            .next()
            .map(inline_text)
            .filter(|text| !text.is_empty())
    })
}

/// Drops a leading "`<n>. `" ranking prefix from a chart title.
///
/// A title counts as prefixed when it starts with a digit and contains ". ";
/// everything up to and including the first ". " is removed.
///
/// ```
/// use cinerank::scrape::chart::strip_rank_prefix;
///
/// assert_eq!(strip_rank_prefix("7. The Movie"), "The Movie");
/// assert_eq!(strip_rank_prefix("The Movie"), "The Movie");
/// assert_eq!(strip_rank_prefix("2001: A Space Odyssey"), "2001: A Space Odyssey");
/// ```
pub fn strip_rank_prefix(title: &str) -> &str {
    if !title.starts_with(|c: char| c.is_ascii_digit()) {
        return title;
    }
    match title.split_once(". ") {
        Some((_, rest)) => rest,
        None => title,
    }
}
