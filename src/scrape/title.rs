//! Search results and canonical title pages.
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

use super::{first_block_text, first_text, inline_text};

static TITLE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/title/(tt\d+)").expect("title id regex is valid"));

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}").expect("year regex is valid"));

const PERMALINK: &str = "a[href*='/title/tt']";
const RELEASE_DATE: &str = "[data-testid='title-details-releasedate']";
const PRINCIPAL_CREDIT: &str = "[data-testid='title-pc-principal-credit']";
const RATING: &str = "[data-testid='hero-rating-bar__aggregate-rating__score']";
const GENRES: &str = "[data-testid='genres']";
const PLOT: &str = "[data-testid='plot']";
const POSTER_IMG: &str = "[data-testid='hero-media__poster'] img";

/// Fields read from a title's canonical page. Each one is optional and
/// extracted independently, so one missing block never hides the others.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitlePage {
    pub year: Option<String>,
    pub director: Option<String>,
    pub rating: Option<String>,
    pub genres: Vec<String>,
    pub plot: Option<String>,
    pub poster_url: Option<String>,
}

/// The `href` of the first search result that links to a title page.
pub fn find_title_link(search_html: &str) -> Option<String> {
    let document = Html::parse_document(search_html);
    let selector = Selector::parse(PERMALINK).ok()?;
    document
        .select(&selector)
        .find_map(|a| a.value().attr("href"))
        .map(str::to_owned)
}

/// Pulls the external identifier (`tt` followed by digits) out of a permalink.
///
/// ```
/// use cinerank::scrape::title::extract_title_id;
///
/// assert_eq!(extract_title_id("/title/tt0111161/?ref_=fn_al_tt_1").as_deref(), Some("tt0111161"));
/// assert_eq!(extract_title_id("/name/nm0000209/"), None);
/// ```
pub fn extract_title_id(href: &str) -> Option<String> {
    TITLE_ID_RE
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}

pub fn parse_title_page(html: &str) -> TitlePage {
    let document = Html::parse_document(html);
    TitlePage {
        year: release_year(&document),
        director: director(&document),
        rating: first_text(&document, RATING),
        genres: genres(&document),
        plot: first_block_text(&document, PLOT),
        poster_url: poster_url(&document),
    }
}

/// Poster image link only; used when refreshing a stale poster.
pub fn parse_poster_url(html: &str) -> Option<String> {
    poster_url(&Html::parse_document(html))
}

fn release_year(document: &Html) -> Option<String> {
    let text = first_text(document, RELEASE_DATE)?;
    YEAR_RE.find(&text).map(|m| m.as_str().to_owned())
}

/// First credited name in the principal-credit block that links to a director.
fn director(document: &Html) -> Option<String> {
    let credits = Selector::parse(PRINCIPAL_CREDIT).ok()?;
    let links = Selector::parse("a").ok()?;

    let block = document.select(&credits).find(|block| {
        block
            .select(&links)
            .filter_map(|a| a.value().attr("href"))
            .any(|href| href.contains("director"))
    })?;

    block
        .select(&links)
        .next()
        .map(inline_text)
        .filter(|name| !name.is_empty())
}

fn genres(document: &Html) -> Vec<String> {
    let (Ok(container), Ok(links)) = (Selector::parse(GENRES), Selector::parse("a")) else {
        return Vec::new();
    };
    let Some(block) = document.select(&container).next() else {
        return Vec::new();
    };
    block
        .select(&links)
        .map(inline_text)
        .filter(|genre| !genre.is_empty())
        .collect()
}

fn poster_url(document: &Html) -> Option<String> {
    let selector = Selector::parse(POSTER_IMG).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::to_owned)
}
