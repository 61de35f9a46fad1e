//! HTML extraction for the three page kinds the catalog reads.
//!
//! Everything here is a pure function from page text to extracted values, so
//! the fragile coupling to the site's markup can be tested against fixtures
//! without a network:
//!
//! - [`chart`] - ranked chart page, with an ordered fallback of candidate matchers
//! - [`title`] - search results and a title's canonical page
//! - [`plot`] - the plot summary sub-page holding the long-form storyline

pub mod chart;
pub mod plot;
pub mod title;

use scraper::{ElementRef, Html, Selector};

use crate::util::{clean_text, strip_control_chars};

/// Text of an element and its descendants, trimmed and without control
/// characters. Inner line breaks and spacing are kept.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    let text: String = element.text().collect();
    strip_control_chars(&text).trim().to_owned()
}

/// Single-line text of an element: like [`element_text`], with every run of
/// whitespace collapsed to one space. For titles, names and labels.
pub(crate) fn inline_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}

/// Single-line text of the first element matching `css` anywhere in
/// `document`, or `None` when nothing matches or the match has no text.
pub(crate) fn first_text(document: &Html, css: &str) -> Option<String> {
    first_match(document, css, inline_text)
}

/// Like [`first_text`], but keeps the layout of multi-line prose.
pub(crate) fn first_block_text(document: &Html, css: &str) -> Option<String> {
    first_match(document, css, element_text)
}

fn first_match(
    document: &Html,
    css: &str,
    extract: fn(ElementRef<'_>) -> String,
) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document
        .select(&selector)
        .next()
        .map(extract)
        .filter(|text| !text.is_empty())
}
