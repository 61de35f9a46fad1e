//! Plot summary sub-page.
use scraper::{Html, Selector};

use super::element_text;

const CONTENT_BLOCK: &str = ".ipc-html-content-inner-div";

/// Position of the storyline among the page's content blocks.
///
/// Fragile: this relies on the current page layout (summaries first, then the
/// synopsis) and breaks silently if the site reorders its blocks. Do not
/// reuse this offset trick for other pages.
pub const STORYLINE_BLOCK_INDEX: usize = 2;

/// Minimum number of blocks the page must carry before the storyline is read.
const MIN_BLOCKS: usize = 2;

/// The long-form storyline, or `None` when the page does not have enough
/// content blocks.
///
/// A page with exactly two blocks passes the block-count check but has no
/// block at [`STORYLINE_BLOCK_INDEX`], and also yields `None`.
pub fn parse_storyline(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(CONTENT_BLOCK).ok()?;
    let blocks: Vec<_> = document.select(&selector).collect();

    if blocks.len() < MIN_BLOCKS {
        return None;
    }

    blocks
        .get(STORYLINE_BLOCK_INDEX)
        .map(|block| element_text(*block))
        .filter(|text| !text.is_empty())
}
