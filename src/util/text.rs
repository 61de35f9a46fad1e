use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Calculates the display width of a string in terminal columns.
///
/// CJK characters and most emoji count as two columns, combining marks as zero.
///
/// ```
/// use cinerank::util::display_width;
///
/// assert_eq!(display_width("Alien"), 5);
/// assert_eq!(display_width("七人の侍"), 8);
/// ```
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncates a string to at most `max_width` terminal columns, appending "..."
/// when something was cut off.
///
/// Widths of three columns or fewer have no room for an ellipsis, so the
/// string is cut without one.
///
/// ```
/// use cinerank::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("The Godfather Part II", 16), "The Godfather...");
/// assert_eq!(truncate_to_width("Heat", 10), "Heat");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let budget = if max_width > ELLIPSIS_WIDTH {
        max_width - ELLIPSIS_WIDTH
    } else {
        max_width
    };

    let mut used = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        end = idx + c.len_utf8();
    }

    if max_width > ELLIPSIS_WIDTH {
        Cow::Owned(format!("{}{}", &s[..end], ELLIPSIS))
    } else {
        Cow::Owned(s[..end].to_string())
    }
}

fn is_control(c: char) -> bool {
    c == '\u{7f}' || (c.is_ascii_control() && c != '\t' && c != '\n' && c != '\r')
}

/// Removes ASCII control characters other than tab, newline and carriage return.
///
/// Scraped pages occasionally carry stray control bytes inside text nodes and
/// these end up in the JSON cache and on the terminal otherwise. Returns
/// `Cow::Borrowed` when nothing needs removing.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(is_control) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.chars().filter(|&c| !is_control(c)).collect())
}

/// Normalizes text pulled out of an HTML node: control characters are removed,
/// every run of whitespace becomes one space and the ends are trimmed.
///
/// ```
/// use cinerank::util::clean_text;
///
/// assert_eq!(clean_text("  Crime,\n   Drama  "), "Crime, Drama");
/// ```
pub fn clean_text(s: &str) -> String {
    let stripped = strip_control_chars(s);
    let mut out = String::with_capacity(stripped.len());
    for word in stripped.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
