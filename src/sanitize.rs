//! Filesystem-safe name sanitization.
//!
//! Series names, titles and file names come from user-authored metadata and
//! arbitrary directory layouts. Before they become path components they are
//! reduced to word characters, underscores, hyphens and apostrophes, and
//! accented Latin letters are folded to their closest ASCII spelling.
//!
//! # Example
//!
//! ```
//! use comiclink::sanitize::clean_name;
//!
//! assert_eq!(clean_name("Astérix: Le Gaulois!"), "Asterix_Le_Gaulois");
//! assert_eq!(clean_name("L'Arabe du futur"), "L'Arabe_du_futur");
//! ```

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::char::{decompose_canonical, is_combining_mark};

/// Everything that is not a word character, whitespace, hyphen, apostrophe,
/// or in the Latin-1 letter block.
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s\-'À-ÿ]").expect("static pattern is valid"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s").expect("static pattern is valid"));

/// Clean a series, title or file name for use as a path component.
///
/// The function is pure and total: every input yields an output made only of
/// word characters, `_`, `-` and `'`. Already-clean ASCII alphanumerics pass
/// through unchanged apart from spaces becoming underscores.
#[must_use]
pub fn clean_name(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }

    let stripped = DISALLOWED.replace_all(name, "");
    let underscored = WHITESPACE.replace_all(&stripped, "_");
    transliterate(&underscored)
}

/// Clean a file name while keeping its extension.
///
/// The dot before the extension would otherwise be stripped by
/// [`clean_name`], leaving links that comic readers no longer recognise.
///
/// ```
/// use comiclink::sanitize::clean_file_name;
///
/// assert_eq!(clean_file_name("Tintin (1946).cbz"), "Tintin_1946.cbz");
/// assert_eq!(clean_file_name("README"), "README");
/// ```
#[must_use]
pub fn clean_file_name(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            let ext = clean_name(ext);
            if ext.is_empty() {
                clean_name(stem)
            } else {
                format!("{}.{}", clean_name(stem), ext)
            }
        }
        _ => clean_name(file_name),
    }
}

/// Fold non-ASCII characters to ASCII where a Latin spelling exists.
///
/// Characters without one (CJK, Cyrillic, ...) are word characters and are
/// kept as they are.
fn transliterate(input: &str) -> String {
    let mut out = String::with_capacity(input.len());

    for c in input.chars() {
        if c.is_ascii() {
            out.push(c);
            continue;
        }
        if is_combining_mark(c) {
            continue;
        }

        if let Some(replacement) = special_case(c) {
            out.push_str(replacement);
            continue;
        }

        let mut base = String::new();
        let mut foreign = false;
        decompose_canonical(c, |d| {
            if d.is_ascii() {
                base.push(d);
            } else if !is_combining_mark(d) {
                foreign = true;
            }
        });

        if foreign || base.is_empty() {
            out.push(c);
        } else {
            out.push_str(&base);
        }
    }

    out
}

/// Letters with no canonical decomposition, plus the two Latin-1 symbols
/// that survive the character filter.
fn special_case(c: char) -> Option<&'static str> {
    let s = match c {
        'Æ' => "AE",
        'æ' => "ae",
        'Œ' => "OE",
        'œ' => "oe",
        'Ø' => "O",
        'ø' => "o",
        'ß' => "ss",
        'Þ' => "Th",
        'þ' => "th",
        'Ð' | 'Đ' => "D",
        'ð' | 'đ' => "d",
        'Ł' => "L",
        'ł' => "l",
        'Ħ' => "H",
        'ħ' => "h",
        'ı' => "i",
        '×' => "x",
        '÷' => "",
        _ => return None,
    };
    Some(s)
}
