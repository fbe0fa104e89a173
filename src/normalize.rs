//! Field normalization applied to every parsed entry.
//!
//! [`customize`] runs the steps in a fixed order: unicode conversion, author
//! names, editor names, page ranges. Each step sees the output of the one
//! before it and leaves the record alone when its field is missing.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use unicode_normalization::UnicodeNormalization;

use crate::bibtex::RawEntry;
use crate::record::Reference;

/// Field values by field name.
pub type Fields = BTreeMap<String, String>;

/// Accent command followed by the letter it applies to, braced or not:
/// `\"o`, `\"{o}`, `\c c`, `\'{\i}`.
static ACCENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\\(?:(?P<sym>["'`^~=.])|(?P<word>[uvHckrd])\b)\s*(?:\{\s*(?P<braced>\\[ij]\b|[A-Za-z])\s*\}|(?P<bare>\\[ij]\b|[A-Za-z]))"#,
    )
    .expect("accent pattern is valid")
});

/// Letter-like commands such as `\ss` or `\o`, with the space or `{}` that
/// terminates them.
static SYMBOL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(?P<name>ss|ae|AE|oe|OE|aa|AA|o|O|l|L|i|j)(?:\{\}|\b ?)")
        .expect("symbol pattern is valid")
});

static AND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+and\s+").expect("name separator pattern is valid"));

/// Name words that belong to the last name when they precede it.
const PARTICLES: &[&str] = &["ben", "van", "der", "de", "la", "le"];

/// Trailing words dropped from a `First Last` name.
const SUFFIXES: &[&str] = &["jnr", "jr", "junior"];

/// Runs the normalization pipeline on a raw entry.
///
/// Returns the citation identifier with the finished reference.
pub fn customize(entry: RawEntry) -> (String, Reference) {
    let RawEntry {
        key,
        entry_type,
        mut fields,
    } = entry;

    convert_to_unicode(&mut fields);
    let authors = author(&mut fields);
    let editors = editor(&mut fields);
    page_double_hyphen(&mut fields);

    let mut reference = Reference::from_fields(entry_type, fields);
    reference.author = authors;
    reference.editor = editors;
    (key, reference)
}

/// Step 1: resolves LaTeX macros into unicode and drops grouping braces in
/// every field value.
pub fn convert_to_unicode(fields: &mut Fields) {
    for value in fields.values_mut() {
        *value = latex_to_unicode(value);
    }
}

/// Step 2: takes the `author` field out as a list of `Last, First` names.
pub fn author(fields: &mut Fields) -> Option<Vec<String>> {
    fields.remove("author").map(|value| split_names(&value))
}

/// Step 3: same as [`author`] for `editor`.
pub fn editor(fields: &mut Fields) -> Option<Vec<String>> {
    fields.remove("editor").map(|value| split_names(&value))
}

/// Step 4: rewrites a hyphenated `pages` range as `first--last`.
///
/// `"12-34"` becomes `"12--34"`; `"12--34"` is unchanged.
pub fn page_double_hyphen(fields: &mut Fields) {
    if let Some(pages) = fields.get_mut("pages") {
        if pages.contains('-') {
            let parts: Vec<&str> = pages.split('-').map(str::trim).collect();
            let first = parts.first().copied().unwrap_or_default();
            let last = parts.last().copied().unwrap_or_default();
            *pages = format!("{}--{}", first, last);
        }
    }
}

/// Converts LaTeX markup in a field value to plain unicode text.
///
/// Whitespace runs, line breaks included, collapse to one space. The result
/// is in Unicode normalization form C.
pub fn latex_to_unicode(text: &str) -> String {
    let text = if text.contains('\\') {
        let accented = ACCENT_RE.replace_all(text, |caps: &Captures| {
            let accent = caps
                .name("sym")
                .or_else(|| caps.name("word"))
                .and_then(|m| m.as_str().chars().next())
                .unwrap_or_default();
            let base = caps
                .name("braced")
                .or_else(|| caps.name("bare"))
                .map(|m| m.as_str().trim_start_matches('\\'))
                .and_then(|s| s.chars().next())
                .unwrap_or_default();
            compose(accent, base)
        });
        SYMBOL_RE
            .replace_all(&accented, |caps: &Captures| symbol(&caps["name"]).to_string())
            .into_owned()
    } else {
        text.to_string()
    };

    let mut plain = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars
                .peek()
                .is_some_and(|&next| matches!(next, '&' | '%' | '$' | '#' | '_' | '{' | '}')) =>
            {
                plain.extend(chars.next());
            }
            '{' | '}' => {}
            c => plain.push(c),
        }
    }

    plain
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .nfc()
        .collect()
}

fn compose(accent: char, base: char) -> String {
    let mut out = base.to_string();
    out.extend(combining_mark(accent));
    out
}

fn combining_mark(accent: char) -> Option<char> {
    let mark = match accent {
        '`' => '\u{0300}',
        '\'' => '\u{0301}',
        '^' => '\u{0302}',
        '~' => '\u{0303}',
        '=' => '\u{0304}',
        'u' => '\u{0306}',
        '.' => '\u{0307}',
        '"' => '\u{0308}',
        'r' => '\u{030A}',
        'H' => '\u{030B}',
        'v' => '\u{030C}',
        'd' => '\u{0323}',
        'c' => '\u{0327}',
        'k' => '\u{0328}',
        _ => return None,
    };
    Some(mark)
}

fn symbol(name: &str) -> char {
    match name {
        "ss" => 'ß',
        "ae" => 'æ',
        "AE" => 'Æ',
        "oe" => 'œ',
        "OE" => 'Œ',
        "aa" => 'å',
        "AA" => 'Å',
        "o" => 'ø',
        "O" => 'Ø',
        "l" => 'ł',
        "L" => 'Ł',
        "i" => 'ı',
        _ => 'ȷ',
    }
}

/// Splits a BibTeX name list on `and` and puts every name in `Last, First` form.
pub fn split_names(value: &str) -> Vec<String> {
    AND_RE
        .split(value.trim())
        .map(canonical_name)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Puts one name in `Last, First` form.
///
/// A name with a comma is split at its first comma. Otherwise the last word
/// is the last name and initials are spaced (`D.E.` becomes `D. E.`). A
/// trailing `jr` gives way to the word before it, and particles right before
/// the last name join it. A single word is kept as it is.
fn canonical_name(name: &str) -> String {
    let (mut last, mut firsts): (String, Vec<String>) = match name.split_once(',') {
        Some((last, rest)) => (
            last.trim().to_string(),
            rest.split_whitespace().map(String::from).collect(),
        ),
        None => {
            let mut words: Vec<&str> = name.split_whitespace().collect();
            let Some(last) = words.pop() else {
                return String::new();
            };
            let firsts = words
                .iter()
                .map(|w| w.replace('.', ". ").trim().to_string())
                .collect();
            (last.to_string(), firsts)
        }
    };

    if SUFFIXES.contains(&last.as_str()) {
        if let Some(word) = firsts.pop() {
            last = word;
        }
    }

    while let Some(word) = firsts.last().filter(|w| PARTICLES.contains(&w.as_str())) {
        last = format!("{} {}", word, last);
        firsts.pop();
    }

    if firsts.is_empty() {
        last
    } else {
        format!("{}, {}", last, firsts.join(" "))
    }
}
