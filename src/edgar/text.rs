use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

// Tags whose content carries no narrative. The ix:* family is inline XBRL
// markup wrapping machine-readable facts.
static SCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").unwrap());
static STYLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").unwrap());
static IX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)<ix:(nonfraction|nonnumeric|header|hidden|references)\b[^>]*>.*?</ix:(nonfraction|nonnumeric|header|hidden|references)\s*>",
    )
    .unwrap()
});
static BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>|</p>|</div>").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[_=\-]{10,}").unwrap());
static BLANK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Converts raw filing markup into clean plain text bounded at `max_chars`
/// characters. Pure: the same input always yields the same output.
pub fn normalize(raw_markup: &str, max_chars: usize) -> String {
    let mut text = SCRIPT_RE.replace_all(raw_markup, "").into_owned();
    text = STYLE_RE.replace_all(&text, "").into_owned();
    text = IX_RE.replace_all(&text, "").into_owned();

    // Block-level boundaries become line breaks, every other tag vanishes.
    text = BREAK_RE.replace_all(&text, "\n").into_owned();
    text = TAG_RE.replace_all(&text, "\n").into_owned();
    text = decode_html_entities(&text).into_owned();

    text = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    text = SEPARATOR_RE.replace_all(&text, "").into_owned();
    text = BLANK_RE.replace_all(&text, "\n\n").into_owned();
    text = text.nfkc().collect::<String>();

    truncate_chars(&text, max_chars).to_string()
}

/// Character-budget hard cut with no ellipsis, safe on multi-byte input.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
