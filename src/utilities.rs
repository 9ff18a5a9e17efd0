//! Small text heuristics shared by translators: whitespace cleanup, free-text name splitting,
//! loose date parsing and short-title derivation.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::item::Creator;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Collapse internal whitespace runs to a single space and trim the ends.
pub fn trim_internal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

/// Best-effort split of a single free-text name into given and family parts.
///
/// The last whitespace-separated word becomes the family name. A single word is kept whole as the
/// family name with an empty given name. Run-together initials are spaced out (`J.R.` → `J. R.`,
/// `JR` → `J. R.`).
pub fn clean_author(name: &str, creator_type: &str) -> Creator {
    static LEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\s.,/\[\]:]+").unwrap());
    static TRAILING: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s,/\[\]:.]+$").unwrap());

    let name = trim_internal(name);
    let name = LEADING.replace(&name, "");
    let name = TRAILING.replace(&name, "");
    match name.rsplit_once(' ') {
        Some((first, last)) => Creator::new(&expand_initials(first), last, creator_type),
        None => Creator::new("", &name, creator_type),
    }
}

fn expand_initials(first: &str) -> String {
    static RUN_TOGETHER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.(\p{Lu})").unwrap());
    if first.len() <= 3 && first.chars().all(|c| c.is_ascii_uppercase()) {
        return first
            .chars()
            .map(|c| format!("{c}."))
            .collect::<Vec<_>>()
            .join(" ");
    }
    RUN_TOGETHER.replace_all(first, ". $1").into_owned()
}

/// Normalize a loosely formatted date to ISO 8601 (`YYYY-MM-DD`, `YYYY-MM` or `YYYY`).
///
/// Returns `None` when no year can be found.
pub fn str_to_iso(s: &str) -> Option<String> {
    static YMD: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^(\d{4})[-/.](\d{1,2})(?:[-/.](\d{1,2}))?(?:$|[T\s])").unwrap()
    });
    static NUMERIC_DMY: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^(\d{1,2})[-/.](\d{1,2})[-/.](\d{4})\b").unwrap());
    static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{4})\b").unwrap());
    static MONTH: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\b\.?").unwrap()
    });
    static DAY: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\b").unwrap());

    let s = s.trim();
    if let Some(c) = YMD.captures(s) {
        let year = c[1].parse().ok()?;
        let month = c[2].parse().ok();
        let day = c.get(3).and_then(|d| d.as_str().parse().ok());
        return Some(format_parts(year, month, day));
    }
    if let Some(c) = NUMERIC_DMY.captures(s) {
        let a: u32 = c[1].parse().ok()?;
        let b: u32 = c[2].parse().ok()?;
        let year = c[3].parse().ok()?;
        // US order unless the first number cannot be a month.
        let (month, day) = if a > 12 { (b, a) } else { (a, b) };
        return Some(format_parts(year, Some(month), Some(day)));
    }

    let year: i32 = YEAR.captures(s)?[1].parse().ok()?;
    let month = MONTH.captures(s).and_then(|c| {
        let abbrev = c[1].to_ascii_lowercase();
        MONTHS.iter().position(|m| *m == abbrev).map(|i| i as u32 + 1)
    });
    let day = month.and_then(|_| {
        let rest = YEAR.replace(s, " ");
        let rest = MONTH.replace(&rest, " ");
        DAY.captures(&rest).and_then(|c| c[1].parse().ok())
    });
    Some(format_parts(year, month, day))
}

fn format_parts(year: i32, month: Option<u32>, day: Option<u32>) -> String {
    match (month, day) {
        (Some(m), Some(d)) if NaiveDate::from_ymd_opt(year, m, d).is_some() => {
            format!("{year:04}-{m:02}-{d:02}")
        }
        (Some(m), _) if (1..=12).contains(&m) => format!("{year:04}-{m:02}"),
        _ => format!("{year:04}"),
    }
}

/// The part of a title before its first colon, when that is meaningfully shorter.
pub fn derive_short_title(title: &str) -> Option<String> {
    let (head, _tail) = title.split_once(':')?;
    let head = head.trim();
    (!head.is_empty() && head.len() + 3 < title.len()).then(|| head.to_string())
}
