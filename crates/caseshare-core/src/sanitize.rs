//! SharePoint-safe file and folder names
//!
//! [`sanitize_filename`] is the single authority for how user-supplied file names are
//! stored. The API uses it when brokering upload sessions and the client uses it for
//! previews and duplicate detection, so both sides always agree on the final name.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum length of the name portion (extension excluded).
pub const MAX_BASE_LEN: usize = 100;

/// Characters stripped from both ends of the name portion.
const EDGE_CHARS: &[char] = &[' ', '.', '-', '_'];

/// Characters replaced with `_` in folder names.
const FOLDER_FORBIDDEN: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

static LAST_FALLBACK_STAMP: AtomicI64 = AtomicI64::new(0);

/// Outcome of sanitizing one name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SanitizationResult {
    /// Name as supplied by the user
    pub original: String,
    /// SharePoint-safe name
    pub sanitized: String,
    /// Whether `sanitized` differs from `original`
    pub changes_made: bool,
}

impl SanitizationResult {
    /// Name portion of the sanitized name.
    pub fn name_without_extension(&self) -> &str {
        split_extension(&self.sanitized).0
    }

    /// Extension of the sanitized name, including the leading dot (empty when absent).
    pub fn extension(&self) -> &str {
        split_extension(&self.sanitized).1
    }
}

/// Sanitize a file name for SharePoint.
///
/// Spaces become `_` unless `preserve_spaces` is set. Names that sanitize to nothing
/// fall back to `file_{millis}`, unique within the process.
pub fn sanitize_filename(name: &str, preserve_spaces: bool) -> SanitizationResult {
    sanitize_filename_with(name, preserve_spaces, next_fallback_stamp)
}

/// Same as [`sanitize_filename`] with an injectable source for the empty-name fallback.
pub fn sanitize_filename_with<F>(name: &str, preserve_spaces: bool, fallback: F) -> SanitizationResult
where
    F: FnOnce() -> i64,
{
    let (base, extension) = split_extension(name);

    let base = if preserve_spaces {
        base.to_string()
    } else {
        base.replace(' ', "_")
    };

    let base = substitute_forbidden(&base);
    let base = collapse_separator_runs(&base);
    let mut base = base.trim_matches(EDGE_CHARS).to_string();

    if RESERVED_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(&base))
    {
        base.push_str("_file");
    }

    if base.is_empty() {
        base = format!("file_{}", fallback());
    }

    if base.chars().count() > MAX_BASE_LEN {
        let truncated: String = base.chars().take(MAX_BASE_LEN).collect();
        base = truncated.trim_end_matches(EDGE_CHARS).to_string();
    }

    let sanitized = format!("{}{}", base, extension);
    SanitizationResult {
        original: name.to_string(),
        changes_made: sanitized != name,
        sanitized,
    }
}

/// Folder-name pass: trim, then replace path-forbidden characters with `_`.
///
/// No length, reserved-name or separator handling is applied. The result may be empty.
pub fn sanitize_folder_name(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if FOLDER_FORBIDDEN.contains(&c) { '_' } else { c })
        .collect()
}

/// Split at the last dot. A dot at index 0 (or no dot) yields an empty extension.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

fn substitute_forbidden(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '~' | ':' | '/' | '\\' | '|' => out.push('-'),
            '&' => out.push_str("and"),
            '"' | '#' | '%' | '*' | '<' | '>' | '?' | '{' | '}' => {}
            other => out.push(other),
        }
    }
    out
}

/// Collapse runs of two or more `_`/`-` into a single `_`. Single separators stay as-is.
fn collapse_separator_runs(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut run = String::new();
    for c in input.chars() {
        if c == '_' || c == '-' {
            run.push(c);
            continue;
        }
        flush_run(&mut out, &mut run);
        out.push(c);
    }
    flush_run(&mut out, &mut run);
    out
}

fn flush_run(out: &mut String, run: &mut String) {
    match run.chars().count() {
        0 => {}
        1 => out.push_str(run),
        _ => out.push('_'),
    }
    run.clear();
}

/// Current time in milliseconds, bumped past the previous value when called twice
/// within the same millisecond.
fn next_fallback_stamp() -> i64 {
    let now = Utc::now().timestamp_millis();
    let mut prev = LAST_FALLBACK_STAMP.load(Ordering::Relaxed);
    loop {
        let next = if now > prev { now } else { prev + 1 };
        match LAST_FALLBACK_STAMP.compare_exchange_weak(
            prev,
            next,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return next,
            Err(actual) => prev = actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitize(name: &str) -> SanitizationResult {
        sanitize_filename_with(name, false, || 1_700_000_000_000)
    }

    #[test]
    fn test_spaces_become_underscores() {
        let result = sanitize("My File.PNG");
        assert_eq!(result.sanitized, "My_File.PNG");
        assert!(result.changes_made);
    }

    #[test]
    fn test_preserve_spaces() {
        let result = sanitize_filename_with("My File.png", true, || 0);
        assert_eq!(result.sanitized, "My File.png");
        assert!(!result.changes_made);
    }

    #[test]
    fn test_reserved_device_name() {
        let result = sanitize("CON.txt");
        assert_eq!(result.sanitized, "CON_file.txt");
        assert!(result.changes_made);

        assert_eq!(sanitize("lpt9.jpg").sanitized, "lpt9_file.jpg");
        assert_eq!(sanitize("CONSOLE.jpg").sanitized, "CONSOLE.jpg");
    }

    #[test]
    fn test_long_name_truncated_extension_kept() {
        let name = format!("{}.jpg", "a".repeat(150));
        let result = sanitize(&name);
        assert_eq!(result.name_without_extension().len(), MAX_BASE_LEN);
        assert_eq!(result.extension(), ".jpg");
        assert!(result.sanitized.ends_with(".jpg"));
    }

    #[test]
    fn test_truncation_strips_trailing_separators() {
        let name = format!("{}_b.jpg", "a".repeat(99));
        let result = sanitize(&name);
        assert_eq!(result.sanitized, format!("{}.jpg", "a".repeat(99)));
    }

    #[test]
    fn test_only_separators_falls_back() {
        let result = sanitize("__--__");
        assert_eq!(result.sanitized, "file_1700000000000");
        assert!(result.changes_made);
    }

    #[test]
    fn test_fallback_is_unique_within_process() {
        let first = sanitize_filename("???", false);
        let second = sanitize_filename("???", false);
        assert!(first.sanitized.starts_with("file_"));
        assert_ne!(first.sanitized, second.sanitized);
    }

    #[test]
    fn test_character_substitutions() {
        assert_eq!(sanitize("a&b.jpg").sanitized, "aandb.jpg");
        assert_eq!(sanitize("10:30.jpg").sanitized, "10-30.jpg");
        assert_eq!(sanitize("x~y.jpg").sanitized, "x-y.jpg");
        assert_eq!(sanitize("what?#%.jpg").sanitized, "what.jpg");
        assert_eq!(sanitize("{a}|<b>.jpg").sanitized, "a-b.jpg");
        assert_eq!(sanitize("dir\\file/x.jpg").sanitized, "dir-file-x.jpg");
    }

    #[test]
    fn test_separator_runs_collapse() {
        assert_eq!(sanitize("a__b.jpg").sanitized, "a_b.jpg");
        assert_eq!(sanitize("a-_-b.jpg").sanitized, "a_b.jpg");
        assert_eq!(sanitize("a - b.jpg").sanitized, "a_b.jpg");
        assert_eq!(sanitize("a-b_c.jpg").sanitized, "a-b_c.jpg");
    }

    #[test]
    fn test_edges_trimmed() {
        assert_eq!(sanitize("  photo .jpg").sanitized, "photo.jpg");
        assert_eq!(sanitize("-_photo_-.png").sanitized, "photo.png");
    }

    #[test]
    fn test_leading_dot_is_not_extension() {
        let result = sanitize(".bashrc");
        assert_eq!(result.sanitized, "bashrc");
        assert_eq!(result.extension(), "");
    }

    #[test]
    fn test_no_extension() {
        assert_eq!(sanitize("README").sanitized, "README");
    }

    #[test]
    fn test_extension_kept_verbatim() {
        assert_eq!(sanitize("clip.M P4").sanitized, "clip.M P4");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = [
            "My File.PNG",
            "CON.txt",
            "Report #1.jpg",
            "a - b & c.jpeg",
            "  spaced out  .mov",
            "already_safe-name.webp",
            ".hidden",
        ];
        for input in inputs {
            let once = sanitize(input);
            let twice = sanitize(&once.sanitized);
            assert_eq!(once.sanitized, twice.sanitized, "input: {input}");
            assert!(!twice.changes_made, "input: {input}");
        }
        let long = format!("{}.jpg", "x y".repeat(60));
        let once = sanitize(&long);
        assert_eq!(sanitize(&once.sanitized).sanitized, once.sanitized);
    }

    #[test]
    fn test_colliding_names() {
        let a = sanitize("Report #1.jpg");
        let b = sanitize("Report 1.jpg");
        assert_eq!(a.sanitized, "Report_1.jpg");
        assert_eq!(a.sanitized.to_lowercase(), b.sanitized.to_lowercase());
    }

    #[test]
    fn test_sanitize_folder_name() {
        assert_eq!(sanitize_folder_name("Case/2024:01"), "Case_2024_01");
        assert_eq!(sanitize_folder_name("  CASE-42  "), "CASE-42");
        assert_eq!(sanitize_folder_name("a<b>c\"d|e?f*g\\h"), "a_b_c_d_e_f_g_h");
        assert_eq!(sanitize_folder_name("   "), "");
    }
}
