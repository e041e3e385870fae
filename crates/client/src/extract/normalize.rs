//! OCR output normalization.
//!
//! Tesseract output carries form feeds between pages, CRLF line endings on
//! some builds and long runs of blank lines. Cached and logged text uses a
//! single consistent shape.

/// Normalize raw engine output.
///
/// - CRLF and CR become LF, form feeds are dropped
/// - Trailing whitespace is removed from every line
/// - Runs of blank lines collapse to a single blank line
/// - Leading and trailing blank lines are removed
pub fn normalize_text(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n").replace('\u{000C}', "");

    let mut out = String::with_capacity(unified.len());
    let mut blank_run = 0usize;

    for line in unified.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
            if blank_run > 0 {
                out.push('\n');
            }
        }
        blank_run = 0;
        out.push_str(line);
    }

    out
}
