//! Heuristics for pulling a payload out of a raw completion.
//!
//! Completions usually wrap their answer in a fenced block. These helpers only search for fence
//! markers and brackets; they never parse the payload. Whenever no boundary can be found the raw
//! completion is returned untouched.

const FENCE: &str = "```";
const TEXT_FENCE: &str = "```text";
const JSON_FENCE: &str = "```json";

/// Extract the body of a ```` ```text ```` (or bare) fenced block.
pub fn extract_text(raw: &str) -> &str {
    extract_fenced(raw, TEXT_FENCE).unwrap_or(raw)
}

/// Extract a JSON document from a ```` ```json ```` (or bare) fenced block, or by bracket scan.
pub fn extract_json(raw: &str) -> &str {
    extract_fenced(raw, JSON_FENCE).unwrap_or_else(|| scan_json(raw))
}

/// `None` when no opening fence exists at all.
///
/// The tagged fence is preferred over a bare one. The closing boundary is the last bare fence in
/// `raw`, so nested fences are swallowed into the result.
fn extract_fenced<'a>(raw: &'a str, tagged: &str) -> Option<&'a str> {
    let (start, marker_len) = [tagged, FENCE].iter().find_map(|marker| raw.find(marker).map(|index| (index, marker.len())))?;

    let body_start = start + marker_len;
    match raw.rfind(FENCE) {
        Some(end) if end >= body_start => Some(raw[body_start..end].trim()),
        _ => Some(raw),
    }
}

/// Slice from the first opening bracket to the last matching closing character.
///
/// The opening bracket kind comes from the first line that starts with `{` or `[`; if no line
/// does, the first bracket anywhere is used. The end is the last occurrence of the closing
/// character, not a depth-matched one.
fn scan_json(raw: &str) -> &str {
    let open = raw
        .lines()
        .find_map(|line| line.chars().next().filter(|c| matches!(c, '{' | '[')))
        .or_else(|| raw.chars().find(|c| matches!(c, '{' | '[')));

    let Some(open) = open else {
        return raw;
    };
    let close = if open == '{' { '}' } else { ']' };

    match (raw.find(open), raw.rfind(close)) {
        (Some(start), Some(end)) if end > start => &raw[start..=end],
        _ => raw,
    }
}
