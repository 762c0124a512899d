// src/parser/sanitize.rs
//! Cleanup of raw model replies before JSON decoding.

/// Strip the non-JSON wrapping a model reply may carry.
///
/// Trims whitespace, removes a leading ```` ```json ```` (or bare ```` ``` ````)
/// fence and a trailing fence, then slices from the first `{` to the last
/// `}` inclusive. When no brace pair exists the text is passed through
/// unchanged so the decoder produces a proper error instead of this
/// function inventing an empty result.
pub fn sanitize_reply(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        text = rest.trim_start();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}
