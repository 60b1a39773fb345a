/// Token visitors type to start a quote
pub const QUOTE_TOKEN: &str = r#"""""#;

/// Escape a comment body so it can be embedded as literal text.
///
/// Every `"""` becomes a bare `>` (the blockquote marker); everything else
/// is HTML-escaped. Splitting on the token instead of swapping in a
/// placeholder means nothing the visitor writes can turn into a marker.
pub fn process_body(body: &str) -> String {
    body.split(QUOTE_TOKEN)
        .map(|piece| html_escape::encode_quoted_attribute(piece))
        .collect::<Vec<_>>()
        .join(">")
}
