/// Path markers that precede a post shortcode.
const POST_MARKERS: &[&str] = &["/p/", "/reel/"];

/// Derive the post shortcode from a post URL.
///
/// `https://instagram.com/p/ABC123/` and `https://instagram.com/reel/XYZ_9/?x=1`
/// yield `ABC123` and `XYZ_9`. Anything without a post marker, including a bare
/// shortcode, is returned unchanged.
pub fn shortcode_from_url(url_or_shortcode: &str) -> String {
    if !url_or_shortcode.contains("http") {
        return url_or_shortcode.to_string();
    }

    POST_MARKERS
        .iter()
        .filter_map(|marker| {
            let start = url_or_shortcode.find(marker)? + marker.len();
            Some((start, &url_or_shortcode[start..]))
        })
        .min_by_key(|(start, _)| *start)
        .map(|(_, rest)| {
            rest.split(['/', '?', '#'])
                .next()
                .unwrap_or_default()
                .to_string()
        })
        .filter(|shortcode| !shortcode.is_empty())
        .unwrap_or_else(|| url_or_shortcode.to_string())
}

/// Whether `input` looks like a bare shortcode rather than a URL.
pub fn is_bare_shortcode(input: &str) -> bool {
    !input.is_empty()
        && input
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
