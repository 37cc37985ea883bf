/// Decodes the handful of HTML entities scraped catalogs leave in titles.
pub fn unescape_html(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        let decoded = tail.find(';').and_then(|end| {
            let entity = &tail[1..end];
            decode_entity(entity).map(|c| (c, end + 1))
        });

        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Shortens long signed stream URLs for log lines.
pub fn log_preview(url: &str) -> String {
    const MAX: usize = 80;
    match url.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &url[..cut]),
        None => url.to_string(),
    }
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" | "#39" => Some('\''),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = entity.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_entities() {
        assert_eq!(unescape_html("Rock &amp; Roll"), "Rock & Roll");
        assert_eq!(unescape_html("&quot;Tum Hi Ho&quot;"), "\"Tum Hi Ho\"");
    }

    #[test]
    fn test_numeric_entities() {
        assert_eq!(unescape_html("Don&#39;t"), "Don't");
        assert_eq!(unescape_html("caf&#xE9;"), "café");
    }

    #[test]
    fn test_log_preview() {
        assert_eq!(log_preview("https://a.b/c"), "https://a.b/c");
        let long = format!("https://example.com/{}", "x".repeat(200));
        let preview = log_preview(&long);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 83);
    }

    #[test]
    fn test_unknown_entities_pass_through() {
        assert_eq!(unescape_html("A & B"), "A & B");
        assert_eq!(unescape_html("&bogus;"), "&bogus;");
        assert_eq!(unescape_html("plain"), "plain");
    }
}
