//! Markup escaping for user-supplied text.

use std::borrow::Cow;

/// Escapes `& < > " '` so the result is inert inside element content and
/// quoted attribute values.
pub fn escape_html(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(raw);
    }

    let mut escaped = String::with_capacity(raw.len() + 16);
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::escape_html;
    use std::borrow::Cow;

    #[test]
    fn escapes_script_tag() {
        let escaped = escape_html("<script>alert('x') && \"y\"</script>");
        assert_eq!(
            escaped,
            "&lt;script&gt;alert(&#39;x&#39;) &amp;&amp; &quot;y&quot;&lt;/script&gt;"
        );
        assert!(!escaped.contains(['<', '>', '"', '\'']));
    }

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(escape_html("散歩 30分"), Cow::Borrowed("散歩 30分")));
    }

    #[test]
    fn existing_entities_are_escaped_again() {
        assert_eq!(escape_html("&lt;"), "&amp;lt;");
    }
}
