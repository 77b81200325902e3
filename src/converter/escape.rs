// file: src/converter/escape.rs
// description: html escaping and entity decoding helpers shared by both renderers
// reference: https://html.spec.whatwg.org/multipage/named-characters.html

use super::patterns::HTML_ENTITY;
use regex::Captures;

/// Escapes text placed between tags.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Finishes an attribute value taken from text that already went through
/// [`escape_text`]; only the quote is left to escape.
pub fn quote_attribute(escaped: &str) -> String {
    escaped.replace('"', "&quot;")
}

/// Decodes named and numeric character references in one pass, so a decoded
/// `&` never starts a second reference (`&amp;lt;` stays `&lt;`). Unknown
/// names and invalid code points are left as written.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    HTML_ENTITY
        .replace_all(text, |caps: &Captures| {
            decode_reference(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_reference(reference: &str) -> Option<String> {
    if let Some(numeric) = reference.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }

    let decoded = match reference {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        _ => return None,
    };
    Some(decoded.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(escape_text("**not bold**"), "**not bold**");
    }

    #[test]
    fn test_quote_attribute() {
        assert_eq!(
            quote_attribute(&escape_text(r#"a?x=1&y="2""#)),
            "a?x=1&amp;y=&quot;2&quot;"
        );
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &lt;b&gt; &amp; c"), "a <b> & c");
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
        assert_eq!(decode_entities("plain"), "plain");
    }

    #[test]
    fn test_decode_numeric_references() {
        assert_eq!(decode_entities("&#12354;&#x3044;&#X41;"), "あいA");
        assert_eq!(decode_entities("it&#39;s"), "it's");
        assert_eq!(decode_entities("&amp;#39;"), "&#39;");
    }

    #[test]
    fn test_unknown_references_stay_literal() {
        assert_eq!(decode_entities("&copy; &#xD800; & alone"), "&copy; &#xD800; & alone");
    }
}
