//! Text helpers for markup that arrives as opaque strings.
//!
//! Nothing here parses HTML into a tree. Every helper is a small, lenient
//! string transform that tolerates the kind of markup a CMS actually produces:
//! unbalanced tags, stray `<` in prose, shortcodes, half-escaped entities.
//!
//! ## Stripping
//!
//! - [`strip_tags`]: drops `<...>` tags and `<!-- -->` comments, keeps text.
//! - [`strip_shortcodes`]: drops `[name ...]` markers and enclosed content.
//!
//! ## Escaping
//!
//! Two output contexts exist for a meta tag value:
//!
//! - **Attribute**: [`escape_attr`] escapes `< > " '` and any `&` that does not
//!   already start a valid entity, so scraped values that were escaped once by
//!   the theme are not escaped twice.
//! - **URL**: [`escape_url`] cleans and percent-encodes, rejects non-http(s)
//!   schemes, then applies attribute escaping.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

// =============================================================================
// Stripping
// =============================================================================

/// Remove markup tags and comments, keeping the text between them.
///
/// A `<` only opens a tag when followed by a letter, `/`, `!` or `?`, so
/// prose like `a < b` survives. An unterminated tag swallows the rest of the
/// input, matching how browsers treat it.
pub fn strip_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(pos) = rest.find('<') {
        let (before, tail) = rest.split_at(pos);
        result.push_str(before);

        if tail.starts_with("<!--") {
            rest = match tail[4..].find("-->") {
                Some(end) => &tail[4 + end + 3..],
                None => "",
            };
            continue;
        }

        let opens_tag = tail[1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'));
        if !opens_tag {
            result.push('<');
            rest = &tail[1..];
            continue;
        }

        rest = match tail.find('>') {
            Some(end) => &tail[end + 1..],
            None => "",
        };
    }

    result.push_str(rest);
    result
}

/// Matches one shortcode marker.
///
/// Groups: 1 escape open `[`, 2 closing `/`, 3 name, 4 attributes,
/// 5 self-closing `/`, 6 escape close `]`.
static SHORTCODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(\[?)(/?)([A-Za-z][A-Za-z0-9_-]*)((?:\s[^\]]*?)?)(/?)\](\]?)").unwrap()
});

/// Remove shortcode markers from post content.
///
/// - `[name attrs]...[/name]` is removed together with the enclosed content.
/// - Lone `[name attrs]`, `[name/]` and `[/name]` markers are removed.
/// - `[[name]]` is an escape and becomes the literal text `[name]`.
pub fn strip_shortcodes(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(caps) = SHORTCODE.captures(rest) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        out.push_str(&rest[..whole.start]);

        let escape_open = !caps[1].is_empty();
        let escape_close = !caps[6].is_empty();
        let after = &rest[whole.end..];

        if escape_open && escape_close {
            out.push_str(&rest[whole.start + 1..whole.end - 1]);
            rest = after;
            continue;
        }
        if escape_open {
            out.push('[');
        }

        let closing = !caps[2].is_empty();
        let self_closing = !caps[5].is_empty();
        rest = if closing || self_closing {
            after
        } else {
            let close = format!("[/{}]", &caps[3]);
            match after.find(&close) {
                Some(end) => &after[end + close.len()..],
                None => after,
            }
        };

        if escape_close {
            out.push(']');
        }
    }

    out.push_str(rest);
    out
}

// =============================================================================
// Entities
// =============================================================================

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "lt" => '<',
        "gt" => '>',
        "amp" => '&',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{00A0}',
        "hellip" => '\u{2026}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "copy" => '\u{00A9}',
        "reg" => '\u{00AE}',
        "trade" => '\u{2122}',
        _ => return None,
    };
    Some(c)
}

fn numeric_entity(body: &str) -> Option<char> {
    let code = match body.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => body.parse().ok()?,
    };
    char::from_u32(code)
}

/// Decode named and numeric character references.
///
/// Unknown or malformed references are left untouched.
pub fn decode_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find('&') {
        result.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        let decoded = tail[1..].find(';').filter(|&end| end <= 10).and_then(|end| {
            let body = &tail[1..1 + end];
            let c = match body.strip_prefix('#') {
                Some(num) => numeric_entity(num),
                None => named_entity(body),
            };
            c.map(|c| (c, end + 2))
        });

        match decoded {
            Some((c, consumed)) => {
                result.push(c);
                rest = &tail[consumed..];
            }
            None => {
                result.push('&');
                rest = &tail[1..];
            }
        }
    }

    result.push_str(rest);
    Cow::Owned(result)
}

static ENTITY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^&(?:[A-Za-z][A-Za-z0-9]{1,31}|#[0-9]{1,7}|#[xX][0-9A-Fa-f]{1,6});").unwrap()
});

// =============================================================================
// Escaping
// =============================================================================

/// Escape a value for use inside a double- or single-quoted attribute.
///
/// Existing entities such as `&amp;` or `&#8217;` are kept as they are.
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    if !s.contains(['<', '>', '&', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 8);
    for (i, c) in s.char_indices() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            '&' if ENTITY_PREFIX.is_match(&s[i..]) => result.push('&'),
            '&' => result.push_str("&amp;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Bytes that may not appear raw in an emitted URL.
const URL_UNSAFE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'}');

const ALLOWED_SCHEMES: [&str; 2] = ["http", "https"];

/// Return the scheme of `url` if it has one (`scheme:` before any `/?#`).
fn scheme_of(url: &str) -> Option<&str> {
    let colon = url.find(':')?;
    let candidate = &url[..colon];
    if candidate.contains(['/', '?', '#']) {
        return None;
    }
    let mut chars = candidate.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(candidate)
}

/// Clean and escape a URL for an attribute value.
///
/// Returns an empty string for blank input and for schemes other than
/// http/https (e.g. `javascript:`). A value with no scheme that is not
/// path-, query- or fragment-relative gets `http://` prepended.
pub fn escape_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return String::new();
    }

    let cleaned = url
        .replace(['\r', '\n', '\t'], "")
        .replace("%0d", "")
        .replace("%0D", "")
        .replace("%0a", "")
        .replace("%0A", "");
    let encoded = utf8_percent_encode(&cleaned, URL_UNSAFE).to_string();

    let absolute = match scheme_of(&encoded) {
        Some(scheme) if ALLOWED_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()) => encoded,
        Some(_) => return String::new(),
        None if encoded.starts_with(['/', '#', '?']) => encoded,
        None => format!("http://{encoded}"),
    };

    escape_attr(&absolute).into_owned()
}

// =============================================================================
// Whitespace and length
// =============================================================================

/// Replace each CRLF pair with a single space.
pub fn collapse_crlf(s: &str) -> Cow<'_, str> {
    if s.contains("\r\n") {
        Cow::Owned(s.replace("\r\n", " "))
    } else {
        Cow::Borrowed(s)
    }
}

/// First `max` characters of `s` (characters, not bytes; no word boundary).
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((byte_end, _)) => &s[..byte_end],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // strip_tags() tests
    // =========================================================================

    #[test]
    fn strip_tags_removes_elements_keeps_text() {
        assert_eq!(strip_tags("<p>Hello <b>world</b></p>"), "Hello world");
    }

    #[test]
    fn strip_tags_removes_comments() {
        assert_eq!(strip_tags("a<!-- hidden <b> -->b"), "ab");
    }

    #[test]
    fn strip_tags_keeps_prose_less_than() {
        assert_eq!(strip_tags("1 < 2 and <em>3</em>"), "1 < 2 and 3");
    }

    #[test]
    fn strip_tags_unterminated_tag_drops_tail() {
        assert_eq!(strip_tags("text <img src=\"x"), "text ");
    }

    #[test]
    fn strip_tags_self_closing_and_attributes() {
        assert_eq!(
            strip_tags(r#"Line<br/>next <a href="/x" title='t'>link</a>"#),
            "Linenext link"
        );
    }

    // =========================================================================
    // strip_shortcodes() tests
    // =========================================================================

    #[test]
    fn strip_shortcodes_removes_enclosing_pair_and_content() {
        assert_eq!(
            strip_shortcodes("Before [caption id=\"1\"]<img src=\"a.png\"> A cat[/caption] after"),
            "Before  after"
        );
    }

    #[test]
    fn strip_shortcodes_removes_self_closing() {
        assert_eq!(strip_shortcodes("A [gallery ids=\"1,2\"/] B"), "A  B");
        assert_eq!(strip_shortcodes("A [gallery] B"), "A  B");
    }

    #[test]
    fn strip_shortcodes_removes_lone_closing_marker() {
        assert_eq!(strip_shortcodes("text[/column] more"), "text more");
    }

    #[test]
    fn strip_shortcodes_unwraps_escaped() {
        assert_eq!(strip_shortcodes("Use [[gallery]] here"), "Use [gallery] here");
    }

    #[test]
    fn strip_shortcodes_leaves_non_shortcode_brackets() {
        assert_eq!(strip_shortcodes("see [1] and [ ]"), "see [1] and [ ]");
    }

    #[test]
    fn strip_shortcodes_no_markers_is_identity() {
        assert_eq!(strip_shortcodes("plain text"), "plain text");
    }

    // =========================================================================
    // decode_entities() tests
    // =========================================================================

    #[test]
    fn decode_named_entities() {
        assert_eq!(decode_entities("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(decode_entities("&lt;b&gt;"), "<b>");
        assert_eq!(decode_entities("Wait&hellip;"), "Wait\u{2026}");
    }

    #[test]
    fn decode_numeric_entities() {
        assert_eq!(decode_entities("It&#8217;s"), "It\u{2019}s");
        assert_eq!(decode_entities("&#x41;&#X42;"), "AB");
    }

    #[test]
    fn decode_leaves_unknown_references() {
        assert_eq!(decode_entities("a &bogus; b & c"), "a &bogus; b & c");
    }

    #[test]
    fn decode_without_ampersand_borrows() {
        assert!(matches!(decode_entities("plain"), Cow::Borrowed("plain")));
    }

    // =========================================================================
    // escape_attr() tests
    // =========================================================================

    #[test]
    fn escape_attr_special_characters() {
        assert_eq!(
            escape_attr(r#"<"quoted" & 'single'>"#),
            "&lt;&quot;quoted&quot; &amp; &#39;single&#39;&gt;"
        );
    }

    #[test]
    fn escape_attr_does_not_double_encode() {
        assert_eq!(escape_attr("Tom &amp; Jerry &#8217; &x"), "Tom &amp; Jerry &#8217; &amp;x");
    }

    #[test]
    fn escape_attr_plain_borrows() {
        assert!(matches!(escape_attr("Acme Blog"), Cow::Borrowed("Acme Blog")));
    }

    // =========================================================================
    // escape_url() tests
    // =========================================================================

    #[test]
    fn escape_url_passes_simple_url() {
        assert_eq!(escape_url("http://example.com/a.png"), "http://example.com/a.png");
    }

    #[test]
    fn escape_url_encodes_spaces_and_quotes() {
        assert_eq!(
            escape_url("http://example.com/my image\".png"),
            "http://example.com/my%20image%22.png"
        );
    }

    #[test]
    fn escape_url_escapes_ampersand_for_attribute() {
        assert_eq!(
            escape_url("https://example.com/?a=1&b=2"),
            "https://example.com/?a=1&amp;b=2"
        );
    }

    #[test]
    fn escape_url_rejects_script_scheme() {
        assert_eq!(escape_url("javascript:alert(1)"), "");
    }

    #[test]
    fn escape_url_prefixes_bare_host() {
        assert_eq!(escape_url("example.com/page"), "http://example.com/page");
    }

    #[test]
    fn escape_url_keeps_relative_paths() {
        assert_eq!(escape_url("/images/a.png"), "/images/a.png");
    }

    #[test]
    fn escape_url_strips_line_breaks() {
        assert_eq!(escape_url(" http://exa\r\nmple.com/%0d%0A "), "http://example.com/");
    }

    #[test]
    fn escape_url_blank_is_empty() {
        assert_eq!(escape_url("   "), "");
    }

    // =========================================================================
    // collapse_crlf() / truncate_chars() tests
    // =========================================================================

    #[test]
    fn collapse_crlf_replaces_pairs_only() {
        assert_eq!(collapse_crlf("a\r\nb\nc\rd"), "a b\nc\rd");
    }

    #[test]
    fn truncate_chars_counts_characters() {
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
        assert_eq!(truncate_chars("short", 160), "short");
    }

    #[test]
    fn truncate_chars_cuts_mid_word() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
    }
}
