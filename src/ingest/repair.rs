// src/ingest/repair.rs
//! Textual repair applied to every feed body before XML parsing.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches what may legally follow a `&`: a named entity, a decimal or a
/// hex character reference, each terminated by `;`.
static RE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:([A-Za-z0-9]+)|#[0-9]{1,6}|#[xX][0-9A-Fa-f]{1,6});").expect("reference regex")
});

const XML_PREDEFINED: [&str; 5] = ["amp", "lt", "gt", "quot", "apos"];

/// Escape bare ampersands and resolve HTML-only named entities.
///
/// * `&` not starting a reference becomes `&amp;`.
/// * XML's five predefined entities and numeric references are kept as-is.
/// * Other named entities known to HTML (`&nbsp;`, `&rsquo;`, ...) are
///   replaced by their character; unknown names are escaped.
pub fn repair_ampersands(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 16);
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        match RE_REFERENCE.captures(after) {
            Some(caps) => {
                let whole = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
                match caps.get(1) {
                    Some(name) => out.push_str(&resolve_named(name.as_str())),
                    None => {
                        out.push('&');
                        out.push_str(whole);
                    }
                }
                rest = &after[whole.len()..];
            }
            None => {
                out.push_str("&amp;");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn resolve_named(name: &str) -> String {
    if XML_PREDEFINED.contains(&name) {
        return format!("&{name};");
    }
    let reference = format!("&{name};");
    let decoded = html_escape::decode_html_entities(&reference);
    if decoded == reference {
        format!("&amp;{name};")
    } else {
        html_escape::encode_text(&decoded).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_ampersand_is_escaped() {
        assert_eq!(repair_ampersands("Q&A"), "Q&amp;A");
        assert_eq!(repair_ampersands("a & b &"), "a &amp; b &amp;");
        assert_eq!(
            repair_ampersands("?q=autism&hl=en"),
            "?q=autism&amp;hl=en"
        );
    }

    #[test]
    fn valid_references_survive() {
        let s = "&amp; &lt;b&gt; &quot;x&quot; &apos; &#38; &#x26; &#X2F;";
        assert_eq!(repair_ampersands(s), s);
    }

    #[test]
    fn html_entities_are_resolved_and_unknown_ones_escaped() {
        assert_eq!(repair_ampersands("a&nbsp;b"), "a\u{a0}b");
        assert_eq!(repair_ampersands("it&rsquo;s"), "it\u{2019}s");
        assert_eq!(repair_ampersands("&bogusname;"), "&amp;bogusname;");
    }

    #[test]
    fn too_long_numeric_reference_is_treated_as_bare() {
        assert_eq!(repair_ampersands("&#1234567;"), "&amp;#1234567;");
    }
}
