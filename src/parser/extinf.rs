//! `#EXTINF` metadata line tokenizing.
//!
//! A metadata line looks like
//! `#EXTINF:-1 tvg-id="canal" group-title="News, Info",Canal+`: a duration,
//! any number of `key="value"` attributes and an optional display name after
//! the first comma that is not inside double quotes.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::Attributes;

/// Marker opening a metadata line, compared case-insensitively.
pub const EXTINF_PREFIX: &str = "#EXTINF:";

/// Attributes and display name carried by one metadata line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtInfMetadata {
    pub attributes: Attributes,
    pub display_name: Option<String>,
}

fn attribute_regex() -> &'static Regex {
    static ATTRIBUTE_REGEX: OnceLock<Regex> = OnceLock::new();
    ATTRIBUTE_REGEX.get_or_init(|| {
        Regex::new(r#"(?P<key>[A-Za-z0-9._:-]+)\s*=\s*"(?P<value>[^"]*)""#)
            .expect("attribute pattern is valid")
    })
}

/// Whether a trimmed line opens a metadata block.
pub fn is_metadata_line(line: &str) -> bool {
    line.get(..EXTINF_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(EXTINF_PREFIX))
}

/// Parse a trimmed `#EXTINF:` line. Never fails: unparseable content yields
/// empty attributes.
pub fn parse_extinf_line(line: &str) -> ExtInfMetadata {
    let content = line.get(EXTINF_PREFIX.len()..).unwrap_or_default();
    let (attribute_section, display_name) = split_extinf_content(content);

    ExtInfMetadata {
        attributes: parse_attributes(attribute_section),
        display_name: display_name.map(str::to_string),
    }
}

/// Split on the first comma outside a double-quoted span.
///
/// Returns the attribute section and the trimmed display name, if any.
pub fn split_extinf_content(content: &str) -> (&str, Option<&str>) {
    let mut in_quotes = false;

    for (index, ch) in content.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                return (&content[..index], Some(content[index + 1..].trim()));
            }
            _ => {}
        }
    }

    (content, None)
}

/// Extract every `key="value"` pair, left to right. Later duplicates overwrite.
pub fn parse_attributes(section: &str) -> Attributes {
    let mut attributes = Attributes::new();

    for captures in attribute_regex().captures_iter(section) {
        let (Some(key), Some(value)) = (captures.name("key"), captures.name("value")) else {
            continue;
        };
        attributes.insert(key.as_str(), value.as_str());
    }

    attributes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_marker_is_case_insensitive() {
        assert!(is_metadata_line("#EXTINF:-1,News"));
        assert!(is_metadata_line("#extinf:-1,News"));
        assert!(!is_metadata_line("#EXTM3U"));
        assert!(!is_metadata_line("#EXTINF"));
        assert!(!is_metadata_line("#EXTVLCOPT:http-user-agent=x"));
    }

    #[test]
    fn test_split_ignores_quoted_commas() {
        let (attributes, name) = split_extinf_content(r#"-1 group-title="News, Info",  Canal+ "#);
        assert_eq!(attributes, r#"-1 group-title="News, Info""#);
        assert_eq!(name, Some("Canal+"));
    }

    #[test]
    fn test_split_without_unquoted_comma_has_no_name() {
        let (attributes, name) = split_extinf_content(r#"-1 tvg-name="A, B""#);
        assert_eq!(attributes, r#"-1 tvg-name="A, B""#);
        assert_eq!(name, None);
    }

    #[test]
    fn test_split_keeps_commas_in_display_name() {
        let (_, name) = split_extinf_content("-1,News, Sport and Weather");
        assert_eq!(name, Some("News, Sport and Weather"));
    }

    #[test]
    fn test_parse_attributes_extracts_quoted_pairs() {
        let attributes = parse_attributes(
            r#"-1 tvg-id="canal" tvg-logo="https://logo.test/a.png" x.custom_key:1 = "value" bare=unquoted"#,
        );

        assert_eq!(attributes.len(), 3);
        assert_eq!(attributes.get("tvg-id"), Some("canal"));
        assert_eq!(attributes.get("tvg-logo"), Some("https://logo.test/a.png"));
        assert_eq!(attributes.get("x.custom_key:1"), Some("value"));
        assert_eq!(attributes.get("bare"), None);
    }

    #[test]
    fn test_parse_attributes_allows_empty_values() {
        let attributes = parse_attributes(r#"tvg-id="""#);
        assert_eq!(attributes.get("tvg-id"), Some(""));
    }

    #[test]
    fn test_parse_attributes_last_duplicate_wins() {
        let attributes = parse_attributes(r#"Group-Title="News" group-title="Sport""#);
        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes.get("GROUP-TITLE"), Some("Sport"));
    }

    #[test]
    fn test_parse_extinf_line() {
        let metadata =
            parse_extinf_line(r#"#EXTINF:-1 tvg-id="canal" tvg-country="fr",FR | Canal+"#);

        assert_eq!(metadata.attributes.get("tvg-id"), Some("canal"));
        assert_eq!(metadata.attributes.get("tvg-country"), Some("fr"));
        assert_eq!(metadata.display_name.as_deref(), Some("FR | Canal+"));
    }

    #[test]
    fn test_parse_extinf_line_without_attributes() {
        let metadata = parse_extinf_line("#EXTINF:-1 ,[FR] Film Club");

        assert!(metadata.attributes.is_empty());
        assert_eq!(metadata.display_name.as_deref(), Some("[FR] Film Club"));
    }
}
