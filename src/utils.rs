/// Converts a `PascalCase` component name to kebab-case
///
/// A hyphen is inserted before every uppercase ASCII letter that is not the
/// first character, then the whole string is lowercased:
/// - `"Widget"` -> "widget"
/// - `"BookEdition"` -> "book-edition"
/// - `"DNSRecord"` -> "d-n-s-record"
#[must_use]
pub fn pascal_to_kebab_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    for (i, ch) in s.chars().enumerate() {
        if i > 0 && ch.is_ascii_uppercase() {
            result.push('-');
        }
        for lower in ch.to_lowercase() {
            result.push(lower);
        }
    }
    result
}

/// Strips the braces from a `{placeholder}` path segment.
///
/// Returns `None` when the segment is not wrapped.
#[must_use]
pub fn placeholder_name(segment: &str) -> Option<&str> {
    segment
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
}

/// Capitalizes the first letter of a string
#[must_use]
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_to_kebab_case() {
        assert_eq!(pascal_to_kebab_case("Widget"), "widget");
        assert_eq!(pascal_to_kebab_case("BookEdition"), "book-edition");
        assert_eq!(pascal_to_kebab_case("widget"), "widget");
        assert_eq!(pascal_to_kebab_case("DNSRecord"), "d-n-s-record");
        assert_eq!(pascal_to_kebab_case("A"), "a");
        assert_eq!(pascal_to_kebab_case(""), "");
    }

    #[test]
    fn test_placeholder_name() {
        assert_eq!(placeholder_name("{project}"), Some("project"));
        assert_eq!(placeholder_name("projects"), None);
        assert_eq!(placeholder_name("{open"), None);
        assert_eq!(placeholder_name("{}"), Some(""));
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("post"), "Post");
        assert_eq!(capitalize_first(""), "");
    }
}
