//! MIME header handling.

use std::fmt;

/// Ordered collection of MIME headers.
///
/// Names keep the casing they were inserted with and are matched
/// case-insensitively. Each name appears at most once; setting an existing
/// name replaces its value in place, keeping the original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a header value, replacing any existing value for the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx].1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder-style variant of [`Headers::set`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Gets the value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|idx| self.entries[idx].1.as_str())
    }

    /// Removes a header, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|idx| self.entries.remove(idx).1)
    }

    /// Merges `other` into `self`. Values from `other` override.
    pub fn merge(&mut self, other: Self) {
        for (name, value) in other.entries {
            self.set(name, value);
        }
    }

    /// Returns true if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over all headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// Parses a header block followed by a body.
    ///
    /// The text is in the format:
    /// ```text
    /// Header-Name: value
    ///  continuation
    ///
    /// body...
    /// ```
    ///
    /// Headers end at the first empty line, or at the first line that is
    /// neither a header nor a continuation. Everything after that is the body,
    /// returned verbatim.
    #[must_use]
    pub fn parse(text: &str) -> (Self, String) {
        let mut headers = Self::new();
        let mut current: Option<(String, String)> = None;
        let mut rest = text;

        loop {
            let (line, remainder) = match rest.split_once('\n') {
                Some((line, remainder)) => (line, Some(remainder)),
                None => (rest, None),
            };
            let line = line.strip_suffix('\r').unwrap_or(line);

            if line.is_empty() {
                rest = remainder.unwrap_or("");
                break;
            }

            if line.starts_with(' ') || line.starts_with('\t') {
                if let Some((_, value)) = current.as_mut() {
                    value.push(' ');
                    value.push_str(line.trim());
                }
            } else if let Some((name, value)) = line.split_once(':') {
                if let Some((name, value)) = current.take() {
                    headers.set(name, value);
                }
                current = Some((name.trim().to_string(), value.trim().to_string()));
            } else {
                // Not a header; the body starts here.
                break;
            }

            match remainder {
                Some(remainder) => rest = remainder,
                None => {
                    rest = "";
                    break;
                }
            }
        }

        if let Some((name, value)) = current {
            headers.set(name, value);
        }

        (headers, rest.to_string())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.set(name, value);
        }
        headers
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.entries {
            writeln!(f, "{name}: {value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect
)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_new() {
        let headers = Headers::new();
        assert!(headers.is_empty());
    }

    #[test]
    fn test_headers_set_get() {
        let mut headers = Headers::new();
        headers.set("Content-Type", "text/plain");
        assert_eq!(headers.get("Content-Type"), Some("text/plain"));
        assert_eq!(headers.get("content-type"), Some("text/plain")); // Case insensitive
    }

    #[test]
    fn test_headers_set_replaces_in_place() {
        let mut headers = Headers::new();
        headers.set("X-First", "1");
        headers.set("X-Second", "2");
        headers.set("x-first", "3");

        let names: Vec<_> = headers.iter().collect();
        assert_eq!(names, vec![("X-First", "3"), ("X-Second", "2")]);
    }

    #[test]
    fn test_headers_remove() {
        let mut headers = Headers::new().with("Subject", "Test");
        assert_eq!(headers.remove("subject"), Some("Test".to_string()));
        assert!(headers.get("Subject").is_none());
        assert_eq!(headers.remove("Subject"), None);
    }

    #[test]
    fn test_headers_merge_overrides() {
        let mut base = Headers::new().with("A", "1").with("B", "2");
        base.merge(Headers::new().with("b", "20").with("C", "3"));
        assert_eq!(base.to_string(), "A: 1\nB: 20\nC: 3\n");
    }

    #[test]
    fn test_headers_parse() {
        let text = concat!(
            "Content-Type: text/cloud-config;\n",
            " charset=utf-8\n",
            "MIME-Version: 1.0\n",
            "X-Custom: yes\n",
            "\n",
            "packages:\n",
            "- jq\n"
        );

        let (headers, body) = Headers::parse(text);
        assert_eq!(
            headers.get("Content-Type"),
            Some("text/cloud-config; charset=utf-8")
        );
        assert_eq!(headers.get("MIME-Version"), Some("1.0"));
        assert_eq!(headers.get("X-Custom"), Some("yes"));
        assert_eq!(body, "packages:\n- jq\n");
    }

    #[test]
    fn test_headers_parse_crlf() {
        let (headers, body) = Headers::parse("Content-Type: text/x-include-url\r\n\r\nhttp://a\r\n");
        assert_eq!(headers.get("content-type"), Some("text/x-include-url"));
        assert_eq!(body, "http://a\r\n");
    }

    #[test]
    fn test_headers_parse_no_body() {
        let (headers, body) = Headers::parse("Content-Type: text/cloud-config");
        assert_eq!(headers.iter().count(), 1);
        assert_eq!(body, "");
    }

    #[test]
    fn test_headers_parse_stops_at_non_header() {
        let (headers, body) = Headers::parse("MIME-Version: 1.0\nnot a header\nmore\n");
        assert_eq!(headers.iter().count(), 1);
        assert_eq!(body, "not a header\nmore\n");
    }

    #[test]
    fn test_headers_display_keeps_order() {
        let headers: Headers = [("Zeta", "z"), ("Alpha", "a")].into_iter().collect();
        assert_eq!(headers.to_string(), "Zeta: z\nAlpha: a\n");
    }
}
