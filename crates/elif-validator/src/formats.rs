//! Format checkers used as leaf predicates on text chains

use crate::error::{Result, ValidatorError};
use crate::rules::Predicate;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Characters allowed in unquoted email words and domain atoms
const EMAIL_VALID_CHARS: &str = r#"[^\s\x00-\x1F()<>@,;:'\\".\[\]\x7F]"#;

/// Characters allowed in URL host labels
const URL_VALID_CHARS: &str = r"[^\s;/@&=,.?:+$]";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)@(.+)$").expect("valid regex"));

static EMAIL_USER_RE: LazyLock<Regex> = LazyLock::new(|| {
    let word = format!(r#"(?:(?:{}|')+|"[^"]*")"#, EMAIL_VALID_CHARS);
    Regex::new(&format!(r"^\s*{word}(?:\.{word})*$")).expect("valid regex")
});

static EMAIL_DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    let atom = format!("{}+", EMAIL_VALID_CHARS);
    Regex::new(&format!(r"^{atom}(?:\.{atom})*\s*$")).expect("valid regex")
});

static BRACKETED_IP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(\d{1,3})\.(\d{1,3})\.(\d{1,3})\.(\d{1,3})\]$").expect("valid regex")
});

static IP_V4_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,3})\.(\d{1,3})\.(\d{1,3})\.(\d{1,3})$").expect("valid regex")
});

static TLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]{1,3}$").expect("valid regex"));

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:([^:/?#]+):)?(?://([^/?#]*))?([^?#]*)(?:\?([^#]*))?(?:#(.*))?$")
        .expect("valid regex")
});

static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z\d]*$").expect("valid regex"));

static AUTHORITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-zA-Z\d\-.]*)(:\d*)?(.*)$").expect("valid regex"));

static URL_HOST_RE: LazyLock<Regex> = LazyLock::new(|| {
    let atom = format!("{}+", URL_VALID_CHARS);
    Regex::new(&format!(r"^{atom}(?:\.{atom})*$")).expect("valid regex")
});

static PORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:\d{1,5}$").expect("valid regex"));

static PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(/[-\w:@&?=+,.!/~*'%$_;]*)?$").expect("valid regex"));

static ISBN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,5})[-\s](\d{1,7})[-\s](\d{1,6})[-\s]([0-9X])$").expect("valid regex")
});

fn octets_in_range(captures: &regex::Captures<'_>) -> bool {
    (1..=4).all(|i| {
        captures
            .get(i)
            .and_then(|m| m.as_str().parse::<u16>().ok())
            .is_some_and(|octet| octet <= 255)
    })
}

/// At least two labels, the last one a short alphanumeric TLD
fn has_valid_tld(domain: &str) -> bool {
    match domain.rfind('.') {
        Some(index) => TLD_RE.is_match(domain[index + 1..].trim()),
        None => false,
    }
}

/// Occurrences of `token`, overlapping ones included
fn count_overlapping(haystack: &str, token: &str) -> usize {
    let mut count = 0;
    let mut start = 0;
    while let Some(found) = haystack[start..].find(token) {
        count += 1;
        start += found + 1;
    }
    count
}

/// Email addresses of the form `user@domain`
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailFormat;

impl EmailFormat {
    pub fn new() -> Self {
        Self
    }

    /// Check a single address
    pub fn is_valid(&self, email: &str) -> bool {
        if email.is_empty() || !email.is_ascii() {
            return false;
        }

        let Some(captures) = EMAIL_RE.captures(email) else {
            return false;
        };

        EMAIL_USER_RE.is_match(&captures[1]) && Self::is_valid_domain(&captures[2])
    }

    fn is_valid_domain(domain: &str) -> bool {
        if let Some(ip) = BRACKETED_IP_RE.captures(domain) {
            return octets_in_range(&ip);
        }
        EMAIL_DOMAIN_RE.is_match(domain) && has_valid_tld(domain)
    }
}

impl Predicate<str> for EmailFormat {
    fn test(&self, value: &str) -> bool {
        self.is_valid(value)
    }
}

/// Absolute URLs with a host.
///
/// By default only `http`, `https` and `ftp` are accepted, `//` inside the
/// path is rejected and fragments are allowed.
#[derive(Debug, Clone)]
pub struct UrlFormat {
    schemes: HashSet<String>,
    allow_all_schemes: bool,
    allow_double_slashes: bool,
    no_fragments: bool,
}

impl UrlFormat {
    pub fn new() -> Self {
        Self {
            schemes: ["http", "https", "ftp"].into_iter().map(String::from).collect(),
            allow_all_schemes: false,
            allow_double_slashes: false,
            no_fragments: false,
        }
    }

    /// Replace the accepted schemes
    pub fn with_schemes<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schemes = schemes.into_iter().map(Into::into).collect();
        self
    }

    pub fn allow_all_schemes(mut self) -> Self {
        self.allow_all_schemes = true;
        self
    }

    pub fn allow_double_slashes(mut self) -> Self {
        self.allow_double_slashes = true;
        self
    }

    pub fn no_fragments(mut self) -> Self {
        self.no_fragments = true;
        self
    }

    /// Check a single URL against the configured options
    pub fn is_valid(&self, url: &str) -> bool {
        if url.is_empty() || !url.is_ascii() {
            return false;
        }

        let Some(parts) = URL_RE.captures(url) else {
            return false;
        };

        let scheme = parts.get(1).map(|m| m.as_str());
        let authority = parts.get(2).map(|m| m.as_str());
        let path = parts.get(3).map_or("", |m| m.as_str());
        let query = parts.get(4).map(|m| m.as_str());

        self.is_valid_scheme(scheme)
            && Self::is_valid_authority(authority)
            && self.is_valid_path(path)
            && query.map_or(true, |q| !q.contains(['\n', '\r']))
            && !(self.no_fragments && parts.get(5).is_some())
    }

    fn is_valid_scheme(&self, scheme: Option<&str>) -> bool {
        let Some(scheme) = scheme else {
            return false;
        };
        SCHEME_RE.is_match(scheme) && (self.allow_all_schemes || self.schemes.contains(scheme))
    }

    fn is_valid_authority(authority: Option<&str>) -> bool {
        let Some(parts) = authority.and_then(|a| AUTHORITY_RE.captures(a)) else {
            return false;
        };

        let host = parts.get(1).map_or("", |m| m.as_str());
        let host_ok = match IP_V4_RE.captures(host) {
            Some(ip) => octets_in_range(&ip),
            None => URL_HOST_RE.is_match(host) && has_valid_tld(host),
        };
        if !host_ok {
            return false;
        }

        if let Some(port) = parts.get(2) {
            if !PORT_RE.is_match(port.as_str()) {
                return false;
            }
        }

        parts.get(3).map_or(true, |extra| extra.as_str().trim().is_empty())
    }

    fn is_valid_path(&self, path: &str) -> bool {
        if !PATH_RE.is_match(path) {
            return false;
        }

        let double_slashes = count_overlapping(path, "//");
        if !self.allow_double_slashes && double_slashes > 0 {
            return false;
        }

        // `..` may not climb above the root
        let slashes = count_overlapping(path, "/") as isize;
        let parents = count_overlapping(path, "..") as isize;
        parents == 0 || slashes - double_slashes as isize - 1 > parents
    }
}

impl Default for UrlFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl Predicate<str> for UrlFormat {
    fn test(&self, value: &str) -> bool {
        self.is_valid(value)
    }
}

/// ISBN-10, plain or separated into group, publisher, title and check digit
#[derive(Debug, Clone, Copy, Default)]
pub struct IsbnFormat;

impl IsbnFormat {
    pub fn new() -> Self {
        Self
    }

    /// Check an ISBN-10, separators allowed
    pub fn is_valid(&self, isbn: &str) -> bool {
        if !(10..=13).contains(&isbn.len()) {
            return false;
        }

        if isbn.contains(['-', ' ']) && !ISBN_RE.is_match(isbn) {
            return false;
        }

        let cleaned: Vec<char> = isbn.chars().filter(|c| !matches!(c, '-' | ' ')).collect();
        if cleaned.len() != 10 {
            return false;
        }

        let digits: Option<Vec<u32>> = cleaned
            .iter()
            .enumerate()
            .map(|(i, &c)| match c {
                'X' if i == 9 => Some(10),
                c => c.to_digit(10),
            })
            .collect();
        let Some(digits) = digits else {
            return false;
        };

        let weighted: u32 = digits[..9]
            .iter()
            .enumerate()
            .map(|(i, d)| (10 - i as u32) * d)
            .sum();
        (weighted + digits[9]) % 11 == 0
    }
}

impl Predicate<str> for IsbnFormat {
    fn test(&self, value: &str) -> bool {
        self.is_valid(value)
    }
}

/// Card numbers: 13 to 19 digits passing the Luhn checksum.
///
/// Spaces and dashes between digit groups are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreditCardFormat;

impl CreditCardFormat {
    pub fn new() -> Self {
        Self
    }

    /// Check a card number, spaces and dashes allowed
    pub fn is_valid(&self, number: &str) -> bool {
        let digits: Option<Vec<u32>> = number
            .chars()
            .filter(|c| !matches!(c, ' ' | '-'))
            .map(|c| c.to_digit(10))
            .collect();

        match digits {
            Some(digits) if (13..=19).contains(&digits.len()) => luhn(&digits),
            _ => false,
        }
    }
}

fn luhn(digits: &[u32]) -> bool {
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

impl Predicate<str> for CreditCardFormat {
    fn test(&self, value: &str) -> bool {
        self.is_valid(value)
    }
}

/// Whole-string regular expression match
#[derive(Debug, Clone)]
pub struct PatternFormat {
    source: String,
    regex: Regex,
}

impl PatternFormat {
    /// Compile `pattern`, anchored at both ends
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| {
            ValidatorError::invalid_argument(format!("Invalid pattern '{}': {}", pattern, e))
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_valid(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl Predicate<str> for PatternFormat {
    fn test(&self, value: &str) -> bool {
        self.is_valid(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_valid_addresses() {
        let email = EmailFormat::new();
        for address in [
            "jsmith@apache.org",
            "someone@[216.109.118.76]",
            "jsmith@apache.info",
            "andy.noble@data-workshop.com",
            "andy.o'reilly@data-workshop.com",
            "foo+bar@i.am.not.in.us.example.com",
            " joeblow@apache.org",
            "joeblow@apache.org ",
            "\"john doe\"@example.com",
        ] {
            assert!(email.is_valid(address), "{} should be valid", address);
        }
    }

    #[test]
    fn test_email_invalid_addresses() {
        let email = EmailFormat::new();
        for address in [
            "",
            "plainaddress",
            "@example.com",
            "user@localhost",
            "jsmith@apache.",
            "jsmith@apache.c",
            "someone@yahoo.mu-seum",
            "andy-noble@data-workshop.c-om",
            "andy.noble@data-workshop.com.",
            "andy.noble@\u{8f}data-workshop.com",
            "andy@o'reilly.data-workshop.com",
            "joeblow@apa,che.org",
            "joeblow @apache.org",
            "joeblow@ apache.org",
            "joeblow@apa che.org ",
            "foo\u{1}bar@domain.com",
            "foo\u{7f}bar@domain.com",
            "someone@[256.1.1.1]",
        ] {
            assert!(!email.is_valid(address), "{:?} should be invalid", address);
        }
    }

    #[test]
    fn test_url_defaults() {
        let url = UrlFormat::new();
        for valid in [
            "http://www.example.com",
            "https://example.com:8080/a/b?x=1#top",
            "http://example.com/a/../b",
            "ftp://192.168.0.1/file",
            "http://example.com/",
        ] {
            assert!(url.is_valid(valid), "{} should be valid", valid);
        }
        for invalid in [
            "http://example.com/../x",
            "http://example.com//a",
            "http://256.1.1.1",
            "http://localhost",
            "mailto:x@y.com",
            "gopher://example.com",
            "http://example.com:123456",
            "http://exa mple.com",
            "http://example.c",
            "www.example.com",
            "http://example.com/a b",
        ] {
            assert!(!url.is_valid(invalid), "{} should be invalid", invalid);
        }
    }

    #[test]
    fn test_url_options() {
        assert!(UrlFormat::new().allow_all_schemes().is_valid("gopher://example.com"));
        assert!(UrlFormat::new().allow_double_slashes().is_valid("http://example.com//a"));
        assert!(!UrlFormat::new().no_fragments().is_valid("http://example.com#x"));
        assert!(UrlFormat::new().no_fragments().is_valid("http://example.com"));

        let svn = UrlFormat::new().with_schemes(["svn"]);
        assert!(svn.is_valid("svn://example.com"));
        assert!(!svn.is_valid("http://example.com"));
    }

    #[test]
    fn test_isbn() {
        let isbn = IsbnFormat::new();
        for valid in [
            "0-262-51087-1",
            "0262510871",
            "0 262 51087 1",
            "0-8044-2957-X",
            "080442957X",
        ] {
            assert!(isbn.is_valid(valid), "{} should be valid", valid);
        }
        for invalid in [
            "0-262-51087-2",
            "0-262-5108-71",
            "123456789",
            "1234567890123",
            "0-262-51087-1-",
            "02625108X1",
            "026251087A1",
        ] {
            assert!(!isbn.is_valid(invalid), "{} should be invalid", invalid);
        }
    }

    #[test]
    fn test_credit_card() {
        let card = CreditCardFormat::new();
        for valid in [
            "4417123456789113",
            "4417 1234 5678 9113",
            "4417-1234-5678-9113",
            "378282246310005",
        ] {
            assert!(card.is_valid(valid), "{} should be valid", valid);
        }
        for invalid in ["4417123456789112", "4111", "4417a23456789113", ""] {
            assert!(!card.is_valid(invalid), "{} should be invalid", invalid);
        }
    }

    #[test]
    fn test_pattern_matches_whole_string() {
        let zip = PatternFormat::new(r"\d{5}").unwrap();
        assert!(zip.is_valid("12345"));
        assert!(!zip.is_valid("123456"));
        assert!(!zip.is_valid("a12345"));
        assert_eq!(zip.as_str(), r"\d{5}");

        let alternation = PatternFormat::new("cat|dog").unwrap();
        assert!(alternation.is_valid("dog"));
        assert!(!alternation.is_valid("dogs"));
    }

    #[test]
    fn test_invalid_pattern_is_invalid_argument() {
        let err = PatternFormat::new("(unclosed").unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_overlapping_count() {
        assert_eq!(count_overlapping("///", "//"), 2);
        assert_eq!(count_overlapping("/a/b", "/"), 2);
        assert_eq!(count_overlapping("", ".."), 0);
    }
}
