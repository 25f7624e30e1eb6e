//! Headers widely used in email messages
// https://tools.ietf.org/html/rfc5322#section-2.2

use std::{
    borrow::Cow,
    fmt::{self, Display, Write},
    mem,
};

use base64::{display::Base64Display, engine::general_purpose::STANDARD};

use crate::{error, error::BoxError, Error};

mod content;
mod date;
mod mailbox;
mod textual;

pub use self::{content::*, date::*, mailbox::*, textual::*};

/// A typed header, convertible to and from its raw string value
pub trait Header: Clone {
    /// The header name, e.g. `Subject`
    fn name() -> HeaderName;

    /// Parses the raw value into the typed representation
    fn parse_value(s: &str) -> Result<Self, BoxError>
    where
        Self: Sized;

    /// The raw value this header serializes to
    fn display(&self) -> String;
}

/// An ordered collection of headers
///
/// Names compare ASCII-case-insensitively and the last write wins
/// per name; insertion order is otherwise preserved on output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    headers: Vec<(HeaderName, String)>,
}

/// A validated header name
#[derive(Debug, Clone, Eq)]
pub struct HeaderName(Cow<'static, str>);

impl Headers {
    /// Creates an empty header collection
    pub const fn new() -> Self {
        Self {
            headers: Vec::new(),
        }
    }

    /// Gets a typed header, if present and parseable
    pub fn get<H: Header>(&self) -> Option<H> {
        self.get_raw(&H::name())
            .and_then(|raw| H::parse_value(raw).ok())
    }

    /// Sets a typed header, replacing any prior value for the same name
    pub fn set<H: Header>(&mut self, header: H) {
        self.set_raw(H::name(), header.display());
    }

    /// Removes a header by type, returning it if it was present
    pub fn remove<H: Header>(&mut self) -> Option<H> {
        self.remove_raw(&H::name())
            .and_then(|(_name, raw)| H::parse_value(&raw).ok())
    }

    /// Gets the raw value stored for `name`
    pub fn get_raw(&self, name: &str) -> Option<&str> {
        self.find_header(name).map(|(_name, value)| value)
    }

    /// Sets a raw header value, replacing any prior value for the same name
    pub fn set_raw(&mut self, name: HeaderName, value: String) {
        match self.find_header_mut(&name) {
            Some((_name, current_value)) => {
                *current_value = value;
            }
            None => {
                self.headers.push((name, value));
            }
        }
    }

    /// Appends to an existing header value (comma separated), or inserts it
    pub fn insert_raw(&mut self, name: HeaderName, value: String) {
        match self.find_header_mut(&name) {
            Some((_name, prev_value)) => {
                prev_value.push_str(", ");
                prev_value.push_str(&value);
            }
            None => self.headers.push((name, value)),
        }
    }

    /// Removes a header by name, returning it if it was present
    pub fn remove_raw(&mut self, name: &str) -> Option<(HeaderName, String)> {
        self.find_header_index(name).map(|i| self.headers.remove(i))
    }

    /// Iterates over all headers in output order
    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &str)> {
        self.headers
            .iter()
            .map(|(name, value)| (name, value.as_str()))
    }

    /// Number of stored headers
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Whether no header is stored
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    fn find_header(&self, name: &str) -> Option<(&HeaderName, &str)> {
        self.headers
            .iter()
            .find(|&(name_, _value)| name.eq_ignore_ascii_case(name_))
            .map(|t| (&t.0, t.1.as_str()))
    }

    fn find_header_mut(&mut self, name: &str) -> Option<(&HeaderName, &mut String)> {
        self.headers
            .iter_mut()
            .find(|(name_, _value)| name.eq_ignore_ascii_case(name_))
            .map(|t| (&t.0, &mut t.1))
    }

    fn find_header_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .enumerate()
            .find(|&(_i, (name_, _value))| name.eq_ignore_ascii_case(name_))
            .map(|(i, _)| i)
    }
}

impl Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.headers {
            let encoder = HeaderEncoder::new(f, name, value)?;
            encoder.format(f)?;
            f.write_str("\r\n")?;
        }

        Ok(())
    }
}

fn allowed_str(s: &str) -> bool {
    s.chars().all(allowed_char)
}

// Printable US-ASCII plus horizontal tab, i.e. what can go on the wire
// without an RFC 2047 encoded word
fn allowed_char(c: char) -> bool {
    c >= 1 as char && c <= 9 as char
        || c == 11 as char
        || c == 12 as char
        || c >= 14 as char && c <= 127 as char
}

const MAX_LINE_LEN: usize = 76;

// Longest run of raw bytes going into a single encoded word, so that
// `=?utf-8?b?...?=` stays within MAX_LINE_LEN on a fresh line
const MAX_ENCODED_CHUNK: usize = 45;

/// Streams one header onto a formatter, folding long lines and turning
/// non-ASCII runs into RFC 2047 `=?utf-8?b?..?=` encoded words.
struct HeaderEncoder<'a> {
    words: WordsPlusFill<'a>,
    line_len: usize,
    encode_buf: String,
}

impl<'a> HeaderEncoder<'a> {
    fn new(f: &mut fmt::Formatter<'_>, name: &str, value: &'a str) -> Result<Self, fmt::Error> {
        f.write_str(name)?;
        f.write_str(": ")?;

        Ok(Self {
            words: WordsPlusFill { rest: value },
            line_len: name.len() + 2,
            encode_buf: String::new(),
        })
    }

    fn format(mut self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        while let Some(word) = self.words.next() {
            if allowed_str(word) {
                // the word can go out as-is, but a run of words to encode
                // may have accumulated before it
                self.flush_encode_buf(f, true)?;

                if self.line_len + word.len() > MAX_LINE_LEN && self.line_len > 1 {
                    self.new_line(f)?;
                }

                f.write_str(word)?;
                self.line_len += word.len();
            } else {
                self.encode_buf.push_str(word);
            }
        }

        self.flush_encode_buf(f, false)
    }

    fn flush_encode_buf(
        &mut self,
        f: &mut fmt::Formatter<'_>,
        switching_to_allowed: bool,
    ) -> fmt::Result {
        if self.encode_buf.is_empty() {
            return Ok(());
        }

        // A trailing space separates the encoded run from the next plain
        // word; it must stay outside the encoded word.
        let mut write_after = None;
        if switching_to_allowed && self.encode_buf.ends_with(' ') {
            self.encode_buf.pop();
            write_after = Some(' ');
        }

        let buf = mem::take(&mut self.encode_buf);
        let mut first = true;
        for chunk in encoded_chunks(&buf) {
            let len = encoded_word_len(chunk.len());
            if !mem::take(&mut first) || (self.line_len + len > MAX_LINE_LEN && self.line_len > 1) {
                self.new_line(f)?;
            }

            f.write_str("=?utf-8?b?")?;
            let encoded = Base64Display::new(chunk.as_bytes(), &STANDARD);
            Display::fmt(&encoded, f)?;
            f.write_str("?=")?;
            self.line_len += len;
        }

        if let Some(c) = write_after {
            f.write_char(c)?;
            self.line_len += 1;
        }

        Ok(())
    }

    fn new_line(&mut self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\r\n ")?;
        self.line_len = 1;

        Ok(())
    }
}

fn encoded_word_len(raw_len: usize) -> usize {
    "=?utf-8?b?".len() + raw_len.div_ceil(3) * 4 + "?=".len()
}

// Splits on char boundaries into chunks short enough to each become one
// encoded word
fn encoded_chunks(s: &str) -> impl Iterator<Item = &str> {
    let mut rest = s;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let mut end = rest.len().min(MAX_ENCODED_CHUNK);
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        let (chunk, tail) = rest.split_at(end);
        rest = tail;
        Some(chunk)
    })
}

/// Yields each word together with the whitespace and commas trailing it,
/// so that rejoining the items reproduces the input exactly.
struct WordsPlusFill<'a> {
    rest: &'a str,
}

impl<'a> Iterator for WordsPlusFill<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        let next_word = self
            .rest
            .char_indices()
            .skip(1)
            .skip_while(|&(_i, c)| !is_fill(c))
            .find(|&(_i, c)| !is_fill(c))
            .map(|(i, _)| i);

        let word = &self.rest[..next_word.unwrap_or(self.rest.len())];
        self.rest = &self.rest[word.len()..];
        Some(word)
    }
}

fn is_fill(c: char) -> bool {
    c == ',' || c == ' '
}

impl HeaderName {
    /// Validates and creates a header name from a runtime string.
    ///
    /// The name must be non-empty ASCII of at most 76 characters, without
    /// colons, spaces or control characters.
    pub fn new(name: String) -> Result<Self, Error> {
        if name.is_empty() {
            return Err(error::invalid_argument("header name must not be empty"));
        }
        if name.len() > MAX_LINE_LEN {
            return Err(error::invalid_argument("header name too long"));
        }
        if !name
            .bytes()
            .all(|b| b.is_ascii_graphic() && b != b':')
        {
            return Err(error::invalid_argument(
                "header name must be printable ascii without colons",
            ));
        }
        Ok(Self(Cow::Owned(name)))
    }

    /// Creates a header name from a static string, validating it at
    /// compile time.
    pub const fn new_static(ascii: &'static str) -> Self {
        let bytes = ascii.as_bytes();
        if bytes.is_empty() || bytes.len() > MAX_LINE_LEN {
            panic!("header name must be between 1 and 76 characters long");
        }
        let mut i = 0;
        while i < bytes.len() {
            if !bytes[i].is_ascii_graphic() || bytes[i] == b':' {
                panic!("header name must be printable ascii without colons");
            }
            i += 1;
        }

        Self(Cow::Borrowed(ascii))
    }
}

impl Display for HeaderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::ops::Deref for HeaderName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for HeaderName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<HeaderName> for HeaderName {
    fn eq(&self, other: &HeaderName) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl PartialEq<&str> for HeaderName {
    fn eq(&self, other: &&str) -> bool {
        let s: &str = self.as_ref();
        s == *other
    }
}

impl PartialEq<HeaderName> for &str {
    fn eq(&self, other: &HeaderName) -> bool {
        let s: &str = other.as_ref();
        *self == s
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{HeaderName, Headers};

    #[test]
    fn valid_header_name() {
        assert_eq!(HeaderName::new(String::from("From")).unwrap(), "From");
        assert_eq!(HeaderName::new(String::from("X-Duck")).unwrap(), "X-Duck");
    }

    #[test]
    fn invalid_header_names() {
        assert!(HeaderName::new(String::from("")).is_err());
        assert!(HeaderName::new(String::from("From:")).is_err());
        assert!(HeaderName::new(String::from("Date ")).is_err());
        assert!(HeaderName::new(String::from("✉️")).is_err());
    }

    #[test]
    fn set_raw_replaces_prior_value() {
        let mut headers = Headers::new();
        headers.set_raw(HeaderName::new_static("X-Priority"), "1".into());
        headers.set_raw(HeaderName::new_static("X-Priority"), "5".into());

        assert_eq!(headers.get_raw("X-Priority"), Some("5"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn names_compare_case_insensitively() {
        let mut headers = Headers::new();
        headers.set_raw(HeaderName::new_static("X-Duck"), "quack".into());

        assert_eq!(headers.get_raw("x-duck"), Some("quack"));
    }

    #[test]
    fn format_ascii_value() {
        let mut headers = Headers::new();
        headers.set_raw(HeaderName::new_static("Subject"), "Sample subject".into());

        assert_eq!(headers.to_string(), "Subject: Sample subject\r\n");
    }

    #[test]
    fn format_utf8_value() {
        let mut headers = Headers::new();
        headers.set_raw(HeaderName::new_static("Subject"), "Тема сообщения".into());

        assert_eq!(
            headers.to_string(),
            "Subject: =?utf-8?b?0KLQtdC80LAg0YHQvtC+0LHRidC10L3QuNGP?=\r\n"
        );
    }

    #[test]
    fn format_mixed_value_keeps_ascii_tail() {
        let mut headers = Headers::new();
        headers.set_raw(
            HeaderName::new_static("From"),
            "Кайо <kayo@example.com>".into(),
        );

        assert_eq!(
            headers.to_string(),
            "From: =?utf-8?b?0JrQsNC50L4=?= <kayo@example.com>\r\n"
        );
    }

    #[test]
    fn folds_long_ascii_values() {
        let mut headers = Headers::new();
        headers.set_raw(
            HeaderName::new_static("To"),
            "first.recipient@example.com, second.recipient@example.com, third.recipient@example.com".into(),
        );

        let formatted = headers.to_string();
        for line in formatted.split("\r\n") {
            assert!(line.len() <= 76, "line too long: {line:?}");
        }
        // folding must not lose content
        let unfolded = formatted.replace("\r\n ", " ");
        assert!(unfolded.contains("third.recipient@example.com"));
    }
}
