use std::{
    error::Error as StdError,
    fmt::{self, Display},
    str::FromStr,
};

use mime::Mime;

use super::{Header, HeaderName};
use crate::error::BoxError;

/// `Content-Type` of the body, defined in
/// [RFC2045](https://tools.ietf.org/html/rfc2045#section-5)
#[derive(Debug, Clone, PartialEq)]
pub struct ContentType(Mime);

impl ContentType {
    /// A `ContentType` of type `text/plain; charset=utf-8`
    pub fn text_plain_utf8() -> Self {
        Self(mime::TEXT_PLAIN_UTF_8)
    }

    /// Parses a `ContentType` from a string
    pub fn parse(s: &str) -> Result<ContentType, ContentTypeErr> {
        s.parse().map(Self).map_err(ContentTypeErr)
    }

    pub(crate) fn from_mime(mime: Mime) -> Self {
        Self(mime)
    }

    pub(crate) fn as_mime(&self) -> &Mime {
        &self.0
    }
}

impl Header for ContentType {
    fn name() -> HeaderName {
        HeaderName::new_static("Content-Type")
    }

    fn parse_value(s: &str) -> Result<Self, BoxError> {
        Ok(Self(s.parse()?))
    }

    fn display(&self) -> String {
        self.0.to_string()
    }
}

impl FromStr for ContentType {
    type Err = ContentTypeErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for ContentType {
    type Error = ContentTypeErr;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

/// An error occurred while trying to [`ContentType::parse`].
#[derive(Debug)]
pub struct ContentTypeErr(mime::FromStrError);

impl StdError for ContentTypeErr {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.0)
    }
}

impl Display for ContentTypeErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// `Content-Transfer-Encoding` of the body, defined in
/// [RFC2045](https://tools.ietf.org/html/rfc2045#section-6)
///
/// The `Message` builder takes care of choosing the most
/// efficient encoding based on the chosen body, so in most
/// use-cases this header shouldn't be set manually.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ContentTransferEncoding {
    /// ASCII with lines shorter than 1000 characters
    #[default]
    SevenBit,
    /// Mostly-ASCII text, escaped with `=XX` sequences
    QuotedPrintable,
    /// Arbitrary bytes, base64 encoded
    Base64,
    /// Non-ASCII text with lines shorter than 1000 characters
    EightBit,
    /// Arbitrary bytes, transmitted as-is
    Binary,
}

impl Display for ContentTransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            ContentTransferEncoding::SevenBit => "7bit",
            ContentTransferEncoding::QuotedPrintable => "quoted-printable",
            ContentTransferEncoding::Base64 => "base64",
            ContentTransferEncoding::EightBit => "8bit",
            ContentTransferEncoding::Binary => "binary",
        })
    }
}

impl FromStr for ContentTransferEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "7bit" => Ok(ContentTransferEncoding::SevenBit),
            "quoted-printable" => Ok(ContentTransferEncoding::QuotedPrintable),
            "base64" => Ok(ContentTransferEncoding::Base64),
            "8bit" => Ok(ContentTransferEncoding::EightBit),
            "binary" => Ok(ContentTransferEncoding::Binary),
            _ => Err(s.into()),
        }
    }
}

impl Header for ContentTransferEncoding {
    fn name() -> HeaderName {
        HeaderName::new_static("Content-Transfer-Encoding")
    }

    fn parse_value(s: &str) -> Result<Self, BoxError> {
        Ok(s.parse()?)
    }

    fn display(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{ContentTransferEncoding, ContentType};
    use crate::message::header::Headers;

    #[test]
    fn format_content_type() {
        let mut headers = Headers::new();
        headers.set(ContentType::parse("text/plain; charset=utf-8").unwrap());

        assert_eq!(
            headers.to_string(),
            "Content-Type: text/plain; charset=utf-8\r\n"
        );
    }

    #[test]
    fn invalid_content_type_is_rejected() {
        assert!(ContentType::parse("not a mime type at all \u{0}").is_err());
    }

    #[test]
    fn format_content_transfer_encoding() {
        let mut headers = Headers::new();
        headers.set(ContentTransferEncoding::Base64);

        assert_eq!(headers.to_string(), "Content-Transfer-Encoding: base64\r\n");
    }

    #[test]
    fn parse_content_transfer_encoding() {
        let mut headers = Headers::new();
        headers.set_raw(
            crate::message::header::HeaderName::new_static("Content-Transfer-Encoding"),
            "quoted-printable".into(),
        );

        assert_eq!(
            headers.get::<ContentTransferEncoding>(),
            Some(ContentTransferEncoding::QuotedPrintable)
        );
    }
}
