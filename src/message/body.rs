use base64::{engine::general_purpose::STANDARD, Engine};

use crate::message::header::ContentTransferEncoding;

const MAX_LINE_LEN: usize = 998;
const BASE64_WRAP: usize = 76;

/// A message or part body with its `Content-Transfer-Encoding` already
/// decided.
///
/// When no encoding is requested explicitly, the cheapest valid one is
/// picked: `7bit` for plain ASCII, `quoted-printable` for mostly-text
/// content and `base64` for everything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    buf: Vec<u8>,
    encoding: ContentTransferEncoding,
}

impl Body {
    /// Stores raw content, choosing the best encoding for it
    pub fn new<B: Into<Vec<u8>>>(buf: B) -> Self {
        let buf = buf.into();
        let encoding = choose_encoding(&buf);
        Self { buf, encoding }
    }

    /// Stores raw content with a caller-chosen encoding
    pub fn new_with_encoding<B: Into<Vec<u8>>>(buf: B, encoding: ContentTransferEncoding) -> Self {
        Self {
            buf: buf.into(),
            encoding,
        }
    }

    /// The encoding the content will be transferred with
    pub fn encoding(&self) -> ContentTransferEncoding {
        self.encoding
    }

    /// Whether the raw content is empty
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Applies the transfer encoding and returns the wire bytes
    pub(crate) fn into_wire(self) -> Vec<u8> {
        match self.encoding {
            ContentTransferEncoding::SevenBit
            | ContentTransferEncoding::EightBit
            | ContentTransferEncoding::Binary => self.buf,
            ContentTransferEncoding::QuotedPrintable => quoted_printable::encode(&self.buf),
            ContentTransferEncoding::Base64 => wrap_base64(&STANDARD.encode(&self.buf)),
        }
    }
}

fn choose_encoding(buf: &[u8]) -> ContentTransferEncoding {
    if is_7bit_clean(buf) {
        ContentTransferEncoding::SevenBit
    } else if std::str::from_utf8(buf).is_ok() {
        ContentTransferEncoding::QuotedPrintable
    } else {
        ContentTransferEncoding::Base64
    }
}

fn is_7bit_clean(buf: &[u8]) -> bool {
    buf.iter().all(|&b| b != 0 && b < 128) && buf.split(|&b| b == b'\n').all(|l| l.len() <= MAX_LINE_LEN)
}

fn wrap_base64(encoded: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded.len() + encoded.len() / BASE64_WRAP * 2);
    for (i, b) in encoded.bytes().enumerate() {
        if i > 0 && i % BASE64_WRAP == 0 {
            out.extend_from_slice(b"\r\n");
        }
        out.push(b);
    }
    out
}

/// Anything that can become a [`Body`], honoring an encoding picked
/// earlier through a `Content-Transfer-Encoding` header
pub trait IntoBody {
    /// Converts to a [`Body`], preferring `encoding` when one was chosen
    fn into_body(self, encoding: Option<ContentTransferEncoding>) -> Body;
}

impl IntoBody for String {
    fn into_body(self, encoding: Option<ContentTransferEncoding>) -> Body {
        into_body_impl(self.into_bytes(), encoding)
    }
}

impl IntoBody for &str {
    fn into_body(self, encoding: Option<ContentTransferEncoding>) -> Body {
        into_body_impl(self.as_bytes().to_vec(), encoding)
    }
}

impl IntoBody for Vec<u8> {
    fn into_body(self, encoding: Option<ContentTransferEncoding>) -> Body {
        into_body_impl(self, encoding)
    }
}

impl IntoBody for &[u8] {
    fn into_body(self, encoding: Option<ContentTransferEncoding>) -> Body {
        into_body_impl(self.to_vec(), encoding)
    }
}

fn into_body_impl(buf: Vec<u8>, encoding: Option<ContentTransferEncoding>) -> Body {
    match encoding {
        Some(encoding) => Body::new_with_encoding(buf, encoding),
        None => Body::new(buf),
    }
}

impl IntoBody for Body {
    fn into_body(self, encoding: Option<ContentTransferEncoding>) -> Body {
        match encoding {
            Some(encoding) => Body::new_with_encoding(self.buf, encoding),
            None => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn ascii_body_stays_7bit() {
        let body = Body::new(String::from("Hello, world!"));
        assert_eq!(body.encoding(), ContentTransferEncoding::SevenBit);
        assert_eq!(body.into_wire(), b"Hello, world!");
    }

    #[test]
    fn utf8_body_becomes_quoted_printable() {
        let body = Body::new(String::from("Привет"));
        assert_eq!(body.encoding(), ContentTransferEncoding::QuotedPrintable);
        assert_eq!(
            body.into_wire(),
            b"=D0=9F=D1=80=D0=B8=D0=B2=D0=B5=D1=82".to_vec()
        );
    }

    #[test]
    fn binary_body_becomes_base64() {
        let body = Body::new(vec![0u8, 159, 146, 150]);
        assert_eq!(body.encoding(), ContentTransferEncoding::Base64);
        assert_eq!(body.into_wire(), b"AJ+Slg==".to_vec());
    }

    #[test]
    fn explicit_encoding_wins() {
        let body = String::from("plain").into_body(Some(ContentTransferEncoding::Base64));
        assert_eq!(body.encoding(), ContentTransferEncoding::Base64);
        assert_eq!(body.into_wire(), b"cGxhaW4=".to_vec());
    }
}
