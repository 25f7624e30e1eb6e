use std::io::Write;

use mime::Mime;

use crate::message::{
    header::{ContentTransferEncoding, ContentType, Header, Headers},
    EmailFormat, IntoBody,
};

/// MIME part variants
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// Single part with content
    Single(SinglePart),

    /// Multiple parts of content
    Multi(MultiPart),
}

impl EmailFormat for Part {
    fn format(&self, out: &mut Vec<u8>) {
        match self {
            Part::Single(part) => part.format(out),
            Part::Multi(part) => part.format(out),
        }
    }
}

impl Part {
    /// Gets the part content formatted for transfer
    pub fn formatted(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.format(&mut out);
        out
    }
}

/// Creates a builder for a single part
#[derive(Debug, Clone, Default)]
pub struct SinglePartBuilder {
    headers: Headers,
}

impl SinglePartBuilder {
    /// Creates a default singlepart builder
    pub fn new() -> Self {
        Self {
            headers: Headers::new(),
        }
    }

    /// Sets a header of the singlepart
    pub fn header<H: Header>(mut self, header: H) -> Self {
        self.headers.set(header);
        self
    }

    /// Sets the `Content-Type` header of the singlepart
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.headers.set(content_type);
        self
    }

    /// Builds the singlepart, encoding the body
    pub fn body<T: IntoBody>(mut self, body: T) -> SinglePart {
        let maybe_encoding = self.headers.get::<ContentTransferEncoding>();
        let body = body.into_body(maybe_encoding);

        self.headers.set(body.encoding());

        SinglePart {
            headers: self.headers,
            body: body.into_wire(),
        }
    }
}

/// A single part of a MIME body
///
/// # Example
///
/// ```
/// use courriel::message::{header::ContentType, SinglePart};
///
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let part = SinglePart::builder()
///     .content_type(ContentType::parse("text/plain; charset=utf8")?)
///     .body(String::from("Текст письма в уникоде"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SinglePart {
    headers: Headers,
    // already transfer-encoded
    body: Vec<u8>,
}

impl SinglePart {
    /// Creates a builder for a singlepart
    #[inline]
    pub fn builder() -> SinglePartBuilder {
        SinglePartBuilder::new()
    }

    /// Gets the headers of the singlepart
    #[inline]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Gets the encoded body
    #[inline]
    pub fn raw_body(&self) -> &[u8] {
        &self.body
    }

    /// Gets the part formatted for transfer
    pub fn formatted(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.format(&mut out);
        out
    }
}

impl EmailFormat for SinglePart {
    fn format(&self, out: &mut Vec<u8>) {
        write!(out, "{}", self.headers)
            .expect("A Write implementation panicked while formatting headers");
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        out.extend_from_slice(b"\r\n");
    }
}

/// The kind of multipart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiPartKind {
    /// Mixed kind, combining unrelated content parts
    ///
    /// For example a message body and its attachments.
    Mixed,

    /// Alternative kind, joining several renditions of the same content
    ///
    /// Typically a plain text and an HTML version of the same message.
    Alternative,

    /// Related kind, mixing content and the resources it refers to
    ///
    /// For example an HTML body and the images it embeds.
    Related,
}

/// Creates a random MIME boundary
fn make_boundary() -> String {
    std::iter::repeat_with(fastrand::alphanumeric)
        .take(40)
        .collect()
}

impl MultiPartKind {
    fn to_mime<S: Into<String>>(self, boundary: Option<S>) -> Mime {
        let boundary = boundary.map_or_else(make_boundary, Into::into);

        format!(
            "multipart/{}; boundary=\"{}\"",
            match self {
                Self::Mixed => "mixed",
                Self::Alternative => "alternative",
                Self::Related => "related",
            },
            boundary
        )
        .parse()
        .unwrap()
    }

    fn from_mime(m: &Mime) -> Option<Self> {
        match m.subtype().as_ref() {
            "mixed" => Some(Self::Mixed),
            "alternative" => Some(Self::Alternative),
            "related" => Some(Self::Related),
            _ => None,
        }
    }
}

impl From<MultiPartKind> for Mime {
    fn from(m: MultiPartKind) -> Self {
        m.to_mime::<String>(None)
    }
}

/// Multipart builder
#[derive(Debug, Clone, Default)]
pub struct MultiPartBuilder {
    headers: Headers,
}

impl MultiPartBuilder {
    /// Creates a default multipart builder
    pub fn new() -> Self {
        Self {
            headers: Headers::new(),
        }
    }

    /// Sets a header
    pub fn header<H: Header>(mut self, header: H) -> Self {
        self.headers.set(header);
        self
    }

    /// Sets the `Content-Type` header using a [`MultiPartKind`]
    pub fn kind(self, kind: MultiPartKind) -> Self {
        self.header(ContentType::from_mime(kind.into()))
    }

    /// Sets a custom boundary, keeping the current kind
    pub fn boundary<S: AsRef<str>>(self, boundary: S) -> Self {
        let kind = self
            .headers
            .get::<ContentType>()
            .and_then(|content_type| MultiPartKind::from_mime(content_type.as_mime()))
            .unwrap_or(MultiPartKind::Mixed);
        let mime = kind.to_mime(Some(boundary.as_ref()));
        self.header(ContentType::from_mime(mime))
    }

    /// Creates a multipart with a single part in it
    pub fn singlepart(self, part: SinglePart) -> MultiPart {
        self.build().singlepart(part)
    }

    /// Creates a multipart with a nested multipart in it
    pub fn multipart(self, part: MultiPart) -> MultiPart {
        self.build().multipart(part)
    }

    /// Creates an empty multipart
    ///
    /// Defaults to the mixed kind when none was chosen.
    pub fn build(self) -> MultiPart {
        let builder = if self.headers.get::<ContentType>().is_none() {
            self.kind(MultiPartKind::Mixed)
        } else {
            self
        };
        MultiPart {
            headers: builder.headers,
            parts: Vec::new(),
        }
    }
}

/// A multipart MIME body
///
/// # Example
///
/// ```
/// use courriel::message::{header::ContentType, MultiPart, SinglePart};
///
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let part = MultiPart::alternative()
///     .singlepart(
///         SinglePart::builder()
///             .content_type(ContentType::parse("text/plain; charset=utf8")?)
///             .body(String::from("Hello, world! :)")),
///     )
///     .singlepart(
///         SinglePart::builder()
///             .content_type(ContentType::parse("text/html; charset=utf8")?)
///             .body(String::from("<p><b>Hello</b>, <i>world</i>!</p>")),
///     );
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MultiPart {
    headers: Headers,
    parts: Vec<Part>,
}

impl MultiPart {
    /// Creates a multipart builder
    pub fn builder() -> MultiPartBuilder {
        MultiPartBuilder::new()
    }

    /// Creates a mixed multipart builder
    ///
    /// Shortcut for `MultiPart::builder().kind(MultiPartKind::Mixed)`
    pub fn mixed() -> MultiPartBuilder {
        Self::builder().kind(MultiPartKind::Mixed)
    }

    /// Creates an alternative multipart builder
    ///
    /// Shortcut for `MultiPart::builder().kind(MultiPartKind::Alternative)`
    pub fn alternative() -> MultiPartBuilder {
        Self::builder().kind(MultiPartKind::Alternative)
    }

    /// Creates a related multipart builder
    ///
    /// Shortcut for `MultiPart::builder().kind(MultiPartKind::Related)`
    pub fn related() -> MultiPartBuilder {
        Self::builder().kind(MultiPartKind::Related)
    }

    /// Appends a single part
    pub fn singlepart(mut self, part: SinglePart) -> Self {
        self.parts.push(Part::Single(part));
        self
    }

    /// Appends a nested multipart
    pub fn multipart(mut self, part: MultiPart) -> Self {
        self.parts.push(Part::Multi(part));
        self
    }

    /// Gets the headers of the multipart
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Gets the nested parts
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Gets the boundary separating the nested parts
    pub fn boundary(&self) -> String {
        let content_type = self
            .headers
            .get::<ContentType>()
            .expect("multiparts always have a content type");
        content_type
            .as_mime()
            .get_param("boundary")
            .expect("multipart content types always have a boundary")
            .as_str()
            .to_owned()
    }

    /// Gets the multipart formatted for transfer
    pub fn formatted(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.format(&mut out);
        out
    }
}

impl EmailFormat for MultiPart {
    fn format(&self, out: &mut Vec<u8>) {
        write!(out, "{}", self.headers)
            .expect("A Write implementation panicked while formatting headers");
        out.extend_from_slice(b"\r\n");

        let boundary = self.boundary();
        for part in &self.parts {
            out.extend_from_slice(b"--");
            out.extend_from_slice(boundary.as_bytes());
            out.extend_from_slice(b"\r\n");
            part.format(out);
        }

        out.extend_from_slice(b"--");
        out.extend_from_slice(boundary.as_bytes());
        out.extend_from_slice(b"--\r\n");
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{MultiPart, SinglePart};
    use crate::message::header::ContentType;

    #[test]
    fn single_part_ascii() {
        let part = SinglePart::builder()
            .content_type(ContentType::parse("text/plain; charset=utf-8").unwrap())
            .body(String::from("Test email"));

        assert_eq!(
            String::from_utf8(part.formatted()).unwrap(),
            concat!(
                "Content-Type: text/plain; charset=utf-8\r\n",
                "Content-Transfer-Encoding: 7bit\r\n",
                "\r\n",
                "Test email\r\n"
            )
        );
    }

    #[test]
    fn single_part_utf8() {
        let part = SinglePart::builder()
            .content_type(ContentType::parse("text/plain; charset=utf-8").unwrap())
            .body(String::from("Привет"));

        assert_eq!(
            String::from_utf8(part.formatted()).unwrap(),
            concat!(
                "Content-Type: text/plain; charset=utf-8\r\n",
                "Content-Transfer-Encoding: quoted-printable\r\n",
                "\r\n",
                "=D0=9F=D1=80=D0=B8=D0=B2=D0=B5=D1=82\r\n"
            )
        );
    }

    #[test]
    fn multi_part_with_boundary() {
        let part = MultiPart::mixed()
            .boundary("F9AhigKMZva7bgrkzrbq12JBqUiDYbTj2QN9Wnik")
            .singlepart(
                SinglePart::builder()
                    .content_type(ContentType::parse("text/plain; charset=utf-8").unwrap())
                    .body(String::from("Test email")),
            );

        assert_eq!(
            String::from_utf8(part.formatted()).unwrap(),
            concat!(
                "Content-Type: multipart/mixed; \r\n",
                " boundary=\"F9AhigKMZva7bgrkzrbq12JBqUiDYbTj2QN9Wnik\"\r\n",
                "\r\n",
                "--F9AhigKMZva7bgrkzrbq12JBqUiDYbTj2QN9Wnik\r\n",
                "Content-Type: text/plain; charset=utf-8\r\n",
                "Content-Transfer-Encoding: 7bit\r\n",
                "\r\n",
                "Test email\r\n",
                "--F9AhigKMZva7bgrkzrbq12JBqUiDYbTj2QN9Wnik--\r\n"
            )
        );
    }

    #[test]
    fn boundaries_are_random() {
        let a = MultiPart::mixed().build();
        let b = MultiPart::mixed().build();
        assert_ne!(a.boundary(), b.boundary());
    }
}
