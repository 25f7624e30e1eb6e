//! Provides a strongly typed way to assemble emails
//!
//! The [`Email`][crate::Email] façade drives this module, but the
//! builder can also be used directly when no transport configuration is
//! involved:
//!
//! ```rust
//! use courriel::message::Message;
//!
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! let m = Message::builder()
//!     .from("NoBody <nobody@domain.tld>".parse()?)
//!     .reply_to("Yuin <yuin@domain.tld>".parse()?)
//!     .to("Hei <hei@domain.tld>".parse()?)
//!     .subject("Happy new year")
//!     .body(String::from("Be happy!"))?;
//! # Ok(())
//! # }
//! ```
//!
//! The unicode header data is encoded using _UTF8-Base64_ encoding, when
//! necessary. The `Content-Transfer-Encoding` is chosen based on the best
//! encoding available for the given body, between `7bit`,
//! `quoted-printable` and `base64`.

pub use self::{
    body::{Body, IntoBody},
    mailbox::{Mailbox, Mailboxes},
    mimebody::{MultiPart, MultiPartBuilder, MultiPartKind, Part, SinglePart, SinglePartBuilder},
};

pub mod header;

mod body;
mod mailbox;
mod mimebody;

use std::{io::Write, time::SystemTime};

use crate::{
    address::Envelope,
    error,
    message::header::{ContentTransferEncoding, Header, HeaderName, Headers, MailboxesHeader},
    Error,
};

/// Something that can be formatted as (part of) an email message
pub(crate) trait EmailFormat {
    fn format(&self, out: &mut Vec<u8>);
}

/// A builder for messages
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    headers: Headers,
    envelope: Option<Envelope>,
}

impl MessageBuilder {
    /// Creates a new default message builder
    pub fn new() -> Self {
        Self {
            headers: Headers::new(),
            envelope: None,
        }
    }

    /// Sets a custom header
    pub fn header<H: Header>(mut self, header: H) -> Self {
        self.headers.set(header);
        self
    }

    /// Sets a header from its raw name and value
    pub fn raw_header(mut self, name: HeaderName, value: String) -> Self {
        self.headers.set_raw(name, value);
        self
    }

    /// Adds a mailbox to a header, joining it with the mailboxes already
    /// present
    pub fn mailbox<H: Header + MailboxesHeader>(self, header: H) -> Self {
        match self.headers.get::<H>() {
            Some(mut existing) => {
                existing.join_mailboxes(header);
                self.header(existing)
            }
            None => self.header(header),
        }
    }

    /// Adds a `Date` header to the message
    ///
    /// Shortcut for `self.header(header::Date::new(st))`.
    pub fn date(self, st: SystemTime) -> Self {
        self.header(header::Date::new(st))
    }

    /// Sets the `Date` header to the current date/time
    ///
    /// Shortcut for `self.date(SystemTime::now())`.
    pub fn date_now(self) -> Self {
        self.date(SystemTime::now())
    }

    /// Sets the `Subject` header of the message
    ///
    /// Shortcut for `self.header(header::Subject::from(subject.into()))`.
    pub fn subject<S: Into<String>>(self, subject: S) -> Self {
        self.header(header::Subject::from(subject.into()))
    }

    /// Sets the `MIME-Version` header to 1.0
    ///
    /// Not exposed as it is set by the body methods
    fn mime_1_0(self) -> Self {
        self.raw_header(HeaderName::new_static("MIME-Version"), "1.0".into())
    }

    /// Sets the `Sender` header. Should be used when providing several
    /// `From` mailboxes.
    ///
    /// Defined in [RFC5322](https://tools.ietf.org/html/rfc5322#section-3.6.2).
    pub fn sender(self, mbox: Mailbox) -> Self {
        self.header(header::Sender::from(mbox))
    }

    /// Sets or adds a mailbox to the `From` header
    ///
    /// Defined in [RFC5322](https://tools.ietf.org/html/rfc5322#section-3.6.2).
    pub fn from(self, mbox: Mailbox) -> Self {
        self.mailbox(header::From::from(Mailboxes::from(mbox)))
    }

    /// Sets or adds a mailbox to the `Reply-To` header
    pub fn reply_to(self, mbox: Mailbox) -> Self {
        self.mailbox(header::ReplyTo(mbox.into()))
    }

    /// Sets or adds a mailbox to the `To` header
    pub fn to(self, mbox: Mailbox) -> Self {
        self.mailbox(header::To(mbox.into()))
    }

    /// Sets or adds a mailbox to the `Cc` header
    pub fn cc(self, mbox: Mailbox) -> Self {
        self.mailbox(header::Cc(mbox.into()))
    }

    /// Forces a specific envelope (by default it is derived from the
    /// headers)
    pub fn envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = Some(envelope);
        self
    }

    /// Creates a message from a body
    fn build(self, body: MessageBody) -> Result<Message, Error> {
        // Insert Date if missing
        // https://tools.ietf.org/html/rfc5322#section-3.6
        let res = if self.headers.get::<header::Date>().is_none() {
            self.date_now()
        } else {
            self
        };

        // Fail on a missing or ambiguous originator
        match res.headers.get::<header::From>() {
            Some(header::From(f)) => {
                let from: Vec<Mailbox> = f.into();
                if from.len() > 1 && res.headers.get::<header::Sender>().is_none() {
                    return Err(error::configuration(
                        "multiple from addresses require an explicit sender",
                    ));
                }
            }
            None => {
                return Err(error::configuration("from address required"));
            }
        }

        let envelope = match res.envelope {
            Some(e) => e,
            None => Envelope::try_from(&res.headers)?,
        };
        Ok(Message {
            headers: res.headers,
            body,
            envelope,
        })
    }

    /// Creates a [`Message`] using a text or binary body
    ///
    /// The `Content-Transfer-Encoding` is chosen automatically between
    /// `7bit`, `quoted-printable` and `base64`, unless one was set
    /// through a header.
    pub fn body<T: IntoBody>(mut self, body: T) -> Result<Message, Error> {
        let maybe_encoding = self.headers.get::<ContentTransferEncoding>();
        let body = body.into_body(maybe_encoding);

        self.headers.set(body.encoding());
        self.build(MessageBody::Raw(body.into_wire()))
    }

    /// Creates a message using a [`MultiPart`] body
    pub fn multipart(self, part: MultiPart) -> Result<Message, Error> {
        self.mime_1_0().build(MessageBody::Mime(Part::Multi(part)))
    }

    /// Creates a message using a [`SinglePart`] body
    pub fn singlepart(self, part: SinglePart) -> Result<Message, Error> {
        self.mime_1_0().build(MessageBody::Mime(Part::Single(part)))
    }
}

/// An assembled email message, ready to be formatted for transfer
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    headers: Headers,
    body: MessageBody,
    envelope: Envelope,
}

#[derive(Debug, Clone, PartialEq)]
enum MessageBody {
    Mime(Part),
    Raw(Vec<u8>),
}

impl Message {
    /// Creates a new message builder without headers
    pub fn builder() -> MessageBuilder {
        MessageBuilder::new()
    }

    /// Gets the headers of the message
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Gets the message envelope
    ///
    /// Its forward-path is the complete recipient set, including the
    /// blind-carbon-copy addresses absent from the headers.
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Gets the multipart content, when the message was built from one
    pub fn multipart(&self) -> Option<&MultiPart> {
        match &self.body {
            MessageBody::Mime(Part::Multi(part)) => Some(part),
            _ => None,
        }
    }

    /// Gets the message content formatted for SMTP
    pub fn formatted(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.format(&mut out);
        out
    }
}

impl EmailFormat for Message {
    fn format(&self, out: &mut Vec<u8>) {
        write!(out, "{}", self.headers)
            .expect("A Write implementation panicked while formatting headers");

        match &self.body {
            MessageBody::Mime(p) => p.format(out),
            MessageBody::Raw(r) => {
                out.extend_from_slice(b"\r\n");
                out.extend_from_slice(r);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use pretty_assertions::assert_eq;

    use crate::message::{header, mailbox::Mailbox, Message};

    // Tue, 15 Nov 1994 08:12:31 GMT
    fn test_date() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(784887151)
    }

    #[test]
    fn email_missing_originator() {
        assert!(Message::builder()
            .body(String::from("Happy new year!"))
            .is_err());
    }

    #[test]
    fn email_minimal_message() {
        assert!(Message::builder()
            .from("NoBody <nobody@domain.tld>".parse().unwrap())
            .to("NoBody <nobody@domain.tld>".parse().unwrap())
            .body(String::from("Happy new year!"))
            .is_ok());
    }

    #[test]
    fn email_missing_sender() {
        assert!(Message::builder()
            .from("NoBody <nobody@domain.tld>".parse().unwrap())
            .from("AnyBody <anybody@domain.tld>".parse().unwrap())
            .body(String::from("Happy new year!"))
            .is_err());
    }

    #[test]
    fn email_message() {
        let email = Message::builder()
            .date(test_date())
            .header(header::From(
                vec![Mailbox::new(
                    Some("Каи".into()),
                    "kayo@example.com".parse().unwrap(),
                )]
                .into(),
            ))
            .header(header::To(
                vec!["Pony O.P. <pony@domain.tld>".parse().unwrap()].into(),
            ))
            .header(header::Subject::from(String::from("яңа ел белән!")))
            .body(String::from("Happy new year!"))
            .unwrap();

        assert_eq!(
            String::from_utf8(email.formatted()).unwrap(),
            concat!(
                "Date: Tue, 15 Nov 1994 08:12:31 -0000\r\n",
                "From: =?utf-8?b?0JrQsNC4?= <kayo@example.com>\r\n",
                "To: \"Pony O.P.\" <pony@domain.tld>\r\n",
                "Subject: =?utf-8?b?0Y/So9CwINC10Lsg0LHQtdC705nQvSE=?=\r\n",
                "Content-Transfer-Encoding: 7bit\r\n",
                "\r\n",
                "Happy new year!"
            )
        );
    }

    #[test]
    fn envelope_is_derived_from_headers() {
        let email = Message::builder()
            .from("sender@domain.tld".parse().unwrap())
            .to("first@domain.tld".parse().unwrap())
            .cc("second@domain.tld".parse().unwrap())
            .body(String::from("Hello"))
            .unwrap();

        let recipients: Vec<String> = email
            .envelope()
            .to()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(recipients, ["first@domain.tld", "second@domain.tld"]);
        assert_eq!(
            email.envelope().from().map(ToString::to_string),
            Some("sender@domain.tld".into())
        );
    }
}
