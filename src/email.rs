//! The email composition façade
//!
//! [`Email`] accumulates the fields of an outbound message in any order:
//! addresses, custom headers, transport parameters and the body. Calling
//! [`Email::build_mime_message`] validates the accumulated state and
//! materializes a [`Message`] ready for an SMTP transport, keeping it
//! available through [`Email::mime_message`].
//!
//! ```rust
//! use courriel::Email;
//!
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! let mut email = Email::new();
//! email
//!     .set_host_name("smtp.example.com")
//!     .set_subject("Meeting notes");
//! email
//!     .set_from("sender@example.com")?
//!     .add_to("first@example.com")?
//!     .add_cc("second@example.com")?
//!     .set_body("See you tomorrow.");
//!
//! let message = email.build_mime_message()?;
//! assert_eq!(message.envelope().to().len(), 2);
//! # Ok(())
//! # }
//! ```

use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

use crate::{
    address::{Address, Envelope},
    error,
    message::{
        header::{ContentType, HeaderName, Headers},
        Mailbox, Message, MultiPart, SinglePart,
    },
    session::{Credentials, Session, Tls, SMTP_PORT},
    Error,
};

/// Default charset applied to the subject and a text body
const DEFAULT_CHARSET: &str = "utf-8";

/// The body of a message under composition
///
/// The variants are mutually exclusive; setting one replaces the other.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Content {
    /// No body chosen yet, an empty text body is produced
    #[default]
    Empty,
    /// A plain text body, encoded with the configured charset
    Text(String),
    /// A pre-built multipart tree, attached as-is
    Multipart(MultiPart),
}

/// A mutable accumulator for an outbound email
///
/// Mutators validate their input immediately and leave the accumulator
/// untouched on failure. Missing required state is only reported when
/// the message is finalized, or when a mail session is materialized.
#[derive(Debug, Clone, Default)]
pub struct Email {
    from: Option<Mailbox>,
    reply_to: Vec<Mailbox>,
    to: Vec<Mailbox>,
    cc: Vec<Mailbox>,
    bcc: Vec<Mailbox>,
    headers: Headers,
    subject: Option<String>,
    sent_date: Option<SystemTime>,
    charset: Option<String>,
    content: Content,
    bounce_address: Option<Address>,
    host: Option<String>,
    port: Option<u16>,
    authentication: Option<Credentials>,
    socket_connection_timeout: Option<Duration>,
    socket_timeout: Option<Duration>,
    tls: Option<Tls>,
    session: Option<Arc<Session>>,
    message: Option<Message>,
}

impl Email {
    /// Creates an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sender address, replacing any prior one
    pub fn set_from(&mut self, address: &str) -> Result<&mut Self, Error> {
        let mailbox = address.parse::<Mailbox>()?;
        self.from = Some(mailbox);
        Ok(self)
    }

    /// Sets the sender address with a display name
    pub fn set_from_named(&mut self, address: &str, name: &str) -> Result<&mut Self, Error> {
        let email = address.parse::<Address>()?;
        self.from = Some(Mailbox::new(Some(name.to_owned()), email));
        Ok(self)
    }

    /// Appends a `To` recipient
    pub fn add_to(&mut self, address: &str) -> Result<&mut Self, Error> {
        let mailbox = address.parse::<Mailbox>()?;
        self.to.push(mailbox);
        Ok(self)
    }

    /// Appends a `To` recipient with a display name
    pub fn add_to_named(&mut self, address: &str, name: &str) -> Result<&mut Self, Error> {
        let email = address.parse::<Address>()?;
        self.to.push(Mailbox::new(Some(name.to_owned()), email));
        Ok(self)
    }

    /// Appends a `Cc` recipient
    pub fn add_cc(&mut self, address: &str) -> Result<&mut Self, Error> {
        let mailbox = address.parse::<Mailbox>()?;
        self.cc.push(mailbox);
        Ok(self)
    }

    /// Appends a `Cc` recipient with a display name
    pub fn add_cc_named(&mut self, address: &str, name: &str) -> Result<&mut Self, Error> {
        let email = address.parse::<Address>()?;
        self.cc.push(Mailbox::new(Some(name.to_owned()), email));
        Ok(self)
    }

    /// Appends `Bcc` recipients, in argument order
    ///
    /// All addresses are parsed before any is stored, so a malformed one
    /// leaves the list untouched.
    pub fn add_bcc<'a, I>(&mut self, addresses: I) -> Result<&mut Self, Error>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let parsed = addresses
            .into_iter()
            .map(str::parse::<Mailbox>)
            .collect::<Result<Vec<_>, _>>()?;
        self.bcc.extend(parsed);
        Ok(self)
    }

    /// Appends a `Bcc` recipient with a display name
    pub fn add_bcc_named(&mut self, address: &str, name: &str) -> Result<&mut Self, Error> {
        let email = address.parse::<Address>()?;
        self.bcc.push(Mailbox::new(Some(name.to_owned()), email));
        Ok(self)
    }

    /// Appends a `Reply-To` address
    pub fn add_reply_to(&mut self, address: &str) -> Result<&mut Self, Error> {
        let mailbox = address.parse::<Mailbox>()?;
        self.reply_to.push(mailbox);
        Ok(self)
    }

    /// Appends a `Reply-To` address with a display name
    ///
    /// The address part stays retrievable independently of the name:
    ///
    /// ```
    /// # use courriel::Email;
    /// # fn main() -> Result<(), courriel::Error> {
    /// let mut email = Email::new();
    /// email.add_reply_to_named("liaison@example.com", "John Doe")?;
    /// assert_eq!(email.reply_to()[0].email.to_string(), "liaison@example.com");
    /// # Ok(())
    /// # }
    /// ```
    pub fn add_reply_to_named(&mut self, address: &str, name: &str) -> Result<&mut Self, Error> {
        let email = address.parse::<Address>()?;
        self.reply_to
            .push(Mailbox::new(Some(name.to_owned()), email));
        Ok(self)
    }

    /// The sender mailbox, when one was set
    pub fn from(&self) -> Option<&Mailbox> {
        self.from.as_ref()
    }

    /// The `To` recipients, in insertion order
    pub fn to(&self) -> &[Mailbox] {
        &self.to
    }

    /// The `Cc` recipients, in insertion order
    pub fn cc(&self) -> &[Mailbox] {
        &self.cc
    }

    /// The `Bcc` recipients, in insertion order
    pub fn bcc(&self) -> &[Mailbox] {
        &self.bcc
    }

    /// The `Reply-To` addresses, in insertion order
    pub fn reply_to(&self) -> &[Mailbox] {
        &self.reply_to
    }

    /// Stores a custom header, overwriting a prior value for the same name
    ///
    /// Both the name and the value must be non-empty, and the name must
    /// be a valid RFC 5322 header name.
    pub fn add_header(&mut self, name: &str, value: &str) -> Result<&mut Self, Error> {
        let name = HeaderName::new(name.to_owned())?;
        if value.is_empty() {
            return Err(error::invalid_argument("header value must not be empty"));
        }
        self.headers.set_raw(name, value.to_owned());
        Ok(self)
    }

    /// The stored value of a custom header
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get_raw(name)
    }

    /// All custom headers, in insertion order
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Sets the subject line
    pub fn set_subject<S: Into<String>>(&mut self, subject: S) -> &mut Self {
        self.subject = Some(subject.into());
        self
    }

    /// The subject line, when one was set
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Sets the `Date` header value used at build time
    ///
    /// When unset, the build stamps the current wall-clock instant.
    pub fn set_sent_date(&mut self, date: SystemTime) -> &mut Self {
        self.sent_date = Some(date);
        self
    }

    /// The configured sent date, when one was set
    pub fn sent_date(&self) -> Option<SystemTime> {
        self.sent_date
    }

    /// Sets the charset applied to the text body
    pub fn set_charset<S: Into<String>>(&mut self, charset: S) -> &mut Self {
        self.charset = Some(charset.into());
        self
    }

    /// The configured charset, `utf-8` unless overridden
    pub fn charset(&self) -> &str {
        self.charset.as_deref().unwrap_or(DEFAULT_CHARSET)
    }

    /// Sets the name of the outbound SMTP server
    pub fn set_host_name<S: Into<String>>(&mut self, host: S) -> &mut Self {
        self.host = Some(host.into());
        self
    }

    /// The SMTP server name
    ///
    /// Reads through to the session when one is present, whether it was
    /// injected or materialized.
    pub fn host_name(&self) -> Option<&str> {
        match &self.session {
            Some(session) => Some(session.server()),
            None => self.host.as_deref(),
        }
    }

    /// Sets the SMTP port
    ///
    /// Port 0 is rejected as an invalid argument.
    pub fn set_smtp_port(&mut self, port: u16) -> Result<&mut Self, Error> {
        if port == 0 {
            return Err(error::invalid_argument("smtp port must be non-zero"));
        }
        self.port = Some(port);
        Ok(self)
    }

    /// The SMTP port, reading through to the session when one is present
    pub fn smtp_port(&self) -> u16 {
        match &self.session {
            Some(session) => session.port(),
            None => self.port.unwrap_or(SMTP_PORT),
        }
    }

    /// Stores the SMTP AUTH credentials
    ///
    /// Authentication is only enabled when both a username and a
    /// password are provided.
    pub fn set_authentication<U, P>(&mut self, username: U, password: P) -> &mut Self
    where
        U: Into<String>,
        P: Into<String>,
    {
        self.authentication = Some(Credentials::new(username.into(), password.into()));
        self
    }

    /// Sets the TCP connect timeout of the transport
    pub fn set_socket_connection_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.socket_connection_timeout = Some(timeout);
        self
    }

    /// The TCP connect timeout, reading through to the session when one
    /// is present
    pub fn socket_connection_timeout(&self) -> Option<Duration> {
        match &self.session {
            Some(session) => session.connection_timeout(),
            None => self.socket_connection_timeout,
        }
    }

    /// Sets the socket read/write timeout of the transport
    pub fn set_socket_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.socket_timeout = Some(timeout);
        self
    }

    /// The socket read/write timeout, reading through to the session
    /// when one is present
    pub fn socket_timeout(&self) -> Option<Duration> {
        match &self.session {
            Some(session) => session.timeout(),
            None => self.socket_timeout,
        }
    }

    /// Sets the TLS mode of the transport
    pub fn set_tls(&mut self, tls: Tls) -> &mut Self {
        self.tls = Some(tls);
        self
    }

    /// The TLS mode, reading through to the session when one is present
    pub fn tls(&self) -> Tls {
        match &self.session {
            Some(session) => session.tls(),
            None => self.tls.unwrap_or_default(),
        }
    }

    /// Sets the envelope bounce address, overriding the sender as the
    /// envelope reverse-path
    pub fn set_bounce_address(&mut self, address: &str) -> Result<&mut Self, Error> {
        self.bounce_address = Some(address.parse::<Address>()?);
        Ok(self)
    }

    /// The configured bounce address, when one was set
    pub fn bounce_address(&self) -> Option<&Address> {
        self.bounce_address.as_ref()
    }

    /// Injects an externally supplied session
    ///
    /// The session may be shared with other accumulators; it is never
    /// mutated. Transport getters read through to it from now on.
    pub fn set_mail_session(&mut self, session: Arc<Session>) -> &mut Self {
        self.session = Some(session);
        self
    }

    /// Returns the mail session, materializing one on first demand
    ///
    /// An injected session is returned as-is. Otherwise a session is
    /// built from the current transport parameters and cached; this
    /// requires a host name and fails with a configuration error when
    /// none was set.
    pub fn mail_session(&mut self) -> Result<Arc<Session>, Error> {
        if let Some(session) = &self.session {
            return Ok(Arc::clone(session));
        }

        let host = match self.host.as_deref() {
            Some(host) if !host.is_empty() => host,
            _ => {
                return Err(error::configuration(
                    "mail host not configured; set a host name or inject a session",
                ))
            }
        };

        let mut builder = Session::builder(host)
            .port(self.port.unwrap_or(SMTP_PORT))
            .connection_timeout(self.socket_connection_timeout)
            .timeout(self.socket_timeout)
            .tls(self.tls.unwrap_or_default());
        if let Some(credentials) = &self.authentication {
            builder = builder.credentials(credentials.clone());
        }

        let session = Arc::new(builder.build());

        #[cfg(feature = "tracing")]
        tracing::debug!(
            server = session.server(),
            port = session.port(),
            "mail session materialized"
        );

        self.session = Some(Arc::clone(&session));
        Ok(session)
    }

    /// Stores a pre-built multipart body
    ///
    /// Replaces a plain text body set through [`Email::set_body`].
    pub fn set_content(&mut self, content: MultiPart) -> &mut Self {
        self.content = Content::Multipart(content);
        self
    }

    /// Stores a plain text body
    ///
    /// Replaces a multipart body set through [`Email::set_content`]. The
    /// configured charset is applied at build time.
    pub fn set_body<S: Into<String>>(&mut self, body: S) -> &mut Self {
        self.content = Content::Text(body.into());
        self
    }

    /// The body stored so far
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Validates the accumulated state and materializes the MIME message
    ///
    /// The checks run in order, first failure wins:
    ///
    /// 1. a session is obtainable ([`Email::mail_session`]),
    /// 2. a sender address is set,
    /// 3. at least one recipient exists across to, cc and bcc.
    ///
    /// On success the message is cached on the accumulator and also
    /// returned; it stays available through [`Email::mime_message`].
    /// Building again re-validates the current state and replaces the
    /// cached message. All failures are reported as configuration
    /// errors and leave no partial message behind.
    pub fn build_mime_message(&mut self) -> Result<&Message, Error> {
        let _session = self.mail_session()?;

        let from = self
            .from
            .clone()
            .ok_or_else(|| error::configuration("from address required"))?;

        if self.to.is_empty() && self.cc.is_empty() && self.bcc.is_empty() {
            return Err(error::configuration(
                "at least one recipient (to, cc or bcc) required",
            ));
        }

        // The envelope carries every recipient class; bcc stays out of
        // the headers below.
        let recipients = self
            .to
            .iter()
            .chain(self.cc.iter())
            .chain(self.bcc.iter())
            .map(|mbox| mbox.email.clone())
            .collect();
        let reverse_path = self
            .bounce_address
            .clone()
            .unwrap_or_else(|| from.email.clone());
        let envelope = Envelope::new(Some(reverse_path), recipients)?;

        let mut builder = Message::builder().envelope(envelope).from(from);
        for mbox in &self.to {
            builder = builder.to(mbox.clone());
        }
        for mbox in &self.cc {
            builder = builder.cc(mbox.clone());
        }
        for mbox in &self.reply_to {
            builder = builder.reply_to(mbox.clone());
        }
        if let Some(subject) = &self.subject {
            builder = builder.subject(subject.clone());
        }
        builder = builder.date(self.sent_date.unwrap_or_else(SystemTime::now));
        for (name, value) in self.headers.iter() {
            builder = builder.raw_header(name.clone(), value.to_owned());
        }

        let message = match &self.content {
            Content::Multipart(part) => builder.multipart(part.clone())?,
            Content::Text(text) => {
                let content_type =
                    ContentType::parse(&format!("text/plain; charset={}", self.charset()))
                        .map_err(error::configuration)?;
                builder.singlepart(
                    SinglePart::builder()
                        .content_type(content_type)
                        .body(text.clone()),
                )?
            }
            Content::Empty => builder.body(String::new())?,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            recipients = message.envelope().to().len(),
            "mime message assembled"
        );

        Ok(self.message.insert(message))
    }

    /// The message produced by the last successful
    /// [`Email::build_mime_message`] call
    pub fn mime_message(&self) -> Option<&Message> {
        self.message.as_ref()
    }
}
