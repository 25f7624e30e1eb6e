//! courriel is an email composition library.
//!
//! It provides a mutable [`Email`] accumulator that collects the fields
//! of an outbound message in any order: sender, recipients, custom
//! headers, transport parameters and the body. On demand the
//! accumulated state is validated and materialized into a MIME
//! [`Message`] ready for an SMTP transport, together with a [`Session`]
//! describing how to reach the relay. Sending the message is
//! deliberately out of scope; the built message and the session carry
//! everything a transport needs.
//!
//! ## Example
//!
//! ```rust
//! use courriel::Email;
//!
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! let mut email = Email::new();
//! email
//!     .set_host_name("smtp.example.com")
//!     .set_subject("Happy new year");
//! email
//!     .set_from("nobody@domain.tld")?
//!     .add_to("hei@domain.tld")?
//!     .set_body("Be happy!");
//!
//! email.build_mime_message()?;
//!
//! let message = email.mime_message().expect("just built");
//! let wire = String::from_utf8(message.formatted())?;
//! assert!(wire.starts_with("From: nobody@domain.tld\r\n"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! * **tracing**: emit debug events through the [tracing](https://docs.rs/tracing)
//!   crate when sessions are materialized and messages assembled

#![forbid(unsafe_code)]
#![deny(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod address;
mod email;
mod error;
pub mod message;
pub mod session;

pub use crate::{
    address::Address,
    email::{Content, Email},
    error::Error,
    message::Message,
    session::Session,
};
