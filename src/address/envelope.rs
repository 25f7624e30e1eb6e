use super::Address;
use crate::{
    error,
    message::header::{self, Headers},
    message::Mailbox,
    Error,
};

/// Simple email envelope representation
///
/// The envelope is what the transport layer actually routes on: a
/// reverse-path (bounce destination) and the forward-paths of every
/// recipient, including the blind-carbon-copy ones that never appear in
/// the transmitted headers.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Envelope {
    /// The envelope recipients' addresses
    ///
    /// This can not be empty.
    forward_path: Vec<Address>,
    /// The envelope sender address
    reverse_path: Option<Address>,
}

impl Envelope {
    /// Creates a new envelope, which may fail if `to` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::str::FromStr;
    /// # use courriel::Address;
    /// # use courriel::address::Envelope;
    ///
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// let sender = Address::from_str("from@email.com")?;
    /// let recipients = vec![Address::from_str("to@email.com")?];
    ///
    /// let envelope = Envelope::new(Some(sender), recipients);
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// If `to` has no elements in it.
    pub fn new(from: Option<Address>, to: Vec<Address>) -> Result<Envelope, Error> {
        if to.is_empty() {
            return Err(error::configuration(
                "at least one recipient (to, cc or bcc) required",
            ));
        }
        Ok(Envelope {
            forward_path: to,
            reverse_path: from,
        })
    }

    /// Gets the destination addresses of the envelope.
    ///
    /// This is the complete recipient set: every to, cc and bcc address,
    /// in insertion order per class.
    pub fn to(&self) -> &[Address] {
        self.forward_path.as_slice()
    }

    /// Gets the sender of the envelope.
    pub fn from(&self) -> Option<&Address> {
        self.reverse_path.as_ref()
    }
}

impl TryFrom<&Headers> for Envelope {
    type Error = Error;

    fn try_from(headers: &Headers) -> Result<Self, Self::Error> {
        let from = match headers.get::<header::Sender>() {
            // If there is a Sender, use it
            Some(sender) => Some(Mailbox::from(sender).email),
            // ... else try From
            None => match headers.get::<header::From>() {
                Some(header::From(a)) => {
                    let mut from = a.into_iter();
                    let first = from.next();
                    if from.next().is_some() {
                        return Err(error::configuration(
                            "multiple from addresses require an explicit sender",
                        ));
                    }
                    first.map(|mbox| mbox.email)
                }
                None => None,
            },
        };

        let mut to = vec![];
        for header in [
            headers.get::<header::To>().map(|h| h.0),
            headers.get::<header::Cc>().map(|h| h.0),
        ]
        .into_iter()
        .flatten()
        {
            to.extend(header.into_iter().map(|mbox| mbox.email));
        }

        Self::new(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_forward_path_is_rejected() {
        let err = Envelope::new(None, vec![]).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn keeps_recipient_order() {
        let to = vec![
            "a@example.com".parse().unwrap(),
            "b@example.com".parse().unwrap(),
        ];
        let envelope = Envelope::new(None, to.clone()).unwrap();
        assert_eq!(envelope.to(), to.as_slice());
        assert!(envelope.from().is_none());
    }
}
