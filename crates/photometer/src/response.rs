//! Reply tokens and formatted replies.

use core::fmt::{self, Display, Formatter, Write};

use heapless::String;

/// Largest reply that fits in one ACK payload.
pub const MAX_RESPONSE_LEN: usize = 32;

/// Owned reply text.
pub type ReplyText = String<MAX_RESPONSE_LEN>;

/// Fixed reply tokens of the command protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Token {
    Ok,
    /// Malformed command, wrong state, or a hardware fault.
    Error,
    /// The requested value is not present.
    NotAvailable,
    /// The slot index or value is outside its range.
    OutOfRange,
    True,
    False,
    /// A measurement was started with no calibration slot selected.
    NoConfSelected,
    /// The supply voltage sagged during a measurement.
    CheckFailed,
    /// A measurement with a sticky error was stopped.
    ErrorsCleared,
}

impl Token {
    pub const fn as_str(self) -> &'static str {
        match self {
            Token::Ok => "OK",
            Token::Error => "ERROR",
            Token::NotAvailable => "NA",
            Token::OutOfRange => "OUT_OF_RANGE",
            Token::True => "TRUE",
            Token::False => "FALSE",
            Token::NoConfSelected => "NO_CONF_SELECTED",
            Token::CheckFailed => "CHECK_FAILED",
            Token::ErrorsCleared => "ERRORS_CLEARED",
        }
    }
}

impl From<bool> for Token {
    fn from(value: bool) -> Self {
        if value {
            Token::True
        } else {
            Token::False
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the processor queues for the next ACK.
#[derive(Clone, Debug, PartialEq)]
pub enum Response {
    Token(Token),
    Text(ReplyText),
    /// Nothing is queued.
    Silent,
}

impl Response {
    /// Format `args` into a reply; [`Token::Error`] if it does not fit.
    pub fn format(args: fmt::Arguments<'_>) -> Self {
        let mut text = ReplyText::new();
        match text.write_fmt(args) {
            Ok(()) => Response::Text(text),
            Err(_) => Response::Token(Token::Error),
        }
    }

    /// The bytes to put in the ACK payload, if any.
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Response::Token(token) => Some(token.as_str().as_bytes()),
            Response::Text(text) => Some(text.as_bytes()),
            Response::Silent => None,
        }
    }
}

impl From<Token> for Response {
    fn from(token: Token) -> Self {
        Response::Token(token)
    }
}

impl Display for Response {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Response::Token(token) => token.fmt(f),
            Response::Text(text) => f.write_str(text),
            Response::Silent => Ok(()),
        }
    }
}

#[cfg(test)]
mod test {
    extern crate std;
    use super::{Response, Token};
    use std::string::ToString;

    #[test]
    fn token_text() {
        assert_eq!(Token::NotAvailable.to_string(), "NA");
        assert_eq!(Token::from(true), Token::True);
        assert_eq!(
            Response::from(Token::NoConfSelected).payload(),
            Some(&b"NO_CONF_SELECTED"[..])
        );
        assert_eq!(Response::Silent.payload(), None);
    }

    #[test]
    fn formatted_reply_must_fit() {
        assert_eq!(
            Response::format(format_args!("{:.6}", 165.0f32)).to_string(),
            "165.000000"
        );
        assert_eq!(
            Response::format(format_args!("{:.6}", f32::MAX)),
            Response::Token(Token::Error)
        );
    }
}
