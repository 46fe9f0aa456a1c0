//! The `cashless:<user_id>:<user_name>` text written to NFC tags and
//! embedded in payment QR codes.
//!
//! The payload carries no checksum or signature. Anyone can write a tag that
//! names any user, so a decoded tag may only pre-fill a payment; it never
//! authorizes one.

use std::fmt;

pub const PAYLOAD_PREFIX: &str = "cashless:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentTag {
    pub user_id: String,
    pub user_name: String,
}

impl PaymentTag {
    pub fn new(user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
        }
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Returns `None` for anything that is not a `cashless:` payload with a
    /// non-empty user id. Colons after the id belong to the name.
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.trim().strip_prefix(PAYLOAD_PREFIX)?;
        let (user_id, user_name) = rest.split_once(':')?;

        if user_id.is_empty() {
            return None;
        }

        Some(Self::new(user_id, user_name))
    }
}

impl fmt::Display for PaymentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}:{}", PAYLOAD_PREFIX, self.user_id, self.user_name)
    }
}
