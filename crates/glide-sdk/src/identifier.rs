//! Subjects the verification APIs can be asked about

use serde::{Deserialize, Serialize};

use crate::phone::normalize_phone_number;

/// Identifies the user a request is about.
///
/// Serializes to the provider's identifier objects: `{"phoneNumber": ...}`,
/// `{"ipAddress": ...}` or `{"userId": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserIdentifier {
    #[serde(rename = "phoneNumber")]
    Phone(String),
    #[serde(rename = "ipAddress")]
    Ip(String),
    #[serde(rename = "userId")]
    UserId(String),
}

impl UserIdentifier {
    pub fn phone(number: impl Into<String>) -> Self {
        UserIdentifier::Phone(number.into())
    }

    pub fn ip(address: impl Into<String>) -> Self {
        UserIdentifier::Ip(address.into())
    }

    pub fn user_id(id: impl Into<String>) -> Self {
        UserIdentifier::UserId(id.into())
    }

    /// The normalized phone number, for phone identifiers only.
    pub fn phone_number(&self) -> Option<String> {
        match self {
            UserIdentifier::Phone(number) => Some(normalize_phone_number(number)),
            UserIdentifier::Ip(_) | UserIdentifier::UserId(_) => None,
        }
    }

    /// Telco-finder resource URI: `tel:+<digits>`, `ipport:<addr>` or `acct:<id>`.
    pub fn telco_subject(&self) -> String {
        match self {
            UserIdentifier::Phone(number) => format!("tel:{}", normalize_phone_number(number)),
            UserIdentifier::Ip(address) => format!("ipport:{address}"),
            UserIdentifier::UserId(id) => format!("acct:{id}"),
        }
    }
}
