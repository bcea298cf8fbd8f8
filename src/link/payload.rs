//! Personalization payloads carried by share tokens.
//!
//! Two payload kinds exist: a [`Greeting`] holding a single display name,
//! and a [`CoupleCard`] holding two names and the wedding date. Both go
//! through the same [`Personalization`] encode/decode path.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::{LinkError, PhaseError};
use crate::observability::metrics;
use crate::phase::target::parse_instant;

use super::codec::{self, DecodeFailure};

/// Separator between multi-field payload fields.
pub const FIELD_DELIMITER: char = '|';

/// A payload that can be carried in a share token.
pub trait Personalization: Sized {
    /// Payload kind used in logs and metrics.
    const KIND: &'static str;

    /// Serializes the payload into the plain text that gets encoded.
    fn to_plain(&self) -> String;

    /// Rebuilds the payload from decoded plain text.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeFailure`] when the text does not have the
    /// payload's shape.
    fn from_plain(plain: String) -> Result<Self, DecodeFailure>;

    /// Encodes the payload into a URL-safe token.
    fn encode(&self) -> String {
        codec::encode_token(&self.to_plain())
    }

    /// Decodes a token, returning `None` for anything malformed or foreign.
    ///
    /// Never panics and never surfaces an error; the failure reason is
    /// logged at debug level and counted.
    fn decode(token: &str) -> Option<Self> {
        match codec::decode_token(token).and_then(Self::from_plain) {
            Ok(payload) => Some(payload),
            Err(failure) => {
                debug!(kind = Self::KIND, reason = failure.reason(), %failure, "token did not decode");
                metrics::record_decode_failure(Self::KIND, failure.reason());
                None
            }
        }
    }
}

// ============================================================================
// Greeting
// ============================================================================

/// A single display name, e.g. the recipient of a New Year card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Greeting {
    /// Name shown in the greeting.
    pub name: String,
}

impl Greeting {
    /// Creates a greeting for `name`. Any string is accepted.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Personalization for Greeting {
    const KIND: &'static str = "greeting";

    fn to_plain(&self) -> String {
        self.name.clone()
    }

    fn from_plain(plain: String) -> Result<Self, DecodeFailure> {
        Ok(Self { name: plain })
    }
}

// ============================================================================
// CoupleCard
// ============================================================================

/// Two partner names plus the wedding date as an ISO string.
///
/// Fields may not contain [`FIELD_DELIMITER`], which keeps every
/// constructible card round-trippable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoupleCard {
    partner_a: String,
    partner_b: String,
    date: String,
}

impl CoupleCard {
    /// Number of delimiter-separated fields in an encoded card.
    pub const FIELDS: usize = 3;

    /// Creates a card.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::DelimiterInField`] if any field contains the
    /// field delimiter.
    pub fn new(
        partner_a: impl Into<String>,
        partner_b: impl Into<String>,
        date: impl Into<String>,
    ) -> Result<Self, LinkError> {
        let card = Self {
            partner_a: partner_a.into(),
            partner_b: partner_b.into(),
            date: date.into(),
        };

        for (field, value) in [
            ("partner_a", &card.partner_a),
            ("partner_b", &card.partner_b),
            ("date", &card.date),
        ] {
            if value.contains(FIELD_DELIMITER) {
                return Err(LinkError::DelimiterInField {
                    field,
                    delimiter: FIELD_DELIMITER,
                });
            }
        }

        Ok(card)
    }

    /// Card shown when no usable token is present: placeholder names and
    /// `now` as the date, which yields a zero countdown.
    #[must_use]
    pub fn placeholder(now: DateTime<Utc>) -> Self {
        Self {
            partner_a: "Partner 1".to_string(),
            partner_b: "Partner 2".to_string(),
            date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// First partner's name.
    #[must_use]
    pub fn partner_a(&self) -> &str {
        &self.partner_a
    }

    /// Second partner's name.
    #[must_use]
    pub fn partner_b(&self) -> &str {
        &self.partner_b
    }

    /// The date exactly as carried in the token.
    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Parses the carried date.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError::InvalidInstant`] if the date is not RFC 3339 or
    /// a plain `YYYY-MM-DD[THH:MM:SS]` local date.
    pub fn wedding_date(&self) -> Result<DateTime<Utc>, PhaseError> {
        parse_instant(&self.date)
    }
}

impl Personalization for CoupleCard {
    const KIND: &'static str = "couple";

    fn to_plain(&self) -> String {
        format!(
            "{}{FIELD_DELIMITER}{}{FIELD_DELIMITER}{}",
            self.partner_a, self.partner_b, self.date
        )
    }

    fn from_plain(plain: String) -> Result<Self, DecodeFailure> {
        let parts: Vec<&str> = plain.split(FIELD_DELIMITER).collect();
        match parts.as_slice() {
            [a, b, date] => Ok(Self {
                partner_a: (*a).to_string(),
                partner_b: (*b).to_string(),
                date: (*date).to_string(),
            }),
            _ => Err(DecodeFailure::Arity {
                expected: Self::FIELDS,
                found: parts.len(),
            }),
        }
    }
}
