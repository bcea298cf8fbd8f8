//! URL-safe token codec.
//!
//! Tokens are standard base64 with the URL-safe substitutions applied
//! (`+` → `-`, `/` → `_`) and padding stripped. Decoding accepts either
//! alphabet, with or without padding, so tokens built by other encoders
//! with the same scheme still decode.
//!
//! The bytes under the base64 are UTF-8. Encoders that base64 Latin-1
//! bytes (a browser's `btoa`, for one) agree with this codec on ASCII names
//! only: their token for `é` is the single byte `0xE9`, which is not UTF-8,
//! so it decodes to [`DecodeFailure::NotUtf8`] rather than to a mangled
//! name.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use thiserror::Error;

/// Engine for the token alphabet: URL-safe, unpadded on encode, lenient on decode.
const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Why a token did not decode.
///
/// Never returned from the payload API; payload decoding collapses it into
/// `None` after logging it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeFailure {
    /// Not valid base64 in either alphabet.
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decoded bytes are not UTF-8.
    #[error("decoded bytes are not valid UTF-8")]
    NotUtf8,

    /// Wrong number of delimiter-separated fields.
    #[error("expected {expected} fields, found {found}")]
    Arity {
        /// Fields the payload kind requires
        expected: usize,
        /// Fields present in the token
        found: usize,
    },
}

impl DecodeFailure {
    /// Short label for metrics and logs.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Base64(_) => "base64",
            Self::NotUtf8 => "utf8",
            Self::Arity { .. } => "arity",
        }
    }
}

/// Encodes plain text into a token.
///
/// The empty string encodes to the empty token.
#[must_use]
pub fn encode_token(plain: &str) -> String {
    TOKEN_ENGINE.encode(plain.as_bytes())
}

/// Decodes a token back into plain text.
///
/// Surrounding whitespace is ignored and standard-alphabet characters are
/// mapped onto the URL-safe ones before decoding.
///
/// # Errors
///
/// Returns [`DecodeFailure::Base64`] for invalid base64 and
/// [`DecodeFailure::NotUtf8`] when the bytes are not text.
pub fn decode_token(token: &str) -> Result<String, DecodeFailure> {
    let normalized: String = token
        .trim()
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = TOKEN_ENGINE.decode(normalized)?;
    String::from_utf8(bytes).map_err(|_| DecodeFailure::NotUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_without_padding() {
        // "Ann" is 3 bytes (no padding), "Anna" is 4 bytes (would pad "==")
        assert_eq!(encode_token("Ann"), "QW5u");
        assert_eq!(encode_token("Anna"), "QW5uYQ");
    }

    #[test]
    fn uses_url_safe_substitutions() {
        // UTF-8 EF AF BF is "76+/" in the standard alphabet
        let token = encode_token("\u{fbff}");
        assert!(!token.contains('+'));
        assert!(!token.contains('/'));
        assert!(!token.contains('='));
        assert_eq!(decode_token(&token).unwrap(), "\u{fbff}");
    }

    #[test]
    fn empty_round_trips_to_empty() {
        assert_eq!(encode_token(""), "");
        assert_eq!(decode_token("").unwrap(), "");
    }

    #[test]
    fn accepts_padded_and_standard_alphabet() {
        assert_eq!(decode_token("QW5uYQ==").unwrap(), "Anna");
        // standard-alphabet token for "?>?" is "Pz4/"
        assert_eq!(decode_token("Pz4/").unwrap(), "?>?");
        assert_eq!(decode_token("Pz4_").unwrap(), "?>?");
    }

    #[test]
    fn ignores_surrounding_whitespace() {
        assert_eq!(decode_token("  QW5u\n").unwrap(), "Ann");
    }

    #[test]
    fn rejects_invalid_base64() {
        let err = decode_token("not base64!").unwrap_err();
        assert_eq!(err.reason(), "base64");
    }

    #[test]
    fn latin1_tokens_only_agree_on_ascii() {
        // Latin-1 "Zoé" is 5A 6F E9
        assert_eq!(decode_token("Wm_p"), Err(DecodeFailure::NotUtf8));
        // UTF-8 "Zoé" is 5A 6F C3 A9
        assert_eq!(encode_token("Zoé"), "Wm_DqQ");
        assert_eq!(decode_token("Wm9l").unwrap(), "Zoe");
    }

    #[test]
    fn rejects_non_utf8() {
        // 0xff 0xfe
        let err = decode_token("__4").unwrap_err();
        assert_eq!(err, DecodeFailure::NotUtf8);
    }
}
