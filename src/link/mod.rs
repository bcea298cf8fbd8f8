//! Personalization links
//!
//! Encodes greeting payloads into URL-safe tokens, decodes them back, and
//! assembles the share links that carry them.
//!
//! - [`codec`]: base64 token alphabet
//! - [`payload`]: [`Greeting`] and [`CoupleCard`] payloads
//! - [`share`]: `?u=` link assembly and extraction

pub mod codec;
pub mod payload;
pub mod share;

pub use codec::{DecodeFailure, decode_token, encode_token};
pub use payload::{CoupleCard, FIELD_DELIMITER, Greeting, Personalization};
pub use share::{TOKEN_PARAM, resolve_or, share_link, token_from_query, whatsapp_share_url};
