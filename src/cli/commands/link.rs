//! `link encode` / `link decode`.
//!
//! Both accept an experience file: `encode` takes the share origin, path
//! and message from its `share` section, `decode` falls back to its
//! `defaults` section when the input carries no usable token.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::cli::args::{LinkDecodeArgs, LinkEncodeArgs, OutputFormat, PayloadKind};
use crate::config::DefaultsConfig;
use crate::error::{KeepsakeError, LinkError};
use crate::link::share::DEFAULT_SHARE_MESSAGE;
use crate::link::{
    CoupleCard, Greeting, Personalization, share_link, token_from_query, whatsapp_share_url,
};
use crate::phase::days_until;

/// Encodes the payload described by `args` and prints the token, the share
/// link, or a WhatsApp share URL.
///
/// Command-line `--origin`, `--path` and `--message` win over the
/// experience file's `share` section.
///
/// # Errors
///
/// Returns `LinkError::DelimiterInField` if a couple field contains the
/// delimiter, a configuration error if the experience file does not load,
/// or a usage error if neither payload form is complete or a link option is
/// given without any origin.
pub fn encode(args: &LinkEncodeArgs) -> Result<(), KeepsakeError> {
    let token = match (&args.name, &args.partner_a, &args.partner_b, &args.date) {
        (Some(name), None, None, None) => Greeting::new(name.as_str()).encode(),
        (None, Some(a), Some(b), Some(date)) => {
            CoupleCard::new(a.as_str(), b.as_str(), date.as_str())?.encode()
        }
        _ => {
            return Err(KeepsakeError::Usage(
                "pass either --name or all of --partner-a, --partner-b, --date".to_string(),
            ));
        }
    };
    tracing::debug!(token_len = token.len(), "payload encoded");

    let share = match &args.config {
        Some(path) => super::load_experience(path)?.share.clone(),
        None => None,
    };

    let Some(origin) = args
        .origin
        .as_deref()
        .or_else(|| share.as_ref().map(|s| s.origin.as_str()))
    else {
        if args.path.is_some() || args.whatsapp {
            return Err(KeepsakeError::Usage(
                "--path and --whatsapp need --origin or an experience file with a share section"
                    .to_string(),
            ));
        }
        println!("{token}");
        return Ok(());
    };

    let path = args
        .path
        .as_deref()
        .or_else(|| share.as_ref().map(|s| s.path.as_str()))
        .unwrap_or("/");
    let link = share_link(origin, path, &token);

    if args.whatsapp {
        let message = args
            .message
            .as_deref()
            .or_else(|| share.as_ref().and_then(|s| s.message.as_deref()))
            .unwrap_or(DEFAULT_SHARE_MESSAGE);
        println!("{}", whatsapp_share_url(message, &link));
    } else {
        println!("{link}");
    }
    Ok(())
}

/// Decodes a token, query string, or URL and prints the payload.
///
/// An empty input is the empty token, which decodes to the empty greeting.
/// With an experience file, input that does not decode shows the
/// configured defaults instead and the output is marked `from_default`.
///
/// # Errors
///
/// Returns `LinkError::Undecodable` when the input carries no token of the
/// requested kind and no experience file supplies defaults.
pub fn decode(args: &LinkDecodeArgs) -> Result<(), KeepsakeError> {
    let defaults = match &args.config {
        Some(path) => Some(
            super::load_experience(path)?
                .defaults
                .clone()
                .unwrap_or_default(),
        ),
        None => None,
    };
    let token = extract_token(&args.input);
    let now = Utc::now();

    let value = match args.kind {
        PayloadKind::Greeting => {
            let decoded = token.as_deref().and_then(Greeting::decode);
            let (greeting, from_default) = match (decoded, &defaults) {
                (Some(greeting), _) => (greeting, false),
                (None, Some(defaults)) => (default_greeting(defaults), true),
                (None, None) => return Err(LinkError::Undecodable(Greeting::KIND).into()),
            };
            mark_default(json!({ "kind": Greeting::KIND, "name": greeting.name }), from_default)
        }
        PayloadKind::Couple => {
            let decoded = token.as_deref().and_then(CoupleCard::decode);
            let (card, from_default) = match (decoded, &defaults) {
                (Some(card), _) => (card, false),
                (None, Some(defaults)) => (default_couple(defaults, now)?, true),
                (None, None) => return Err(LinkError::Undecodable(CoupleCard::KIND).into()),
            };
            let days = card.wedding_date().ok().map(|date| days_until(now, date));
            mark_default(
                json!({
                    "kind": CoupleCard::KIND,
                    "partner_a": card.partner_a(),
                    "partner_b": card.partner_b(),
                    "date": card.date(),
                    "days_until": days,
                }),
                from_default,
            )
        }
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&value)?),
        OutputFormat::Human => print_human(&value),
    }
    Ok(())
}

fn mark_default(mut value: serde_json::Value, from_default: bool) -> serde_json::Value {
    if from_default && let Some(fields) = value.as_object_mut() {
        fields.insert("from_default".to_string(), serde_json::Value::Bool(true));
    }
    value
}

/// Greeting shown for pages opened without a usable token.
fn default_greeting(defaults: &DefaultsConfig) -> Greeting {
    Greeting::new(defaults.display_name.clone().unwrap_or_default())
}

/// Couple card shown for pages opened without a usable token: configured
/// names over the placeholder ones, dated `now`.
fn default_couple(defaults: &DefaultsConfig, now: DateTime<Utc>) -> Result<CoupleCard, LinkError> {
    let placeholder = CoupleCard::placeholder(now);
    CoupleCard::new(
        defaults.partner_a.as_deref().unwrap_or(placeholder.partner_a()),
        defaults.partner_b.as_deref().unwrap_or(placeholder.partner_b()),
        placeholder.date(),
    )
}

/// Accepts a bare token or anything carrying a `u` query parameter.
fn extract_token(input: &str) -> Option<String> {
    let input = input.trim();
    if input.contains('?') {
        return token_from_query(input);
    }
    // padded tokens contain '=' too
    token_from_query(input).or_else(|| Some(input.to_string()))
}

fn print_human(value: &serde_json::Value) {
    let Some(fields) = value.as_object() else {
        return;
    };
    for (key, field) in fields {
        match field {
            serde_json::Value::String(s) => println!("{key}: {s}"),
            serde_json::Value::Null => {}
            other => println!("{key}: {other}"),
        }
    }
}
