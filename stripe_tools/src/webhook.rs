//! Webhook signature verification.
//!
//! Stripe signs every webhook delivery with HMAC-SHA256 over `"{timestamp}.{raw body}"`, using the endpoint's
//! shared webhook secret, and sends the result in the `Stripe-Signature` header as `t=<unix ts>,v1=<hex digest>`.
//!
//! Verification is byte-exact: callers must pass the unparsed request body, not a re-serialized object.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::{data_objects::WebhookEvent, WebhookVerificationError};

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Deliveries older (or newer) than this are rejected to blunt replay attacks.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub signature: String,
}

pub fn parse_signature_header(header: &str) -> Result<SignatureHeader, WebhookVerificationError> {
    let mut timestamp = None;
    let mut signature = None;
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", v)) => {
                let ts = v
                    .parse::<i64>()
                    .map_err(|e| WebhookVerificationError::MalformedHeader(format!("invalid timestamp: {e}")))?;
                timestamp = Some(ts);
            },
            Some(("v1", v)) => signature = Some(v.to_string()),
            _ => {},
        }
    }
    match (timestamp, signature) {
        (Some(timestamp), Some(signature)) => Ok(SignatureHeader { timestamp, signature }),
        (None, _) => Err(WebhookVerificationError::MalformedHeader("no timestamp present".to_string())),
        (_, None) => Err(WebhookVerificationError::MalformedHeader("no v1 signature present".to_string())),
    }
}

/// The hex HMAC-SHA256 digest of `"{timestamp}.{payload}"` under `secret`.
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    // HMAC-SHA256 accepts keys of any length, so this cannot fail
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a webhook delivery against the raw request body.
///
/// Rejects timestamps outside [`SIGNATURE_TOLERANCE_SECS`] and compares digests in constant time.
pub fn verify_signature(payload: &[u8], header: &str, secret: &str) -> Result<(), WebhookVerificationError> {
    let parsed = parse_signature_header(header)?;
    let age = (Utc::now().timestamp() - parsed.timestamp).abs();
    if age > SIGNATURE_TOLERANCE_SECS {
        return Err(WebhookVerificationError::StaleTimestamp);
    }
    let expected = compute_signature(secret, parsed.timestamp, payload);
    let matches: bool = expected.as_bytes().ct_eq(parsed.signature.as_bytes()).into();
    if matches {
        Ok(())
    } else {
        Err(WebhookVerificationError::SignatureMismatch)
    }
}

/// Verifies the signature and, only then, deserializes the payload into a typed event.
pub fn construct_event(payload: &[u8], header: &str, secret: &str) -> Result<WebhookEvent, WebhookVerificationError> {
    verify_signature(payload, header, secret)?;
    serde_json::from_slice(payload).map_err(|e| WebhookVerificationError::InvalidPayload(e.to_string()))
}
