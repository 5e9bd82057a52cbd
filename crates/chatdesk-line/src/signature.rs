// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook signature verification.
//!
//! LINE signs each delivery with HMAC-SHA256 over the raw request body using
//! the channel secret, base64-encoded in the `x-line-signature` header.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chatdesk_core::AuthenticityError;
use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Header carrying the delivery signature.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

type HmacSha256 = Hmac<Sha256>;

/// Verify `signature` against `body`.
///
/// Must run on the exact bytes received, before any JSON parsing. The
/// comparison is constant-time. An empty secret verifies nothing.
pub fn verify(
    channel_secret: &str,
    body: &[u8],
    signature: Option<&str>,
) -> Result<(), AuthenticityError> {
    if channel_secret.is_empty() {
        return Err(AuthenticityError::Invalid);
    }
    let signature = signature
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(AuthenticityError::Missing)?;
    let expected = STANDARD
        .decode(signature)
        .map_err(|_| AuthenticityError::Invalid)?;

    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .map_err(|_| AuthenticityError::Invalid)?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| AuthenticityError::Invalid)
}

/// Compute the base64 signature LINE would send for `body`.
pub fn sign(channel_secret: &str, body: &[u8]) -> String {
    // HMAC accepts keys of any length, including empty.
    let mut mac = match HmacSha256::new_from_slice(channel_secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}
