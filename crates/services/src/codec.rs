//! Encrypted, URL-safe encoding of `SessionState`.
//!
//! Token layout before base64: `version (1) || nonce (24) || ciphertext+tag`.
//! The plaintext is a small JSON object; integrity comes entirely from the
//! AEAD tag, so any bit-flip, truncation, or foreign token fails to decode.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng, Payload};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use serde::{Deserialize, Serialize};
use survey_core::model::{SessionState, UserId};
use thiserror::Error;

/// Raw key length in bytes.
pub const KEY_LEN: usize = 32;

const TOKEN_VERSION: u8 = 1;
const NONCE_LEN: usize = 24;
const TAG_LEN: usize = 16;
const ASSOCIATED_DATA: &[u8] = b"survey-state/v1";

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Why a token could not be decoded. Callers treat every variant as "no session".
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidToken {
    #[error("token is not url-safe base64")]
    Encoding,
    #[error("token envelope is truncated or has an unknown version")]
    Envelope,
    #[error("token failed authentication")]
    Authentication,
    #[error("token payload is malformed")]
    Payload,
}

/// Errors raised while building a codec or encoding a state.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodecError {
    #[error("encryption key is not url-safe base64: {0}")]
    KeyEncoding(#[from] base64::DecodeError),
    #[error("encryption key must be {KEY_LEN} bytes, got {0}")]
    KeyLength(usize),
    #[error("failed to serialize session state: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to encrypt session state")]
    Encrypt,
}

//
// ─── TOKEN ─────────────────────────────────────────────────────────────────────
//

/// Encrypted session state, safe to place in a query string as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    /// Wraps a token received from a request without checking it.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct TokenPayload {
    uid: String,
    step: i64,
    ans: String,
    #[serde(default, skip_serializing_if = "is_false")]
    sub: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

//
// ─── CODEC ─────────────────────────────────────────────────────────────────────
//

/// Symmetric encrypt/decrypt of session state keyed by a process-wide secret.
#[derive(Clone)]
pub struct StateCodec {
    cipher: XChaCha20Poly1305,
}

impl fmt::Debug for StateCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCodec").finish_non_exhaustive()
    }
}

impl StateCodec {
    /// Build a codec from raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::KeyLength` unless the key is exactly `KEY_LEN` bytes.
    pub fn from_key_bytes(key: &[u8]) -> Result<Self, CodecError> {
        let cipher =
            XChaCha20Poly1305::new_from_slice(key).map_err(|_| CodecError::KeyLength(key.len()))?;
        Ok(Self { cipher })
    }

    /// Build a codec from a url-safe base64 key (padding optional).
    ///
    /// # Errors
    ///
    /// Returns `CodecError` if the key is not base64 or has the wrong length.
    pub fn from_base64_key(encoded: &str) -> Result<Self, CodecError> {
        let bytes = URL_SAFE_NO_PAD.decode(encoded.trim().trim_end_matches('='))?;
        Self::from_key_bytes(&bytes)
    }

    /// Generates a fresh random key, url-safe base64 encoded.
    #[must_use]
    pub fn generate_key() -> String {
        URL_SAFE.encode(XChaCha20Poly1305::generate_key(&mut OsRng))
    }

    /// Encrypts a state into a token.
    ///
    /// # Errors
    ///
    /// Returns `CodecError` if serialization or encryption fails.
    pub fn encode(&self, state: &SessionState) -> Result<Token, CodecError> {
        let payload = TokenPayload {
            uid: state.user_id().to_string(),
            step: state.step(),
            ans: state.answers().to_string(),
            sub: state.is_submitted(),
        };
        let plaintext = serde_json::to_vec(&payload)?;

        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(
                &nonce,
                Payload {
                    msg: &plaintext,
                    aad: ASSOCIATED_DATA,
                },
            )
            .map_err(|_| CodecError::Encrypt)?;

        let mut envelope = Vec::with_capacity(1 + NONCE_LEN + ciphertext.len());
        envelope.push(TOKEN_VERSION);
        envelope.extend_from_slice(&nonce);
        envelope.extend_from_slice(&ciphertext);

        Ok(Token(URL_SAFE_NO_PAD.encode(envelope)))
    }

    /// Decrypts a token back into a state.
    ///
    /// Only structural invariants are checked here; bounds against the
    /// configured question count are the controller's job.
    ///
    /// # Errors
    ///
    /// Returns `InvalidToken` for any decoding, authentication, or payload failure.
    pub fn decode(&self, token: &str) -> Result<SessionState, InvalidToken> {
        let envelope = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| InvalidToken::Encoding)?;
        if envelope.len() < 1 + NONCE_LEN + TAG_LEN || envelope[0] != TOKEN_VERSION {
            return Err(InvalidToken::Envelope);
        }

        let (nonce, ciphertext) = envelope[1..].split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(
                XNonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: ASSOCIATED_DATA,
                },
            )
            .map_err(|_| InvalidToken::Authentication)?;

        let payload: TokenPayload =
            serde_json::from_slice(&plaintext).map_err(|_| InvalidToken::Payload)?;
        let user_id = UserId::new(payload.uid).map_err(|_| InvalidToken::Payload)?;
        let answers = payload.ans.parse().map_err(|_| InvalidToken::Payload)?;

        SessionState::from_parts(user_id, payload.step, answers, payload.sub)
            .map_err(|_| InvalidToken::Payload)
    }
}
