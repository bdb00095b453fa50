//! Signed envelope codec.
//!
//! An envelope is a `{header, payload}` pair carried as three dot-joined,
//! unpadded base64url segments: `b64(header) . b64(payload) . b64(signature)`,
//! where the signature is HMAC-SHA-512 over `b64(header) "." b64(payload)`.

pub mod access;
pub mod refresh;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha512;

use crate::auth::AuthError;

/// Signature algorithm advertised in every header.
pub const ALGORITHM: &str = "HS512";

/// Token type advertised in every header.
pub const TOKEN_TYPE: &str = "JWT";

type HmacSha512 = Hmac<Sha512>;

/// Envelope header. Constant for every credential this crate produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    #[serde(rename = "alg")]
    pub algorithm: String,
    #[serde(rename = "typ")]
    pub token_type: String,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            algorithm: ALGORITHM.to_string(),
            token_type: TOKEN_TYPE.to_string(),
        }
    }
}

/// A signed `{header, payload}` pair, generic over the payload shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<P> {
    pub header: Header,
    pub payload: P,
}

impl<P> Envelope<P>
where
    P: Serialize + DeserializeOwned,
{
    /// Wrap a payload in the fixed header.
    pub fn new(payload: P) -> Self {
        Self {
            header: Header::default(),
            payload,
        }
    }

    /// Encode and sign the envelope with `key`.
    pub fn encode(&self, key: &[u8]) -> Result<String, AuthError> {
        let signing_input = self.signing_input()?;
        let signature = sign(key, signing_input.as_bytes())?;
        Ok(format!("{signing_input}.{signature}"))
    }

    /// The base64url signature of this envelope under `key`.
    pub fn signature(&self, key: &[u8]) -> Result<String, AuthError> {
        sign(key, self.signing_input()?.as_bytes())
    }

    /// Split, decode and verify an encoded envelope.
    ///
    /// Only structure and signature are checked; expiry and claim semantics
    /// are left to the caller.
    pub fn decode(encoded: &str, key: &[u8]) -> Result<Self, AuthError> {
        let segments: Vec<&str> = encoded.split('.').collect();
        let [header_b64, payload_b64, signature_b64] = segments.as_slice() else {
            return Err(AuthError::Malformed(format!(
                "expected 3 segments, found {}",
                segments.len()
            )));
        };
        if segments.iter().any(|s| s.is_empty()) {
            return Err(AuthError::Malformed("empty segment".into()));
        }

        let header: Header = decode_segment(header_b64, "header")?;
        let payload: P = decode_segment(payload_b64, "payload")?;

        let presented = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|e| AuthError::Malformed(format!("signature encoding: {e}")))?;
        let mut mac = new_mac(key)?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&presented)
            .map_err(|_| AuthError::Malformed("signature mismatch".into()))?;

        Ok(Self { header, payload })
    }

    fn signing_input(&self) -> Result<String, AuthError> {
        let header = encode_segment(&self.header)?;
        let payload = encode_segment(&self.payload)?;
        Ok(format!("{header}.{payload}"))
    }
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, AuthError> {
    let json = serde_json::to_vec(value)
        .map_err(|e| AuthError::Internal(format!("serialize segment: {e}")))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_segment<T: DeserializeOwned>(segment: &str, what: &str) -> Result<T, AuthError> {
    let raw = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| AuthError::Malformed(format!("{what} encoding: {e}")))?;
    serde_json::from_slice(&raw).map_err(|e| AuthError::Malformed(format!("{what} json: {e}")))
}

fn new_mac(key: &[u8]) -> Result<HmacSha512, AuthError> {
    HmacSha512::new_from_slice(key).map_err(|e| AuthError::Internal(format!("hmac key: {e}")))
}

fn sign(key: &[u8], input: &[u8]) -> Result<String, AuthError> {
    let mut mac = new_mac(key)?;
    mac.update(input);
    Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
}
