/// Inbound request signature verification.
///
/// Every interaction request is signed by the platform with Ed25519 over
/// `timestamp || body`. The public key is the application's hex-encoded key.
use ed25519_dalek::{Signature, Verifier, VerifyingKey, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use thiserror::Error;
use tracing::debug;

pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("public key is not 32 hex-encoded bytes")]
    InvalidPublicKey,

    #[error("missing {0} header")]
    MissingHeader(&'static str),

    #[error("signature header is not 64 hex-encoded bytes")]
    MalformedSignature,

    #[error("signature does not match request")]
    BadSignature,
}

/// Verifies request signatures against one application public key.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    key: VerifyingKey,
}

impl SignatureVerifier {
    pub fn from_hex(public_key: &str) -> Result<Self, SignatureError> {
        let bytes: [u8; PUBLIC_KEY_LENGTH] = hex::decode(public_key.trim())
            .ok()
            .and_then(|b| b.try_into().ok())
            .ok_or(SignatureError::InvalidPublicKey)?;
        let key = VerifyingKey::from_bytes(&bytes).map_err(|_| SignatureError::InvalidPublicKey)?;
        Ok(Self { key })
    }

    /// Check `signature` over `timestamp || body`. Missing or undecodable
    /// headers are rejections, same as a wrong signature.
    pub fn verify(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &[u8],
    ) -> Result<(), SignatureError> {
        let timestamp = timestamp.ok_or(SignatureError::MissingHeader(TIMESTAMP_HEADER))?;
        let signature = signature.ok_or(SignatureError::MissingHeader(SIGNATURE_HEADER))?;

        let sig_bytes: [u8; SIGNATURE_LENGTH] = hex::decode(signature.trim())
            .ok()
            .and_then(|b| b.try_into().ok())
            .ok_or(SignatureError::MalformedSignature)?;
        let sig = Signature::from_bytes(&sig_bytes);

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        self.key.verify(&message, &sig).map_err(|e| {
            debug!("[Signature] verification failed: {}", e);
            SignatureError::BadSignature
        })
    }
}
