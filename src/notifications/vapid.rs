//! VAPID (RFC 8292) credentials used to sign every push request.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD as BASE64URL};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum VapidError {
    #[error("Invalid base64url for VAPID {0} key")]
    InvalidEncoding(&'static str),
    #[error("VAPID public key must be a 65-byte uncompressed P-256 point")]
    InvalidPublicKey,
    #[error("VAPID private key must be a 32-byte P-256 scalar, got {0} bytes")]
    InvalidPrivateKey(usize),
}

/// Application server key pair plus the `sub` claim sent with each signature.
///
/// Keys are base64url without padding: the public key is the uncompressed
/// SEC1 point handed to browsers as `applicationServerKey`, the private key
/// the raw scalar `web_push::VapidSignatureBuilder::from_base64` expects.
#[derive(Clone)]
pub struct VapidCredentials {
    public_key: String,
    private_key: String,
    subject: String,
}

impl std::fmt::Debug for VapidCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VapidCredentials")
            .field("public_key", &self.public_key)
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

impl VapidCredentials {
    pub fn new(public_key: &str, private_key: &str, subject: &str) -> Result<Self, VapidError> {
        let public_bytes = BASE64URL
            .decode(public_key.trim())
            .map_err(|_| VapidError::InvalidEncoding("public"))?;
        if public_bytes.len() != 65 || public_bytes[0] != 0x04 {
            return Err(VapidError::InvalidPublicKey);
        }

        let private_bytes = BASE64URL
            .decode(private_key.trim())
            .map_err(|_| VapidError::InvalidEncoding("private"))?;
        if private_bytes.len() != 32 {
            return Err(VapidError::InvalidPrivateKey(private_bytes.len()));
        }

        Ok(Self {
            public_key: public_key.trim().to_string(),
            private_key: private_key.trim().to_string(),
            subject: subject.to_string(),
        })
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}
