use base64::engine::general_purpose::URL_SAFE as b64_urlsafe;
use base64::Engine;
use std::fmt;

use crate::threadrand::SecureRng;

pub const TOKEN_LENGTH: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenError {
    TokenMissing,
    TokenInvalid,
    TokenExpired,
}

impl std::error::Error for TokenError {}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::TokenMissing => write!(f, "TokenError: Token is missing"),
            TokenError::TokenInvalid => write!(f, "TokenError: Token is invalid"),
            TokenError::TokenExpired => write!(f, "TokenError: Token is expired"),
        }
    }
}

/// A fixed-width random bearer token. Session cookies and invite codes are both opaque tokens;
/// the server stores the raw bytes and hands clients the base64url encoding.
#[derive(Clone, PartialEq, Eq)]
pub struct OpaqueToken([u8; TOKEN_LENGTH]);

impl OpaqueToken {
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_LENGTH];
        SecureRng::fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn decode(encoded: &str) -> Result<Self, TokenError> {
        // Anything much longer than the encoding of TOKEN_LENGTH bytes can't be a token
        if encoded.len() > TOKEN_LENGTH * 2 {
            return Err(TokenError::TokenInvalid);
        }

        let decoded = b64_urlsafe
            .decode(encoded)
            .map_err(|_| TokenError::TokenInvalid)?;

        Self::from_bytes(&decoded)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TokenError> {
        let bytes: [u8; TOKEN_LENGTH] = bytes.try_into().map_err(|_| TokenError::TokenInvalid)?;
        Ok(Self(bytes))
    }

    pub fn encode(&self) -> String {
        b64_urlsafe.encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

// Keep token values out of logs
impl fmt::Debug for OpaqueToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpaqueToken(..)")
    }
}
