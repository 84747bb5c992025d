use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::login::error::{LoginError, LoginResult};

const VERIFIER_LENGTH: usize = 64;
const VERIFIER_MIN_LENGTH: usize = 43;
const VERIFIER_MAX_LENGTH: usize = 128;
const VERIFIER_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

pub const CODE_CHALLENGE_METHOD_S256: &str = "S256";

/// Code verifier and its S256 challenge, attached to a login request so the
/// dialog can issue an authorization code bound to this attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkcePair {
    verifier: String,
    challenge: String,
}

impl PkcePair {
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let verifier: String = (0..VERIFIER_LENGTH)
            .map(|_| VERIFIER_CHARSET[rng.gen_range(0..VERIFIER_CHARSET.len())] as char)
            .collect();
        Self::derive(verifier)
    }

    /// Wraps a verifier supplied by the caller, rejecting values RFC 7636 disallows.
    pub fn from_verifier(verifier: impl Into<String>) -> LoginResult<Self> {
        let verifier = verifier.into();
        let length_ok = (VERIFIER_MIN_LENGTH..=VERIFIER_MAX_LENGTH).contains(&verifier.len());
        let charset_ok = verifier.bytes().all(|byte| VERIFIER_CHARSET.contains(&byte));
        if !length_ok || !charset_ok {
            return Err(LoginError::InvalidCodeVerifier(format!(
                "code verifier must be {VERIFIER_MIN_LENGTH}-{VERIFIER_MAX_LENGTH} unreserved characters"
            )));
        }
        Ok(Self::derive(verifier))
    }

    fn derive(verifier: String) -> Self {
        let digest = Sha256::digest(verifier.as_bytes());
        let challenge = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(digest);
        Self {
            verifier,
            challenge,
        }
    }

    pub fn code_verifier(&self) -> &str {
        &self.verifier
    }

    pub fn code_challenge(&self) -> &str {
        &self.challenge
    }

    pub fn method(&self) -> &'static str {
        CODE_CHALLENGE_METHOD_S256
    }
}
