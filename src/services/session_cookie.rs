use axum::http::{HeaderMap, HeaderValue, header};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "pdfqa_session";

/// Issues and verifies the signed cookie carrying a session id.
///
/// Cookie value: `<session id>.<hex hmac-sha256(secret, session id)>`.
#[derive(Clone)]
pub struct SessionCookies {
    secret: Vec<u8>,
}

impl std::fmt::Debug for SessionCookies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCookies").finish_non_exhaustive()
    }
}

impl SessionCookies {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    fn mac(&self, session_id: &str) -> Option<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret).ok()?;
        mac.update(session_id.as_bytes());
        Some(mac)
    }

    pub fn sign(&self, session_id: &str) -> Option<String> {
        let tag = self.mac(session_id)?.finalize().into_bytes();
        Some(format!("{session_id}.{}", hex::encode(tag)))
    }

    /// Returns the session id when the signature matches.
    pub fn verify(&self, value: &str) -> Option<String> {
        let (id, sig) = value.rsplit_once('.')?;
        if id.is_empty() {
            return None;
        }
        let sig = hex::decode(sig).ok()?;
        self.mac(id)?.verify_slice(&sig).ok()?;
        Some(id.to_string())
    }

    /// Finds and verifies the session cookie among the request headers.
    pub fn session_from_headers(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .filter(|(name, _)| *name == SESSION_COOKIE)
            .find_map(|(_, value)| self.verify(value))
    }

    pub fn set_cookie_header(&self, session_id: &str) -> Option<HeaderValue> {
        let value = self.sign(session_id)?;
        HeaderValue::from_str(&format!(
            "{SESSION_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax"
        ))
        .ok()
    }
}
