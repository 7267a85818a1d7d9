//! OAuth 1.0a request signing (HMAC-SHA1).

use crate::twitter::{Authentication, Error};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use rand::RngCore;
use sha1::Sha1;
use std::time::{SystemTime, UNIX_EPOCH};

/// Everything but the RFC 3986 unreserved characters.
const OAUTH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'!')
    .add(b'"')
    .add(b'#')
    .add(b'$')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'*')
    .add(b'+')
    .add(b',')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

type HmacSha1 = Hmac<Sha1>;

#[derive(Clone)]
pub struct OAuthSigner {
    auth: Authentication,
}

impl OAuthSigner {
    pub fn new(auth: &Authentication) -> Self {
        Self { auth: auth.clone() }
    }

    /// Builds the `Authorization` header for a request to `base_url` (no query)
    /// carrying `params` in its query string.
    pub fn sign(
        &self,
        method: &str,
        base_url: &str,
        params: &[(String, String)],
    ) -> Result<String, Error> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        self.sign_with(method, base_url, params, &nonce(), timestamp)
    }

    fn sign_with(
        &self,
        method: &str,
        base_url: &str,
        params: &[(String, String)],
        nonce: &str,
        timestamp: u64,
    ) -> Result<String, Error> {
        let mut oauth = vec![
            ("oauth_consumer_key", self.auth.consumer.clone()),
            ("oauth_nonce", nonce.to_string()),
            ("oauth_signature_method", "HMAC-SHA1".to_string()),
            ("oauth_timestamp", timestamp.to_string()),
            ("oauth_token", self.auth.token.clone()),
            ("oauth_version", "1.0".to_string()),
        ];

        let mut all: Vec<(String, String)> = oauth
            .iter()
            .map(|(k, v)| (encode(k), encode(v)))
            .chain(params.iter().map(|(k, v)| (encode(k), encode(v))))
            .collect();
        all.sort();
        let param_string = all
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let base_string = format!(
            "{}&{}&{}",
            method.to_uppercase(),
            encode(base_url),
            encode(&param_string)
        );
        let key = format!(
            "{}&{}",
            encode(&self.auth.consumer_secret),
            encode(&self.auth.token_secret)
        );
        oauth.push(("oauth_signature", hmac_sha1(&key, &base_string)?));

        let header = oauth
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("OAuth {header}"))
    }
}

fn encode(s: &str) -> String {
    utf8_percent_encode(s, OAUTH_ENCODE_SET).to_string()
}

fn nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hmac_sha1(key: &str, data: &str) -> Result<String, Error> {
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| Error::Signing(format!("invalid key: {e}")))?;
    mac.update(data.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}
