use crate::{BroadcastError, Result};

use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const AUTH_VERSION: &str = "1.0";

/// Query-string authentication for the trigger REST API.
///
/// The string to sign is `METHOD\nPATH\nQUERY`, where `QUERY` holds the
/// auth parameters in alphabetical order, signed with HMAC-SHA256 keyed by
/// the app secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSignature {
    pub auth_key: String,
    pub auth_timestamp: i64,
    pub body_md5: String,
    pub auth_signature: String,
}

impl RequestSignature {
    pub fn sign(
        key: &str,
        secret: &str,
        method: &str,
        path: &str,
        body: &str,
        auth_timestamp: i64,
    ) -> Result<Self> {
        let body_md5 = hex::encode(Md5::digest(body.as_bytes()));

        let to_sign = format!(
            "{}\n{}\nauth_key={}&auth_timestamp={}&auth_version={}&body_md5={}",
            method.to_uppercase(),
            path,
            key,
            auth_timestamp,
            AUTH_VERSION,
            body_md5
        );

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| BroadcastError::configuration(format!("invalid trigger secret: {}", e)))?;
        mac.update(to_sign.as_bytes());
        let auth_signature = hex::encode(mac.finalize().into_bytes());

        Ok(Self {
            auth_key: key.to_string(),
            auth_timestamp,
            body_md5,
            auth_signature,
        })
    }

    /// Parameters to append to the request URL.
    pub fn query_pairs(&self) -> [(&'static str, String); 5] {
        [
            ("auth_key", self.auth_key.clone()),
            ("auth_timestamp", self.auth_timestamp.to_string()),
            ("auth_version", AUTH_VERSION.to_string()),
            ("body_md5", self.body_md5.clone()),
            ("auth_signature", self.auth_signature.clone()),
        ]
    }
}
