//! Authentication request/response types.

use serde::Deserialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::constants::{APK_VERSION, SOURCE_API};
use crate::types::payload::Payload;

// ---------------------------------------------------------------------------
// Digests
// ---------------------------------------------------------------------------

/// Lowercase hex SHA-256 of `input`.
fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// The `pwd` login field: SHA-256 of the plain password.
pub fn hash_password(password: &str) -> String {
    sha256_hex(password)
}

/// The `appkey` login field: SHA-256 of `"{user_id}|{api_secret}"`.
pub fn app_key(user_id: &str, api_secret: &str) -> String {
    sha256_hex(&format!("{user_id}|{api_secret}"))
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// Credentials for [`NorenClient::login`](crate::client::NorenClient::login).
#[derive(Debug, Clone)]
pub struct LoginRequest {
    /// User ID.
    pub user_id: String,
    /// Plain password; only its digest is sent.
    pub password: String,
    /// Second factor (TOTP, PAN or date of birth, depending on the broker).
    pub two_fa: String,
    /// Vendor code issued with the API key.
    pub vendor_code: String,
    /// API secret; only the digest of `user_id|api_secret` is sent.
    pub api_secret: String,
    /// Device identifier.
    pub imei: String,
}

impl LoginRequest {
    /// Build the `/QuickAuth` payload.
    pub fn to_payload(&self) -> Payload {
        Payload::new()
            .with("source", SOURCE_API)
            .with("apkversion", APK_VERSION)
            .with("uid", &self.user_id)
            .with("pwd", hash_password(&self.password))
            .with("factor2", &self.two_fa)
            .with("vc", &self.vendor_code)
            .with("appkey", app_key(&self.user_id, &self.api_secret))
            .with("imei", &self.imei)
    }
}

/// Successful `/QuickAuth` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub stat: String,
    /// Session token for all authorized requests and the feed.
    pub susertoken: String,
    #[serde(default)]
    pub uname: Option<String>,
    #[serde(default)]
    pub actid: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub brkname: Option<String>,
    #[serde(default)]
    pub lastaccesstime: Option<String>,
    #[serde(default)]
    pub request_time: Option<String>,
    /// Any fields not named above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
