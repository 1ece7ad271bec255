//! Authentication endpoints.
//!
//! `login` and `logout` are the only methods that change the client's session
//! state, so they take `&mut self`.

use serde_json::Value;

use crate::client::NorenClient;
use crate::config::Route;
use crate::constants::SOURCE_API;
use crate::error::Result;
use crate::types::auth::{LoginRequest, LoginResponse, hash_password};
use crate::types::payload::Payload;

impl NorenClient {
    /// Log in and store the returned session token.
    ///
    /// The password and the `user_id|api_secret` pair are sent as SHA-256
    /// digests. On failure the service's reply is returned as
    /// [`NorenError::Api`](crate::error::NorenError::Api) and the existing
    /// session, if any, is left untouched.
    ///
    /// **Endpoint:** `POST /QuickAuth`
    pub async fn login(&mut self, req: &LoginRequest) -> Result<LoginResponse> {
        let resp: LoginResponse = self
            .send_as(Route::Authorize, &req.to_payload(), false)
            .await?;

        let account_id = resp.actid.clone().unwrap_or_else(|| req.user_id.clone());
        self.store_session(req.user_id.clone(), account_id, resp.susertoken.clone());
        tracing::info!(user_id = %req.user_id, "logged in");
        Ok(resp)
    }

    /// End the session. On success all session state is cleared and further
    /// authorized calls fail with
    /// [`NorenError::NotAuthenticated`](crate::error::NorenError::NotAuthenticated).
    ///
    /// **Endpoint:** `POST /Logout`
    pub async fn logout(&mut self) -> Result<Value> {
        let (uid, _) = self.identity()?;
        let payload = Payload::new()
            .with("ordersource", SOURCE_API)
            .with("uid", uid);

        let resp = self.send(Route::Logout, &payload, true).await?;
        self.clear_session();
        tracing::info!("logged out");
        Ok(resp)
    }

    /// Request a password reset.
    ///
    /// **Endpoint:** `POST /ForgotPassword`
    pub async fn forgot_password(&self, user_id: &str, pan: &str, dob: &str) -> Result<Value> {
        let payload = Payload::new()
            .with("source", SOURCE_API)
            .with("uid", user_id)
            .with("pan", pan)
            .with("dob", dob);
        self.send(Route::ForgotPassword, &payload, false).await
    }

    /// Change the login password. The old password is sent as its digest,
    /// the same way login sends it.
    ///
    /// **Endpoint:** `POST /Changepwd`
    pub async fn change_password(
        &self,
        user_id: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<Value> {
        let payload = Payload::new()
            .with("uid", user_id)
            .with("oldpwd", hash_password(old_password))
            .with("pwd", new_password);
        self.send(Route::ChangePassword, &payload, false).await
    }
}
