//! Auth endpoint wrappers.
//!
//! Covers the authentication exchange: login, registration, email
//! verification, logout, and the authenticated profile. The credential
//! itself is set and cleared by the backend via cookies; these wrappers
//! only carry the exchange and surface the identity fields it returns.

use serde_json::json;

use seren_types::UserIdentity;

use crate::pipeline::ApiClient;
use crate::types::{CallOptions, CallResult};

/// Auth API client.
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Log in with email and password.
    ///
    /// On success the backend sets the credential cookies and returns the
    /// identity fields; extract them with [`AuthApi::identity_from`].
    /// Login is not retried: replaying a credential exchange on a blip is
    /// worse than surfacing the failure.
    pub async fn login(&self, email: &str, password: &str) -> CallResult {
        let path = self.client.endpoints().login.clone();
        let options = CallOptions::post(json!({
            "email": email,
            "password": password,
        }))
        .with_skip_retry();
        self.client.call(&path, options).await
    }

    /// Register a new account. The backend responds with a verification
    /// notice rather than a credential.
    pub async fn register(&self, email: &str, password: &str) -> CallResult {
        let path = self.client.endpoints().register.clone();
        let options = CallOptions::post(json!({
            "email": email,
            "password": password,
        }))
        .with_skip_retry();
        self.client.call(&path, options).await
    }

    /// Verify an email address with the token sent to it.
    pub async fn verify(&self, email: &str, token: &str) -> CallResult {
        let query: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("email", email)
            .append_pair("token", token)
            .finish();
        let path = format!("{}?{}", self.client.endpoints().verify, query);
        self.client.call(&path, CallOptions::get()).await
    }

    /// Log out, clearing the credential cookies server-side.
    pub async fn logout(&self) -> CallResult {
        let path = self.client.endpoints().logout.clone();
        let options = CallOptions {
            method: reqwest::Method::POST,
            ..CallOptions::default()
        }
        .with_skip_retry();
        self.client.call(&path, options).await
    }

    /// Fetch the authenticated profile.
    pub async fn profile(&self) -> CallResult {
        let path = self.client.endpoints().profile.clone();
        self.client.call(&path, CallOptions::get().with_auth()).await
    }

    /// Extract the identity fields from a successful login response.
    ///
    /// The backend serializes the user id as a number; it is carried as a
    /// string everywhere in the runtime.
    pub fn identity_from(result: &CallResult) -> Option<UserIdentity> {
        let data = result.data.as_ref()?;
        let id = match data.get("user_id")? {
            serde_json::Value::String(id) => id.clone(),
            serde_json::Value::Number(id) => id.to_string(),
            _ => return None,
        };
        let email = data.get("email")?.as_str()?.to_string();
        Some(UserIdentity { id, email })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_from_numeric_id() {
        let result = CallResult::success(
            200,
            Some(json!({"message": "Login successful", "user_id": 7, "email": "a@b.c"})),
        );
        let identity = AuthApi::identity_from(&result).unwrap();
        assert_eq!(identity.id, "7");
        assert_eq!(identity.email, "a@b.c");
    }

    #[test]
    fn test_identity_from_missing_fields() {
        let result = CallResult::success(200, Some(json!({"message": "ok"})));
        assert!(AuthApi::identity_from(&result).is_none());

        let empty = CallResult::success(204, None);
        assert!(AuthApi::identity_from(&empty).is_none());
    }
}
