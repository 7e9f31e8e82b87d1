// Token login
//
// Only used when the controller fronts its API with a login endpoint.
// Paths are configurable because the stock controller has none.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::ControllerClient;
use crate::error::Error;
use crate::models::LoginResponse;

impl ControllerClient {
    /// Exchange a username/password for a session token.
    ///
    /// `POST <login_path>` with `{"username", "password"}`, expecting
    /// `{"token": "..."}`. A 401/403 answer becomes
    /// [`Error::Authentication`]; the token is returned but not stored.
    pub async fn login(
        &self,
        login_path: &str,
        username: &str,
        password: &SecretString,
    ) -> Result<SecretString, Error> {
        debug!(username, "logging in");

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let resp: LoginResponse = self
            .post(login_path, &body)
            .await
            .map_err(|e| match e {
                Error::Api {
                    status: 401 | 403,
                    message,
                } => Error::Authentication { message },
                other => other,
            })?;

        debug!("login successful");
        Ok(resp.token.into())
    }

    /// Check that the currently stored token is still accepted.
    ///
    /// `GET <verify_path>`; any 2xx answer means valid. 401/403 map to
    /// [`Error::Authentication`].
    pub async fn verify_token(&self, verify_path: &str) -> Result<(), Error> {
        debug!("verifying session token");
        let _: serde_json::Value = match self.get(verify_path).await {
            Ok(v) => v,
            // Verify endpoints are free to answer with an empty or text body.
            Err(Error::Deserialization { .. }) => serde_json::Value::Null,
            Err(Error::Api {
                status: 401 | 403,
                message,
            }) => return Err(Error::Authentication { message }),
            Err(e) => return Err(e),
        };
        Ok(())
    }
}
