// Controller HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, optional bearer auth and
// response classification. Endpoint modules (hosts, ports, thresholds,
// topology, auth) are inherent methods in sibling files so this module
// stays focused on transport mechanics.

use std::sync::RwLock;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const PREVIEW_LEN: usize = 200;

/// Raw HTTP client for the controller's REST surface.
///
/// Bodies are bare JSON (no envelope). Non-2xx answers become
/// [`Error::Api`]; 2xx bodies that don't match the expected shape become
/// [`Error::Deserialization`] with the raw body attached.
pub struct ControllerClient {
    http: reqwest::Client,
    base_url: Url,
    /// Bearer token attached to every request once a remote login succeeded.
    token: RwLock<Option<SecretString>>,
}

impl ControllerClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the controller root, e.g. `http://127.0.0.1:8080`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            token: RwLock::new(None),
        }
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Token management ─────────────────────────────────────────────

    /// Attach `Authorization: Bearer <token>` to subsequent requests.
    pub fn set_token(&self, token: SecretString) {
        debug!("storing bearer token");
        if let Ok(mut guard) = self.token.write() {
            *guard = Some(token);
        }
    }

    /// Stop sending a bearer token.
    pub fn clear_token(&self) {
        if let Ok(mut guard) = self.token.write() {
            *guard = None;
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.read().is_ok_and(|guard| guard.is_some())
    }

    fn apply_token(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let Ok(guard) = self.token.read() else {
            return builder;
        };
        match guard.as_ref() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join an endpoint path onto the base URL, keeping any path prefix
    /// the base already carries (`http://host/api` + `ports` →
    /// `http://host/api/ports`).
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and deserialize the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {}", url);

        let resp = self
            .apply_token(self.http.get(url))
            .send()
            .await
            .map_err(Error::Transport)?;

        let body = Self::success_body(resp).await?;
        Self::decode(&body)
    }

    /// Send a POST request with a JSON body and deserialize the JSON reply.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let body = self.post_text(path, body).await?;
        Self::decode(&body)
    }

    /// Send a POST request with a JSON body and return the raw reply text.
    ///
    /// Block/unblock endpoints answer with free-form text that callers
    /// never interpret; only the status matters.
    pub(crate) async fn post_text(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<String, Error> {
        let url = self.url(path)?;
        debug!("POST {}", url);

        let resp = self
            .apply_token(self.http.post(url).json(body))
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::success_body(resp).await
    }

    /// Return the body of a 2xx response, or classify the failure.
    async fn success_body(resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        trace!(len = body.len(), "response body received");
        Ok(body)
    }

    fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
        serde_json::from_str(body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(body)),
            body: body.to_owned(),
        })
    }
}

/// First `PREVIEW_LEN` bytes of `body`, cut on a char boundary.
fn preview(body: &str) -> &str {
    if body.len() <= PREVIEW_LEN {
        return body;
    }
    let mut end = PREVIEW_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ControllerClient {
        ControllerClient::with_client(reqwest::Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn url_joins_without_double_slashes() {
        let c = client("http://127.0.0.1:8080/");
        assert_eq!(
            c.url("/ports").unwrap().as_str(),
            "http://127.0.0.1:8080/ports"
        );
    }

    #[test]
    fn url_keeps_base_path_prefix() {
        let c = client("http://ctl.lab/api");
        assert_eq!(
            c.url("thresholds").unwrap().as_str(),
            "http://ctl.lab/api/thresholds"
        );
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "é".repeat(150);
        let p = preview(&body);
        assert!(p.len() <= PREVIEW_LEN);
        assert!(p.chars().all(|c| c == 'é'));
    }

    #[test]
    fn token_can_be_set_and_cleared() {
        let c = client("http://127.0.0.1:8080");
        assert!(!c.has_token());
        c.set_token("abc".to_string().into());
        assert!(c.has_token());
        c.clear_token();
        assert!(!c.has_token());
    }
}
