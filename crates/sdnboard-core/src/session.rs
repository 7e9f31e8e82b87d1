// ── Session gate ──
//
// Decides whether protected views may load. The marker is an opaque
// token kept in a `SessionStore` under the key `token`. Credentials are
// checked by an `Authenticator`: either a fixed local pair or the
// controller's own login endpoint.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use sdnboard_api::ControllerClient;

use crate::config::AuthMode;
use crate::error::CoreError;

/// Storage key (file name) of the session marker.
pub const TOKEN_KEY: &str = "token";

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

// ── Token ───────────────────────────────────────────────────────────

/// Opaque session marker.
#[derive(Debug, Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn secret(&self) -> &SecretString {
        &self.0
    }
}

// ── Storage ─────────────────────────────────────────────────────────

/// Where the session marker lives between invocations.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<SessionToken>, CoreError>;
    fn save(&self, token: &SessionToken) -> Result<(), CoreError>;
    fn clear(&self) -> Result<(), CoreError>;
}

/// Session marker kept in a file named `token` inside `dir`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(TOKEN_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn storage_error(action: &str, path: &Path, e: &std::io::Error) -> CoreError {
    CoreError::Session {
        message: format!("failed to {action} {}: {e}", path.display()),
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionToken>, CoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                Ok((!token.is_empty()).then(|| SessionToken::new(token)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error("read", &self.path, &e)),
        }
    }

    fn save(&self, token: &SessionToken) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| storage_error("create", parent, &e))?;
        }
        std::fs::write(&self.path, token.expose()).map_err(|e| storage_error("write", &self.path, &e))
    }

    fn clear(&self) -> Result<(), CoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error("remove", &self.path, &e)),
        }
    }
}

/// In-process session marker, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<SessionToken>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<SessionToken>>, CoreError> {
        self.token
            .lock()
            .map_err(|_| CoreError::Internal("session lock poisoned".into()))
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<SessionToken>, CoreError> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, token: &SessionToken) -> Result<(), CoreError> {
        *self.lock()? = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        *self.lock()? = None;
        Ok(())
    }
}

// ── Authenticators ──────────────────────────────────────────────────

/// Checks credentials and stored tokens.
pub trait Authenticator: Send + Sync {
    /// `Ok(None)` means the pair was refused.
    fn authenticate(
        &self,
        username: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<Option<SessionToken>, CoreError>> + Send;

    /// `Ok(false)` means the token is no longer accepted.
    fn verify(&self, token: &SessionToken) -> impl Future<Output = Result<bool, CoreError>> + Send;
}

/// Fixed username/password pair. Issues a random token per login.
#[derive(Debug, Clone)]
pub struct LocalAuthenticator {
    username: String,
    password: SecretString,
}

impl LocalAuthenticator {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

impl Authenticator for LocalAuthenticator {
    async fn authenticate(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<Option<SessionToken>, CoreError> {
        let accepted = username == self.username
            && password.expose_secret() == self.password.expose_secret();
        Ok(accepted.then(|| SessionToken::new(Uuid::new_v4().to_string())))
    }

    async fn verify(&self, _token: &SessionToken) -> Result<bool, CoreError> {
        Ok(true)
    }
}

/// Logs in against the controller and sends the token as a bearer.
///
/// The shared client keeps the token once login or verification
/// succeeds, so panels built on the same client are authorized.
pub struct RemoteAuthenticator {
    client: Arc<ControllerClient>,
    login_path: String,
    verify_path: Option<String>,
}

impl RemoteAuthenticator {
    pub fn new(
        client: Arc<ControllerClient>,
        login_path: impl Into<String>,
        verify_path: Option<String>,
    ) -> Self {
        Self {
            client,
            login_path: login_path.into(),
            verify_path,
        }
    }
}

impl Authenticator for RemoteAuthenticator {
    async fn authenticate(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<Option<SessionToken>, CoreError> {
        match self.client.login(&self.login_path, username, password).await {
            Ok(secret) => {
                self.client.set_token(secret.clone());
                Ok(Some(SessionToken(secret)))
            }
            Err(sdnboard_api::Error::Authentication { message }) => {
                debug!(%message, "controller refused credentials");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn verify(&self, token: &SessionToken) -> Result<bool, CoreError> {
        self.client.set_token(token.secret().clone());
        let Some(path) = self.verify_path.as_deref() else {
            return Ok(true);
        };
        match self.client.verify_token(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_auth_expired() => {
                self.client.clear_token();
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Authenticator picked from configuration at runtime.
pub enum ConfiguredAuthenticator {
    Local(LocalAuthenticator),
    Remote(RemoteAuthenticator),
}

impl ConfiguredAuthenticator {
    pub fn from_mode(mode: &AuthMode, client: Arc<ControllerClient>) -> Self {
        match mode {
            AuthMode::Local { username, password } => {
                Self::Local(LocalAuthenticator::new(username.clone(), password.clone()))
            }
            AuthMode::Remote {
                login_path,
                verify_path,
            } => Self::Remote(RemoteAuthenticator::new(
                client,
                login_path.clone(),
                verify_path.clone(),
            )),
        }
    }
}

impl Authenticator for ConfiguredAuthenticator {
    async fn authenticate(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<Option<SessionToken>, CoreError> {
        match self {
            Self::Local(a) => a.authenticate(username, password).await,
            Self::Remote(a) => a.authenticate(username, password).await,
        }
    }

    async fn verify(&self, token: &SessionToken) -> Result<bool, CoreError> {
        match self {
            Self::Local(a) => a.verify(token).await,
            Self::Remote(a) => a.verify(token).await,
        }
    }
}

// ── Gate ────────────────────────────────────────────────────────────

/// Top-level views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Route {
    Login,
    Dashboard,
}

/// Result of entering a protected view.
#[derive(Debug, Clone)]
pub enum Access {
    Granted(SessionToken),
    Redirect(Route),
}

impl Access {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }
}

/// Session check for protected and login entries.
pub struct SessionGate<A: Authenticator> {
    authenticator: A,
    store: Arc<dyn SessionStore>,
    login_error: watch::Sender<Option<String>>,
}

impl<A: Authenticator> SessionGate<A> {
    pub fn new(authenticator: A, store: Arc<dyn SessionStore>) -> Self {
        let (login_error, _) = watch::channel(None);
        Self {
            authenticator,
            store,
            login_error,
        }
    }

    pub fn is_logged_in(&self) -> Result<bool, CoreError> {
        Ok(self.store.load()?.is_some())
    }

    /// Entry to a protected view. Runs before anything is fetched.
    ///
    /// A token the authenticator no longer accepts is cleared.
    pub async fn enter_protected(&self) -> Result<Access, CoreError> {
        let Some(token) = self.store.load()? else {
            debug!("no session, redirecting to login");
            return Ok(Access::Redirect(Route::Login));
        };

        if self.authenticator.verify(&token).await? {
            Ok(Access::Granted(token))
        } else {
            warn!("session token rejected, clearing");
            self.store.clear()?;
            Ok(Access::Redirect(Route::Login))
        }
    }

    /// Entry to the login view: `Some(Dashboard)` when already logged in.
    pub fn enter_login(&self) -> Result<Option<Route>, CoreError> {
        Ok(self.is_logged_in()?.then_some(Route::Dashboard))
    }

    /// Where `/` leads.
    pub fn root(&self) -> Result<Route, CoreError> {
        Ok(if self.is_logged_in()? {
            Route::Dashboard
        } else {
            Route::Login
        })
    }

    /// Check credentials; on success persist the token.
    ///
    /// A refused pair sets the login error to "Invalid credentials" and
    /// stays on the login route; nothing else changes.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<Route, CoreError> {
        match self.authenticator.authenticate(username, password).await? {
            Some(token) => {
                self.store.save(&token)?;
                self.login_error.send_replace(None);
                info!(username, "logged in");
                Ok(Route::Dashboard)
            }
            None => {
                self.login_error
                    .send_replace(Some(INVALID_CREDENTIALS.to_owned()));
                Ok(Route::Login)
            }
        }
    }

    /// Drop the session marker.
    pub fn logout(&self) -> Result<Route, CoreError> {
        self.store.clear()?;
        info!("logged out");
        Ok(Route::Login)
    }

    /// Login-level error from the last attempt.
    pub fn login_error(&self) -> Option<String> {
        self.login_error.borrow().clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn gate() -> SessionGate<LocalAuthenticator> {
        SessionGate::new(
            LocalAuthenticator::new("admin", SecretString::from("admin".to_string())),
            Arc::new(MemorySessionStore::new()),
        )
    }

    #[tokio::test]
    async fn protected_entry_without_session_redirects() {
        let gate = gate();
        let access = gate.enter_protected().await.unwrap();
        assert!(matches!(access, Access::Redirect(Route::Login)));
        assert_eq!(gate.root().unwrap(), Route::Login);
        assert_eq!(gate.enter_login().unwrap(), None);
    }

    #[tokio::test]
    async fn login_then_protected_entry_is_granted() {
        let gate = gate();
        let route = gate
            .login("admin", &SecretString::from("admin".to_string()))
            .await
            .unwrap();
        assert_eq!(route, Route::Dashboard);
        assert!(gate.enter_protected().await.unwrap().is_granted());
        assert_eq!(gate.enter_login().unwrap(), Some(Route::Dashboard));
        assert_eq!(gate.root().unwrap(), Route::Dashboard);
    }

    #[tokio::test]
    async fn wrong_credentials_set_login_error_only() {
        let gate = gate();
        let route = gate
            .login("admin", &SecretString::from("nope".to_string()))
            .await
            .unwrap();
        assert_eq!(route, Route::Login);
        assert_eq!(gate.login_error().as_deref(), Some(INVALID_CREDENTIALS));
        assert!(!gate.is_logged_in().unwrap());
    }

    #[tokio::test]
    async fn issued_tokens_are_random() {
        let auth = LocalAuthenticator::new("admin", SecretString::from("admin".to_string()));
        let pw = SecretString::from("admin".to_string());
        let a = auth.authenticate("admin", &pw).await.unwrap().unwrap();
        let b = auth.authenticate("admin", &pw).await.unwrap().unwrap();
        assert_ne!(a.expose(), b.expose());
    }

    #[tokio::test]
    async fn logout_clears_marker() {
        let gate = gate();
        gate.login("admin", &SecretString::from("admin".to_string()))
            .await
            .unwrap();
        assert_eq!(gate.logout().unwrap(), Route::Login);
        assert!(!gate.is_logged_in().unwrap());
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested"));
        assert!(store.load().unwrap().is_none());

        store.save(&SessionToken::new("abc")).unwrap();
        assert_eq!(store.path().file_name().unwrap(), TOKEN_KEY);
        assert_eq!(store.load().unwrap().unwrap().expose(), "abc");

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }
}
