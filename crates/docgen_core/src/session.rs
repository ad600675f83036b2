//! crates/docgen_core/src/session.rs
//!
//! The authenticated session. It is created explicitly (restoring a persisted
//! credential when one exists), torn down explicitly by `logout`, and hands out
//! the identity to whoever needs it. There is no global session state.

use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::Identity;
use crate::error::{CoreError, CoreResult};
use crate::ports::{AuthService, CredentialStore};

pub struct AuthSession {
    auth: Arc<dyn AuthService>,
    credentials: Arc<dyn CredentialStore>,
    identity: Option<Identity>,
}

impl AuthSession {
    /// Starts a session, picking up a previously persisted credential if any.
    pub async fn restore(
        auth: Arc<dyn AuthService>,
        credentials: Arc<dyn CredentialStore>,
    ) -> CoreResult<Self> {
        let identity = match credentials.load().await {
            Ok(identity) => identity,
            Err(e) => {
                warn!("Ignoring unreadable stored credential: {}", e);
                None
            }
        };
        if identity.is_some() {
            info!("Restored stored credential");
        }
        Ok(Self {
            auth,
            credentials,
            identity,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// The current identity, or an authorization error when logged out.
    pub fn identity(&self) -> CoreResult<&Identity> {
        self.identity
            .as_ref()
            .ok_or_else(|| CoreError::Authorization("not logged in".to_string()))
    }

    pub async fn login(&mut self, email: &str, password: &str) -> CoreResult<&Identity> {
        validate_credentials(email, password)?;
        let identity = self.auth.login(email.trim(), password).await?;
        self.credentials.save(&identity).await?;
        info!("Logged in as {}", email.trim());
        Ok(self.identity.insert(identity))
    }

    /// Registers a new account and logs straight into it.
    pub async fn register(&mut self, email: &str, password: &str) -> CoreResult<&Identity> {
        validate_credentials(email, password)?;
        self.auth.register(email.trim(), password).await?;
        info!("Registered {}", email.trim());
        self.login(email, password).await
    }

    /// Forgets the identity in memory and on disk.
    pub async fn logout(&mut self) -> CoreResult<()> {
        self.identity = None;
        self.credentials.clear().await?;
        info!("Logged out");
        Ok(())
    }
}

fn validate_credentials(email: &str, password: &str) -> CoreResult<()> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(CoreError::Validation(
            "email and password are required".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBackend, MemoryEnvironment};

    async fn session(backend: &FakeBackend, env: &MemoryEnvironment) -> AuthSession {
        AuthSession::restore(Arc::new(backend.clone()), Arc::new(env.clone()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn login_persists_and_restore_picks_it_up() {
        let backend = FakeBackend::new();
        let env = MemoryEnvironment::default();

        let mut first = session(&backend, &env).await;
        assert!(matches!(first.identity(), Err(CoreError::Authorization(_))));
        first.login("ada@example.com", "pw").await.unwrap();

        let restored = session(&backend, &env).await;
        assert_eq!(
            restored.identity().unwrap().access_token,
            "token-for-ada@example.com"
        );
    }

    #[tokio::test]
    async fn logout_clears_memory_and_storage() {
        let backend = FakeBackend::new();
        let env = MemoryEnvironment::default();
        let mut session_state = session(&backend, &env).await;
        session_state.register("ada@example.com", "pw").await.unwrap();

        session_state.logout().await.unwrap();

        assert!(!session_state.is_authenticated());
        assert!(env.credential.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn rejected_login_stores_nothing() {
        let backend = FakeBackend::new();
        backend.fail(|f| f.login = true);
        let env = MemoryEnvironment::default();
        let mut session_state = session(&backend, &env).await;

        let result = session_state.login("ada@example.com", "wrong").await;

        assert!(matches!(result, Err(CoreError::Authorization(_))));
        assert!(env.credential.lock().unwrap().is_none());
        assert!(matches!(
            session_state.login("", "pw").await,
            Err(CoreError::Validation(_))
        ));
    }
}
