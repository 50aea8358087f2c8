//! Mocked sign-in state and theme preference, persisted in a local
//! key-value store so they survive a restart.

use crate::core::constants::{CURRENT_USER_KEY, THEME_KEY, USER_DATA_KEY};
use crate::core::errors::LedgerError;
use crate::core::models::user::{SessionUser, Theme, UserProfile};
use crate::infrastructure::kv::KeyValueStore;
use chrono::Utc;
use log::{info, warn};
use tokio::sync::RwLock;

pub const DEMO_USER_ID: &str = "demo-user-123";
pub const DEMO_EMAIL: &str = "demo@example.com";
pub const DEMO_DISPLAY_NAME: &str = "Demo User";

#[derive(Clone, Debug)]
struct SignedIn {
    user: SessionUser,
    profile: UserProfile,
}

pub struct AppContext<K: KeyValueStore> {
    store: K,
    session: RwLock<Option<SignedIn>>,
    theme: RwLock<Theme>,
}

fn demo_user() -> SessionUser {
    SessionUser {
        uid: DEMO_USER_ID.to_string(),
        email: Some(DEMO_EMAIL.to_string()),
        display_name: Some(DEMO_DISPLAY_NAME.to_string()),
        photo_url: None,
    }
}

fn profile_for(user: &SessionUser) -> UserProfile {
    UserProfile {
        uid: user.uid.clone(),
        email: user.email.clone(),
        display_name: user.display_name.clone(),
        photo_url: user.photo_url.clone(),
        created_at: Utc::now(),
    }
}

impl<K: KeyValueStore> AppContext<K> {
    /// Restores the stored session, or signs in the demo user when there is
    /// none (or it cannot be read back).
    pub fn load(store: K) -> Result<Self, LedgerError> {
        let restored = Self::read_session(&store);
        let session = match restored {
            Some(signed_in) => {
                info!("Restored session for {}", signed_in.user.uid);
                signed_in
            }
            None => {
                let user = demo_user();
                let signed_in = SignedIn {
                    profile: profile_for(&user),
                    user,
                };
                Self::write_session(&store, &signed_in)?;
                info!("No stored session, signed in as {}", DEMO_USER_ID);
                signed_in
            }
        };

        let theme = match store.get(THEME_KEY)? {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!("Ignoring stored theme: {}", e);
                Theme::default()
            }),
            None => Theme::default(),
        };

        Ok(AppContext {
            store,
            session: RwLock::new(Some(session)),
            theme: RwLock::new(theme),
        })
    }

    fn read_session(store: &K) -> Option<SignedIn> {
        let user = store.get(CURRENT_USER_KEY).ok().flatten()?;
        let profile = store.get(USER_DATA_KEY).ok().flatten()?;
        let user = serde_json::from_str::<SessionUser>(&user);
        let profile = serde_json::from_str::<UserProfile>(&profile);
        match (user, profile) {
            (Ok(user), Ok(profile)) => Some(SignedIn { user, profile }),
            (Err(e), _) | (_, Err(e)) => {
                warn!("Error parsing stored user data: {}", e);
                None
            }
        }
    }

    fn write_session(store: &K, signed_in: &SignedIn) -> Result<(), LedgerError> {
        let user = serde_json::to_string(&signed_in.user)
            .map_err(|e| LedgerError::SessionStoreError(e.to_string()))?;
        let profile = serde_json::to_string(&signed_in.profile)
            .map_err(|e| LedgerError::SessionStoreError(e.to_string()))?;
        store.set(CURRENT_USER_KEY, &user)?;
        store.set(USER_DATA_KEY, &profile)
    }

    async fn sign_in(&self, user: SessionUser) -> Result<SessionUser, LedgerError> {
        let signed_in = SignedIn {
            profile: profile_for(&user),
            user,
        };
        Self::write_session(&self.store, &signed_in)?;
        let user = signed_in.user.clone();
        *self.session.write().await = Some(signed_in);
        info!("Signed in as {}", user.uid);
        Ok(user)
    }

    /// Only the demo account exists; the password is not checked.
    pub async fn login(&self, email: &str, _password: &str) -> Result<SessionUser, LedgerError> {
        if email.trim() != DEMO_EMAIL {
            warn!("Login rejected for {}", email);
            return Err(LedgerError::InvalidCredentials);
        }
        self.sign_in(demo_user()).await
    }

    pub async fn login_with_provider(&self) -> Result<SessionUser, LedgerError> {
        self.sign_in(demo_user()).await
    }

    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<SessionUser, LedgerError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(LedgerError::invalid("email", "Missing Email", "Email is required"));
        }
        if !email.contains('@') || !email.contains('.') || email.len() < 5 {
            return Err(LedgerError::invalid(
                "email",
                "Invalid Email",
                format!("{} is not a valid email address", email),
            ));
        }
        if password.is_empty() {
            return Err(LedgerError::invalid("password", "Invalid password", "Password cannot be empty"));
        }
        if display_name.trim().is_empty() {
            return Err(LedgerError::invalid("displayName", "Invalid name", "Name cannot be empty"));
        }

        let user = SessionUser {
            uid: format!("mock-{}", Utc::now().timestamp_millis()),
            email: Some(email.to_string()),
            display_name: Some(display_name.trim().to_string()),
            photo_url: None,
        };
        self.sign_in(user).await
    }

    pub async fn logout(&self) -> Result<(), LedgerError> {
        self.store.remove(CURRENT_USER_KEY)?;
        self.store.remove(USER_DATA_KEY)?;
        if let Some(previous) = self.session.write().await.take() {
            info!("Signed out {}", previous.user.uid);
        }
        Ok(())
    }

    pub async fn current_user(&self) -> Option<SessionUser> {
        self.session.read().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn profile(&self) -> Option<UserProfile> {
        self.session.read().await.as_ref().map(|s| s.profile.clone())
    }

    /// The signed-in user, or `NotSignedIn` naming what was attempted.
    pub async fn require_user(&self, action: &str) -> Result<SessionUser, LedgerError> {
        self.current_user()
            .await
            .ok_or_else(|| LedgerError::NotSignedIn(action.to_string()))
    }

    pub async fn theme(&self) -> Theme {
        *self.theme.read().await
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<Theme, LedgerError> {
        self.store.set(THEME_KEY, &theme.to_string())?;
        *self.theme.write().await = theme;
        Ok(theme)
    }
}
