//! Logged-in session: current user, menu and screen permissions.
//!
//! Owned by the app and lent to pages; only the login, logout and token
//! refresh flows write to it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::api::ApiClient;
use crate::config::SessionConfig;
use crate::error::{ConsoleError, ConsoleResult};
use crate::routes::Screen;

/// Read permission code.
pub const READ: &str = "R";
/// Write permission code.
pub const WRITE: &str = "W";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub user_name: String,
    #[serde(default)]
    pub org_name: String,
}

/// Permission codes granted on one screen, e.g. `"RW"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenGrant {
    pub screen_key: String,
    pub auth: String,
}

/// `data` of a successful login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    pub token: String,
    pub user: User,
    #[serde(default)]
    pub permissions: Vec<ScreenGrant>,
}

pub struct SessionContext {
    user: Option<User>,
    current_menu: Option<Screen>,
    /// screen key -> granted codes
    permissions: HashMap<String, String>,
    idle_timeout: Option<Duration>,
    refresh_interval: Duration,
    last_activity: Instant,
    last_refresh: Instant,
}

impl SessionContext {
    pub fn new(config: &SessionConfig) -> Self {
        let now = Instant::now();
        Self {
            user: None,
            current_menu: None,
            permissions: HashMap::new(),
            idle_timeout: (config.idle_timeout_minutes > 0)
                .then(|| Duration::from_secs(config.idle_timeout_minutes * 60)),
            refresh_interval: Duration::from_secs(config.refresh_minutes.max(1) * 60),
            last_activity: now,
            last_refresh: now,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn current_menu(&self) -> Option<Screen> {
        self.current_menu
    }

    pub fn set_current_menu(&mut self, screen: Screen) {
        self.current_menu = Some(screen);
    }

    /// Whether every code in `auth_code` is granted on `screen_key`.
    pub fn has_permission(&self, auth_code: &str, screen_key: &str) -> bool {
        if self.user.is_none() || auth_code.is_empty() {
            return false;
        }
        self.permissions
            .get(screen_key)
            .is_some_and(|granted| auth_code.chars().all(|c| granted.contains(c)))
    }

    /// Start a session from a login response.
    pub fn establish(&mut self, payload: LoginPayload, api: &ApiClient) {
        api.set_token(Some(payload.token));
        self.permissions = payload
            .permissions
            .into_iter()
            .map(|g| (g.screen_key, g.auth.to_uppercase()))
            .collect();
        tracing::info!(user = %payload.user.user_id, screens = self.permissions.len(), "logged in");
        self.user = Some(payload.user);
        self.current_menu = None;
        let now = Instant::now();
        self.last_activity = now;
        self.last_refresh = now;
    }

    /// Store the token from a refresh response.
    pub fn apply_refresh(&mut self, data: &Value, api: &ApiClient) -> ConsoleResult<()> {
        let token = data
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| ConsoleError::InvalidState("refresh response without token".into()))?;
        api.set_token(Some(token.to_string()));
        self.last_refresh = Instant::now();
        tracing::debug!("access token refreshed");
        Ok(())
    }

    pub fn logout(&mut self, api: &ApiClient) {
        if let Some(user) = self.user.take() {
            tracing::info!(user = %user.user_id, "logged out");
        }
        api.set_token(None);
        self.permissions.clear();
        self.current_menu = None;
    }

    /// Record user input.
    pub fn touch(&mut self) {
        self.touch_at(Instant::now());
    }

    pub fn touch_at(&mut self, now: Instant) {
        self.last_activity = now;
    }

    /// Logged in and idle longer than the timeout.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.idle_timeout {
            Some(timeout) if self.is_logged_in() => now.saturating_duration_since(self.last_activity) >= timeout,
            _ => false,
        }
    }

    /// Logged in, active, and the token is older than the refresh interval.
    pub fn needs_refresh_at(&self, now: Instant) -> bool {
        self.is_logged_in()
            && !self.is_expired_at(now)
            && now.saturating_duration_since(self.last_refresh) >= self.refresh_interval
    }

    /// Note that a refresh was started so it is not requested again.
    pub fn mark_refreshing(&mut self, now: Instant) {
        self.last_refresh = now;
    }
}
