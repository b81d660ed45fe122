//! Declarative route table.

use crate::session::{SessionContext, READ};

/// Every screen the console can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Login,
    Vehicles,
    Activities,
    Rentals,
    Permissions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub screen: Screen,
    pub title: &'static str,
    /// Screen key checked for read permission
    pub permission_key: Option<&'static str>,
    /// Reachable without logging in
    pub public: bool,
}

pub const ROUTES: &[Route] = &[
    Route {
        path: "/login",
        screen: Screen::Login,
        title: "로그인",
        permission_key: None,
        public: true,
    },
    Route {
        path: "/fleet/vehicles",
        screen: Screen::Vehicles,
        title: "차량 관리",
        permission_key: Some("VHC001"),
        public: false,
    },
    Route {
        path: "/activity/standard",
        screen: Screen::Activities,
        title: "표준 활동 조회",
        permission_key: Some("ACT001"),
        public: false,
    },
    Route {
        path: "/rental/assets",
        screen: Screen::Rentals,
        title: "임대 자산 현황",
        permission_key: Some("RNT001"),
        public: false,
    },
    Route {
        path: "/admin/permissions",
        screen: Screen::Permissions,
        title: "조직 권한 관리",
        permission_key: Some("AUT001"),
        public: false,
    },
];

pub fn route_for(screen: Screen) -> &'static Route {
    ROUTES
        .iter()
        .find(|r| r.screen == screen)
        .unwrap_or(&ROUTES[0])
}

impl Route {
    /// Whether the session may open this route.
    pub fn is_allowed(&self, session: &SessionContext) -> bool {
        if self.public {
            return true;
        }
        session.is_logged_in()
            && self
                .permission_key
                .map_or(true, |key| session.has_permission(READ, key))
    }
}

/// Menu entries for the session: public routes before login, readable screens after.
pub fn visible_routes(session: &SessionContext) -> Vec<&'static Route> {
    ROUTES
        .iter()
        .filter(|r| {
            if session.is_logged_in() {
                !r.public && r.is_allowed(session)
            } else {
                r.public
            }
        })
        .collect()
}

/// Where to go after login: the first readable screen.
pub fn landing(session: &SessionContext) -> Option<Screen> {
    visible_routes(session).first().map(|r| r.screen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::config::{ApiConfig, SessionConfig};
    use crate::session::LoginPayload;

    fn logged_in(grants: serde_json::Value) -> SessionContext {
        let api = ApiClient::new(&ApiConfig::default()).unwrap();
        let mut session = SessionContext::new(&SessionConfig::default());
        let payload: LoginPayload = serde_json::from_value(serde_json::json!({
            "token": "t",
            "user": {"userId": "kim", "userName": "김기사"},
            "permissions": grants
        }))
        .unwrap();
        session.establish(payload, &api);
        session
    }

    #[test]
    fn test_paths_are_unique() {
        for (i, a) in ROUTES.iter().enumerate() {
            for b in &ROUTES[i + 1..] {
                assert_ne!(a.path, b.path);
                assert_ne!(a.screen, b.screen);
            }
        }
    }

    #[test]
    fn test_anonymous_sees_login_only() {
        let session = SessionContext::new(&SessionConfig::default());
        let visible = visible_routes(&session);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].screen, Screen::Login);
        assert!(!route_for(Screen::Vehicles).is_allowed(&session));
    }

    #[test]
    fn test_visible_routes_follow_read_permission() {
        let session = logged_in(serde_json::json!([
            {"screenKey": "ACT001", "auth": "R"},
            {"screenKey": "RNT001", "auth": "W"}
        ]));
        let screens: Vec<Screen> = visible_routes(&session).iter().map(|r| r.screen).collect();
        assert_eq!(screens, vec![Screen::Activities]);
        assert_eq!(landing(&session), Some(Screen::Activities));
    }

    #[test]
    fn test_no_grants_no_landing() {
        let session = logged_in(serde_json::json!([]));
        assert_eq!(landing(&session), None);
    }
}
