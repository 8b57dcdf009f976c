//! Boundary adapters between the headless core and whatever renders views.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{info, warn};

use super::guard::{NavigationGuard, Notice, Verdict};
use super::routes::RouteTable;
use crate::client::{SessionInvalidated, SessionInvalidationHandler};

/// A redirect target that itself redirects ends at the login route.
const MAX_REDIRECTS: usize = 1;

/// The UI side effects navigation can cause.
pub trait Navigator: Send + Sync {
    fn set_title(&self, title: &str);
    /// Blocking notice shown before a redirect completes.
    fn show_notice(&self, notice: &Notice);
    fn go_to(&self, path: &str);
}

/// Applies guard decisions to a navigator.
pub struct Router {
    table: RouteTable,
    guard: NavigationGuard,
    navigator: Arc<dyn Navigator>,
}

impl Router {
    pub fn new(table: RouteTable, guard: NavigationGuard, navigator: Arc<dyn Navigator>) -> Self {
        Router {
            table,
            guard,
            navigator,
        }
    }

    pub fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    /// Attempt a transition to `path` and return the path actually committed.
    /// Paths missing from the table carry no access flags.
    pub fn navigate(&self, path: &str) -> String {
        let mut target = path.to_string();
        for _ in 0..=MAX_REDIRECTS {
            let meta = self
                .table
                .resolve(&target)
                .map(|route| route.meta.clone())
                .unwrap_or_default();
            let decision = self.guard.check(&target, &meta);
            if let Some(title) = &decision.title {
                self.navigator.set_title(title);
            }
            match decision.verdict {
                Verdict::Admit => {
                    self.navigator.go_to(&target);
                    return target;
                }
                Verdict::Redirect { target: next, notice } => {
                    if let Some(notice) = notice {
                        self.navigator.show_notice(&notice);
                    }
                    target = next;
                }
            }
        }

        let login = self.guard.settings().login.clone();
        warn!(path, "Redirect loop while navigating; falling back to {}", login);
        self.navigator.go_to(&login);
        login
    }
}

/// Sends the user to the login view when the server rejects their session.
pub struct LoginRedirect {
    navigator: Arc<dyn Navigator>,
    login_route: String,
}

impl LoginRedirect {
    pub fn new(navigator: Arc<dyn Navigator>, login_route: impl Into<String>) -> Self {
        LoginRedirect {
            navigator,
            login_route: login_route.into(),
        }
    }
}

impl SessionInvalidationHandler for LoginRedirect {
    fn on_session_invalidated(&self, event: &SessionInvalidated) {
        info!(
            method = %event.method,
            path = event.path.as_str(),
            "Session invalidated; returning to {}",
            self.login_route
        );
        self.navigator.go_to(&self.login_route);
    }
}

#[derive(Default)]
struct NavigatorState {
    location: Option<String>,
    title: Option<String>,
}

/// A headless navigator that logs side effects and remembers where it is.
#[derive(Default)]
pub struct LogNavigator {
    state: Mutex<NavigatorState>,
}

impl LogNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, NavigatorState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn location(&self) -> Option<String> {
        self.state().location.clone()
    }

    pub fn title(&self) -> Option<String> {
        self.state().title.clone()
    }
}

impl Navigator for LogNavigator {
    fn set_title(&self, title: &str) {
        self.state().title = Some(title.to_string());
    }

    fn show_notice(&self, notice: &Notice) {
        match notice {
            Notice::AccessDenied { message } => warn!("{}", message),
        }
    }

    fn go_to(&self, path: &str) {
        info!("Navigated to {}", path);
        self.state().location = Some(path.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, Session};
    use crate::navigation::routes::{Route, RouteSettings};
    use crate::session::{MockSessionConfig, MockSessionService, SessionService};
    use crate::store::{MemoryStore, TokenStore};
    use http::Method;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl Navigator for Recorder {
        fn set_title(&self, title: &str) {
            self.events.lock().unwrap().push(format!("title:{}", title));
        }

        fn show_notice(&self, _notice: &Notice) {
            self.events.lock().unwrap().push("notice".to_string());
        }

        fn go_to(&self, path: &str) {
            self.events.lock().unwrap().push(format!("go:{}", path));
        }
    }

    fn router(role: Option<Role>, table: RouteTable) -> (Router, Arc<Recorder>, TokenStore) {
        let tokens = TokenStore::new(Arc::new(MemoryStore::new()));
        if let Some(role) = role {
            tokens
                .set(&Session {
                    token: "t".to_string(),
                    user_id: "1".to_string(),
                    username: "u".to_string(),
                    email: String::new(),
                    role,
                })
                .unwrap();
        }
        let session: Arc<dyn SessionService> = Arc::new(MockSessionService::new(
            &MockSessionConfig::default(),
            tokens.clone(),
        ));
        let recorder = Arc::new(Recorder::default());
        let guard = NavigationGuard::new(session, RouteSettings::default());
        (Router::new(table, guard, recorder.clone()), recorder, tokens)
    }

    fn gone_to(recorder: &Recorder) -> Vec<String> {
        recorder
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.starts_with("go:"))
            .cloned()
            .collect()
    }

    #[test]
    fn anonymous_dashboard_visit_lands_on_login() {
        let (router, recorder, _) = router(None, RouteTable::standard());
        assert_eq!(router.navigate("/dashboard"), "/login");
        assert_eq!(gone_to(&recorder), vec!["go:/login"]);
    }

    #[test]
    fn non_admin_sees_notice_and_lands_on_dashboard() {
        let (router, recorder, tokens) = router(Some(Role::Viewer), RouteTable::standard());
        let before = tokens.get();

        assert_eq!(router.navigate("/user-management"), "/dashboard");

        let events = recorder.events.lock().unwrap().clone();
        let notice_at = events.iter().position(|e| e == "notice").unwrap();
        let go_at = events.iter().position(|e| e == "go:/dashboard").unwrap();
        assert!(notice_at < go_at);
        assert_eq!(tokens.get(), before);
    }

    #[test]
    fn unknown_paths_are_admitted() {
        let (router, recorder, _) = router(None, RouteTable::standard());
        assert_eq!(router.navigate("/help"), "/help");
        assert_eq!(gone_to(&recorder), vec!["go:/help"]);
    }

    #[test]
    fn redirect_loop_falls_back_to_login() {
        // Home itself demands admin, so a non-admin bounces forever.
        let table = RouteTable::new(vec![
            Route::new("/dashboard", "Dashboard", "Dashboard")
                .requires_auth()
                .requires_admin(),
            Route::new("/admin", "Admin", "Admin").requires_auth().requires_admin(),
        ]);
        let (router, recorder, _) = router(Some(Role::User), table);
        assert_eq!(router.navigate("/admin"), "/login");
        assert_eq!(gone_to(&recorder), vec!["go:/login"]);
    }

    #[test]
    fn login_redirect_navigates_once_per_event() {
        let recorder = Arc::new(Recorder::default());
        let handler = LoginRedirect::new(recorder.clone(), "/login");
        handler.on_session_invalidated(&SessionInvalidated {
            method: Method::GET,
            path: "/files".to_string(),
        });
        assert_eq!(gone_to(&recorder), vec!["go:/login"]);
    }

    #[test]
    fn log_navigator_tracks_location() {
        let navigator = LogNavigator::new();
        navigator.set_title("Dashboard");
        navigator.go_to("/dashboard");
        assert_eq!(navigator.location().as_deref(), Some("/dashboard"));
        assert_eq!(navigator.title().as_deref(), Some("Dashboard"));
    }
}
