//! Access decision run before every route transition.
//!
//! The guard only reads session state and returns a decision; the adapter
//! in `navigator` is what actually moves the user or shows a notice.

use std::sync::Arc;

use tracing::{debug, info};

use super::routes::{RouteMeta, RouteSettings};
use crate::session::SessionService;

pub const ACCESS_DENIED_MESSAGE: &str = "You do not have permission to access this page";

/// A message the UI must show before completing a redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    AccessDenied { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Admit,
    Redirect {
        target: String,
        notice: Option<Notice>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardDecision {
    /// Page title from the target's metadata; applied whatever the verdict.
    pub title: Option<String>,
    pub verdict: Verdict,
}

impl GuardDecision {
    pub fn is_admitted(&self) -> bool {
        self.verdict == Verdict::Admit
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match &self.verdict {
            Verdict::Redirect { target, .. } => Some(target),
            Verdict::Admit => None,
        }
    }
}

pub struct NavigationGuard {
    session: Arc<dyn SessionService>,
    settings: RouteSettings,
}

impl NavigationGuard {
    pub fn new(session: Arc<dyn SessionService>, settings: RouteSettings) -> Self {
        NavigationGuard { session, settings }
    }

    pub fn settings(&self) -> &RouteSettings {
        &self.settings
    }

    /// Decide whether a transition to a route with `meta` may proceed.
    /// Checks run in order: authentication, then admin privilege.
    pub fn check(&self, path: &str, meta: &RouteMeta) -> GuardDecision {
        let title = meta.title.clone();

        if meta.requires_auth && !self.session.is_authenticated() {
            info!(path, "Unauthenticated navigation; redirecting to login");
            return GuardDecision {
                title,
                verdict: Verdict::Redirect {
                    target: self.settings.login.clone(),
                    notice: None,
                },
            };
        }

        if meta.requires_admin && !self.session.is_admin() {
            info!(path, "Navigation requires admin role; redirecting home");
            return GuardDecision {
                title,
                verdict: Verdict::Redirect {
                    target: self.settings.home.clone(),
                    notice: Some(Notice::AccessDenied {
                        message: ACCESS_DENIED_MESSAGE.to_string(),
                    }),
                },
            };
        }

        debug!(path, "Navigation admitted");
        GuardDecision {
            title,
            verdict: Verdict::Admit,
        }
    }
}
