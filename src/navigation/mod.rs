pub mod guard;
pub mod navigator;
pub mod routes;

pub use guard::{GuardDecision, NavigationGuard, Notice, Verdict, ACCESS_DENIED_MESSAGE};
pub use navigator::{LogNavigator, LoginRedirect, Navigator, Router};
pub use routes::{Route, RouteMeta, RouteSettings, RouteTable};
