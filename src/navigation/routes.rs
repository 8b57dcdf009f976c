use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const LOGIN_ROUTE: &str = "/login";
pub const HOME_ROUTE: &str = "/dashboard";

/// Where the guard sends users it turns away.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub struct RouteSettings {
    /// Target for unauthenticated users.
    #[serde(default = "default_login")]
    pub login: String,
    /// Default authenticated view; target for insufficient privileges.
    #[serde(default = "default_home")]
    pub home: String,
}

fn default_login() -> String {
    LOGIN_ROUTE.to_string()
}

fn default_home() -> String {
    HOME_ROUTE.to_string()
}

impl Default for RouteSettings {
    fn default() -> Self {
        RouteSettings {
            login: default_login(),
            home: default_home(),
        }
    }
}

/// Access flags and title attached to a route.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub title: Option<String>,
    #[serde(default)]
    pub requires_auth: bool,
    #[serde(default)]
    pub requires_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub name: String,
    pub meta: RouteMeta,
}

impl Route {
    pub fn new(path: &str, name: &str, title: &str) -> Self {
        Route {
            path: path.to_string(),
            name: name.to_string(),
            meta: RouteMeta {
                title: Some(title.to_string()),
                ..RouteMeta::default()
            },
        }
    }

    pub fn requires_auth(mut self) -> Self {
        self.meta.requires_auth = true;
        self
    }

    pub fn requires_admin(mut self) -> Self {
        self.meta.requires_admin = true;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        RouteTable { routes }
    }

    /// The views of the analytics client.
    pub fn standard() -> Self {
        const APP: &str = "Student Analytics";
        RouteTable::new(vec![
            Route::new("/", "Home", &format!("Analysis - {}", APP)),
            Route::new(LOGIN_ROUTE, "Login", &format!("Login - {}", APP)),
            Route::new(HOME_ROUTE, "Dashboard", &format!("Dashboard - {}", APP)).requires_auth(),
            Route::new(
                "/data-management",
                "DataManagement",
                &format!("Data Management - {}", APP),
            )
            .requires_auth(),
            Route::new("/analysis", "Analysis", &format!("Analysis - {}", APP)).requires_auth(),
            Route::new(
                "/user-management",
                "UserManagement",
                &format!("User Management - {}", APP),
            )
            .requires_auth()
            .requires_admin(),
        ])
    }

    /// Exact path match; a trailing slash is ignored.
    pub fn resolve(&self, path: &str) -> Option<&Route> {
        let wanted = normalize(path);
        self.routes.iter().find(|route| normalize(&route.path) == wanted)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_flags() {
        let table = RouteTable::standard();
        let admin = table.resolve("/user-management").unwrap();
        assert!(admin.meta.requires_auth && admin.meta.requires_admin);

        let login = table.resolve("/login").unwrap();
        assert!(!login.meta.requires_auth);

        let dashboard = table.resolve("/dashboard/").unwrap();
        assert_eq!(dashboard.name, "Dashboard");
        assert!(dashboard.meta.requires_auth && !dashboard.meta.requires_admin);
    }

    #[test]
    fn resolve_ignores_query_and_handles_root() {
        let table = RouteTable::standard();
        assert_eq!(table.resolve("/analysis?tab=gender").unwrap().name, "Analysis");
        assert_eq!(table.resolve("/").unwrap().name, "Home");
        assert!(table.resolve("/nowhere").is_none());
    }
}
