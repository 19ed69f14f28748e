//! Navigation guard for protected routes.

use std::collections::BTreeSet;

/// Where a navigation attempt should end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Allow,
    /// Send the visitor to the login surface, remembering where they were
    /// headed.
    RedirectToLogin { return_to: String },
}

impl Navigation {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decides navigation from the session state alone.
///
/// Routes listed as public are always reachable; everything else requires
/// an authenticated session.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    public_routes: BTreeSet<String>,
}

impl RouteGuard {
    pub const LOGIN_ROUTE: &'static str = "/login";

    pub fn new<I, S>(public_routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            public_routes: public_routes
                .into_iter()
                .map(|route| normalize(&route.into()))
                .collect(),
        }
    }

    pub fn is_public(&self, route: &str) -> bool {
        self.public_routes.contains(&normalize(route))
    }

    pub fn check(&self, route: &str, authenticated: bool) -> Navigation {
        if authenticated || self.is_public(route) {
            Navigation::Allow
        } else {
            Navigation::RedirectToLogin {
                return_to: route.to_string(),
            }
        }
    }
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(["/", Self::LOGIN_ROUTE, "/signup"])
    }
}

/// Drops the query string and any trailing slash.
fn normalize(route: &str) -> String {
    let path = route.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}
