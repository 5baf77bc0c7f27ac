use tracing::{debug, warn};

use crate::{navigation::Location, session::Session};

pub const LANDING_PATH: &str = "/";
const MAX_REDIRECT_HOPS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    SignIn,
    SignUp,
    ForgotPassword,
    ResetPassword,
    Dashboard,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDef {
    pub path: String,
    pub exact: bool,
    pub view: View,
    pub access: Access,
}

impl RouteDef {
    pub fn public(path: impl Into<String>, view: View) -> Self {
        Self {
            path: path.into(),
            exact: false,
            view,
            access: Access::Public,
        }
    }

    pub fn private(path: impl Into<String>, view: View) -> Self {
        Self {
            access: Access::Private,
            ..Self::public(path, view)
        }
    }

    pub fn exact(mut self) -> Self {
        self.exact = true;
        self
    }

    /// Case-insensitive; a trailing slash is ignored. Non-exact routes also
    /// match deeper paths on a segment boundary.
    pub fn matches(&self, path: &str) -> bool {
        let route = normalize(&self.path);
        let path = normalize(path);

        if route.eq_ignore_ascii_case(&path) {
            return true;
        }
        if self.exact {
            return false;
        }
        if route == "/" {
            return true;
        }

        path.len() > route.len()
            && path.as_bytes()[route.len()] == b'/'
            && path[..route.len()].eq_ignore_ascii_case(&route)
    }
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDef>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteDef>) -> Self {
        Self { routes }
    }

    pub fn resolve(&self, path: &str) -> Option<&RouteDef> {
        self.routes.iter().find(|route| route.matches(path))
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(vec![
            RouteDef::public("/", View::SignIn).exact(),
            RouteDef::public("/signup", View::SignUp),
            RouteDef::public("/forgot-password", View::ForgotPassword),
            RouteDef::public("/reset-password", View::ResetPassword),
            RouteDef::private("/dashboard", View::Dashboard),
            RouteDef::public("/", View::NotFound),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub path: String,
    pub requested: View,
    pub access: Access,
}

impl NavigationRequest {
    pub fn for_route(path: impl Into<String>, route: &RouteDef) -> Self {
        Self {
            path: path.into(),
            requested: route.view,
            access: route.access,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Render(View),
    Redirect { to: String },
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    landing_path: String,
}

impl RouteGuard {
    pub fn new(landing_path: impl Into<String>) -> Self {
        Self {
            landing_path: landing_path.into(),
        }
    }

    pub fn evaluate(&self, request: &NavigationRequest, session: &Session) -> RouteDecision {
        match request.access {
            Access::Public => RouteDecision::Render(request.requested),
            Access::Private if session.is_authenticated() => {
                RouteDecision::Render(request.requested)
            }
            Access::Private => {
                debug!(path = %request.path, "private route without session; redirecting");
                RouteDecision::Redirect {
                    to: self.landing_path.clone(),
                }
            }
        }
    }
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(LANDING_PATH)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub location: Location,
    pub view: View,
}

#[derive(Debug, Clone, Default)]
pub struct Router {
    table: RouteTable,
    guard: RouteGuard,
}

impl Router {
    pub fn new(table: RouteTable, guard: RouteGuard) -> Self {
        Self { table, guard }
    }

    pub fn route(&self, location: &Location, session: &Session) -> Rendered {
        let mut location = location.clone();

        for _ in 0..MAX_REDIRECT_HOPS {
            let Some(route) = self.table.resolve(&location.path) else {
                return Rendered {
                    location,
                    view: View::NotFound,
                };
            };

            let request = NavigationRequest::for_route(location.path.clone(), route);
            match self.guard.evaluate(&request, session) {
                RouteDecision::Render(view) => return Rendered { location, view },
                RouteDecision::Redirect { to } => {
                    location = Location::parse(&to).unwrap_or_else(|_| Location::root());
                }
            }
        }

        warn!(path = %location.path, "redirect limit reached");
        Rendered {
            location,
            view: View::NotFound,
        }
    }
}

#[cfg(test)]
#[path = "tests/routing_tests.rs"]
mod tests;
