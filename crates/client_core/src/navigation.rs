use std::{
    collections::BTreeMap,
    sync::{Mutex, PoisonError},
};

use tracing::{info, warn};
use url::Url;

const LOCATION_BASE: &str = "http://localhost";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: BTreeMap<String, String>,
}

impl Location {
    pub fn parse(target: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(LOCATION_BASE)?.join(target)?;
        Ok(Self {
            path: url.path().to_string(),
            query: url.query_pairs().into_owned().collect(),
        })
    }

    pub fn root() -> Self {
        Self {
            path: "/".into(),
            query: BTreeMap::new(),
        }
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)?;
        if !self.query.is_empty() {
            let mut url = Url::parse(LOCATION_BASE).map_err(|_| std::fmt::Error)?;
            url.query_pairs_mut().extend_pairs(self.query.iter());
            if let Some(q) = url.query() {
                write!(f, "?{q}")?;
            }
        }
        Ok(())
    }
}

pub trait Navigator: Send + Sync {
    fn current_location(&self) -> Location;
    fn navigate(&self, path: &str);
}

pub struct MemoryNavigator {
    history: Mutex<Vec<Location>>,
}

impl MemoryNavigator {
    pub fn new(initial: Location) -> Self {
        Self {
            history: Mutex::new(vec![initial]),
        }
    }

    pub fn at(target: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Location::parse(target)?))
    }

    pub fn history(&self) -> Vec<Location> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new(Location::root())
    }
}

impl Navigator for MemoryNavigator {
    fn current_location(&self) -> Location {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
            .unwrap_or_else(Location::root)
    }

    fn navigate(&self, path: &str) {
        match Location::parse(path) {
            Ok(location) => {
                info!(to = %location, "navigate");
                self.history
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(location);
            }
            Err(err) => warn!(path, "ignoring navigation to unparseable path: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_path_and_query() {
        let location = Location::parse("/reset-password?token=abc%20123&x=").expect("parse");
        assert_eq!(location.path, "/reset-password");
        assert_eq!(location.query_param("token"), Some("abc 123"));
        assert_eq!(location.query_param("x"), None);
        assert_eq!(location.query_param("missing"), None);
    }

    #[test]
    fn display_round_trips_query() {
        let location = Location::parse("/reset-password?token=abc").expect("parse");
        assert_eq!(location.to_string(), "/reset-password?token=abc");
        assert_eq!(Location::root().to_string(), "/");
    }

    #[test]
    fn navigate_pushes_history() {
        let nav = MemoryNavigator::at("/forgot-password").expect("nav");
        nav.navigate("/");
        nav.navigate("/dashboard");

        let paths: Vec<String> = nav.history().into_iter().map(|l| l.path).collect();
        assert_eq!(paths, vec!["/forgot-password", "/", "/dashboard"]);
        assert_eq!(nav.current_location().path, "/dashboard");
    }
}
