use chrono::{DateTime, Utc};
use shared::{domain::UserProfile, protocol::SessionResponse};
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    user: Option<UserProfile>,
    expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A blank token yields an anonymous session.
    pub fn authenticated(token: impl Into<String>, user: Option<UserProfile>) -> Self {
        let token: String = token.into();
        Self {
            token: (!token.trim().is_empty()).then_some(token),
            user,
            expires_at: None,
        }
    }

    pub fn expiring_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(Utc::now())
    }

    pub fn is_authenticated_at(&self, now: DateTime<Utc>) -> bool {
        self.token.is_some() && self.expires_at.map_or(true, |exp| now < exp)
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

impl From<SessionResponse> for Session {
    fn from(value: SessionResponse) -> Self {
        Self::authenticated(value.token, Some(value.user))
    }
}

#[derive(Clone)]
pub struct SessionStore {
    tx: watch::Sender<Session>,
}

impl SessionStore {
    pub fn new(initial: Session) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    pub fn current(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub fn replace(&self, session: Session) -> Session {
        self.tx.send_replace(session)
    }

    pub fn sign_in(&self, session: Session) {
        let user_id = session.user().map(|u| u.id.to_string());
        self.replace(session);
        info!(user_id = user_id.as_deref().unwrap_or("-"), "session started");
    }

    pub fn sign_out(&self) {
        let previous = self.replace(Session::anonymous());
        if previous.token().is_some() {
            info!("session ended");
        }
    }

    pub fn expire_if_stale(&self, now: DateTime<Utc>) -> bool {
        let stale = {
            let current = self.tx.borrow();
            current.token().is_some() && !current.is_authenticated_at(now)
        };
        if stale {
            self.replace(Session::anonymous());
            info!("session expired");
        }
        stale
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Session::anonymous())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn anonymous_session_is_not_authenticated() {
        let session = Session::anonymous();
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
    }

    #[test]
    fn blank_token_is_not_a_session() {
        let session = Session::authenticated("  ", None);
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
    }

    #[test]
    fn expired_session_is_not_authenticated() {
        let now = Utc::now();
        let session = Session::authenticated("tok", None).expiring_at(now);
        assert!(session.is_authenticated_at(now - Duration::seconds(1)));
        assert!(!session.is_authenticated_at(now));
    }

    #[test]
    fn store_replaces_whole_value() {
        let store = SessionStore::default();
        let mut rx = store.subscribe();

        store.sign_in(Session::authenticated("tok", None));
        assert!(rx.has_changed().expect("sender alive"));
        assert_eq!(rx.borrow_and_update().token(), Some("tok"));

        store.sign_out();
        assert_eq!(store.current(), Session::anonymous());
    }

    #[test]
    fn expire_if_stale_only_drops_expired_sessions() {
        let now = Utc::now();
        let store = SessionStore::new(
            Session::authenticated("tok", None).expiring_at(now + Duration::minutes(5)),
        );

        assert!(!store.expire_if_stale(now));
        assert!(store.current().is_authenticated_at(now));

        assert!(store.expire_if_stale(now + Duration::minutes(10)));
        assert_eq!(store.current(), Session::anonymous());
    }
}
