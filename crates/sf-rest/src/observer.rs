//! Notification hook for refreshed access tokens.

/// Receives the new access token each time a refresh succeeds.
///
/// Called synchronously on the task that performed the refresh, after the
/// shared session already holds the new token. Use it to persist the token
/// alongside the user record.
///
/// Any `Fn(&str) + Send + Sync` closure is an observer:
///
/// ```rust,ignore
/// let chatter = Chatter::builder(credentials, session)
///     .with_token_observer(|token: &str| println!("new access token: {token}"))
///     .build()?;
/// ```
pub trait TokenObserver: Send + Sync {
    fn token_refreshed(&self, access_token: &str);
}

impl<F> TokenObserver for F
where
    F: Fn(&str) + Send + Sync,
{
    fn token_refreshed(&self, access_token: &str) {
        self(access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_closure_observer() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let observer: Box<dyn TokenObserver> =
            Box::new(move |token: &str| sink.lock().unwrap().push(token.to_string()));

        observer.token_refreshed("first");
        observer.token_refreshed("second");

        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }
}
