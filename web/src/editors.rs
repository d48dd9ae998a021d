use std::{collections::HashMap, sync::Arc};

use outcomes::{OutcomeEditorSession, OutcomeStore};
use parking_lot::Mutex;
use rocket::http::{Cookie, CookieJar};
use tracing::debug;
use uuid::Uuid;

pub const CLIENT_COOKIE: &str = "outcomes-client";

/// The shared store plus one editor session per client.
pub struct Editors {
    store: Arc<OutcomeStore>,
    sessions: Mutex<HashMap<String, OutcomeEditorSession>>,
}

impl Editors {
    pub fn new(store: Arc<OutcomeStore>) -> Self {
        Editors {
            store,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &OutcomeStore {
        &self.store
    }

    /// Runs `f` against the client's session, creating it on first use.
    /// Intents from one client are applied one at a time. A session left with
    /// nothing open is dropped; a closed session carries no state.
    pub fn with_session<T>(
        &self,
        client: &str,
        f: impl FnOnce(&mut OutcomeEditorSession) -> T,
    ) -> T {
        let mut sessions = self.sessions.lock();
        let session = sessions.entry(client.to_string()).or_insert_with(|| {
            debug!(client, "editor session started");
            OutcomeEditorSession::new(Arc::clone(&self.store))
        });
        let result = f(session);
        if session.is_idle() {
            sessions.remove(client);
        }
        result
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Empties the store and forgets every session.
    pub fn reset(&self) {
        let mut sessions = self.sessions.lock();
        sessions.clear();
        self.store.reset();
    }
}

/// The caller's client id, assigning a fresh one if the cookie is missing.
pub fn client_id(cookies: &CookieJar<'_>) -> String {
    match cookies.get(CLIENT_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => {
            let id = Uuid::new_v4().to_string();
            cookies.add(Cookie::new(CLIENT_COOKIE, id.clone()));
            id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outcomes::default_choices;

    fn editors() -> Editors {
        Editors::new(Arc::new(OutcomeStore::new()))
    }

    #[test]
    fn lookups_without_open_state_keep_no_session() {
        let editors = editors();
        for client in 0..10 {
            editors.with_session(&client.to_string(), |session| session.mode());
        }
        assert_eq!(editors.session_count(), 0);
    }

    #[test]
    fn session_lives_while_drawer_or_dialog_is_open() {
        let editors = editors();
        let outcome = editors.store().create("Kept", default_choices()).unwrap();

        editors.with_session("a", |session| session.open_for_create()).unwrap();
        editors
            .with_session("b", |session| session.request_delete(outcome.id))
            .unwrap();
        assert_eq!(editors.session_count(), 2);

        let name = editors.with_session("a", |session| {
            session.set_name("Draft").map(|_| session.state().draft_name.clone())
        });
        assert_eq!(name.unwrap(), "Draft");

        editors.with_session("a", |session| session.cancel());
        editors
            .with_session("b", |session| session.cancel_delete())
            .unwrap();
        assert_eq!(editors.session_count(), 0);
    }
}
