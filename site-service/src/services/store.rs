//! Process-lifetime record store.
//!
//! Holds users, contact messages and newsletter subscriptions behind a
//! single lock; everything is lost on restart.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{SecondsFormat, Utc};

use crate::models::{
    ContactMessage, NewContact, NewNewsletter, NewUser, NewsletterSubscription, User,
};

#[derive(Clone)]
pub struct MemStore {
    inner: Arc<Mutex<StoreState>>,
}

struct StoreState {
    users: HashMap<i64, User>,
    contacts: HashMap<i64, ContactMessage>,
    newsletters: HashMap<i64, NewsletterSubscription>,
    next_user_id: i64,
    next_contact_id: i64,
    next_newsletter_id: i64,
}

impl StoreState {
    fn new() -> Self {
        Self {
            users: HashMap::new(),
            contacts: HashMap::new(),
            newsletters: HashMap::new(),
            next_user_id: 1,
            next_contact_id: 1,
            next_newsletter_id: 1,
        }
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreState::new())),
        }
    }

    pub async fn user(&self, id: i64) -> Option<User> {
        let state = self.inner.lock().expect("store lock poisoned");
        state.users.get(&id).cloned()
    }

    pub async fn user_by_username(&self, username: &str) -> Option<User> {
        let state = self.inner.lock().expect("store lock poisoned");
        state.users.values().find(|u| u.username == username).cloned()
    }

    pub async fn create_user(&self, input: NewUser) -> User {
        let mut state = self.inner.lock().expect("store lock poisoned");
        let id = state.next_user_id;
        state.next_user_id += 1;
        let user = User {
            id,
            username: input.username,
            password: input.password,
        };
        state.users.insert(id, user.clone());
        user
    }

    pub async fn create_contact(&self, input: NewContact) -> ContactMessage {
        let mut state = self.inner.lock().expect("store lock poisoned");
        let id = state.next_contact_id;
        state.next_contact_id += 1;
        let contact = ContactMessage {
            id,
            name: input.name,
            email: input.email,
            message: input.message,
            created_at: now_timestamp(),
        };
        state.contacts.insert(id, contact.clone());
        contact
    }

    pub async fn contacts(&self) -> Vec<ContactMessage> {
        let state = self.inner.lock().expect("store lock poisoned");
        let mut all: Vec<_> = state.contacts.values().cloned().collect();
        all.sort_by_key(|c| c.id);
        all
    }

    /// Get-or-create keyed by email. The duplicate check and the insert
    /// run under one lock, so concurrent submissions of the same email
    /// cannot produce two records.
    pub async fn create_newsletter(&self, input: NewNewsletter) -> NewsletterSubscription {
        let mut state = self.inner.lock().expect("store lock poisoned");

        if let Some(existing) = state.newsletters.values().find(|n| n.email == input.email) {
            tracing::debug!(email = %existing.email, "Returning existing newsletter subscription");
            return existing.clone();
        }

        let id = state.next_newsletter_id;
        state.next_newsletter_id += 1;
        let subscription = NewsletterSubscription {
            id,
            email: input.email,
            created_at: now_timestamp(),
        };
        state.newsletters.insert(id, subscription.clone());
        subscription
    }

    pub async fn newsletters(&self) -> Vec<NewsletterSubscription> {
        let state = self.inner.lock().expect("store lock poisoned");
        let mut all: Vec<_> = state.newsletters.values().cloned().collect();
        all.sort_by_key(|n| n.id);
        all
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
