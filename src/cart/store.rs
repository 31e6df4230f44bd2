//! Session-scoped cart ownership.
//!
//! Each browser session owns exactly one [`Cart`] behind an opaque UUID. The
//! store is the only writer; handlers borrow a session through [`CartStore::update`].

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Cart;

#[derive(Debug, Clone)]
pub struct CartSession {
    pub cart: Cart,
    pub city: Option<String>,
    touched_at: DateTime<Utc>,
}

impl CartSession {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            cart: Cart::new(),
            city: None,
            touched_at: now,
        }
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn touched_at(&self) -> DateTime<Utc> {
        self.touched_at
    }
}

#[derive(Debug, Clone)]
pub struct CartStore {
    sessions: Arc<RwLock<HashMap<Uuid, CartSession>>>,
    ttl: Duration,
}

impl CartStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Opens a new empty session, dropping any that sat idle past the TTL.
    pub async fn create(&self) -> (Uuid, CartSession) {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let ttl = self.ttl;
        let before = sessions.len();
        sessions.retain(|_, s| now - s.touched_at <= ttl);
        let purged = before - sessions.len();
        if purged > 0 {
            tracing::debug!(purged, "expired cart sessions removed");
        }

        let id = Uuid::new_v4();
        let session = CartSession::new(now);
        sessions.insert(id, session.clone());
        (id, session)
    }

    pub async fn get(&self, id: Uuid) -> Option<CartSession> {
        self.update(id, |session| session.clone()).await
    }

    /// Runs `f` against the session and refreshes its idle timer.
    /// Returns `None` when the session is unknown or has expired.
    pub async fn update<R>(&self, id: Uuid, f: impl FnOnce(&mut CartSession) -> R) -> Option<R> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let expired = sessions
            .get(&id)
            .is_some_and(|s| now - s.touched_at > self.ttl);
        if expired {
            sessions.remove(&id);
            return None;
        }
        let session = sessions.get_mut(&id)?;
        session.touched_at = now;
        Some(f(session))
    }

    /// Empties the session cart and hands its previous contents to the caller,
    /// along with the destination city. A concurrent taker sees an empty cart.
    pub async fn take_cart(&self, id: Uuid) -> Option<(Cart, Option<String>)> {
        self.update(id, |s| (std::mem::take(&mut s.cart), s.city.clone()))
            .await
    }

    /// Returns a cart taken with [`CartStore::take_cart`], keeping anything
    /// added to the session in the meantime.
    pub async fn restore_cart(&self, id: Uuid, cart: Cart) -> bool {
        self.update(id, |s| {
            let added = std::mem::replace(&mut s.cart, cart);
            s.cart.merge(added);
        })
        .await
        .is_some()
    }

    pub async fn remove(&self, id: Uuid) -> Option<CartSession> {
        self.sessions.write().await.remove(&id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
