// storefront/src/identity/session.rs

use crate::models::{AuthSession, SessionUser};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Notified once per identity transition: signed out to signed in, one user to another,
/// or signed in to signed out.
#[async_trait]
pub trait IdentityObserver: Send + Sync {
  async fn identity_changed(&self, user: Option<SessionUser>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct SessionInner {
  current: RwLock<Option<AuthSession>>,
  observers: RwLock<Vec<(SubscriptionId, Arc<dyn IdentityObserver>)>>,
  next_id: AtomicU64,
  /// Keeps notifications of consecutive transitions in order.
  transitions: tokio::sync::Mutex<()>,
}

/// Handle to the current auth session. Clones share the same state.
#[derive(Clone, Default)]
pub struct Session {
  inner: Arc<SessionInner>,
}

impl Session {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn current_user(&self) -> Option<SessionUser> {
    self.inner.current.read().as_ref().map(|s| s.user.clone())
  }

  pub fn access_token(&self) -> Option<String> {
    self.inner.current.read().as_ref().map(|s| s.access_token.clone())
  }

  pub fn is_signed_in(&self) -> bool {
    self.inner.current.read().is_some()
  }

  /// Installs `session`. Observers run only if the user differs from the current one;
  /// replacing the tokens of the same user is silent.
  pub async fn establish(&self, session: AuthSession) {
    self.transition(Some(session)).await;
  }

  pub async fn end(&self) {
    self.transition(None).await;
  }

  pub fn subscribe(&self, observer: Arc<dyn IdentityObserver>) -> SubscriptionId {
    let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
    self.inner.observers.write().push((id, observer));
    debug!(subscription = id.0, "Identity observer subscribed.");
    id
  }

  pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
    let mut observers = self.inner.observers.write();
    let before = observers.len();
    observers.retain(|(sid, _)| *sid != id);
    before != observers.len()
  }

  async fn transition(&self, next: Option<AuthSession>) {
    let _ordered = self.inner.transitions.lock().await;

    let (previous, user) = {
      let mut current = self.inner.current.write();
      let previous: Option<Uuid> = current.as_ref().map(|s| s.user.id);
      *current = next;
      (previous, current.as_ref().map(|s| s.user.clone()))
    };

    if previous == user.as_ref().map(|u| u.id) {
      debug!("Session refreshed without identity change.");
      return;
    }
    info!(
      from = ?previous,
      to = ?user.as_ref().map(|u| u.id),
      "Identity changed."
    );

    let observers: Vec<Arc<dyn IdentityObserver>> =
      self.inner.observers.read().iter().map(|(_, o)| Arc::clone(o)).collect();
    for observer in observers {
      observer.identity_changed(user.clone()).await;
    }
  }
}

impl std::fmt::Debug for Session {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Session")
      .field("user", &self.current_user())
      .field("observers", &self.inner.observers.read().len())
      .finish()
  }
}
