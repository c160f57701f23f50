//! Auth provider contract and in-process implementation.
//!
//! # Responsibility
//! - Define the subscribe/sign-out surface an external auth backend
//!   exposes to this core.
//! - Provide an in-process broadcaster that adapters and tests feed.
//!
//! # Invariants
//! - Subscribers receive the current state immediately once one exists,
//!   then every later change.
//! - Dropping an `AuthSubscription` detaches its listener; no delivery
//!   happens after teardown.

use crate::model::task::Identity;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

pub type AuthResult<T> = Result<T, AuthError>;

/// Auth provider failures surfaced to callers.
///
/// Resolution failures are deliberately absent: an unresolvable session
/// is reported as a plain `SignedOut` notification, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    SignOutFailed(String),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SignOutFailed(reason) => write!(f, "sign-out failed: {reason}"),
        }
    }
}

impl Error for AuthError {}

/// One auth-state notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    SignedIn(Identity),
    SignedOut,
}

impl AuthState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::SignedIn(identity) => Some(identity),
            Self::SignedOut => None,
        }
    }
}

/// Callback receiving auth-state notifications.
pub type AuthListener = dyn Fn(&AuthState) + Send + Sync;

/// External auth collaborator: change subscription plus sign-out.
pub trait AuthProvider: Send + Sync {
    /// Registers a listener for auth-state changes.
    ///
    /// # Contract
    /// - If a state is already resolved, the listener is invoked with it
    ///   before this call returns.
    /// - Notifications are delivered one at a time per announcer.
    fn subscribe(&self, listener: Arc<AuthListener>) -> AuthSubscription;

    /// Ends the current session with the external backend.
    fn sign_out(&self) -> AuthResult<()>;
}

/// RAII handle for an active auth subscription.
///
/// The listener stays attached for the lifetime of this handle and is
/// detached on drop (or an explicit `cancel`).
pub struct AuthSubscription {
    cancel: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl AuthSubscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Mutex::new(Some(Box::new(cancel))),
        }
    }

    /// Detaches the listener now instead of at drop time.
    pub fn cancel(&self) {
        let cancel = self
            .cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(cancel) = cancel {
            cancel();
        }
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// In-process auth-state broadcaster.
///
/// A backend adapter (or a test) feeds it via `sign_in`/`announce`; the
/// session gate consumes it through the `AuthProvider` trait.
#[derive(Clone, Default)]
pub struct InProcessAuthProvider {
    inner: Arc<ProviderInner>,
}

#[derive(Default)]
struct ProviderInner {
    /// `None` until the backend resolves the first state.
    state: Mutex<Option<AuthState>>,
    listeners: Mutex<BTreeMap<u64, Arc<AuthListener>>>,
    next_listener_id: AtomicU64,
}

impl InProcessAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a resolved state to every attached listener.
    pub fn announce(&self, state: AuthState) {
        *self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(state.clone());

        // Snapshot before delivery so a listener may unsubscribe itself
        // without deadlocking the registry lock.
        let snapshot: Vec<Arc<AuthListener>> = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for listener in snapshot {
            listener(&state);
        }
    }

    /// Convenience for announcing a signed-in state.
    pub fn sign_in(&self, identity: Identity) {
        self.announce(AuthState::SignedIn(identity));
    }

    /// Returns the last resolved state, if any.
    pub fn current_state(&self) -> Option<AuthState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AuthProvider for InProcessAuthProvider {
    fn subscribe(&self, listener: Arc<AuthListener>) -> AuthSubscription {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::clone(&listener));

        if let Some(state) = self.current_state() {
            listener(&state);
        }

        let weak = Arc::downgrade(&self.inner);
        AuthSubscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner
                    .listeners
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(&id);
            }
        })
    }

    fn sign_out(&self) -> AuthResult<()> {
        self.announce(AuthState::SignedOut);
        Ok(())
    }
}
