//! Session gate: identity resolution and login redirection.
//!
//! # Responsibility
//! - Subscribe to auth-state notifications for the lifetime of a view.
//! - Publish the resolved identity to dependents; redirect unauthenticated
//!   callers to the login route.
//!
//! # Invariants
//! - Exactly one `/login` navigation per signed-out transition; a later
//!   sign-in re-arms the redirect.
//! - The auth subscription is released when the gate is dropped.

use crate::auth::provider::{AuthProvider, AuthResult, AuthState, AuthSubscription};
use crate::model::task::Identity;
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Route unauthenticated callers are sent to.
pub const LOGIN_ROUTE: &str = "/login";

/// Client-side navigation primitive.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Narrow identity interface dependents are constructed with.
///
/// Components downstream of the gate must not reach back into provider
/// state; this is the only surface they get.
pub trait IdentitySource: Send + Sync {
    fn current_identity(&self) -> Option<Identity>;
}

/// Callback receiving identity changes (`None` = signed out).
pub type IdentityListener = dyn Fn(Option<&Identity>) + Send + Sync;

/// Resolves authentication state for one page view.
pub struct SessionGate {
    inner: Arc<GateInner>,
    provider: Arc<dyn AuthProvider>,
    _subscription: AuthSubscription,
}

struct GateInner {
    navigator: Arc<dyn Navigator>,
    identity: Mutex<Option<Identity>>,
    /// Latched after a login redirect; cleared by the next sign-in.
    redirected: AtomicBool,
    listeners: Mutex<Vec<Arc<IdentityListener>>>,
}

impl SessionGate {
    /// Subscribes to the provider and starts gating.
    ///
    /// If the provider has already resolved a state, it is applied before
    /// this call returns (an unauthenticated caller is redirected
    /// immediately).
    pub fn attach(provider: Arc<dyn AuthProvider>, navigator: Arc<dyn Navigator>) -> Self {
        let inner = Arc::new(GateInner {
            navigator,
            identity: Mutex::new(None),
            redirected: AtomicBool::new(false),
            listeners: Mutex::new(Vec::new()),
        });

        let inner_in_listener = Arc::clone(&inner);
        let subscription =
            provider.subscribe(Arc::new(move |state: &AuthState| {
                inner_in_listener.apply(state);
            }));

        info!("event=gate_attach module=gate status=ok");
        Self {
            inner,
            provider,
            _subscription: subscription,
        }
    }

    /// Registers a dependent callback and fires it with the current value.
    pub fn on_change(&self, listener: Arc<IdentityListener>) {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&listener));

        let current = self.current_identity();
        listener(current.as_ref());
    }

    /// Signs out with the provider and navigates to the login route.
    ///
    /// When the provider's own sign-out notification already triggered
    /// the redirect, it is not repeated.
    pub fn log_out(&self) -> AuthResult<()> {
        info!("event=log_out module=gate status=start");
        self.provider.sign_out()?;
        self.inner.redirect_to_login_once();
        info!("event=log_out module=gate status=ok");
        Ok(())
    }
}

impl IdentitySource for SessionGate {
    fn current_identity(&self) -> Option<Identity> {
        self.inner
            .identity
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl GateInner {
    fn apply(&self, state: &AuthState) {
        match state {
            AuthState::SignedIn(identity) => {
                *self
                    .identity
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(identity.clone());
                self.redirected.store(false, Ordering::SeqCst);
                info!("event=auth_state module=gate status=ok state=signed_in");
                self.notify(Some(identity));
            }
            AuthState::SignedOut => {
                *self
                    .identity
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = None;
                info!("event=auth_state module=gate status=ok state=signed_out");
                self.redirect_to_login_once();
                self.notify(None);
            }
        }
    }

    fn redirect_to_login_once(&self) {
        if self.redirected.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("event=redirect_login module=gate status=ok route={LOGIN_ROUTE}");
        self.navigator.navigate(LOGIN_ROUTE);
    }

    fn notify(&self, identity: Option<&Identity>) {
        // Snapshot before delivery so a callback may register another
        // listener without deadlocking the registry lock.
        let snapshot: Vec<Arc<IdentityListener>> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in snapshot {
            listener(identity);
        }
    }
}
