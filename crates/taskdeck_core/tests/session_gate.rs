use std::sync::{Arc, Mutex};
use taskdeck_core::{
    AuthState, Identity, IdentitySource, InProcessAuthProvider, Navigator, SessionGate,
    LOGIN_ROUTE,
};

#[derive(Default)]
struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_string());
    }
}

fn gate_with_provider() -> (InProcessAuthProvider, Arc<RecordingNavigator>, SessionGate) {
    let provider = InProcessAuthProvider::new();
    let navigator = Arc::new(RecordingNavigator::default());
    let gate = SessionGate::attach(Arc::new(provider.clone()), navigator.clone());
    (provider, navigator, gate)
}

#[test]
fn signed_out_notification_redirects_exactly_once() {
    let (provider, navigator, gate) = gate_with_provider();

    provider.announce(AuthState::SignedOut);
    provider.announce(AuthState::SignedOut);

    assert_eq!(navigator.routes(), vec![LOGIN_ROUTE.to_string()]);
    assert_eq!(gate.current_identity(), None);
}

#[test]
fn sign_in_publishes_identity_and_rearms_redirect() {
    let (provider, navigator, gate) = gate_with_provider();

    provider.announce(AuthState::SignedOut);
    provider.sign_in(Identity::from("a@x.com"));
    assert_eq!(gate.current_identity(), Some(Identity::from("a@x.com")));

    provider.announce(AuthState::SignedOut);
    assert_eq!(
        navigator.routes(),
        vec![LOGIN_ROUTE.to_string(), LOGIN_ROUTE.to_string()]
    );
    assert_eq!(gate.current_identity(), None);
}

#[test]
fn attach_after_resolution_applies_current_state_immediately() {
    let provider = InProcessAuthProvider::new();
    provider.sign_in(Identity::from("a@x.com"));

    let navigator = Arc::new(RecordingNavigator::default());
    let gate = SessionGate::attach(Arc::new(provider), navigator.clone());

    assert_eq!(gate.current_identity(), Some(Identity::from("a@x.com")));
    assert!(navigator.routes().is_empty());
}

#[test]
fn on_change_fires_immediately_and_on_every_change() {
    let (provider, _navigator, gate) = gate_with_provider();
    provider.sign_in(Identity::from("a@x.com"));

    let seen: Arc<Mutex<Vec<Option<Identity>>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_in_listener = Arc::clone(&seen);
    gate.on_change(Arc::new(move |identity: Option<&Identity>| {
        seen_in_listener.lock().unwrap().push(identity.cloned());
    }));

    provider.announce(AuthState::SignedOut);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], Some(Identity::from("a@x.com")));
    assert_eq!(seen[1], None);
}

#[test]
fn log_out_signs_out_and_navigates_once() {
    let (provider, navigator, gate) = gate_with_provider();
    provider.sign_in(Identity::from("a@x.com"));

    gate.log_out().unwrap();

    // The provider's own sign-out announcement already triggered the
    // redirect; log_out must not navigate a second time.
    assert_eq!(navigator.routes(), vec![LOGIN_ROUTE.to_string()]);
    assert_eq!(provider.current_state(), Some(AuthState::SignedOut));
    assert_eq!(gate.current_identity(), None);
}

#[test]
fn dropping_the_gate_releases_the_subscription() {
    let (provider, navigator, gate) = gate_with_provider();
    provider.sign_in(Identity::from("a@x.com"));

    drop(gate);
    provider.announce(AuthState::SignedOut);

    assert!(navigator.routes().is_empty());
}
