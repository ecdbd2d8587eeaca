#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use render_guard::{
    AuthEvent, GuardOptions, GuardState, Navigator, RenderGuard, SessionCache, SessionCacheError,
    View,
};
use rio_security::Identity;
use tokio::sync::{Notify, broadcast, watch};

struct FakeCache {
    session: Mutex<Result<Option<Identity>, SessionCacheError>>,
    gate: Option<Notify>,
    reads: AtomicUsize,
}

impl FakeCache {
    fn new(session: Option<Identity>) -> Arc<Self> {
        Arc::new(Self {
            session: Mutex::new(Ok(session)),
            gate: None,
            reads: AtomicUsize::new(0),
        })
    }

    /// Reads block until `release` is called.
    fn gated(session: Option<Identity>) -> Arc<Self> {
        Arc::new(Self {
            session: Mutex::new(Ok(session)),
            gate: Some(Notify::new()),
            reads: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            session: Mutex::new(Err(SessionCacheError("storage blocked".to_owned()))),
            gate: None,
            reads: AtomicUsize::new(0),
        })
    }

    fn set(&self, session: Option<Identity>) {
        *self.session.lock() = Ok(session);
    }

    fn release(&self) {
        self.gate.as_ref().unwrap().notify_one();
    }

    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionCache for FakeCache {
    async fn current_session(&self) -> Result<Option<Identity>, SessionCacheError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.session.lock().clone()
    }
}

#[derive(Default)]
struct RecordingNavigator {
    redirects: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    fn redirects(&self) -> Vec<String> {
        self.redirects.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, path: &str) {
        self.redirects.lock().push(path.to_owned());
    }
}

fn admin() -> Identity {
    Identity::builder()
        .email("admin@rio.local")
        .roles(["admin"])
        .build()
}

fn viewer() -> Identity {
    Identity::builder()
        .email("viewer@rio.local")
        .roles(["viewer"])
        .build()
}

struct Harness {
    guard: RenderGuard,
    events: broadcast::Sender<AuthEvent>,
    navigator: Arc<RecordingNavigator>,
}

fn mount(cache: Arc<FakeCache>, options: GuardOptions) -> Harness {
    let (events, rx) = broadcast::channel(16);
    let navigator = Arc::new(RecordingNavigator::default());
    let guard = RenderGuard::mount(cache, rx, navigator.clone(), options);
    Harness {
        guard,
        events,
        navigator,
    }
}

async fn wait_until(rx: &mut watch::Receiver<GuardState>, f: impl FnMut(&GuardState) -> bool) {
    tokio::time::timeout(Duration::from_secs(1), rx.wait_for(f))
        .await
        .expect("guard state did not change in time")
        .expect("guard task ended");
}

#[tokio::test]
async fn placeholder_until_session_read_settles() {
    let cache = FakeCache::gated(Some(admin()));
    let h = mount(cache.clone(), GuardOptions::admin());

    assert_eq!(h.guard.state(), GuardState::Loading);
    assert_eq!(h.guard.view(), View::Placeholder);

    cache.release();
    let state = h.guard.settled().await;

    assert!(state.is_authenticated());
    assert_eq!(h.guard.view(), View::Content);
    assert!(h.navigator.redirects().is_empty());
}

#[tokio::test]
async fn missing_session_renders_login_fallback_without_redirect() {
    let h = mount(FakeCache::new(None), GuardOptions::default());

    assert_eq!(h.guard.settled().await, GuardState::Unauthenticated);
    assert_eq!(h.guard.view(), View::LoginFallback);
    assert!(h.navigator.redirects().is_empty());
}

#[tokio::test]
async fn non_admin_gets_insufficient_privilege_fallback() {
    let h = mount(FakeCache::new(Some(viewer())), GuardOptions::admin());

    h.guard.settled().await;
    assert_eq!(h.guard.view(), View::InsufficientPrivilege);

    let h = mount(FakeCache::new(Some(viewer())), GuardOptions::default());
    h.guard.settled().await;
    assert_eq!(h.guard.view(), View::Content);
}

#[tokio::test]
async fn legacy_admin_flag_is_honoured() {
    let legacy = Identity::builder()
        .email("legacy@rio.local")
        .admin_flag(true)
        .build();
    let h = mount(FakeCache::new(Some(legacy)), GuardOptions::admin());

    h.guard.settled().await;
    assert_eq!(h.guard.view(), View::Content);
}

#[tokio::test]
async fn expired_cached_session_is_unauthenticated() {
    let stale = Identity::builder()
        .email("admin@rio.local")
        .roles(["admin"])
        .expires_at(Utc::now() - chrono::Duration::minutes(1))
        .build();
    let h = mount(FakeCache::new(Some(stale)), GuardOptions::default());

    assert_eq!(h.guard.settled().await, GuardState::Unauthenticated);
}

#[tokio::test]
async fn cache_failure_fails_closed() {
    let h = mount(FakeCache::failing(), GuardOptions::default());

    assert_eq!(h.guard.settled().await, GuardState::Unauthenticated);
    assert_eq!(h.guard.view(), View::LoginFallback);
}

#[tokio::test]
async fn sign_out_redirects_without_reload() {
    let h = mount(
        FakeCache::new(Some(admin())),
        GuardOptions::default().with_login_path("/login"),
    );
    h.guard.settled().await;
    let mut rx = h.guard.subscribe();

    h.events.send(AuthEvent::SignedOut).unwrap();
    wait_until(&mut rx, |s| *s == GuardState::Unauthenticated).await;

    assert_eq!(h.guard.view(), View::LoginFallback);
    assert_eq!(h.navigator.redirects(), vec!["/login".to_owned()]);
}

#[tokio::test]
async fn sign_out_during_initial_read_wins() {
    let cache = FakeCache::gated(Some(admin()));
    let h = mount(cache.clone(), GuardOptions::default());
    let mut rx = h.guard.subscribe();

    h.events.send(AuthEvent::SignedOut).unwrap();
    wait_until(&mut rx, |s| *s == GuardState::Unauthenticated).await;

    // The abandoned read must not resurrect the session.
    cache.release();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(h.guard.state(), GuardState::Unauthenticated);
    assert_eq!(h.navigator.redirects(), vec!["/".to_owned()]);
}

#[tokio::test]
async fn token_refresh_revalidates_from_cache() {
    let cache = FakeCache::new(Some(viewer()));
    let h = mount(cache.clone(), GuardOptions::admin());
    h.guard.settled().await;
    assert_eq!(h.guard.view(), View::InsufficientPrivilege);
    let mut rx = h.guard.subscribe();

    cache.set(Some(admin()));
    h.events.send(AuthEvent::TokenRefreshed).unwrap();
    wait_until(&mut rx, |s| {
        matches!(s, GuardState::Authenticated { role, .. } if role.is_admin)
    })
    .await;

    assert_eq!(h.guard.view(), View::Content);
    assert_eq!(cache.reads(), 2);
}

#[tokio::test]
async fn sign_in_after_sign_out_restores_session() {
    let cache = FakeCache::new(Some(admin()));
    let h = mount(cache.clone(), GuardOptions::default());
    h.guard.settled().await;
    let mut rx = h.guard.subscribe();

    cache.set(None);
    h.events.send(AuthEvent::SignedOut).unwrap();
    wait_until(&mut rx, |s| *s == GuardState::Unauthenticated).await;

    cache.set(Some(admin()));
    h.events.send(AuthEvent::SignedIn).unwrap();
    wait_until(&mut rx, GuardState::is_authenticated).await;

    assert_eq!(h.guard.view(), View::Content);
}

#[tokio::test]
async fn revalidation_that_loses_the_session_redirects() {
    let cache = FakeCache::new(Some(admin()));
    let h = mount(cache.clone(), GuardOptions::default());
    h.guard.settled().await;
    let mut rx = h.guard.subscribe();

    cache.set(None);
    h.events.send(AuthEvent::TokenRefreshed).unwrap();
    wait_until(&mut rx, |s| *s == GuardState::Unauthenticated).await;

    assert_eq!(h.navigator.redirects(), vec!["/".to_owned()]);
}

#[tokio::test]
async fn dropping_the_guard_releases_the_subscription() {
    let h = mount(FakeCache::new(Some(admin())), GuardOptions::default());
    h.guard.settled().await;
    assert_eq!(h.events.receiver_count(), 1);

    let Harness { guard, events, .. } = h;
    drop(guard);

    tokio::time::timeout(Duration::from_secs(1), async {
        while events.receiver_count() > 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("subscription was not released");
}
