//! Mounted guard and its background watcher task.

use std::future;
use std::sync::Arc;

use chrono::Utc;
use rio_security::{Requirement, resolve_role};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::ports::{AuthEvent, Navigator, SessionCache};
use crate::state::{GuardState, View};

/// Per-tree guard options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOptions {
    pub requirement: Requirement,
    /// Client-side route to navigate to once the session is gone.
    pub login_path: String,
}

impl Default for GuardOptions {
    fn default() -> Self {
        Self {
            requirement: Requirement::AuthRequired,
            login_path: "/".to_owned(),
        }
    }
}

impl GuardOptions {
    /// Options for a tree that only admins may see.
    #[must_use]
    pub fn admin() -> Self {
        Self {
            requirement: Requirement::AdminRequired,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }
}

/// A mounted render guard.
///
/// State starts at [`GuardState::Loading`] and is driven by a background task
/// that owns the auth-event subscription. Dropping the guard aborts that task,
/// which releases the subscription.
pub struct RenderGuard {
    requirement: Requirement,
    state: watch::Receiver<GuardState>,
    task: JoinHandle<()>,
}

impl RenderGuard {
    /// Mount the guard and start resolving the cached session.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn mount(
        cache: Arc<dyn SessionCache>,
        events: broadcast::Receiver<AuthEvent>,
        navigator: Arc<dyn Navigator>,
        options: GuardOptions,
    ) -> Self {
        let (tx, rx) = watch::channel(GuardState::Loading);
        let watcher = Watcher {
            cache,
            navigator,
            login_path: options.login_path,
            state: tx,
        };
        let task = tokio::spawn(watcher.run(events));

        Self {
            requirement: options.requirement,
            state: rx,
            task,
        }
    }

    #[must_use]
    pub fn requirement(&self) -> Requirement {
        self.requirement
    }

    #[must_use]
    pub fn state(&self) -> GuardState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn view(&self) -> View {
        self.state.borrow().view(self.requirement)
    }

    /// Subscribe to state changes, e.g. to trigger re-renders.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<GuardState> {
        self.state.clone()
    }

    /// Wait until the initial session read has settled.
    ///
    /// Resolves to [`GuardState::Unauthenticated`] if the watcher is gone
    /// before settling.
    pub async fn settled(&self) -> GuardState {
        let mut rx = self.state.clone();
        match rx.wait_for(GuardState::is_settled).await {
            Ok(state) => state.clone(),
            Err(_) => GuardState::Unauthenticated,
        }
    }
}

impl Drop for RenderGuard {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct Watcher {
    cache: Arc<dyn SessionCache>,
    navigator: Arc<dyn Navigator>,
    login_path: String,
    state: watch::Sender<GuardState>,
}

impl Watcher {
    async fn run(self, mut events: broadcast::Receiver<AuthEvent>) {
        match self.read_unless_signed_out(&mut events).await {
            Some(state) => self.publish(state),
            None => {
                tracing::debug!("Sign-out arrived before the initial session read settled");
                self.sign_out();
            }
        }

        loop {
            match events.recv().await {
                Ok(AuthEvent::SignedOut) => self.sign_out(),
                Ok(AuthEvent::SignedIn | AuthEvent::TokenRefreshed) => {
                    self.revalidate(&mut events).await;
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Auth events lagged; re-validating session");
                    self.revalidate(&mut events).await;
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    /// Read the session cache, abandoning the read if a sign-out arrives first.
    async fn read_unless_signed_out(
        &self,
        events: &mut broadcast::Receiver<AuthEvent>,
    ) -> Option<GuardState> {
        tokio::select! {
            biased;
            () = signed_out(events) => None,
            state = self.read() => Some(state),
        }
    }

    async fn read(&self) -> GuardState {
        match self.cache.current_session().await {
            Ok(Some(identity)) if !identity.is_expired_at(Utc::now()) => {
                let role = resolve_role(&identity);
                GuardState::Authenticated { identity, role }
            }
            Ok(Some(identity)) => {
                tracing::debug!(email = identity.email(), "Cached session is expired");
                GuardState::Unauthenticated
            }
            Ok(None) => GuardState::Unauthenticated,
            Err(e) => {
                tracing::warn!(error = %e, "Session cache read failed");
                GuardState::Unauthenticated
            }
        }
    }

    async fn revalidate(&self, events: &mut broadcast::Receiver<AuthEvent>) {
        let was_authenticated = self.state.borrow().is_authenticated();

        match self.read_unless_signed_out(events).await {
            Some(state) => {
                let lost = was_authenticated && !state.is_authenticated();
                self.publish(state);
                if lost {
                    self.navigator.redirect(&self.login_path);
                }
            }
            None => self.sign_out(),
        }
    }

    fn sign_out(&self) {
        self.publish(GuardState::Unauthenticated);
        self.navigator.redirect(&self.login_path);
    }

    fn publish(&self, state: GuardState) {
        tracing::debug!(
            authenticated = state.is_authenticated(),
            "Render guard state changed"
        );
        self.state.send_modify(|current| *current = state);
    }
}

/// Completes on the next `SignedOut` event. Never completes once the event
/// stream is closed.
async fn signed_out(events: &mut broadcast::Receiver<AuthEvent>) {
    loop {
        match events.recv().await {
            Ok(AuthEvent::SignedOut) => return,
            Ok(AuthEvent::SignedIn | AuthEvent::TokenRefreshed) | Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => future::pending::<()>().await,
        }
    }
}
