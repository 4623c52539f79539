// src/screens/gate.rs

use std::sync::Arc;

use crate::{routes::Route, session::Session, token_store::TokenStore};

/// What the gate currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateView {
    /// Storage read still pending.
    Loading,
    /// No session: go to this route, show nothing else.
    Redirect(Route),
    /// Session present: show the authenticated entry screen.
    Ready(Route),
}

/// Decides at launch whether the user lands on the app or on the login screen.
#[derive(Debug)]
pub struct SessionGate {
    view: GateView,
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionGate {
    pub fn new() -> Self {
        Self {
            view: GateView::Loading,
        }
    }

    pub fn view(&self) -> &GateView {
        &self.view
    }

    /// Reads the stored token once. No retry: a failed read is a signed-out user.
    pub async fn resolve(&mut self, store: Arc<dyn TokenStore>) -> Session {
        let session = Session::restore(store).await;
        self.view = if session.is_signed_in() {
            GateView::Ready(Route::Home)
        } else {
            GateView::Redirect(Route::Login)
        };
        session
    }

    /// Where to go once resolved. `None` while loading.
    pub fn route(&self) -> Option<Route> {
        match &self.view {
            GateView::Loading => None,
            GateView::Redirect(route) | GateView::Ready(route) => Some(route.clone()),
        }
    }

    pub fn render(&self) -> String {
        match &self.view {
            GateView::Loading => "Loading...".to_string(),
            GateView::Redirect(_) => String::new(),
            GateView::Ready(route) => format!("-> {}", route),
        }
    }
}
