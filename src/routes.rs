// src/routes.rs

use std::fmt;

/// Navigation targets of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Quiz list (authenticated entry screen).
    Home,
    Login,
    Register,
    /// Quiz detail for a link code. The code is used verbatim.
    Quiz { code: String },
}

impl Route {
    pub fn quiz(code: impl Into<String>) -> Self {
        Route::Quiz { code: code.into() }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Quiz { code } => format!("/quiz/{}", code),
        }
    }

    /// Whether the screen behind this route needs a session.
    pub fn requires_session(&self) -> bool {
        matches!(self, Route::Home | Route::Quiz { .. })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
