// src/screens/auth.rs

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use super::InFlight;
use crate::{
    api::SignUpResult,
    error::AppError,
    models::user::{LoginForm, SignUpForm},
    routes::Route,
    state::AppState,
    ui::Alert,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    SignedIn,
    /// Form failed local checks; nothing was sent.
    Invalid,
    /// The backend refused the credentials.
    Rejected,
    Failed,
    Busy,
}

impl LoginOutcome {
    pub fn route(&self) -> Option<Route> {
        matches!(self, LoginOutcome::SignedIn).then_some(Route::Home)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered,
    Invalid,
    AlreadyExists,
    Rejected,
    Failed,
    Busy,
}

impl RegisterOutcome {
    pub fn route(&self) -> Option<Route> {
        matches!(self, RegisterOutcome::Registered).then_some(Route::Home)
    }
}

pub struct LoginScreen {
    state: AppState,
    form: Mutex<LoginForm>,
    submitting: AtomicBool,
}

impl LoginScreen {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            form: Mutex::new(LoginForm::default()),
            submitting: AtomicBool::new(false),
        }
    }

    fn edit(&self, f: impl FnOnce(&mut LoginForm)) {
        if let Ok(mut form) = self.form.lock() {
            f(&mut form);
        }
    }

    pub fn set_email(&self, email: &str) {
        self.edit(|form| form.email = email.trim().to_string());
    }

    pub fn set_password(&self, password: &str) {
        self.edit(|form| form.password = password.to_string());
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Signs in, stores the token, then routes home.
    pub async fn submit(&self) -> LoginOutcome {
        let Some(_guard) = InFlight::enter(&self.submitting) else {
            return LoginOutcome::Busy;
        };
        let form = self.form.lock().map(|f| f.clone()).unwrap_or_default();
        let alerts = &self.state.alerts;

        if let Err(message) = form.check() {
            alerts.alert(Alert::new("Error", message));
            return LoginOutcome::Invalid;
        }

        tracing::info!("Signing in as {}", form.email);
        let token = match self.state.api.sign_in(&form).await {
            Ok(token) => token,
            Err(AppError::Unauthorized(_) | AppError::BadRequest(_) | AppError::NotFound(_)) => {
                alerts.alert(Alert::new("Login failed", "Invalid email or password."));
                return LoginOutcome::Rejected;
            }
            Err(e) => {
                tracing::error!("Login failed: {}", e);
                alerts.alert(Alert::new("Error", "Login failed."));
                return LoginOutcome::Failed;
            }
        };

        if let Err(e) = self.state.session.sign_in(&token).await {
            tracing::error!("Failed to store session: {}", e);
            alerts.alert(Alert::new("Error", "Could not save your session."));
            return LoginOutcome::Failed;
        }

        alerts.alert(Alert::new("Success", "Login successful!"));
        LoginOutcome::SignedIn
    }

    pub fn render(&self) -> String {
        let form = self.form.lock().map(|f| f.clone()).unwrap_or_default();
        let mut out = String::from("== Login ==\n");
        out.push_str(&format!("Email:    {}\n", form.email));
        out.push_str(&format!("Password: {}\n", "*".repeat(form.password.chars().count())));
        if self.is_submitting() {
            out.push_str("Signing in...\n");
        }
        out.push_str("(no account? `register`)\n");
        out
    }
}

pub struct RegisterScreen {
    state: AppState,
    form: Mutex<SignUpForm>,
    submitting: AtomicBool,
}

impl RegisterScreen {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            form: Mutex::new(SignUpForm::default()),
            submitting: AtomicBool::new(false),
        }
    }

    fn edit(&self, f: impl FnOnce(&mut SignUpForm)) {
        if let Ok(mut form) = self.form.lock() {
            f(&mut form);
        }
    }

    pub fn set_email(&self, email: &str) {
        self.edit(|form| form.email = email.trim().to_string());
    }

    pub fn set_username(&self, username: &str) {
        self.edit(|form| form.username = username.trim().to_string());
    }

    pub fn set_password(&self, password: &str) {
        self.edit(|form| form.password = password.to_string());
    }

    pub fn set_confirm(&self, confirm: &str) {
        self.edit(|form| form.confirm = confirm.to_string());
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    pub async fn submit(&self) -> RegisterOutcome {
        let Some(_guard) = InFlight::enter(&self.submitting) else {
            return RegisterOutcome::Busy;
        };
        let form = self.form.lock().map(|f| f.clone()).unwrap_or_default();
        let alerts = &self.state.alerts;

        if let Err(message) = form.check() {
            alerts.alert(Alert::new("Error", message));
            return RegisterOutcome::Invalid;
        }

        tracing::info!("Creating account {}", form.username);
        match self.state.api.sign_up(&form).await {
            Ok(SignUpResult::Created { token }) => {
                if let Err(e) = self.state.session.sign_in(&token).await {
                    tracing::error!("Failed to store session: {}", e);
                    alerts.alert(Alert::new("Error", "Could not save your session."));
                    return RegisterOutcome::Failed;
                }
                RegisterOutcome::Registered
            }
            Ok(SignUpResult::AlreadyExists) => {
                alerts.alert(Alert::new("Error", "User already exists."));
                RegisterOutcome::AlreadyExists
            }
            Err(AppError::BadRequest(body)) => {
                tracing::warn!("Signup rejected: {}", body);
                alerts.alert(Alert::new("Error", "Invalid signup data."));
                RegisterOutcome::Rejected
            }
            Err(e) => {
                tracing::error!("Signup failed: {}", e);
                alerts.alert(Alert::new("Error", "Signup failed."));
                RegisterOutcome::Failed
            }
        }
    }

    pub fn render(&self) -> String {
        let form = self.form.lock().map(|f| f.clone()).unwrap_or_default();
        let mut out = String::from("== Register ==\n");
        out.push_str(&format!("Email:    {}\n", form.email));
        out.push_str(&format!("Username: {}\n", form.username));
        out.push_str(&format!("Password: {}\n", "*".repeat(form.password.chars().count())));
        out.push_str(&format!("Confirm:  {}\n", "*".repeat(form.confirm.chars().count())));
        out.push_str(if self.is_submitting() {
            "...\n"
        } else {
            "(have an account? `login`)\n"
        });
        out
    }
}
