// src/app.rs

use tokio::sync::watch;

use crate::{
    picker::PathPicker,
    routes::Route,
    screens::{
        auth::{LoginScreen, RegisterScreen},
        quiz_detail::{FreeTextOutcome, QuizDetailScreen},
        quiz_list::QuizListScreen,
    },
    state::AppState,
    ui::Alert,
};

/// A line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Email(String),
    Username(String),
    Password(String),
    Confirm(String),
    Login,
    Register,
    Signup,
    Refresh,
    Open(usize),
    Go(String),
    Copy(usize),
    Pick(String),
    Title(String),
    Create,
    Logout,
    Select { question: usize, option: usize },
    Submit,
    Answer { question: usize, text: String },
    Validate(usize),
    Back,
    Unknown(String),
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let number = |s: &str| s.trim().parse::<usize>().ok();
    let unknown = || Command::Unknown(line.to_string());

    let command = match word.to_ascii_lowercase().as_str() {
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "email" => Command::Email(rest.to_string()),
        "username" => Command::Username(rest.to_string()),
        "password" => Command::Password(rest.to_string()),
        "confirm" => Command::Confirm(rest.to_string()),
        "login" => Command::Login,
        "register" => Command::Register,
        "signup" => Command::Signup,
        "refresh" => Command::Refresh,
        "open" => number(rest).map(Command::Open).unwrap_or_else(unknown),
        "go" => Command::Go(rest.to_string()),
        "copy" => number(rest).map(Command::Copy).unwrap_or_else(unknown),
        "pick" => Command::Pick(rest.to_string()),
        "title" => Command::Title(rest.to_string()),
        "create" => Command::Create,
        "logout" => Command::Logout,
        "select" => {
            let mut parts = rest.split_whitespace();
            match (parts.next().and_then(number), parts.next().and_then(number)) {
                (Some(question), Some(option)) => Command::Select { question, option },
                _ => unknown(),
            }
        }
        "submit" => Command::Submit,
        "answer" => match rest.split_once(char::is_whitespace) {
            Some((n, text)) => match number(n) {
                Some(question) => Command::Answer {
                    question,
                    text: text.trim().to_string(),
                },
                None => unknown(),
            },
            None => number(rest)
                .map(|question| Command::Answer {
                    question,
                    text: String::new(),
                })
                .unwrap_or_else(unknown),
        },
        "validate" => number(rest).map(Command::Validate).unwrap_or_else(unknown),
        "back" | "home" => Command::Back,
        _ => unknown(),
    };
    Some(command)
}

pub enum Screen {
    Login(LoginScreen),
    Register(RegisterScreen),
    Home(QuizListScreen),
    Quiz(QuizDetailScreen),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Terminal front end: one mounted screen at a time.
pub struct App {
    state: AppState,
    route: Route,
    screen: Screen,
    session_rx: watch::Receiver<Option<String>>,
}

impl App {
    pub async fn start(state: AppState, initial: Route) -> Self {
        let session_rx = state.session.subscribe();
        let screen = Screen::Login(LoginScreen::new(state.clone()));
        let mut app = Self {
            state,
            route: Route::Login,
            screen,
            session_rx,
        };
        app.navigate(initial).await;
        app
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Mounts the screen for `route`. Authenticated routes fall back to the
    /// login screen when there is no session.
    pub async fn navigate(&mut self, route: Route) {
        let mut target = route;
        loop {
            if target.requires_session() && !self.state.session.is_signed_in() {
                target = Route::Login;
            }
            tracing::info!("Navigating to {}", target);

            let state = self.state.clone();
            self.screen = match &target {
                Route::Login => Screen::Login(LoginScreen::new(state)),
                Route::Register => Screen::Register(RegisterScreen::new(state)),
                Route::Home => {
                    let screen = QuizListScreen::new(state);
                    screen.refresh().await;
                    Screen::Home(screen)
                }
                Route::Quiz { code } => {
                    let screen = QuizDetailScreen::new(state, code.clone());
                    screen.load().await;
                    Screen::Quiz(screen)
                }
            };
            self.route = target.clone();
            self.session_rx.mark_unchanged();

            let redirect = match &self.screen {
                Screen::Quiz(screen) => screen.route(),
                Screen::Home(_) if !self.state.session.is_signed_in() => Some(Route::Login),
                _ => None,
            };
            match redirect {
                Some(next) if next != target => target = next,
                _ => break,
            }
        }
    }

    /// Runs one command against the mounted screen.
    pub async fn handle(&mut self, line: &str) -> Flow {
        let Some(command) = parse_command(line) else {
            return Flow::Continue;
        };
        if command == Command::Quit {
            return Flow::Quit;
        }
        if command == Command::Help {
            self.state.alerts.alert(Alert::new("Commands", self.help()));
            return Flow::Continue;
        }

        let next = self.dispatch(command).await;
        if let Some(route) = next {
            self.navigate(route).await;
        }
        self.follow_session().await;
        Flow::Continue
    }

    /// Sends the user to login when the session ended under an authenticated screen.
    async fn follow_session(&mut self) {
        let changed = self.session_rx.has_changed().unwrap_or(false);
        if !changed {
            return;
        }
        let signed_in = self.session_rx.borrow_and_update().is_some();
        if !signed_in && self.route.requires_session() {
            tracing::info!("Session ended, returning to login");
            self.navigate(Route::Login).await;
        }
    }

    async fn dispatch(&mut self, command: Command) -> Option<Route> {
        let alerts = self.state.alerts.clone();
        match (&self.screen, command) {
            (Screen::Login(screen), Command::Email(v)) => screen.set_email(&v),
            (Screen::Login(screen), Command::Password(v)) => screen.set_password(&v),
            (Screen::Login(screen), Command::Login) => return screen.submit().await.route(),
            (Screen::Login(_), Command::Register) => return Some(Route::Register),

            (Screen::Register(screen), Command::Email(v)) => screen.set_email(&v),
            (Screen::Register(screen), Command::Username(v)) => screen.set_username(&v),
            (Screen::Register(screen), Command::Password(v)) => screen.set_password(&v),
            (Screen::Register(screen), Command::Confirm(v)) => screen.set_confirm(&v),
            (Screen::Register(screen), Command::Signup | Command::Register) => {
                return screen.submit().await.route();
            }
            (Screen::Register(_), Command::Login) => return Some(Route::Login),

            (Screen::Home(screen), Command::Refresh) => screen.refresh().await,
            (Screen::Home(screen), Command::Open(n)) => {
                let route = screen.open(n);
                if route.is_none() {
                    alerts.alert(Alert::new("Error", format!("No quiz number {}", n)));
                }
                return route;
            }
            (Screen::Home(screen), Command::Go(code)) => return screen.direct_navigate(&code),
            (Screen::Home(screen), Command::Copy(n)) => match screen.code_of(n) {
                Some(code) => alerts.alert(Alert::new("Quiz code", code)),
                None => alerts.alert(Alert::new("Error", format!("No quiz number {}", n))),
            },
            (Screen::Home(screen), Command::Pick(path)) => {
                screen.select_document(&PathPicker::new(&path)).await;
            }
            (Screen::Home(screen), Command::Title(title)) => screen.set_title(&title),
            (Screen::Home(screen), Command::Create) => return screen.create_quiz().await.route(),
            (Screen::Home(screen), Command::Logout) => return Some(screen.logout().await),

            (Screen::Quiz(screen), Command::Select { question, option }) => {
                match screen.option_at(question, option) {
                    Some((id, opt)) => {
                        if !screen.select_option(&id, &opt) {
                            alerts.alert(Alert::new("Locked", "Answers were already submitted."));
                        }
                    }
                    None => alerts.alert(Alert::new("Error", "No such question or option.")),
                }
            }
            (Screen::Quiz(screen), Command::Submit) => {
                if screen.submit_multiple_choice().is_none() {
                    alerts.alert(Alert::new("Error", "Nothing to submit."));
                }
            }
            (Screen::Quiz(screen), Command::Answer { question, text }) => {
                match screen.free_text_question(question) {
                    Some(q) => screen.set_answer(&q, &text),
                    None => alerts.alert(Alert::new("Error", "No such question.")),
                }
            }
            (Screen::Quiz(screen), Command::Validate(n)) => match screen.free_text_question(n) {
                Some(q) => {
                    if let FreeTextOutcome::SessionExpired = screen.submit_free_text(&q).await {
                        return Some(Route::Login);
                    }
                }
                None => alerts.alert(Alert::new("Error", "No such question.")),
            },
            (Screen::Quiz(_), Command::Back) => return Some(Route::Home),

            (_, other) => {
                tracing::debug!("Ignored command {:?} on {}", other, self.route);
                alerts.alert(Alert::new(
                    "Unknown command",
                    "Type `help` to list the commands for this screen.",
                ));
            }
        }
        None
    }

    pub fn help(&self) -> String {
        match &self.screen {
            Screen::Login(_) => "email <v>, password <v>, login, register, quit",
            Screen::Register(_) => {
                "email <v>, username <v>, password <v>, confirm <v>, signup, login, quit"
            }
            Screen::Home(_) => {
                "refresh, open <n>, go <code>, copy <n>, pick <path>, title <text>, create, logout, quit"
            }
            Screen::Quiz(_) => {
                "select <q> <option>, submit, answer <n> <text>, validate <n>, back, quit"
            }
        }
        .to_string()
    }

    pub fn render(&self) -> String {
        match &self.screen {
            Screen::Login(screen) => screen.render(),
            Screen::Register(screen) => screen.render(),
            Screen::Home(screen) => screen.render(),
            Screen::Quiz(screen) => screen.render(),
        }
    }
}
