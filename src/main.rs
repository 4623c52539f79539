// src/main.rs

use std::io::Write;
use std::sync::Arc;

use dotenvy::dotenv;
use prepai::{
    app::{App, Flow},
    config::Config,
    screens::gate::SessionGate,
    state::AppState,
    token_store::FileTokenStore,
    ui::ConsoleAlerts,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "prepai.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    // The terminal belongs to the prompt; only warnings go to stderr.
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new("warn"));
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(file_layer.with_filter(env_filter))
        .with(stderr_layer)
        .init();

    if let Err(e) = run(config).await {
        tracing::error!("Client stopped: {}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), prepai::error::AppError> {
    tracing::info!("Using backend {}", config.backend_url);

    let mut gate = SessionGate::new();
    println!("{}", gate.render());
    let store = Arc::new(FileTokenStore::new(&config.token_file));
    let session = gate.resolve(store).await;
    let initial = gate.route().unwrap_or(prepai::Route::Login);

    let state = AppState::new(config, session, Arc::new(ConsoleAlerts))?;
    let mut app = App::start(state, initial).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        println!("\n{}", app.render());
        print!("{}> ", app.route());
        let _ = std::io::stdout().flush();

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if app.handle(&line).await == Flow::Quit {
            break;
        }
    }

    tracing::info!("Bye");
    Ok(())
}
