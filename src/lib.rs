// src/lib.rs

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod picker;
pub mod routes;
pub mod screens;
pub mod session;
pub mod state;
pub mod token_store;
pub mod ui;
pub mod utils;

pub use app::App;
pub use routes::Route;
