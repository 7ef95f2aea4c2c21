mod call_desk;
mod call_session;
mod config;
mod error;
mod handlers;
mod profile_types;
mod profiles;
mod status_log;
mod tasks;
mod types;
mod utils;

use crate::config::AppConfig;
use crate::error::handle_error;
use crate::types::AppState;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::prelude::*;

pub mod consts {
    pub const DEFAULT_BIND_ADDR: [u8; 4] = [0, 0, 0, 0];
    pub const DEFAULT_PORT: u16 = 5_000;
    pub const DEFAULT_TICK_INTERVAL_MILLIS: u64 = 1_000;
}

fn app(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/profiles",
            get(handlers::list_profiles).post(handlers::create_profile),
        )
        .route("/api/call", get(handlers::get_call))
        .route("/api/call/select/:profile_id", post(handlers::select_profile))
        .route("/api/call/start", post(handlers::start))
        .route("/api/call/end", post(handlers::end))
        .route("/api/call/recording", post(handlers::toggle_recording))
        .route("/api/call/mute", post(handlers::toggle_mute))
        .route("/api/call/volume", put(handlers::set_volume))
        .route("/api/call/log", get(handlers::call_log))
        .route("/api/call/live", get(handlers::live_handler))
        .route("/", get(|| async { "Matrimony calls are up." }))
        .with_state(app_state)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_file(true)
                .with_line_number(true),
        )
        .with(tracing_subscriber::filter::Targets::new().with_targets([
            ("hyper", tracing_subscriber::filter::LevelFilter::OFF),
            (
                "matrimony_calls",
                tracing_subscriber::filter::LevelFilter::DEBUG,
            ),
        ]));
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install tracing subscriber: {e}");
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            handle_error(e).await;
            std::process::exit(1);
        }
    };
    let addr = config.socket_addr();
    let app_state = Arc::new(AppState::new(config));
    info!(
        profiles = app_state.profiles.len().await,
        tick = ?app_state.config.tick_interval,
        "starting on {addr}"
    );

    if let Err(e) = axum::Server::bind(&addr)
        .serve(app(app_state).into_make_service())
        .await
    {
        handle_error(e).await;
        std::process::exit(1);
    }
}
