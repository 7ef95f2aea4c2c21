use crate::call_session::SessionSnapshot;
use crate::error::{handle_error, CallError, ProfileError};
use crate::profile_types::{NewProfile, Profile, ProfileFilter, ProfileFilterParams};
use crate::status_log::StatusLogEntry;
use crate::tasks::{drain_client, start_call, stream_snapshots};
use crate::types::{AppState, LogQuery, VolumeRequest};

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        ws::{WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use futures_util::stream::StreamExt;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

pub async fn list_profiles(
    State(app_state): State<Arc<AppState>>,
    params: Result<Query<ProfileFilterParams>, QueryRejection>,
) -> Result<Json<Vec<Profile>>, ProfileError> {
    let Query(params) = params.map_err(|e| ProfileError::Validation(e.body_text()))?;
    let filter = ProfileFilter::try_from(params)?;
    let profiles = app_state.profiles.list(&filter).await;
    debug!(count = profiles.len(), filter=?filter, "listing profiles");
    Ok(Json(profiles))
}

pub async fn create_profile(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<NewProfile>, JsonRejection>,
) -> Result<(StatusCode, Json<Profile>), ProfileError> {
    let Json(new_profile) = payload.map_err(|e| ProfileError::Validation(e.body_text()))?;
    let profile = app_state.profiles.insert(new_profile).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn select_profile(
    State(app_state): State<Arc<AppState>>,
    Path(profile_id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, CallError> {
    let profile = app_state
        .profiles
        .get(profile_id)
        .await
        .ok_or(CallError::ProfileNotFound(profile_id))?;
    let snapshot = app_state.desk.lock().await.select_profile(&profile);
    Ok(Json(snapshot))
}

pub async fn get_call(State(app_state): State<Arc<AppState>>) -> Json<Option<SessionSnapshot>> {
    Json(app_state.desk.lock().await.snapshot())
}

pub async fn start(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<SessionSnapshot>, CallError> {
    start_call(&app_state.desk, app_state.config.tick_interval)
        .await
        .map(Json)
}

pub async fn end(State(app_state): State<Arc<AppState>>) -> Result<Json<SessionSnapshot>, CallError> {
    app_state.desk.lock().await.end_call().map(Json)
}

pub async fn toggle_recording(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<SessionSnapshot>, CallError> {
    app_state.desk.lock().await.toggle_recording().map(Json)
}

pub async fn toggle_mute(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<SessionSnapshot>, CallError> {
    app_state.desk.lock().await.toggle_mute().map(Json)
}

pub async fn set_volume(
    State(app_state): State<Arc<AppState>>,
    request: Result<Json<VolumeRequest>, JsonRejection>,
) -> Result<Json<SessionSnapshot>, CallError> {
    let Json(request) = request.map_err(|e| CallError::BadRequest(e.body_text()))?;
    app_state
        .desk
        .lock()
        .await
        .set_volume(request.volume)
        .map(Json)
}

pub async fn call_log(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<LogQuery>, QueryRejection>,
) -> Result<Json<Vec<StatusLogEntry>>, CallError> {
    let Query(query) = query.map_err(|e| CallError::BadRequest(e.body_text()))?;
    let desk = app_state.desk.lock().await;
    let entries = query
        .profile_id
        .or_else(|| desk.selected_profile_id())
        .map(|profile_id| desk.entries_for(profile_id))
        .unwrap_or_default();
    Ok(Json(entries))
}

pub async fn live_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| live_socket_handler(socket, app_state))
}

async fn live_socket_handler(socket: WebSocket, app_state: Arc<AppState>) {
    let (client_sink, client_stream) = socket.split();
    let updates = app_state.desk.lock().await.subscribe();
    info!("live client connected");

    // Whichever side finishes first ends the feed.
    let res = tokio::select! {
        res = stream_snapshots(client_sink, updates) => res,
        res = drain_client(client_stream) => res,
    };
    if let Err(e) = res {
        handle_error(e).await;
    }
}
