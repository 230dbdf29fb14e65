//! Administrative configuration endpoints

use crate::handlers::{AppState, ServerError};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use bus_core::{
    AuthKind, BrokerType, ConnectionAuthentication, ConnectionSetting, ConvertType, Direction,
    FileFormat, Protocol, RestMethod, Route, System, Thread, ThreadGroup, ThreadRoute,
};
use serde::Deserialize;
use uuid::Uuid;

fn require(field: &str, value: &str) -> Result<(), ServerError> {
    if value.trim().is_empty() {
        return Err(ServerError::BadRequest(format!("{field} cannot be empty")));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct CreateSystemRequest {
    pub name: String,
}

pub async fn create_system(
    State(state): State<AppState>,
    Json(req): Json<CreateSystemRequest>,
) -> Result<(StatusCode, Json<System>), ServerError> {
    require("system name", &req.name)?;
    let system = state.store.create_system(System::new(req.name)).await?;
    Ok((StatusCode::CREATED, Json(system)))
}

pub async fn list_systems(
    State(state): State<AppState>,
) -> Result<Json<Vec<System>>, ServerError> {
    Ok(Json(state.store.systems().await?))
}

pub async fn delete_system(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.store.delete_system(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct CreateRouteRequest {
    pub name: String,
    pub path: String,
    pub method: RestMethod,
    pub system_id: Uuid,
}

pub async fn create_route(
    State(state): State<AppState>,
    Json(req): Json<CreateRouteRequest>,
) -> Result<(StatusCode, Json<Route>), ServerError> {
    require("route name", &req.name)?;
    require("route path", &req.path)?;
    let route = state
        .store
        .create_route(Route::new(req.name, req.path, req.method, req.system_id))
        .await?;
    Ok((StatusCode::CREATED, Json(route)))
}

pub async fn list_routes(State(state): State<AppState>) -> Result<Json<Vec<Route>>, ServerError> {
    Ok(Json(state.store.routes().await?))
}

pub async fn delete_route(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.store.delete_route(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct CreateThreadGroupRequest {
    pub name: String,
    pub protocol: Protocol,
    #[serde(default = "default_broker_type")]
    pub broker_type: BrokerType,
}

fn default_broker_type() -> BrokerType {
    BrokerType::Rabbit
}

pub async fn create_thread_group(
    State(state): State<AppState>,
    Json(req): Json<CreateThreadGroupRequest>,
) -> Result<(StatusCode, Json<ThreadGroup>), ServerError> {
    require("group name", &req.name)?;
    let group = state
        .store
        .create_thread_group(ThreadGroup::new(req.name, req.protocol, req.broker_type))
        .await?;
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn list_thread_groups(
    State(state): State<AppState>,
) -> Result<Json<Vec<ThreadGroup>>, ServerError> {
    Ok(Json(state.store.thread_groups().await?))
}

pub async fn delete_thread_group(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.store.delete_thread_group(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct CreateThreadRequest {
    pub name: String,
    pub group_id: Uuid,
    #[serde(default = "default_convert_type")]
    pub convert_type: ConvertType,
}

fn default_convert_type() -> ConvertType {
    ConvertType::None
}

pub async fn create_thread(
    State(state): State<AppState>,
    Json(req): Json<CreateThreadRequest>,
) -> Result<(StatusCode, Json<Thread>), ServerError> {
    require("thread name", &req.name)?;
    let thread = state
        .store
        .create_thread(Thread::new(req.name, req.group_id, req.convert_type))
        .await?;
    Ok((StatusCode::CREATED, Json(thread)))
}

pub async fn list_threads(
    State(state): State<AppState>,
) -> Result<Json<Vec<Thread>>, ServerError> {
    Ok(Json(state.store.threads().await?))
}

pub async fn delete_thread(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.store.delete_thread(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct CreateThreadRouteRequest {
    pub thread_id: Uuid,
    pub direction: Direction,
    pub route_id: Uuid,
    pub file_format: FileFormat,
    #[serde(default)]
    pub object_id: Option<Uuid>,
    #[serde(default)]
    pub routine_id: Option<Uuid>,
}

pub async fn create_thread_route(
    State(state): State<AppState>,
    Json(req): Json<CreateThreadRouteRequest>,
) -> Result<StatusCode, ServerError> {
    state
        .store
        .create_thread_route(ThreadRoute {
            thread_id: req.thread_id,
            direction: req.direction,
            route_id: req.route_id,
            file_format: req.file_format,
            object_id: req.object_id.unwrap_or_else(Uuid::nil),
            routine_id: req.routine_id.unwrap_or_else(Uuid::nil),
        })
        .await?;
    Ok(StatusCode::CREATED)
}

#[derive(Debug, Deserialize)]
pub struct CreateConnectionRequest {
    pub name: String,
    pub system_id: Uuid,
    pub base_path: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub auth_id: Option<Uuid>,
}

pub async fn create_connection(
    State(state): State<AppState>,
    Json(req): Json<CreateConnectionRequest>,
) -> Result<(StatusCode, Json<ConnectionSetting>), ServerError> {
    require("connection name", &req.name)?;
    let setting = state
        .store
        .create_connection_setting(ConnectionSetting::new(
            req.name,
            req.system_id,
            req.base_path,
            req.port,
            req.auth_id,
        ))
        .await?;
    Ok((StatusCode::CREATED, Json(setting)))
}

#[derive(Debug, Deserialize)]
pub struct CreateConnectionAuthRequest {
    pub name: String,
    pub system_id: Uuid,
    pub kind: AuthKind,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

pub async fn create_connection_auth(
    State(state): State<AppState>,
    Json(req): Json<CreateConnectionAuthRequest>,
) -> Result<(StatusCode, Json<ConnectionAuthentication>), ServerError> {
    require("auth name", &req.name)?;
    let auth = state
        .store
        .create_connection_auth(ConnectionAuthentication {
            id: Uuid::new_v4(),
            name: req.name,
            system_id: req.system_id,
            kind: req.kind,
            username: req.username,
            password: req.password,
            token: req.token,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(auth)))
}
