//! REST API endpoints for network interaction.

use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mycel::prelude::*;
use serde::{Deserialize, Serialize};

/// A contract violation surfaced over HTTP.
#[derive(Debug)]
pub struct ApiError(pub MyceliumError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            MyceliumError::UnknownNode(_) => StatusCode::NOT_FOUND,
            MyceliumError::DuplicateNode(_) => StatusCode::CONFLICT,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<MyceliumError> for ApiError {
    fn from(err: MyceliumError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.0.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Get network statistics.
pub async fn get_stats(State(state): State<AppState>) -> Json<NetworkStats> {
    Json(state.network.stats())
}

/// Health check with issue list.
pub async fn get_health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.network.health_check())
}

pub async fn get_nodes(State(state): State<AppState>) -> Json<Vec<NodeSnapshot>> {
    Json(state.network.nodes())
}

pub async fn get_links(State(state): State<AppState>) -> Json<Vec<LinkSnapshot>> {
    Json(state.network.links())
}

/// Add-node request body.
#[derive(Debug, Deserialize)]
pub struct AddNodeRequest {
    pub id: NodeId,
    #[serde(default = "default_kind")]
    pub kind: String,
}

fn default_kind() -> String {
    "user".to_string()
}

/// Add a node and auto-connect it.
pub async fn add_node(
    State(state): State<AppState>,
    Json(req): Json<AddNodeRequest>,
) -> ApiResult<NodeSnapshot> {
    Ok(Json(state.network.add_node(req.id, req.kind.as_str())?))
}

/// Connect request body.
#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    pub from: NodeId,
    pub to: NodeId,
    #[serde(default)]
    pub strength: Option<f64>,
}

/// Link two nodes in both directions.
pub async fn connect(
    State(state): State<AppState>,
    Json(req): Json<ConnectRequest>,
) -> ApiResult<LinkSnapshot> {
    let link = state.network.connect(req.from, req.to, req.strength)?;
    Ok(Json(LinkSnapshot::from(&link)))
}

/// Transfer request body.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub pattern_id: PatternId,
    pub from: NodeId,
    pub to: NodeId,
    #[serde(default)]
    pub metadata: PatternMetadata,
}

/// Transfer a pattern. Policy rejections come back as 200 with a status.
pub async fn transfer(
    State(state): State<AppState>,
    Json(req): Json<TransferRequest>,
) -> ApiResult<TransferResult> {
    let result = state
        .network
        .transfer(req.pattern_id, req.from, req.to, &req.metadata)?;
    Ok(Json(result))
}

pub async fn heal(State(state): State<AppState>) -> Json<HealReport> {
    Json(state.network.heal())
}

/// Query parameters for log endpoints.
#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// Most recent hazard events.
pub async fn get_hazards(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Json<Vec<HazardEvent>> {
    Json(state.network.hazard_log(query.limit))
}

/// Most recent corrective actions.
pub async fn get_actions(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Json<Vec<ActionRecord>> {
    Json(state.network.action_log(query.limit))
}

pub async fn get_ccps(State(state): State<AppState>) -> Json<NetworkConfig> {
    Json(state.network.config().clone())
}

/// Advance request body.
#[derive(Debug, Deserialize)]
pub struct AdvanceRequest {
    pub ticks: Tick,
}

/// Advance response.
#[derive(Debug, Serialize)]
pub struct AdvanceResponse {
    pub now: Tick,
}

/// Advance the logical clock.
pub async fn advance(
    State(state): State<AppState>,
    Json(req): Json<AdvanceRequest>,
) -> Json<AdvanceResponse> {
    Json(AdvanceResponse {
        now: state.network.advance(req.ticks),
    })
}
