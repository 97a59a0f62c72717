//! JSON handlers for automation rules.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use homeflux_app::ports::{DeviceGateway, ExecutionLog, RuleRepository};
use homeflux_domain::error::{HomeFluxError, ValidationError};
use homeflux_domain::id::RuleId;
use homeflux_domain::rule::{AutomationRule, RuleAction, Trigger};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating a rule.
#[derive(Deserialize)]
pub struct CreateRuleRequest {
    pub name: String,
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub priority: Option<i32>,
    pub trigger: Trigger,
    pub action: RuleAction,
    pub min_savings: Option<f64>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<AutomationRule>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<AutomationRule>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<AutomationRule>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

fn parse_rule_id(raw: &str) -> Result<RuleId, ApiError> {
    raw.parse().map_err(|_| {
        ApiError::from(HomeFluxError::Validation(ValidationError::InvalidId(
            raw.to_string(),
        )))
    })
}

/// `GET /api/rules` — list the rules of the managed home.
pub async fn list<R, G, L>(
    State(state): State<AppState<R, G, L>>,
) -> Result<ListResponse, ApiError>
where
    R: RuleRepository + Send + Sync + 'static,
    G: DeviceGateway + Send + Sync + 'static,
    L: ExecutionLog + Send + Sync + 'static,
{
    let rules = state.rule_service.list_rules(state.home_id).await?;
    Ok(ListResponse::Ok(Json(rules)))
}

/// `GET /api/rules/{id}` — get a rule by id.
pub async fn get<R, G, L>(
    State(state): State<AppState<R, G, L>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    R: RuleRepository + Send + Sync + 'static,
    G: DeviceGateway + Send + Sync + 'static,
    L: ExecutionLog + Send + Sync + 'static,
{
    let rule_id = parse_rule_id(&id)?;
    let rule = state.rule_service.get_rule(rule_id).await?;
    Ok(GetResponse::Ok(Json(rule)))
}

/// `POST /api/rules` — create a new rule.
pub async fn create<R, G, L>(
    State(state): State<AppState<R, G, L>>,
    Json(req): Json<CreateRuleRequest>,
) -> Result<CreateResponse, ApiError>
where
    R: RuleRepository + Send + Sync + 'static,
    G: DeviceGateway + Send + Sync + 'static,
    L: ExecutionLog + Send + Sync + 'static,
{
    let mut builder = AutomationRule::builder()
        .home_id(state.home_id)
        .name(req.name)
        .trigger(req.trigger)
        .action(req.action);

    if let Some(description) = req.description {
        builder = builder.description(description);
    }
    if let Some(enabled) = req.enabled {
        builder = builder.enabled(enabled);
    }
    if let Some(priority) = req.priority {
        builder = builder.priority(priority);
    }
    if let Some(min_savings) = req.min_savings {
        builder = builder.min_savings(min_savings);
    }

    let rule = builder.build()?;
    let created = state.rule_service.create_rule(rule).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `DELETE /api/rules/{id}` — delete a rule.
pub async fn delete<R, G, L>(
    State(state): State<AppState<R, G, L>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    R: RuleRepository + Send + Sync + 'static,
    G: DeviceGateway + Send + Sync + 'static,
    L: ExecutionLog + Send + Sync + 'static,
{
    let rule_id = parse_rule_id(&id)?;
    state.rule_service.delete_rule(rule_id).await?;
    Ok(DeleteResponse::NoContent)
}
