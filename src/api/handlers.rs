use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::errors::ApiError;
use crate::analytics::{SalesQuery, SummaryQuery};
use crate::controller::{Answer, ControllerError, DataController, Mode, ModeConfig};
use crate::query::ListQuery;
use crate::store::Collection;

pub const DATA_SOURCE_HEADER: &str = "X-Data-Source";
pub const SERVICE_NAME: &str = "commerce-analytics";

type Controller = web::Data<DataController>;
type QueryPairs = web::Query<Vec<(String, String)>>;

fn respond<T: Serialize>(status: StatusCode, answer: Answer<T>) -> Result<HttpResponse, ApiError> {
    let source = answer.source();
    let body = answer.into_json().map_err(ControllerError::from)?;

    Ok(HttpResponse::build(status)
        .insert_header((DATA_SOURCE_HEADER, source.as_str()))
        .json(body))
}

// ============================================================================
// Entities
// ============================================================================

pub async fn list<E: Collection>(controller: Controller, query: QueryPairs) -> Result<HttpResponse, ApiError> {
    let query = ListQuery::from_pairs(query.into_inner());
    respond(StatusCode::OK, controller.list::<E>(&query).await?)
}

pub async fn get<E: Collection>(controller: Controller, id: web::Path<String>) -> Result<HttpResponse, ApiError> {
    respond(StatusCode::OK, controller.get::<E>(&id).await?)
}

pub async fn create<E: Collection>(controller: Controller, body: web::Json<Value>) -> Result<HttpResponse, ApiError> {
    respond(StatusCode::CREATED, controller.create::<E>(body.into_inner()).await?)
}

pub async fn update<E: Collection>(
    controller: Controller,
    id: web::Path<String>,
    body: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    respond(StatusCode::OK, controller.update::<E>(&id, body.into_inner()).await?)
}

pub async fn delete<E: Collection>(controller: Controller, id: web::Path<String>) -> Result<HttpResponse, ApiError> {
    match controller.delete::<E>(&id).await? {
        Answer::Local(false) => Err(ApiError::NotFound(format!("{} not found: {}", E::KIND, id.as_str()))),
        Answer::Local(true) => respond(
            StatusCode::OK,
            Answer::<Value>::Local(json!({ "message": format!("{} deleted", E::KIND) })),
        ),
        remote => respond(StatusCode::OK, remote),
    }
}

// ============================================================================
// Analytics
// ============================================================================

pub async fn dashboard(controller: Controller) -> Result<HttpResponse, ApiError> {
    respond(StatusCode::OK, controller.dashboard().await?)
}

pub async fn sales(controller: Controller, query: QueryPairs) -> Result<HttpResponse, ApiError> {
    let query = SalesQuery::from_pairs(query.into_inner());
    respond(StatusCode::OK, controller.sales(&query).await?)
}

pub async fn analytics(controller: Controller, query: QueryPairs) -> Result<HttpResponse, ApiError> {
    let query = SummaryQuery::from_pairs(query.into_inner());
    respond(StatusCode::OK, controller.analytics(&query).await?)
}

// ============================================================================
// Mode and health
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeView {
    pub mode: Mode,
    #[serde(rename = "override")]
    pub override_mode: Option<Mode>,
    pub preferred: Option<Mode>,
    pub remote_configured: bool,
}

impl From<ModeConfig> for ModeView {
    fn from(config: ModeConfig) -> Self {
        Self {
            mode: config.effective(),
            override_mode: config.override_mode,
            preferred: config.preferred,
            remote_configured: config.remote_configured,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ModeChange {
    pub mode: String,
}

pub async fn get_mode(controller: Controller) -> HttpResponse {
    HttpResponse::Ok().json(ModeView::from(controller.mode().await))
}

pub async fn set_mode(controller: Controller, body: web::Json<ModeChange>) -> Result<HttpResponse, ApiError> {
    let mode: Mode = body.mode.parse().map_err(ApiError::BadRequest)?;
    let config = controller.set_preferred_mode(mode).await?;
    Ok(HttpResponse::Ok().json(ModeView::from(config)))
}

pub async fn health(controller: Controller) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "mode": controller.mode().await.effective(),
    }))
}
