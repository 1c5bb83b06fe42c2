use crate::model::od_request::OdRequest;
use crate::workflow::WorkflowEngine;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub struct TrackQuery {
    /// Register number to look up
    pub register_no: String,
}

#[derive(Serialize, ToSchema)]
pub struct TrackResponse {
    pub data: Vec<OdRequest>,
    #[schema(example = 1)]
    pub total: usize,
}

/// Public status lookup by register number, no login required.
#[utoipa::path(
    get,
    path = "/track",
    params(TrackQuery),
    responses(
        (status = 200, description = "All requests for the register number", body = TrackResponse),
        (status = 400, description = "Missing register number")
    ),
    tag = "Track"
)]
pub async fn track_status(
    engine: web::Data<WorkflowEngine>,
    query: web::Query<TrackQuery>,
) -> actix_web::Result<impl Responder> {
    let data = engine.track(&query.register_no).await?;
    let total = data.len();

    Ok(HttpResponse::Ok().json(TrackResponse { data, total }))
}
