//! Handlers for the `/cases` resource.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;
use vortex_core::error::CoreError;
use vortex_core::roulette::build_roulette;
use vortex_core::types::DbId;
use vortex_db::models::case::{Case, CaseWithGifts};
use vortex_db::models::gift::{Gift, GiftView};
use vortex_db::repositories::CaseRepo;

use crate::error::{AppError, AppResult};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response of `POST /cases/{id}/open-case`.
#[derive(Debug, Serialize)]
pub struct OpenCaseResponse {
    /// The roulette strip; the prize sits at `drop_index`.
    pub gifts: Vec<GiftView>,
    pub drop_index: usize,
}

/// GET /api/v1/cases
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Case>>>> {
    let cases = CaseRepo::list(&state.pool, params.limit(), params.offset()).await?;
    Ok(Json(DataResponse { data: cases }))
}

/// GET /api/v1/cases/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CaseWithGifts>>> {
    let case = find_case(&state, id).await?;
    let gifts = CaseRepo::gifts_for_case(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: CaseWithGifts {
            case,
            gifts: gifts.iter().map(GiftView::from).collect(),
        },
    }))
}

/// POST /api/v1/cases/{id}/open-case
///
/// Draw a prize by real weight and build the 111-slot display strip by
/// visual weight.
pub async fn open_case(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<OpenCaseResponse>> {
    find_case(&state, id).await?;
    let gifts = CaseRepo::gifts_for_case(&state.pool, id).await?;

    let response = spin(&gifts)
        .ok_or_else(|| AppError::Core(CoreError::Validation("Case is empty".into())))?;

    tracing::debug!(case_id = id, drop_index = response.drop_index, "Case opened");
    Ok(Json(response))
}

/// Build the roulette with the thread-local RNG. Kept synchronous so the
/// RNG never lives across an await point.
fn spin(gifts: &[Gift]) -> Option<OpenCaseResponse> {
    let roulette = build_roulette(gifts, &mut rand::rng())?;
    Some(OpenCaseResponse {
        gifts: roulette.slots.into_iter().map(GiftView::from).collect(),
        drop_index: roulette.drop_index,
    })
}

async fn find_case(state: &AppState, id: DbId) -> AppResult<Case> {
    CaseRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Case", id }))
}
