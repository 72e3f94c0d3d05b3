use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use feed::MatchSnapshot;
use types::fixture::{Match, NewMatch};
use types::ids::MatchId;

pub async fn start_match(
    State(state): State<AppState>,
    payload: Result<Json<NewMatch>, JsonRejection>,
) -> Result<(StatusCode, Json<Match>), AppError> {
    let Json(details) = payload?;
    let fixture = state.ledger.create_match(details).await?;
    Ok((StatusCode::CREATED, Json(fixture)))
}

pub async fn list_matches(State(state): State<AppState>) -> Result<Json<Vec<Match>>, AppError> {
    Ok(Json(state.ledger.list_matches().await?))
}

pub async fn get_match(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> Result<Json<Match>, AppError> {
    Ok(Json(state.ledger.get_match(&match_id).await?))
}

/// Full recomputation from the ledger, the late joiner's reconciliation read.
pub async fn get_stats(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> Result<Json<MatchSnapshot>, AppError> {
    let fixture = state.ledger.get_match(&match_id).await?;
    Ok(Json(MatchSnapshot::build(&fixture)))
}

pub async fn pause_match(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> Result<Json<Match>, AppError> {
    Ok(Json(state.ledger.pause(&match_id).await?))
}

pub async fn resume_match(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> Result<Json<Match>, AppError> {
    Ok(Json(state.ledger.resume(&match_id).await?))
}
