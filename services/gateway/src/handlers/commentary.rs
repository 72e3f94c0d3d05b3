use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use types::ball::{BallEvent, BallSubmission};
use types::fixture::Match;
use types::ids::MatchId;

/// Events for a match, most recent `(over, ball)` first.
pub async fn list_commentary(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> Result<Json<Vec<BallEvent>>, AppError> {
    let commentary = state.ledger.read(&match_id).await?;
    Ok(Json(
        commentary.most_recent_first().into_iter().cloned().collect(),
    ))
}

/// Cached newest events; empty when the cache is off or failing.
pub async fn recent_commentary(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> Result<Json<Vec<BallEvent>>, AppError> {
    // Unknown matches are still a 404, even with a cold cache
    state.ledger.get_match(&match_id).await?;
    Ok(Json(state.cache.recent(&match_id)))
}

pub async fn add_commentary(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
    payload: Result<Json<BallSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<Match>), AppError> {
    let Json(submission) = payload?;
    let appended = state.ledger.append(&match_id, submission).await?;
    Ok((StatusCode::CREATED, Json(appended.fixture)))
}
