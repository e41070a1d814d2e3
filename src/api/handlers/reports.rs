use axum::{Json, extract::State};

use crate::{
    error::AppError,
    repos::{Document, collections::REPORTS},
    state::AppState,
};

pub async fn list_reports(
    State(state): State<AppState>,
) -> Result<Json<Vec<Document>>, AppError> {
    let reports = state.store.find(REPORTS, &Document::new()).await?;
    Ok(Json(reports))
}
