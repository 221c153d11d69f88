// src/api/handlers/fault_list.rs
// Device fault list

use axum::{
    Json,
    extract::{OriginalUri, State},
};
use serde::Serialize;
use tracing::info;

use crate::api::error::ApiResult;
use crate::api::extract::ApiPath;
use crate::device::FaultEntry;
use crate::error::HtError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FaultListSize {
    pub size: usize,
}

pub async fn list_faults(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Json<Vec<FaultEntry>>> {
    info!("*** [GET] {}", uri);
    let faults = state.session.interact(|hp| hp.get_fault_list()).await?;
    Ok(Json(faults))
}

pub async fn fault_list_size(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Json<FaultListSize>> {
    info!("*** [GET] {}", uri);
    let size = state.session.interact(|hp| hp.get_fault_list_size()).await?;
    Ok(Json(FaultListSize { size }))
}

/// Most recent entry; 404 while the list is empty
pub async fn last_fault(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Json<FaultEntry>> {
    info!("*** [GET] {}", uri);
    let entry = state
        .session
        .interact(|hp| hp.get_last_fault()?.ok_or(HtError::FaultListEmpty))
        .await?;
    Ok(Json(entry))
}

pub async fn get_fault(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    ApiPath(id): ApiPath<usize>,
) -> ApiResult<Json<FaultEntry>> {
    info!("*** [GET] {} -- id={}", uri, id);
    let entry = state
        .session
        .interact(move |hp| {
            if id >= hp.get_fault_list_size()? {
                return Err(HtError::FaultEntryNotFound(id));
            }
            hp.get_fault_entry(id)
        })
        .await?;
    Ok(Json(entry))
}
