// src/api/handlers/time_prog.rs
// Time programs and their individual entries

use axum::{
    Json,
    extract::{OriginalUri, State},
};
use serde::Deserialize;
use tracing::info;

use crate::api::error::ApiResult;
use crate::api::extract::{ApiJson, ApiPath};
use crate::device::{HeatPump, TimeProgEntry, TimeProgram};
use crate::error::{HtError, Result};
use crate::state::AppState;

/// Body of `PUT /timeprog/{id}`; the metadata fields a client may echo back
/// are ignored
#[derive(Debug, Deserialize)]
pub struct TimeProgEntries {
    pub entries: Vec<Vec<TimeProgEntry>>,
}

/// Metadata of program `id`, bounded by what the device reports
fn time_prog_meta(hp: &mut dyn HeatPump, id: usize) -> Result<TimeProgram> {
    hp.get_time_progs()?
        .into_iter()
        .nth(id)
        .map(|prog| prog.metadata())
        .ok_or(HtError::TimeProgNotFound(id))
}

pub async fn list_time_progs(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Json<Vec<TimeProgram>>> {
    info!("*** [GET] {}", uri);
    let progs = state
        .session
        .interact(|hp| {
            Ok(hp
                .get_time_progs()?
                .iter()
                .map(TimeProgram::metadata)
                .collect::<Vec<_>>())
        })
        .await?;
    Ok(Json(progs))
}

pub async fn get_time_prog(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    ApiPath(id): ApiPath<usize>,
) -> ApiResult<Json<TimeProgram>> {
    info!("*** [GET] {} -- id={}", uri, id);
    let prog = state
        .session
        .interact(move |hp| {
            time_prog_meta(hp, id)?;
            hp.get_time_prog(id, true)
        })
        .await?;
    Ok(Json(prog))
}

/// Replace all entries of a program at once
pub async fn set_time_prog(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    ApiPath(id): ApiPath<usize>,
    ApiJson(body): ApiJson<TimeProgEntries>,
) -> ApiResult<Json<TimeProgram>> {
    info!("*** [PUT{}] {} -- id={}", state.ro_tag(), uri, id);

    let policy = state.policy;
    let prog = state
        .session
        .interact(move |hp| {
            let prog = time_prog_meta(hp, id)?.with_entries(body.entries)?;
            policy.guard_write(prog, |prog| hp.set_time_prog(&prog))
        })
        .await?;
    Ok(Json(prog))
}

pub async fn get_time_prog_entry(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    ApiPath((id, day, num)): ApiPath<(usize, usize, usize)>,
) -> ApiResult<Json<TimeProgEntry>> {
    info!("*** [GET] {} -- id={}, day={}, num={}", uri, id, day, num);
    let entry = state
        .session
        .interact(move |hp| {
            time_prog_meta(hp, id)?.check_slot(day, num)?;
            hp.get_time_prog_entry(id, day, num)
        })
        .await?;
    Ok(Json(entry))
}

pub async fn set_time_prog_entry(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    ApiPath((id, day, num)): ApiPath<(usize, usize, usize)>,
    ApiJson(entry): ApiJson<TimeProgEntry>,
) -> ApiResult<Json<TimeProgEntry>> {
    info!(
        "*** [PUT{}] {} -- id={}, day={}, num={}, entry={:?}",
        state.ro_tag(),
        uri,
        id,
        day,
        num,
        entry
    );

    let policy = state.policy;
    let entry = state
        .session
        .interact(move |hp| {
            let meta = time_prog_meta(hp, id)?;
            meta.check_slot(day, num)?;
            meta.verify_entry(&entry)?;
            policy.guard_write(entry, |entry| hp.set_time_prog_entry(id, day, num, entry))
        })
        .await?;
    Ok(Json(entry))
}
