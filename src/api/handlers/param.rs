// src/api/handlers/param.rs
// Reading and writing heat pump parameters by name

use axum::{
    Json,
    extract::{OriginalUri, State},
};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;

use super::{NamesQuery, ValueBody};
use crate::api::error::ApiResult;
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::device::{ParamDef, ParamValue};
use crate::error::Result;
use crate::state::AppState;

pub type ParamMap = BTreeMap<String, Value>;

/// Decode a client value for `def`, range-checking it when verification is on
pub(crate) fn prepare_write(state: &AppState, def: &ParamDef, value: &Value) -> Result<ParamValue> {
    let value = state.policy.decode(def, value)?;
    if state.verify {
        def.verify(&value)?;
    }
    Ok(value)
}

/// `GET /param/` - all known parameters, or those listed in `?names=`
pub async fn list_params(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    ApiQuery(query): ApiQuery<NamesQuery>,
) -> ApiResult<Json<ParamMap>> {
    info!("*** [GET] {}", uri);

    let defs = match query.names() {
        Some(names) => state.catalog.require_all(names.iter().map(String::as_str))?,
        None => state.catalog.iter().cloned().collect(),
    };

    let values = state
        .session
        .interact(move |hp| {
            defs.iter()
                .map(|def| Ok((def.name.clone(), hp.get_param(&def.name)?)))
                .collect::<Result<Vec<_>>>()
        })
        .await?;

    Ok(Json(
        values
            .iter()
            .map(|(name, value)| (name.clone(), state.policy.encode(value)))
            .collect(),
    ))
}

/// `PUT /param/` - write several parameters in one device session.
///
/// Every name is checked against the catalog and every value decoded before
/// the first write; unknown names are reported together.
pub async fn update_params(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    ApiJson(payload): ApiJson<ParamMap>,
) -> ApiResult<Json<ParamMap>> {
    info!("*** [PUT{}] {} -- {:?}", state.ro_tag(), uri, payload);

    let defs = state
        .catalog
        .require_all(payload.keys().map(String::as_str))?;
    let writes = defs
        .into_iter()
        .map(|def| {
            let value = prepare_write(&state, &def, &payload[&def.name])?;
            Ok((def.name, value))
        })
        .collect::<Result<Vec<_>>>()?;

    let policy = state.policy;
    let verify = state.verify;
    let written = state
        .session
        .interact(move |hp| {
            writes
                .into_iter()
                .map(|(name, value)| {
                    let value = policy.guard_write(value, |v| hp.set_param(&name, v, verify))?;
                    Ok((name, value))
                })
                .collect::<Result<Vec<_>>>()
        })
        .await?;

    Ok(Json(
        written
            .iter()
            .map(|(name, value)| (name.clone(), policy.encode(value)))
            .collect(),
    ))
}

/// `GET /param/{name}`
pub async fn get_param(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    ApiPath(name): ApiPath<String>,
) -> ApiResult<Json<ValueBody>> {
    info!("*** [GET] {} -- name='{}'", uri, name);

    state.catalog.require(&name)?;
    let value = state
        .session
        .interact(move |hp| hp.get_param(&name))
        .await?;

    Ok(Json(ValueBody {
        value: state.policy.encode(&value),
    }))
}

/// `PUT /param/{name}` with `{"value": ...}`
pub async fn set_param(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    ApiPath(name): ApiPath<String>,
    ApiJson(body): ApiJson<ValueBody>,
) -> ApiResult<Json<ValueBody>> {
    info!(
        "*** [PUT{}] {} -- name='{}', value={}",
        state.ro_tag(),
        uri,
        name,
        body.value
    );

    let def = state.catalog.require(&name)?;
    let value = prepare_write(&state, def, &body.value)?;

    let policy = state.policy;
    let verify = state.verify;
    let value = state
        .session
        .interact(move |hp| policy.guard_write(value, |v| hp.set_param(&name, v, verify)))
        .await?;

    Ok(Json(ValueBody {
        value: policy.encode(&value),
    }))
}
