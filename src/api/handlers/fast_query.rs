// src/api/handlers/fast_query.rs
// Batched reads of MP data points

use axum::{
    Json,
    extract::{OriginalUri, State},
};
use tracing::debug;

use super::param::ParamMap;
use super::{NamesQuery, ValueBody};
use crate::api::error::ApiResult;
use crate::api::extract::{ApiPath, ApiQuery};
use crate::device::ParamDef;
use crate::error::{HtError, Result};
use crate::state::AppState;

fn require_fast_queryable(def: &ParamDef) -> Result<()> {
    if def.is_fast_queryable() {
        Ok(())
    } else {
        Err(HtError::NotFastQueryable(def.name.clone()))
    }
}

/// `GET /fastquery/` - all MP data points, or those listed in `?names=`
pub async fn list_fast_query(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    ApiQuery(query): ApiQuery<NamesQuery>,
) -> ApiResult<Json<ParamMap>> {
    debug!("*** [GET] {}", uri);

    let names: Vec<String> = match query.names() {
        Some(names) => {
            let defs = state.catalog.require_all(names.iter().map(String::as_str))?;
            defs.iter().try_for_each(require_fast_queryable)?;
            names
        }
        None => state
            .catalog
            .fast_query_params()
            .map(|def| def.name.clone())
            .collect(),
    };

    let values = state
        .session
        .interact(move |hp| hp.fast_query(&names))
        .await?;

    Ok(Json(
        values
            .iter()
            .map(|(name, value)| (name.clone(), state.policy.encode(value)))
            .collect(),
    ))
}

/// `GET /fastquery/{name}`
pub async fn get_fast_query(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    ApiPath(name): ApiPath<String>,
) -> ApiResult<Json<ValueBody>> {
    debug!("*** [GET] {} -- name='{}'", uri, name);

    require_fast_queryable(state.catalog.require(&name)?)?;

    let value = state
        .session
        .interact(move |hp| {
            let mut values = hp.fast_query(std::slice::from_ref(&name))?;
            values
                .remove(&name)
                .ok_or_else(|| HtError::Device(format!("no value returned for '{name}'")))
        })
        .await?;

    Ok(Json(ValueBody {
        value: state.policy.encode(&value),
    }))
}
