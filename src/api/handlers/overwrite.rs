// src/api/handlers/overwrite.rs
// Manual overwrite of parameter values

use axum::{
    Json,
    extract::{OriginalUri, State},
};
use tracing::info;

use super::ValueBody;
use super::param::prepare_write;
use crate::api::error::ApiResult;
use crate::api::extract::{ApiJson, ApiPath};
use crate::state::AppState;

/// `PUT /overwrite/{name}`; a `null` value releases the overwrite
pub async fn set_overwrite(
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
    let value = if body.value.is_null() {
        None
    } else {
        Some(prepare_write(&state, def, &body.value)?)
    };

    let policy = state.policy;
    let value = state
        .session
        .interact(move |hp| policy.guard_write(value, |v| hp.overwrite_param(&name, v)))
        .await?;

    Ok(Json(ValueBody {
        value: policy.encode_optional(value.as_ref()),
    }))
}
