// src/api/handlers/device.rs
// Device identity: property number, serial number and software version

use axum::{Json, extract::{OriginalUri, State}};
use serde::Serialize;
use tracing::info;

use crate::api::error::ApiResult;
use crate::state::AppState;

/// Parameter holding the property ("Liegenschaft") number
pub const PROPERTY_ID_PARAM: &str = "Liegenschaft";

#[derive(Debug, Serialize)]
pub struct DeviceInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_id: Option<i64>,
    pub serial_number: u32,
    pub software_version: String,
}

pub async fn get_device(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Json<DeviceInfo>> {
    info!("*** [GET] {}", uri);

    let property_param = state.catalog.contains(PROPERTY_ID_PARAM);
    let info = state
        .session
        .interact(move |hp| {
            let property_id = if property_param {
                Some(hp.get_param(PROPERTY_ID_PARAM)?.as_f64() as i64)
            } else {
                None
            };
            let serial_number = hp.get_serial_number()?;
            let (software_version, _) = hp.get_version()?;
            Ok(DeviceInfo {
                property_id,
                serial_number,
                software_version,
            })
        })
        .await?;

    Ok(Json(info))
}
