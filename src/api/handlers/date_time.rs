// src/api/handlers/date_time.rs
// Device clock

use axum::{
    Json,
    body::Bytes,
    extract::{OriginalUri, State},
};
use chrono::{DateTime, Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::ApiResult;
use crate::error::{HtError, Result};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DateTimeBody {
    pub datetime: NaiveDateTime,
}

#[derive(Debug, Default, Deserialize)]
struct DateTimePayload {
    #[serde(default)]
    datetime: Option<String>,
}

pub async fn get_date_time(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Json<DateTimeBody>> {
    info!("*** [GET] {}", uri);
    let (datetime, _) = state.session.interact(|hp| hp.get_date_time()).await?;
    Ok(Json(DateTimeBody { datetime }))
}

/// Set the device clock; an empty body, `null` or `""` selects the host's
/// current local time
pub async fn set_date_time(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    body: Bytes,
) -> ApiResult<Json<DateTimeBody>> {
    info!("*** [PUT{}] {}", state.ro_tag(), uri);

    let payload: DateTimePayload = if body.iter().all(u8::is_ascii_whitespace) {
        DateTimePayload::default()
    } else {
        serde_json::from_slice::<Option<DateTimePayload>>(&body)
            .map_err(|e| HtError::InvalidPayload(e.to_string()))?
            .unwrap_or_default()
    };

    let requested = match payload.datetime.as_deref().map(str::trim) {
        None | Some("") => Local::now().naive_local(),
        Some(text) => parse_datetime(text)?,
    };
    let requested = requested.with_nanosecond(0).unwrap_or(requested);

    let policy = state.policy;
    let datetime = state
        .session
        .interact(move |hp| {
            policy.guard_write(requested, |dt| hp.set_date_time(dt).map(|(dt, _)| dt))
        })
        .await?;

    Ok(Json(DateTimeBody { datetime }))
}

/// ISO 8601 without offset is taken as host local time; RFC 3339 input is
/// converted from its offset into host local time
fn parse_datetime(text: &str) -> Result<NaiveDateTime> {
    text.parse::<NaiveDateTime>()
        .or_else(|_| {
            DateTime::parse_from_rfc3339(text).map(|dt| dt.with_timezone(&Local).naive_local())
        })
        .map_err(|_| HtError::InvalidDateTime(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn test_parse_datetime_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(parse_datetime("2024-03-10T14:30:00").unwrap(), expected);
        assert!(matches!(
            parse_datetime("yesterday"),
            Err(HtError::InvalidDateTime(_))
        ));
    }

    #[test]
    fn test_parse_datetime_honours_offset() {
        let utc = Utc.with_ymd_and_hms(2024, 3, 10, 14, 30, 0).unwrap();
        let local = utc.with_timezone(&Local).naive_local();
        assert_eq!(parse_datetime("2024-03-10T14:30:00Z").unwrap(), local);
        assert_eq!(parse_datetime("2024-03-10T19:30:00+05:00").unwrap(), local);
        assert_ne!(
            parse_datetime("2024-03-10T14:30:00Z").unwrap(),
            parse_datetime("2024-03-10T14:30:00+05:00").unwrap()
        );
    }
}
