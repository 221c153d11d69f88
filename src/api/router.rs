// src/api/router.rs
// Route table of the REST API

use axum::{
    Router, middleware,
    routing::{MethodRouter, get, put},
};
use tower_http::trace::TraceLayer;

use super::auth::require_basic_auth;
use super::handlers::{
    date_time, device, fast_query, fault_list, health, overwrite, param, time_prog,
};
use crate::state::AppState;

pub const API_PREFIX: &str = "/api/v1";

/// Registers a collection route with and without the trailing slash
trait CollectionRoute {
    fn collection(self, path: &str, method_router: MethodRouter<AppState>) -> Self;
}

impl CollectionRoute for Router<AppState> {
    fn collection(self, path: &str, method_router: MethodRouter<AppState>) -> Self {
        self.route(path, method_router.clone())
            .route(&format!("{path}/"), method_router)
    }
}

/// Create the HTTP router
pub fn create_router(state: AppState) -> Router {
    let api_router = Router::new()
        .collection("/device", get(device::get_device))
        .collection(
            "/datetime",
            get(date_time::get_date_time).put(date_time::set_date_time),
        )
        .collection("/param", get(param::list_params).put(param::update_params))
        .route("/param/{name}", get(param::get_param).put(param::set_param))
        .collection("/fastquery", get(fast_query::list_fast_query))
        .route("/fastquery/{name}", get(fast_query::get_fast_query))
        .collection("/faultlist", get(fault_list::list_faults))
        .route("/faultlist/size", get(fault_list::fault_list_size))
        .route("/faultlist/last", get(fault_list::last_fault))
        .route("/faultlist/{id}", get(fault_list::get_fault))
        .collection("/timeprog", get(time_prog::list_time_progs))
        .route(
            "/timeprog/{id}",
            get(time_prog::get_time_prog).put(time_prog::set_time_prog),
        )
        .route(
            "/timeprog/{id}/{day}/{num}",
            get(time_prog::get_time_prog_entry).put(time_prog::set_time_prog_entry),
        )
        .route("/overwrite/{name}", put(overwrite::set_overwrite))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_basic_auth,
        ));

    Router::new()
        // Liveness probe, no authentication
        .route("/health", get(health::health))
        .nest(API_PREFIX, api_router)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
