use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::access::{RouteMembership, RouteRules};
use crate::admin::AdminState;
use crate::http::request::normalize_path;

#[derive(Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub uptime_secs: u64,
}

#[derive(Serialize)]
pub struct RulesView {
    #[serde(flatten)]
    pub rules: RouteRules,
    pub login_path: String,
}

#[derive(Deserialize)]
pub struct ClassifyParams {
    pub path: String,
    /// Pretend the request carries an API key.
    #[serde(default)]
    pub api_key: bool,
    /// Pretend the request carries a valid session.
    #[serde(default)]
    pub session: bool,
}

#[derive(Serialize)]
pub struct ClassifyResult {
    pub path: String,
    pub membership: RouteMembership,
    pub decision: Value,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

pub async fn get_rules(State(state): State<AdminState>) -> Json<RulesView> {
    Json(RulesView {
        rules: state.controller.rules().clone(),
        login_path: state.controller.login_path().to_string(),
    })
}

pub async fn classify(
    State(state): State<AdminState>,
    Query(params): Query<ClassifyParams>,
) -> Json<ClassifyResult> {
    let controller = &state.controller;
    let path = normalize_path(&params.path).into_owned();
    let membership = controller.rules().membership(&path);
    let decision = if membership.excluded {
        serde_json::json!({ "outcome": "bypass" })
    } else {
        controller
            .preview(&path, params.api_key, params.session)
            .to_json()
    };

    Json(ClassifyResult {
        path,
        membership,
        decision,
    })
}
