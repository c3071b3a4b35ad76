use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Counters for a single UTC calendar day. `uniques` always equals
/// `unique_ids.len()`; both move together in `visitors::record_visit_at`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyBucket {
    pub visits: u64,
    pub uniques: u64,
    pub unique_ids: BTreeSet<String>,
}

/// Whole visitor-tracking state, serialized as-is to the snapshot file.
/// Field names stay camelCase so the file remains readable by the legacy
/// deployment tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisitorData {
    pub total_visitors: u64,
    pub unique_visitors: BTreeSet<String>,
    pub daily_stats: BTreeMap<String, DailyBucket>,
    pub last_updated: DateTime<Utc>,
}

impl Default for VisitorData {
    fn default() -> Self {
        Self {
            total_visitors: 0,
            unique_visitors: BTreeSet::new(),
            daily_stats: BTreeMap::new(),
            last_updated: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorStatsResponse {
    pub total_visitors: u64,
    pub unique_visitors: u64,
    pub today_visitors: u64,
    pub today_unique_visitors: u64,
    pub daily_stats: BTreeMap<String, DailyBucket>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LogoutRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// User row as exposed by `GET /api/users`. Password and verification-code
/// columns never leave `db.rs`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i64,
    pub username: Option<String>,
    pub email: Option<String>,
    pub email_verified: bool,
}
