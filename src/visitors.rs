use crate::models::{VisitorData, VisitorStatsResponse};
use chrono::{DateTime, NaiveDate, Utc};
use sha2::{Digest, Sha256};

/// Stable pseudonymous id for one device: sha256 over `"{addr}|{agent}"`.
/// One-way on purpose; the raw address/agent pair is never stored.
pub fn visitor_id(client_addr: &str, user_agent: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(client_addr.as_bytes());
    hasher.update(b"|");
    hasher.update(user_agent.as_bytes());
    hex::encode(hasher.finalize())
}

/// Count a page view. Returns true when the visit was actually counted,
/// false for a repeat visit from the same device on the same UTC day.
pub fn record_visit(data: &mut VisitorData, client_addr: &str, user_agent: &str) -> bool {
    record_visit_at(Utc::now(), data, client_addr, user_agent)
}

pub fn record_visit_at(
    now: DateTime<Utc>,
    data: &mut VisitorData,
    client_addr: &str,
    user_agent: &str,
) -> bool {
    let id = visitor_id(client_addr, user_agent);
    let bucket = data
        .daily_stats
        .entry(date_key(now.date_naive()))
        .or_default();

    // One count per device per day.
    if !bucket.unique_ids.insert(id.clone()) {
        return false;
    }

    bucket.visits = bucket.visits.saturating_add(1);
    bucket.uniques = bucket.unique_ids.len() as u64;
    data.total_visitors = data.total_visitors.saturating_add(1);
    data.unique_visitors.insert(id);
    data.last_updated = now;
    true
}

/// Read-only aggregate snapshot. A day with no bucket reads as zeros; nothing
/// is inserted into the map here.
pub fn build_snapshot(data: &VisitorData) -> VisitorStatsResponse {
    build_snapshot_at(Utc::now().date_naive(), data)
}

pub fn build_snapshot_at(today: NaiveDate, data: &VisitorData) -> VisitorStatsResponse {
    let today_bucket = data.daily_stats.get(&date_key(today));
    VisitorStatsResponse {
        total_visitors: data.total_visitors,
        unique_visitors: data.unique_visitors.len() as u64,
        today_visitors: today_bucket.map_or(0, |bucket| bucket.visits),
        today_unique_visitors: today_bucket.map_or(0, |bucket| bucket.uniques),
        daily_stats: data.daily_stats.clone(),
        last_updated: data.last_updated,
    }
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
