use crate::errors::AppError;
use crate::models::VisitorData;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::error;

pub fn resolve_data_path() -> PathBuf {
    if let Ok(path) = env::var("VISITOR_DATA_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from("data/visitor-data.json")
}

/// Missing, unreadable, or malformed snapshots all start the tracker empty;
/// a bad file must never keep the server from booting.
pub async fn load_data(path: &Path) -> VisitorData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse visitor data file: {err}");
                VisitorData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => VisitorData::default(),
        Err(err) => {
            error!("failed to read visitor data file: {err}");
            VisitorData::default()
        }
    }
}

/// Overwrites the whole snapshot; sets serialize as ordered lists.
pub async fn persist_data(path: &Path, data: &VisitorData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visitors::record_visit_at;
    use chrono::{TimeZone, Utc};

    fn scratch_path(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("osint_portal_{tag}_{}_{nanos}.json", std::process::id()));
        path
    }

    #[tokio::test]
    async fn persist_then_load_round_trips() {
        let path = scratch_path("roundtrip");
        let mut data = VisitorData::default();
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
        record_visit_at(now, &mut data, "1.2.3.4", "UA1");
        record_visit_at(now, &mut data, "5.6.7.8", "UA2");

        persist_data(&path, &data).await.unwrap();
        let restored = load_data(&path).await;
        let _ = fs::remove_file(&path).await;

        assert_eq!(restored.total_visitors, data.total_visitors);
        assert_eq!(restored.unique_visitors, data.unique_visitors);
        assert_eq!(restored.last_updated, data.last_updated);
        let bucket = restored.daily_stats.get("2026-03-10").unwrap();
        assert_eq!(bucket.visits, 2);
        assert_eq!(bucket.uniques, 2);
        assert_eq!(bucket.unique_ids.len(), 2);
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let data = load_data(&scratch_path("missing")).await;
        assert_eq!(data.total_visitors, 0);
        assert!(data.unique_visitors.is_empty());
        assert!(data.daily_stats.is_empty());
    }

    #[tokio::test]
    async fn malformed_file_loads_empty() {
        let path = scratch_path("malformed");
        fs::write(&path, b"{not json").await.unwrap();

        let data = load_data(&path).await;
        let _ = fs::remove_file(&path).await;

        assert_eq!(data.total_visitors, 0);
        assert!(data.daily_stats.is_empty());
    }

    #[tokio::test]
    async fn reads_the_legacy_snapshot_layout() {
        let path = scratch_path("legacy");
        let legacy = serde_json::json!({
            "totalVisitors": 7,
            "uniqueVisitors": ["aa", "bb"],
            "dailyStats": {
                "2026-03-09": { "visits": 4, "uniques": 2, "uniqueIds": ["aa", "bb"] }
            },
            "lastUpdated": "2026-03-09T18:30:00Z"
        });
        fs::write(&path, serde_json::to_vec(&legacy).unwrap())
            .await
            .unwrap();

        let data = load_data(&path).await;
        let _ = fs::remove_file(&path).await;

        assert_eq!(data.total_visitors, 7);
        assert_eq!(data.unique_visitors.len(), 2);
        let bucket = data.daily_stats.get("2026-03-09").unwrap();
        assert_eq!(bucket.visits, 4);
        assert!(bucket.unique_ids.contains("bb"));
    }
}
