use crate::models::PublicUser;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use tracing::{error, info};

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT,
    email TEXT,
    password TEXT,
    email_verified INTEGER DEFAULT 0,
    verification_code TEXT
)
"#;

const CREATE_LOGIN_LOGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS login_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER,
    username TEXT,
    email TEXT,
    login_time TEXT,
    logout_time TEXT,
    duration_seconds INTEGER
)
"#;

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub email: Option<String>,
    pub email_verified: bool,
}

/// Shape of the legacy `users.json` entries imported on first start.
#[derive(Debug, Deserialize)]
struct LegacyUser {
    username: String,
    password: String,
}

#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    pub async fn connect(path: &Path) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;
        Self::bootstrap(pool).await
    }

    #[cfg(test)]
    pub async fn connect_in_memory() -> Result<Self, sqlx::Error> {
        // One connection only: every sqlite memory connection is its own db.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::bootstrap(pool).await
    }

    async fn bootstrap(pool: Pool<Sqlite>) -> Result<Self, sqlx::Error> {
        sqlx::query(CREATE_USERS_TABLE).execute(&pool).await?;
        sqlx::query(CREATE_LOGIN_LOGS_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// One-shot import of the legacy `users.json` store, only when the users
    /// table is still empty. Import problems are logged and skipped so a stale
    /// legacy file cannot block startup.
    pub async fn migrate_legacy_users(&self, path: &Path) -> Result<(), sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            return Ok(());
        }

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => {
                error!("failed to read legacy users file: {err}");
                return Ok(());
            }
        };
        let users: Vec<LegacyUser> = match serde_json::from_slice(&bytes) {
            Ok(users) => users,
            Err(err) => {
                error!("failed to parse legacy users file: {err}");
                return Ok(());
            }
        };

        for user in &users {
            sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
                .bind(&user.username)
                .bind(&user.password)
                .execute(&self.pool)
                .await?;
        }
        info!("migrated {} users from the legacy store", users.len());
        Ok(())
    }

    pub async fn find_by_username_and_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let row: Option<(i64, Option<String>, Option<String>, i64)> = sqlx::query_as(
            "SELECT id, username, email, email_verified FROM users WHERE username = ? AND password = ?",
        )
        .bind(username)
        .bind(password)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(to_user))
    }

    pub async fn find_by_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let row: Option<(i64, Option<String>, Option<String>, i64)> = sqlx::query_as(
            "SELECT id, username, email, email_verified FROM users WHERE email = ? AND password = ?",
        )
        .bind(email)
        .bind(password)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(to_user))
    }

    pub async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let row: Option<(i64, Option<String>, Option<String>, i64)> = sqlx::query_as(
            "SELECT id, username, email, email_verified FROM users WHERE username = ? OR email = ? LIMIT 1",
        )
        .bind(username)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(to_user))
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn list_users(&self) -> Result<Vec<PublicUser>, sqlx::Error> {
        let rows: Vec<(i64, Option<String>, Option<String>, i64)> =
            sqlx::query_as("SELECT id, username, email, email_verified FROM users ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|(id, username, email, verified)| PublicUser {
                id,
                username,
                email,
                email_verified: verified != 0,
            })
            .collect())
    }

    pub async fn record_login(&self, user: &User) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO login_logs (user_id, username, email, login_time) VALUES (?, ?, ?, ?)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Closes the most recent login-log row for this user that has no logout
    /// yet, filling in the logout time and the session duration.
    pub async fn record_logout(&self, user: &User) -> Result<(), sqlx::Error> {
        let row: Option<(i64, String)> = sqlx::query_as(
            "SELECT id, login_time FROM login_logs \
             WHERE (user_id = ? OR username = ? OR email = ?) AND logout_time IS NULL \
             ORDER BY login_time DESC LIMIT 1",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .fetch_optional(&self.pool)
        .await?;

        let Some((log_id, login_time)) = row else {
            return Ok(());
        };

        let now = Utc::now();
        let duration = DateTime::parse_from_rfc3339(&login_time)
            .map(|started| (now - started.with_timezone(&Utc)).num_seconds().max(0))
            .unwrap_or(0);
        sqlx::query(
            "UPDATE login_logs SET logout_time = ?, duration_seconds = ? WHERE id = ?",
        )
        .bind(now.to_rfc3339())
        .bind(duration)
        .bind(log_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[cfg(test)]
    async fn insert_user(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        password: &str,
        verified: bool,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO users (username, email, password, email_verified) VALUES (?, ?, ?, ?)",
        )
        .bind(username)
        .bind(email)
        .bind(password)
        .bind(verified as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn to_user(row: (i64, Option<String>, Option<String>, i64)) -> User {
    User {
        id: row.0,
        username: row.1,
        email: row.2,
        email_verified: row.3 != 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn credential_lookup_requires_exact_match() {
        let db = Database::connect_in_memory().await.unwrap();
        db.insert_user(Some("analyst"), None, "hunter2", false)
            .await
            .unwrap();

        let user = db
            .find_by_username_and_password("analyst", "hunter2")
            .await
            .unwrap()
            .expect("user");
        assert_eq!(user.username.as_deref(), Some("analyst"));

        assert!(db
            .find_by_username_and_password("analyst", "wrong")
            .await
            .unwrap()
            .is_none());
        assert!(db
            .find_by_username_and_password("nobody", "hunter2")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn email_lookup_reports_verification_state() {
        let db = Database::connect_in_memory().await.unwrap();
        db.insert_user(None, Some("a@example.com"), "pw", true)
            .await
            .unwrap();
        db.insert_user(None, Some("b@example.com"), "pw", false)
            .await
            .unwrap();

        let verified = db
            .find_by_email_and_password("a@example.com", "pw")
            .await
            .unwrap()
            .expect("user");
        assert!(verified.email_verified);

        let unverified = db
            .find_by_email_and_password("b@example.com", "pw")
            .await
            .unwrap()
            .expect("user");
        assert!(!unverified.email_verified);

        assert!(db.email_exists("a@example.com").await.unwrap());
        assert!(!db.email_exists("c@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn legacy_migration_runs_once() {
        let db = Database::connect_in_memory().await.unwrap();

        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("osint_portal_users_{}_{nanos}.json", std::process::id()));
        tokio::fs::write(
            &path,
            br#"[{"username":"admin","password":"secret"},{"username":"viewer","password":"pw"}]"#,
        )
        .await
        .unwrap();

        db.migrate_legacy_users(&path).await.unwrap();
        assert_eq!(db.list_users().await.unwrap().len(), 2);

        // Table is no longer empty, so a second run must not duplicate rows.
        db.migrate_legacy_users(&path).await.unwrap();
        assert_eq!(db.list_users().await.unwrap().len(), 2);

        let _ = tokio::fs::remove_file(&path).await;

        assert!(db
            .find_by_username_and_password("admin", "secret")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn missing_legacy_file_is_fine() {
        let db = Database::connect_in_memory().await.unwrap();
        db.migrate_legacy_users(Path::new("/nonexistent/users.json"))
            .await
            .unwrap();
        assert!(db.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn logout_closes_the_latest_open_login() {
        let db = Database::connect_in_memory().await.unwrap();
        db.insert_user(Some("analyst"), None, "pw", false)
            .await
            .unwrap();
        let user = db
            .find_by_username_and_password("analyst", "pw")
            .await
            .unwrap()
            .expect("user");

        db.record_login(&user).await.unwrap();
        db.record_logout(&user).await.unwrap();

        let row: (Option<String>, Option<i64>) = sqlx::query_as(
            "SELECT logout_time, duration_seconds FROM login_logs WHERE user_id = ?",
        )
        .bind(user.id)
        .fetch_one(&db.pool)
        .await
        .unwrap();
        assert!(row.0.is_some());
        assert!(row.1.unwrap() >= 0);

        // A second logout with no open row is a no-op, not an error.
        db.record_logout(&user).await.unwrap();
    }
}
