use crate::model::LinkRecord;
use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::instrument;

pub type Pool = SqlitePool;

pub async fn init_pool(database_url: &str) -> Result<Pool> {
    let normalized = prepare_sqlite_url(database_url);
    let mut options = SqlitePoolOptions::new();
    // Every connection to `sqlite::memory:` opens its own database.
    if normalized.starts_with("sqlite::memory") {
        options = options
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }
    // Applied on every new connection, not just the first one.
    let connect_options = SqliteConnectOptions::from_str(&normalized)
        .with_context(|| format!("invalid database URL {}", normalized))?
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Full);
    let pool = options
        .connect_with(connect_options)
        .await
        .with_context(|| format!("failed to open database {}", normalized))?;
    Ok(pool)
}

/// If using a file-backed SQLite URL, expand a leading `~/`, ensure the parent
/// directory exists and ask SQLite to create the file. In-memory URLs are
/// returned untouched.
fn prepare_sqlite_url(url: &str) -> String {
    if !url.starts_with("sqlite:") {
        return url.to_string();
    }
    if url.starts_with("sqlite::memory") {
        return url.to_string();
    }

    let rest = &url["sqlite:".len()..];
    let path_with_query = rest.strip_prefix("//").unwrap_or(rest);

    let (path_part, query_part) = match path_with_query.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path_with_query, None),
    };

    if path_part.is_empty() {
        return url.to_string();
    }

    let expanded_path = match path_part.strip_prefix("~/") {
        Some(rest) => match std::env::var("HOME") {
            Ok(home) => format!("{}/{}", home.trim_end_matches('/'), rest),
            Err(_) => path_part.to_string(),
        },
        None => path_part.to_string(),
    };

    if let Some(parent) = std::path::Path::new(&expanded_path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }

    let mut rebuilt = String::from("sqlite://");
    rebuilt.push_str(&expanded_path);
    match query_part {
        Some(q) if q.split('&').any(|kv| kv.starts_with("mode=")) => {
            rebuilt.push('?');
            rebuilt.push_str(q);
        }
        Some(q) => {
            rebuilt.push('?');
            rebuilt.push_str(q);
            rebuilt.push_str("&mode=rwc");
        }
        None => rebuilt.push_str("?mode=rwc"),
    }
    rebuilt
}

pub async fn run_migrations(pool: &Pool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Round-trip a trivial query so startup fails fast on a dead database.
pub async fn ping(pool: &Pool) -> Result<()> {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(pool)
        .await
        .context("database ping failed")?;
    Ok(())
}

#[instrument(skip_all, fields(id = %record.id))]
pub async fn insert_link(pool: &Pool, record: &LinkRecord) -> Result<()> {
    sqlx::query("INSERT INTO urls (id, message, url, date) VALUES (?, ?, ?, ?)")
        .bind(&record.id)
        .bind(&record.message)
        .bind(&record.url)
        .bind(record.date)
        .execute(pool)
        .await
        .context("failed to insert link")?;
    Ok(())
}

pub async fn count_links(pool: &Pool) -> Result<i64> {
    let cnt: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls")
        .fetch_one(pool)
        .await?;
    Ok(cnt)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn get_link(pool: &Pool, id: &str) -> Option<LinkRecord> {
        sqlx::query_as::<_, LinkRecord>("SELECT id, message, url, date FROM urls WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
            .unwrap()
    }

    async fn setup_pool() -> Pool {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    #[test]
    fn sqlite_url_normalization() {
        assert_eq!(prepare_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            prepare_sqlite_url("postgres://localhost/db"),
            "postgres://localhost/db"
        );
        let td = tempfile::tempdir().unwrap();
        let nested = td.path().join("a/b/links.db");
        let url = format!("sqlite://{}", nested.display());
        assert_eq!(
            prepare_sqlite_url(&url),
            format!("sqlite://{}?mode=rwc", nested.display())
        );
        assert!(nested.parent().unwrap().exists());

        let with_mode = format!("sqlite:{}?mode=ro", nested.display());
        assert_eq!(
            prepare_sqlite_url(&with_mode),
            format!("sqlite://{}?mode=ro", nested.display())
        );
    }

    #[tokio::test]
    async fn insert_and_read_back() {
        let pool = setup_pool().await;
        ping(&pool).await.unwrap();
        assert_eq!(count_links(&pool).await.unwrap(), 0);

        let rec = LinkRecord::new("model at https://example.com/m.glb", "https://example.com/m.glb");
        insert_link(&pool, &rec).await.unwrap();

        let stored = get_link(&pool, &rec.id).await.unwrap();
        assert_eq!(stored.message, rec.message);
        assert_eq!(stored.url, rec.url);
        assert_eq!(stored.date.timestamp_micros(), rec.date.timestamp_micros());
        assert!(get_link(&pool, "missing").await.is_none());
    }

    #[tokio::test]
    async fn duplicate_id_fails() {
        let pool = setup_pool().await;
        let rec = LinkRecord::new("https://a", "https://a");
        insert_link(&pool, &rec).await.unwrap();
        assert!(insert_link(&pool, &rec).await.is_err());
        assert_eq!(count_links(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn every_connection_gets_wal_and_full_sync() {
        let td = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", td.path().join("links.db").display());
        let pool = init_pool(&url).await.unwrap();

        let mut first = pool.acquire().await.unwrap();
        let mut second = pool.acquire().await.unwrap();
        for conn in [&mut first, &mut second] {
            let sync: i64 = sqlx::query_scalar("PRAGMA synchronous")
                .fetch_one(&mut **conn)
                .await
                .unwrap();
            assert_eq!(sync, 2);
            let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
                .fetch_one(&mut **conn)
                .await
                .unwrap();
            assert_eq!(mode.to_lowercase(), "wal");
        }
    }
}
