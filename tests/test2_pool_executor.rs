#![cfg(feature = "sqlite")]

use sql_conduit::prelude::*;
use tokio::runtime::Runtime;

async fn temp_db(dir: &tempfile::TempDir) -> Result<DbHandle, DbError> {
    let path = dir.path().join("test.db");
    DbHandle::new_sqlite(path.to_string_lossy().into_owned(), PoolSettings::default()).await
}

#[test]
fn query_round_trip_on_transient_connections() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    rt.block_on(async {
        let db = temp_db(&dir).await?;

        db.execute_batch(
            "CREATE TABLE users (user_id INTEGER PRIMARY KEY, name TEXT, score REAL, active INTEGER);",
        )
        .await?;

        let affected = db
            .execute(
                "INSERT INTO users (user_id, name, score, active) VALUES ($1, $2, $3, $4)",
                &[
                    RowValues::Int(1),
                    RowValues::Text("alice".into()),
                    RowValues::Float(9.5),
                    RowValues::Bool(true),
                ],
            )
            .await?;
        assert_eq!(affected, 1);

        let rows = db
            .query(
                "SELECT user_id, name, score, active FROM users WHERE user_id = $1",
                &[RowValues::Int(1)],
            )
            .await?;
        assert_eq!(rows.len(), 1);
        let row = &rows.rows[0];
        assert_eq!(row.get("user_id").and_then(|v| v.as_int()), Some(&1));
        assert_eq!(row.get("name").and_then(|v| v.as_text()), Some("alice"));
        assert_eq!(row.get("score").and_then(|v| v.as_float()), Some(9.5));
        assert_eq!(row.get("active").and_then(|v| v.as_bool()), Some(true));

        db.shutdown();
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn statement_failure_carries_the_sql_text() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    rt.block_on(async {
        let db = temp_db(&dir).await?;

        let err = db
            .query("SELECT * FROM no_such_table", &[])
            .await
            .unwrap_err();
        assert_eq!(err.code(), 500);
        assert!(err.to_string().contains("no_such_table"));

        // the failure did not poison the pool
        let rows = db.query("SELECT 1 AS one", &[]).await?;
        assert_eq!(rows.rows[0].get("one").and_then(|v| v.as_int()), Some(&1));

        db.shutdown();
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn release_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    rt.block_on(async {
        let db = temp_db(&dir).await?;

        let mut conn = db.acquire().await?;
        assert!(!conn.is_released());
        conn.release();
        assert!(conn.is_released());
        conn.release(); // second call is a no-op, not a double return
        assert!(conn.is_released());

        let err = conn.execute_select("SELECT 1", &[]).await.unwrap_err();
        assert_eq!(err.code(), 500);

        // the pool still hands out connections afterward
        let mut conn2 = db.acquire().await?;
        conn2.execute_select("SELECT 1", &[]).await?;
        conn2.release();

        db.shutdown();
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn acquisition_times_out_when_the_pool_is_exhausted() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    rt.block_on(async {
        let path = dir.path().join("test.db");
        let settings = PoolSettings {
            max_size: 1,
            connection_timeout_ms: Some(100),
            idle_timeout_ms: None,
        };
        let db = DbHandle::new_sqlite(path.to_string_lossy().into_owned(), settings).await?;

        let mut held = db.acquire().await?;
        let err = db.acquire().await.unwrap_err();
        assert_eq!(err.code(), 500);

        held.release();
        let mut conn = db.acquire().await?;
        conn.release();

        db.shutdown();
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn stale_idle_connections_are_pruned_on_acquire() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    rt.block_on(async {
        let path = dir.path().join("test.db");
        let settings = PoolSettings {
            max_size: 2,
            connection_timeout_ms: Some(1000),
            idle_timeout_ms: Some(50),
        };
        let db = DbHandle::new_sqlite(path.to_string_lossy().into_owned(), settings).await?;

        // park a connection in the pool and let it outlive the idle bound
        let mut conn = db.acquire().await?;
        conn.release();
        tokio::time::sleep(std::time::Duration::from_millis(120)).await;

        // acquisition discards the stale session and hands out a usable one
        let mut conn = db.acquire().await?;
        let rows = conn.execute_select("SELECT 1 AS one", &[]).await?;
        assert_eq!(rows.rows[0].get("one").and_then(|v| v.as_int()), Some(&1));
        conn.release();

        db.shutdown();
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn shutdown_stops_new_acquisitions() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    rt.block_on(async {
        let db = temp_db(&dir).await?;
        db.shutdown();
        db.shutdown(); // second call must not corrupt anything
        assert!(db.acquire().await.is_err());
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn dropped_connection_returns_to_the_pool() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    rt.block_on(async {
        let path = dir.path().join("test.db");
        let settings = PoolSettings {
            max_size: 1,
            connection_timeout_ms: Some(1000),
            idle_timeout_ms: None,
        };
        let db = DbHandle::new_sqlite(path.to_string_lossy().into_owned(), settings).await?;

        {
            let _abandoned = db.acquire().await?;
            // dropped without an explicit release
        }
        let mut conn = db.acquire().await?;
        conn.release();

        db.shutdown();
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}
