#![cfg(feature = "sqlite")]

use serde_json::json;
use sql_conduit::prelude::*;
use tokio::runtime::Runtime;

async fn temp_db(dir: &tempfile::TempDir) -> Result<DbHandle, DbError> {
    let path = dir.path().join("test.db");
    DbHandle::new_sqlite(path.to_string_lossy().into_owned(), PoolSettings::default()).await
}

#[test]
fn email_is_trimmed_lowercased_and_quoted() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    rt.block_on(async {
        let db = temp_db(&dir).await?;

        let clean = sanitize(
            &db,
            &json!(" USER@Example.com "),
            &SanitizeOptions::of_type(DataType::Email),
        )
        .await?;
        assert_eq!(clean.value, SafeValue::Literal("'user@example.com'".into()));

        let err = sanitize(
            &db,
            &json!("not an email"),
            &SanitizeOptions::of_type(DataType::Email),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), 400);

        db.shutdown();
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn bool_coercion_is_total_over_the_accepted_set() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    rt.block_on(async {
        let db = temp_db(&dir).await?;
        let opts = SanitizeOptions::of_type(DataType::Bool);

        for truthy in [json!(true), json!(1), json!("true")] {
            let clean = sanitize(&db, &truthy, &opts).await?;
            assert_eq!(clean.value, SafeValue::Int(1), "{truthy}");
        }
        for falsy in [json!(false), json!(0), json!("false")] {
            let clean = sanitize(&db, &falsy, &opts).await?;
            assert_eq!(clean.value, SafeValue::Int(0), "{falsy}");
        }
        for bad in [json!("yes"), json!(2), json!(1.5)] {
            let err = sanitize(&db, &bad, &opts).await.unwrap_err();
            assert_eq!(err.code(), 400, "{bad}");
        }

        db.shutdown();
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn numeric_types_are_never_escaped() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    rt.block_on(async {
        let db = temp_db(&dir).await?;

        let clean = sanitize(&db, &json!(42), &SanitizeOptions::of_type(DataType::Int)).await?;
        assert_eq!(clean.value, SafeValue::Int(42));
        assert_eq!(clean.value.as_sql(), "42");

        let clean =
            sanitize(&db, &json!("17"), &SanitizeOptions::of_type(DataType::Int)).await?;
        assert_eq!(clean.value, SafeValue::Int(17));

        let clean =
            sanitize(&db, &json!("3.5"), &SanitizeOptions::of_type(DataType::Float)).await?;
        assert_eq!(clean.value, SafeValue::Float(3.5));

        let err = sanitize(&db, &json!("abc"), &SanitizeOptions::of_type(DataType::Int))
            .await
            .unwrap_err();
        assert_eq!(err.code(), 400);

        // a float is not an int
        let err = sanitize(&db, &json!(3.5), &SanitizeOptions::of_type(DataType::Int))
            .await
            .unwrap_err();
        assert_eq!(err.code(), 400);

        // non-finite text parses as f64 but has no SQL literal form
        for bad in [json!("NaN"), json!("inf"), json!("-inf"), json!("Infinity")] {
            let err = sanitize(&db, &bad, &SanitizeOptions::of_type(DataType::Float))
                .await
                .unwrap_err();
            assert_eq!(err.code(), 400, "{bad}");
        }

        db.shutdown();
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn strings_escape_unless_asked_not_to() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    rt.block_on(async {
        let db = temp_db(&dir).await?;

        let clean = sanitize(
            &db,
            &json!("o'brien"),
            &SanitizeOptions::of_type(DataType::Text),
        )
        .await?;
        assert_eq!(clean.value, SafeValue::Literal("'o''brien'".into()));

        let clean = sanitize(
            &db,
            &json!("o'brien"),
            &SanitizeOptions::of_type(DataType::Text).return_escaped(false),
        )
        .await?;
        assert_eq!(clean.value, SafeValue::Text("o'brien".into()));

        // non-strings are invalid for the string type
        let err = sanitize(&db, &json!(5), &SanitizeOptions::of_type(DataType::Text))
            .await
            .unwrap_err();
        assert_eq!(err.code(), 400);

        db.shutdown();
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn null_handling_and_arrays() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    rt.block_on(async {
        let db = temp_db(&dir).await?;

        let clean = sanitize(&db, &serde_json::Value::Null, &SanitizeOptions::default()).await?;
        assert_eq!(clean.value, SafeValue::Null);
        assert_eq!(clean.value.as_sql(), "NULL");

        let err = sanitize(
            &db,
            &serde_json::Value::Null,
            &SanitizeOptions::default()
                .error_on_null(true)
                .property_name("user_id"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), 400);
        assert!(err.to_string().contains("user_id"));

        // arrays are rejected whatever the options say
        let err = sanitize(&db, &json!([1, 2]), &SanitizeOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), 400);
        assert!(err.to_string().contains("Cannot escape arrays"));

        db.shutdown();
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}
