//! Database initialization and cascade behavior

use studio_common::db::init::{init_database, init_memory_database};
use studio_common::db::migrations::get_schema_version;

const TABLES: [&str; 8] = [
    "users",
    "modalities",
    "instructors",
    "instructor_modalities",
    "clients",
    "classes",
    "enrollments",
    "attendances",
];

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("studio.db");
    assert!(!db_path.exists());

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("studio.db");

    let pool1 = init_database(&db_path).await.unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());
}

#[tokio::test]
async fn test_all_tables_created() {
    let pool = init_memory_database().await.unwrap();

    for table in TABLES {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(exists, "table {} missing", table);
    }

    assert_eq!(get_schema_version(&pool).await.unwrap(), 1);
}

#[tokio::test]
async fn test_foreign_keys_enabled_on_every_connection() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("studio.db")).await.unwrap();

    // Check out several connections at once so more than one is opened
    let mut held = Vec::new();
    for _ in 0..3 {
        held.push(pool.acquire().await.unwrap());
    }
    for conn in held.iter_mut() {
        let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&mut **conn)
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }
}

#[tokio::test]
async fn test_class_delete_cascades_to_enrollments_and_attendances() {
    let pool = init_memory_database().await.unwrap();
    let ts = "2025-11-22T07:00:00.000Z";

    for sql in [
        "INSERT INTO modalities VALUES ('m1', 'Yoga', 'Stretch', '2025-01-01T00:00:00.000Z')",
        "INSERT INTO instructors VALUES ('i1', 'Ana', 'ana@example.com', '2025-01-01T00:00:00.000Z')",
        "INSERT INTO clients VALUES ('c1', 'Maria', 'maria@example.com', '555', 'active', '2025-01-01T00:00:00.000Z', '2025-01-01T00:00:00.000Z')",
        "INSERT INTO classes VALUES ('k1', 'm1', 'i1', 1, '07:00', 10, '2025-01-01T00:00:00.000Z')",
        "INSERT INTO enrollments VALUES ('e1', 'k1', 'c1', '2025-01-01T00:00:00.000Z')",
    ] {
        sqlx::query(sql).execute(&pool).await.unwrap();
    }
    sqlx::query("INSERT INTO attendances VALUES ('a1', 'e1', 'k1', 'c1', ?, '2025-11-22', 1, ?)")
        .bind(ts)
        .bind(ts)
        .execute(&pool)
        .await
        .unwrap();

    sqlx::query("DELETE FROM classes WHERE guid = 'k1'")
        .execute(&pool)
        .await
        .unwrap();

    let enrollments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM enrollments")
        .fetch_one(&pool)
        .await
        .unwrap();
    let attendances: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attendances")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(enrollments, 0);
    assert_eq!(attendances, 0);
}

#[tokio::test]
async fn test_present_requires_checked_in_at() {
    let pool = init_memory_database().await.unwrap();

    for sql in [
        "INSERT INTO modalities VALUES ('m1', 'Yoga', 'Stretch', '2025-01-01T00:00:00.000Z')",
        "INSERT INTO instructors VALUES ('i1', 'Ana', 'ana@example.com', '2025-01-01T00:00:00.000Z')",
        "INSERT INTO clients VALUES ('c1', 'Maria', 'maria@example.com', '555', 'active', '2025-01-01T00:00:00.000Z', '2025-01-01T00:00:00.000Z')",
        "INSERT INTO classes VALUES ('k1', 'm1', 'i1', 1, '07:00', 10, '2025-01-01T00:00:00.000Z')",
        "INSERT INTO enrollments VALUES ('e1', 'k1', 'c1', '2025-01-01T00:00:00.000Z')",
    ] {
        sqlx::query(sql).execute(&pool).await.unwrap();
    }

    let result = sqlx::query(
        "INSERT INTO attendances VALUES ('a1', 'e1', 'k1', 'c1', '2025-11-22T07:00:00.000Z', '2025-11-22', 1, NULL)",
    )
    .execute(&pool)
    .await;
    assert!(result.is_err(), "present without checked_in_at must be rejected");
}
