//! Enrollment Engine
//!
//! The only writer of enrollment rows. `enroll` keeps
//! `count(enrollments for class) <= class.capacity` under any interleaving
//! of concurrent calls: the per-class lock serializes callers in this
//! process, and the insert itself is guarded by the same count so the
//! database refuses an overbooking row from any other writer.

use sqlx::SqlitePool;
use studio_common::db::Enrollment;
use studio_common::{Error, Result};
use uuid::Uuid;

use super::ClassLocks;
use crate::db::{classes, clients, enrollments};

#[derive(Clone)]
pub struct EnrollmentEngine {
    db: SqlitePool,
    locks: ClassLocks,
}

impl EnrollmentEngine {
    pub fn new(db: SqlitePool, locks: ClassLocks) -> Self {
        Self { db, locks }
    }

    /// Enroll a client in a class
    ///
    /// # Errors
    /// * `NotFound` for an unknown class or client, including one removed
    ///   while the enrollment was being written
    /// * `CapacityExceeded` when the class is full; nothing is written
    pub async fn enroll(&self, class_id: Uuid, client_id: Uuid) -> Result<Enrollment> {
        let _guard = self.locks.acquire(class_id).await;

        let class = classes::get_class(&self.db, class_id)
            .await?
            .ok_or_else(|| Error::not_found("Class", class_id))?;
        if clients::get_client(&self.db, client_id).await?.is_none() {
            return Err(Error::not_found("Client", client_id));
        }

        let full = Error::CapacityExceeded {
            class_id,
            capacity: class.capacity,
        };

        let enrolled = enrollments::count_for_class(&self.db, class_id).await?;
        if enrolled >= class.capacity {
            tracing::warn!(class_id = %class_id, capacity = class.capacity, "Enrollment rejected: class full");
            return Err(full);
        }

        match enrollments::insert_if_seat_free(&self.db, class_id, client_id).await? {
            Some(enrollment) => {
                tracing::info!(
                    enrollment_id = %enrollment.id,
                    class_id = %class_id,
                    client_id = %client_id,
                    "Client enrolled"
                );
                Ok(enrollment)
            }
            None => {
                // The guard also refuses a class removed by another writer
                if classes::get_class(&self.db, class_id).await?.is_none() {
                    return Err(Error::not_found("Class", class_id));
                }
                tracing::warn!(class_id = %class_id, capacity = class.capacity, "Enrollment rejected by storage guard");
                Err(full)
            }
        }
    }

    /// Remove an enrollment and its attendance history
    pub async fn unenroll(&self, enrollment_id: Uuid) -> Result<()> {
        if !enrollments::delete_enrollment(&self.db, enrollment_id).await? {
            return Err(Error::not_found("Enrollment", enrollment_id));
        }
        tracing::info!(enrollment_id = %enrollment_id, "Enrollment removed");
        Ok(())
    }

    pub async fn list(&self, class_id: Option<Uuid>) -> Result<Vec<Enrollment>> {
        enrollments::list_enrollments(&self.db, class_id).await
    }

    pub async fn get(&self, enrollment_id: Uuid) -> Result<Enrollment> {
        enrollments::get_enrollment(&self.db, enrollment_id)
            .await?
            .ok_or_else(|| Error::not_found("Enrollment", enrollment_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support;

    async fn setup() -> (SqlitePool, EnrollmentEngine) {
        let pool = test_support::pool().await;
        let engine = EnrollmentEngine::new(pool.clone(), ClassLocks::new());
        (pool, engine)
    }

    #[tokio::test]
    async fn test_capacity_is_enforced() {
        let (pool, engine) = setup().await;
        let class = test_support::class(&pool, "Cycling", 3).await;

        for n in 0..3 {
            let client = test_support::client(&pool, &format!("c{}@example.com", n)).await;
            engine.enroll(class.id, client.id).await.unwrap();
        }

        let late = test_support::client(&pool, "late@example.com").await;
        let err = engine.enroll(class.id, late.id).await.unwrap_err();
        assert!(matches!(
            err,
            Error::CapacityExceeded { class_id, capacity: 3 } if class_id == class.id
        ));
        assert_eq!(engine.list(Some(class.id)).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_seat_freed_by_unenroll() {
        // capacity 2: X and Y fit, Z is turned away until X leaves
        let (pool, engine) = setup().await;
        let class = test_support::class(&pool, "Yoga", 2).await;
        let x = test_support::client(&pool, "x@example.com").await;
        let y = test_support::client(&pool, "y@example.com").await;
        let z = test_support::client(&pool, "z@example.com").await;

        let ex = engine.enroll(class.id, x.id).await.unwrap();
        engine.enroll(class.id, y.id).await.unwrap();
        assert!(matches!(
            engine.enroll(class.id, z.id).await,
            Err(Error::CapacityExceeded { .. })
        ));

        engine.unenroll(ex.id).await.unwrap();
        let ez = engine.enroll(class.id, z.id).await.unwrap();

        let clients: Vec<Uuid> = engine
            .list(Some(class.id))
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.client_id)
            .collect();
        assert_eq!(clients, vec![y.id, z.id]);
        assert_eq!(engine.get(ez.id).await.unwrap(), ez);
    }

    #[tokio::test]
    async fn test_unknown_references() {
        let (pool, engine) = setup().await;
        let class = test_support::class(&pool, "Yoga", 2).await;
        let client = test_support::client(&pool, "maria@example.com").await;

        assert!(matches!(
            engine.enroll(Uuid::new_v4(), client.id).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            engine.enroll(class.id, Uuid::new_v4()).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(engine.unenroll(Uuid::new_v4()).await, Err(Error::NotFound(_))));
        assert!(engine.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_class_ids_leave_no_lock_entries() {
        let pool = test_support::pool().await;
        let locks = ClassLocks::new();
        let engine = EnrollmentEngine::new(pool.clone(), locks.clone());
        let client = test_support::client(&pool, "maria@example.com").await;

        for _ in 0..1000 {
            assert!(matches!(
                engine.enroll(Uuid::new_v4(), client.id).await,
                Err(Error::NotFound(_))
            ));
        }
        assert_eq!(locks.len().await, 0);
    }

    #[tokio::test]
    async fn test_same_pair_may_enroll_twice() {
        let (pool, engine) = setup().await;
        let class = test_support::class(&pool, "Yoga", 2).await;
        let client = test_support::client(&pool, "maria@example.com").await;

        engine.enroll(class.id, client.id).await.unwrap();
        engine.enroll(class.id, client.id).await.unwrap();
        assert_eq!(engine.list(Some(class.id)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_enrolls_never_overbook() {
        let dir = tempfile::tempdir().unwrap();
        let pool = studio_common::db::init_database(&dir.path().join("studio.db"))
            .await
            .unwrap();
        let engine = EnrollmentEngine::new(pool.clone(), ClassLocks::new());

        const CAPACITY: i64 = 8;
        let class = test_support::class(&pool, "Cycling", CAPACITY).await;
        let mut client_ids = Vec::new();
        for n in 0..CAPACITY + 5 {
            let client = test_support::client(&pool, &format!("rider{}@example.com", n)).await;
            client_ids.push(client.id);
        }

        let handles: Vec<_> = client_ids
            .into_iter()
            .map(|client_id| {
                let engine = engine.clone();
                tokio::spawn(async move { engine.enroll(class.id, client_id).await })
            })
            .collect();

        let mut succeeded = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(Error::CapacityExceeded { .. }) => rejected += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(succeeded, CAPACITY);
        assert_eq!(rejected, 5);
        assert_eq!(enrollments::count_for_class(&pool, class.id).await.unwrap(), CAPACITY);
    }

    #[tokio::test]
    async fn test_storage_guard_holds_across_engines() {
        // Two engines with separate lock tables stand in for two processes
        let dir = tempfile::tempdir().unwrap();
        let pool = studio_common::db::init_database(&dir.path().join("studio.db"))
            .await
            .unwrap();
        let first = EnrollmentEngine::new(pool.clone(), ClassLocks::new());
        let second = EnrollmentEngine::new(pool.clone(), ClassLocks::new());

        let class = test_support::class(&pool, "Boxing", 4).await;
        let mut handles = Vec::new();
        for n in 0..10 {
            let client = test_support::client(&pool, &format!("b{}@example.com", n)).await;
            let engine = if n % 2 == 0 { first.clone() } else { second.clone() };
            handles.push(tokio::spawn(async move { engine.enroll(class.id, client.id).await }));
        }
        for handle in handles {
            let _ = handle.await.unwrap();
        }

        assert_eq!(enrollments::count_for_class(&pool, class.id).await.unwrap(), 4);
    }
}
