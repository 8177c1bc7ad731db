//! Class Registry
//!
//! Sole writer of class rows. Checks that the referenced modality and
//! instructor exist, and refuses to shrink a class below its current
//! enrollment count.

use sqlx::SqlitePool;
use studio_common::db::Class;
use studio_common::{Error, Result};
use uuid::Uuid;

use super::ClassLocks;
use crate::db::classes::{self, ClassOccupancy, ClassPatch, NewClass};
use crate::db::{enrollments, instructors, modalities};

#[derive(Clone)]
pub struct ClassRegistry {
    db: SqlitePool,
    locks: ClassLocks,
}

impl ClassRegistry {
    pub fn new(db: SqlitePool, locks: ClassLocks) -> Self {
        Self { db, locks }
    }

    /// Classes with modality name and enrolled count, weekly order
    pub async fn list_with_occupancy(&self) -> Result<Vec<ClassOccupancy>> {
        classes::list_class_occupancy(&self.db).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Class> {
        classes::get_class(&self.db, id)
            .await?
            .ok_or_else(|| Error::not_found("Class", id))
    }

    pub async fn create(&self, input: NewClass) -> Result<Class> {
        // Shape first, so malformed input never touches storage
        classes::validate_day_of_week(input.day_of_week)?;
        classes::validate_time(&input.time)?;
        classes::validate_capacity(input.capacity)?;
        self.check_references(input.modality_id, input.instructor_id).await?;

        let class = classes::insert_class(&self.db, &input).await?;
        tracing::info!(class_id = %class.id, capacity = class.capacity, "Class created");
        Ok(class)
    }

    /// Apply a patch under the class lock
    ///
    /// Fails with `InvalidInput` when the new capacity is below the number
    /// of current enrollments.
    pub async fn update(&self, id: Uuid, patch: ClassPatch) -> Result<Class> {
        let _guard = self.locks.acquire(id).await;

        let current = self.get(id).await?;
        let updated = patch.apply(current)?;
        self.check_references(updated.modality_id, updated.instructor_id).await?;

        let enrolled = enrollments::count_for_class(&self.db, id).await?;
        if updated.capacity < enrolled {
            tracing::warn!(
                class_id = %id,
                capacity = updated.capacity,
                enrolled,
                "Rejected capacity below enrollment count"
            );
            return Err(Error::InvalidInput(format!(
                "capacity {} is below the {} current enrollments",
                updated.capacity, enrolled
            )));
        }

        classes::save_class(&self.db, &updated).await?;
        tracing::info!(class_id = %id, capacity = updated.capacity, "Class updated");
        Ok(updated)
    }

    /// Delete a class with its enrollments and attendances
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let deleted = {
            let _guard = self.locks.acquire(id).await;
            classes::delete_class(&self.db, id).await?
        };
        if !deleted {
            return Err(Error::not_found("Class", id));
        }

        tracing::info!(class_id = %id, "Class deleted");
        Ok(())
    }

    async fn check_references(&self, modality_id: Uuid, instructor_id: Uuid) -> Result<()> {
        if modalities::get_modality(&self.db, modality_id).await?.is_none() {
            return Err(Error::not_found("Modality", modality_id));
        }
        if instructors::get_instructor(&self.db, instructor_id).await?.is_none() {
            return Err(Error::not_found("Instructor", instructor_id));
        }
        Ok(())
    }
}
