//! Attendance Tracker
//!
//! Presence per enrollment and calendar day. Each row is a two-state
//! machine: absent (`checked_in_at` unset) and present (`checked_in_at`
//! set to the moment of the latest check-in).

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use studio_common::db::Attendance;
use studio_common::time::{self, now};
use studio_common::{Error, Result};
use uuid::Uuid;

use crate::db::attendances::{self, AttendanceFilter};
use crate::db::enrollments;

/// Check-in request for one occurrence
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAttendance {
    pub enrollment_id: Uuid,
    pub class_id: Uuid,
    pub client_id: Uuid,
    #[serde(deserialize_with = "time::flexible::deserialize")]
    pub date: DateTime<Utc>,
    pub present: bool,
}

#[derive(Clone)]
pub struct AttendanceTracker {
    db: SqlitePool,
}

impl AttendanceTracker {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Record presence for the occurrence on `input.date`'s UTC day
    ///
    /// A second call for the same enrollment and day updates the existing
    /// row instead of adding another.
    ///
    /// # Errors
    /// * `NotFound` when the enrollment does not exist
    /// * `InvalidInput` when class or client differ from the enrollment's
    pub async fn record(&self, input: NewAttendance) -> Result<Attendance> {
        let enrollment = enrollments::get_enrollment(&self.db, input.enrollment_id)
            .await?
            .ok_or_else(|| Error::not_found("Enrollment", input.enrollment_id))?;

        if enrollment.class_id != input.class_id || enrollment.client_id != input.client_id {
            return Err(Error::InvalidInput(format!(
                "classId/clientId do not match enrollment {}",
                enrollment.id
            )));
        }

        let checked_in_at = input.present.then(now);
        let attendance = attendances::upsert_attendance(
            &self.db,
            enrollment.id,
            enrollment.class_id,
            enrollment.client_id,
            input.date,
            checked_in_at,
        )
        .await?;

        tracing::info!(
            attendance_id = %attendance.id,
            enrollment_id = %enrollment.id,
            present = attendance.present,
            "Attendance recorded"
        );
        Ok(attendance)
    }

    /// Move one row to present (refreshing `checked_in_at`) or absent
    pub async fn set_presence(&self, id: Uuid, present: bool) -> Result<Attendance> {
        let checked_in_at = present.then(now);
        let attendance = attendances::update_presence(&self.db, id, checked_in_at)
            .await?
            .ok_or_else(|| Error::not_found("Attendance", id))?;

        tracing::info!(attendance_id = %id, present, "Presence changed");
        Ok(attendance)
    }

    /// `set_presence` over `ids` in order
    ///
    /// Stops at the first unknown id; rows before it keep their new state.
    pub async fn set_presence_many(&self, ids: &[Uuid], present: bool) -> Result<Vec<Attendance>> {
        let mut updated = Vec::with_capacity(ids.len());
        for id in ids {
            updated.push(self.set_presence(*id, present).await?);
        }
        Ok(updated)
    }

    pub async fn query(
        &self,
        class_id: Option<Uuid>,
        client_id: Option<Uuid>,
        day: Option<NaiveDate>,
    ) -> Result<Vec<Attendance>> {
        let filter = AttendanceFilter {
            class_id,
            client_id,
            day,
        };
        tracing::debug!(?filter, "Querying attendances");
        attendances::query_attendances(&self.db, &filter).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Attendance> {
        attendances::get_attendance(&self.db, id)
            .await?
            .ok_or_else(|| Error::not_found("Attendance", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support;
    use chrono::TimeZone;
    use studio_common::db::Enrollment;

    async fn setup() -> (SqlitePool, AttendanceTracker, Enrollment) {
        let pool = test_support::pool().await;
        let class = test_support::class(&pool, "Yoga", 10).await;
        let client = test_support::client(&pool, "maria@example.com").await;
        let enrollment = enrollments::insert_if_seat_free(&pool, class.id, client.id)
            .await
            .unwrap()
            .unwrap();
        (pool.clone(), AttendanceTracker::new(pool), enrollment)
    }

    fn check_in(enrollment: &Enrollment, date: DateTime<Utc>, present: bool) -> NewAttendance {
        NewAttendance {
            enrollment_id: enrollment.id,
            class_id: enrollment.class_id,
            client_id: enrollment.client_id,
            date,
            present,
        }
    }

    #[tokio::test]
    async fn test_record_sets_checked_in_at_only_when_present() {
        let (_pool, tracker, enrollment) = setup().await;
        let monday = Utc.with_ymd_and_hms(2025, 11, 24, 7, 0, 0).unwrap();
        let tuesday = Utc.with_ymd_and_hms(2025, 11, 25, 7, 0, 0).unwrap();

        let present = tracker.record(check_in(&enrollment, monday, true)).await.unwrap();
        assert!(present.present);
        assert!(present.checked_in_at.is_some());
        assert_eq!(present.date, monday);

        let absent = tracker.record(check_in(&enrollment, tuesday, false)).await.unwrap();
        assert!(!absent.present);
        assert!(absent.checked_in_at.is_none());
    }

    #[tokio::test]
    async fn test_record_twice_same_day_keeps_one_row() {
        let (_pool, tracker, enrollment) = setup().await;
        let morning = Utc.with_ymd_and_hms(2025, 11, 24, 7, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2025, 11, 24, 19, 0, 0).unwrap();

        let first = tracker.record(check_in(&enrollment, morning, false)).await.unwrap();
        let second = tracker.record(check_in(&enrollment, evening, true)).await.unwrap();

        assert_eq!(first.id, second.id);
        assert!(second.present);
        let rows = tracker.query(None, Some(enrollment.client_id), None).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_record_rejects_mismatch_and_unknown_enrollment() {
        let (_pool, tracker, enrollment) = setup().await;
        let date = Utc::now();

        let mut input = check_in(&enrollment, date, true);
        input.class_id = Uuid::new_v4();
        assert!(matches!(tracker.record(input).await, Err(Error::InvalidInput(_))));

        let mut input = check_in(&enrollment, date, true);
        input.enrollment_id = Uuid::new_v4();
        assert!(matches!(tracker.record(input).await, Err(Error::NotFound(_))));

        assert!(tracker.query(None, None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_presence_round_trip() {
        let (_pool, tracker, enrollment) = setup().await;
        let row = tracker
            .record(check_in(&enrollment, Utc::now(), false))
            .await
            .unwrap();

        let checked = tracker.set_presence(row.id, true).await.unwrap();
        assert!(checked.present);
        assert!(checked.checked_in_at.is_some());

        let unchecked = tracker.set_presence(row.id, false).await.unwrap();
        assert!(!unchecked.present);
        assert!(unchecked.checked_in_at.is_none());
        assert_eq!(tracker.get(row.id).await.unwrap(), unchecked);

        // Idempotent in the absent state
        let again = tracker.set_presence(row.id, false).await.unwrap();
        assert!(again.checked_in_at.is_none());

        assert!(matches!(
            tracker.set_presence(Uuid::new_v4(), true).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_set_presence_many_stops_at_unknown_id() {
        let (_pool, tracker, enrollment) = setup().await;
        let day_one = Utc.with_ymd_and_hms(2025, 11, 24, 7, 0, 0).unwrap();
        let day_two = Utc.with_ymd_and_hms(2025, 11, 25, 7, 0, 0).unwrap();
        let a = tracker.record(check_in(&enrollment, day_one, false)).await.unwrap();
        let b = tracker.record(check_in(&enrollment, day_two, false)).await.unwrap();

        let rows = tracker.set_presence_many(&[a.id, b.id], true).await.unwrap();
        assert!(rows.iter().all(|r| r.present));

        let err = tracker
            .set_presence_many(&[a.id, Uuid::new_v4(), b.id], false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(!tracker.get(a.id).await.unwrap().present);
        assert!(tracker.get(b.id).await.unwrap().present);
    }

    #[tokio::test]
    async fn test_query_matches_calendar_day() {
        let (pool, tracker, enrollment) = setup().await;
        let other_client = test_support::client(&pool, "joao@example.com").await;
        let other = enrollments::insert_if_seat_free(&pool, enrollment.class_id, other_client.id)
            .await
            .unwrap()
            .unwrap();

        let late_night = Utc.with_ymd_and_hms(2025, 11, 24, 23, 30, 0).unwrap();
        let next_day = Utc.with_ymd_and_hms(2025, 11, 25, 0, 15, 0).unwrap();
        tracker.record(check_in(&enrollment, late_night, true)).await.unwrap();
        tracker.record(check_in(&other, late_night, false)).await.unwrap();
        tracker.record(check_in(&enrollment, next_day, true)).await.unwrap();

        let nov_24 = NaiveDate::from_ymd_opt(2025, 11, 24);
        assert_eq!(tracker.query(None, None, nov_24).await.unwrap().len(), 2);
        assert_eq!(
            tracker
                .query(Some(enrollment.class_id), Some(enrollment.client_id), nov_24)
                .await
                .unwrap()
                .len(),
            1
        );
        assert_eq!(
            tracker.query(None, Some(enrollment.client_id), None).await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn test_unenroll_cascades_to_attendance() {
        let (pool, tracker, enrollment) = setup().await;
        let row = tracker.record(check_in(&enrollment, Utc::now(), true)).await.unwrap();

        enrollments::delete_enrollment(&pool, enrollment.id).await.unwrap();
        assert!(matches!(tracker.get(row.id).await, Err(Error::NotFound(_))));
    }
}
