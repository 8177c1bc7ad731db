//! Occupancy Reporter
//!
//! Read-only aggregates over classes, enrollments and clients, recomputed on
//! every call.

use serde::Serialize;
use sqlx::SqlitePool;
use studio_common::Result;
use uuid::Uuid;

use crate::db::classes::{self, ClassOccupancy};
use crate::db::clients;

pub const DEFAULT_TOP_CLASSES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub active_clients: i64,
    pub total_clients: i64,
    pub weekly_classes: i64,
    /// Whole percent of total seats taken
    pub occupancy_rate: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopClass {
    pub class_id: Uuid,
    /// Modality name of the class
    pub name: String,
    pub enrolled: i64,
    pub capacity: i64,
}

#[derive(Clone)]
pub struct OccupancyReporter {
    db: SqlitePool,
}

impl OccupancyReporter {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        let (active_clients, total_clients) = clients::count_clients(&self.db).await?;
        let classes = classes::list_class_occupancy(&self.db).await?;

        let enrolled: i64 = classes.iter().map(|c| c.enrolled).sum();
        let capacity: i64 = classes.iter().map(|c| c.class.capacity).sum();

        Ok(DashboardStats {
            active_clients,
            total_clients,
            weekly_classes: classes.len() as i64,
            occupancy_rate: occupancy_rate(enrolled, capacity),
        })
    }

    /// The `limit` fullest classes by enrollment count
    pub async fn top_classes(&self, limit: usize) -> Result<Vec<TopClass>> {
        let classes = classes::list_class_occupancy(&self.db).await?;
        Ok(rank_classes(classes, limit))
    }
}

fn occupancy_rate(enrolled: i64, capacity: i64) -> i64 {
    if capacity <= 0 {
        return 0;
    }
    (100.0 * enrolled as f64 / capacity as f64).round() as i64
}

/// Enrolled count descending; ties keep registry order
fn rank_classes(mut classes: Vec<ClassOccupancy>, limit: usize) -> Vec<TopClass> {
    classes.sort_by(|a, b| b.enrolled.cmp(&a.enrolled));
    classes
        .into_iter()
        .take(limit)
        .map(|c| TopClass {
            class_id: c.class.id,
            name: c.modality_name,
            enrolled: c.enrolled,
            capacity: c.class.capacity,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{enrollments, test_support};
    use studio_common::db::Class;
    use studio_common::time::now;

    fn occupancy(name: &str, enrolled: i64, capacity: i64) -> ClassOccupancy {
        ClassOccupancy {
            class: Class {
                id: Uuid::new_v4(),
                modality_id: Uuid::new_v4(),
                instructor_id: Uuid::new_v4(),
                day_of_week: 1,
                time: "07:00".to_string(),
                capacity,
                created_at: now(),
            },
            modality_name: name.to_string(),
            enrolled,
        }
    }

    #[test]
    fn test_rank_classes_top_three() {
        let classes = vec![
            occupancy("Cycling", 28, 30),
            occupancy("Yoga", 22, 25),
            occupancy("Pilates", 18, 20),
            occupancy("Boxing", 15, 18),
            occupancy("HIIT", 24, 30),
        ];

        let top: Vec<(String, i64)> = rank_classes(classes, 3)
            .into_iter()
            .map(|t| (t.name, t.enrolled))
            .collect();
        assert_eq!(
            top,
            vec![
                ("Cycling".to_string(), 28),
                ("HIIT".to_string(), 24),
                ("Yoga".to_string(), 22),
            ]
        );
    }

    #[test]
    fn test_rank_classes_ties_keep_input_order() {
        let classes = vec![
            occupancy("First", 5, 10),
            occupancy("Second", 5, 10),
            occupancy("Third", 7, 10),
        ];
        let names: Vec<String> = rank_classes(classes, 10).into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Third", "First", "Second"]);
    }

    #[test]
    fn test_occupancy_rate_rounding() {
        assert_eq!(occupancy_rate(0, 0), 0);
        assert_eq!(occupancy_rate(1, 3), 33);
        assert_eq!(occupancy_rate(2, 3), 67);
        assert_eq!(occupancy_rate(10, 10), 100);
    }

    #[tokio::test]
    async fn test_dashboard_stats_empty_studio() {
        let pool = test_support::pool().await;
        let stats = OccupancyReporter::new(pool).dashboard_stats().await.unwrap();
        assert_eq!(
            stats,
            DashboardStats {
                active_clients: 0,
                total_clients: 0,
                weekly_classes: 0,
                occupancy_rate: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_dashboard_stats_counts_seats() {
        let pool = test_support::pool().await;
        let yoga = test_support::class(&pool, "Yoga", 4).await;
        test_support::class(&pool, "HIIT", 4).await;
        let maria = test_support::client(&pool, "maria@example.com").await;
        let joao = test_support::client(&pool, "joao@example.com").await;
        enrollments::insert_if_seat_free(&pool, yoga.id, maria.id).await.unwrap();
        enrollments::insert_if_seat_free(&pool, yoga.id, joao.id).await.unwrap();

        let reporter = OccupancyReporter::new(pool);
        let stats = reporter.dashboard_stats().await.unwrap();
        assert_eq!(stats.total_clients, 2);
        assert_eq!(stats.active_clients, 2);
        assert_eq!(stats.weekly_classes, 2);
        assert_eq!(stats.occupancy_rate, 25);

        let top = reporter.top_classes(DEFAULT_TOP_CLASSES).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].class_id, yoga.id);
        assert_eq!(top[0].enrolled, 2);
        assert_eq!(top[1].enrolled, 0);
    }
}
