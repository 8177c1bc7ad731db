//! Core services over the stores
//!
//! Each service owns the writes to its entity and is constructed with the
//! injected pool; the Enrollment Engine and Class Registry also share one
//! `ClassLocks` table.

pub mod attendance_tracker;
pub mod class_locks;
pub mod class_registry;
pub mod enrollment_engine;
pub mod occupancy_reporter;

pub use attendance_tracker::{AttendanceTracker, NewAttendance};
pub use class_locks::ClassLocks;
pub use class_registry::ClassRegistry;
pub use enrollment_engine::EnrollmentEngine;
pub use occupancy_reporter::{DashboardStats, OccupancyReporter, TopClass, DEFAULT_TOP_CLASSES};
