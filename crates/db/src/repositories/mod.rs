//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod generation_queue_repo;
pub mod plan_repo;
pub mod user_repo;

pub use generation_queue_repo::GenerationQueueRepo;
pub use plan_repo::PlanRepo;
pub use user_repo::UserRepo;
