//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Statements that must run inside
//! a timeline-commit transaction take `&mut PgConnection` instead.

pub mod category_repo;
pub mod character_repo;
pub mod episode_repo;
pub mod performance_repo;
pub mod status_repo;

pub use category_repo::CategoryRepo;
pub use character_repo::CharacterRepo;
pub use episode_repo::EpisodeRepo;
pub use performance_repo::PerformanceRepo;
pub use status_repo::StatusRepo;
