pub mod experiences;
pub mod postgres;

pub use experiences::{retain_matching, ExperienceStore, PgExperienceStore};
pub use postgres::create_pool;
