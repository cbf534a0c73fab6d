pub mod providers;
pub mod recommendations;
pub mod tags;

pub use recommendations::RecommendationService;
