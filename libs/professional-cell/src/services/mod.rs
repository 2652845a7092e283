pub mod availability;
pub mod directory;

pub use availability::{rank_candidates, AvailabilityResolver, InMemoryAvailabilityResolver};
pub use directory::SupabaseAvailabilityResolver;
