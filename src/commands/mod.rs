pub mod clean;
pub mod enrich;
pub mod normalize;
pub mod pipeline;
