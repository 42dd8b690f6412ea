pub mod analyze;
pub mod datasets;
pub mod query;
pub mod status;
