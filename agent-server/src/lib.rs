pub mod api;
pub mod generator;
