pub mod actions;
pub mod agent;
pub mod analysis;
pub mod audit;
pub mod decision;
pub mod error;
pub mod executor;
pub mod llm;
pub mod observer;
pub mod rules;
pub mod tickets;
