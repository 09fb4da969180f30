pub mod aggregate;
pub mod config;
pub mod distance;
pub mod enrich;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod plot;
pub mod report;
pub mod stations;
pub mod trip;
