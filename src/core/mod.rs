pub mod alerts;
pub mod config;
pub mod coordinator;
pub mod fetch;
pub mod model;
pub mod session;
