pub mod advisor;
pub mod analytics;
pub mod balance;
pub mod chat;
pub mod constants;
pub mod errors;
pub mod models;
pub mod query;
pub mod services;
pub mod session;
pub mod split;
