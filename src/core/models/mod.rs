pub mod audit;
pub mod chat;
pub mod group;
pub mod transaction;
pub mod user;
