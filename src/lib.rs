pub mod access;
pub mod bidding;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod lot;
pub mod query;
pub mod registry;
pub mod store;
