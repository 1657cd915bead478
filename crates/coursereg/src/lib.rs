pub mod audit;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod query;
pub mod schedule;
pub mod search;
pub mod seed;
pub mod server;
pub mod types;
