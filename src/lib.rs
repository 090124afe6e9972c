pub mod cli;
pub mod client;
pub mod config;
pub mod database;
pub mod filters;
pub mod models;
pub mod rest;
pub mod utils;

pub use client::TaskManager;
pub use config::Config;
pub use database::Database;
pub use filters::Filter;
pub use models::Task;
pub use utils::Profile;
