pub mod agent;
pub mod config;
pub mod errors;
pub mod history;
pub mod managers;
pub mod models;
pub mod providers;
pub mod registry;
pub mod remote;
pub mod skills;
