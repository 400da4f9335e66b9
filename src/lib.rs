pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod execution;
pub mod judge;
pub mod routes;
pub mod state;
