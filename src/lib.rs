pub mod auth;
pub mod config;
pub mod crypto;
pub mod db;
pub mod handlers;
pub mod models;
pub mod payment;
pub mod policy;
pub mod purchase;
pub mod purchase_keys;
pub mod routes;
pub mod state;
pub mod utils;
