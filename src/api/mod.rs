//! Live backend over the UNSAPark REST API.

pub mod client;
pub mod models;

pub use client::ApiClient;
