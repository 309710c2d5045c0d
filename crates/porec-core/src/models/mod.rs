//! Data models for orders, catalog snapshots, and configuration.

pub mod catalog;
pub mod config;
pub mod order;
