//! Bookstore catalog service: books grouped by category behind a JSON API,
//! with query results cached in Redis or in memory.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
