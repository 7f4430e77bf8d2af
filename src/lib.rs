//! Test plan server library.
//!
//! Folders of test cases, test suites built from step snapshots, test runs,
//! CSV import/export and dashboard aggregates behind an actix-web API.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
