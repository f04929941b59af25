//! Brand Server Library
//!
//! Brand records (name + free-text details) stored in MongoDB, with details
//! importable from uploaded PDFs through `pdftotext`.
//! The server binary is in main.rs.
//!
//! # Modules
//!
//! - `db`: `BrandStore` trait with MongoDB and in-memory implementations
//! - `extract`: `TextExtractor` trait and the pdftotext backend
//! - `routes`: axum handlers and router construction

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;
