//! VANT - a sales lead pipeline
//!
//! This library provides the core functionality for VANT, including:
//! - Database operations and migrations
//! - Data models for leads and pipeline stages
//! - Repository layer for data access, including the stage move ledger
//! - The pipeline view model, its reducer and the optimistic move orchestrator
//! - Role-based navigation
//! - CLI command parsing and execution
//! - Date and week utilities
//!
//! # Example
//!
//! ```no_run
//! use vant::config::PipelineConfig;
//! use vant::db::DbConnection;
//! use vant::pipeline::{MoveOrchestrator, PipelineStore, SqliteBackend};
//!
//! let conn = DbConnection::connect_in_memory().unwrap();
//! let backend = SqliteBackend::new(&conn, PipelineConfig::default());
//! let orchestrator = MoveOrchestrator::new(&backend);
//! let mut store = PipelineStore::new();
//! orchestrator.load(&mut store).unwrap();
//! ```

pub mod cli;
pub mod config;
pub mod db;
pub mod models;
pub mod nav;
pub mod pipeline;
pub mod repo;
pub mod utils;
