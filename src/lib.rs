//! Finds municipal open-data water datasets, scores them against weighted
//! quality criteria and records the best one for downstream use.
//!
//! The pipeline runs once per invocation: [`app::App::fetch`] queries each
//! portal's catalog, [`scoring::Scorer`] rates every record,
//! [`ranking::rank`] orders them and [`app::App::persist`] writes the
//! evaluation table and the top-pick config.

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod fs_util;
pub mod output;
pub mod portal;
pub mod ranking;
pub mod scoring;
