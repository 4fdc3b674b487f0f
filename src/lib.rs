//! PM2.5 prediction service: regression model output classified into air
//! quality tiers with advice for heart patients, recorded in a SQLite audit log.

pub mod config;
pub mod constants;
pub mod error;
pub mod formatters;
pub mod model;
pub mod models;
pub mod pipeline;
pub mod risk;
pub mod service;
pub mod store;
pub mod web;
