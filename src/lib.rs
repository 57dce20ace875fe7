//! Ads dashboard: campaign tree, AI recommendations and account connection,
//! backed by workflow webhooks or an in-memory demo dataset.

pub mod app;
pub mod backend;
pub mod config;
pub mod demo;
pub mod error;
pub mod event;
pub mod format;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod store;
pub mod theme;
pub mod ui;
