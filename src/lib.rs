// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Larder: Local AI Household Inventory Tracker
//!
//! Tracks a small pantry inventory from photos using local AI models.
//! Recognition and consumption forecasting run against an Ollama engine;
//! the inventory itself lives in memory for the session and is served
//! through a web UI.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod inventory;
pub mod ollama;
pub mod recognize;
pub mod web;

pub use config::AppConfig;
pub use error::{LarderError, Result};
