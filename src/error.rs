// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for Larder

use thiserror::Error;

/// Result type alias for Larder operations
pub type Result<T> = std::result::Result<T, LarderError>;

/// Larder error types
#[derive(Error, Debug)]
pub enum LarderError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("AI engine not available: {0}")]
    EngineUnavailable(String),

    #[error("No catalog items recognized in the image")]
    NoItemsRecognized,

    #[error("Unknown catalog item: {0}")]
    UnknownItem(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
