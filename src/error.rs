//! Error types for mask refinement operations

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Convenient result alias used throughout the crate
pub type Result<T> = std::result::Result<T, RefineError>;

/// Errors produced by the mask refinement pipeline
#[derive(Debug, Error)]
pub enum RefineError {
    /// Configuration parameter outside its documented range
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the invalid parameter
        message: String,
    },

    /// Pixel-level processing failure
    #[error("Processing error: {message}")]
    Processing {
        /// Description of the failure
        message: String,
    },

    /// File system operation failure with operation context
    #[error("Failed to {operation} '{path}': {source}")]
    FileIo {
        /// What was being attempted (e.g. "read mask file")
        operation: String,
        /// The path involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Image decode/encode failure from the image crate
    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    /// Mask and original image do not share dimensions.
    ///
    /// Detected as a precondition before any pixel mutation, never
    /// silently cropped or stretched.
    #[error(
        "Dimension mismatch: mask is {mask_width}x{mask_height} but original is \
         {original_width}x{original_height}"
    )]
    DimensionMismatch {
        /// Mask width in pixels
        mask_width: u32,
        /// Mask height in pixels
        mask_height: u32,
        /// Original image width in pixels
        original_width: u32,
        /// Original image height in pixels
        original_height: u32,
    },

    /// A named pipeline stage failed
    #[error("Stage '{stage}' failed: {message}")]
    Stage {
        /// Stage name (e.g. "composite")
        stage: &'static str,
        /// Description of the failure
        message: String,
    },
}

impl RefineError {
    /// Create an invalid-configuration error
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a processing error
    pub fn processing<S: Into<String>>(message: S) -> Self {
        Self::Processing {
            message: message.into(),
        }
    }

    /// Create a file I/O error with operation context
    pub fn file_io_error<P: AsRef<Path>>(
        operation: &str,
        path: P,
        source: std::io::Error,
    ) -> Self {
        Self::FileIo {
            operation: operation.to_string(),
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a dimension-mismatch error from the two image sizes
    pub fn dimension_mismatch(mask: (u32, u32), original: (u32, u32)) -> Self {
        Self::DimensionMismatch {
            mask_width: mask.0,
            mask_height: mask.1,
            original_width: original.0,
            original_height: original.1,
        }
    }

    /// Create a stage error
    pub fn stage_error<S: Into<String>>(stage: &'static str, message: S) -> Self {
        Self::Stage {
            stage,
            message: message.into(),
        }
    }

    /// Create a configuration error for a value outside its valid range
    pub fn config_value_error<V: std::fmt::Display>(
        parameter: &str,
        value: V,
        valid_range: &str,
    ) -> Self {
        Self::InvalidConfig {
            message: format!("{parameter} must be in {valid_range}, got {value}"),
        }
    }
}
