//! Result type alias for brosync
//!
//! This module provides a convenient Result type alias that uses
//! BrosyncError as the error type.

use super::errors::BrosyncError;

/// Result type alias for brosync operations
///
/// This is a convenience type alias that uses `BrosyncError` as the error
/// type. Use this throughout the codebase for fallible operations.
///
/// # Examples
///
/// ```
/// use brosync::domain::result::Result;
/// use brosync::domain::errors::BrosyncError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(BrosyncError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, BrosyncError>;
