//! Result type alias for mapping operations

use crate::error::MappingError;

/// Standard Result type for mapping operations
pub type Result<T> = std::result::Result<T, MappingError>;
