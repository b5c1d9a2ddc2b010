/*!
 * Core Module
 * Fundamental simulator types, ID allocation and error handling
 */

pub mod errors;
pub mod id;
pub mod types;

// Re-export for convenience
pub use errors::*;
pub use id::PidAllocator;
pub use types::*;
