/*!
 * Process Module
 * Process lifecycle, metrics, and completion notification
 */

pub mod listeners;
pub mod process;
pub mod types;

// Re-export for convenience
pub use listeners::{CompletionFn, CompletionListeners, ListenerId};
pub use process::{Process, ProcessResult};
pub use types::ProcessStats;
