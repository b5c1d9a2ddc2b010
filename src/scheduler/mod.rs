/*!
 * Scheduler Module
 * Run context, placement interface, lifecycle events, and the tick driver
 */

pub mod context;
pub mod driver;
pub mod events;
pub mod policy;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use context::RunContext;
pub use driver::Scheduler;
pub use events::{EventBus, EventKind, EventListener, SchedulerEvent, SubscriptionId};
pub use policy::FifoPolicy;
pub use traits::PlacementPolicy;
pub use types::{Placement, RunState, RunSummary, TickReport};
