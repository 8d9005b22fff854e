//! Prefetch scheduling: admission ledger, bounded concurrency, page-image
//! cascade, critical-resource seeding, idle pass and hover intent.

pub mod admission;
pub mod association;
pub mod idle;
pub mod intent;
pub mod ledger;
pub mod scheduler;
pub mod seed;

#[cfg(test)]
mod test_support;

pub use admission::{Admission, SchedulerState, SchedulerStats};
pub use association::{PageImageAssociation, TieredImages, image_tier};
pub use idle::{IdleSignal, QuietNetwork};
pub use intent::{HoverDecision, HoverRejection, IntentDetector, NavElement};
pub use ledger::{EntryState, PreloadLedger};
pub use scheduler::{PrefetchScheduler, SchedulerOptions};
pub use seed::{resolve_seed_key, seed_plan};
