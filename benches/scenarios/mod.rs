//! Real-world scenario benchmarks.
//!
//! Whole voices as the catalog builds them, a busy voice bank, and the
//! control-side scheduling path.

mod bank;
mod scheduler;
mod voices;

pub use bank::bench_bank;
pub use scheduler::bench_scheduler;
pub use voices::bench_voices;
