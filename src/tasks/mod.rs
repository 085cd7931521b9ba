//! Background Tasks Module
//!
//! Contains the background task each cache runs for its whole lifetime.
//!
//! # Tasks
//! - Reclaimer: shrinks the cache on demand and sweeps expired entries at
//!   the configured interval

mod reclaimer;

pub(crate) use reclaimer::{spawn_reclaimer, ReclaimerHandle};
