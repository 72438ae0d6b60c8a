// src/watch/mod.rs

//! Poll-side change detection.
//!
//! This module is responsible for:
//! - Resolving a glob or explicit path list to the regular files it matches.
//! - Holding the tracked baseline (path -> registrations, modification time).
//! - Diffing a fresh enumeration against that baseline into ordered deliveries.
//!
//! It does **not** invoke callbacks; the engine turns deliveries into calls.

pub mod diff;
pub mod path_utils;
pub mod patterns;
pub mod tracked;

pub use diff::{plan_cycle, CurrentFiles, CyclePlan, Delivery};
pub use patterns::{PatternMatcher, PatternSource};
pub use tracked::{TrackedFile, TrackedFiles};
