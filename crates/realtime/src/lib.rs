//! `tourledger-realtime` — simulated live KPI updates.
//!
//! A polling loop that nudges the current snapshot's net KPI by a small
//! random delta and broadcasts the successor snapshot to subscribers. The
//! randomness is injected behind the [`Jitter`] trait so the broadcast
//! mechanism itself (timer, listener isolation, copy-on-write) is fully
//! deterministic under test.

pub mod jitter;
pub mod simulator;

pub use jitter::{Jitter, RandomJitter, SeededJitter};
pub use simulator::{DEFAULT_INTERVAL, RealtimeSimulator, SubscriptionId};
