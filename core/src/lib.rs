//! Core library for the OttrCal wellness tracker: the progress state
//! machine (daily totals, XP/levels, streaks), snapshot persistence, and
//! the badge unlock watcher. No UI, no network — those live in the CLI.

pub mod badges;
pub mod models;
pub mod progress;
pub mod store;
pub mod streak;
