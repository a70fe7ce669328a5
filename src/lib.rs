//! Promotion Allocation Engine for CONRAISS grade and step structures
//!
//! This crate decides, per promotion cycle, which staff are eligible for
//! promotion, ranks them within their grade by a weighted combination of exam,
//! performance and seniority scores, allocates promotion, recognition and
//! reward slots, and places promoted staff on a step of the next grade. It
//! also runs the periodic one-step increment for staff below their grade's
//! maximum step.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod ports;
pub mod telemetry;
