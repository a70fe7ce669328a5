//! Configuration loading and management for the Promotion Allocation Engine.
//!
//! This module loads a salary scale configuration from YAML files: scale
//! metadata, grade step bounds, dated salary schedules and per-cycle vacancy
//! counts. Everything is validated at load time.
//!
//! # Example
//!
//! ```no_run
//! use promotion_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/conraiss").unwrap();
//! println!("Loaded scale: {}", config.scale().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    GradeBoundsConfig, GradeRange, SalaryScheduleConfig, ScaleConfig, ScaleMetadata,
    VacancyEntry, VacancyFileConfig,
};
