//! # galton_core - Galton Box Simulation Engine
//!
//! A quincunx (bean counter) simulated one discrete tick at a time. Beans wait
//! in a queue, fall through a triangular peg board choosing left or right at
//! every peg, and pile up in slots at the bottom.
//!
//! ## Features
//! - Exact bean conservation across the waiting, in-flight and settled pools
//! - Luck beans (fair coin per peg) and skill beans (fixed per-bean level)
//! - Seeded, reproducible experiments
//! - Hard reset, replay (`repeat`) and half-split truncation
//!
//! ```rust
//! use galton_core::{Bean, BeanCounterLogic, BeanKind};
//!
//! let mut logic = BeanCounterLogic::new(5).unwrap();
//! logic.reset((0..3).map(|i| Bean::new(5, BeanKind::Luck, i).unwrap()));
//! while logic.advance_step().unwrap() {}
//! assert_eq!(logic.settled_total().unwrap(), 3);
//! ```

pub mod bean;
pub mod config;
pub mod error;
pub mod experiment;
pub mod logic;
pub mod stats;

pub use bean::{Bean, BeanKind, BeanMode, FallingBean, ParseBeanKindError};
pub use config::{ConfigError, ExperimentConfig};
pub use error::{BeanCounterError, ExperimentError, Result};
pub use experiment::{derive_bean_seed, make_beans, Experiment, ExperimentReport};
pub use logic::{BeanCounterLogic, BoardSnapshot};
pub use stats::SlotStatistics;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
