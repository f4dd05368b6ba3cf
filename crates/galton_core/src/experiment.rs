//! # Experiment Driver
//!
//! Builds the beans for an [`ExperimentConfig`], runs the machine until it
//! stops and summarizes the result. Only the public machine contract is used.
//!
//! ## Seeding
//! One master seed per experiment. Bean `i` gets its own stream seeded from
//! `master ^ (i * 0x9e3779b97f4a7c15)`, so the same master seed rebuilds the
//! exact same set of beans.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bean::{Bean, BeanKind};
use crate::config::ExperimentConfig;
use crate::error::{ExperimentError, Result};
use crate::logic::BeanCounterLogic;
use crate::stats::SlotStatistics;

const SEED_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

/// Per-bean seed derived from the experiment's master seed.
pub fn derive_bean_seed(master_seed: u64, index: u64) -> u64 {
    master_seed ^ index.wrapping_mul(SEED_MIX)
}

/// Create `config.bean_count` beans for a `config.slot_count` board.
pub fn make_beans(config: &ExperimentConfig, master_seed: u64) -> Result<Vec<Bean>> {
    (0..config.bean_count as u64)
        .map(|i| Bean::new(config.slot_count, config.mode, derive_bean_seed(master_seed, i)))
        .collect()
}

/// Outcome of one run of the machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentReport {
    pub slot_count: usize,
    pub bean_count: usize,
    pub mode: BeanKind,
    pub seed: u64,
    /// 0 for the first run, incremented by every `repeat`.
    pub run: usize,
    pub ticks: usize,
    pub slot_counts: Vec<usize>,
    pub statistics: SlotStatistics,
}

pub struct Experiment {
    config: ExperimentConfig,
    seed: u64,
    logic: BeanCounterLogic<Bean>,
    run: usize,
    ticks: usize,
}

impl Experiment {
    /// Validate `config`, build its beans and reset a fresh machine with them.
    pub fn new(config: ExperimentConfig) -> std::result::Result<Self, ExperimentError> {
        config.validate()?;

        let seed = match config.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::random::<u64>();
                info!(seed, "no seed configured; pass it back to replay this experiment");
                seed
            }
        };

        let mut logic = BeanCounterLogic::new(config.slot_count)?;
        logic.reset(make_beans(&config, seed)?);
        debug!(
            slots = config.slot_count,
            beans = config.bean_count,
            mode = %config.mode,
            seed,
            "experiment ready"
        );

        Ok(Self { config, seed, logic, run: 0, ticks: 0 })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// The master seed in effect, configured or drawn.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn logic(&self) -> &BeanCounterLogic<Bean> {
        &self.logic
    }

    pub fn logic_mut(&mut self) -> &mut BeanCounterLogic<Bean> {
        &mut self.logic
    }

    pub fn run_index(&self) -> usize {
        self.run
    }

    /// Tick until the machine stops, handing the board to `observer` after
    /// every productive tick. Returns the number of productive ticks.
    pub fn run<F>(&mut self, mut observer: F) -> Result<usize>
    where
        F: FnMut(&BeanCounterLogic<Bean>),
    {
        let mut ticks = 0;
        while self.logic.advance_step()? {
            ticks += 1;
            observer(&self.logic);
        }
        self.ticks += ticks;
        debug!(run = self.run, ticks, "run finished");
        Ok(ticks)
    }

    pub fn run_to_completion(&mut self) -> Result<usize> {
        self.run(|_| {})
    }

    /// Scoop every bean back up and start the next run.
    pub fn repeat(&mut self) -> Result<()> {
        self.logic.repeat()?;
        self.run += 1;
        self.ticks = 0;
        Ok(())
    }

    pub fn report(&self) -> Result<ExperimentReport> {
        let slot_counts = self.logic.slot_counts()?;
        Ok(ExperimentReport {
            slot_count: self.config.slot_count,
            bean_count: self.config.bean_count,
            mode: self.config.mode,
            seed: self.seed,
            run: self.run,
            ticks: self.ticks,
            statistics: SlotStatistics::from_counts(&slot_counts),
            slot_counts,
        })
    }
}
