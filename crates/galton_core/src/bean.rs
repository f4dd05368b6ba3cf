//! # Bean
//!
//! A single unit falling through the peg board. A bean only knows its
//! horizontal offset inside the current row and how it decides between
//! left and right at each peg.
//!
//! ## Modes
//! - **Luck**: an unbiased coin flip at every peg. Replays differ because the
//!   random stream keeps advancing across resets.
//! - **Skill**: a skill level drawn once at construction. The bean steps right
//!   while its offset is below that level, so every replay lands it in the
//!   same slot.

use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{BeanCounterError, Result};

/// The capability the machine needs from anything it drops.
///
/// After `n` calls to `advance_choice` since the last `reset`, `current_x`
/// must lie in `0..=n`.
pub trait FallingBean {
    /// Return to the top of the board (`x = 0`). Decision state that is fixed
    /// at creation, such as a skill level, survives.
    fn reset(&mut self);

    /// Horizontal offset within the current row.
    fn current_x(&self) -> usize;

    /// Consult the decision policy once and step right if it says so.
    fn advance_choice(&mut self);
}

/// Serializable selector for the bean decision policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BeanKind {
    #[default]
    Luck,
    Skill,
}

impl BeanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BeanKind::Luck => "luck",
            BeanKind::Skill => "skill",
        }
    }
}

impl fmt::Display for BeanKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown bean mode '{0}' (expected 'luck' or 'skill')")]
pub struct ParseBeanKindError(pub String);

impl FromStr for BeanKind {
    type Err = ParseBeanKindError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "luck" => Ok(BeanKind::Luck),
            "skill" => Ok(BeanKind::Skill),
            _ => Err(ParseBeanKindError(s.to_string())),
        }
    }
}

/// Decision policy, fixed for the lifetime of a bean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeanMode {
    Luck,
    /// Step right while `x < threshold`.
    Skill { threshold: usize },
}

impl BeanMode {
    pub fn kind(&self) -> BeanKind {
        match self {
            BeanMode::Luck => BeanKind::Luck,
            BeanMode::Skill { .. } => BeanKind::Skill,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Bean {
    x_pos: usize,
    width: usize,
    mode: BeanMode,
    rng: ChaCha8Rng,
}

impl Bean {
    /// Create a bean bounded by `width` slots.
    ///
    /// In skill mode the skill level is drawn here, from the same seeded
    /// stream, and never changes afterwards.
    pub fn new(width: usize, kind: BeanKind, seed: u64) -> Result<Self> {
        if width == 0 {
            return Err(BeanCounterError::InvalidConfiguration { slot_count: width });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mode = match kind {
            BeanKind::Luck => BeanMode::Luck,
            BeanKind::Skill => BeanMode::Skill { threshold: draw_skill_level(width, &mut rng) },
        };

        Ok(Self { x_pos: 0, width, mode, rng })
    }

    pub fn luck(width: usize, seed: u64) -> Result<Self> {
        Self::new(width, BeanKind::Luck, seed)
    }

    pub fn skill(width: usize, seed: u64) -> Result<Self> {
        Self::new(width, BeanKind::Skill, seed)
    }

    /// Skill bean with an explicit level, clamped into `0..width`.
    pub fn with_threshold(width: usize, threshold: usize) -> Result<Self> {
        if width == 0 {
            return Err(BeanCounterError::InvalidConfiguration { slot_count: width });
        }
        Ok(Self {
            x_pos: 0,
            width,
            mode: BeanMode::Skill { threshold: threshold.min(width - 1) },
            rng: ChaCha8Rng::seed_from_u64(0),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn mode(&self) -> BeanMode {
        self.mode
    }

    /// Skill level, or `None` for a luck bean.
    pub fn threshold(&self) -> Option<usize> {
        match self.mode {
            BeanMode::Luck => None,
            BeanMode::Skill { threshold } => Some(threshold),
        }
    }

    fn wants_right(&mut self) -> bool {
        match self.mode {
            BeanMode::Luck => self.rng.gen_bool(0.5),
            BeanMode::Skill { threshold } => self.x_pos < threshold,
        }
    }
}

impl FallingBean for Bean {
    fn reset(&mut self) {
        self.x_pos = 0;
    }

    fn current_x(&self) -> usize {
        self.x_pos
    }

    fn advance_choice(&mut self) {
        if self.wants_right() && self.x_pos + 1 < self.width {
            self.x_pos += 1;
        }
    }
}

/// Skill level ~ N((w-1)/2, sqrt(w/4)), rounded and clamped to a real slot.
fn draw_skill_level(width: usize, rng: &mut ChaCha8Rng) -> usize {
    let mean = (width - 1) as f64 * 0.5;
    let std_dev = (width as f64 * 0.25).sqrt();
    let z: f64 = StandardNormal.sample(rng);
    let level = (z * std_dev + mean).round();
    level.clamp(0.0, (width - 1) as f64) as usize
}
