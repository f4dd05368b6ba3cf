//! # Bean Counter Logic
//!
//! The Galton box state machine. Beans wait in a FIFO queue, fall one row per
//! tick while in flight, and pile up in slots at the bottom.
//!
//! ## Coordinate System
//!
//! Row `y` has `y + 1` pegs, `x = 0..=y`. The last row (`y = slots - 1`) sits
//! directly above the slots, so a bean there drops into slot `x`. For 4 slots:
//!
//! ```text
//!                      (0,0)
//!                (0,1)       (1,1)
//!          (0,2)       (1,2)       (2,2)
//!    (0,3)       (1,3)       (2,3)       (3,3)
//!   [slot 0]    [slot 1]    [slot 2]    [slot 3]
//! ```
//!
//! ## Pools
//! - `waiting`: queue of beans not yet dropped, front goes next
//! - `in_flight`: one cell per row, at most one bean each
//! - `settled`: one bin per slot, in arrival order
//!
//! Every bean is in exactly one pool. Only the half-split operations remove
//! beans from the machine.

mod render;


use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::bean::{Bean, FallingBean};
use crate::error::{BeanCounterError, Result};

/// Read-only view of the board, suitable for renderers and JSON export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub slot_count: usize,
    pub remaining: usize,
    /// x position of the in-flight bean for each row, top row first.
    pub in_flight: Vec<Option<usize>>,
    pub slot_counts: Vec<usize>,
    pub average_slot_index: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Half {
    Lower,
    Upper,
}

#[derive(Debug, Clone)]
struct Board<B> {
    waiting: VecDeque<B>,
    in_flight: Vec<Option<B>>,
    settled: Vec<Vec<B>>,
}

impl<B> Board<B> {
    fn empty(slots: usize) -> Self {
        Self {
            waiting: VecDeque::new(),
            in_flight: (0..slots).map(|_| None).collect(),
            settled: (0..slots).map(|_| Vec::new()).collect(),
        }
    }

    fn in_flight_count(&self) -> usize {
        self.in_flight.iter().filter(|cell| cell.is_some()).count()
    }

    fn settled_total(&self) -> usize {
        self.settled.iter().map(Vec::len).sum()
    }

    fn is_drained(&self) -> bool {
        self.waiting.is_empty() && self.in_flight.iter().all(Option::is_none)
    }

    /// Move the front of the queue onto the top peg. Row 0 must be free.
    fn drop_next(&mut self) {
        if let Some(bean) = self.waiting.pop_front() {
            debug_assert!(self.in_flight[0].is_none(), "row 0 occupied on refill");
            self.in_flight[0] = Some(bean);
        }
    }
}

/// Galton box with `slot_count` slots.
///
/// Freshly constructed machines are idle: every query and step returns
/// [`BeanCounterError::UseBeforeReset`] until [`reset`](Self::reset) is called.
#[derive(Debug, Clone)]
pub struct BeanCounterLogic<B: FallingBean = Bean> {
    slots: usize,
    board: Option<Board<B>>,
}

impl<B: FallingBean> BeanCounterLogic<B> {
    pub fn new(slot_count: usize) -> Result<Self> {
        if slot_count == 0 {
            return Err(BeanCounterError::InvalidConfiguration { slot_count });
        }
        Ok(Self { slots: slot_count, board: None })
    }

    /// Number of slots (and rows), fixed at construction.
    pub fn slot_count_total(&self) -> usize {
        self.slots
    }

    pub fn is_reset(&self) -> bool {
        self.board.is_some()
    }

    fn board(&self, operation: &'static str) -> Result<&Board<B>> {
        self.board.as_ref().ok_or(BeanCounterError::UseBeforeReset { operation })
    }

    fn board_mut(&mut self, operation: &'static str) -> Result<&mut Board<B>> {
        self.board.as_mut().ok_or(BeanCounterError::UseBeforeReset { operation })
    }

    // ========================
    // Lifecycle
    // ========================

    /// Hard reset: forget every bean currently in the machine, queue `beans`
    /// in order and drop the first one onto the top peg.
    pub fn reset<I>(&mut self, beans: I)
    where
        I: IntoIterator<Item = B>,
    {
        let mut board = Board::empty(self.slots);
        board.waiting = beans
            .into_iter()
            .map(|mut bean| {
                bean.reset();
                bean
            })
            .collect();
        let total = board.waiting.len();
        board.drop_next();

        debug!(slots = self.slots, beans = total, "machine reset");
        self.board = Some(board);
    }

    /// Soft reset: scoop every in-flight and settled bean back into the queue
    /// and start over with the same beans.
    ///
    /// Beans still waiting keep their place at the front. Scooped beans follow
    /// in ascending row order, then ascending slot order, each slot in arrival
    /// order.
    pub fn repeat(&mut self) -> Result<()> {
        let board = self.board_mut("repeat")?;

        let scooped: Vec<B> = board
            .in_flight
            .iter_mut()
            .filter_map(Option::take)
            .chain(board.settled.iter_mut().flat_map(std::mem::take))
            .collect();
        let scooped_count = scooped.len();

        for mut bean in scooped {
            bean.reset();
            board.waiting.push_back(bean);
        }
        board.drop_next();

        debug!(
            scooped = scooped_count,
            remaining = board.waiting.len(),
            "machine repeated"
        );
        Ok(())
    }

    /// Advance the machine one tick.
    ///
    /// Rows are processed bottom-up: the bean above the slots settles, every
    /// other in-flight bean picks a direction and drops one row, then the next
    /// waiting bean enters row 0. Returns `false` once nothing is left to move.
    pub fn advance_step(&mut self) -> Result<bool> {
        let last_row = self.slots - 1;
        let board = self.board_mut("advance_step")?;

        if board.is_drained() {
            return Ok(false);
        }

        for row in (0..=last_row).rev() {
            let Some(mut bean) = board.in_flight[row].take() else {
                continue;
            };

            if row == last_row {
                let x = bean.current_x();
                debug_assert!(x <= last_row, "bean landed outside the board at x={}", x);
                board.settled[x.min(last_row)].push(bean);
            } else {
                bean.advance_choice();
                board.in_flight[row + 1] = Some(bean);
            }
        }

        board.drop_next();

        trace!(
            remaining = board.waiting.len(),
            in_flight = board.in_flight_count(),
            settled = board.settled_total(),
            "tick"
        );
        if board.is_drained() {
            debug!(settled = board.settled_total(), "all beans settled");
        }
        Ok(true)
    }

    // ========================
    // Queries
    // ========================

    /// Beans still waiting to be dropped.
    pub fn remaining_count(&self) -> Result<usize> {
        Ok(self.board("remaining_count")?.waiting.len())
    }

    /// x position of the bean in flight at `row`, if any.
    pub fn in_flight_x(&self, row: usize) -> Result<Option<usize>> {
        let board = self.board("in_flight_x")?;
        Ok(board.in_flight.get(row).and_then(Option::as_ref).map(B::current_x))
    }

    pub fn in_flight_count(&self) -> Result<usize> {
        Ok(self.board("in_flight_count")?.in_flight_count())
    }

    /// Beans settled in slot `slot`; 0 for an empty or out-of-range slot.
    pub fn slot_bean_count(&self, slot: usize) -> Result<usize> {
        let board = self.board("slot_bean_count")?;
        Ok(board.settled.get(slot).map_or(0, Vec::len))
    }

    pub fn slot_counts(&self) -> Result<Vec<usize>> {
        Ok(self.board("slot_counts")?.settled.iter().map(Vec::len).collect())
    }

    pub fn settled_total(&self) -> Result<usize> {
        Ok(self.board("settled_total")?.settled_total())
    }

    /// Beans across all three pools.
    pub fn bean_count(&self) -> Result<usize> {
        let board = self.board("bean_count")?;
        Ok(board.waiting.len() + board.in_flight_count() + board.settled_total())
    }

    /// True once no bean is waiting or in flight.
    pub fn is_finished(&self) -> Result<bool> {
        Ok(self.board("is_finished")?.is_drained())
    }

    /// Mean slot index over all settled beans, or 0 when no bean has settled.
    pub fn average_slot_index(&self) -> Result<f64> {
        let board = self.board("average_slot_index")?;
        let total = board.settled_total();
        if total == 0 {
            return Ok(0.0);
        }
        let weighted: usize = board.settled.iter().enumerate().map(|(i, bin)| i * bin.len()).sum();
        Ok(weighted as f64 / total as f64)
    }

    pub fn snapshot(&self) -> Result<BoardSnapshot> {
        let board = self.board("snapshot")?;
        Ok(BoardSnapshot {
            slot_count: self.slots,
            remaining: board.waiting.len(),
            in_flight: board
                .in_flight
                .iter()
                .map(|cell| cell.as_ref().map(B::current_x))
                .collect(),
            slot_counts: board.settled.iter().map(Vec::len).collect(),
            average_slot_index: self.average_slot_index()?,
        })
    }

    // ========================
    // Truncation
    // ========================

    /// Keep the `ceil(N/2)` settled beans in the lowest slots and drop the rest.
    /// Returns the number of beans dropped.
    pub fn lower_half(&mut self) -> Result<usize> {
        self.keep_half(Half::Lower, "lower_half")
    }

    /// Keep the `ceil(N/2)` settled beans in the highest slots and drop the
    /// rest. Returns the number of beans dropped.
    pub fn upper_half(&mut self) -> Result<usize> {
        self.keep_half(Half::Upper, "upper_half")
    }

    /// Dropped beans leave the machine for good; `repeat` will not bring them
    /// back. Within a split slot the earliest arrivals go first.
    fn keep_half(&mut self, keep: Half, operation: &'static str) -> Result<usize> {
        let board = self.board_mut(operation)?;
        let total = board.settled_total();
        let keep_count = (total + 1) / 2;
        let discard = total - keep_count;

        // Discard from the far end of the board.
        let mut bins: Vec<&mut Vec<B>> = board.settled.iter_mut().collect();
        if keep == Half::Lower {
            bins.reverse();
        }

        let mut left = discard;
        for bin in bins {
            if left == 0 {
                break;
            }
            let take = left.min(bin.len());
            bin.drain(..take);
            left -= take;
        }

        info!(?keep, kept = keep_count, discarded = discard, "settled beans truncated");
        Ok(discard)
    }
}
