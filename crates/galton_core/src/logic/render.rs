//! Text dump of the board for debugging.
//!
//! Each peg prints as `1` when the in-flight bean of its row sits on it and
//! `0` otherwise. The slot counts follow on the last line.

use std::fmt::Write;

use super::BeanCounterLogic;
use crate::bean::FallingBean;
use crate::error::Result;

/// Columns per peg and per slot count.
const CELL_WIDTH: usize = 4;

/// Width of the first cell in `row`, which carries the triangle's indent.
fn row_indent(slots: usize, row: usize) -> usize {
    let root = (slots - 1) * CELL_WIDTH / 2 + CELL_WIDTH;
    root - CELL_WIDTH / 2 * row
}

impl<B: FallingBean> BeanCounterLogic<B> {
    /// Slot counts, each right-aligned in a 4-column cell.
    pub fn slot_string(&self) -> Result<String> {
        let mut out = String::new();
        for count in self.slot_counts()? {
            let _ = write!(out, "{:>width$}", count, width = CELL_WIDTH);
        }
        Ok(out)
    }

    /// The peg triangle followed by the slot line.
    pub fn render(&self) -> Result<String> {
        let mut out = String::new();
        for row in 0..self.slots {
            let bean_x = self.in_flight_x(row)?;
            for x in 0..=row {
                let width = if x == 0 { row_indent(self.slots, row) } else { CELL_WIDTH };
                let mark = u8::from(bean_x == Some(x));
                let _ = write!(out, "{:>width$}", mark, width = width);
            }
            out.push('\n');
        }
        out.push_str(&self.slot_string()?);
        Ok(out)
    }
}
