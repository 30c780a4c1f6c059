//! Tick observer that prints the grid.

use std::io::Write;

use tileworld_core::TickObserver;
use tileworld_types::OperationOutcome;
use tileworld_world::{WorldState, render_grid};
use tracing::warn;

/// Prints the rendered grid every `every_n_ticks` ticks.
#[derive(Debug)]
pub struct GridPrinter<W> {
    out: W,
    every_n_ticks: u64,
}

impl<W: Write + Send> GridPrinter<W> {
    /// Print to `out`. A stride of 0 is treated as 1.
    pub fn new(out: W, every_n_ticks: u64) -> Self {
        Self {
            out,
            every_n_ticks: every_n_ticks.max(1),
        }
    }

    fn due(&self, tick: u64) -> bool {
        tick.checked_rem(self.every_n_ticks) == Some(0)
    }
}

impl<W: Write + Send> TickObserver for GridPrinter<W> {
    fn on_tick(&mut self, tick: u64, world: &WorldState, _outcomes: &[OperationOutcome]) {
        if !self.due(tick) {
            return;
        }
        let grid = render_grid(world);
        if let Err(err) = writeln!(self.out, "{grid}\n").and_then(|()| self.out.flush()) {
            warn!(tick, error = %err, "failed to print grid");
        }
    }
}
