/// A "call me again until I say stop" primitive, e.g. a frame clock.
///
/// `tick` returns `true` once the simulation has converged. A driver returns `true` when it saw
/// that signal, and `false` when it yielded early and expects to be run again.
pub trait Driver {
    fn run(&mut self, tick: &mut dyn FnMut() -> bool) -> bool;
}

/// Spins until convergence.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blocking;

impl Driver for Blocking {
    fn run(&mut self, tick: &mut dyn FnMut() -> bool) -> bool {
        while !tick() {}
        true
    }
}

/// Performs at most `ticks_per_run` ticks per invocation, leaving room to render in between.
#[derive(Debug, Clone, Copy)]
pub struct FrameBudget {
    ticks_per_run: usize,
}

impl FrameBudget {
    pub fn new(ticks_per_run: usize) -> Self {
        Self {
            ticks_per_run: ticks_per_run.max(1),
        }
    }

    pub fn ticks_per_run(&self) -> usize {
        self.ticks_per_run
    }
}

impl Default for FrameBudget {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Driver for FrameBudget {
    fn run(&mut self, tick: &mut dyn FnMut() -> bool) -> bool {
        for _ in 0..self.ticks_per_run {
            if tick() {
                return true;
            }
        }
        false
    }
}
