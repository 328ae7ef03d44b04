//! Coalesced redraw requests.
//!
//! Invalidations that arrive while a redraw is pending are OR-ed into the
//! pending flags instead of scheduling another one.

use std::ops::BitOr;
use std::time::Duration;

use crate::timer::{Scheduler, TimerId};

/// Default coalescing window (one frame at 60 Hz).
pub const DEFAULT_REDRAW_INTERVAL: Duration = Duration::from_micros(16_667);

/// Which surfaces of a session need repainting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedrawFlags {
    pub gutter: bool,
    pub editor: bool,
}

impl RedrawFlags {
    pub const NONE: Self = Self {
        gutter: false,
        editor: false,
    };
    pub const GUTTER: Self = Self {
        gutter: true,
        editor: false,
    };
    pub const ALL: Self = Self {
        gutter: true,
        editor: true,
    };

    pub fn is_empty(self) -> bool {
        !self.gutter && !self.editor
    }
}

impl BitOr for RedrawFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            gutter: self.gutter || rhs.gutter,
            editor: self.editor || rhs.editor,
        }
    }
}

/// Per-session redraw coalescer.
#[derive(Debug, Clone)]
pub struct RedrawCoalescer {
    pending: RedrawFlags,
    interval: Duration,
}

impl Default for RedrawCoalescer {
    fn default() -> Self {
        Self::new(DEFAULT_REDRAW_INTERVAL)
    }
}

impl RedrawCoalescer {
    pub fn new(interval: Duration) -> Self {
        Self {
            pending: RedrawFlags::NONE,
            interval,
        }
    }

    /// Merges `flags` into the pending set, arming the redraw timer if idle.
    pub fn request(&mut self, flags: RedrawFlags, scheduler: &mut impl Scheduler) {
        if flags.is_empty() {
            return;
        }
        self.pending = self.pending | flags;
        if !scheduler.is_pending(TimerId::Redraw) {
            scheduler.schedule(TimerId::Redraw, self.interval);
        }
    }

    /// Takes the merged flags when the redraw timer fires.
    pub fn fire(&mut self) -> RedrawFlags {
        std::mem::take(&mut self.pending)
    }

    /// Drops pending work and disarms the timer.
    pub fn cancel(&mut self, scheduler: &mut impl Scheduler) {
        self.pending = RedrawFlags::NONE;
        scheduler.cancel(TimerId::Redraw);
    }

    pub fn pending(&self) -> RedrawFlags {
        self.pending
    }
}
