//! View-space damage tracking.
//!
//! egui repaints whole frames, so damage decides *whether* a frame is needed
//! and lets tests assert how much area an operation invalidated.

use egui::{Pos2, Rect};

/// Region of the text view that needs repainting.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Damage {
    #[default]
    None,
    /// Bounding box of every rect invalidated so far.
    Region(Rect),
    Full,
}

impl Damage {
    pub fn is_none(&self) -> bool {
        matches!(self, Damage::None)
    }

    /// Adds `rect`, growing the region to cover it.
    ///
    /// - `None` is the identity
    /// - `Full` absorbs everything
    /// - two regions merge to their bounding box
    pub fn invalidate(&mut self, rect: Rect) {
        if !rect.is_positive() {
            return;
        }
        *self = match *self {
            Damage::None => Damage::Region(rect),
            Damage::Region(current) => Damage::Region(current.union(rect)),
            Damage::Full => Damage::Full,
        };
    }

    pub fn invalidate_all(&mut self) {
        *self = Damage::Full;
    }

    /// True when painting inside `rect` is needed.
    pub fn intersects(&self, rect: Rect) -> bool {
        match self {
            Damage::None => false,
            Damage::Region(region) => region.intersects(rect),
            Damage::Full => true,
        }
    }

    /// The dirty rect to hand to painters (`Rect::EVERYTHING` for `Full`).
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Damage::None => None,
            Damage::Region(region) => Some(*region),
            Damage::Full => Some(Rect::EVERYTHING),
        }
    }

    /// Returns the accumulated damage and resets to `None`.
    pub fn take(&mut self) -> Damage {
        std::mem::take(self)
    }
}

/// Rounds `rect` outward to whole pixels.
pub fn integral(rect: Rect) -> Rect {
    Rect::from_min_max(
        Pos2::new(rect.min.x.floor(), rect.min.y.floor()),
        Pos2::new(rect.max.x.ceil(), rect.max.y.ceil()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Vec2;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Rect {
        Rect::from_min_size(Pos2::new(x, y), Vec2::new(w, h))
    }

    #[test]
    fn regions_merge_to_bounding_box() {
        let mut d = Damage::default();
        d.invalidate(rect(0.0, 0.0, 10.0, 10.0));
        d.invalidate(rect(20.0, 5.0, 10.0, 10.0));
        assert_eq!(d, Damage::Region(rect(0.0, 0.0, 30.0, 15.0)));
    }

    #[test]
    fn full_absorbs_regions() {
        let mut d = Damage::default();
        d.invalidate_all();
        d.invalidate(rect(0.0, 0.0, 1.0, 1.0));
        assert_eq!(d, Damage::Full);
        assert_eq!(d.bounds(), Some(Rect::EVERYTHING));
    }

    #[test]
    fn empty_rects_are_ignored() {
        let mut d = Damage::default();
        d.invalidate(Rect::NOTHING);
        d.invalidate(rect(5.0, 5.0, 0.0, 10.0));
        assert!(d.is_none());
    }

    #[test]
    fn take_resets() {
        let mut d = Damage::default();
        d.invalidate(rect(0.0, 0.0, 4.0, 4.0));
        assert!(d.intersects(rect(3.0, 3.0, 4.0, 4.0)));
        assert!(!d.take().is_none());
        assert!(d.is_none());
        assert!(!d.intersects(Rect::EVERYTHING));
    }

    #[test]
    fn integral_rounds_outward() {
        let r = integral(Rect::from_min_max(Pos2::new(1.4, 2.6), Pos2::new(10.2, 11.5)));
        assert_eq!(r, Rect::from_min_max(Pos2::new(1.0, 2.0), Pos2::new(11.0, 12.0)));
    }
}
