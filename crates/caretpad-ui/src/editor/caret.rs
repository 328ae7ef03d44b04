//! Custom caret: blink state machine, scaled geometry and minimal invalidation.
//!
//! The caret is visible only while the view is focused and the selection is
//! empty. Blinking is a re-armed [`TimerId::CaretBlink`] deadline; every
//! state change invalidates just the caret's rect (inflated by
//! [`INVALIDATION_MARGIN`]) instead of the whole view.

use caretpad_core::{LineIndexCache, Scheduler, TextBuffer, TimerId};
use egui::{Pos2, Rect, Vec2};

use super::damage::{integral, Damage};
use super::layout::TextLayout;
use super::theme::CaretStyle;

/// Extra pixels invalidated around the caret so anti-aliased edges are erased.
pub const INVALIDATION_MARGIN: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaretState {
    #[default]
    Unfocused,
    FocusedVisible,
    FocusedHidden,
}

/// A caret fill to draw, in view coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaretPaint {
    pub rect: Rect,
    pub color: egui::Color32,
    /// Always `false`: the caret is a crisp pixel-aligned block.
    pub antialias: bool,
}

#[derive(Debug, Clone)]
pub struct CaretController {
    style: CaretStyle,
    state: CaretState,
    /// Last rect handed out by `update_geometry`; only used for invalidation.
    drawn: Option<Rect>,
}

impl CaretController {
    pub fn new(style: CaretStyle) -> Self {
        Self {
            style,
            state: CaretState::Unfocused,
            drawn: None,
        }
    }

    pub fn state(&self) -> CaretState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state == CaretState::FocusedVisible
    }

    pub fn drawn_rect(&self) -> Option<Rect> {
        self.drawn
    }

    pub fn focus_gained(
        &mut self,
        selection_len: usize,
        timers: &mut impl Scheduler,
        damage: &mut Damage,
    ) {
        if selection_len > 0 {
            self.suppress(timers, damage);
        } else {
            self.restart(timers, damage);
        }
    }

    pub fn focus_lost(&mut self, timers: &mut impl Scheduler, damage: &mut Damage) {
        self.suppress(timers, damage);
    }

    /// Restarts the blink phase, or hides the caret if a range is selected.
    pub fn selection_changed(
        &mut self,
        focused: bool,
        selection_len: usize,
        timers: &mut impl Scheduler,
        damage: &mut Damage,
    ) {
        if focused && selection_len == 0 {
            self.restart(timers, damage);
        } else {
            self.suppress(timers, damage);
        }
    }

    /// Handles a fired blink timer.
    pub fn blink_tick(
        &mut self,
        focused: bool,
        selection_len: usize,
        timers: &mut impl Scheduler,
        damage: &mut Damage,
    ) {
        if self.state == CaretState::Unfocused || !focused || selection_len > 0 {
            self.suppress(timers, damage);
            return;
        }
        self.state = match self.state {
            CaretState::FocusedVisible => CaretState::FocusedHidden,
            _ => CaretState::FocusedVisible,
        };
        self.invalidate_drawn(damage);
        timers.schedule(TimerId::CaretBlink, self.style.blink_interval);
    }

    /// Recomputes the caret rect from the host's default caret rect and the
    /// line fragment it sits in (both in view coordinates).
    ///
    /// When the rect moved, the old one is invalidated together with the new.
    pub fn update_geometry(
        &mut self,
        default_rect: Rect,
        line_fragment: Option<Rect>,
        damage: &mut Damage,
    ) -> Rect {
        let next = scaled_caret_rect(
            default_rect,
            line_fragment,
            self.style.width_scale,
            self.style.height_scale,
        );
        if self.drawn != Some(next) {
            let mut dirty = next.expand(INVALIDATION_MARGIN);
            if let Some(prev) = self.drawn {
                dirty = dirty.union(prev.expand(INVALIDATION_MARGIN));
            }
            damage.invalidate(dirty);
            self.drawn = Some(next);
        }
        next
    }

    /// The caret fill for this frame, if any part of it is dirty and shown.
    pub fn paint(&self, dirty: Rect, focused: bool, selection_len: usize) -> Option<CaretPaint> {
        if !focused || selection_len > 0 || self.state != CaretState::FocusedVisible {
            return None;
        }
        let rect = self.drawn?;
        rect.intersects(dirty).then_some(CaretPaint {
            rect,
            color: self.style.color,
            antialias: false,
        })
    }

    fn restart(&mut self, timers: &mut impl Scheduler, damage: &mut Damage) {
        self.state = CaretState::FocusedVisible;
        timers.schedule(TimerId::CaretBlink, self.style.blink_interval);
        self.invalidate_drawn(damage);
    }

    /// Hides the caret and stops blinking. Repeating it changes nothing.
    fn suppress(&mut self, timers: &mut impl Scheduler, damage: &mut Damage) {
        timers.cancel(TimerId::CaretBlink);
        if self.state != CaretState::Unfocused {
            self.state = CaretState::Unfocused;
            self.invalidate_drawn(damage);
            self.drawn = None;
        }
    }

    fn invalidate_drawn(&self, damage: &mut Damage) {
        if let Some(rect) = self.drawn {
            damage.invalidate(rect.expand(INVALIDATION_MARGIN));
        }
    }
}

/// Scales `default_rect` around its center, clips it to the line fragment and
/// rounds outward to whole pixels. Scales below 1 are treated as 1.
pub fn scaled_caret_rect(
    default_rect: Rect,
    line_fragment: Option<Rect>,
    width_scale: f32,
    height_scale: f32,
) -> Rect {
    let size = Vec2::new(
        default_rect.width() * width_scale.max(1.0),
        default_rect.height() * height_scale.max(1.0),
    );
    let mut rect = Rect::from_center_size(default_rect.center(), size);
    if let Some(fragment) = line_fragment {
        rect = rect.intersect(fragment);
    }
    integral(rect)
}

/// Fragment the insertion point at `offset` sits in, in view coordinates.
///
/// Inside the text that is the glyph's own fragment. At the end it is the
/// extra fragment after a trailing newline, else the last glyph's fragment.
pub fn insertion_line_fragment(
    layout: &impl TextLayout,
    text_len: usize,
    offset: usize,
) -> Option<Rect> {
    let offset = offset.min(text_len);
    let fragment = if offset < text_len {
        layout.line_fragment_rect(layout.glyph_range_for_chars(offset..offset + 1).start)
    } else if let Some(extra) = layout
        .extra_line_fragment_rect()
        .filter(|r| r.height() > 0.0)
    {
        Some(extra)
    } else if offset > 0 {
        layout.line_fragment_rect(layout.glyph_range_for_chars(offset - 1..offset).start)
    } else {
        None
    };
    fragment.map(|r| r.translate(Vec2::new(0.0, layout.container_inset().y)))
}

/// Full-width band behind the caret's logical line, in view coordinates.
///
/// Uses the line's first fragment, or the extra fragment for the empty line
/// after a trailing newline.
pub fn current_line_band(
    layout: &impl TextLayout,
    text: &TextBuffer,
    lines: &mut LineIndexCache,
    offset: usize,
    width: f32,
) -> Option<Rect> {
    let line = lines.line_number(text, offset);
    let chars = lines.line_range(text, line)?;
    let glyphs = layout.glyph_range_for_chars(chars);
    let fragment = if glyphs.is_empty() {
        layout.extra_line_fragment_rect()?
    } else {
        layout.line_fragment_rect(glyphs.start)?
    };
    let top = fragment.min.y + layout.container_inset().y;
    Some(Rect::from_min_max(
        Pos2::new(0.0, top),
        Pos2::new(width, top + fragment.height()),
    ))
}
