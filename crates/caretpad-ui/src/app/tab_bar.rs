//! Tab strip with active highlighting, close buttons, middle-click close and
//! a "+" button.

use eframe::egui;
use egui::{Color32, RichText, Stroke, Visuals};

use super::App;

impl App {
    pub(crate) fn show_tab_bar(&mut self, ui: &mut egui::Ui) {
        let visuals = ui.visuals().clone();

        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;
            let mut tab_to_close: Option<usize> = None;

            for idx in 0..self.tabs.tab_count() {
                self.render_tab_button(ui, idx, &visuals, &mut tab_to_close);
            }

            ui.spacing_mut().item_spacing.x = 4.0;
            let new_btn = egui::Button::new(
                RichText::new("+")
                    .color(visuals.widgets.noninteractive.fg_stroke.color)
                    .size(16.0),
            )
            .fill(Color32::TRANSPARENT)
            .stroke(Stroke::NONE);
            if ui.add(new_btn).clicked() {
                self.new_tab();
            }

            if let Some(idx) = tab_to_close {
                self.close_tab(idx);
            }
        });
    }

    fn render_tab_button(
        &mut self,
        ui: &mut egui::Ui,
        idx: usize,
        visuals: &Visuals,
        tab_to_close: &mut Option<usize>,
    ) {
        let session = &self.tabs.sessions[idx];
        let is_active = idx == self.tabs.active;

        let title = if session.is_modified() {
            format!("  {} *  ", session.title)
        } else {
            format!("  {}  ", session.title)
        };
        let text = if is_active {
            RichText::new(title).color(visuals.strong_text_color())
        } else {
            RichText::new(title).color(visuals.widgets.noninteractive.fg_stroke.color)
        };
        let fill = if is_active {
            visuals.widgets.active.bg_fill
        } else {
            visuals.faint_bg_color
        };

        let button = egui::Button::new(text)
            .fill(fill)
            .corner_radius(egui::CornerRadius {
                nw: 4,
                ne: 4,
                sw: 0,
                se: 0,
            })
            .stroke(Stroke::NONE)
            .min_size(egui::Vec2::new(0.0, 32.0));
        let response = ui.add(button);

        if is_active {
            let tab_rect = response.rect;
            ui.painter().line_segment(
                [tab_rect.left_top(), tab_rect.right_top()],
                Stroke::new(2.0, self.theme.caret.color),
            );
        }

        if response.clicked() {
            self.tabs.switch_to(idx);
        }
        if response.middle_clicked() {
            *tab_to_close = Some(idx);
        }

        if is_active {
            let close_text = RichText::new("\u{00D7}")
                .color(visuals.widgets.noninteractive.fg_stroke.color)
                .size(14.0);
            let close_btn = egui::Button::new(close_text)
                .fill(Color32::TRANSPARENT)
                .stroke(Stroke::NONE);
            if ui.add(close_btn).clicked() {
                *tab_to_close = Some(idx);
            }
        }
    }
}
