use eframe::egui::{self, Color32, CornerRadius, FontId, Frame, Margin, RichText, Stroke, TextStyle};

use crate::model::{EntityStatus, Priority};

/// Performance band of a ROAS value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoasTier {
    Good,
    Fair,
    Poor,
}

impl RoasTier {
    pub fn of(roas: f64) -> Self {
        if roas >= 3.0 {
            Self::Good
        } else if roas >= 1.5 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

/// Dashboard palette and metrics. Colours follow a slate base with an indigo accent.
#[derive(Debug, Clone)]
pub struct Theme {
    pub canvas: Color32,
    pub sidebar: Color32,
    pub card: Color32,
    pub card_raised: Color32,
    pub accent_primary: Color32,
    pub accent_pressed: Color32,
    pub success: Color32,
    pub warning: Color32,
    pub danger: Color32,
    pub text_primary: Color32,
    pub text_muted: Color32,
    pub divider: Color32,
    pub danger_tint: Color32,
    pub spacing_4: f32,
    pub spacing_8: f32,
    pub spacing_12: f32,
    pub spacing_16: f32,
    pub radius_chip: u8,
    pub radius_card: u8,
    pub radius_window: u8,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            canvas: Color32::from_rgb(0x0B, 0x12, 0x20),
            sidebar: Color32::from_rgb(0x0F, 0x17, 0x2A),
            card: Color32::from_rgb(0x1E, 0x29, 0x3B),
            card_raised: Color32::from_rgb(0x33, 0x41, 0x55),
            accent_primary: Color32::from_rgb(0x63, 0x66, 0xF1),
            accent_pressed: Color32::from_rgb(0x4F, 0x46, 0xE5),
            success: Color32::from_rgb(0x10, 0xB9, 0x81),
            warning: Color32::from_rgb(0xF5, 0x9E, 0x0B),
            danger: Color32::from_rgb(0xF4, 0x3F, 0x5E),
            text_primary: Color32::from_rgb(0xF1, 0xF5, 0xF9),
            text_muted: Color32::from_rgb(0x94, 0xA3, 0xB8),
            divider: Color32::from_rgba_premultiplied(148, 163, 184, 24),
            danger_tint: Color32::from_rgba_premultiplied(244, 63, 94, 36),
            spacing_4: 4.0,
            spacing_8: 8.0,
            spacing_12: 12.0,
            spacing_16: 16.0,
            radius_chip: 6,
            radius_card: 10,
            radius_window: 14,
        }
    }
}

impl Theme {
    pub fn apply_visuals(&self, ctx: &egui::Context) {
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = self.canvas;
        visuals.extreme_bg_color = self.sidebar;
        visuals.faint_bg_color = self.card;
        visuals.override_text_color = Some(self.text_primary);
        visuals.hyperlink_color = self.accent_primary;
        visuals.selection.bg_fill = self.accent_pressed;
        visuals.selection.stroke = Stroke::new(1.0, self.text_primary);

        let widgets = &mut visuals.widgets;
        for (state, fill) in [
            (&mut widgets.noninteractive, self.card),
            (&mut widgets.inactive, self.card),
            (&mut widgets.hovered, self.card_raised),
            (&mut widgets.active, self.accent_pressed),
            (&mut widgets.open, self.card_raised),
        ] {
            state.bg_fill = fill;
            state.weak_bg_fill = fill;
            state.bg_stroke = Stroke::NONE;
            state.corner_radius = CornerRadius::same(self.radius_chip);
        }
        widgets.noninteractive.bg_stroke = Stroke::new(1.0, self.divider);

        visuals.window_fill = self.sidebar;
        visuals.window_stroke = Stroke::new(1.0, self.divider);
        visuals.window_corner_radius = CornerRadius::same(self.radius_window);
        visuals.window_shadow = egui::epaint::Shadow {
            offset: [0, 12],
            blur: 32,
            spread: 0,
            color: Color32::from_black_alpha(96),
        };

        ctx.style_mut(|style| {
            style.visuals = visuals;
            style.spacing.item_spacing = egui::vec2(self.spacing_8, 6.0);
            style.spacing.button_padding = egui::vec2(self.spacing_12, 5.0);
            for (text_style, font) in [
                (TextStyle::Heading, FontId::proportional(20.0)),
                (TextStyle::Body, FontId::proportional(14.0)),
                (TextStyle::Button, FontId::proportional(14.0)),
                (TextStyle::Monospace, FontId::monospace(12.0)),
                (TextStyle::Small, FontId::proportional(11.5)),
            ] {
                style.text_styles.insert(text_style, font);
            }
        });
    }

    pub fn card_frame(&self) -> Frame {
        Frame::new()
            .fill(self.card)
            .inner_margin(Margin::same(self.spacing_12 as i8))
            .corner_radius(CornerRadius::same(self.radius_card))
            .stroke(Stroke::new(1.0, self.divider))
    }

    /// Card outlined in `accent`, used for recommendation items.
    pub fn accent_card_frame(&self, accent: Color32) -> Frame {
        self.card_frame().stroke(Stroke::new(1.0, accent.gamma_multiply(0.6)))
    }

    pub fn banner_frame(&self) -> Frame {
        Frame::new()
            .fill(self.danger_tint)
            .inner_margin(Margin::symmetric(self.spacing_12 as i8, self.spacing_8 as i8))
            .corner_radius(CornerRadius::same(self.radius_card))
    }

    pub fn priority_color(&self, priority: Priority) -> Color32 {
        match priority {
            Priority::High => self.danger,
            Priority::Medium => self.warning,
            Priority::Low => self.accent_primary,
        }
    }

    pub fn priority_icon(priority: Priority) -> &'static str {
        match priority {
            Priority::High => "⚠",
            Priority::Medium => "💡",
            Priority::Low => "✨",
        }
    }

    pub fn roas_color(&self, roas: f64) -> Color32 {
        match RoasTier::of(roas) {
            RoasTier::Good => self.success,
            RoasTier::Fair => self.warning,
            RoasTier::Poor => self.danger,
        }
    }

    pub fn status_color(&self, status: EntityStatus) -> Color32 {
        match status {
            EntityStatus::Active => self.success,
            EntityStatus::Paused => self.warning,
            EntityStatus::Deleted | EntityStatus::Archived => self.text_muted,
        }
    }

    pub fn trend_color(&self, change: f64) -> Color32 {
        if change > 0.0 {
            self.success
        } else if change < 0.0 {
            self.danger
        } else {
            self.text_muted
        }
    }

    pub fn chip(&self, text: &str, color: Color32) -> RichText {
        RichText::new(format!(" {text} "))
            .small()
            .strong()
            .color(color)
            .background_color(color.gamma_multiply(0.18))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roas_tiers_use_inclusive_lower_bounds() {
        assert_eq!(RoasTier::of(3.0), RoasTier::Good);
        assert_eq!(RoasTier::of(2.99), RoasTier::Fair);
        assert_eq!(RoasTier::of(1.5), RoasTier::Fair);
        assert_eq!(RoasTier::of(1.49), RoasTier::Poor);
    }

    #[test]
    fn priority_maps_to_severity_colour() {
        let theme = Theme::default();
        assert_eq!(theme.priority_color(Priority::High), theme.danger);
        assert_eq!(theme.priority_color(Priority::Medium), theme.warning);
        assert_eq!(theme.priority_color(Priority::Low), theme.accent_primary);
    }
}
