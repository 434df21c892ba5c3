use egui::{Color32, Visuals};
use serde::{Deserialize, Serialize};

use crate::processing::metrics::LegendColor;

pub const PROFILE_BLUE: Color32 = Color32::from_rgb(0x1f, 0x77, 0xb4);
pub const RULER_RED: Color32 = Color32::from_rgb(0xe5, 0x39, 0x35);
pub const RULER_ORANGE: Color32 = Color32::from_rgb(0xfb, 0x8c, 0x00);
pub const POINT_A_BLUE: Color32 = Color32::from_rgb(0x1e, 0x88, 0xe5);
pub const POINT_B_GREEN: Color32 = Color32::from_rgb(0x43, 0xa0, 0x47);
pub const OVERLAY_PURPLE: Color32 = Color32::from_rgb(0x8e, 0x24, 0xaa);

/// Opacity of the straight chord between two clicked points.
pub const CHORD_OPACITY: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggle(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn visuals(&self) -> Visuals {
        match self {
            Theme::Dark => Visuals::dark(),
            Theme::Light => Visuals::light(),
        }
    }

    pub fn plot_bg(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_rgb(20, 20, 20),
            Theme::Light => Color32::from_rgb(255, 255, 255),
        }
    }

    pub fn grid_color(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_rgba_premultiplied(100, 100, 100, 60),
            Theme::Light => Color32::from_rgba_premultiplied(180, 180, 180, 80),
        }
    }

    pub fn axis_color(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_gray(170),
            Theme::Light => Color32::from_gray(60),
        }
    }

    pub fn text_color(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_gray(220),
            Theme::Light => Color32::from_gray(30),
        }
    }

    /// Colour of a metrics-table swatch.
    pub fn legend_color(&self, color: LegendColor) -> Color32 {
        match color {
            LegendColor::Axis => self.axis_color(),
            LegendColor::RulerVertical => RULER_RED,
            LegendColor::RulerHorizontal => RULER_ORANGE,
            LegendColor::Overlay => OVERLAY_PURPLE,
            LegendColor::Profile => PROFILE_BLUE,
            LegendColor::PointA => POINT_A_BLUE,
            LegendColor::PointB => POINT_B_GREEN,
            LegendColor::Text => self.text_color(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Dark => "Dark",
            Theme::Light => "Light",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_round_trips() {
        assert_eq!(Theme::Dark.toggle(), Theme::Light);
        assert_eq!(Theme::Dark.toggle().toggle(), Theme::Dark);
    }

    #[test]
    fn measurement_colours_do_not_depend_on_theme() {
        for theme in [Theme::Dark, Theme::Light] {
            assert_eq!(theme.legend_color(LegendColor::RulerVertical), RULER_RED);
            assert_eq!(theme.legend_color(LegendColor::PointB), POINT_B_GREEN);
        }
        assert_ne!(
            Theme::Dark.legend_color(LegendColor::Text),
            Theme::Light.legend_color(LegendColor::Text)
        );
    }
}
