use crate::processing::surface::{SliceAxis, Surface};
use crate::state::app_state::{AppState, SliceSelection};
use crate::state::theme::{self, Theme};
use crate::ui::profile_panel::{show_profile_panel, toolbar_btn};

const HEAT_MAP_HEIGHT: f32 = 220.0;

/// Actions the slice page asks the app to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceAction {
    None,
    LoadSurface,
    ClearAll,
}

/// Cached top-view texture of the current surface.
#[derive(Default)]
pub struct SlicePanelState {
    texture: Option<(u64, egui::TextureHandle)>,
}

/// Colour for a height normalised to `0..=1`: dark blue through teal to yellow.
pub fn height_color(t: f64) -> egui::Color32 {
    const STOPS: [(u8, u8, u8); 5] = [
        (68, 1, 84),
        (59, 82, 139),
        (33, 145, 140),
        (94, 201, 98),
        (253, 231, 37),
    ];
    if !t.is_finite() {
        return egui::Color32::from_gray(40);
    }
    let t = t.clamp(0.0, 1.0) * (STOPS.len() - 1) as f64;
    let i = (t.floor() as usize).min(STOPS.len() - 2);
    let f = t - i as f64;
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
    let (a, b) = (STOPS[i], STOPS[i + 1]);
    egui::Color32::from_rgb(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

fn heat_map_image(surface: &Surface) -> egui::ColorImage {
    let (w, h) = (surface.col_count().max(1), surface.row_count().max(1));
    let (lo, hi) = surface.z_range().unwrap_or((0.0, 1.0));
    let span = if hi > lo { hi - lo } else { 1.0 };
    let mut image = egui::ColorImage::new([w, h], egui::Color32::from_gray(40));
    for (y, row) in surface.rows().iter().enumerate() {
        for (x, z) in row.iter().take(w).enumerate() {
            image.pixels[y * w + x] = height_color((z - lo) / span);
        }
    }
    image
}

pub fn show_slice_panel(
    ui: &mut egui::Ui,
    panel: &mut SlicePanelState,
    app: &mut AppState,
    theme: &Theme,
) -> SliceAction {
    let mut action = SliceAction::None;
    let mut selection = app.slice();

    ui.horizontal(|ui| {
        if toolbar_btn(ui, "Load Surface").clicked() {
            action = SliceAction::LoadSurface;
        }
        if toolbar_btn(ui, "Clear All Data").clicked() {
            action = SliceAction::ClearAll;
        }
        ui.separator();
        ui.checkbox(&mut selection.show, "Show slice");
        ui.radio_value(&mut selection.axis, SliceAxis::X, SliceAxis::X.label());
        ui.radio_value(&mut selection.axis, SliceAxis::Y, SliceAxis::Y.label());
    });

    let Some((max_x, max_y)) = app.slice_bounds() else {
        app.set_slice(selection);
        ui.add_space(40.0);
        ui.vertical_centered(|ui| {
            ui.label(egui::RichText::new("No surface loaded").strong().size(16.0));
            ui.add_space(6.0);
            ui.label(egui::RichText::new("Click \"Load Surface\" to import a scan capture CSV.").weak());
        });
        return action;
    };

    ui.horizontal(|ui| match selection.axis {
        SliceAxis::X => {
            ui.label("Column");
            ui.add(egui::Slider::new(&mut selection.x, 0..=max_x));
        }
        SliceAxis::Y => {
            ui.label("Scan");
            ui.add(egui::Slider::new(&mut selection.y, 0..=max_y));
        }
    });

    if let Some(clicked) = show_heat_map(ui, panel, app, &selection) {
        selection = clicked;
    }
    app.set_slice(selection);

    ui.add_space(6.0);
    show_profile_panel(&mut app.slice_viewer, ui, theme, false);
    action
}

/// Draw the surface seen from above with the active slice line. A click
/// moves the slice to the clicked column or scan.
fn show_heat_map(
    ui: &mut egui::Ui,
    panel: &mut SlicePanelState,
    app: &AppState,
    selection: &SliceSelection,
) -> Option<SliceSelection> {
    let surface = app.surface();
    let revision = app.surface_revision();
    let texture = match &panel.texture {
        Some((rev, tex)) if *rev == revision => tex.clone(),
        _ => {
            let tex = ui.ctx().load_texture(
                "surface_heat_map",
                heat_map_image(surface),
                egui::TextureOptions::NEAREST,
            );
            panel.texture = Some((revision, tex.clone()));
            tex
        }
    };

    let width = ui.available_width();
    let (rect, response) =
        ui.allocate_exact_size(egui::vec2(width, HEAT_MAP_HEIGHT), egui::Sense::click());
    let painter = ui.painter_at(rect);
    painter.image(
        texture.id(),
        rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );

    let cols = surface.col_count().max(1) as f32;
    let rows = surface.row_count().max(1) as f32;
    if selection.show {
        let stroke = egui::Stroke::new(2.0, theme::RULER_RED);
        match selection.axis {
            SliceAxis::X => {
                let x = rect.left() + (selection.x as f32 + 0.5) / cols * rect.width();
                painter.line_segment([egui::pos2(x, rect.top()), egui::pos2(x, rect.bottom())], stroke);
            }
            SliceAxis::Y => {
                let y = rect.top() + (selection.y as f32 + 0.5) / rows * rect.height();
                painter.line_segment([egui::pos2(rect.left(), y), egui::pos2(rect.right(), y)], stroke);
            }
        }
    }

    let pos = response.interact_pointer_pos().filter(|_| response.clicked())?;
    let fx = ((pos.x - rect.left()) / rect.width()).clamp(0.0, 1.0);
    let fy = ((pos.y - rect.top()) / rect.height()).clamp(0.0, 1.0);
    let mut picked = *selection;
    picked.show = true;
    match selection.axis {
        SliceAxis::X => picked.x = ((fx * cols) as usize).min(surface.col_count().saturating_sub(1)),
        SliceAxis::Y => picked.y = ((fy * rows) as usize).min(surface.row_count().saturating_sub(1)),
    }
    Some(picked)
}
