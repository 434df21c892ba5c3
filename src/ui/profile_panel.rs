use crate::processing::metrics::{Legend, MetricRow};
use crate::render::plot_interaction::PointerEvent;
use crate::render::primitives::{RenderScene, ScreenPoint};
use crate::render::view_window::PlotFrame;
use crate::state::theme::{self, Theme};
use crate::state::viewer_state::ViewerState;

/// Height of the drawing canvas in points.
pub const CANVAS_HEIGHT: f32 = 260.0;
const CANVAS_MIN_WIDTH: f32 = 320.0;

/// Actions the profile panel asks the page to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileAction {
    None,
    LoadData,
}

/// Helper to create a toolbar button with consistent min size.
pub fn toolbar_btn(ui: &mut egui::Ui, label: &str) -> egui::Response {
    ui.add(egui::Button::new(label).min_size(egui::vec2(0.0, 26.0)))
}

/// Helper to create a selected/toggled toolbar button.
pub fn toolbar_toggle_btn(ui: &mut egui::Ui, label: &str, active: bool) -> egui::Response {
    let btn = if active {
        egui::Button::new(egui::RichText::new(label).strong())
            .fill(ui.visuals().selection.bg_fill)
            .min_size(egui::vec2(0.0, 26.0))
    } else {
        egui::Button::new(label).min_size(egui::vec2(0.0, 26.0))
    };
    ui.add(btn)
}

/// Render one viewer: toolbar, canvas, scan slider and metrics table.
pub fn show_profile_panel(
    viewer: &mut ViewerState,
    ui: &mut egui::Ui,
    theme: &Theme,
    show_scan_slider: bool,
) -> ProfileAction {
    let mut action = ProfileAction::None;

    egui::Frame::group(ui.style())
        .inner_margin(egui::Margin::same(10))
        .corner_radius(egui::CornerRadius::same(8))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&viewer.title).strong().size(15.0));
                ui.separator();
                if viewer.options.with_file_loader && toolbar_btn(ui, "Load Data").clicked() {
                    action = ProfileAction::LoadData;
                }
                ui.add_enabled_ui(viewer.has_data(), |ui| {
                    let ruler_on = viewer.controller().is_ruler();
                    let ruler_label = if ruler_on { "Measure Off" } else { "Measure On" };
                    if toolbar_toggle_btn(ui, ruler_label, ruler_on).clicked() {
                        viewer.toggle_ruler();
                    }
                    let point_on = viewer.controller().is_point();
                    let point_label = if point_on { "Point Measure Off" } else { "Point Measure On" };
                    if toolbar_toggle_btn(ui, point_label, point_on).clicked() {
                        viewer.toggle_point();
                    }
                });
                if toolbar_btn(ui, "Reset View").clicked() {
                    let mut window = viewer.window();
                    window.reset();
                    viewer.set_window(window);
                }
                ui.label(
                    egui::RichText::new(format!("Zoom x{}", viewer.window().zoom))
                        .weak()
                        .small(),
                );
            });
            ui.add_space(4.0);

            show_canvas(viewer, ui, theme);

            if show_scan_slider && viewer.scans().len() > 1 {
                ui.horizontal(|ui| {
                    let last = viewer.scans().len() - 1;
                    let mut idx = viewer.current();
                    let slider = egui::Slider::new(&mut idx, 0..=last).show_value(false);
                    if ui.add(slider).changed() {
                        viewer.select_scan(idx);
                    }
                    if let Some(label) = viewer.scan_label() {
                        ui.label(label);
                    }
                });
            }

            ui.add_space(4.0);
            let rows = viewer.readout().rows(viewer.options.with_measurement_display);
            ui.push_id(("metrics", viewer.id), |ui| {
                show_metrics_table(ui, &rows, theme);
            });
        });

    action
}

fn show_canvas(viewer: &mut ViewerState, ui: &mut egui::Ui, theme: &Theme) {
    let width = ui.available_width().max(CANVAS_MIN_WIDTH);
    let total_rect = ui
        .allocate_space(egui::vec2(width, CANVAS_HEIGHT))
        .1;
    viewer.frame = PlotFrame::default().with_size(width as f64, CANVAS_HEIGHT as f64);

    let plot_id = egui::Id::new("profile_plot").with(viewer.id);
    let response = ui.interact(total_rect, plot_id, egui::Sense::click_and_drag());
    if viewer.has_data() {
        forward_input(viewer, ui, &response, total_rect.min);
    }

    let painter = ui.painter_at(total_rect);
    painter.rect_filled(total_rect, 4.0, theme.plot_bg());

    let scene = viewer.scene();
    if scene.is_empty() {
        painter.text(
            total_rect.center(),
            egui::Align2::CENTER_CENTER,
            "No data loaded",
            egui::FontId::proportional(16.0),
            theme.text_color(),
        );
        return;
    }
    paint_scene(&painter, &scene, total_rect.min, theme);
}

/// Translate egui's pointer state into canvas-space [`PointerEvent`]s.
fn forward_input(viewer: &mut ViewerState, ui: &egui::Ui, response: &egui::Response, origin: egui::Pos2) {
    let local = |p: egui::Pos2| ((p.x - origin.x) as f64, (p.y - origin.y) as f64);

    if response.drag_started() {
        if let Some(p) = ui.input(|i| i.pointer.press_origin()) {
            let (x, y) = local(p);
            viewer.handle_pointer(PointerEvent::Press { x, y });
        }
    }
    if response.dragged() {
        if let Some(p) = response.interact_pointer_pos() {
            let (x, y) = local(p);
            viewer.handle_pointer(PointerEvent::Move { x, y });
        }
    }
    if response.drag_stopped() {
        viewer.handle_pointer(PointerEvent::Release);
    }
    if viewer.drag_session().is_active() && !response.contains_pointer() {
        viewer.handle_pointer(PointerEvent::Leave);
    }
    if response.clicked() {
        if let Some(p) = response.interact_pointer_pos() {
            let (x, y) = local(p);
            viewer.handle_pointer(PointerEvent::Click { x, y });
        }
    }

    if response.hovered() {
        let delta_y = ui.input(|i| i.raw_scroll_delta.y);
        if delta_y != 0.0 {
            if let Some(p) = response.hover_pos() {
                let (x, _) = local(p);
                viewer.handle_pointer(PointerEvent::Wheel { x, delta_y: delta_y as f64 });
            }
            // The wheel zooms the plot; keep the page from scrolling too.
            ui.ctx().input_mut(|i| {
                i.raw_scroll_delta = egui::Vec2::ZERO;
                i.smooth_scroll_delta = egui::Vec2::ZERO;
            });
        }
    }
}

fn to_pos(origin: egui::Pos2, p: ScreenPoint) -> egui::Pos2 {
    egui::pos2(origin.x + p.x as f32, origin.y + p.y as f32)
}

fn is_drawable(p: &ScreenPoint) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

fn paint_scene(painter: &egui::Painter, scene: &RenderScene, origin: egui::Pos2, theme: &Theme) {
    let frame = scene.frame;
    let plot_rect = egui::Rect::from_min_max(
        to_pos(origin, ScreenPoint::new(frame.left(), frame.top())),
        to_pos(origin, ScreenPoint::new(frame.right(), frame.bottom())),
    );
    let text_color = theme.text_color();
    let dim_color = text_color.gamma_multiply(0.6);
    let font = egui::FontId::proportional(10.0);

    // Grid and tick labels
    let grid = egui::Stroke::new(1.0, theme.grid_color());
    for tick in &scene.x_ticks {
        let x = origin.x + tick.pos as f32;
        painter.line_segment(
            [egui::pos2(x, plot_rect.top()), egui::pos2(x, plot_rect.bottom())],
            grid,
        );
        painter.text(
            egui::pos2(x, plot_rect.bottom() + 4.0),
            egui::Align2::CENTER_TOP,
            &tick.label,
            font.clone(),
            dim_color,
        );
    }
    for tick in &scene.z_ticks {
        let y = origin.y + tick.pos as f32;
        painter.line_segment(
            [egui::pos2(plot_rect.left(), y), egui::pos2(plot_rect.right(), y)],
            grid,
        );
        painter.text(
            egui::pos2(plot_rect.left() - 4.0, y),
            egui::Align2::RIGHT_CENTER,
            &tick.label,
            font.clone(),
            dim_color,
        );
    }
    painter.rect_stroke(
        plot_rect,
        0.0,
        egui::Stroke::new(1.0, theme.axis_color()),
        egui::StrokeKind::Outside,
    );
    painter.text(
        egui::pos2(plot_rect.center().x, origin.y + frame.height as f32 - 2.0),
        egui::Align2::CENTER_BOTTOM,
        "X (mm)",
        egui::FontId::proportional(11.0),
        text_color,
    );
    painter.text(
        egui::pos2(origin.x + 2.0, plot_rect.top()),
        egui::Align2::LEFT_TOP,
        "Z",
        egui::FontId::proportional(11.0),
        text_color,
    );

    // Profile, split where samples are missing
    let stroke = egui::Stroke::new(1.5, theme::PROFILE_BLUE);
    for run in scene.polyline.split(|p| !is_drawable(p)) {
        if run.len() >= 2 {
            let points = run.iter().map(|&p| to_pos(origin, p)).collect();
            painter.add(egui::Shape::line(points, stroke));
        }
    }

    let overlay: Vec<egui::Pos2> = scene
        .curve_overlay
        .iter()
        .filter(|p| is_drawable(p))
        .map(|&p| to_pos(origin, p))
        .collect();
    if overlay.len() >= 2 {
        painter.extend(egui::Shape::dashed_line(
            &overlay,
            egui::Stroke::new(2.5, theme::OVERLAY_PURPLE),
            6.0,
            4.0,
        ));
    }
    if let Some((a, b)) = scene.chord {
        painter.extend(egui::Shape::dashed_line(
            &[to_pos(origin, a), to_pos(origin, b)],
            egui::Stroke::new(2.0, theme::OVERLAY_PURPLE.gamma_multiply(theme::CHORD_OPACITY)),
            6.0,
            4.0,
        ));
    }

    for handle in &scene.vertical_handles {
        painter.line_segment(
            [to_pos(origin, handle.from), to_pos(origin, handle.to)],
            egui::Stroke::new(2.0, theme::RULER_RED),
        );
    }
    for handle in &scene.horizontal_handles {
        let label = if handle.which == 0 { "A" } else { "B" };
        let from = to_pos(origin, handle.from);
        painter.line_segment(
            [from, to_pos(origin, handle.to)],
            egui::Stroke::new(2.0, theme::RULER_ORANGE),
        );
        painter.text(
            from + egui::vec2(4.0, -2.0),
            egui::Align2::LEFT_BOTTOM,
            label,
            font.clone(),
            theme::RULER_ORANGE,
        );
    }

    for marker in &scene.markers {
        let color = if marker.which == 0 {
            theme::POINT_A_BLUE
        } else {
            theme::POINT_B_GREEN
        };
        if is_drawable(&marker.center) {
            painter.circle_filled(to_pos(origin, marker.center), marker.radius as f32, color);
        }
    }
}

fn show_metrics_table(ui: &mut egui::Ui, rows: &[MetricRow], theme: &Theme) {
    use egui_extras::{Column, TableBuilder};

    TableBuilder::new(ui)
        .striped(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::exact(26.0))
        .column(Column::auto().at_least(160.0))
        .column(Column::remainder().at_least(120.0))
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let metric = &rows[row.index()];
                row.col(|ui| paint_legend(ui, metric.legend, theme));
                row.col(|ui| {
                    ui.label(metric.label);
                });
                row.col(|ui| {
                    ui.label(egui::RichText::new(&metric.value).monospace());
                });
            });
        });
}

fn paint_legend(ui: &mut egui::Ui, legend: Legend, theme: &Theme) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(22.0, 12.0), egui::Sense::hover());
    let painter = ui.painter();
    match legend {
        Legend::None => {}
        Legend::Line { color, dashed, opacity } => {
            let stroke = egui::Stroke::new(2.0, theme.legend_color(color).gamma_multiply(opacity));
            let ends = [rect.left_center(), rect.right_center()];
            if dashed {
                painter.extend(egui::Shape::dashed_line(&ends, stroke, 4.0, 3.0));
            } else {
                painter.line_segment(ends, stroke);
            }
        }
        Legend::Dot { color } => {
            painter.circle_filled(rect.center(), 4.0, theme.legend_color(color));
        }
    }
}
