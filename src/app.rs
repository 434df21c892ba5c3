use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use eframe::egui;

use profilescope::data::datetime::now_ms;
use profilescope::data::export::{self, DEFAULT_EXPORT_NAME};
use profilescope::data::loader;
use profilescope::data::LoadError;
use profilescope::processing::surface::Surface;
use profilescope::sensor::capture::{LiveUpdate, Poller, PollerCommand};
use profilescope::sensor::client::{HttpSensor, SensorStatus};
use profilescope::state::app_state::{AppState, Page, VERSION};
use profilescope::state::preferences::Preferences;
use profilescope::state::profile::Scan;
use profilescope::state::theme::Theme;
use profilescope::ui::live_panel::{show_live_panel, LiveAction};
use profilescope::ui::profile_panel::{show_profile_panel, toolbar_toggle_btn, ProfileAction};
use profilescope::ui::settings_dialog::{show_settings_dialog, SensorSettingsState, SettingsAction};
use profilescope::ui::slice_panel::{show_slice_panel, SliceAction, SlicePanelState};

/// Where a file being loaded will end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadTarget {
    Captured,
    CompareLeft,
    CompareRight,
    Surface,
}

enum Loaded {
    Scans(Vec<Scan>),
    Surface(Surface),
}

/// Pending async file load result.
struct PendingLoad {
    target: LoadTarget,
    result: Arc<Mutex<Option<Result<Loaded, LoadError>>>>,
}

/// The main ProfileScope application.
pub struct ProfileScopeApp {
    state: AppState,
    prefs: Preferences,
    /// Sensor poller, started the first time the live page is opened.
    poller: Option<Poller>,
    sensor_status: SensorStatus,
    sensor_error: Option<String>,
    settings_dialog: Option<SensorSettingsState>,
    slice_panel: SlicePanelState,
    /// An error message shown in the footer until dismissed.
    error_message: Option<String>,
    pending_load: Option<PendingLoad>,
}

fn themed_visuals(theme: Theme) -> egui::Visuals {
    let mut vis = theme.visuals();
    vis.window_corner_radius = egui::CornerRadius::same(8);
    vis.widgets.noninteractive.corner_radius = egui::CornerRadius::same(6);
    vis.widgets.inactive.corner_radius = egui::CornerRadius::same(6);
    vis.widgets.hovered.corner_radius = egui::CornerRadius::same(6);
    vis.widgets.active.corner_radius = egui::CornerRadius::same(6);
    vis.widgets.hovered.bg_stroke = egui::Stroke::new(1.5, egui::Color32::from_gray(160));
    vis
}

impl ProfileScopeApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let prefs = cc.storage.map(|s| Preferences::load(s)).unwrap_or_default();
        tracing::info!(page = ?prefs.page, theme = prefs.theme.label(), "preferences loaded");
        let state = AppState::from_preferences(&prefs);

        let ctx = &cc.egui_ctx;
        let mut style = (*ctx.style()).clone();
        style.text_styles.insert(egui::TextStyle::Body, egui::FontId::proportional(14.5));
        style.text_styles.insert(egui::TextStyle::Button, egui::FontId::proportional(14.0));
        style.text_styles.insert(egui::TextStyle::Heading, egui::FontId::proportional(21.0));
        style.text_styles.insert(egui::TextStyle::Monospace, egui::FontId::monospace(13.0));
        style.spacing.button_padding = egui::vec2(10.0, 5.0);
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.spacing.window_margin = egui::Margin::same(12);
        ctx.set_style(style);
        ctx.set_visuals(themed_visuals(prefs.theme));

        Self {
            state,
            prefs,
            poller: None,
            sensor_status: SensorStatus::default(),
            sensor_error: None,
            settings_dialog: None,
            slice_panel: SlicePanelState::default(),
            error_message: None,
            pending_load: None,
        }
    }

    fn show_error(&mut self, msg: String) {
        tracing::error!("{msg}");
        self.error_message = Some(msg);
    }

    fn open_file_dialog(&mut self, target: LoadTarget) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .add_filter("All Files", &["*"])
            .pick_file()
        {
            self.load_file(target, &path);
        }
    }

    /// Parse a CSV file on a worker thread so the UI stays responsive.
    fn load_file(&mut self, target: LoadTarget, path: &Path) {
        let path_buf: PathBuf = path.to_path_buf();
        let result: Arc<Mutex<Option<Result<Loaded, LoadError>>>> = Arc::new(Mutex::new(None));
        let result_clone = Arc::clone(&result);

        std::thread::spawn(move || {
            let loaded = match target {
                LoadTarget::Surface => loader::load_surface(&path_buf).map(Loaded::Surface),
                _ => loader::load_scans(&path_buf).map(Loaded::Scans),
            };
            if let Ok(mut slot) = result_clone.lock() {
                *slot = Some(loaded);
            }
        });

        self.pending_load = Some(PendingLoad { target, result });
    }

    fn poll_pending_load(&mut self) {
        let Some(pending) = &self.pending_load else {
            return;
        };
        let taken = match pending.result.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => Some(Err(LoadError::Io(std::io::Error::other("loader thread panicked")))),
        };
        let Some(result) = taken else {
            return;
        };
        let target = pending.target;
        self.pending_load = None;

        match result {
            Ok(Loaded::Scans(scans)) => {
                let viewer = match target {
                    LoadTarget::CompareLeft => &mut self.state.compare_left,
                    LoadTarget::CompareRight => &mut self.state.compare_right,
                    _ => &mut self.state.captured,
                };
                viewer.set_scans(scans);
                viewer.reset_view();
            }
            Ok(Loaded::Surface(surface)) => self.state.set_surface(surface),
            Err(e) => self.show_error(format!("Failed to load file: {e}")),
        }
    }

    /// Ask where to save the capture and write it.
    fn export_capture(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(DEFAULT_EXPORT_NAME)
            .add_filter("CSV Files", &["csv"])
            .save_file()
        else {
            return;
        };
        if let Err(e) = export::export_scans(&path, self.state.capture.scans()) {
            self.show_error(format!("Failed to export capture: {e}"));
        }
    }

    fn ensure_poller(&mut self) {
        if self.poller.is_some() {
            return;
        }
        match HttpSensor::new(self.prefs.base_url.clone()) {
            Ok(sensor) => {
                tracing::info!(url = %sensor.base_url(), "starting sensor poller");
                let rate = Duration::from_millis(self.prefs.poll_rate_ms.max(1));
                self.poller = Some(Poller::spawn(Box::new(sensor), rate));
            }
            Err(e) => self.show_error(format!("Cannot create sensor client: {e}")),
        }
    }

    fn send_to_sensor(&mut self, cmd: PollerCommand) {
        self.ensure_poller();
        if let Some(poller) = &self.poller {
            poller.send(cmd);
        }
    }

    fn drain_live_updates(&mut self) {
        let Some(poller) = &self.poller else {
            return;
        };
        for update in poller.drain() {
            match update {
                LiveUpdate::Status(status) => {
                    self.sensor_status = status;
                    self.sensor_error = None;
                }
                LiveUpdate::Profile(z) => {
                    self.state
                        .receive_live_profile(z, now_ms(), self.prefs.sample_interval_ms);
                }
                LiveUpdate::Error(msg) => self.sensor_error = Some(msg),
            }
        }
    }

    fn handle_live_action(&mut self, action: LiveAction) {
        match action {
            LiveAction::None => {}
            LiveAction::OpenSettings => {
                self.settings_dialog = Some(SensorSettingsState::new(&self.prefs));
            }
            LiveAction::Connect => self.send_to_sensor(PollerCommand::Connect),
            LiveAction::Disconnect => self.send_to_sensor(PollerCommand::Disconnect),
            LiveAction::StartCapture => self.state.capture.start(),
            LiveAction::TogglePause => self.state.capture.toggle_pause(),
            LiveAction::StopCapture => {
                if self.state.capture.stop() {
                    self.export_capture();
                }
            }
            LiveAction::SendToCaptured => {
                if self.state.send_capture_to_captured() {
                    self.state.page = Page::Captured;
                }
            }
        }
    }

    fn handle_settings_action(&mut self, action: SettingsAction) {
        match action {
            SettingsAction::None => {}
            SettingsAction::Apply(settings) => {
                let url_changed = settings.base_url != self.prefs.base_url;
                settings.store(&mut self.prefs);
                if url_changed {
                    // Restarted with the new URL on the next send.
                    self.poller = None;
                }
                self.send_to_sensor(PollerCommand::SetSensor {
                    ip: settings.ip,
                    port: settings.port,
                });
                self.send_to_sensor(PollerCommand::SetPollRate(Duration::from_millis(
                    settings.poll_rate_ms,
                )));
            }
            SettingsAction::Connect => self.send_to_sensor(PollerCommand::Connect),
            SettingsAction::Disconnect => self.send_to_sensor(PollerCommand::Disconnect),
        }
    }

    fn show_compare_page(&mut self, ui: &mut egui::Ui, theme: &Theme) -> Option<LoadTarget> {
        let mut load = None;
        let locked = self.state.compare_link.is_locked();

        ui.horizontal(|ui| {
            let label = if locked { "Unlock Views" } else { "Lock Views" };
            if toolbar_toggle_btn(ui, label, locked).clicked() {
                self.state.compare_link.toggle();
            }
            // Shared scan slider while locked; selection is mirrored to the right.
            let left = &mut self.state.compare_left;
            if locked && left.scans().len() > 1 {
                let last = left.scans().len() - 1;
                let mut idx = left.current();
                if ui
                    .add(egui::Slider::new(&mut idx, 0..=last).show_value(false))
                    .changed()
                {
                    left.select_scan(idx);
                }
                if let Some(label) = left.scan_label() {
                    ui.label(label);
                }
            }
        });
        ui.add_space(6.0);

        let AppState {
            compare_left,
            compare_right,
            ..
        } = &mut self.state;
        ui.columns(2, |cols| {
            if show_profile_panel(compare_left, &mut cols[0], theme, !locked) == ProfileAction::LoadData {
                load = Some(LoadTarget::CompareLeft);
            }
            if show_profile_panel(compare_right, &mut cols[1], theme, !locked) == ProfileAction::LoadData {
                load = Some(LoadTarget::CompareRight);
            }
        });
        load
    }
}

impl eframe::App for ProfileScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let theme = self.prefs.theme;
        ctx.set_visuals(themed_visuals(theme));

        // ------------------------------------------------------------------
        // 1. Background results: file loads and sensor updates
        // ------------------------------------------------------------------
        self.poll_pending_load();
        if self.state.page == Page::Live {
            self.ensure_poller();
        }
        self.drain_live_updates();

        let mut dropped_paths: Vec<PathBuf> = Vec::new();
        ctx.input(|i| {
            for file in &i.raw.dropped_files {
                if let Some(path) = &file.path {
                    let is_csv = path
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
                    if is_csv {
                        dropped_paths.push(path.clone());
                    }
                }
            }
        });
        for path in dropped_paths {
            let target = match self.state.page {
                Page::Slice => LoadTarget::Surface,
                Page::Compare => LoadTarget::CompareLeft,
                _ => LoadTarget::Captured,
            };
            self.load_file(target, &path);
        }

        // ------------------------------------------------------------------
        // 2. Header with page tabs
        // ------------------------------------------------------------------
        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(16, 8)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("ProfileScope");
                    ui.separator();
                    for page in Page::ALL {
                        ui.selectable_value(&mut self.state.page, page, page.label());
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let theme_label = match theme {
                            Theme::Dark => "Light Mode",
                            Theme::Light => "Dark Mode",
                        };
                        if ui.button(theme_label).clicked() {
                            self.prefs.theme = theme.toggle();
                        }
                        ui.separator();
                        ui.small(format!("v{VERSION}"));
                    });
                });
            });

        // --- Footer panel ---
        egui::TopBottomPanel::bottom("footer")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(16, 6)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let viewer = match self.state.page {
                        Page::Captured => Some(&self.state.captured),
                        Page::Slice => Some(&self.state.slice_viewer),
                        Page::Live => Some(&self.state.live_viewer),
                        Page::Compare => None,
                    };
                    let summary = match viewer {
                        Some(v) => format!("{} samples, {}", v.profile().len(), v.mode().label()),
                        None => format!(
                            "{} / {} scans",
                            self.state.compare_left.scans().len(),
                            self.state.compare_right.scans().len()
                        ),
                    };
                    ui.label(egui::RichText::new(summary).weak());

                    if let Some(msg) = &self.error_message {
                        ui.separator();
                        ui.colored_label(egui::Color32::from_rgb(255, 80, 80), msg);
                        if ui.small_button("dismiss").clicked() {
                            self.error_message = None;
                        }
                    }
                });
            });

        // ------------------------------------------------------------------
        // 3. Active page
        // ------------------------------------------------------------------
        let mut load: Option<LoadTarget> = None;
        let mut live_action = LiveAction::None;
        let page = self.state.page;
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| match page {
                Page::Captured => {
                    if show_profile_panel(&mut self.state.captured, ui, &theme, true)
                        == ProfileAction::LoadData
                    {
                        load = Some(LoadTarget::Captured);
                    }
                }
                Page::Compare => load = self.show_compare_page(ui, &theme),
                Page::Slice => {
                    match show_slice_panel(ui, &mut self.slice_panel, &mut self.state, &theme) {
                        SliceAction::None => {}
                        SliceAction::LoadSurface => load = Some(LoadTarget::Surface),
                        SliceAction::ClearAll => {
                            self.state.clear_surface();
                            self.prefs.reset_slice();
                        }
                    }
                }
                Page::Live => {
                    live_action = show_live_panel(
                        ui,
                        &mut self.state.live_viewer,
                        &self.state.capture,
                        &self.sensor_status,
                        self.sensor_error.as_deref(),
                        &theme,
                    );
                }
            });
        });

        if let Some(target) = load {
            self.open_file_dialog(target);
        }
        self.handle_live_action(live_action);

        // ------------------------------------------------------------------
        // 4. Dialogs
        // ------------------------------------------------------------------
        if let Some(dialog) = &mut self.settings_dialog {
            let (open, action) = show_settings_dialog(ctx, dialog, &self.sensor_status);
            if !open {
                self.settings_dialog = None;
            }
            self.handle_settings_action(action);
        }

        if self.pending_load.is_some() {
            egui::Window::new("Loading")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading file...");
                    });
                });
            ctx.request_repaint();
        }

        // ------------------------------------------------------------------
        // 5. Compare mirroring and housekeeping
        // ------------------------------------------------------------------
        self.state.end_frame();
        if self.poller.is_some() {
            ctx.request_repaint_after(Duration::from_millis(self.prefs.poll_rate_ms.max(1)));
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.state.store_preferences(&mut self.prefs);
        self.prefs.save(storage);
        tracing::debug!("preferences saved");
    }
}
