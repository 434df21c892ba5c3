use crate::sensor::capture::CaptureSession;
use crate::sensor::client::SensorStatus;
use crate::state::theme::Theme;
use crate::state::viewer_state::ViewerState;
use crate::ui::profile_panel::{show_profile_panel, toolbar_btn, toolbar_toggle_btn};

/// Actions the live page asks the app to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveAction {
    None,
    OpenSettings,
    Connect,
    Disconnect,
    StartCapture,
    TogglePause,
    /// Stop recording and save the capture.
    StopCapture,
    SendToCaptured,
}

pub fn show_live_panel(
    ui: &mut egui::Ui,
    viewer: &mut ViewerState,
    capture: &CaptureSession,
    status: &SensorStatus,
    last_error: Option<&str>,
    theme: &Theme,
) -> LiveAction {
    let mut action = LiveAction::None;

    ui.horizontal(|ui| {
        let (dot, text) = if status.connected {
            (egui::Color32::from_rgb(67, 160, 71), "Connected")
        } else {
            (egui::Color32::from_rgb(229, 57, 53), "Disconnected")
        };
        ui.label(egui::RichText::new("●").color(dot));
        ui.label(format!("{text}  {}:{}", status.ip, status.port));
        ui.separator();

        if status.connected {
            if toolbar_btn(ui, "Disconnect").clicked() {
                action = LiveAction::Disconnect;
            }
        } else if toolbar_btn(ui, "Connect").clicked() {
            action = LiveAction::Connect;
        }
        if toolbar_btn(ui, "Sensor Settings").clicked() {
            action = LiveAction::OpenSettings;
        }
    });

    ui.horizontal(|ui| {
        if toolbar_toggle_btn(ui, "Start", capture.is_capturing()).clicked() {
            action = LiveAction::StartCapture;
        }
        let pause_label = if capture.is_paused() { "Resume" } else { "Pause" };
        if ui
            .add_enabled(capture.is_capturing(), egui::Button::new(pause_label).min_size(egui::vec2(0.0, 26.0)))
            .clicked()
        {
            action = LiveAction::TogglePause;
        }
        if ui
            .add_enabled(capture.is_capturing(), egui::Button::new("Stop").min_size(egui::vec2(0.0, 26.0)))
            .clicked()
        {
            action = LiveAction::StopCapture;
        }
        let can_send = !capture.is_capturing() && !capture.scans().is_empty();
        if ui
            .add_enabled(can_send, egui::Button::new("Send to Captured").min_size(egui::vec2(0.0, 26.0)))
            .clicked()
        {
            action = LiveAction::SendToCaptured;
        }
        ui.separator();
        ui.label(egui::RichText::new(capture.status_text()).strong());
    });

    if let Some(err) = last_error {
        ui.label(egui::RichText::new(err).weak().color(egui::Color32::from_rgb(229, 57, 53)));
    }
    ui.add_space(6.0);

    show_profile_panel(viewer, ui, theme, false);
    action
}
