use crate::sensor::client::SensorStatus;
use crate::state::preferences::Preferences;

/// Editable copy of the sensor settings while the dialog is open.
pub struct SensorSettingsState {
    pub base_url: String,
    pub ip: String,
    pub port: String,
    pub poll_rate_ms: u64,
    pub sample_interval_ms: u64,
    pub error: String,
}

impl SensorSettingsState {
    pub fn new(prefs: &Preferences) -> Self {
        Self {
            base_url: prefs.base_url.clone(),
            ip: prefs.sensor_ip.clone(),
            port: prefs.sensor_port.to_string(),
            poll_rate_ms: prefs.poll_rate_ms,
            sample_interval_ms: prefs.sample_interval_ms,
            error: String::new(),
        }
    }

    /// Validated settings, or a message for the user.
    pub fn validate(&self) -> Result<SensorSettings, String> {
        let ip = self.ip.trim();
        if ip.is_empty() {
            return Err("Sensor IP must not be empty".to_string());
        }
        let port = self
            .port
            .trim()
            .parse::<u16>()
            .map_err(|_| format!("Invalid port: {}", self.port.trim()))?;
        let base_url = self.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err("Service URL must start with http:// or https://".to_string());
        }
        Ok(SensorSettings {
            base_url: base_url.to_string(),
            ip: ip.to_string(),
            port,
            poll_rate_ms: self.poll_rate_ms.max(1),
            sample_interval_ms: self.sample_interval_ms,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorSettings {
    pub base_url: String,
    pub ip: String,
    pub port: u16,
    pub poll_rate_ms: u64,
    pub sample_interval_ms: u64,
}

impl SensorSettings {
    pub fn store(&self, prefs: &mut Preferences) {
        prefs.base_url = self.base_url.clone();
        prefs.sensor_ip = self.ip.clone();
        prefs.sensor_port = self.port;
        prefs.poll_rate_ms = self.poll_rate_ms;
        prefs.sample_interval_ms = self.sample_interval_ms;
    }
}

pub enum SettingsAction {
    None,
    Apply(SensorSettings),
    Connect,
    Disconnect,
}

/// Show the sensor settings window. Returns `false` once the user closes it.
pub fn show_settings_dialog(
    ctx: &egui::Context,
    state: &mut SensorSettingsState,
    status: &SensorStatus,
) -> (bool, SettingsAction) {
    let mut open = true;
    let mut action = SettingsAction::None;

    egui::Window::new("Sensor Settings")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .default_width(360.0)
        .show(ctx, |ui| {
            egui::Grid::new("sensor_settings_grid")
                .num_columns(2)
                .spacing([12.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Service URL");
                    ui.text_edit_singleline(&mut state.base_url);
                    ui.end_row();

                    ui.label("Sensor IP");
                    ui.text_edit_singleline(&mut state.ip);
                    ui.end_row();

                    ui.label("Port");
                    ui.text_edit_singleline(&mut state.port);
                    ui.end_row();

                    ui.label("Polling rate");
                    ui.add(
                        egui::DragValue::new(&mut state.poll_rate_ms)
                            .range(10..=5000)
                            .suffix(" ms"),
                    );
                    ui.end_row();

                    ui.label("Sample interval");
                    ui.add(
                        egui::DragValue::new(&mut state.sample_interval_ms)
                            .range(0..=60_000)
                            .suffix(" ms"),
                    );
                    ui.end_row();
                });

            ui.add_space(6.0);
            ui.horizontal(|ui| {
                let (dot, text) = if status.connected {
                    (egui::Color32::from_rgb(67, 160, 71), "Connected")
                } else {
                    (egui::Color32::from_rgb(229, 57, 53), "Disconnected")
                };
                ui.label(egui::RichText::new("●").color(dot));
                ui.label(format!("{text} ({}:{})", status.ip, status.port));
            });

            ui.add_space(6.0);
            ui.horizontal(|ui| {
                if ui.button("Set").clicked() {
                    match state.validate() {
                        Ok(settings) => {
                            state.error.clear();
                            action = SettingsAction::Apply(settings);
                        }
                        Err(msg) => state.error = msg,
                    }
                }
                if ui
                    .add_enabled(!status.connected, egui::Button::new("Connect"))
                    .clicked()
                {
                    action = SettingsAction::Connect;
                }
                if ui
                    .add_enabled(status.connected, egui::Button::new("Disconnect"))
                    .clicked()
                {
                    action = SettingsAction::Disconnect;
                }
            });

            if !state.error.is_empty() {
                ui.colored_label(egui::Color32::RED, &state.error);
            }
        });

    (open, action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_bad_port_and_url() {
        let mut state = SensorSettingsState::new(&Preferences::default());
        assert!(state.validate().is_ok());

        state.port = "99999".into();
        assert!(state.validate().unwrap_err().contains("Invalid port"));

        state.port = " 24691 ".into();
        state.base_url = "localhost:8000".into();
        assert!(state.validate().is_err());
    }

    #[test]
    fn applied_settings_land_in_preferences() {
        let mut state = SensorSettingsState::new(&Preferences::default());
        state.ip = "10.1.1.5".into();
        state.poll_rate_ms = 50;
        let mut prefs = Preferences::default();
        state.validate().unwrap().store(&mut prefs);
        assert_eq!(prefs.sensor_ip, "10.1.1.5");
        assert_eq!(prefs.poll_rate_ms, 50);
    }
}
