//! HTTP boundary to the sensor bridge service.
//!
//! The service exposes `GET /status`, `GET /profile` and
//! `POST /connect`, `/disconnect`, `/set_sensor?ip=&port=`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_SENSOR_IP: &str = "192.168.0.1";
pub const DEFAULT_SENSOR_PORT: u16 = 24691;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Sensor service answered with HTTP {0}")]
    Status(u16),
    #[error("Sensor reported: {0}")]
    Sensor(String),
    #[error("Malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorStatus {
    pub connected: bool,
    pub ip: String,
    pub port: u16,
}

impl Default for SensorStatus {
    fn default() -> Self {
        Self {
            connected: false,
            ip: DEFAULT_SENSOR_IP.to_string(),
            port: DEFAULT_SENSOR_PORT,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    #[serde(default)]
    profile: serde_json::Value,
    status: String,
}

#[derive(Debug, Deserialize)]
struct RawProfile {
    #[serde(default)]
    z: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ConnectResponse {
    connected: bool,
}

/// Extract the Z samples from a `/profile` body. Missing samples stay `None`.
pub fn parse_profile_response(body: &str) -> Result<Vec<Option<f64>>, SensorError> {
    let resp: ProfileResponse =
        serde_json::from_str(body).map_err(|e| SensorError::Malformed(e.to_string()))?;
    if resp.status != "OK" {
        return Err(SensorError::Sensor(resp.status));
    }
    let raw: RawProfile =
        serde_json::from_value(resp.profile).map_err(|e| SensorError::Malformed(e.to_string()))?;
    Ok(raw.z)
}

/// Operations the live page needs from the sensor service.
pub trait SensorApi: Send {
    fn status(&self) -> Result<SensorStatus, SensorError>;
    fn profile(&self) -> Result<Vec<Option<f64>>, SensorError>;
    /// Returns whether the sensor is connected afterwards.
    fn connect(&self) -> Result<bool, SensorError>;
    fn disconnect(&self) -> Result<(), SensorError>;
    fn set_sensor(&self, ip: &str, port: u16) -> Result<(), SensorError>;
}

pub struct HttpSensor {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl HttpSensor {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SensorError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn check(resp: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, SensorError> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            Err(SensorError::Status(status.as_u16()))
        }
    }
}

impl SensorApi for HttpSensor {
    fn status(&self) -> Result<SensorStatus, SensorError> {
        let resp = Self::check(self.http.get(self.url("status")).send()?)?;
        Ok(resp.json()?)
    }

    fn profile(&self) -> Result<Vec<Option<f64>>, SensorError> {
        let resp = Self::check(self.http.get(self.url("profile")).send()?)?;
        parse_profile_response(&resp.text()?)
    }

    fn connect(&self) -> Result<bool, SensorError> {
        let resp = Self::check(self.http.post(self.url("connect")).send()?)?;
        let body: ConnectResponse = resp.json()?;
        tracing::info!(connected = body.connected, "sensor connect");
        Ok(body.connected)
    }

    fn disconnect(&self) -> Result<(), SensorError> {
        Self::check(self.http.post(self.url("disconnect")).send()?)?;
        tracing::info!("sensor disconnected");
        Ok(())
    }

    fn set_sensor(&self, ip: &str, port: u16) -> Result<(), SensorError> {
        let port = port.to_string();
        Self::check(
            self.http
                .post(self.url("set_sensor"))
                .query(&[("ip", ip), ("port", port.as_str())])
                .send()?,
        )?;
        tracing::info!(ip = %ip, port = %port, "sensor address set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_profile_keeps_missing_samples() {
        let body = r#"{"profile":{"x":[0,1,2],"z":[1.5,null,2.0]},"status":"OK"}"#;
        assert_eq!(
            parse_profile_response(body).unwrap(),
            vec![Some(1.5), None, Some(2.0)]
        );
    }

    #[test]
    fn not_connected_is_a_sensor_error() {
        let body = r#"{"profile":[],"status":"Not connected"}"#;
        match parse_profile_response(body) {
            Err(SensorError::Sensor(msg)) => assert_eq!(msg, "Not connected"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            parse_profile_response("<html>"),
            Err(SensorError::Malformed(_))
        ));
        assert!(matches!(
            parse_profile_response(r#"{"profile":[1,2],"status":"OK"}"#),
            Err(SensorError::Malformed(_))
        ));
    }

    #[test]
    fn status_parses_service_payload() {
        let status: SensorStatus =
            serde_json::from_str(r#"{"connected":true,"ip":"10.0.0.2","port":24691}"#).unwrap();
        assert!(status.connected);
        assert_eq!(status.port, 24691);
    }
}
