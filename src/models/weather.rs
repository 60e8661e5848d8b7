//! Weather snapshot attached to planned routes

use serde::{Deserialize, Deserializer, Serialize};

/// Current conditions near the trip origin
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// Temperature in Celsius
    pub temp: f64,
    /// Perceived temperature in Celsius
    pub feels_like: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Rain volume over the last hour in mm
    #[serde(default, deserialize_with = "zero_if_null")]
    pub rain_1h: f64,
    /// Snow volume over the last hour in mm
    #[serde(default, deserialize_with = "zero_if_null")]
    pub snow_1h: f64,
    /// Condition group, e.g. "Rain" or "Thunderstorm"
    pub weather_main: String,
    /// Human-readable description of the conditions
    pub weather_desc: String,
    /// Atmospheric pressure in hPa
    #[serde(default)]
    pub pressure: Option<f64>,
    /// Cloud cover percentage
    #[serde(default)]
    pub clouds: Option<f64>,
}

fn zero_if_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

impl WeatherSnapshot {
    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C (feels like {:.1}°C)", self.temp, self.feels_like)
    }

    /// Format wind information
    #[must_use]
    pub fn format_wind(&self) -> String {
        format!("{:.1} m/s", self.wind_speed)
    }

    #[must_use]
    pub fn is_precipitating(&self) -> bool {
        self.rain_1h > 0.0 || self.snow_1h > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_precipitation_defaults_to_zero() {
        let weather: WeatherSnapshot = serde_json::from_str(
            r#"{"temp": 3.2, "feels_like": 0.4, "humidity": 80, "wind_speed": 4.1,
                "weather_main": "Clouds", "weather_desc": "overcast clouds"}"#,
        )
        .unwrap();
        assert_eq!(weather.rain_1h, 0.0);
        assert_eq!(weather.snow_1h, 0.0);
        assert!(!weather.is_precipitating());
    }

    #[test]
    fn test_null_precipitation_defaults_to_zero() {
        let weather: WeatherSnapshot = serde_json::from_str(
            r#"{"temp": 3.2, "feels_like": 0.4, "humidity": 80, "wind_speed": 4.1,
                "rain_1h": null, "weather_main": "Clouds", "weather_desc": "overcast"}"#,
        )
        .unwrap();
        assert_eq!(weather.rain_1h, 0.0);
    }

    #[test]
    fn test_zero_values_are_kept() {
        let weather: WeatherSnapshot = serde_json::from_str(
            r#"{"temp": 0, "feels_like": 0, "humidity": 0, "wind_speed": 0,
                "rain_1h": 0, "snow_1h": 0.5, "weather_main": "Snow", "weather_desc": "light snow"}"#,
        )
        .unwrap();
        assert_eq!(weather.temp, 0.0);
        assert_eq!(weather.rain_1h, 0.0);
        assert_eq!(weather.snow_1h, 0.5);
        assert!(weather.is_precipitating());
    }

    #[test]
    fn test_required_fields_enforced() {
        let result: Result<WeatherSnapshot, _> =
            serde_json::from_str(r#"{"temp": 3.2, "weather_main": "Clear"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_formatting() {
        let weather = WeatherSnapshot {
            temp: 21.04,
            feels_like: 20.5,
            humidity: 30.0,
            wind_speed: 3.26,
            rain_1h: 0.0,
            snow_1h: 0.0,
            weather_main: "Clear".to_string(),
            weather_desc: "clear sky".to_string(),
            pressure: Some(1012.0),
            clouds: None,
        };
        assert_eq!(weather.format_temperature(), "21.0°C (feels like 20.5°C)");
        assert_eq!(weather.format_wind(), "3.3 m/s");
    }
}
