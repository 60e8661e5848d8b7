//! Alert severity resolution and weather-derived alerts

use crate::models::{Alert, Severity, WeatherSnapshot};

const HEAVY_RAIN_MM: f64 = 2.0;
const STRONG_WIND_MS: f64 = 10.0;
const COLD_C: f64 = -5.0;
const HEAT_C: f64 = 35.0;

/// Worst severity among `alerts`; [`Severity::Low`] when there are none
#[must_use]
pub fn resolve(alerts: &[Alert]) -> Severity {
    alerts
        .iter()
        .map(|alert| alert.severity)
        .max()
        .unwrap_or_default()
}

/// Rule-based alerts for current conditions, in a fixed order:
/// rain, snow, wind, temperature, thunderstorm.
#[must_use]
pub fn derive_from_weather(weather: &WeatherSnapshot) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if weather.rain_1h >= HEAVY_RAIN_MM {
        alerts.push(Alert::new(
            Severity::High,
            "Heavy rain on your route",
            "Expect slower traffic and possible delays due to heavy rainfall.",
            "rain",
        ));
    } else if weather.rain_1h > 0.0 {
        alerts.push(Alert::new(
            Severity::Medium,
            "Light rain",
            "Carry an umbrella. Minor slowdowns are possible.",
            "rain",
        ));
    }

    if weather.snow_1h > 0.0 {
        alerts.push(Alert::new(
            Severity::High,
            "Snow conditions",
            "Snow on the route can cause significant delays.",
            "snow",
        ));
    }

    if weather.wind_speed >= STRONG_WIND_MS {
        alerts.push(Alert::new(
            Severity::Medium,
            "Strong winds",
            "Buses may drive slower in strong wind conditions.",
            "wind",
        ));
    }

    if weather.temp <= COLD_C {
        alerts.push(Alert::new(
            Severity::Medium,
            "Very low temperature",
            "Standing at stops may be uncomfortable.",
            "cold",
        ));
    } else if weather.temp >= HEAT_C {
        alerts.push(Alert::new(
            Severity::Medium,
            "High temperature",
            "Heat may cause discomfort and minor delays.",
            "heat",
        ));
    }

    if weather.weather_main == "Thunderstorm" {
        alerts.push(Alert::new(
            Severity::High,
            "Thunderstorm nearby",
            "Storms can lead to disruptions and delays.",
            "storm",
        ));
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn alert(severity: Severity) -> Alert {
        Alert::new(severity, "t", "m", "test")
    }

    fn weather(temp: f64, wind_speed: f64, rain_1h: f64, snow_1h: f64, main: &str) -> WeatherSnapshot {
        WeatherSnapshot {
            temp,
            feels_like: temp,
            humidity: 50.0,
            wind_speed,
            rain_1h,
            snow_1h,
            weather_main: main.to_string(),
            weather_desc: main.to_lowercase(),
            pressure: None,
            clouds: None,
        }
    }

    #[rstest]
    #[case(vec![Severity::Low, Severity::High, Severity::Medium], Severity::High)]
    #[case(vec![Severity::Low, Severity::Medium], Severity::Medium)]
    #[case(vec![Severity::Low], Severity::Low)]
    #[case(vec![], Severity::Low)]
    fn test_resolve(#[case] severities: Vec<Severity>, #[case] expected: Severity) {
        let alerts: Vec<Alert> = severities.into_iter().map(alert).collect();
        assert_eq!(resolve(&alerts), expected);
    }

    #[test]
    fn test_calm_weather_has_no_alerts() {
        assert!(derive_from_weather(&weather(18.0, 3.0, 0.0, 0.0, "Clear")).is_empty());
    }

    #[rstest]
    #[case(weather(10.0, 0.0, 2.0, 0.0, "Rain"), "Heavy rain on your route", Severity::High)]
    #[case(weather(10.0, 0.0, 0.3, 0.0, "Rain"), "Light rain", Severity::Medium)]
    #[case(weather(-1.0, 0.0, 0.0, 0.1, "Snow"), "Snow conditions", Severity::High)]
    #[case(weather(10.0, 10.0, 0.0, 0.0, "Clouds"), "Strong winds", Severity::Medium)]
    #[case(weather(-5.0, 0.0, 0.0, 0.0, "Clear"), "Very low temperature", Severity::Medium)]
    #[case(weather(35.0, 0.0, 0.0, 0.0, "Clear"), "High temperature", Severity::Medium)]
    #[case(weather(20.0, 0.0, 0.0, 0.0, "Thunderstorm"), "Thunderstorm nearby", Severity::High)]
    fn test_single_rule(
        #[case] snapshot: WeatherSnapshot,
        #[case] title: &str,
        #[case] severity: Severity,
    ) {
        let alerts = derive_from_weather(&snapshot);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].title, title);
        assert_eq!(alerts[0].severity, severity);
    }

    #[test]
    fn test_rules_fire_in_order() {
        let alerts = derive_from_weather(&weather(-8.0, 12.0, 5.0, 1.0, "Thunderstorm"));
        let kinds: Vec<&str> = alerts.iter().filter_map(|a| a.kind.as_deref()).collect();
        assert_eq!(kinds, ["rain", "snow", "wind", "cold", "storm"]);
        assert_eq!(resolve(&alerts), Severity::High);
    }
}
