use crate::models::{Observation, WeatherReport};

const RULE_WIDTH: usize = 50;
const WRAP_WIDTH: usize = 50;

/// Formats a weather report for the terminal
pub fn format_report(report: &WeatherReport) -> String {
    let rule = "─".repeat(RULE_WIDTH);
    let mut output = format!("\n{rule}\nWeather Data\n{rule}\n");
    output.push_str(&format_observation(&report.weather));
    output.push_str(&format!("\n{rule}\nAI Description\n{rule}\n"));
    output.push_str(&wrap_text(&report.description, WRAP_WIDTH));
    output.push('\n');
    output
}

/// Formats an observation as aligned label/value rows; zero-valued optional fields are skipped
pub fn format_observation(weather: &Observation) -> String {
    let unit = display_unit(&weather.wind_speed_unit);
    let mut rows: Vec<(&str, String)> = vec![(
        "Temperature",
        format!("{:.1}\u{00b0}F", weather.temperature),
    )];

    if weather.feels_like > 0.0 {
        rows.push(("Feels Like", format!("{:.1}\u{00b0}F", weather.feels_like)));
    }
    rows.push(("Conditions", weather.conditions.clone()));
    rows.push(("Humidity", format!("{}%", weather.humidity)));
    if weather.wind_speed > 0.0 {
        rows.push(("Wind Speed", format!("{:.1} {}", weather.wind_speed, unit)));
    }
    if !weather.wind_direction.is_empty() {
        rows.push(("Wind Direction", weather.wind_direction.clone()));
    }
    if weather.wind_gust > 0.0 {
        rows.push(("Wind Gust", format!("{:.1} {}", weather.wind_gust, unit)));
    }
    if weather.visibility > 0.0 {
        rows.push(("Visibility", format!("{:.1} miles", weather.visibility)));
    }
    if weather.pressure > 0.0 {
        rows.push(("Pressure", format!("{:.1} mb", weather.pressure)));
    }
    if weather.dew_point > 0.0 {
        rows.push(("Dew Point", format!("{:.1}\u{00b0}F", weather.dew_point)));
    }
    if weather.uv_index > 0.0 {
        rows.push(("UV Index", format!("{:.1}", weather.uv_index)));
    }
    if weather.cloud_cover > 0 {
        rows.push(("Cloud Cover", format!("{}%", weather.cloud_cover)));
    }
    if weather.precipitation_chance > 0 {
        rows.push(("Precipitation", format!("{}%", weather.precipitation_chance)));
    }
    rows.push(("Last Updated", weather.timestamp.clone()));

    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0) + 3;
    rows.iter()
        .map(|(label, value)| format!("{:<width$}{}\n", format!("{label}:"), value))
        .collect()
}

/// "wmoUnit:km_h-1" -> "km/h"
fn display_unit(unit_code: &str) -> &str {
    match unit_code.strip_prefix("wmoUnit:").unwrap_or(unit_code) {
        "km_h-1" => "km/h",
        "m_s-1" => "m/s",
        other => other,
    }
}

/// Greedy word wrap; words longer than `width` get their own line
pub fn wrap_text(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + word.chars().count() < width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if lines.is_empty() {
        return text.to_string();
    }
    lines.join("\n")
}
