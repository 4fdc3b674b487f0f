use std::fmt::Write;

use crate::constants::FEATURE_NAMES;
use crate::models::{PredictionResult, WeatherSnapshot};

/// What the index view reports below the form.
pub enum IndexOutcome<'a> {
    Prediction(&'a PredictionResult),
    Error(&'a str),
}

/// Human-readable label for a feature input.
fn feature_label(name: &str) -> &'static str {
    match name {
        "temperature" => "Temperature (°C)",
        "max_temperature" => "Max temperature (°C)",
        "min_temperature" => "Min temperature (°C)",
        "sea_level_pressure" => "Sea-level pressure (hPa)",
        "humidity" => "Humidity (%)",
        "visibility_km" => "Visibility (km)",
        "wind_speed" => "Wind speed (m/s)",
        "max_wind_gust" => "Max wind gust (m/s)",
        _ => "Unknown field",
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n<nav><a href=\"/\">Predict</a> | <a href=\"/information\">Information</a></nav>\n{}</body>\n</html>\n",
        escape_html(title),
        body
    )
}

/// Renders the prediction form, optionally pre-filled from live weather.
pub fn format_index(weather: Option<&WeatherSnapshot>, outcome: Option<IndexOutcome<'_>>) -> String {
    let mut body = String::from("<h1>PM2.5 Prediction for Heart Patients</h1>\n");

    if let Some(w) = weather {
        let _ = writeln!(
            body,
            "<p class=\"weather\">Current conditions in {}: {:.1}\u{00b0}C, humidity {:.0}%, visibility {:.1} km</p>",
            escape_html(&w.location),
            w.temperature,
            w.humidity,
            w.visibility_km
        );
    }

    let prefill = weather.map(WeatherSnapshot::to_feature_vector);
    body.push_str("<form action=\"/predict\" method=\"post\">\n");
    for name in FEATURE_NAMES {
        let value = prefill
            .and_then(|fv| fv.get(name))
            .map(|v| format!(" value=\"{v}\""))
            .unwrap_or_default();
        let _ = writeln!(
            body,
            "<label>{} <input type=\"text\" name=\"{}\" required{}></label><br>",
            feature_label(name),
            name,
            value
        );
    }
    body.push_str("<button type=\"submit\">Predict</button>\n</form>\n");

    match outcome {
        Some(IndexOutcome::Prediction(result)) => {
            let _ = writeln!(
                body,
                "<div class=\"result\">\n<p>Predicted PM2.5: {}</p>\n<p>Risk category: {}</p>\n<p>Advice: {}</p>\n</div>",
                result.pm25,
                escape_html(result.risk_category()),
                escape_html(&result.advice)
            );
        }
        Some(IndexOutcome::Error(message)) => {
            let _ = writeln!(body, "<p class=\"error\">{}</p>", escape_html(message));
        }
        None => {}
    }

    page("PM2.5 Prediction", &body)
}

/// Static page describing the risk tiers.
pub fn format_information() -> String {
    use crate::risk::{AdvisoryCatalog, RiskTier};

    let bounds = ["0 - 12.0", "12.1 - 35.4", "35.5 - 55.4", "55.5 - 150.4", "150.5 - 250.4", "above 250.4"];

    let mut body = String::from(
        "<h1>About PM2.5</h1>\n<p>PM2.5 is fine particulate matter smaller than 2.5 micrometres. \
         It penetrates deep into the lungs and bloodstream and is linked to heart attacks, \
         arrhythmia and heart failure.</p>\n<table>\n<tr><th>PM2.5 (\u{00b5}g/m\u{00b3})</th><th>Category</th><th>Advice for heart patients</th></tr>\n",
    );
    for (tier, range) in RiskTier::ALL.iter().zip(bounds) {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            range,
            escape_html(tier.as_str()),
            escape_html(AdvisoryCatalog::advise(*tier))
        );
    }
    body.push_str("</table>\n");

    page("Information", &body)
}
