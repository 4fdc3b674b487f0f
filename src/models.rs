use serde::{Deserialize, Serialize};

use crate::constants::FEATURE_NAMES;
use crate::error::InputError;
use crate::risk::RiskTier;

// ============================================================================
// OpenWeatherMap API Models
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CurrentWeatherResponse {
    pub name: Option<String>,
    pub main: Option<MainReadings>,
    /// Metres
    pub visibility: Option<f64>,
    pub wind: Option<WindReadings>,
}

#[derive(Debug, Deserialize)]
pub struct MainReadings {
    pub temp: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub pressure: Option<f64>,
    pub sea_level: Option<f64>,
    pub humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct WindReadings {
    pub speed: Option<f64>,
    pub gust: Option<f64>,
}

/// Current conditions for one location, already in model units.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub location: String,
    pub temperature: f64,
    pub max_temperature: f64,
    pub min_temperature: f64,
    pub sea_level_pressure: f64,
    pub humidity: f64,
    pub visibility_km: f64,
    pub wind_speed: f64,
    pub max_wind_gust: f64,
}

impl WeatherSnapshot {
    pub fn to_feature_vector(&self) -> FeatureVector {
        FeatureVector([
            self.temperature,
            self.max_temperature,
            self.min_temperature,
            self.sea_level_pressure,
            self.humidity,
            self.visibility_km,
            self.wind_speed,
            self.max_wind_gust,
        ])
    }
}

// ============================================================================
// Feature Vector
// ============================================================================

/// Model input, held in training order (see [`FEATURE_NAMES`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; FEATURE_NAMES.len()]);

impl FeatureVector {
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Pairs each value with its feature name, in training order.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.0.iter().copied())
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.named().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Builds a vector from form fields. Every value must parse as a finite float.
    pub fn from_form(fields: &[(String, String)]) -> Result<Self, InputError> {
        let mut slots: [Option<f64>; FEATURE_NAMES.len()] = [None; FEATURE_NAMES.len()];

        for (key, raw) in fields {
            let index = feature_index(key)?;
            if slots[index].is_some() {
                return Err(InputError::DuplicateField(key.clone()));
            }
            let value = raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| InputError::NotNumeric {
                    field: key.clone(),
                    value: raw.clone(),
                })?;
            slots[index] = Some(value);
        }

        Self::from_slots(slots)
    }

    /// Builds a vector from a JSON object body keyed by feature name.
    ///
    /// Field order in the object is irrelevant; the named schema decides placement.
    /// A key repeated in the object is rejected as in form mode.
    pub fn from_json_slice(body: &[u8]) -> Result<Self, InputError> {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| InputError::MalformedBody(e.to_string()))?;
        if !value.is_object() {
            return Err(InputError::NotAnObject);
        }
        let JsonFields(fields) = serde_json::from_slice(body)
            .map_err(|e| InputError::MalformedBody(e.to_string()))?;

        let mut slots: [Option<f64>; FEATURE_NAMES.len()] = [None; FEATURE_NAMES.len()];
        for (key, value) in &fields {
            let index = feature_index(key)?;
            if slots[index].is_some() {
                return Err(InputError::DuplicateField(key.clone()));
            }
            let number = value.as_f64().ok_or_else(|| InputError::NotNumeric {
                field: key.clone(),
                value: value.to_string(),
            })?;
            slots[index] = Some(number);
        }

        Self::from_slots(slots)
    }

    fn from_slots(slots: [Option<f64>; FEATURE_NAMES.len()]) -> Result<Self, InputError> {
        let mut values = [0.0; FEATURE_NAMES.len()];
        for (i, slot) in slots.iter().enumerate() {
            values[i] = slot.ok_or(InputError::MissingField(FEATURE_NAMES[i]))?;
        }
        Ok(Self(values))
    }
}

fn feature_index(key: &str) -> Result<usize, InputError> {
    FEATURE_NAMES
        .iter()
        .position(|name| *name == key)
        .ok_or_else(|| InputError::UnexpectedField(key.to_string()))
}

/// Top-level object entries in document order, repeats kept.
struct JsonFields(Vec<(String, serde_json::Value)>);

impl<'de> Deserialize<'de> for JsonFields {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldsVisitor;

        impl<'de> serde::de::Visitor<'de> for FieldsVisitor {
            type Value = JsonFields;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: serde::de::MapAccess<'de>>(self, mut map: A) -> Result<JsonFields, A::Error> {
                let mut fields = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, serde_json::Value>()? {
                    fields.push(entry);
                }
                Ok(JsonFields(fields))
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(FEATURE_NAMES.len()))?;
        for (name, value) in self.named() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

// ============================================================================
// Prediction Results
// ============================================================================

/// Outcome of one successful model invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub pm25: f64,
    /// `None` when classification faulted; rendered as "Unknown".
    pub tier: Option<RiskTier>,
    pub advice: String,
}

impl PredictionResult {
    pub fn risk_category(&self) -> &'static str {
        RiskTier::label_of(self.tier)
    }
}

/// JSON body returned by `/predict_api` on success.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ApiPrediction {
    pub pm25: f64,
    pub risk_category: String,
    pub advice: String,
}

impl From<&PredictionResult> for ApiPrediction {
    fn from(result: &PredictionResult) -> Self {
        Self {
            pm25: result.pm25,
            risk_category: result.risk_category().to_string(),
            advice: result.advice.clone(),
        }
    }
}

/// JSON body returned by `/predict_api` on failure.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ApiError {
    pub error: String,
}
