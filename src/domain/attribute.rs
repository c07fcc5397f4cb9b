use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Value type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    #[serde(rename = "dateTime")]
    DateTime,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float32,
    Float64,
    String,
}

/// Scale used by the dashboard when plotting an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagramScale {
    #[serde(rename = "lin")]
    Linear,
    #[serde(rename = "log")]
    Logarithmic,
}

/// Soft limits (low/high) for validation and visualization; either bound may be open.
///
/// Encoded as a two-element JSON array. Bounds keep the JSON number they were
/// decoded from, so `[900, 1100]` and `[0.0, 1100.0]` both survive a
/// decode/encode cycle unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SoftLimits(pub Option<Number>, pub Option<Number>);

impl SoftLimits {
    /// Integral bounds are stored as JSON integers, others as floats.
    /// Non-finite bounds are left open.
    pub fn new(low: Option<f64>, high: Option<f64>) -> Self {
        Self(limit_number(low), limit_number(high))
    }

    pub fn low(&self) -> Option<f64> {
        self.0.as_ref().and_then(Number::as_f64)
    }

    pub fn high(&self) -> Option<f64> {
        self.1.as_ref().and_then(Number::as_f64)
    }
}

// Largest integer an f64 represents exactly
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn limit_number(value: Option<f64>) -> Option<Number> {
    let value = value?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        Some(Number::from(value as i64))
    } else {
        Number::from_f64(value)
    }
}

/// Attribute / channel definition.
///
/// On the wire an attribute is a field map keyed by its identifier:
///
/// ```json
/// {
///     "AbsDateTime": {
///         "descr": "Absolute time UTC",
///         "type": "dateTime",
///         "format": "YYYY-MM-DDThh:mm:ss.ssssssZ",
///         "softLimits": [0, null],
///         "diagramScale": "lin"
///     }
/// }
/// ```
///
/// The serde representation of this struct is the inner field map; optional
/// fields that are `None` are omitted rather than written as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Unique identifier (alphanumeric and "_", max. 32 chars)
    #[serde(skip)]
    pub identifier: String,
    #[serde(rename = "descr", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Measurement unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    /// Format string, e.g. %s for strings, %d for integers, %.2f for floats
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "softLimits", default, skip_serializing_if = "Option::is_none")]
    pub soft_limits: Option<SoftLimits>,
    #[serde(rename = "diagramScale", default, skip_serializing_if = "Option::is_none")]
    pub diagram_scale: Option<DiagramScale>,
}

impl Attribute {
    pub fn new(identifier: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            identifier: identifier.into(),
            description: None,
            unit: None,
            attribute_type,
            format: None,
            soft_limits: None,
            diagram_scale: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_soft_limits(mut self, low: Option<f64>, high: Option<f64>) -> Self {
        self.soft_limits = Some(SoftLimits::new(low, high));
        self
    }

    pub fn with_diagram_scale(mut self, diagram_scale: DiagramScale) -> Self {
        self.diagram_scale = Some(diagram_scale);
        self
    }

    /// Create an attribute from its identifier and parsed JSON field map.
    pub fn from_value(
        identifier: impl Into<String>,
        fields: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        let mut attribute: Self = serde_json::from_value(fields)?;
        attribute.identifier = identifier.into();
        Ok(attribute)
    }

    /// Field map for the JSON representation (without the identifier key).
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
