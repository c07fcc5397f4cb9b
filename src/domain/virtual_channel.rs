use serde::{Deserialize, Serialize};

/// Virtual channel / channel group definition.
///
/// JSON field map (keyed by identifier on the wire):
///
/// ```json
/// "1": {
///     "name": "Control Signal",
///     "descr": "Control signal voltage",
///     "attributes": ["AbsDateTime", "DSET", "VOLTAGE"],
///     "prop": ["STREAM", "PAR"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualChannel {
    /// Unique identifier, numeric strings by convention
    #[serde(skip)]
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "descr", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Assigned attribute identifiers, in the order record values are uploaded.
    ///
    /// Entries may also be statistic expressions such as `min(id)`, `max(id)`,
    /// `avg(id)`, `sum(id)`, `stdDev(id)`, `nbVals(id)`, `var(id)` or `deltaT()`.
    pub attributes: Vec<String>,
    /// Property tags interpreted by the server, e.g. `STREAM`, `PAR`, `HIT`, `LOC`, `STAT`
    #[serde(rename = "prop", default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<String>>,
}

impl VirtualChannel {
    pub fn new<I, S>(identifier: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            identifier: identifier.into(),
            name: None,
            description: None,
            attributes: attributes.into_iter().map(Into::into).collect(),
            properties: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties = Some(properties.into_iter().map(Into::into).collect());
        self
    }

    /// Create a virtual channel from its identifier and parsed JSON field map.
    pub fn from_value(
        identifier: impl Into<String>,
        fields: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        let mut virtual_channel: Self = serde_json::from_value(fields)?;
        virtual_channel.identifier = identifier.into();
        Ok(virtual_channel)
    }

    /// Field map for the JSON representation (without the identifier key).
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
