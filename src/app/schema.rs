//! TOML schema files for the `setup` subcommand.
//!
//! ```toml
//! [[attributes]]
//! identifier = "Temperature"
//! type = "float32"
//! descr = "Temperature"
//! unit = "°C"
//! softLimits = [-40, 60]
//!
//! [[virtual_channels]]
//! identifier = "100"
//! name = "Weather"
//! attributes = ["AbsDateTime", "Temperature"]
//! prop = ["STREAM"]
//! ```

use super::config::ConfigError;
use crate::domain::{Attribute, Setup, VirtualChannel, to_identifier};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct AttributeEntry {
    identifier: String,
    #[serde(flatten)]
    attribute: Attribute,
}

#[derive(Debug, Deserialize)]
struct VirtualChannelEntry {
    identifier: String,
    #[serde(flatten)]
    virtual_channel: VirtualChannel,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SchemaFile {
    attributes: Vec<AttributeEntry>,
    virtual_channels: Vec<VirtualChannelEntry>,
}

pub fn parse_schema(content: &str) -> Result<Setup, ConfigError> {
    let file: SchemaFile = toml::from_str(content)?;

    let attributes = file
        .attributes
        .into_iter()
        .map(|entry| {
            let identifier = to_identifier(&entry.identifier);
            if identifier != entry.identifier {
                return Err(ConfigError::InvalidConfig(format!(
                    "Invalid attribute identifier '{}', use '{}'",
                    entry.identifier, identifier
                )));
            }
            Ok(Attribute {
                identifier,
                ..entry.attribute
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let virtual_channels = file
        .virtual_channels
        .into_iter()
        .map(|entry| VirtualChannel {
            identifier: entry.identifier,
            ..entry.virtual_channel
        })
        .collect();

    let setup = Setup::new(attributes, virtual_channels);
    check_unique(&setup)?;
    Ok(setup)
}

pub fn load_schema<P: AsRef<Path>>(path: P) -> Result<Setup, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_schema(&content)
}

fn check_unique(setup: &Setup) -> Result<(), ConfigError> {
    let mut seen = std::collections::HashSet::new();
    if let Some(duplicate) = setup
        .attributes
        .iter()
        .find(|a| !seen.insert(a.identifier.as_str()))
    {
        return Err(ConfigError::InvalidConfig(format!(
            "Duplicate attribute '{}'",
            duplicate.identifier
        )));
    }

    let mut seen = std::collections::HashSet::new();
    if let Some(duplicate) = setup
        .virtual_channels
        .iter()
        .find(|vc| !seen.insert(vc.identifier.as_str()))
    {
        return Err(ConfigError::InvalidConfig(format!(
            "Duplicate virtual channel '{}'",
            duplicate.identifier
        )));
    }

    Ok(())
}
