use serde::Deserialize;
use std::path::Path;

use crate::error::GeneratorError;
use crate::model::{ComputationMethod, NO_COMPU_METHOD, Session, Variable};

/// Variable definitions read from a JSON config file
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ConfigFile {
    #[serde(default)]
    compu_methods: Vec<CompuMethodEntry>,
    #[serde(default)]
    measurements: Vec<VariableEntry>,
    #[serde(default)]
    characteristics: Vec<VariableEntry>,
}

#[derive(Debug, Deserialize)]
struct CompuMethodEntry {
    name: String,
    formula: String,
    unit: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct VariableEntry {
    name: String,
    address: AddressValue,
    datatype: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    unit: String,
    #[serde(default = "default_lower_limit")]
    lower_limit: f64,
    #[serde(default = "default_upper_limit")]
    upper_limit: f64,
    #[serde(default = "default_conversion")]
    conversion: String,
}

// addresses may be given as numbers or as strings, e.g. "0x20001000"
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AddressValue {
    Number(u32),
    Text(String),
}

fn default_lower_limit() -> f64 {
    0.0
}

fn default_upper_limit() -> f64 {
    100.0
}

fn default_conversion() -> String {
    NO_COMPU_METHOD.to_string()
}

/// The fully converted content of a config file, ready to be added to a session
#[derive(Debug, Default)]
pub(crate) struct ConfigItems {
    pub(crate) compu_methods: Vec<ComputationMethod>,
    pub(crate) measurements: Vec<Variable>,
    pub(crate) characteristics: Vec<Variable>,
}

impl ConfigItems {
    /// Add all items to the session. Nothing can fail at this point, so the session either
    /// receives all items of the config or (if loading failed earlier) none of them.
    pub(crate) fn apply(self, session: &mut Session) {
        session.compu_methods.extend(self.compu_methods);
        session.measurements.extend(self.measurements);
        session.characteristics.extend(self.characteristics);
    }

    pub(crate) fn len(&self) -> usize {
        self.compu_methods.len() + self.measurements.len() + self.characteristics.len()
    }
}

pub(crate) fn load_config_file(path: &Path) -> Result<ConfigItems, GeneratorError> {
    let text = std::fs::read_to_string(path).map_err(|source| GeneratorError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    load_config_str(&text, &format!("\"{}\"", path.display()))
}

pub(crate) fn load_config_str(text: &str, origin: &str) -> Result<ConfigItems, GeneratorError> {
    let config: ConfigFile =
        serde_json::from_str(text).map_err(|source| GeneratorError::ConfigParse {
            origin: origin.to_string(),
            source,
        })?;
    config.into_items()
}

/// Load a config file and add its content to the session.
/// The session is not modified if the file cannot be loaded.
pub(crate) fn load_into_session(path: &Path, session: &mut Session) -> Result<usize, GeneratorError> {
    let items = load_config_file(path)?;
    let count = items.len();
    items.apply(session);
    Ok(count)
}

impl ConfigFile {
    fn into_items(self) -> Result<ConfigItems, GeneratorError> {
        let compu_methods = self
            .compu_methods
            .into_iter()
            .map(|cm| ComputationMethod {
                name: cm.name,
                formula: cm.formula,
                unit: cm.unit,
                description: cm.description,
            })
            .collect();
        let measurements = self
            .measurements
            .into_iter()
            .map(VariableEntry::into_variable)
            .collect::<Result<Vec<_>, _>>()?;
        let characteristics = self
            .characteristics
            .into_iter()
            .map(VariableEntry::into_variable)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ConfigItems {
            compu_methods,
            measurements,
            characteristics,
        })
    }
}

impl VariableEntry {
    fn into_variable(self) -> Result<Variable, GeneratorError> {
        let address = match self.address {
            AddressValue::Number(address) => address,
            AddressValue::Text(text) => parse_address(&text).ok_or(GeneratorError::InvalidAddress {
                name: self.name.clone(),
                value: text,
            })?,
        };
        Ok(Variable {
            name: self.name,
            address,
            datatype: self.datatype,
            description: self.description,
            unit: self.unit,
            lower_limit: self.lower_limit,
            upper_limit: self.upper_limit,
            conversion: self.conversion,
        })
    }
}

fn parse_address(text: &str) -> Option<u32> {
    let text = text.trim();
    if let Some(hex) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16).ok()
    } else {
        text.parse::<u32>().ok()
    }
}
