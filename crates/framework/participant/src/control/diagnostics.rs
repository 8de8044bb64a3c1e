use ptf_domain::Capability;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;

/// Named, capability-tagged snapshot of one control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlDiagnostics {
    pub capability: Capability,
    pub control_name: String,
    /// Zero-padded implementation version, e.g. `"002"`.
    pub control_knob_version: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
}

impl ControlDiagnostics {
    #[must_use]
    pub fn new(capability: Capability, control_name: &str, version: u32) -> Self {
        Self {
            capability,
            control_name: control_name.to_owned(),
            control_knob_version: format!("{version:03}"),
            fields: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, key: &str, value: impl Display) -> Self {
        self.fields.insert(key.to_owned(), value.to_string());
        self
    }

    /// Adds the field only when a value is present.
    #[must_use]
    pub fn field_opt(self, key: &str, value: Option<impl Display>) -> Self {
        match value {
            Some(value) => self.field(key, value),
            None => self,
        }
    }
}
