use serde::{Deserialize, Serialize};

/// Speech backend settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Program to run per sentence; autodetected from PATH when unset
    pub command: Option<String>,

    /// Extra arguments placed before the sentence text
    pub args: Vec<String>,

    /// Voice name passed to the backend
    pub voice: Option<String>,

    /// Speaking rate, in the backend's own units
    pub rate: Option<u32>,
}
