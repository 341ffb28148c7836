//! Metadata shared by simulated objects.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    // Free-form entries, `simSpec` among them.
    #[serde(default)]
    pub annotations: HashMap<String, String>,
}
