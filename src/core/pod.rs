//! Type definition for simulated Pod primitive

use serde::{Deserialize, Serialize};

use crate::core::common::ObjectMeta;
use crate::core::resource::list::ResourceList;
use crate::core::sim_spec::{parse_spec, Spec, SpecError, SIM_SPEC_ANNOTATION};

#[derive(Default, Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct Resources {
    #[serde(default)]
    pub limits: ResourceList,
    #[serde(default)]
    pub requests: ResourceList,
}

#[derive(Default, Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PodSpec {
    /// Simplified: instead of vector of containers - one container with resources
    #[serde(default)]
    pub resources: Resources,
}

#[derive(Default, Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct Pod {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: PodSpec,
}

impl Pod {
    pub fn new(name: String, requests: ResourceList) -> Self {
        Self {
            metadata: ObjectMeta {
                name,
                ..Default::default()
            },
            spec: PodSpec {
                resources: Resources {
                    limits: requests.clone(),
                    requests,
                },
            },
        }
    }

    pub fn with_annotation(mut self, key: &str, value: &str) -> Self {
        self.metadata
            .annotations
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Shortcut for attaching a `simSpec` annotation.
    pub fn with_sim_spec(self, spec_yaml: &str) -> Self {
        self.with_annotation(SIM_SPEC_ANNOTATION, spec_yaml)
    }

    pub fn sim_spec(&self) -> Result<Spec, SpecError> {
        parse_spec(self)
    }
}
