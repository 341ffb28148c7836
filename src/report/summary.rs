//! Aggregated view of a spec: how long it runs and how much of every resource its phases declare.

use std::collections::BTreeMap;

use average::{concatenate, Estimate, Max, Mean, Min};
use serde::Serialize;

use crate::core::resource::list::ResourceName;
use crate::core::sim_spec::Spec;

concatenate!(Estimator, [Min, min], [Max, max], [Mean, mean]);

#[derive(Debug, Serialize, PartialEq)]
pub struct ResourceStats {
    /// Number of phases declaring the resource.
    pub phases: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SpecSummary {
    pub phase_count: usize,
    pub total_seconds: u64,
    pub resources: BTreeMap<ResourceName, ResourceStats>,
}

impl SpecSummary {
    /// Statistics are per phase, not weighted by phase duration. Phases which don't declare a
    /// resource are not counted for it.
    pub fn from_spec(spec: &Spec) -> Self {
        let mut estimators: BTreeMap<&str, (usize, Estimator)> = BTreeMap::new();
        for phase in spec {
            for (name, quantity) in phase.resource_usage.iter() {
                let (count, estimator) = estimators
                    .entry(name.as_str())
                    .or_insert_with(|| (0, Estimator::new()));
                *count += 1;
                estimator.add(quantity.as_f64());
            }
        }

        let resources = estimators
            .into_iter()
            .map(|(name, (phases, estimator))| {
                (
                    name.to_string(),
                    ResourceStats {
                        phases,
                        min: estimator.min(),
                        max: estimator.max(),
                        mean: estimator.mean(),
                    },
                )
            })
            .collect();

        Self {
            phase_count: spec.len(),
            total_seconds: spec.total_seconds(),
            resources,
        }
    }
}
