//! Resource usage timeline of a simulated pod, read from its `simSpec` annotation.
//!
//! The annotation holds a YAML list of execution phases, each lasting `seconds` and consuming the
//! declared resources:
//! ```
//! use kubernetriks_simspec::parse_spec_yaml;
//!
//! let spec = parse_spec_yaml(
//!     r#"
//! - seconds: 30
//!   resourceUsage: {cpu: "500m", memory: "256Mi"}
//! - seconds: 60
//!   resourceUsage: {cpu: "1", memory: "512Mi"}
//! "#,
//! )
//! .unwrap();
//!
//! assert_eq!(2, spec.len());
//! assert_eq!(90, spec.total_seconds());
//! assert_eq!(500, spec.phases()[0].resource_usage["cpu"].milli_value());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::core::pod::Pod;
use crate::core::resource::list::{build_resource_list, ResourceList, ResourceName};
use crate::core::resource::quantity::{QuantityError, QuantityTextVisitor};

/// Annotation key holding the phases of a simulated pod.
pub const SIM_SPEC_ANNOTATION: &str = "simSpec";

/// Coarse classification of `SpecError` for reporting to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The pod carries no spec at all.
    InvalidArgument,
    /// The spec is not a list of phases.
    MalformedInput,
    /// Some phase does not declare its resource usage.
    IncompletePhase,
    /// Some declared quantity can't be parsed.
    InvalidQuantity,
}

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("{key} annotation not defined")]
    AnnotationNotDefined { key: &'static str },
    #[error(transparent)]
    Decode(#[from] serde_yaml::Error),
    #[error("invalid spec.resourceUsage field")]
    InvalidResourceUsageField { phase: usize },
    #[error(transparent)]
    InvalidQuantity(#[from] QuantityError),
}

impl SpecError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SpecError::AnnotationNotDefined { .. } => ErrorKind::InvalidArgument,
            SpecError::Decode(_) => ErrorKind::MalformedInput,
            SpecError::InvalidResourceUsageField { .. } => ErrorKind::IncompletePhase,
            SpecError::InvalidQuantity(_) => ErrorKind::InvalidQuantity,
        }
    }
}

/// One execution phase: for `seconds` of simulated time the pod consumes `resource_usage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase {
    pub seconds: u32,
    pub resource_usage: ResourceList,
}

/// Phases of a pod in the order it passes through them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Spec {
    phases: Vec<Phase>,
}

impl Spec {
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn into_phases(self) -> Vec<Phase> {
        self.phases
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Phase> {
        self.phases.iter()
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn total_seconds(&self) -> u64 {
        self.phases.iter().map(|p| u64::from(p.seconds)).sum()
    }

    /// Phase which is running `elapsed` seconds after the pod has started, with its index.
    /// Every phase covers `[start, start + seconds)`, so zero-length phases are never returned.
    /// None once all phases are over.
    pub fn phase_at(&self, elapsed: u64) -> Option<(usize, &Phase)> {
        let mut phase_end = 0u64;
        for (idx, phase) in self.phases.iter().enumerate() {
            phase_end += u64::from(phase.seconds);
            if elapsed < phase_end {
                return Some((idx, phase));
            }
        }
        None
    }

    pub fn is_finished(&self, elapsed: u64) -> bool {
        elapsed >= self.total_seconds()
    }

    /// Encodes back into the annotation format with canonical quantities.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

impl<'a> IntoIterator for &'a Spec {
    type Item = &'a Phase;
    type IntoIter = std::slice::Iter<'a, Phase>;

    fn into_iter(self) -> Self::IntoIter {
        self.phases.iter()
    }
}

impl Serialize for Spec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.phases.iter().map(|phase| RawPhase {
            seconds: phase.seconds,
            resource_usage: Some(
                phase
                    .resource_usage
                    .iter()
                    .map(|(name, quantity)| (name.clone(), QuantityText(quantity.to_string())))
                    .collect(),
            ),
        }))
    }
}

/// Phase as written by the user, before validation. `resource_usage` stays None both when the
/// field is missing and when it is an explicit null.
#[derive(Debug, Deserialize, Serialize)]
struct RawPhase {
    seconds: u32,
    #[serde(rename = "resourceUsage", default)]
    resource_usage: Option<BTreeMap<ResourceName, QuantityText>>,
}

/// Quantity string not parsed yet. Bare numbers (`cpu: 1`) are taken verbatim.
#[derive(Debug)]
struct QuantityText(String);

impl<'de> Deserialize<'de> for QuantityText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_any(QuantityTextVisitor)
            .map(QuantityText)
    }
}

impl Serialize for QuantityText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Reads the `simSpec` annotation of the pod and parses it.
pub fn parse_spec(pod: &Pod) -> Result<Spec, SpecError> {
    let spec_annotation = pod
        .metadata
        .annotations
        .get(SIM_SPEC_ANNOTATION)
        .ok_or(SpecError::AnnotationNotDefined {
            key: SIM_SPEC_ANNOTATION,
        })?;

    parse_spec_yaml(spec_annotation)
}

/// Parses a YAML list of phases. Stops at the first phase without resource usage or with an
/// invalid quantity. A blank or null document is an empty list.
pub fn parse_spec_yaml(spec_yaml: &str) -> Result<Spec, SpecError> {
    if spec_yaml.trim().is_empty() {
        return Ok(Spec::default());
    }
    let raw_phases: Vec<RawPhase> =
        serde_yaml::from_str::<Option<Vec<RawPhase>>>(spec_yaml)?.unwrap_or_default();

    let mut phases = Vec::with_capacity(raw_phases.len());
    for (idx, raw_phase) in raw_phases.into_iter().enumerate() {
        let raw_usage = raw_phase
            .resource_usage
            .ok_or(SpecError::InvalidResourceUsageField { phase: idx })?;

        let raw_usage: BTreeMap<ResourceName, String> = raw_usage
            .into_iter()
            .map(|(name, text)| (name, text.0))
            .collect();
        let resource_usage = build_resource_list(&raw_usage)?;

        phases.push(Phase {
            seconds: raw_phase.seconds,
            resource_usage,
        });
    }

    Ok(Spec { phases })
}

#[cfg(test)]
mod tests {
    use super::{parse_spec_yaml, ErrorKind, Spec, SpecError};
    use crate::core::resource::quantity::Quantity;

    fn spec_of(seconds: &[u32]) -> Spec {
        let yaml: String = seconds
            .iter()
            .map(|s| format!("- seconds: {}\n  resourceUsage: {{}}\n", s))
            .collect();
        parse_spec_yaml(&yaml).unwrap()
    }

    #[test]
    fn test_empty_list_is_empty_spec() {
        let spec = parse_spec_yaml("[]").unwrap();
        assert!(spec.is_empty());
        assert_eq!(0, spec.total_seconds());
        assert!(spec.phase_at(0).is_none());
        assert!(spec.is_finished(0));
    }

    #[test]
    fn test_empty_resource_usage_is_valid() {
        let spec = parse_spec_yaml("- seconds: 5\n  resourceUsage: {}").unwrap();
        assert_eq!(1, spec.len());
        assert!(spec.phases()[0].resource_usage.is_empty());
    }

    #[test]
    fn test_bare_numbers_are_quantities() {
        let spec = parse_spec_yaml("- seconds: 5\n  resourceUsage: {cpu: 2, memory: 1024}").unwrap();
        let usage = &spec.phases()[0].resource_usage;
        assert_eq!(Quantity::from_milli(2000), usage["cpu"]);
        assert_eq!(1024, usage["memory"].value());
    }

    #[test]
    fn test_repeated_resource_key_last_wins() {
        let spec = parse_spec_yaml(
            "
- seconds: 1
  resourceUsage:
    cpu: \"1\"
    cpu: \"2\"
",
        )
        .unwrap();
        assert_eq!(1, spec.phases()[0].resource_usage.len());
        assert_eq!(2, spec.phases()[0].resource_usage["cpu"].value());
    }

    #[test]
    fn test_blank_or_null_annotation_is_empty_spec() {
        for input in ["", "   \n", "null", "~", "[]"] {
            let spec = parse_spec_yaml(input).unwrap();
            assert!(spec.is_empty(), "input: {:?}", input);
        }
    }

    #[test]
    fn test_null_resource_usage() {
        let err = parse_spec_yaml("- seconds: 5\n  resourceUsage: null").unwrap_err();
        assert!(matches!(err, SpecError::InvalidResourceUsageField { phase: 0 }));
        assert_eq!("invalid spec.resourceUsage field", err.to_string());
    }

    #[test]
    fn test_negative_seconds_are_rejected() {
        let err = parse_spec_yaml("- seconds: -5\n  resourceUsage: {}").unwrap_err();
        assert_eq!(ErrorKind::MalformedInput, err.kind());
    }

    #[test]
    fn test_non_list_inputs_are_malformed() {
        for input in [
            "seconds: 5",
            "- seconds: five\n  resourceUsage: {}",
            "- resourceUsage: {}",
            "- seconds: 5\n  resourceUsage: [cpu]",
            "- seconds: 5\n  resourceUsage: {cpu: \"1\"",
        ] {
            let err = parse_spec_yaml(input).unwrap_err();
            assert_eq!(ErrorKind::MalformedInput, err.kind(), "input: {:?}", input);
        }
    }

    #[test]
    fn test_decode_error_carries_location() {
        let err = parse_spec_yaml("- seconds: 1\n  resourceUsage: {}\n- seconds: x\n").unwrap_err();
        match err {
            SpecError::Decode(decode_err) => {
                let location = decode_err.location().unwrap();
                assert_eq!(3, location.line());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_phase_at() {
        let spec = spec_of(&[10, 0, 5]);

        assert_eq!(0, spec.phase_at(0).unwrap().0);
        assert_eq!(0, spec.phase_at(9).unwrap().0);
        // zero-length phase 1 is skipped
        assert_eq!(2, spec.phase_at(10).unwrap().0);
        assert_eq!(2, spec.phase_at(14).unwrap().0);
        assert!(spec.phase_at(15).is_none());
        assert!(!spec.is_finished(14));
        assert!(spec.is_finished(15));
    }

    #[test]
    fn test_to_yaml_uses_canonical_quantities() {
        let spec = parse_spec_yaml("- seconds: 3\n  resourceUsage: {cpu: \"0.5\"}").unwrap();
        let yaml = spec.to_yaml().unwrap();
        assert!(yaml.contains("resourceUsage"));
        assert!(yaml.contains("500m"));
        assert_eq!(spec, parse_spec_yaml(&yaml).unwrap());
    }
}
