//! Resource usage model driven by the phases of a pod's `simSpec`.

use log::debug;

use crate::core::resource::list::ResourceName;
use crate::core::resource_usage::interface::ResourceUsageModel;
use crate::core::sim_spec::Spec;

struct UsageUnit {
    duration: f64,
    usage: f64,
}

/// Usage of a single resource of a pod started at `start_time`. Phases are passed through once,
/// after the last one the pod consumes nothing.
/// ```
/// use kubernetriks_simspec::core::resource_usage::interface::ResourceUsageModel;
/// use kubernetriks_simspec::core::resource_usage::phased::PhasedResourceUsageModel;
/// use kubernetriks_simspec::parse_spec_yaml;
///
/// let spec = parse_spec_yaml("
/// - seconds: 30
///   resourceUsage: {cpu: 500m}
/// - seconds: 60
///   resourceUsage: {cpu: 1}
/// ").unwrap();
/// let mut model = PhasedResourceUsageModel::new(&spec, "cpu", 100.0);
///
/// assert_eq!(0.5, model.current_usage(110.0));
/// assert_eq!(1.0, model.current_usage(130.0));
/// assert_eq!(0.0, model.current_usage(190.0));
/// ```
pub struct PhasedResourceUsageModel {
    resource: ResourceName,
    usage_sequence: Vec<UsageUnit>,
    current_idx_in_sequence: usize,
    current_unit_start_time: f64,
    last_poll_time: f64,
}

impl PhasedResourceUsageModel {
    pub fn new(spec: &Spec, resource: &str, start_time: f64) -> Self {
        let usage_sequence = spec
            .iter()
            .map(|phase| UsageUnit {
                duration: f64::from(phase.seconds),
                usage: phase
                    .resource_usage
                    .get(resource)
                    .map(|quantity| quantity.as_f64())
                    .unwrap_or(0.0),
            })
            .collect();

        let mut model = Self {
            resource: resource.to_string(),
            usage_sequence,
            current_idx_in_sequence: 0,
            current_unit_start_time: start_time,
            last_poll_time: start_time,
        };

        model.step_usage_until_current_time(start_time);

        model
    }

    pub fn is_finished(&self) -> bool {
        self.current_idx_in_sequence >= self.usage_sequence.len()
    }

    fn step_usage_until_current_time(&mut self, time: f64) {
        while let Some(unit) = self.usage_sequence.get(self.current_idx_in_sequence) {
            if self.current_unit_start_time + unit.duration > time {
                break;
            }
            self.current_unit_start_time += unit.duration;
            self.current_idx_in_sequence += 1;
            debug!(
                "{} usage moved to phase {} at {}",
                self.resource, self.current_idx_in_sequence, self.current_unit_start_time
            );
        }
    }
}

impl ResourceUsageModel for PhasedResourceUsageModel {
    /// Time must be monotonically increasing for subsequent calls of this method.
    fn current_usage(&mut self, time: f64) -> f64 {
        if time < self.last_poll_time {
            panic!(
                "Trying to get current usage of time which is behind last poll time: {} vs {}",
                time, self.last_poll_time
            )
        }
        self.last_poll_time = time;
        self.step_usage_until_current_time(time);

        self.usage_sequence
            .get(self.current_idx_in_sequence)
            .map(|unit| unit.usage)
            .unwrap_or(0.0)
    }
}
