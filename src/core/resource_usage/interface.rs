//! Interface for resource usage model

/// Resource usage model is a method, which defines load of some resource at the moment `time` which
/// is current simulation time in seconds.
pub trait ResourceUsageModel {
    fn current_usage(&mut self, time: f64) -> f64;
}
