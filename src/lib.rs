//! Parsing of the `simSpec` pod annotation into a typed resource usage timeline for the
//! kubernetriks simulator.

pub mod config;
pub mod core;
pub mod report;

pub use crate::core::pod::Pod;
pub use crate::core::resource::quantity::{Quantity, QuantityError};
pub use crate::core::sim_spec::{
    parse_spec, parse_spec_yaml, ErrorKind, Phase, Spec, SpecError, SIM_SPEC_ANNOTATION,
};
