pub mod common;
pub mod pod;
pub mod resource;
pub mod resource_usage;
pub mod sim_spec;
