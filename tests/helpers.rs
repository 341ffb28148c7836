use std::collections::BTreeMap;

use kubernetriks_simspec::core::resource::list::ResourceList;
use kubernetriks_simspec::{Pod, Quantity};

pub fn pod_with_sim_spec(name: &str, spec_yaml: &str) -> Pod {
    Pod::new(name.to_string(), Default::default()).with_sim_spec(spec_yaml)
}

pub fn resource_list(entries: &[(&str, &str)]) -> ResourceList {
    entries
        .iter()
        .map(|(name, quantity)| (name.to_string(), quantity.parse::<Quantity>().unwrap()))
        .collect::<BTreeMap<_, _>>()
}
