//! Resource lists: named resources mapped to canonical quantities.

use std::collections::BTreeMap;

use crate::core::resource::quantity::{Quantity, QuantityError};

pub const RESOURCE_CPU: &str = "cpu";
pub const RESOURCE_MEMORY: &str = "memory";

/// "cpu", "memory" or any extended resource name.
pub type ResourceName = String;

pub type ResourceList = BTreeMap<ResourceName, Quantity>;

/// Parses every quantity string of `raw`. The first entry (in resource name order) that fails to
/// parse is reported together with its resource name.
pub fn build_resource_list(
    raw: &BTreeMap<ResourceName, String>,
) -> Result<ResourceList, QuantityError> {
    raw.iter()
        .map(|(name, text)| {
            text.parse::<Quantity>()
                .map(|quantity| (name.clone(), quantity))
                .map_err(|err| QuantityError::InvalidEntry {
                    resource: name.clone(),
                    source: Box::new(err),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{build_resource_list, RESOURCE_CPU, RESOURCE_MEMORY};
    use crate::core::resource::quantity::{Quantity, QuantityError};

    fn raw(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_build_resource_list() {
        let list = build_resource_list(&raw(&[
            ("cpu", "1500m"),
            ("memory", "1Gi"),
            ("nvidia.com/gpu", "2"),
        ]))
        .unwrap();

        assert_eq!(3, list.len());
        assert_eq!(Quantity::from_milli(1500), list[RESOURCE_CPU]);
        assert_eq!(1073741824, list[RESOURCE_MEMORY].value());
        assert_eq!(2, list["nvidia.com/gpu"].value());
    }

    #[test]
    fn test_empty_list_is_valid() {
        assert!(build_resource_list(&BTreeMap::new()).unwrap().is_empty());
    }

    #[test]
    fn test_first_invalid_entry_is_reported() {
        let err = build_resource_list(&raw(&[
            ("cpu", "1"),
            ("memory", "lots"),
            ("storage", "also-bad"),
        ]))
        .unwrap_err();

        assert_eq!(
            QuantityError::InvalidEntry {
                resource: "memory".to_string(),
                source: Box::new(QuantityError::InvalidFormat("lots".to_string())),
            },
            err
        );
        assert_eq!(
            "invalid quantity for resource \"memory\": invalid quantity \"lots\": expected a \
             decimal number with an optional suffix",
            err.to_string()
        );
    }
}
