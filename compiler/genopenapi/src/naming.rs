//! Definition names.
//!
//! A type is named after the shortest suffix of its fully-qualified name that
//! is unique across the registry, using at least the last two components:
//! `.google.rpc.Status` becomes `rpcStatus`, `.shop.v1.Item.Detail` becomes
//! `ItemDetail`.

use std::collections::HashMap;

use descriptor::Registry;

/// Precomputed fully-qualified name → definition name table.
#[derive(Debug, Default)]
pub struct DefinitionNamer {
    names: HashMap<String, String>,
}

impl DefinitionNamer {
    /// Name every message and enum in `registry`.
    pub fn new(registry: &Registry) -> Self {
        let fqns: Vec<&str> = registry
            .files()
            .iter()
            .flat_map(|f| {
                let messages = f.messages.iter().map(|m| m.fqn.as_str());
                messages.chain(f.enums.iter().map(|e| e.fqn.as_str()))
            })
            .collect();
        Self::from_fqns(&fqns)
    }

    /// Name the given fully-qualified names.
    pub fn from_fqns(fqns: &[&str]) -> Self {
        let split: Vec<Vec<&str>> =
            fqns.iter().map(|fqn| fqn.trim_start_matches('.').split('.').collect()).collect();

        let mut suffix_counts: HashMap<&[&str], usize> = HashMap::new();
        for parts in &split {
            for depth in 1..=parts.len() {
                *suffix_counts.entry(&parts[parts.len() - depth..]).or_default() += 1;
            }
        }

        let mut depths: Vec<usize> = split
            .iter()
            .map(|parts| {
                let mut depth = parts.len().min(2);
                while depth < parts.len() && suffix_counts[&parts[parts.len() - depth..]] > 1 {
                    depth += 1;
                }
                depth
            })
            .collect();

        // Concatenated suffixes can still coincide (`.a.v1.Item` and `.av1Item`).
        // Colliding names take one more component; a name that has none left is
        // written out with dots.
        let mut dotted = vec![false; split.len()];
        loop {
            let mut owners: HashMap<String, Vec<usize>> = HashMap::new();
            for (i, parts) in split.iter().enumerate() {
                owners.entry(render(parts, depths[i], dotted[i])).or_default().push(i);
            }
            let mut changed = false;
            for group in owners.values().filter(|group| group.len() > 1) {
                for &i in group {
                    if depths[i] < split[i].len() {
                        depths[i] += 1;
                        changed = true;
                    } else if !dotted[i] {
                        dotted[i] = true;
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }

        let names = fqns
            .iter()
            .zip(&split)
            .enumerate()
            .map(|(i, (fqn, parts))| (fqn.to_string(), render(parts, depths[i], dotted[i])))
            .collect();
        Self { names }
    }

    /// Definition name for `fqn`. Unknown names fall back to their last component.
    pub fn name(&self, fqn: &str) -> String {
        match self.names.get(fqn) {
            Some(name) => name.clone(),
            None => fqn.rsplit('.').next().unwrap_or(fqn).to_string(),
        }
    }
}

fn render(parts: &[&str], depth: usize, dotted: bool) -> String {
    if dotted {
        parts.join(".")
    } else {
        parts[parts.len() - depth..].concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_component_names() {
        let namer = DefinitionNamer::from_fqns(&[
            ".google.rpc.Status",
            ".google.protobuf.Any",
            ".shop.v1.Item",
            ".shop.v1.Item.Detail",
            ".TopLevel",
        ]);
        assert_eq!(namer.name(".google.rpc.Status"), "rpcStatus");
        assert_eq!(namer.name(".google.protobuf.Any"), "protobufAny");
        assert_eq!(namer.name(".shop.v1.Item"), "v1Item");
        assert_eq!(namer.name(".shop.v1.Item.Detail"), "ItemDetail");
        assert_eq!(namer.name(".TopLevel"), "TopLevel");
    }

    #[test]
    fn test_collisions_take_more_context() {
        let namer = DefinitionNamer::from_fqns(&[".a.v1.Item", ".b.v1.Item", ".c.v2.Item"]);
        assert_eq!(namer.name(".a.v1.Item"), "av1Item");
        assert_eq!(namer.name(".b.v1.Item"), "bv1Item");
        assert_eq!(namer.name(".c.v2.Item"), "v2Item");
    }

    #[test]
    fn test_concatenated_suffixes_stay_distinct() {
        let namer = DefinitionNamer::from_fqns(&[".a.v1.Item", ".v1Item", ".av1Item"]);
        let names = [namer.name(".a.v1.Item"), namer.name(".v1Item"), namer.name(".av1Item")];
        assert_eq!(names[0], "a.v1.Item");
        assert_eq!(names[1], "v1Item");
        assert_eq!(names[2], "av1Item");
    }

    #[test]
    fn test_unknown_name_falls_back() {
        let namer = DefinitionNamer::default();
        assert_eq!(namer.name(".x.y.Z"), "Z");
    }
}
