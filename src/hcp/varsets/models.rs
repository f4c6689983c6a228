//! Variable set data models

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::hcp::traits::NamedResource;

/// Variable set item as returned by the list endpoint
#[derive(Deserialize, Debug, Clone)]
pub struct VarsetItem {
    pub id: String,
    pub attributes: VarsetAttributes,
}

#[derive(Deserialize, Debug, Clone)]
pub struct VarsetAttributes {
    pub name: String,
}

impl NamedResource for VarsetItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.attributes.name
    }
}

/// Organization-scoped variable set identity
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct VariableSet {
    pub name: String,
    pub id: String,
}

impl VariableSet {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }

    /// Name used for artifact files: spaces become hyphens
    pub fn sanitized_name(&self) -> String {
        self.name.replace(' ', "-")
    }
}

impl From<(String, String)> for VariableSet {
    fn from((name, id): (String, String)) -> Self {
        Self { name, id }
    }
}

/// Assign every variable set a unique artifact key
///
/// The key is the sanitized name. When several variable sets share a
/// sanitized name (e.g. "Foo Bar" and "Foo-Bar"), every member of that
/// group is keyed `{sanitized}-{id}` instead, so no artifact overwrites
/// another. Returns the keyed sets ordered by key and the sanitized names
/// that collided.
pub fn disambiguate_artifact_names(
    varsets: &[VariableSet],
) -> (Vec<(String, VariableSet)>, Vec<String>) {
    let mut groups: BTreeMap<String, Vec<&VariableSet>> = BTreeMap::new();
    for varset in varsets {
        groups.entry(varset.sanitized_name()).or_default().push(varset);
    }

    let mut keyed = Vec::with_capacity(varsets.len());
    let mut collisions = Vec::new();
    for (sanitized, members) in groups {
        if members.len() == 1 {
            keyed.push((sanitized, members[0].clone()));
            continue;
        }
        for member in members {
            keyed.push((format!("{}-{}", sanitized, member.id), member.clone()));
        }
        collisions.push(sanitized);
    }

    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    (keyed, collisions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_name_replaces_spaces() {
        let varset = VariableSet::new("Shared Secrets", "vs-9");
        assert_eq!(varset.sanitized_name(), "Shared-Secrets");
    }

    #[test]
    fn test_sanitized_name_only_touches_spaces() {
        let varset = VariableSet::new("aws_creds/prod", "vs-1");
        assert_eq!(varset.sanitized_name(), "aws_creds/prod");
    }

    #[test]
    fn test_varset_item_deserialize() {
        let item: VarsetItem = serde_json::from_value(serde_json::json!({
            "id": "varset-abc",
            "type": "varsets",
            "attributes": {"name": "Shared Secrets", "global": false}
        }))
        .unwrap();
        assert_eq!(item.name(), "Shared Secrets");
        assert_eq!(item.id(), "varset-abc");
    }

    #[test]
    fn test_disambiguate_without_collisions() {
        let varsets = vec![
            VariableSet::new("Zed", "vs-2"),
            VariableSet::new("Shared Secrets", "vs-9"),
        ];
        let (keyed, collisions) = disambiguate_artifact_names(&varsets);
        assert!(collisions.is_empty());
        let keys: Vec<&str> = keyed.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["Shared-Secrets", "Zed"]);
    }

    #[test]
    fn test_disambiguate_colliding_names_get_id_suffix() {
        let varsets = vec![
            VariableSet::new("Foo Bar", "vs-1"),
            VariableSet::new("Foo-Bar", "vs-2"),
            VariableSet::new("Other", "vs-3"),
        ];
        let (keyed, collisions) = disambiguate_artifact_names(&varsets);
        assert_eq!(collisions, vec!["Foo-Bar".to_string()]);
        let keys: Vec<&str> = keyed.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["Foo-Bar-vs-1", "Foo-Bar-vs-2", "Other"]);
        assert_eq!(keyed[0].1.name, "Foo Bar");
        assert_eq!(keyed[1].1.name, "Foo-Bar");
    }
}
