//! Routing of object types to output documents.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::warn;

/// Group used when exactly one object type was requested explicitly.
pub const CUSTOM_GROUP: &str = "custom";

/// Group used for object types missing from the grouping table.
pub const OTHER_GROUP: &str = "other";

/// What the user asked to generate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Group(String),
    Objects(Vec<String>),
}

impl Selection {
    /// Build a selection from CLI flags; explicit objects win over a group.
    pub fn from_args(group: Option<String>, objects: Vec<String>) -> Self {
        if !objects.is_empty() {
            Selection::Objects(objects)
        } else if let Some(group) = group {
            Selection::Group(group)
        } else {
            Selection::All
        }
    }

    fn is_single_object(&self) -> bool {
        matches!(self, Selection::Objects(objects) if objects.len() == 1)
    }
}

/// The object types of one output document, in fetch order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPlan {
    pub group: String,
    pub objects: Vec<String>,
}

/// Static group → object types table plus its inverse.
#[derive(Debug, Clone, Default)]
pub struct Grouping {
    groups: IndexMap<String, Vec<String>>,
    object_to_group: HashMap<String, String>,
}

impl Grouping {
    pub fn new(groups: IndexMap<String, Vec<String>>) -> Self {
        let mut object_to_group = HashMap::new();
        for (group, objects) in &groups {
            for object in objects {
                object_to_group.insert(object.clone(), group.clone());
            }
        }
        Self {
            groups,
            object_to_group,
        }
    }

    /// The configured group of an object type, if any.
    pub fn group_of(&self, object_type: &str) -> Option<&str> {
        self.object_to_group.get(object_type).map(String::as_str)
    }

    /// The group recorded on a normalized schema.
    pub fn resolve_group(&self, object_type: &str, selection: &Selection) -> String {
        if selection.is_single_object() {
            return CUSTOM_GROUP.to_string();
        }
        self.group_of(object_type)
            .unwrap_or(OTHER_GROUP)
            .to_string()
    }

    /// Split a selection into per-document fetch plans.
    ///
    /// A group missing from the table falls back to every configured group.
    pub fn plan(&self, selection: &Selection) -> Vec<GroupPlan> {
        match selection {
            Selection::Objects(objects) => {
                let mut by_group: IndexMap<String, Vec<String>> = IndexMap::new();
                for object in objects {
                    let group = self.group_of(object).unwrap_or(CUSTOM_GROUP);
                    by_group
                        .entry(group.to_string())
                        .or_default()
                        .push(object.clone());
                }
                by_group
                    .into_iter()
                    .map(|(group, objects)| GroupPlan { group, objects })
                    .collect()
            }
            Selection::Group(group) => match self.groups.get(group) {
                Some(objects) => vec![GroupPlan {
                    group: group.clone(),
                    objects: objects.clone(),
                }],
                None => {
                    warn!("Unknown object group '{group}', generating all groups");
                    self.plan_all()
                }
            },
            Selection::All => self.plan_all(),
        }
    }

    fn plan_all(&self) -> Vec<GroupPlan> {
        self.groups
            .iter()
            .map(|(group, objects)| GroupPlan {
                group: group.clone(),
                objects: objects.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grouping() -> Grouping {
        let mut groups = IndexMap::new();
        groups.insert(
            "dns".to_string(),
            vec!["record:a".to_string(), "zone_auth".to_string()],
        );
        groups.insert("dhcp".to_string(), vec!["range".to_string()]);
        Grouping::new(groups)
    }

    #[test]
    fn test_single_object_is_custom() {
        let selection = Selection::Objects(vec!["record:a".to_string()]);
        assert_eq!(grouping().resolve_group("record:a", &selection), "custom");
    }

    #[test]
    fn test_lookup_and_fallback() {
        let g = grouping();
        assert_eq!(g.resolve_group("range", &Selection::All), "dhcp");
        assert_eq!(g.resolve_group("grid", &Selection::All), "other");

        let selection = Selection::Objects(vec!["record:a".to_string(), "grid".to_string()]);
        assert_eq!(g.resolve_group("record:a", &selection), "dns");
    }

    #[test]
    fn test_plan_all_keeps_config_order() {
        let plans = grouping().plan(&Selection::All);
        let names: Vec<_> = plans.iter().map(|p| p.group.as_str()).collect();
        assert_eq!(names, ["dns", "dhcp"]);
        assert_eq!(plans[0].objects, ["record:a", "zone_auth"]);
    }

    #[test]
    fn test_plan_objects_routes_by_table() {
        let selection = Selection::Objects(vec![
            "range".to_string(),
            "grid".to_string(),
            "record:a".to_string(),
            "member".to_string(),
        ]);
        let plans = grouping().plan(&selection);
        assert_eq!(
            plans,
            vec![
                GroupPlan {
                    group: "dhcp".to_string(),
                    objects: vec!["range".to_string()],
                },
                GroupPlan {
                    group: "custom".to_string(),
                    objects: vec!["grid".to_string(), "member".to_string()],
                },
                GroupPlan {
                    group: "dns".to_string(),
                    objects: vec!["record:a".to_string()],
                },
            ]
        );
    }

    #[test]
    fn test_plan_known_group() {
        let plans = grouping().plan(&Selection::Group("dhcp".to_string()));
        assert_eq!(
            plans,
            vec![GroupPlan {
                group: "dhcp".to_string(),
                objects: vec!["range".to_string()],
            }]
        );
    }

    #[test]
    fn test_plan_unknown_group_falls_back_to_all() {
        let g = grouping();
        let plans = g.plan(&Selection::Group("nope".to_string()));
        assert_eq!(plans, g.plan(&Selection::All));
    }

    #[test]
    fn test_selection_from_args() {
        assert_eq!(Selection::from_args(None, vec![]), Selection::All);
        assert_eq!(
            Selection::from_args(Some("dns".to_string()), vec![]),
            Selection::Group("dns".to_string())
        );
        assert_eq!(
            Selection::from_args(Some("dns".to_string()), vec!["grid".to_string()]),
            Selection::Objects(vec!["grid".to_string()])
        );
    }
}
