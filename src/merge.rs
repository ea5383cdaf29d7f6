use crate::skeleton::Skeleton;
use serde_json::{Map, Value};

/// A skeleton with document values substituted in.
///
/// An `Object` has exactly the keys of the skeleton it was merged from. A
/// `Null` stands for a required value the document left out or set to null.
#[derive(Clone, Debug, PartialEq)]
pub enum Merged<'a> {
    Null,
    Value(&'a Value),
    Object(Vec<(&'static str, Merged<'a>)>),
}

impl From<&Skeleton> for Merged<'_> {
    fn from(skeleton: &Skeleton) -> Self {
        match skeleton {
            Skeleton::Null => Merged::Null,
            Skeleton::Object(entries) => Merged::Object(
                entries
                    .iter()
                    .map(|(name, node)| (*name, Merged::from(node)))
                    .collect(),
            ),
        }
    }
}

impl<'a> Merged<'a> {
    /// The node reached by following `path` through object entries.
    pub fn get(&self, path: &[&str]) -> Option<&Merged<'a>> {
        path.iter().try_fold(self, |node, key| match node {
            Merged::Object(entries) => entries
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, node)| node),
            _ => None,
        })
    }

    /// Whether this node is, or contains, a required value the document
    /// left out.
    pub fn is_missing(&self) -> bool {
        match self {
            Merged::Null => true,
            Merged::Value(_) => false,
            Merged::Object(entries) => entries.iter().any(|(_, node)| node.is_missing()),
        }
    }
}

/// Overlays `document` onto `skeleton`. Document keys the skeleton doesn't
/// know about are dropped.
pub fn merge<'a>(skeleton: &Skeleton, document: &'a Map<String, Value>) -> Merged<'a> {
    let entries = skeleton
        .entries()
        .iter()
        .map(|(name, node)| {
            let merged = match document.get(*name) {
                // A leaf skeleton merges against an empty object, so a
                // nested map with no required keys comes out empty.
                Some(Value::Object(object)) => merge(node, object),
                Some(Value::Null) => Merged::from(node),
                Some(value) => Merged::Value(value),
                // A missing nested record collapses to a single null rather
                // than a tree of them.
                None => Merged::Null,
            };

            (*name, merged)
        })
        .collect();

    Merged::Object(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn address() -> Skeleton {
        Skeleton::Object(vec![("street", Skeleton::Null), ("zip", Skeleton::Null)])
    }

    fn person() -> Skeleton {
        Skeleton::Object(vec![("name", Skeleton::Null), ("address", address())])
    }

    fn object(value: &Value) -> &Map<String, Value> {
        value.as_object().unwrap()
    }

    #[test]
    fn merge_complete_document() {
        let document = json!({
            "name": "a",
            "address": { "street": "b", "zip": 1 },
        });

        assert_eq!(
            Merged::Object(vec![
                ("name", Merged::Value(&json!("a"))),
                (
                    "address",
                    Merged::Object(vec![
                        ("street", Merged::Value(&json!("b"))),
                        ("zip", Merged::Value(&json!(1))),
                    ])
                ),
            ]),
            merge(&person(), object(&document))
        );
    }

    #[test]
    fn merge_drops_unknown_keys() {
        let document = json!({ "name": "a", "extra": "b", "address": { "street": "c", "zip": "d", "more": 1 } });

        match merge(&person(), object(&document)) {
            Merged::Object(entries) => {
                let names: Vec<_> = entries.iter().map(|(name, _)| *name).collect();
                assert_eq!(vec!["name", "address"], names);
            }
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn merge_missing_nested_record_collapses() {
        let document = json!({ "name": "a" });

        assert_eq!(
            Merged::Object(vec![
                ("name", Merged::Value(&json!("a"))),
                ("address", Merged::Null),
            ]),
            merge(&person(), object(&document))
        );
    }

    #[test]
    fn merge_null_nested_record_keeps_skeleton() {
        let document = json!({ "name": "a", "address": null });

        assert_eq!(
            Merged::Object(vec![
                ("name", Merged::Value(&json!("a"))),
                (
                    "address",
                    Merged::Object(vec![("street", Merged::Null), ("zip", Merged::Null)])
                ),
            ]),
            merge(&person(), object(&document))
        );
    }

    #[test]
    fn merge_partial_nested_record() {
        let document = json!({ "name": "a", "address": { "street": "b", "zip": null } });

        assert_eq!(
            Merged::Object(vec![
                ("name", Merged::Value(&json!("a"))),
                (
                    "address",
                    Merged::Object(vec![
                        ("street", Merged::Value(&json!("b"))),
                        ("zip", Merged::Null),
                    ])
                ),
            ]),
            merge(&person(), object(&document))
        );
    }

    #[test]
    fn merge_object_into_leaf() {
        let skeleton = Skeleton::Object(vec![("labels", Skeleton::Null)]);
        let document = json!({ "labels": { "a": "b" } });

        assert_eq!(
            Merged::Object(vec![("labels", Merged::Object(vec![]))]),
            merge(&skeleton, object(&document))
        );
    }

    #[test]
    fn merge_scalar_over_nested_record() {
        let document = json!({ "name": "a", "address": "somewhere" });

        assert_eq!(
            Merged::Object(vec![
                ("name", Merged::Value(&json!("a"))),
                ("address", Merged::Value(&json!("somewhere"))),
            ]),
            merge(&person(), object(&document))
        );
    }

    #[test]
    fn merged_lookup() {
        let document = json!({ "name": "a", "address": { "street": "b" } });
        let merged = merge(&person(), object(&document));

        assert_eq!(Some(&Merged::Null), merged.get(&["address", "zip"]));
        assert_eq!(
            Some(&Merged::Value(&json!("a"))),
            merged.get(&["name"])
        );
        assert_eq!(None, merged.get(&["name", "first"]));
        assert_eq!(None, merged.get(&["extra"]));
        assert_eq!(Some(&merged), merged.get(&[]));
    }

    #[test]
    fn merged_is_missing() {
        let document = json!({ "name": "a", "address": { "street": "b" } });
        let merged = merge(&person(), object(&document));

        assert!(merged.is_missing());
        assert!(merged.get(&["address"]).unwrap().is_missing());
        assert!(!merged.get(&["name"]).unwrap().is_missing());
        assert!(!merged.get(&["address", "street"]).unwrap().is_missing());
        assert!(!Merged::Object(vec![]).is_missing());
    }

    #[test]
    fn merge_keeps_present_falsy_values() {
        let skeleton = Skeleton::Object(vec![
            ("flag", Skeleton::Null),
            ("count", Skeleton::Null),
            ("text", Skeleton::Null),
            ("list", Skeleton::Null),
        ]);
        let document = json!({ "flag": false, "count": 0, "text": "", "list": [] });

        assert_eq!(
            Merged::Object(vec![
                ("flag", Merged::Value(&json!(false))),
                ("count", Merged::Value(&json!(0))),
                ("text", Merged::Value(&json!(""))),
                ("list", Merged::Value(&json!([]))),
            ]),
            merge(&skeleton, object(&document))
        );
    }
}
