//! Filter expressions for the database query endpoint.
//!
//! A filter is a tree of `and` / `or` compounds over property predicates,
//! serialized to the JSON shape the query endpoint expects:
//!
//! ```json
//! {"and": [{"property": "Done", "checkbox": {"equals": false}}, ...]}
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

pub const DONE: &str = "Done";
pub const ACTION_TAGS: &str = "Action Tags";
pub const DELEGATED_TO: &str = "Delegated To";
pub const HORIZON: &str = "Horizon";
pub const DEPENDS_ON: &str = "⚠Depends on";
pub const BLOCKED: &str = "Blocked?";
pub const SCHEDULED: &str = "Scheduled";

pub const HORIZON_IMMEDIATE: &str = "Immediate";
pub const TAG_ACTION: &str = "Action";

/// Predicate applied to a single named property.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    CheckboxEquals(bool),
    SelectEquals(String),
    SelectIsEmpty,
    RichTextIsEmpty,
    RelationIsEmpty,
    /// Rollup matches when any rolled-up rich text equals the value.
    RollupAnyRichTextEquals(String),
    /// ISO 8601 date or datetime.
    DateEquals(String),
    DateIsEmpty,
}

impl Condition {
    /// The property type key and the predicate body.
    fn to_json(&self) -> (&'static str, Value) {
        match self {
            Self::CheckboxEquals(v) => ("checkbox", json!({ "equals": v })),
            Self::SelectEquals(v) => ("select", json!({ "equals": v })),
            Self::SelectIsEmpty => ("select", json!({ "is_empty": true })),
            Self::RichTextIsEmpty => ("rich_text", json!({ "is_empty": true })),
            Self::RelationIsEmpty => ("relation", json!({ "is_empty": true })),
            Self::RollupAnyRichTextEquals(v) => {
                ("rollup", json!({ "any": { "rich_text": { "equals": v } } }))
            }
            Self::DateEquals(v) => ("date", json!({ "equals": v })),
            Self::DateIsEmpty => ("date", json!({ "is_empty": true })),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Property { name: String, condition: Condition },
}

impl Filter {
    pub fn property(name: &str, condition: Condition) -> Self {
        Self::Property { name: name.to_string(), condition }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::And(clauses) => {
                json!({ "and": clauses.iter().map(Filter::to_json).collect::<Vec<_>>() })
            }
            Self::Or(clauses) => {
                json!({ "or": clauses.iter().map(Filter::to_json).collect::<Vec<_>>() })
            }
            Self::Property { name, condition } => {
                let (kind, body) = condition.to_json();
                let mut obj = serde_json::Map::new();
                obj.insert("property".to_string(), Value::String(name.clone()));
                obj.insert(kind.to_string(), body);
                Value::Object(obj)
            }
        }
    }
}

/// Open, undelegated, immediate actions that are not blocked.
///
/// The last `or` branch compares `Scheduled` against `now` at millisecond
/// precision, so in practice it never matches. It is kept so the query stays
/// identical to what the database views were built against.
pub fn actions(now: DateTime<Utc>) -> Filter {
    Filter::And(vec![
        Filter::property(DONE, Condition::CheckboxEquals(false)),
        Filter::property(ACTION_TAGS, Condition::SelectEquals(TAG_ACTION.to_string())),
        Filter::property(DELEGATED_TO, Condition::RichTextIsEmpty),
        Filter::property(HORIZON, Condition::SelectEquals(HORIZON_IMMEDIATE.to_string())),
        Filter::Or(vec![
            Filter::property(DEPENDS_ON, Condition::RelationIsEmpty),
            Filter::property(BLOCKED, Condition::RollupAnyRichTextEquals("0".to_string())),
            Filter::property(SCHEDULED, Condition::DateIsEmpty),
            Filter::property(
                SCHEDULED,
                Condition::DateEquals(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ),
        ]),
    ])
}

/// Open, immediate entries that have not been tagged yet.
pub fn untagged() -> Filter {
    Filter::And(vec![
        Filter::property(ACTION_TAGS, Condition::SelectIsEmpty),
        Filter::property(HORIZON, Condition::SelectEquals(HORIZON_IMMEDIATE.to_string())),
        Filter::property(DONE, Condition::CheckboxEquals(false)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_property_json() {
        let f = Filter::property(DONE, Condition::CheckboxEquals(false));
        assert_eq!(f.to_json(), json!({ "property": "Done", "checkbox": { "equals": false } }));
    }

    #[test]
    fn test_rollup_json() {
        let f = Filter::property(BLOCKED, Condition::RollupAnyRichTextEquals("0".into()));
        assert_eq!(
            f.to_json(),
            json!({
                "property": "Blocked?",
                "rollup": { "any": { "rich_text": { "equals": "0" } } },
            })
        );
    }

    #[test]
    fn test_actions_filter() {
        let now = Utc.with_ymd_and_hms(2026, 10, 14, 6, 30, 0).unwrap();
        let expected = json!({
            "and": [
                { "property": "Done", "checkbox": { "equals": false } },
                { "property": "Action Tags", "select": { "equals": "Action" } },
                { "property": "Delegated To", "rich_text": { "is_empty": true } },
                { "property": "Horizon", "select": { "equals": "Immediate" } },
                { "or": [
                    { "property": "⚠Depends on", "relation": { "is_empty": true } },
                    {
                        "property": "Blocked?",
                        "rollup": { "any": { "rich_text": { "equals": "0" } } },
                    },
                    { "property": "Scheduled", "date": { "is_empty": true } },
                    { "property": "Scheduled", "date": { "equals": "2026-10-14T06:30:00.000Z" } },
                ]},
            ]
        });
        assert_eq!(actions(now).to_json(), expected);
    }

    #[test]
    fn test_untagged_filter() {
        let expected = json!({
            "and": [
                { "property": "Action Tags", "select": { "is_empty": true } },
                { "property": "Horizon", "select": { "equals": "Immediate" } },
                { "property": "Done", "checkbox": { "equals": false } },
            ]
        });
        assert_eq!(untagged().to_json(), expected);
    }
}
