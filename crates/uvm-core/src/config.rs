// UVM Core - Lender config resource type
//
// A lender config describes one variant of an onboarding flow: the ordered UI
// steps, the baseline UI version and the classification tags used for routing.
// Configs are loaded read-only and never mutated by the analysis.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Well-known tag names
pub mod tag_names {
    pub const PRODUCT_CODE: &str = "product_code";
    pub const LEAD_SOURCE: &str = "lead_source";
    pub const TELCO_CODE: &str = "telco_code";
    pub const FLOW_TYPE: &str = "flow_type";
    pub const ESIGN_FLOW_TYPE: &str = "esign_flow_type";
}

/// A single name/value classification tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Tags of a config, kept both in document order and grouped by name.
///
/// A tag name may repeat to express a multi-valued attribute (several accepted
/// telco codes, several lead sources). The grouped view keeps the values of each
/// name in document order so multiset comparisons and first/last lookups never
/// have to rebuild maps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Tag>", into = "Vec<Tag>")]
pub struct TagSet {
    tags: Vec<Tag>,
    grouped: BTreeMap<String, Vec<String>>,
}

impl TagSet {
    pub fn new(tags: Vec<Tag>) -> Self {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for tag in &tags {
            grouped
                .entry(tag.name.clone())
                .or_default()
                .push(tag.value.clone());
        }
        Self { tags, grouped }
    }

    /// Build a tag set from `(name, value)` pairs
    pub fn from_pairs<N, V>(pairs: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(n, v)| Tag::new(n, v)).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// All values of a tag name, in document order
    pub fn values(&self, name: &str) -> &[String] {
        self.grouped.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First value of a tag name
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values(name).first().map(String::as_str)
    }

    /// Single-valued view of a tag name: the last occurrence wins and an empty
    /// value counts as absent.
    pub fn single(&self, name: &str) -> Option<&str> {
        self.values(name)
            .last()
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn contains(&self, name: &str, value: &str) -> bool {
        self.values(name).iter().any(|v| v == value)
    }

    /// Order-independent multiset comparison of one tag name across two sets
    pub fn same_values(&self, other: &TagSet, name: &str) -> bool {
        let mut left: Vec<&str> = self.values(name).iter().map(String::as_str).collect();
        let mut right: Vec<&str> = other.values(name).iter().map(String::as_str).collect();
        if left.len() != right.len() {
            return false;
        }
        left.sort_unstable();
        right.sort_unstable();
        left == right
    }
}

impl From<Vec<Tag>> for TagSet {
    fn from(tags: Vec<Tag>) -> Self {
        Self::new(tags)
    }
}

impl From<TagSet> for Vec<Tag> {
    fn from(set: TagSet) -> Self {
        set.tags
    }
}

/// LenderConfig - one onboarding flow variant
///
/// Example:
/// ```json
/// {
///   "id": 9054,
///   "name": "v1.0.collect.organic",
///   "tags": [{"name": "lead_source", "value": "organic"}, {"name": "product_code", "value": "P1"}],
///   "ui_version": "v9.1.5.0",
///   "ui_flow": ["otp", "app_form.basic_info", "ekyc.selfie.active"],
///   "weight": 1
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LenderConfig {
    pub id: i64,

    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: TagSet,

    /// Baseline UI version of the flow
    #[serde(default, deserialize_with = "null_as_default")]
    pub ui_version: String,

    /// Ordered UI step tokens
    #[serde(default, deserialize_with = "null_as_default")]
    pub ui_flow: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub ui_flow_settings: serde_json::Map<String, serde_json::Value>,

    /// Traffic weight among configs sharing `name`
    #[serde(default, deserialize_with = "null_as_default")]
    pub weight: i64,

    /// Decision engine wiring, passed through untouched
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub decision_engines: BTreeMap<String, serde_json::Value>,
}

/// `null` reads as the field's default, like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl LenderConfig {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tags: TagSet::default(),
            ui_version: String::new(),
            ui_flow: Vec::new(),
            ui_flow_settings: serde_json::Map::new(),
            weight: 0,
            decision_engines: BTreeMap::new(),
        }
    }

    pub fn with_tags<N, V>(mut self, pairs: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        self.tags = TagSet::from_pairs(pairs);
        self
    }

    pub fn with_ui_version(mut self, version: impl Into<String>) -> Self {
        self.ui_version = version.into();
        self
    }

    pub fn with_ui_flow<S: Into<String>>(mut self, steps: impl IntoIterator<Item = S>) -> Self {
        self.ui_flow = steps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_weight(mut self, weight: i64) -> Self {
        self.weight = weight;
        self
    }

    /// Parse a config from a JSON document
    pub fn from_json(json: &str) -> crate::UvmResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lender_config() {
        let json = r#"{
            "id": 9054,
            "name": "v1.0.collect.organic",
            "tags": [
                {"name": "lead_source", "value": "organic"},
                {"name": "product_code", "value": "P1"},
                {"name": "telco_code", "value": "VT"},
                {"name": "telco_code", "value": "MB"}
            ],
            "ui_version": "v9.1.5.0",
            "ui_flow": ["otp", "app_form.basic_info"],
            "ui_flow_settings": {"otp": {"retries": 3}},
            "decision_engines": {"quick_approval": {"tree_uuid": "abc"}},
            "weight": 1
        }"#;

        let config = LenderConfig::from_json(json).unwrap();
        assert_eq!(config.id, 9054);
        assert_eq!(config.tags.len(), 4);
        assert_eq!(config.tags.values("telco_code"), ["VT", "MB"]);
        assert_eq!(config.tags.first("lead_source"), Some("organic"));
        assert_eq!(config.ui_flow.len(), 2);
        assert!(config.decision_engines.contains_key("quick_approval"));
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let config = LenderConfig::from_json(r#"{"id": 1, "name": "bare"}"#).unwrap();
        assert!(config.tags.is_empty());
        assert!(config.ui_flow.is_empty());
        assert_eq!(config.weight, 0);
    }

    #[test]
    fn test_null_fields_read_as_defaults() {
        let config = LenderConfig::from_json(
            r#"{
                "id": 1,
                "name": "a",
                "tags": null,
                "ui_version": null,
                "ui_flow": null,
                "ui_flow_settings": null,
                "weight": null,
                "decision_engines": null
            }"#,
        )
        .unwrap();

        assert!(config.tags.is_empty());
        assert!(config.ui_version.is_empty());
        assert!(config.ui_flow.is_empty());
        assert!(config.ui_flow_settings.is_empty());
        assert_eq!(config.weight, 0);
        assert!(config.decision_engines.is_empty());
    }

    #[test]
    fn test_tags_serialize_as_list() {
        let config = LenderConfig::new(1, "a").with_tags([("product_code", "P1")]);
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["tags"][0]["name"], "product_code");
        assert_eq!(value["tags"][0]["value"], "P1");
    }

    #[test]
    fn test_single_last_occurrence_wins() {
        let tags = TagSet::from_pairs([("lead_source", "paid"), ("lead_source", "organic")]);
        assert_eq!(tags.first("lead_source"), Some("paid"));
        assert_eq!(tags.single("lead_source"), Some("organic"));

        let empty = TagSet::from_pairs([("product_code", "")]);
        assert_eq!(empty.single("product_code"), None);
    }

    #[test]
    fn test_same_values_ignores_order() {
        let a = TagSet::from_pairs([("telco_code", "VT"), ("telco_code", "MB")]);
        let b = TagSet::from_pairs([("telco_code", "MB"), ("telco_code", "VT")]);
        let c = TagSet::from_pairs([("telco_code", "MB"), ("telco_code", "MB")]);

        assert!(a.same_values(&b, "telco_code"));
        assert!(!a.same_values(&c, "telco_code"));
        assert!(a.same_values(&b, "product_code"));
    }
}
