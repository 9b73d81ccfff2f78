//! Canonical interaction models for the six typologies.
//!
//! Bundles in the wild carry heterogeneous shapes for the same interaction
//! (string arrays, objects with synonym keys, category maps). Everything is
//! coerced here into one canonical model per typology, so validators never see
//! raw JSON.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

const TEXT_KEYS: &[&str] = &["text", "label", "content", "value", "name", "title"];
const ORDER_KEYS: &[&str] = &["order", "position", "index"];
const ORDERING_LIST_KEYS: &[&str] = &["sequence", "steps", "items", "lines"];
const GROUPING_LIST_KEYS: &[&str] = &["groups", "buckets", "clusters"];
const CATEGORY_NAME_KEYS: &[&str] = &["name", "label", "title", "category", "id"];
const ITEM_CATEGORY_KEYS: &[&str] = &["category", "group", "bucket", "cluster"];

//
// ─── CHOICE (multiple_choice / true_false) ─────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    pub id: String,
    pub text: String,
    pub is_correct: bool,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChoiceInteraction {
    pub options: Vec<ChoiceOption>,
}

impl ChoiceInteraction {
    /// Normalizes `options[]`. Options without an `id` get their position as id.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let options = value
            .get("options")
            .and_then(Value::as_array)
            .map(|raw| {
                raw.iter()
                    .enumerate()
                    .filter_map(|(pos, opt)| choice_option(pos, opt))
                    .collect()
            })
            .unwrap_or_default();
        Self { options }
    }

    /// Like [`Self::from_value`], but synthesizes `true`/`false` options from a
    /// boolean `answer` / `correct_answer` when no options are given.
    #[must_use]
    pub fn true_false_from_value(value: &Value) -> Self {
        let normalized = Self::from_value(value);
        if !normalized.options.is_empty() {
            return normalized;
        }
        let answer = ["answer", "correct_answer", "is_true"]
            .iter()
            .find_map(|key| value.get(*key).and_then(as_bool));
        match answer {
            Some(answer) => Self {
                options: vec![
                    ChoiceOption {
                        id: "true".into(),
                        text: "True".into(),
                        is_correct: answer,
                        feedback: None,
                    },
                    ChoiceOption {
                        id: "false".into(),
                        text: "False".into(),
                        is_correct: !answer,
                        feedback: None,
                    },
                ],
            },
            None => normalized,
        }
    }

    #[must_use]
    pub fn option(&self, id: &str) -> Option<&ChoiceOption> {
        self.options.iter().find(|opt| opt.id == id)
    }

    /// At least one option, and at least one of them correct.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.options.iter().any(|opt| opt.is_correct)
    }
}

fn choice_option(pos: usize, value: &Value) -> Option<ChoiceOption> {
    match value {
        Value::Object(obj) => {
            let text = text_of(obj)?;
            let id = obj
                .get("id")
                .and_then(scalar_text)
                .unwrap_or_else(|| pos.to_string());
            let is_correct = obj
                .get("is_correct")
                .or_else(|| obj.get("correct"))
                .and_then(as_bool)
                .unwrap_or(false);
            let feedback = obj
                .get("feedback")
                .and_then(scalar_text)
                .filter(|f| !f.is_empty());
            Some(ChoiceOption {
                id,
                text,
                is_correct,
                feedback,
            })
        }
        other => scalar_text(other).map(|text| ChoiceOption {
            id: pos.to_string(),
            text,
            is_correct: false,
            feedback: None,
        }),
    }
}

//
// ─── FILL GAPS ─────────────────────────────────────────────────────────────────
//

/// One piece of a fill-gaps template, in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TemplatePart {
    Text(String),
    /// Position of the gap within `FillGapsInteraction::gaps`.
    Gap(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FillGapsInteraction {
    pub template: String,
    pub gaps: Vec<String>,
    pub parts: Vec<TemplatePart>,
}

fn gap_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[([^\[\]]*)\]").expect("gap pattern is valid"))
}

impl FillGapsInteraction {
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let template = ["template", "text"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str))
            .unwrap_or_default();
        Self::from_template(template)
    }

    /// Splits `template` on `[answer]` markers. Empty brackets are kept as text.
    #[must_use]
    pub fn from_template(template: &str) -> Self {
        let mut gaps = Vec::new();
        let mut parts = Vec::new();
        let mut cursor = 0;

        for caps in gap_pattern().captures_iter(template) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let expected = inner.as_str().trim();
            if expected.is_empty() {
                continue;
            }
            if whole.start() > cursor {
                parts.push(TemplatePart::Text(template[cursor..whole.start()].to_owned()));
            }
            parts.push(TemplatePart::Gap(gaps.len()));
            gaps.push(expected.to_owned());
            cursor = whole.end();
        }
        if cursor < template.len() {
            parts.push(TemplatePart::Text(template[cursor..].to_owned()));
        }

        Self {
            template: template.to_owned(),
            gaps,
            parts,
        }
    }

    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.gaps.is_empty()
    }
}

//
// ─── ORDERING ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderingStep {
    pub text: String,
    /// 1-based, contiguous after normalization.
    pub order: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderingInteraction {
    pub sequence: Vec<OrderingStep>,
}

impl OrderingInteraction {
    /// Accepts `sequence` or one of its synonyms (`steps`, `items`, `lines`), or a
    /// bare array. Entries may be strings or `{text, order}` objects; an entry
    /// without a usable order falls back to its position.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let raw = match value {
            Value::Array(items) => Some(items),
            other => ORDERING_LIST_KEYS
                .iter()
                .find_map(|key| other.get(*key).and_then(Value::as_array)),
        };
        let Some(raw) = raw else {
            return Self::default();
        };

        let mut keyed: Vec<(f64, String)> = raw
            .iter()
            .enumerate()
            .filter_map(|(pos, entry)| {
                #[allow(clippy::cast_precision_loss)]
                let fallback = (pos + 1) as f64;
                match entry {
                    Value::Object(obj) => {
                        let text = text_of(obj)?;
                        let order = ORDER_KEYS
                            .iter()
                            .find_map(|key| obj.get(*key).and_then(as_number))
                            .unwrap_or(fallback);
                        Some((order, text))
                    }
                    other => scalar_text(other).map(|text| (fallback, text)),
                }
            })
            .collect();

        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self::from_texts(keyed.into_iter().map(|(_, text)| text))
    }

    /// Builds a canonical sequence from texts already in the correct order.
    #[must_use]
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sequence = texts
            .into_iter()
            .zip(1_u32..)
            .map(|(text, order)| OrderingStep {
                text: text.into(),
                order,
            })
            .collect();
        Self { sequence }
    }

    #[must_use]
    pub fn step(&self, order: u32) -> Option<&OrderingStep> {
        self.sequence.iter().find(|step| step.order == order)
    }

    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.sequence.is_empty()
    }
}

//
// ─── MATCHING ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchPair {
    pub left: String,
    pub right: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchingInteraction {
    pub pairs: Vec<MatchPair>,
}

impl MatchingInteraction {
    /// Pairs with a blank side are dropped.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let pairs = value
            .get("pairs")
            .and_then(Value::as_array)
            .map(|raw| {
                raw.iter()
                    .filter_map(|pair| {
                        let obj = pair.as_object()?;
                        let left = first_text(obj, &["left", "term", "prompt"])?;
                        let right = first_text(obj, &["right", "match", "definition", "answer"])?;
                        Some(MatchPair { left, right })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { pairs }
    }

    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.pairs.is_empty()
    }
}

//
// ─── GROUPING ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GroupingItem {
    pub text: String,
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupingInteraction {
    pub categories: Vec<String>,
    /// Ground truth, deduplicated on `(text, category)`.
    pub items: Vec<GroupingItem>,
}

impl GroupingInteraction {
    /// Accepts `categories` + `items[{text, category}]`, or a `groups` / `buckets` /
    /// `clusters` list (`[{name, items}]`) or map (`{name: [items]}`).
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let mut builder = GroupingBuilder::default();

        if let Some(categories) = value.get("categories").and_then(Value::as_array) {
            for category in categories {
                let name = match category {
                    Value::Object(obj) => first_text(obj, CATEGORY_NAME_KEYS),
                    other => scalar_text(other),
                };
                if let Some(name) = name {
                    builder.category(name);
                }
            }
        }

        if let Some(items) = value.get("items").and_then(Value::as_array) {
            for item in items.iter().filter_map(Value::as_object) {
                if let (Some(text), Some(category)) =
                    (text_of(item), first_text(item, ITEM_CATEGORY_KEYS))
                {
                    builder.item(text, category);
                }
            }
        }

        for key in GROUPING_LIST_KEYS {
            match value.get(*key) {
                Some(Value::Array(groups)) => {
                    for group in groups.iter().filter_map(Value::as_object) {
                        let Some(name) = first_text(group, CATEGORY_NAME_KEYS) else {
                            continue;
                        };
                        let members = group.get("items").and_then(Value::as_array);
                        builder.group(name, members.map(Vec::as_slice).unwrap_or_default());
                    }
                }
                Some(Value::Object(groups)) => {
                    for (name, members) in groups {
                        let name = name.trim();
                        if name.is_empty() {
                            continue;
                        }
                        let members = members.as_array().map(Vec::as_slice).unwrap_or_default();
                        builder.group(name.to_owned(), members);
                    }
                }
                _ => {}
            }
        }

        builder.build()
    }

    /// Ground-truth categories for an item text. Repeated texts may legitimately
    /// belong to more than one category.
    pub fn categories_of<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.items
            .iter()
            .filter(move |item| item.text == text)
            .map(|item| item.category.as_str())
    }

    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.items.is_empty() && !self.categories.is_empty()
    }
}

#[derive(Default)]
struct GroupingBuilder {
    categories: Vec<String>,
    items: Vec<GroupingItem>,
    seen: HashSet<GroupingItem>,
}

impl GroupingBuilder {
    fn category(&mut self, name: String) {
        if !self.categories.contains(&name) {
            self.categories.push(name);
        }
    }

    fn item(&mut self, text: String, category: String) {
        self.category(category.clone());
        let item = GroupingItem { text, category };
        if self.seen.insert(item.clone()) {
            self.items.push(item);
        }
    }

    fn group(&mut self, name: String, members: &[Value]) {
        self.category(name.clone());
        for member in members {
            let text = match member {
                Value::Object(obj) => text_of(obj),
                other => scalar_text(other),
            };
            if let Some(text) = text {
                self.item(text, name.clone());
            }
        }
    }

    fn build(self) -> GroupingInteraction {
        GroupingInteraction {
            categories: self.categories,
            items: self.items,
        }
    }
}

//
// ─── JSON HELPERS ──────────────────────────────────────────────────────────────
//

/// Trimmed, non-empty text of a scalar value. Numbers and booleans are stringified.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_owned(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| obj.get(*key).and_then(scalar_text))
}

fn text_of(obj: &Map<String, Value>) -> Option<String> {
    first_text(obj, TEXT_KEYS)
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        _ => None,
    }
}

/// Numeric value of a JSON number or numeric string; `None` otherwise.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
