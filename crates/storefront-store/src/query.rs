//! Filter predicates and find options over JSON documents.

use std::cmp::Ordering;

use serde_json::Value;

/// A single predicate on a (possibly dotted) document field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the value exactly.
    Eq { field: String, value: Value },
    /// Numeric field is less than or equal to the bound.
    Lte { field: String, bound: f64 },
    /// Numeric field is greater than or equal to the bound.
    Gte { field: String, bound: f64 },
    /// String field contains the needle, ignoring case.
    Contains { field: String, needle: String },
}

impl Condition {
    /// Returns true if the document satisfies this predicate.
    pub fn matches(&self, document: &Value) -> bool {
        match self {
            Self::Eq { field, value } => lookup(document, field) == Some(value),
            Self::Lte { field, bound } => lookup(document, field)
                .and_then(Value::as_f64)
                .is_some_and(|v| v <= *bound),
            Self::Gte { field, bound } => lookup(document, field)
                .and_then(Value::as_f64)
                .is_some_and(|v| v >= *bound),
            Self::Contains { field, needle } => lookup(document, field)
                .and_then(Value::as_str)
                .is_some_and(|v| v.to_lowercase().contains(&needle.to_lowercase())),
        }
    }
}

/// A conjunction of conditions. The empty filter matches every document.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use storefront_store::Filter;
///
/// let filter = Filter::all().eq("category", "lighting").lte("price", 500.0);
///
/// assert!(filter.matches(&json!({"category": "lighting", "price": 120})));
/// assert!(!filter.matches(&json!({"category": "lighting", "price": 900})));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// A filter matching everything.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn lte(mut self, field: impl Into<String>, bound: f64) -> Self {
        self.conditions.push(Condition::Lte {
            field: field.into(),
            bound,
        });
        self
    }

    pub fn gte(mut self, field: impl Into<String>, bound: f64) -> Self {
        self.conditions.push(Condition::Gte {
            field: field.into(),
            bound,
        });
        self
    }

    pub fn contains(mut self, field: impl Into<String>, needle: impl Into<String>) -> Self {
        self.conditions.push(Condition::Contains {
            field: field.into(),
            needle: needle.into(),
        });
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn matches(&self, document: &Value) -> bool {
        self.conditions.iter().all(|c| c.matches(document))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Ordering and paging applied after filtering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    sort: Option<(String, SortOrder)>,
    skip: usize,
    limit: Option<usize>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some((field.into(), order));
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sorts (stable, so ties keep insertion order), skips and truncates.
    pub fn apply(&self, mut documents: Vec<Value>) -> Vec<Value> {
        if let Some((field, order)) = &self.sort {
            documents.sort_by(|a, b| {
                let ordering = compare(lookup(a, field), lookup(b, field));
                match order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }

        let paged = documents.into_iter().skip(self.skip);
        match self.limit {
            Some(limit) => paged.take(limit).collect(),
            None => paged.collect(),
        }
    }
}

/// Resolves a dotted path such as `shippingInfo.city`.
pub(crate) fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(document, |current, segment| current.get(segment))
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}
