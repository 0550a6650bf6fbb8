//! Declarative filters over entity fields
//!
//! A [`Filter`] is plain data: it renders to a MongoDB query document with
//! [`Filter::to_document`] and can be evaluated against a BSON document with
//! [`Filter::matches`], which is what the in-memory collection does.
//!
//! ```rust
//! use play_db::filter::{field, Filter};
//!
//! let cheap_potions = field("name").eq("Potion").and(field("price").lt(10.0));
//! let everything = Filter::all();
//! # let _ = (cheap_potions, everything);
//! ```

use crate::codec;
use crate::entity::Entity;
use crate::error::DbError;
use mongodb::bson::{Bson, Document};
use serde::Serialize;
use std::cmp::Ordering;
use uuid::Uuid;

/// Comparison applied between a field and a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Field equals the value (`$eq`)
    Eq,
    /// Field differs from the value, or is missing (`$ne`)
    Ne,
    /// Field is greater than the value (`$gt`)
    Gt,
    /// Field is greater than or equal to the value (`$gte`)
    Gte,
    /// Field is less than the value (`$lt`)
    Lt,
    /// Field is less than or equal to the value (`$lte`)
    Lte,
}

impl Comparison {
    fn operator(self) -> &'static str {
        match self {
            Comparison::Eq => "$eq",
            Comparison::Ne => "$ne",
            Comparison::Gt => "$gt",
            Comparison::Gte => "$gte",
            Comparison::Lt => "$lt",
            Comparison::Lte => "$lte",
        }
    }
}

/// A boolean predicate over document fields.
///
/// Field names are document field names (after serde renames) and may use
/// dot notation for nested documents, e.g. `"dimensions.weight"`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Filter {
    /// Matches every document
    #[default]
    All,
    /// Compares a field with a value
    Compare {
        field: String,
        op: Comparison,
        value: Bson,
    },
    /// Field equals one of the values
    In { field: String, values: Vec<Bson> },
    /// Field equals none of the values
    NotIn { field: String, values: Vec<Bson> },
    /// Field is present (or absent)
    Exists { field: String, exists: bool },
    /// All inner filters match; an empty list matches everything
    And(Vec<Filter>),
    /// Any inner filter matches; an empty list matches nothing
    Or(Vec<Filter>),
    /// Inner filter does not match
    Not(Box<Filter>),
}

/// Starts a filter on the given field.
pub fn field(name: &str) -> FieldFilter {
    FieldFilter {
        field: name.to_string(),
    }
}

/// Matches every document.
pub fn all() -> Filter {
    Filter::All
}

/// Combines filters with logical AND.
pub fn and(filters: Vec<Filter>) -> Filter {
    Filter::And(filters)
}

/// Combines filters with logical OR.
pub fn or(filters: Vec<Filter>) -> Filter {
    Filter::Or(filters)
}

/// Builder for single-field conditions, see [`field`].
#[derive(Debug, Clone)]
pub struct FieldFilter {
    field: String,
}

impl FieldFilter {
    fn compare(self, op: Comparison, value: Bson) -> Filter {
        Filter::Compare {
            field: self.field,
            op,
            value,
        }
    }

    /// Field equals `value`. An array field matches if any element does.
    pub fn eq<V: Into<Bson>>(self, value: V) -> Filter {
        self.compare(Comparison::Eq, value.into())
    }

    /// Field does not equal `value`; a missing field matches.
    pub fn ne<V: Into<Bson>>(self, value: V) -> Filter {
        self.compare(Comparison::Ne, value.into())
    }

    /// Field is greater than `value`
    pub fn gt<V: Into<Bson>>(self, value: V) -> Filter {
        self.compare(Comparison::Gt, value.into())
    }

    /// Field is greater than or equal to `value`
    pub fn gte<V: Into<Bson>>(self, value: V) -> Filter {
        self.compare(Comparison::Gte, value.into())
    }

    /// Field is less than `value`
    pub fn lt<V: Into<Bson>>(self, value: V) -> Filter {
        self.compare(Comparison::Lt, value.into())
    }

    /// Field is less than or equal to `value`
    pub fn lte<V: Into<Bson>>(self, value: V) -> Filter {
        self.compare(Comparison::Lte, value.into())
    }

    /// Field equals one of `values`. An empty list matches nothing.
    pub fn in_values<V: Into<Bson>>(self, values: Vec<V>) -> Filter {
        Filter::In {
            field: self.field,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Field equals none of `values`
    pub fn not_in_values<V: Into<Bson>>(self, values: Vec<V>) -> Filter {
        Filter::NotIn {
            field: self.field,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Field is present (`true`) or absent (`false`), whatever its value
    pub fn exists(self, exists: bool) -> Filter {
        Filter::Exists {
            field: self.field,
            exists,
        }
    }

    /// Equality against any serializable value, encoded the way the driver
    /// encodes stored documents. Use this for `Uuid`s and custom types.
    pub fn eq_serialized<S: Serialize>(self, value: &S) -> Result<Filter, DbError> {
        let value = codec::to_value(value)?;
        Ok(self.compare(Comparison::Eq, value))
    }
}

impl Filter {
    /// Matches every document.
    pub fn all() -> Self {
        Filter::All
    }

    /// Matches the entity of type `T` with the given identifier.
    pub fn by_id<T: Entity>(id: Uuid) -> Result<Self, DbError> {
        field(T::ID_FIELD).eq_serialized(&id)
    }

    /// Both `self` and `other` match.
    pub fn and(self, other: Filter) -> Self {
        match self {
            Filter::And(mut filters) => {
                filters.push(other);
                Filter::And(filters)
            }
            first => Filter::And(vec![first, other]),
        }
    }

    /// Either `self` or `other` matches.
    pub fn or(self, other: Filter) -> Self {
        match self {
            Filter::Or(mut filters) => {
                filters.push(other);
                Filter::Or(filters)
            }
            first => Filter::Or(vec![first, other]),
        }
    }

    /// Renders the filter as a MongoDB query document.
    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        match self {
            Filter::All => {}
            Filter::Compare { field, op, value } => {
                document.insert(field.clone(), operator(op.operator(), value.clone()));
            }
            Filter::In { field, values } => {
                document.insert(field.clone(), operator("$in", Bson::Array(values.clone())));
            }
            Filter::NotIn { field, values } => {
                document.insert(field.clone(), operator("$nin", Bson::Array(values.clone())));
            }
            Filter::Exists { field, exists } => {
                document.insert(field.clone(), operator("$exists", Bson::Boolean(*exists)));
            }
            Filter::And(filters) if filters.is_empty() => {}
            Filter::And(filters) => {
                document.insert("$and", rendered(filters));
            }
            // $or rejects an empty array; "none of {match-all}" matches nothing
            Filter::Or(filters) if filters.is_empty() => {
                document.insert("$nor", vec![Bson::Document(Document::new())]);
            }
            Filter::Or(filters) => {
                document.insert("$or", rendered(filters));
            }
            // $not is only valid per field, $nor works at the top level
            Filter::Not(inner) => {
                document.insert("$nor", vec![Bson::Document(inner.to_document())]);
            }
        }
        document
    }

    /// Evaluates the filter against a BSON document.
    ///
    /// Follows MongoDB's rules for the supported operators: array fields
    /// match when any element matches, dot paths continue into the documents
    /// of an array, a missing field equals `null`, numbers compare exactly
    /// across integer and double types, and ordering comparisons only match
    /// values of comparable types.
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Compare { field, op, value } => {
                let found = lookup(document, field);
                match op {
                    Comparison::Eq => equals_field(&found, value),
                    Comparison::Ne => !equals_field(&found, value),
                    ordering => found.iter().any(|candidate| {
                        any_element(candidate, |v| {
                            compare(v, value).is_some_and(|o| accepts(*ordering, o))
                        })
                    }),
                }
            }
            Filter::In { field, values } => {
                let found = lookup(document, field);
                values.iter().any(|value| equals_field(&found, value))
            }
            Filter::NotIn { field, values } => {
                let found = lookup(document, field);
                !values.iter().any(|value| equals_field(&found, value))
            }
            Filter::Exists { field, exists } => !lookup(document, field).is_empty() == *exists,
            Filter::And(filters) => filters.iter().all(|f| f.matches(document)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(document)),
            Filter::Not(inner) => !inner.matches(document),
        }
    }
}

impl std::ops::Not for Filter {
    type Output = Filter;

    fn not(self) -> Self::Output {
        Filter::Not(Box::new(self))
    }
}

fn operator(name: &str, value: Bson) -> Document {
    let mut document = Document::new();
    document.insert(name, value);
    document
}

fn rendered(filters: &[Filter]) -> Vec<Bson> {
    filters
        .iter()
        .map(|f| Bson::Document(f.to_document()))
        .collect()
}

/// Every value a dot path reaches; empty when the field is missing.
fn lookup<'a>(document: &'a Document, path: &str) -> Vec<&'a Bson> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut found = Vec::new();
    resolve_in(document, &segments, &mut found);
    found
}

fn resolve_in<'a>(document: &'a Document, segments: &[&str], found: &mut Vec<&'a Bson>) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    if let Some(value) = document.get(*first) {
        resolve(value, rest, found);
    }
}

fn resolve<'a>(value: &'a Bson, rest: &[&str], found: &mut Vec<&'a Bson>) {
    let Some(segment) = rest.first() else {
        found.push(value);
        return;
    };
    match value {
        Bson::Document(inner) => resolve_in(inner, rest, found),
        Bson::Array(items) => {
            // "tags.0" addresses an element, other segments apply to each element
            if let Some(item) = segment.parse::<usize>().ok().and_then(|i| items.get(i)) {
                resolve(item, &rest[1..], found);
            }
            for item in items {
                if let Bson::Document(inner) = item {
                    resolve_in(inner, rest, found);
                }
            }
        }
        _ => {}
    }
}

fn any_element(candidate: &Bson, predicate: impl Fn(&Bson) -> bool) -> bool {
    match candidate {
        Bson::Array(items) => predicate(candidate) || items.iter().any(predicate),
        other => predicate(other),
    }
}

fn equals_field(found: &[&Bson], value: &Bson) -> bool {
    if found.is_empty() {
        return matches!(value, Bson::Null);
    }
    found
        .iter()
        .any(|candidate| any_element(candidate, |v| equals(v, value)))
}

fn equals(left: &Bson, right: &Bson) -> bool {
    match (Number::of(left), Number::of(right)) {
        (Some(l), Some(r)) => l.compare(r) == Some(Ordering::Equal),
        _ => left == right,
    }
}

fn compare(left: &Bson, right: &Bson) -> Option<Ordering> {
    match (left, right) {
        (Bson::String(l), Bson::String(r)) => Some(l.cmp(r)),
        (Bson::Boolean(l), Bson::Boolean(r)) => Some(l.cmp(r)),
        (Bson::DateTime(l), Bson::DateTime(r)) => Some(l.cmp(r)),
        _ => Number::of(left)?.compare(Number::of(right)?),
    }
}

/// A BSON number, kept in its own representation so comparisons are exact
#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Double(f64),
}

impl Number {
    fn of(value: &Bson) -> Option<Self> {
        match value {
            Bson::Int32(v) => Some(Number::Int(i64::from(*v))),
            Bson::Int64(v) => Some(Number::Int(*v)),
            Bson::Double(v) => Some(Number::Double(*v)),
            _ => None,
        }
    }

    fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(l), Number::Int(r)) => Some(l.cmp(&r)),
            (Number::Double(l), Number::Double(r)) => l.partial_cmp(&r),
            (Number::Int(l), Number::Double(r)) => int_cmp_double(l, r),
            (Number::Double(l), Number::Int(r)) => int_cmp_double(r, l).map(Ordering::reverse),
        }
    }
}

/// Orders an integer against a double without rounding either.
fn int_cmp_double(int: i64, double: f64) -> Option<Ordering> {
    // 2^63 is exactly representable; i64 covers [-2^63, 2^63)
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if double.is_nan() {
        return None;
    }
    if double >= LIMIT {
        return Some(Ordering::Less);
    }
    if double < -LIMIT {
        return Some(Ordering::Greater);
    }

    let whole = double.trunc();
    // in range and integral, so the cast is exact
    match int.cmp(&(whole as i64)) {
        Ordering::Equal => whole.partial_cmp(&double),
        unequal => Some(unequal),
    }
}

fn accepts(op: Comparison, ordering: Ordering) -> bool {
    match op {
        Comparison::Gt => ordering == Ordering::Greater,
        Comparison::Gte => ordering != Ordering::Less,
        Comparison::Lt => ordering == Ordering::Less,
        Comparison::Lte => ordering != Ordering::Greater,
        Comparison::Eq => ordering == Ordering::Equal,
        Comparison::Ne => ordering != Ordering::Equal,
    }
}
