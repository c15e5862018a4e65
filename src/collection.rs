//! A general purpose ordered collection.
//!
//! Most operations return a new [`Collection`] and leave the receiver as it
//! is. The in-place ones (`transform`, `push`, `pop`, `shift`, `prepend`,
//! `pull`, `set`, `forget`, `splice`) say so in their docs.
//!
//! Keys are preserved unless an operation says otherwise. A collection whose
//! keys run `0..n-1` renders as a JSON array, anything else as an object.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use rand::seq::SliceRandom;
use serde::{Serialize, Serializer};

use crate::error::DottedError;
use crate::path;
use crate::value::{self, Items, Value};

/// How to pull a value out of each item: a dot-path or a function of
/// `(value, key)`.
pub struct By<'a>(Retriever<'a>);

enum Retriever<'a> {
    Key(String),
    Func(Box<dyn Fn(&Value, &str) -> Value + 'a>),
}

impl<'a> By<'a> {
    /// Resolve `path` inside each item. An empty path is the item itself.
    pub fn key(path: impl Into<String>) -> Self {
        By(Retriever::Key(path.into()))
    }

    pub fn func(f: impl Fn(&Value, &str) -> Value + 'a) -> Self {
        By(Retriever::Func(Box::new(f)))
    }

    fn retrieve(&self, value: &Value, key: &str) -> Value {
        match &self.0 {
            Retriever::Key(path) => path::resolve_value(value, path, Value::Null),
            Retriever::Func(f) => f(value, key),
        }
    }
}

impl From<&str> for By<'_> {
    fn from(path: &str) -> Self {
        By::key(path)
    }
}

impl From<String> for By<'_> {
    fn from(path: String) -> Self {
        By::key(path)
    }
}

/// The result of [`Collection::random`].
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    One(Value),
    Many(Collection),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    items: Items,
}

/// Renumber entries: `None` keys and integer keys get `0, 1, ...` in order,
/// string keys are kept.
fn renumber(entries: Vec<(Option<String>, Value)>) -> Items {
    let mut next = 0i64;
    let mut items = Items::new();
    for (key, value) in entries {
        match key {
            Some(key) if value::int_key(&key).is_none() => {
                items.insert(key, value);
            }
            _ => {
                items.insert(next.to_string(), value);
                next += 1;
            }
        }
    }
    items
}

/// Clamp an `(offset, length)` pair to a `start..end` range. Negative values
/// count from the end.
fn bounds(len: usize, offset: isize, length: Option<isize>) -> (usize, usize) {
    let len_i = len as isize;
    let start = if offset < 0 {
        (len_i + offset).max(0)
    } else {
        offset.min(len_i)
    };
    let end = match length {
        None => len_i,
        Some(n) if n < 0 => (len_i + n).max(start),
        Some(n) => start.saturating_add(n).min(len_i),
    };
    (start as usize, end as usize)
}

enum Term {
    Int(i64),
    Float(f64),
}

/// Numbers, numeric strings and booleans count. `nan`, `inf` and other
/// non-numeric strings do not.
fn as_term(value: &Value) -> Option<Term> {
    match value {
        Value::Number(n) => n.as_i64().map(Term::Int).or_else(|| n.as_f64().map(Term::Float)),
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(i) => Some(Term::Int(i)),
                Err(_) => value::numeric_str(s).filter(|f| f.is_finite()).map(Term::Float),
            }
        }
        Value::Bool(b) => Some(Term::Int(i64::from(*b))),
        _ => None,
    }
}

/// Add up numeric values. The total stays an exact integer while every term
/// is one and the sum fits in `i64`.
fn total(values: impl Iterator<Item = Value>) -> Value {
    let mut exact = Some(0i64);
    let mut approx = 0.0;
    for value in values {
        match as_term(&value) {
            Some(Term::Int(i)) => {
                exact = exact.and_then(|sum| sum.checked_add(i));
                approx += i as f64;
            }
            Some(Term::Float(f)) => {
                exact = None;
                approx += f;
            }
            None => {}
        }
    }
    match exact {
        Some(sum) => Value::from(sum),
        None => Value::from(approx),
    }
}

impl Collection {
    pub fn new(items: Items) -> Self {
        Self { items }
    }

    /// Build from any value: arrays get integer keys, objects keep theirs,
    /// `null` is empty, and a scalar becomes a one-item list.
    pub fn from_value(value: impl Into<Value>) -> Self {
        Self::new(value::into_items(value.into()))
    }

    pub fn all(&self) -> &Items {
        &self.items
    }

    pub(crate) fn items_mut(&mut self) -> &mut Items {
        &mut self.items
    }

    pub fn into_items(self) -> Items {
        self.items
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The item stored under `key` (not a dot-path).
    pub fn get(&self, key: &str, default: Value) -> Value {
        self.items.get(key).cloned().unwrap_or(default)
    }

    pub fn has(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    pub fn first(&self) -> Option<&Value> {
        self.items.values().next()
    }

    pub fn first_where(&self, mut f: impl FnMut(&Value, &str) -> bool) -> Option<&Value> {
        self.items.iter().find(|(k, v)| f(v, k)).map(|(_, v)| v)
    }

    pub fn last(&self) -> Option<&Value> {
        self.items.values().next_back()
    }

    pub fn last_where(&self, mut f: impl FnMut(&Value, &str) -> bool) -> Option<&Value> {
        self.items.iter().rev().find(|(k, v)| f(v, k)).map(|(_, v)| v)
    }

    /// The keys as a list. Integer keys come back as numbers.
    pub fn keys(&self) -> Collection {
        self.items.keys().map(|k| value::key_value(k)).collect()
    }

    /// The values as a list.
    pub fn values(&self) -> Collection {
        self.items.values().cloned().collect()
    }

    pub fn map(&self, mut f: impl FnMut(&Value, &str) -> Value) -> Collection {
        Self::new(
            self.items
                .iter()
                .map(|(k, v)| (k.clone(), f(v, k)))
                .collect(),
        )
    }

    /// Map in place.
    pub fn transform(&mut self, f: impl FnMut(&Value, &str) -> Value) -> &mut Self {
        self.items = self.map(f).items;
        self
    }

    pub fn filter(&self, mut f: impl FnMut(&Value, &str) -> bool) -> Collection {
        Self::new(
            self.items
                .iter()
                .filter(|(k, v)| f(v, k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// Drop every falsy item.
    pub fn filter_truthy(&self) -> Collection {
        self.filter(|v, _| value::is_truthy(v))
    }

    pub fn reject(&self, mut f: impl FnMut(&Value, &str) -> bool) -> Collection {
        self.filter(|v, k| !f(v, k))
    }

    /// Drop every item strictly equal to `value`.
    pub fn reject_value(&self, value: impl Into<Value>) -> Collection {
        let value = value.into();
        self.filter(|v, _| *v != value)
    }

    /// Items whose `key` path is strictly equal to `value`.
    pub fn where_eq(&self, key: &str, value: impl Into<Value>) -> Collection {
        let value = value.into();
        self.filter(|v, _| path::resolve_value(v, key, Value::Null) == value)
    }

    /// Items whose `key` path is loosely equal to `value`.
    pub fn where_loose(&self, key: &str, value: impl Into<Value>) -> Collection {
        let value = value.into();
        self.filter(|v, _| value::loose_eq(&path::resolve_value(v, key, Value::Null), &value))
    }

    /// True if some item is strictly equal to `value`.
    pub fn contains(&self, value: impl Into<Value>) -> bool {
        let value = value.into();
        self.items.values().any(|v| *v == value)
    }

    pub fn contains_where(&self, f: impl FnMut(&Value, &str) -> bool) -> bool {
        self.first_where(f).is_some()
    }

    /// True if some item's `key` path is strictly equal to `value`.
    pub fn contains_pair(&self, key: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        self.items
            .values()
            .any(|v| path::resolve_value(v, key, Value::Null) == value)
    }

    /// Sort by value, keeping keys.
    pub fn sort(&self) -> Collection {
        self.sort_with(value::compare)
    }

    pub fn sort_with(&self, mut cmp: impl FnMut(&Value, &Value) -> Ordering) -> Collection {
        let mut entries: Vec<(&String, &Value)> = self.items.iter().collect();
        entries.sort_by(|(_, a), (_, b)| cmp(a, b));
        Self::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// Sort by a retrieved value, keeping keys. The sort is stable.
    pub fn sort_by<'b>(&self, by: impl Into<By<'b>>, descending: bool) -> Collection {
        let by = by.into();
        let mut entries: Vec<(Value, &String, &Value)> = self
            .items
            .iter()
            .map(|(k, v)| (by.retrieve(v, k), k, v))
            .collect();
        entries.sort_by(|(a, _, _), (b, _, _)| {
            let order = value::compare(a, b);
            if descending { order.reverse() } else { order }
        });
        Self::new(
            entries
                .into_iter()
                .map(|(_, k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    pub fn sort_by_desc<'b>(&self, by: impl Into<By<'b>>) -> Collection {
        self.sort_by(by, true)
    }

    /// Group items by a retrieved value. Each group is a list unless
    /// `preserve_keys` is set.
    pub fn group_by<'b>(&self, by: impl Into<By<'b>>, preserve_keys: bool) -> Collection {
        let by = by.into();
        let mut groups = Items::new();
        for (key, item) in &self.items {
            let group_key = value::key_string(&by.retrieve(item, key));
            let Value::Object(group) = groups
                .entry(group_key)
                .or_insert_with(|| Value::Object(Items::new()))
            else {
                continue;
            };
            let slot = if preserve_keys {
                key.clone()
            } else {
                value::next_index(group).to_string()
            };
            group.insert(slot, item.clone());
        }
        Self::new(
            groups
                .into_iter()
                .map(|(k, group)| (k, value::to_value(value::into_items(group))))
                .collect(),
        )
    }

    /// Re-key items by a retrieved value. Later items win on collision.
    pub fn key_by<'b>(&self, by: impl Into<By<'b>>) -> Collection {
        let by = by.into();
        Self::new(
            self.items
                .iter()
                .map(|(k, v)| (value::key_string(&by.retrieve(v, k)), v.clone()))
                .collect(),
        )
    }

    /// The `value_path` of every item, keyed by its `key_path` if given.
    pub fn pluck(&self, value_path: &str, key_path: Option<&str>) -> Collection {
        match key_path {
            None => self
                .items
                .values()
                .map(|v| path::resolve_value(v, value_path, Value::Null))
                .collect(),
            Some(key_path) => Self::new(
                self.items
                    .values()
                    .map(|v| {
                        (
                            value::key_string(&path::resolve_value(v, key_path, Value::Null)),
                            path::resolve_value(v, value_path, Value::Null),
                        )
                    })
                    .collect(),
            ),
        }
    }

    /// Drop repeated items, keeping the first occurrence and its key.
    pub fn unique(&self) -> Collection {
        self.unique_by(By::key(""))
    }

    pub fn unique_by<'b>(&self, by: impl Into<By<'b>>) -> Collection {
        let by = by.into();
        let mut seen: Vec<Value> = Vec::new();
        self.filter(|v, k| {
            let id = by.retrieve(v, k);
            if seen.contains(&id) {
                return false;
            }
            seen.push(id);
            true
        })
    }

    /// Swap keys and values. Only string and integer values can become keys;
    /// other items are dropped.
    pub fn flip(&self) -> Collection {
        Self::new(
            self.items
                .iter()
                .filter_map(|(k, v)| match v {
                    Value::String(s) => Some((s.clone(), value::key_value(k))),
                    Value::Number(n) if !n.is_f64() => Some((n.to_string(), value::key_value(k))),
                    _ => None,
                })
                .collect(),
        )
    }

    /// Merge every container item into one collection. Scalars are dropped.
    pub fn collapse(&self) -> Collection {
        let merged = self
            .items
            .values()
            .filter(|v| v.is_array() || v.is_object())
            .fold(Items::new(), |acc, v| {
                value::array_merge(acc, value::into_items(v.clone()))
            });
        Self::new(merged)
    }

    /// Split into chunks of `size` items. Chunks keep their keys.
    pub fn chunk(&self, size: usize) -> Collection {
        if size == 0 {
            return Self::default();
        }
        let entries: Vec<(&String, &Value)> = self.items.iter().collect();
        entries
            .chunks(size)
            .map(|chunk| {
                let items: Items = chunk
                    .iter()
                    .map(|(k, v)| ((*k).clone(), (*v).clone()))
                    .collect();
                value::to_value(items)
            })
            .collect()
    }

    /// Every `step`th item starting at position `offset`, as a list.
    pub fn every(&self, step: usize, offset: usize) -> Collection {
        if step == 0 {
            return Self::default();
        }
        self.items
            .values()
            .enumerate()
            .filter(|(position, _)| position % step == offset)
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Visit every item until `f` returns `false`.
    pub fn each(&self, mut f: impl FnMut(&Value, &str) -> bool) -> &Self {
        for (key, item) in &self.items {
            if !f(item, key) {
                break;
            }
        }
        self
    }

    /// Pair items by position. The result is as long as the shortest input.
    pub fn zip(&self, others: &[Collection]) -> Collection {
        let length = others
            .iter()
            .map(Collection::len)
            .fold(self.len(), usize::min);
        let mut columns: Vec<_> = others.iter().map(|c| c.items.values()).collect();
        self.items
            .values()
            .take(length)
            .map(|first| {
                let mut row = vec![first.clone()];
                row.extend(columns.iter_mut().filter_map(|c| c.next().cloned()));
                Value::Array(row)
            })
            .collect()
    }

    /// Items whose string form appears nowhere in `other`.
    pub fn diff(&self, other: &Collection) -> Collection {
        let others: HashSet<String> = other.items.values().map(value::key_string).collect();
        self.filter(|v, _| !others.contains(&value::key_string(v)))
    }

    /// Items whose string form appears in `other`.
    pub fn intersect(&self, other: &Collection) -> Collection {
        let others: HashSet<String> = other.items.values().map(value::key_string).collect();
        self.filter(|v, _| others.contains(&value::key_string(v)))
    }

    /// `array_merge`: string keys in `items` overwrite, integer keys are
    /// appended and renumbered.
    pub fn merge(&self, items: Items) -> Collection {
        Self::new(value::array_merge(self.items.clone(), items))
    }

    pub fn reverse(&self) -> Collection {
        Self::new(
            self.items
                .iter()
                .rev()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// A run of items, keys preserved. A negative `offset` counts from the
    /// end; a negative `length` stops that many items before the end.
    pub fn slice(&self, offset: isize, length: Option<isize>) -> Collection {
        let (start, end) = bounds(self.len(), offset, length);
        Self::new(
            self.items
                .iter()
                .skip(start)
                .take(end - start)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// The first `limit` items, or the last `-limit` if negative.
    pub fn take(&self, limit: isize) -> Collection {
        if limit < 0 {
            self.slice(limit, Some(-limit))
        } else {
            self.slice(0, Some(limit))
        }
    }

    /// One page of `per_page` items. Pages start at 1.
    pub fn for_page(&self, page: usize, per_page: usize) -> Collection {
        let offset = page.saturating_sub(1).saturating_mul(per_page);
        self.slice(offset as isize, Some(per_page as isize))
    }

    /// Remove a run of items in place, inserting `replacement` in its place.
    /// Integer keys are renumbered. Returns the removed items as a list.
    pub fn splice(
        &mut self,
        offset: isize,
        length: Option<isize>,
        replacement: Vec<Value>,
    ) -> Collection {
        let (start, end) = bounds(self.len(), offset, length);
        let mut entries: Vec<(Option<String>, Value)> = std::mem::take(&mut self.items)
            .into_iter()
            .map(|(k, v)| (Some(k), v))
            .collect();
        let removed: Vec<Value> = entries
            .splice(start..end, replacement.into_iter().map(|v| (None, v)))
            .map(|(_, v)| v)
            .collect();
        self.items = renumber(entries);
        removed.into_iter().collect()
    }

    /// The key of the first item loosely equal to `value`.
    pub fn search(&self, value: impl Into<Value>) -> Option<&str> {
        let value = value.into();
        self.search_where(|v, _| value::loose_eq(v, &value))
    }

    pub fn search_where(&self, mut f: impl FnMut(&Value, &str) -> bool) -> Option<&str> {
        self.items
            .iter()
            .find(|(k, v)| f(v, k))
            .map(|(k, _)| k.as_str())
    }

    pub fn implode(&self, glue: &str) -> String {
        self.items
            .values()
            .map(value::key_string)
            .collect::<Vec<_>>()
            .join(glue)
    }

    /// Join the `key` path of every item.
    pub fn implode_by(&self, key: &str, glue: &str) -> String {
        self.pluck(key, None).implode(glue)
    }

    /// The largest `key` path across items (`""` compares items directly).
    pub fn max(&self, key: &str) -> Value {
        self.extreme(key, Ordering::Greater)
    }

    pub fn min(&self, key: &str) -> Value {
        self.extreme(key, Ordering::Less)
    }

    fn extreme(&self, key: &str, wanted: Ordering) -> Value {
        self.items
            .values()
            .map(|v| path::resolve_value(v, key, Value::Null))
            .reduce(|best, v| {
                if value::compare(&v, &best) == wanted {
                    v
                } else {
                    best
                }
            })
            .unwrap_or(Value::Null)
    }

    /// Sum of the numeric items. Numeric strings count; other items are
    /// skipped.
    pub fn sum(&self) -> Value {
        total(self.items.values().cloned())
    }

    pub fn sum_by<'b>(&self, by: impl Into<By<'b>>) -> Value {
        let by = by.into();
        total(self.items.iter().map(|(k, v)| by.retrieve(v, k)))
    }

    pub fn reduce<T>(&self, init: T, f: impl FnMut(T, &Value) -> T) -> T {
        self.items.values().fold(init, f)
    }

    /// `amount` randomly chosen items, in their original order and with
    /// their keys. A single item comes back bare.
    pub fn random(&self, amount: usize) -> Result<Sample, DottedError> {
        let available = self.len();
        if amount > available {
            return Err(DottedError::OutOfRange {
                requested: amount,
                available,
            });
        }
        let mut picked = rand::seq::index::sample(&mut rand::thread_rng(), available, amount).into_vec();
        picked.sort_unstable();

        if amount == 1
            && let Some(value) = picked.first().and_then(|&i| self.items.values().nth(i))
        {
            return Ok(Sample::One(value.clone()));
        }
        Ok(Sample::Many(Self::new(
            self.items
                .iter()
                .enumerate()
                .filter(|(i, _)| picked.binary_search(i).is_ok())
                .map(|(_, (k, v))| (k.clone(), v.clone()))
                .collect(),
        )))
    }

    /// The values in random order, as a list.
    pub fn shuffle(&self) -> Collection {
        let mut values: Vec<Value> = self.items.values().cloned().collect();
        values.shuffle(&mut rand::thread_rng());
        values.into_iter().collect()
    }

    /// Append under the next integer key, in place.
    pub fn push(&mut self, value: impl Into<Value>) -> &mut Self {
        let key = value::next_index(&self.items).to_string();
        self.items.insert(key, value.into());
        self
    }

    /// Remove and return the last item, in place.
    pub fn pop(&mut self) -> Option<Value> {
        let key = self.items.keys().next_back()?.clone();
        self.items.shift_remove(&key)
    }

    /// Remove and return the first item, in place. Integer keys are
    /// renumbered.
    pub fn shift(&mut self) -> Option<Value> {
        let key = self.items.keys().next()?.clone();
        let first = self.items.shift_remove(&key);
        self.items = value::reindex(std::mem::take(&mut self.items));
        first
    }

    /// Insert at the front, in place. Integer keys are renumbered.
    pub fn prepend(&mut self, value: impl Into<Value>) -> &mut Self {
        let entries = std::iter::once((None, value.into()))
            .chain(std::mem::take(&mut self.items).into_iter().map(|(k, v)| (Some(k), v)))
            .collect();
        self.items = renumber(entries);
        self
    }

    /// Remove and return the value at a dot-path, in place.
    pub fn pull(&mut self, key: &str, default: Value) -> Value {
        path::remove(&mut self.items, key).unwrap_or(default)
    }

    /// Store `value` under `key` (not a dot-path), in place.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.items.insert(key.to_string(), value.into());
        self
    }

    /// Remove `key`, in place.
    pub fn forget(&mut self, key: &str) -> &mut Self {
        self.items.shift_remove(key);
        self
    }

    pub fn to_array(&self) -> Value {
        value::to_value(self.items.clone())
    }

    pub fn to_json(&self) -> Result<String, DottedError> {
        Ok(serde_json::to_string(&self.to_array())?)
    }

    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.items.iter()
    }
}

impl From<Items> for Collection {
    fn from(items: Items) -> Self {
        Self::new(items)
    }
}

impl From<Value> for Collection {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

/// A list collection.
impl FromIterator<Value> for Collection {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::new(value::list_items(iter))
    }
}

impl FromIterator<(String, Value)> for Collection {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for Collection {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_array())
    }
}

impl Serialize for Collection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_array().serialize(serializer)
    }
}
