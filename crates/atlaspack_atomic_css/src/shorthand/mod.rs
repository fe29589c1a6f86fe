//! Shorthand and longhand bookkeeping.
//!
//! Atomic rules are not emitted in declaration order, so the winner between a shorthand and
//! the longhands it sets is decided here: static shorthands are split into longhands, and
//! any declaration whose longhands are all set again later under the same selector and guard
//! is dropped. What remains is ordered by [`ShorthandInfo::bucket`] in the style sheet.

use std::collections::{BTreeSet, HashMap};

use crate::css::SelectorPath;
use crate::normalize::{guard_key, Branch, StyleDeclaration, StyleItem, ValuePart};

mod expand;
mod table;

pub use expand::expand_shorthand;

/// Bucket of properties that are not shorthands. Sorts after every shorthand bucket.
pub const LONGHAND_BUCKET: u8 = 6;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShorthandInfo {
  pub is_shorthand: bool,
  /// Properties the shorthand sets directly.
  pub constituents: Vec<&'static str>,
  pub bucket: u8,
}

pub fn resolve_shorthand(property: &str) -> ShorthandInfo {
  let constituents = table::constituents(property).to_vec();
  match table::shorthand_bucket(property) {
    Some(bucket) => ShorthandInfo {
      is_shorthand: true,
      constituents,
      bucket,
    },
    None => ShorthandInfo {
      is_shorthand: !constituents.is_empty(),
      constituents,
      bucket: LONGHAND_BUCKET,
    },
  }
}

/// The longhands a property ends up setting.
pub fn longhand_coverage(property: &str) -> BTreeSet<String> {
  let mut coverage = BTreeSet::new();
  collect_coverage(property, &mut coverage);
  coverage
}

fn collect_coverage(property: &str, coverage: &mut BTreeSet<String>) {
  let constituents = table::constituents(property);
  if constituents.is_empty() {
    coverage.insert(property.to_string());
    return;
  }
  for constituent in constituents {
    collect_coverage(constituent, coverage);
  }
}

/// Replaces static shorthand declarations with their longhands, in place.
pub fn expand_declarations(items: Vec<StyleItem>) -> Vec<StyleItem> {
  let mut expanded = Vec::with_capacity(items.len());
  for item in items {
    let StyleItem::Declaration(declaration) = &item else {
      expanded.push(item);
      continue;
    };
    let pairs = declaration
      .static_value()
      .and_then(|value| expand_shorthand(&declaration.property, &value));
    let Some(pairs) = pairs else {
      expanded.push(item);
      continue;
    };

    tracing::trace!(property = %declaration.property, longhands = pairs.len(), "expanded shorthand");
    for (property, value) in pairs {
      expanded.push(StyleItem::Declaration(StyleDeclaration {
        property,
        value: vec![ValuePart::Text(value)],
        ..declaration.clone()
      }));
    }
  }
  renumber(expanded)
}

/// Drops declarations that a later declaration fully overrides.
///
/// Declarations only compete with others under the same selector path and the same guard,
/// so a conditional declaration never removes an unconditional one or the other way round.
pub fn resolve_overrides(items: Vec<StyleItem>) -> Vec<StyleItem> {
  type Competition = (SelectorPath, Vec<(usize, Branch)>);

  let mut keep = vec![true; items.len()];
  let mut seen: HashMap<Competition, Vec<(usize, BTreeSet<String>)>> = HashMap::new();

  for (index, item) in items.iter().enumerate() {
    let StyleItem::Declaration(declaration) = item else {
      continue;
    };
    let coverage = longhand_coverage(&declaration.property);
    let earlier = seen
      .entry((declaration.path.clone(), guard_key(&declaration.guard)))
      .or_default();
    earlier.retain(|(earlier_index, earlier_coverage)| {
      if earlier_coverage.is_subset(&coverage) {
        keep[*earlier_index] = false;
        false
      } else {
        true
      }
    });
    earlier.push((index, coverage));
  }

  let kept = items
    .into_iter()
    .zip(keep)
    .filter_map(|(item, keep)| keep.then_some(item))
    .collect();
  renumber(kept)
}

fn renumber(mut items: Vec<StyleItem>) -> Vec<StyleItem> {
  for (order, item) in items.iter_mut().enumerate() {
    match item {
      StyleItem::Declaration(declaration) => declaration.order = order,
      StyleItem::ClassReference { order: item_order, .. } => *item_order = order,
    }
  }
  items
}
