//! Atomic rules: one declaration per class, named by a hash of what it contains.

use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::css::SelectorPath;
use crate::hash::short_hash;
use crate::shorthand::resolve_shorthand;

/// Pseudo-classes in the order they must appear so the later ones win (LVFHA).
const PSEUDO_ORDER: [&str; 7] = [
  ":link",
  ":visited",
  ":focus-within",
  ":focus",
  ":focus-visible",
  ":hover",
  ":active",
];

/// Everything that determines an atomic rule, and therefore its class name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AtomicRuleKey {
  pub path: SelectorPath,
  pub property: String,
  /// The final CSS value, `var(--_x)` references included.
  pub value: String,
  pub important: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AtomicRule {
  pub class_name: String,
  pub key: AtomicRuleKey,
  /// The rule as it is injected, e.g. `._syaz5scu{color:red}`.
  pub css: String,
  pub bucket: u8,
}

/// `_` followed by four characters for the selector group and four for the value.
///
/// The first five characters are shared by every class that targets the same property under
/// the same selector, which is what the runtime uses to let later classes replace earlier
/// ones.
pub fn class_name(prefix: &str, key: &AtomicRuleKey) -> String {
  let at_rule = key.path.at_rule_label();
  let group = format!(
    "{prefix}{}{}{}",
    at_rule.as_deref().unwrap_or("undefined"),
    key.path.selector(),
    key.property
  );
  let value = if key.important {
    format!("{}true", key.value)
  } else {
    key.value.clone()
  };
  format!("_{}{}", short_hash(&group, 4), short_hash(&value, 4))
}

/// The CSS text of a rule, wrapped in its at-rules from the outside in.
pub fn rule_text(class_name: &str, key: &AtomicRuleKey) -> String {
  let selector = key.path.selector().replace('&', &format!(".{class_name}"));
  let important = if key.important { "!important" } else { "" };
  let mut css = format!("{selector}{{{}:{}{important}}}", key.property, key.value);
  for at_rule in key.path.printed_at_rules().iter().rev() {
    css = format!("{at_rule}{{{css}}}");
  }
  css
}

/// The atomic rules of one compilation unit, deduplicated by [`AtomicRuleKey`].
#[derive(Debug, Default)]
pub struct StyleSheetCache {
  prefix: String,
  rules: IndexMap<AtomicRuleKey, AtomicRule>,
}

impl StyleSheetCache {
  pub fn new(class_hash_prefix: impl Into<String>) -> Self {
    StyleSheetCache {
      prefix: class_hash_prefix.into(),
      rules: IndexMap::new(),
    }
  }

  /// Returns the class name for `key`, creating the rule on first sight.
  pub fn intern(&mut self, key: AtomicRuleKey) -> &AtomicRule {
    let prefix = &self.prefix;
    self.rules.entry(key).or_insert_with_key(|key| {
      let class_name = class_name(prefix, key);
      tracing::trace!(%class_name, property = %key.property, "interned atomic rule");
      AtomicRule {
        css: rule_text(&class_name, key),
        bucket: resolve_shorthand(&key.property).bucket,
        class_name,
        key: key.clone(),
      }
    })
  }

  pub fn get(&self, key: &AtomicRuleKey) -> Option<&AtomicRule> {
    self.rules.get(key)
  }

  /// Rules in first-appearance order.
  pub fn rules(&self) -> impl Iterator<Item = &AtomicRule> + '_ {
    self.rules.values()
  }

  /// Rules in the order they must be injected: plain rules before at-rules, pseudo-classes in
  /// LVFHA order, then broader shorthands before narrower properties. Ties keep their
  /// first-appearance order.
  pub fn sorted_rules(&self) -> Vec<&AtomicRule> {
    sort_for_injection(self.rules.values())
  }

  pub fn len(&self) -> usize {
    self.rules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }
}

/// Orders rules the way [`StyleSheetCache::sorted_rules`] does, keeping the given order for
/// ties.
pub fn sort_for_injection<'r>(rules: impl IntoIterator<Item = &'r AtomicRule>) -> Vec<&'r AtomicRule> {
  let mut rules: Vec<(usize, &AtomicRule)> = rules.into_iter().enumerate().collect();
  rules.sort_by(|(a_index, a), (b_index, b)| compare_rules(a, b).then(a_index.cmp(b_index)));
  rules.into_iter().map(|(_, rule)| rule).collect()
}

fn compare_rules(a: &AtomicRule, b: &AtomicRule) -> Ordering {
  let a_at_rule = !a.key.path.at_rules.is_empty();
  let b_at_rule = !b.key.path.at_rules.is_empty();
  a_at_rule
    .cmp(&b_at_rule)
    .then_with(|| pseudo_score(&a.key.path).cmp(&pseudo_score(&b.key.path)))
    .then_with(|| a.bucket.cmp(&b.bucket))
}

fn pseudo_score(path: &SelectorPath) -> usize {
  let selector = path.selector();
  PSEUDO_ORDER
    .iter()
    .position(|pseudo| selector.ends_with(pseudo))
    .map_or(0, |index| index + 1)
}
