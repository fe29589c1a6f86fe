//! CSS text helpers shared by the normalizer and the atomic class generator.

mod property;
mod selector;
pub mod text;

pub use property::{
  collapse_whitespace, format_number, is_unitless, kebab_case, normalize_content_value,
  number_value, split_important,
};
pub use selector::{
  is_at_rule, is_pseudo, normalize_at_query, split_at_rule, split_selector_list, SelectorPath,
};
