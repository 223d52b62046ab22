//! Name transformer: turns free text into canonical service/solution identifiers.
//!
//! `normalize("cash voucher")` → `CashVoucher`, `normalize("CoreOps2")` → `CoreOps2`,
//! `normalize("ui")` → `UI`. Words of two characters or fewer are treated as
//! acronyms and fully upper-cased; longer words are capitalized.

use heck::{ToKebabCase, ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use crate::error::{Error, Result};

/// Canonical camel-cased name of a service or solution.
///
/// Produced by [`normalize`] / [`normalize_simple`], or adopted verbatim from a
/// name already on disk via [`Identifier::adopt`]. An empty identifier means
/// "no rename requested".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Take an existing name (solution file stem, template folder) as-is.
    ///
    /// Returns `None` unless the name is non-empty letters and digits, so
    /// `ABCShop` survives where `normalize` would give `AbcShop`.
    pub fn adopt(raw: &str) -> Option<Identifier> {
        let raw = raw.trim();
        if raw.is_empty() || !raw.chars().all(|c| c.is_alphanumeric()) {
            return None;
        }
        Some(Identifier(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `CashVoucher` → `cash-voucher`. Used for folder and resource names.
    pub fn kebab(&self) -> String {
        self.0.to_kebab_case()
    }

    /// `CashVoucher` → `cashVoucher`.
    pub fn lower_camel(&self) -> String {
        self.0.to_lower_camel_case()
    }

    /// `CashVoucher` → `cash_voucher`.
    pub fn snake(&self) -> String {
        self.0.to_snake_case()
    }

    /// `CashVoucher` → `CASH_VOUCHER`.
    pub fn shouty(&self) -> String {
        self.0.to_shouty_snake_case()
    }

    pub fn lowercase(&self) -> String {
        self.0.to_lowercase()
    }

    pub fn uppercase(&self) -> String {
        self.0.to_uppercase()
    }

    /// True when `other`'s text occurs inside this identifier, ignoring case.
    pub fn contains_ignore_case(&self, other: &Identifier) -> bool {
        !other.is_empty() && self.lowercase().contains(&other.lowercase())
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Which transformer variant to apply to raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingMode {
    /// Split compound words back into parts before re-casing.
    #[default]
    Enhanced,
    /// Treat each list item as one opaque word.
    Simple,
}

fn separator_pattern() -> &'static Regex {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    SEPARATORS.get_or_init(|| Regex::new(r"[^\p{L}\p{N}]+").expect("Invalid regex pattern"))
}

/// Normalize free text into an identifier, splitting compound words.
pub fn normalize(raw: &str) -> Identifier {
    let words: Vec<String> = separator_pattern()
        .split(raw)
        .filter(|fragment| !fragment.is_empty())
        .flat_map(split_compound)
        .map(|word| recase(&word))
        .collect();

    Identifier(words.concat())
}

/// Normalize free text into an identifier without sub-word splitting.
///
/// `cash voucher` → `Cashvoucher`.
pub fn normalize_simple(raw: &str) -> Identifier {
    let word: String = raw.chars().filter(|c| c.is_alphanumeric()).collect();
    if word.is_empty() {
        return Identifier::default();
    }
    Identifier(recase(&word))
}

pub fn normalize_with(raw: &str, mode: NamingMode) -> Identifier {
    match mode {
        NamingMode::Enhanced => normalize(raw),
        NamingMode::Simple => normalize_simple(raw),
    }
}

/// Parse a comma-separated list of names.
///
/// Empty items and duplicates are dropped; first-seen order is kept.
pub fn parse_list(raw: &str, mode: NamingMode) -> Vec<Identifier> {
    let mut out: Vec<Identifier> = Vec::new();
    for item in raw.split(',') {
        let id = normalize_with(item, mode);
        if !id.is_empty() && !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

/// Parse several raw arguments, each of which may itself be a comma list.
pub fn parse_args(raw: &[String], mode: NamingMode) -> Vec<Identifier> {
    let mut out: Vec<Identifier> = Vec::new();
    for arg in raw {
        for id in parse_list(arg, mode) {
            if !out.contains(&id) {
                out.push(id);
            }
        }
    }
    out
}

/// Reject identifiers that can't name a .NET project.
pub fn validate_identifier(id: &Identifier, field: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::validation_invalid_argument(
            field,
            "Name must contain at least one letter or number",
            None,
            None,
        ));
    }

    if id.as_str().starts_with(|c: char| c.is_numeric()) {
        return Err(Error::validation_invalid_argument(
            field,
            "Name must not start with a digit",
            Some(id.to_string()),
            None,
        ));
    }

    Ok(())
}

/// Split `CoreOps2` into `Core`, `Ops`, `2` and `HTTPServer` into `HTTP`, `Server`.
fn split_compound(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut parts = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());

            let lower_to_upper = prev.is_lowercase() && c.is_uppercase();
            let acronym_end = prev.is_uppercase() && c.is_uppercase() && next_is_lower;
            let letter_digit = prev.is_alphabetic() != c.is_alphabetic();

            if (lower_to_upper || acronym_end || letter_digit) && !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        parts.push(current);
    }

    parts
}

fn recase(word: &str) -> String {
    if word.chars().count() <= 2 {
        return word.to_uppercase();
    }

    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
    }
}
