//! Substitution rules: ordered (pattern → replacement) pairs and their matcher.
//!
//! A rule set is always evaluated against a snapshot of the input: every rule
//! searches the original text, a byte range claimed by a higher-priority rule
//! can't be claimed again, and all replacements are spliced in one pass. No rule
//! ever sees another rule's output.
//!
//! Priority: qualified rules first, then bare rules; longer patterns before
//! shorter ones within a tier; insertion order breaks ties.
//!
//! This is textual substitution, not syntax-aware rewriting. A string literal or
//! comment that happens to spell the old name at a word boundary is rewritten too.

use serde::Serialize;

use crate::naming::Identifier;

/// How a rule's pattern is located in text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Matching {
    /// Identifier joined with a fixed prefix/suffix (`PlayTicket.User`, `user-`).
    /// Boundary-checked like [`Matching::Boundary`]; evaluated before bare rules.
    Qualified,
    /// Bare identifier delimited by word or camel-case boundaries.
    Boundary,
    /// Plain substring, no boundary checks.
    Literal,
}

impl Matching {
    fn tier(self) -> u8 {
        match self {
            Matching::Qualified => 0,
            Matching::Boundary | Matching::Literal => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubstitutionRule {
    pub pattern: String,
    pub replacement: String,
    pub matching: Matching,
    pub label: String,
}

impl SubstitutionRule {
    pub fn new(
        pattern: impl Into<String>,
        replacement: impl Into<String>,
        matching: Matching,
        label: impl Into<String>,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            matching,
            label: label.into(),
        }
    }

    fn find_in(&self, text: &str) -> Vec<usize> {
        match self.matching {
            Matching::Literal => find_literal_matches(text, &self.pattern),
            Matching::Qualified | Matching::Boundary => find_term_matches(text, &self.pattern),
        }
    }
}

/// A match claimed by one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    pub start: usize,
    pub end: usize,
    pub rule: usize,
}

/// Result of applying a rule set to one string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub text: String,
    pub replacements: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<SubstitutionRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content rules for renaming `from` to `to` in file bodies.
    ///
    /// The all-lowercase single-word pattern resolves to lowerCamel (`user` →
    /// `cashVoucher`) so rewritten locals stay valid C# identifiers.
    pub fn for_content(from: &Identifier, to: &Identifier) -> Self {
        let mut set = Self::new();

        set.push(SubstitutionRule::new(
            format!("{}.", from),
            format!("{}.", to),
            Matching::Qualified,
            "dot-qualified",
        ));
        set.push(SubstitutionRule::new(
            format!("{}-", from.kebab()),
            format!("{}-", to.kebab()),
            Matching::Qualified,
            "kebab-prefix",
        ));

        set.push(SubstitutionRule::new(from.as_str(), to.as_str(), Matching::Boundary, "PascalCase"));
        set.push(SubstitutionRule::new(
            from.lower_camel(),
            to.lower_camel(),
            Matching::Boundary,
            "camelCase",
        ));
        set.push(SubstitutionRule::new(
            from.lowercase(),
            to.lowercase(),
            Matching::Boundary,
            "lowercase",
        ));
        set.push(SubstitutionRule::new(from.kebab(), to.kebab(), Matching::Boundary, "kebab-case"));
        set.push(SubstitutionRule::new(from.snake(), to.snake(), Matching::Boundary, "snake_case"));
        set.push(SubstitutionRule::new(
            from.shouty(),
            to.shouty(),
            Matching::Boundary,
            "SHOUTY_SNAKE",
        ));
        set.push(SubstitutionRule::new(
            from.uppercase(),
            to.uppercase(),
            Matching::Boundary,
            "UPPERCASE",
        ));

        set
    }

    /// Path-segment rules for renaming `from` to `to` in file and folder names.
    ///
    /// Plain substring matching; kebab-case wins the all-lowercase pattern
    /// because service folders are kebab-cased.
    pub fn for_paths(from: &Identifier, to: &Identifier) -> Self {
        let mut set = Self::new();
        set.push(SubstitutionRule::new(from.as_str(), to.as_str(), Matching::Literal, "PascalCase"));
        set.push(SubstitutionRule::new(from.kebab(), to.kebab(), Matching::Literal, "kebab-case"));
        set.push(SubstitutionRule::new(
            from.lowercase(),
            to.lowercase(),
            Matching::Literal,
            "lowercase",
        ));
        set.push(SubstitutionRule::new(from.snake(), to.snake(), Matching::Literal, "snake_case"));
        set
    }

    /// Add `{qualifier}{sep}{from}` → `{qualifier}{sep}{to}` for each separator.
    pub fn qualified_by(
        mut self,
        qualifier: &str,
        separators: &[&str],
        from: &str,
        to: &str,
    ) -> Self {
        for sep in separators {
            self.push(SubstitutionRule::new(
                format!("{}{}{}", qualifier, sep, from),
                format!("{}{}{}", qualifier, sep, to),
                Matching::Qualified,
                format!("qualified '{}{}'", qualifier, sep),
            ));
        }
        self
    }

    /// Add a rule unless its pattern is empty, a no-op, or already present.
    pub fn push(&mut self, rule: SubstitutionRule) {
        if rule.pattern.is_empty() || rule.pattern == rule.replacement {
            return;
        }
        if self.rules.iter().any(|r| r.pattern == rule.pattern) {
            return;
        }
        self.rules.push(rule);
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Rules in evaluation order.
    pub fn ordered(&self) -> Vec<&SubstitutionRule> {
        let mut ordered: Vec<&SubstitutionRule> = self.rules.iter().collect();
        // sort_by is stable, so insertion order breaks ties
        ordered.sort_by(|a, b| {
            a.matching
                .tier()
                .cmp(&b.matching.tier())
                .then(b.pattern.len().cmp(&a.pattern.len()))
        });
        ordered
    }

    /// Locate non-overlapping matches, highest priority first, sorted by position.
    pub fn find_matches(&self, text: &str) -> Vec<RuleMatch> {
        let ordered = self.ordered();
        let mut claimed: Vec<RuleMatch> = Vec::new();

        for (index, rule) in ordered.iter().enumerate() {
            for start in rule.find_in(text) {
                let end = start + rule.pattern.len();
                if claimed.iter().any(|m| start < m.end && end > m.start) {
                    continue;
                }
                claimed.push(RuleMatch {
                    start,
                    end,
                    rule: index,
                });
            }
        }

        claimed.sort_by_key(|m| m.start);
        claimed
    }

    /// Apply all rules to `text` in a single snapshot pass.
    pub fn apply(&self, text: &str) -> Substitution {
        let ordered = self.ordered();
        let matches = self.find_matches(text);

        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for m in &matches {
            out.push_str(&text[cursor..m.start]);
            out.push_str(&ordered[m.rule].replacement);
            cursor = m.end;
        }
        out.push_str(&text[cursor..]);

        Substitution {
            text: out,
            replacements: matches.len(),
        }
    }
}

// ============================================================================
// Matching
// ============================================================================

/// `User`, `CashVoucher`: an uppercase letter followed by a lowercase one.
fn starts_pascal_word(term: &str) -> bool {
    let mut chars = term.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(a), Some(b)) if a.is_uppercase() && b.is_lowercase()
    )
}

fn left_ok(text: &str, start: usize, term: &str) -> bool {
    let Some(first) = term.chars().next() else {
        return false;
    };
    if !first.is_alphanumeric() {
        return true;
    }
    match text[..start].chars().next_back() {
        None => true,
        Some(prev) if !prev.is_alphanumeric() => true,
        // camel hump: IUserService, CreateUserDto
        Some(_) => starts_pascal_word(term),
    }
}

fn right_ok(text: &str, end: usize, term: &str) -> bool {
    let Some(last) = term.chars().next_back() else {
        return false;
    };
    if !last.is_alphanumeric() {
        return true;
    }
    let mut rest = text[end..].chars();
    match rest.next() {
        None => true,
        Some(next) if !next.is_alphanumeric() => true,
        // camel hump: UserService, userId
        Some(next) if !last.is_uppercase() => next.is_uppercase(),
        // after an acronym the hump needs a following lowercase: ShopAIDbContext, not USERS
        Some(next) => next.is_uppercase() && rest.next().is_some_and(char::is_lowercase),
    }
}

/// Find occurrences of `term` in `text` that sit on word or camel-case boundaries.
///
/// - Left: start of text, a non-alphanumeric char (`_`, `.`, space), or any
///   alphanumeric when `term` starts a Pascal word (`IUser`).
/// - Right: end of text, a non-alphanumeric char, or an uppercase letter that
///   starts a new word. After a term ending in uppercase that letter must be
///   followed by a lowercase one (`ShopAIService`, but not `USERS`).
///
/// Won't match `User` inside `Username` or `user` inside `superuser`.
pub fn find_term_matches(text: &str, term: &str) -> Vec<usize> {
    let mut matches = Vec::new();

    if term.is_empty() || term.len() > text.len() {
        return matches;
    }

    let mut start = 0;
    while let Some(pos) = text[start..].find(term) {
        let abs = start + pos;
        let end = abs + term.len();

        if left_ok(text, abs, term) && right_ok(text, end, term) {
            matches.push(abs);
        }

        start = abs + text[abs..].chars().next().map_or(1, char::len_utf8);
    }

    matches
}

/// Find all occurrences of `term` in `text` using exact substring matching.
pub fn find_literal_matches(text: &str, term: &str) -> Vec<usize> {
    let mut matches = Vec::new();

    if term.is_empty() || term.len() > text.len() {
        return matches;
    }

    let mut start = 0;
    while let Some(pos) = text[start..].find(term) {
        let abs = start + pos;
        matches.push(abs);
        start = abs + text[abs..].chars().next().map_or(1, char::len_utf8);
    }

    matches
}
