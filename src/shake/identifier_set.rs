//! Include/exclude rule matching over qualified names.
//!
//! Rule grammar: `*` matches everything; `pkg.*` matches any entity in
//! `pkg` or a descendant package; `pkg.Type` matches the type and all of
//! its members; `pkg.Type#member` matches that exact member.
//!
//! Each rule carries a "used" flag, set the first time it fires, so dead
//! configuration can be reported at end-of-run.

use std::fmt;

use super::ConfigError;

/// One parsed rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// `*`
    Any,
    /// `pkg.sub.*` — the stored name is the package without the wildcard.
    Package(String),
    /// `pkg.Type`
    Type(String),
    /// `pkg.Type#member`
    Member { type_name: String, member: String },
}

impl Rule {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let malformed = || ConfigError::MalformedRule {
            rule: text.to_string(),
        };

        if text == "*" {
            return Ok(Rule::Any);
        }
        if let Some((type_name, member)) = text.split_once('#') {
            if !valid_dotted(type_name) || !valid_segment(member) {
                return Err(malformed());
            }
            return Ok(Rule::Member {
                type_name: type_name.to_string(),
                member: member.to_string(),
            });
        }
        if let Some(package) = text.strip_suffix(".*") {
            if !valid_dotted(package) {
                return Err(malformed());
            }
            return Ok(Rule::Package(package.to_string()));
        }
        if !valid_dotted(text) {
            return Err(malformed());
        }
        Ok(Rule::Type(text.to_string()))
    }

    /// Whether this rule matches the type itself (member rules do not).
    fn matches_type(&self, qualified_name: &str) -> bool {
        match self {
            Rule::Any => true,
            Rule::Package(package) => in_package(qualified_name, package),
            Rule::Type(name) => name == qualified_name,
            Rule::Member { .. } => false,
        }
    }

    /// Whether this rule names the type through a member reference.
    fn names_type(&self, qualified_name: &str) -> bool {
        matches!(self, Rule::Member { type_name, .. } if type_name == qualified_name)
    }

    fn matches_member(&self, type_name: &str, member: &str) -> bool {
        match self {
            Rule::Any => true,
            Rule::Package(package) => in_package(type_name, package),
            Rule::Type(name) => name == type_name,
            Rule::Member {
                type_name: rule_type,
                member: rule_member,
            } => rule_type == type_name && rule_member == member,
        }
    }

    /// Specificity order for tie-breaking: member > type > package wildcard
    /// (longer package first) > `*`.
    fn specificity(&self) -> (u8, usize) {
        match self {
            Rule::Member { .. } => (3, 0),
            Rule::Type(_) => (2, 0),
            Rule::Package(package) => (1, package.split('.').count()),
            Rule::Any => (0, 0),
        }
    }

    /// True when every entity this rule matches, `other` also matches, and
    /// `other` is strictly broader.
    fn implied_by(&self, other: &Rule) -> bool {
        if self == other {
            return false;
        }
        match (self, other) {
            (_, Rule::Any) => true,
            (Rule::Package(p1), Rule::Package(p2)) => in_package_name(p1, p2),
            (Rule::Type(t), Rule::Package(p)) => in_package(t, p),
            (Rule::Member { type_name, .. }, Rule::Package(p)) => in_package(type_name, p),
            (Rule::Member { type_name, .. }, Rule::Type(t)) => type_name == t,
            _ => false,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Any => write!(f, "*"),
            Rule::Package(package) => write!(f, "{package}.*"),
            Rule::Type(name) => write!(f, "{name}"),
            Rule::Member { type_name, member } => write!(f, "{type_name}#{member}"),
        }
    }
}

/// Whether `qualified_name` lies in `package` or a descendant package.
fn in_package(qualified_name: &str, package: &str) -> bool {
    qualified_name
        .strip_prefix(package)
        .is_some_and(|rest| rest.starts_with('.'))
}

/// Whether package `p1` equals or descends from `p2`.
fn in_package_name(p1: &str, p2: &str) -> bool {
    p1 == p2 || in_package(p1, p2)
}

fn valid_dotted(text: &str) -> bool {
    !text.is_empty() && text.split('.').all(valid_segment)
}

fn valid_segment(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A compiled pair of include/exclude rule lists with used-flag tracking.
///
/// An empty include list means include-everything; excludes always win.
#[derive(Debug, Clone)]
pub struct IdentifierSet {
    includes: Vec<Rule>,
    excludes: Vec<Rule>,
    include_used: Vec<bool>,
    exclude_used: Vec<bool>,
}

impl IdentifierSet {
    pub fn new(includes: &[String], excludes: &[String]) -> Result<Self, ConfigError> {
        let includes = parse_list(includes)?;
        let excludes = parse_list(excludes)?;
        check_redundancy(&includes)?;
        check_redundancy(&excludes)?;
        let include_used = vec![false; includes.len()];
        let exclude_used = vec![false; excludes.len()];
        Ok(Self {
            includes,
            excludes,
            include_used,
            exclude_used,
        })
    }

    /// True when this set matches everything: no excludes, and includes
    /// either empty or just `*`.
    pub fn matches_everything(&self) -> bool {
        self.excludes.is_empty()
            && (self.includes.is_empty() || self.includes == [Rule::Any])
    }

    /// Mark every trivially-firing rule used, for the fast path that skips
    /// matching entirely.
    pub(crate) fn mark_wildcards_used(&mut self) {
        for (i, rule) in self.includes.iter().enumerate() {
            if *rule == Rule::Any {
                self.include_used[i] = true;
            }
        }
    }

    /// Decide whether a type belongs to the set: any matching exclude rules
    /// it out; otherwise any include matching it (or naming it through a
    /// member reference) rules it in; an empty include list includes all.
    pub fn includes_type(&mut self, qualified_name: &str) -> bool {
        if let Some(i) = best_match(&self.excludes, |r| r.matches_type(qualified_name)) {
            self.exclude_used[i] = true;
            return false;
        }
        if self.includes.is_empty() {
            return true;
        }
        if let Some(i) = best_match(&self.includes, |r| {
            r.matches_type(qualified_name) || r.names_type(qualified_name)
        }) {
            self.include_used[i] = true;
            return true;
        }
        false
    }

    /// Decide whether a member of an already-reached type is retained.
    ///
    /// Excludes always drop it. Otherwise a member is retained unless the
    /// includes single out specific members of its type, in which case only
    /// the listed members survive.
    pub fn retains_member(&mut self, type_name: &str, member: &str) -> bool {
        if let Some(i) = best_match(&self.excludes, |r| r.matches_member(type_name, member)) {
            self.exclude_used[i] = true;
            return false;
        }
        if !self.includes.iter().any(|r| r.names_type(type_name)) {
            return true;
        }
        if let Some(i) = best_match(&self.includes, |r| {
            matches!(r, Rule::Member { .. }) && r.matches_member(type_name, member)
        }) {
            self.include_used[i] = true;
            return true;
        }
        false
    }

    pub fn unused_includes(&self) -> Vec<String> {
        unused(&self.includes, &self.include_used)
    }

    pub fn unused_excludes(&self) -> Vec<String> {
        unused(&self.excludes, &self.exclude_used)
    }
}

fn parse_list(rules: &[String]) -> Result<Vec<Rule>, ConfigError> {
    rules.iter().map(|r| Rule::parse(r)).collect()
}

/// A rule strictly more specific than another rule in the same list (or a
/// duplicate of one) is dead configuration.
fn check_redundancy(rules: &[Rule]) -> Result<(), ConfigError> {
    for (i, rule) in rules.iter().enumerate() {
        for (j, other) in rules.iter().enumerate() {
            if i == j {
                continue;
            }
            if rule.implied_by(other) || (i > j && rule == other) {
                return Err(ConfigError::RedundantRule {
                    rule: rule.to_string(),
                    covered_by: other.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Index of the most specific matching rule.
fn best_match(rules: &[Rule], matches: impl Fn(&Rule) -> bool) -> Option<usize> {
    rules
        .iter()
        .enumerate()
        .filter(|&(_, r)| matches(r))
        .max_by_key(|&(_, r)| r.specificity())
        .map(|(i, _)| i)
}

fn unused(rules: &[Rule], used: &[bool]) -> Vec<String> {
    rules
        .iter()
        .zip(used)
        .filter(|&(_, &used)| !used)
        .map(|(rule, _)| rule.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(includes: &[&str], excludes: &[&str]) -> IdentifierSet {
        let includes: Vec<String> = includes.iter().map(|s| s.to_string()).collect();
        let excludes: Vec<String> = excludes.iter().map(|s| s.to_string()).collect();
        IdentifierSet::new(&includes, &excludes).unwrap()
    }

    #[test]
    fn test_wildcard_includes_everything() {
        let mut rules = set(&["*"], &[]);
        assert!(rules.includes_type("a.B"));
        assert!(rules.includes_type("C"));
    }

    #[test]
    fn test_package_wildcard_covers_descendants() {
        let mut rules = set(&["a.b.*"], &[]);
        assert!(rules.includes_type("a.b.M"));
        assert!(rules.includes_type("a.b.c.M"));
        assert!(!rules.includes_type("a.M"));
        assert!(!rules.includes_type("a.bc.M"));
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let mut rules = set(&["a.*"], &["a.Drop"]);
        assert!(rules.includes_type("a.Keep"));
        assert!(!rules.includes_type("a.Drop"));
    }

    #[test]
    fn test_member_include_names_type() {
        let mut rules = set(&["a.M#x"], &[]);
        assert!(rules.includes_type("a.M"));
        assert!(rules.retains_member("a.M", "x"));
        // Other members of a type included only by member reference drop.
        assert!(!rules.retains_member("a.M", "y"));
    }

    #[test]
    fn test_members_of_type_include_retained() {
        let mut rules = set(&["a.M"], &["a.M#secret"]);
        assert!(rules.retains_member("a.M", "x"));
        assert!(!rules.retains_member("a.M", "secret"));
    }

    #[test]
    fn test_redundant_rule_rejected() {
        let includes = vec!["a.*".to_string(), "a.M".to_string()];
        let error = IdentifierSet::new(&includes, &[]).unwrap_err();
        assert!(matches!(error, ConfigError::RedundantRule { .. }));
    }

    #[test]
    fn test_duplicate_rule_rejected() {
        let includes = vec!["a.M".to_string(), "a.M".to_string()];
        assert!(IdentifierSet::new(&includes, &[]).is_err());
    }

    #[test]
    fn test_malformed_rules_rejected() {
        for bad in ["", "a..b", "#x", "a.b#", "a b", "a.*.b", "*.a"] {
            assert!(Rule::parse(bad).is_err(), "expected '{bad}' to be rejected");
        }
    }

    #[test]
    fn test_unused_tracking() {
        let mut rules = set(&["a.*", "b.*"], &["c.*"]);
        rules.includes_type("a.M");
        assert_eq!(rules.unused_includes(), vec!["b.*"]);
        assert_eq!(rules.unused_excludes(), vec!["c.*"]);
    }

    #[test]
    fn test_member_rule_under_package_wildcard_rejected() {
        // The wildcard already covers the member, so the narrower rule is
        // dead configuration.
        let includes = vec!["a.*".to_string(), "a.M#x".to_string()];
        assert!(IdentifierSet::new(&includes, &[]).is_err());
    }
}
