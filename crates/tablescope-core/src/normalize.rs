//! Identifier normalization used when comparing requested names with catalog names.
//!
//! Two kinds of normalization are provided:
//!
//! - [`homogenize`]: case folding, so `Customers`, `CUSTOMERS` and `customers`
//!   compare equal.
//! - [`pluralize`] / [`singularize`] / [`is_plural`]: English inflection, so a
//!   request for `customer` can find a table named `Customers` and vice versa.
//!
//! Inflection works on the last `_`-separated segment of an identifier, which
//! keeps compound names such as `order_item` -> `order_items` and
//! `sales_person` -> `sales_people` sensible. Irregular nouns and uncountable
//! nouns are checked first, then an ordered list of suffix rules where the
//! first matching rule wins.
//!
//! All functions are pure and safe to call from any thread.

use regex::Regex;
use std::sync::OnceLock;

/// Words that are spelled the same in singular and plural form.
const UNCOUNTABLE: &[&str] = &[
    "data",
    "deer",
    "equipment",
    "fish",
    "information",
    "metadata",
    "money",
    "news",
    "police",
    "rice",
    "series",
    "sheep",
    "species",
];

/// Irregular `(singular, plural)` pairs.
const IRREGULAR: &[(&str, &str)] = &[
    ("child", "children"),
    ("criterion", "criteria"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("man", "men"),
    ("mouse", "mice"),
    ("move", "moves"),
    ("person", "people"),
    ("sex", "sexes"),
    ("tooth", "teeth"),
    ("woman", "women"),
];

const PLURAL_RULES: &[(&str, &str)] = &[
    (r"(quiz)$", "${1}zes"),
    (r"^(ox)$", "${1}en"),
    (r"(matr|vert|ind)(?:ix|ex)$", "${1}ices"),
    (r"(x|ch|ss|sh)$", "${1}es"),
    (r"([^aeiouy]|qu)y$", "${1}ies"),
    (r"(hive)$", "${1}s"),
    (r"(?:([^f])fe|([lr])f)$", "${1}${2}ves"),
    (r"sis$", "ses"),
    (r"(buffal|tomat|potat)o$", "${1}oes"),
    (r"(bu)s$", "${1}ses"),
    (r"(alias|status)$", "${1}es"),
    (r"(octop|vir)(?:us|i)$", "${1}i"),
    (r"^(ax|test)is$", "${1}es"),
    (r"s$", "s"),
    (r"$", "s"),
];

const SINGULAR_RULES: &[(&str, &str)] = &[
    (r"(database|base)s$", "${1}"),
    (r"(quiz)zes$", "${1}"),
    (r"(matr)ices$", "${1}ix"),
    (r"(vert|ind)ices$", "${1}ex"),
    (r"^(ox)en$", "${1}"),
    (r"(alias|status)(?:es)?$", "${1}"),
    (r"(octop|vir)(?:us|i)$", "${1}us"),
    (r"^(a)x[ie]s$", "${1}xis"),
    (r"(cris|test)(?:is|es)$", "${1}is"),
    (r"(shoe)s$", "${1}"),
    (r"(o)es$", "${1}"),
    (r"(bus)(?:es)?$", "${1}"),
    (r"(m|l)ice$", "${1}ouse"),
    (r"(x|ch|ss|sh)es$", "${1}"),
    (r"(m)ovies$", "${1}ovie"),
    (
        r"^(brown|calor|cook|d|gen|goal|hipp|l|p|prair|rook|self|smooth|t|zomb)ies$",
        "${1}ie",
    ),
    (r"([^aeiouy]|qu)ies$", "${1}y"),
    (r"([lr])ves$", "${1}f"),
    (r"(tive)s$", "${1}"),
    (r"(hive)s$", "${1}"),
    (r"([^f])ves$", "${1}fe"),
    (r"(analy|ba|diagno|parenthe|progno|synop|the)(?:sis|ses)$", "${1}sis"),
    (r"(ss)$", "${1}"),
    (r"s$", ""),
];

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

fn compile(rules: &[(&str, &'static str)]) -> Vec<Rule> {
    rules
        .iter()
        .map(|&(pattern, replacement)| Rule {
            pattern: Regex::new(&format!("(?i){pattern}")).expect("invalid inflection rule"),
            replacement,
        })
        .collect()
}

fn plural_rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| compile(PLURAL_RULES))
}

fn singular_rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| compile(SINGULAR_RULES))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Number {
    Singular,
    Plural,
}

/// Folds an identifier to the canonical (lower) case used for comparisons.
pub fn homogenize(name: &str) -> String {
    name.to_lowercase()
}

/// Returns the English plural form of `word`.
///
/// Words that are already plural are returned unchanged where the rules can
/// tell (`users` stays `users`).
pub fn pluralize(word: &str) -> String {
    inflect(word, Number::Plural)
}

/// Returns the English singular form of `word`.
///
/// Words without a recognisable plural ending are returned unchanged.
pub fn singularize(word: &str) -> String {
    inflect(word, Number::Singular)
}

/// Heuristic check for whether `word` is in plural form.
///
/// Used to avoid singularizing names that are not plausibly plural, e.g.
/// `status` or `address`.
pub fn is_plural(word: &str) -> bool {
    let (_, last) = split_last_segment(word);
    let lower = last.to_lowercase();
    if lower.is_empty() {
        return false;
    }
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return true;
    }
    if IRREGULAR.iter().any(|(_, plural)| *plural == lower) {
        return true;
    }
    if IRREGULAR.iter().any(|(singular, _)| *singular == lower) {
        return false;
    }
    homogenize(&singularize(word)) != homogenize(word)
}

fn inflect(word: &str, number: Number) -> String {
    let (prefix, last) = split_last_segment(word);
    if last.is_empty() {
        return word.to_string();
    }

    let lower = last.to_lowercase();
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }

    for &(singular, plural) in IRREGULAR {
        let (from, to) = match number {
            Number::Plural => (singular, plural),
            Number::Singular => (plural, singular),
        };
        if lower == from {
            return format!("{prefix}{}", match_case(last, to));
        }
        if lower == to {
            return word.to_string();
        }
    }

    let rules = match number {
        Number::Plural => plural_rules(),
        Number::Singular => singular_rules(),
    };

    rules
        .iter()
        .find(|rule| rule.pattern.is_match(last))
        .map(|rule| {
            let inflected = rule.pattern.replace(last, rule.replacement);
            format!("{prefix}{inflected}")
        })
        .unwrap_or_else(|| word.to_string())
}

/// Splits `word` into everything up to and including the last `_`, and the
/// final segment that inflection applies to.
fn split_last_segment(word: &str) -> (&str, &str) {
    match word.rfind('_') {
        Some(idx) => word.split_at(idx + 1),
        None => ("", word),
    }
}

/// Applies the capitalization style of `original` to `replacement`.
fn match_case(original: &str, replacement: &str) -> String {
    let mut chars = original.chars();
    let Some(first) = chars.next() else {
        return replacement.to_string();
    };

    let has_letters = original.chars().any(char::is_alphabetic);
    if has_letters && original.chars().count() > 1 && !original.chars().any(char::is_lowercase) {
        return replacement.to_uppercase();
    }

    if first.is_uppercase() {
        let mut out = String::with_capacity(replacement.len());
        let mut rest = replacement.chars();
        if let Some(head) = rest.next() {
            out.extend(head.to_uppercase());
        }
        out.extend(rest);
        return out;
    }

    replacement.to_string()
}
