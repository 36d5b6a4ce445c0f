//! Language guessing for code blocks that carry no fence tag.
//!
//! Rules are checked in a fixed order and the first match wins. The order is part of the
//! observable behaviour: a snippet with both React and Python signals is `jsx`, whatever
//! the signal count.

use std::sync::LazyLock;

use regex::Regex;

/// Tag returned when no rule matches.
pub const DEFAULT_LANGUAGE: &str = "text";

/// Ordered (language, pattern) table. Each pattern is an alternation of signals.
const RULES: &[(&str, &str)] = &[
    ("jsx", r"import\s+React\b|\buse(?:State|Effect)\b"),
    ("python", r"\bdef\s|\bimport\s|\bprint\("),
    ("javascript", r"\bfunction\s|\bconst\s|console\.log"),
    ("java", r"public\s+class\b|System\.out\.println"),
    ("cpp", r"#include\b|\bint\s+main\b"),
    ("sql", r"\b(?:SELECT|FROM|WHERE)\b"),
];

struct Rule {
    language: &'static str,
    pattern: Regex,
}

static COMPILED: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|&(language, pattern)| Rule {
            language,
            pattern: Regex::new(pattern).expect("classifier patterns are valid"),
        })
        .collect()
});

/// Best-guess language tag for `code`. Total: falls back to [`DEFAULT_LANGUAGE`].
pub fn classify(code: &str) -> &'static str {
    match COMPILED.iter().find(|rule| rule.pattern.is_match(code)) {
        Some(rule) => rule.language,
        None => {
            log::trace!("No language rule matched {} bytes of code", code.len());
            DEFAULT_LANGUAGE
        }
    }
}

/// Language tags in the order they are tried.
pub fn classifier_priority() -> impl Iterator<Item = &'static str> {
    RULES.iter().map(|&(language, _)| language)
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_LANGUAGE, classifier_priority, classify};

    #[test]
    fn classify_each_language() {
        let cases = [
            ("import React from 'react';", "jsx"),
            ("const [n, setN] = useState(0);", "jsx"),
            ("def add(a, b):\n    return a + b", "python"),
            ("print('hello')", "python"),
            ("function add(a, b) { return a + b; }", "javascript"),
            ("console.log(42)", "javascript"),
            ("public class Main {}", "java"),
            ("System.out.println(\"x\");", "java"),
            ("#include <stdio.h>", "cpp"),
            ("int main() { return 0; }", "cpp"),
            ("SELECT name FROM users WHERE id = 1", "sql"),
        ];
        for (code, expected) in cases {
            assert_eq!(classify(code), expected, "code: {:?}", code);
        }
    }

    #[test]
    fn classify_defaults_to_text() {
        assert_eq!(classify(""), DEFAULT_LANGUAGE);
        assert_eq!(classify("just some words"), "text");
        assert_eq!(classify("   \n\t"), "text");
    }

    #[test]
    fn classify_follows_priority_not_signal_count() {
        // Three Python signals, one React signal: React is tried first.
        let code = "import React\nprint(1)\nprint(2)\ndef f(): pass";
        assert_eq!(classify(code), "jsx");
        // Python outranks the JavaScript console call.
        assert_eq!(classify("import os\nconsole.log(x)\nconsole.log(y)"), "python");
        // Java outranks C++.
        assert_eq!(classify("#include <x>\nint main\npublic class A"), "java");
    }

    #[test]
    fn classify_is_deterministic() {
        let code = "const x = 1;\nSELECT 1";
        assert_eq!(classify(code), classify(code));
        assert_eq!(classify(code), "javascript");
    }

    #[test]
    fn classify_sql_is_case_sensitive_whole_words() {
        assert_eq!(classify("select * from t"), "text");
        assert_eq!(classify("SELECTED FROMAGE"), "text");
    }

    #[test]
    fn classify_requires_word_boundaries() {
        assert_eq!(classify("undef x"), "text");
        assert_eq!(classify("reimport\tthings"), "text");
    }

    #[test]
    fn priority_order_is_fixed() {
        let order: Vec<&str> = classifier_priority().collect();
        assert_eq!(order, ["jsx", "python", "javascript", "java", "cpp", "sql"]);
    }
}
