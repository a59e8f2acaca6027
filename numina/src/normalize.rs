//! Text normalisation
//!
//! Browser selections arrive as loose prose, Unicode math or LaTeX
//! fragments. `normalize` rewrites them into parser syntax before parsing.

use regex::Regex;
use std::sync::LazyLock;

/// Upper bound on nested `\frac` / `\sqrt` rewrites
const MAX_LATEX_PASSES: usize = 16;

static PROMPT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^(what\s+is|calculate|compute|evaluate|solve|simplify)\b[\s:]*").ok()
});

static LATEX_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\\frac\s*\{([^{}]*)\}\s*\{([^{}]*)\}", "($1)/($2)"),
        (r"\\sqrt\s*\{([^{}]*)\}", "sqrt($1)"),
    ]
    .into_iter()
    .filter_map(|(pattern, rep)| Regex::new(pattern).ok().map(|re| (re, rep)))
    .collect()
});

/// Literal substitutions, applied in order
static SYMBOLS: [(&str, &str); 14] = [
    ("\\left(", "("),
    ("\\right)", ")"),
    ("\\cdot", "*"),
    ("\\times", "*"),
    ("\\div", "/"),
    ("\\pi", "pi"),
    ("**", "^"),
    ("×", "*"),
    ("·", "*"),
    ("÷", "/"),
    ("−", "-"),
    ("–", "-"),
    ("π", "pi"),
    ("√(", "sqrt("),
];

/// Rewrite free text into parser syntax
pub fn normalize(text: &str) -> String {
    let mut s = text.trim().trim_matches('$').trim().to_string();

    if let Some(re) = PROMPT.as_ref() {
        s = re.replace(&s, "").into_owned();
    }

    s = s.trim().trim_end_matches('?').trim_end().to_string();
    if let Some(stripped) = s.strip_suffix('=') {
        s = stripped.trim_end().to_string();
    }

    for (from, to) in SYMBOLS.iter() {
        if s.contains(from) {
            s = s.replace(from, to);
        }
    }

    // Innermost groups first, until nothing changes
    for _ in 0..MAX_LATEX_PASSES {
        let mut changed = false;
        for (re, rep) in LATEX_RULES.iter() {
            let next = re.replace_all(&s, *rep);
            if next != s {
                s = next.into_owned();
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    s.trim().to_string()
}

/// Canonicalise a backend reply: `**` becomes `^`
pub fn canonical_power(text: &str) -> String {
    text.replace("**", "^")
}
