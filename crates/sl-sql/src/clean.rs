//! Normalization of raw model output before splitting.

use regex::Regex;
use std::sync::OnceLock;

static SQL_FENCE_RE: OnceLock<Regex> = OnceLock::new();
static FENCE_RE: OnceLock<Regex> = OnceLock::new();
static LABEL_RE: OnceLock<Regex> = OnceLock::new();
static BLANK_LINES_RE: OnceLock<Regex> = OnceLock::new();

fn sql_fence_regex() -> &'static Regex {
    SQL_FENCE_RE.get_or_init(|| Regex::new(r"(?i)```sql\s*").expect("valid regex"))
}

fn fence_regex() -> &'static Regex {
    FENCE_RE.get_or_init(|| Regex::new(r"```\s*").expect("valid regex"))
}

fn label_regex() -> &'static Regex {
    LABEL_RE.get_or_init(|| Regex::new(r"(?im)^[ \t]*SQL[ \t]*:[ \t]*").expect("valid regex"))
}

fn blank_lines_regex() -> &'static Regex {
    BLANK_LINES_RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("valid regex"))
}

/// Strip code fences and `SQL:` labels, collapse blank lines and repeated
/// spaces. Text inside single-quoted literals keeps its spacing.
pub fn normalize_model_output(raw: &str) -> String {
    let text = sql_fence_regex().replace_all(raw, "");
    let text = fence_regex().replace_all(&text, "");
    let text = label_regex().replace_all(&text, "");
    let text = text.replace("\r\n", "\n");
    let text = blank_lines_regex().replace_all(text.trim(), "\n");
    collapse_spaces(&text)
}

fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_literal = false;
    let mut prev_space = false;
    for c in text.chars() {
        if c == '\'' {
            in_literal = !in_literal;
        }
        if !in_literal && c == ' ' {
            if prev_space {
                continue;
            }
            prev_space = true;
        } else {
            prev_space = false;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_sql_fence() {
        let raw = "```sql\nINSERT INTO departments (name) VALUES ('CS');\n```";
        assert_eq!(
            normalize_model_output(raw),
            "INSERT INTO departments (name) VALUES ('CS');"
        );
    }

    #[test]
    fn test_strips_uppercase_and_bare_fences() {
        let raw = "```SQL\nSELECT 1;\n```\n```\nSELECT 2;\n```";
        assert_eq!(normalize_model_output(raw), "SELECT 1;\nSELECT 2;");
    }

    #[test]
    fn test_collapses_blank_lines() {
        let raw = "SELECT 1;\n\n\n   \nSELECT 2;";
        assert_eq!(normalize_model_output(raw), "SELECT 1;\nSELECT 2;");
    }

    #[test]
    fn test_collapses_spaces_outside_literals() {
        let raw = "SELECT   name  FROM departments WHERE name = 'Dept  of  Math'";
        assert_eq!(
            normalize_model_output(raw),
            "SELECT name FROM departments WHERE name = 'Dept  of  Math'"
        );
    }

    #[test]
    fn test_strips_sql_label() {
        let raw = "SQL: INSERT INTO faqs (question) VALUES ('Hours?');";
        assert_eq!(
            normalize_model_output(raw),
            "INSERT INTO faqs (question) VALUES ('Hours?');"
        );
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(normalize_model_output("SELECT 1"), "SELECT 1");
        assert_eq!(normalize_model_output("   "), "");
    }
}
