//! Environment variable expansion for configuration files
//!
//! Supports `{{ env.VAR }}` and `{{ env.VAR | default("value") }}`
//! placeholders. Commented-out lines are passed through untouched so a
//! disabled section never fails the load over an unset variable.

use anyhow::{Result, bail};
use regex::Regex;
use std::sync::OnceLock;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"\{\{\s*([a-zA-Z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#)
            .expect("must be valid regex")
    })
}

/// Expands environment placeholders in raw configuration text.
///
/// Returns an error naming the variable when a placeholder without a
/// default references an unset variable.
pub fn expand_env(raw: &str) -> Result<String> {
    let pattern = placeholder_pattern();
    let mut expanded = String::with_capacity(raw.len());

    for (index, line) in raw.lines().enumerate() {
        if index > 0 {
            expanded.push('\n');
        }
        if line.trim_start().starts_with('#') {
            expanded.push_str(line);
            continue;
        }

        let mut last = 0;
        for captures in pattern.captures_iter(line) {
            let whole = captures.get(0).map_or(0..0, |m| m.range());
            let key = captures.get(1).map_or("", |m| m.as_str());

            expanded.push_str(&line[last..whole.start]);

            let Some(name) = key.strip_prefix("env.") else {
                bail!("only variables scoped with 'env.' are supported: `{key}`");
            };
            match std::env::var(name) {
                Ok(value) => expanded.push_str(&value),
                Err(_) => match captures.get(2) {
                    Some(default) => expanded.push_str(default.as_str()),
                    None => bail!("environment variable not found: `{name}`"),
                },
            }
            last = whole.end;
        }
        expanded.push_str(&line[last..]);
    }

    if raw.ends_with('\n') {
        expanded.push('\n');
    }

    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_plain_text() {
        let raw = "key = \"value\"";
        assert_eq!(expand_env(raw).unwrap(), raw);
    }

    #[test]
    fn expands_set_variable() {
        temp_env::with_var("LENS_TEST_HOST", Some("0.0.0.0"), || {
            let out = expand_env("host = \"{{ env.LENS_TEST_HOST }}\"").unwrap();
            assert_eq!(out, "host = \"0.0.0.0\"");
        });
    }

    #[test]
    fn falls_back_to_default_when_unset() {
        temp_env::with_var_unset("LENS_TEST_PORT", || {
            let out = expand_env("port = {{ env.LENS_TEST_PORT | default(\"8080\") }}").unwrap();
            assert_eq!(out, "port = 8080");
        });
    }

    #[test]
    fn prefers_variable_over_default() {
        temp_env::with_var("LENS_TEST_MODEL", Some("gemini-2.5-pro"), || {
            let out =
                expand_env("model = \"{{ env.LENS_TEST_MODEL | default(\"gemini-2.5-flash\") }}\"")
                    .unwrap();
            assert_eq!(out, "model = \"gemini-2.5-pro\"");
        });
    }

    #[test]
    fn errors_on_missing_variable_without_default() {
        temp_env::with_var_unset("LENS_TEST_SECRET", || {
            let err = expand_env("secret = \"{{ env.LENS_TEST_SECRET }}\"").unwrap_err();
            assert!(err.to_string().contains("LENS_TEST_SECRET"));
        });
    }

    #[test]
    fn rejects_unsupported_scope() {
        let err = expand_env("key = \"{{ vault.SECRET }}\"").unwrap_err();
        assert!(err.to_string().contains("only variables scoped with 'env.'"));
    }

    #[test]
    fn skips_commented_lines() {
        temp_env::with_var_unset("LENS_TEST_UNSET", || {
            let raw = "# secret = \"{{ env.LENS_TEST_UNSET }}\"\nname = \"lens\"";
            let out = expand_env(raw).unwrap();
            assert_eq!(out, raw);
        });
    }

    #[test]
    fn expands_multiple_placeholders_on_one_line() {
        temp_env::with_vars(
            [("LENS_TEST_A", Some("one")), ("LENS_TEST_B", Some("two"))],
            || {
                let out =
                    expand_env("pair = \"{{ env.LENS_TEST_A }}:{{ env.LENS_TEST_B }}\"").unwrap();
                assert_eq!(out, "pair = \"one:two\"");
            },
        );
    }

    #[test]
    fn preserves_trailing_newline() {
        let out = expand_env("name = \"lens\"\n").unwrap();
        assert_eq!(out, "name = \"lens\"\n");
    }
}
