//! Remaining-estimate resolution for exported worklogs.
//!
//! A description may carry one `[rem:<value>]` directive overriding the
//! remaining estimate sent along with the worklog. `<value>` is either a
//! duration string or `auto`.

use std::sync::LazyLock;

use regex::Regex;

use crate::duration::parse_duration;

static DIRECTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[rem:([^\]]*)\]").unwrap());

/// A parsed `[rem:...]` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `[rem:auto]`.
    Auto,
    /// `[rem:<duration>]` with the raw duration text.
    Explicit(String),
}

/// Description and remaining estimate ready for export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRemaining {
    /// Description with the directive removed.
    pub description: String,
    pub remaining_seconds: i64,
}

/// Finds the first directive and returns the description without it.
pub fn strip_directive(description: &str) -> (String, Option<Directive>) {
    let Some(caps) = DIRECTIVE_RE.captures(description) else {
        return (description.to_string(), None);
    };
    let whole = caps.get(0).map_or(0..0, |m| m.range());
    let value = caps[1].trim();
    let directive = if value.eq_ignore_ascii_case("auto") {
        Directive::Auto
    } else {
        Directive::Explicit(value.to_string())
    };

    let mut stripped = String::with_capacity(description.len());
    stripped.push_str(&description[..whole.start]);
    stripped.push_str(&description[whole.end..]);
    (stripped, Some(directive))
}

/// Resolves the remaining estimate for an entry description.
///
/// `issue_remaining` is the issue's own remaining estimate string. Without a
/// directive, or with `[rem:auto]`, the issue value is used. `auto` does not
/// subtract the entry's own duration; it resolves to the issue value as well.
pub fn resolve(description: &str, issue_remaining: Option<&str>) -> ResolvedRemaining {
    let (stripped, directive) = strip_directive(description);
    let remaining_seconds = match &directive {
        Some(Directive::Explicit(value)) => parse_duration(Some(value)),
        Some(Directive::Auto) | None => parse_duration(issue_remaining),
    };
    ResolvedRemaining {
        description: stripped,
        remaining_seconds,
    }
}
