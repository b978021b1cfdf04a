//! Subject templating and identifier list parsing.
//!
//! A subject holds at most one placeholder, `{}` or `{0}`. `{{` and `}}`
//! render as literal braces. A template without a placeholder is used as is.

/// Fills the first placeholder in `template` with the trimmed `identifier`.
///
/// Placeholders after the first are kept literally.
#[must_use]
pub fn render_subject(template: &str, identifier: &str) -> String {
    let mut out = String::with_capacity(template.len() + identifier.len());
    let mut filled = false;
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(after) = tail.strip_prefix("{{") {
            out.push('{');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("}}") {
            out.push('}');
            rest = after;
        } else if let Some((token, after)) = placeholder_at(tail) {
            if filled {
                out.push_str(token);
            } else {
                out.push_str(identifier.trim());
                filled = true;
            }
            rest = after;
        } else {
            out.push_str(&tail[..1]);
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Counts placeholders in `template`, ignoring escaped braces.
#[must_use]
pub fn placeholder_count(template: &str) -> usize {
    let mut count = 0;
    let mut rest = template;
    while let Some(pos) = rest.find(['{', '}']) {
        let tail = &rest[pos..];
        rest = if let Some(after) = tail.strip_prefix("{{").or_else(|| tail.strip_prefix("}}")) {
            after
        } else if let Some((_, after)) = placeholder_at(tail) {
            count += 1;
            after
        } else {
            &tail[1..]
        };
    }
    count
}

/// Splits comma-separated identifiers, trimming each one.
///
/// Empty entries are kept so the number of results always equals the
/// number of commas plus one.
#[must_use]
pub fn split_identifiers(text: &str) -> Vec<&str> {
    text.split(',').map(str::trim).collect()
}

fn placeholder_at(tail: &str) -> Option<(&str, &str)> {
    ["{}", "{0}"]
        .into_iter()
        .find(|token| tail.starts_with(token))
        .map(|token| tail.split_at(token.len()))
}
