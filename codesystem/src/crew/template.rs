//! `{field}` substitution against a run context

use crate::crew::types::RunContext;

/// Replace every `{field}` naming a context field with its current value.
///
/// Placeholders that name no field, or are not valid identifiers, are left as-is.
pub fn interpolate(template: &str, ctx: &RunContext) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        match after.find('}') {
            // A nested `{` starts the real placeholder
            Some(close) if after[..close].contains('{') => {
                out.push('{');
                rest = after;
            }
            Some(close) => {
                let key = &after[..close];
                match ctx.get(key).filter(|_| is_identifier(key)) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

fn is_identifier(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
