//! Text cleanup applied to every section body

/// Clean worker text for the report.
///
/// - carriage returns are removed
/// - literal `\n` becomes a space, literal `\t` four spaces
/// - runs of line breaks collapse to one
/// - leading/trailing whitespace is trimmed
///
/// `normalize(normalize(x)) == normalize(x)` for every input.
pub fn normalize(text: &str) -> String {
    // Carriage returns go first so removing them cannot form a new `\n`
    let text = text
        .replace('\r', "")
        .replace("\\n", " ")
        .replace("\\t", "    ");

    let mut out = String::with_capacity(text.len());
    let mut previous_newline = false;
    for c in text.chars() {
        if c == '\n' {
            if previous_newline {
                continue;
            }
            previous_newline = true;
        } else {
            previous_newline = false;
        }
        out.push(c);
    }

    out.trim().to_string()
}
