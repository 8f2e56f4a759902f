//! Text helpers shared by the emission rules.

/// Prefixes every line of `text` with `prefix`. A trailing newline does not
/// start a new (prefixed) line.
pub fn prefix_lines(text: &str, prefix: &str) -> String {
    let mut out = String::with_capacity(text.len() + prefix.len());
    out.push_str(prefix);
    let last = text.len().saturating_sub(1);
    for (i, c) in text.char_indices() {
        out.push(c);
        if c == '\n' && i != last {
            out.push_str(prefix);
        }
    }
    out
}

/// Encodes `text` as a single-quoted AL string literal.
pub fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Replaces `%1` in a hook template with the quoted block id.
pub fn inject_id(template: &str, block_id: &str) -> String {
    template.replace("%1", &quote(block_id))
}

/// Word-wraps each line of `text` to at most `limit` columns. Words longer
/// than the limit get a line of their own.
pub fn wrap(text: &str, limit: usize) -> String {
    text.split('\n')
        .map(|paragraph| wrap_line(paragraph, limit))
        .collect::<Vec<_>>()
        .join("\n")
}

fn wrap_line(line: &str, limit: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > limit {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    lines.push(current);
    lines.join("\n")
}

/// Whether `text` is a plain decimal literal such as `3`, `-2` or `0.5`,
/// optionally padded with whitespace.
pub fn is_number(text: &str) -> bool {
    let trimmed = text.trim();
    let unsigned = trimmed.strip_prefix('-').unwrap_or(trimmed);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };
    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    digits(whole) && fraction.map_or(true, digits)
}

/// Formats a number the way the block editor displays it: integral values
/// without a fractional part, no negative zero.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if value == 0.0 {
        "0".to_string()
    } else {
        format!("{value}")
    }
}

/// Parses a numeric field the way the block editor does: surrounding
/// whitespace is ignored, empty text is zero, anything else is NaN.
pub fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        0.0
    } else {
        trimmed.parse::<f64>().unwrap_or(f64::NAN)
    }
}

/// Rewrites two-space indentation steps at the start of each line into
/// `indent`. A leftover odd space is kept.
pub fn reindent(text: &str, indent: &str) -> String {
    text.split('\n')
        .map(|line| {
            let spaces = line.len() - line.trim_start_matches(' ').len();
            let steps = spaces / 2;
            format!("{}{}", indent.repeat(steps), &line[steps * 2..])
        })
        .collect::<Vec<_>>()
        .join("\n")
}
