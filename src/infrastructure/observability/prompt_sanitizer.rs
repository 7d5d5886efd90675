const MAX_VISIBLE_CHARS: usize = 100;

/// Shortens a user message and masks credentials before it reaches the logs.
pub fn sanitize_prompt(prompt: &str) -> String {
    let trimmed = prompt.trim();

    if trimmed.is_empty() {
        return String::from("[EMPTY]");
    }

    let total_chars = trimmed.chars().count();
    let visible = if total_chars > MAX_VISIBLE_CHARS {
        let cut: String = trimmed.chars().take(MAX_VISIBLE_CHARS).collect();
        format!("{}... ({} chars total)", cut, total_chars)
    } else {
        trimmed.to_string()
    };

    redact_sensitive_patterns(&visible)
}

fn redact_sensitive_patterns(text: &str) -> String {
    const PATTERNS: [&str; 6] = [
        "Bearer ",
        "api_key=",
        "password=",
        "secret=",
        "token=",
        "sk-",
    ];

    let mut result = text.to_string();
    for pattern in PATTERNS {
        let mut search_from = 0;
        while let Some(rel) = result[search_from..].find(pattern) {
            let value_start = search_from + rel + pattern.len();
            let value_end = result[value_start..]
                .find(|c: char| c.is_whitespace() || c == '&' || c == '"' || c == '\'')
                .map(|i| value_start + i)
                .unwrap_or(result.len());
            result.replace_range(value_start..value_end, "[REDACTED]");
            search_from = value_start + "[REDACTED]".len();
        }
    }

    result
}
