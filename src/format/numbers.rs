// Count and percentage formatting for reports

/// Format a count with thousands separators.
pub fn format_count(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx).is_multiple_of(3) {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a ratio as a percentage with one decimal place.
pub fn format_percent_one_decimal(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

/// `word` for one, `word` + "s" otherwise.
pub fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}
