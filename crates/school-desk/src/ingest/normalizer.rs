/// Header key used for alias lookups: invisible marks removed, lower-cased, and reduced to
/// ASCII letters and digits, so `Reg Number`, `reg_number` and `RegNumber` collide.
pub(crate) fn normalize_header(value: &str) -> String {
    value
        .replace(['\u{feff}', '\u{200b}'], "")
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Cell text with invisible marks removed and inner whitespace collapsed.
pub(crate) fn normalize_cell(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}', '\u{a0}'], " ");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
