/// Canonical gene key shared by the reference and sample builders: trimmed,
/// ASCII uppercase, Ensembl version suffix removed.
pub fn normalize_gene(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let upper = trimmed.to_ascii_uppercase();
    if let Some((left, right)) = upper.rsplit_once('.') {
        if left.starts_with("ENS") && !right.is_empty() && right.chars().all(|c| c.is_ascii_digit())
        {
            return left.to_string();
        }
    }
    upper
}

pub fn normalize_label(raw: &str) -> String {
    raw.trim().to_string()
}
