//! Deterministic text composition for embeddings and preview clamping.

/// Build the text a document is embedded from.
///
/// The field order and labels are fixed: any change to title, body or
/// category changes the composed text, so a content-affecting edit always
/// produces a different embedding input. An absent category contributes an
/// empty label value, keeping the shape stable.
pub fn compose_embedding_text(title: &str, body: &str, category: Option<&str>) -> String {
    format!(
        "Title: {title}. Content: {body}. Category: {}",
        category.unwrap_or("")
    )
}

/// Returns a copy of `s` clamped to at most `max_chars` characters,
/// appending an ellipsis when anything was cut.
///
/// Operates on characters, never splitting inside a UTF-8 sequence.
pub fn clamp_preview(s: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }

    let mut iter = s.char_indices();
    match iter.nth(max_chars) {
        // Fits entirely.
        None => s.to_string(),
        Some((cut, _)) => {
            let mut out = s[..cut].to_string();
            out.push('…');
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composition_is_deterministic_and_ordered() {
        let a = compose_embedding_text("Backups", "Use snapshots.", Some("DevOps"));
        let b = compose_embedding_text("Backups", "Use snapshots.", Some("DevOps"));
        assert_eq!(a, b);
        assert_eq!(a, "Title: Backups. Content: Use snapshots. Category: DevOps");
    }

    #[test]
    fn absent_category_keeps_the_label() {
        let t = compose_embedding_text("Backups", "Use snapshots.", None);
        assert_eq!(t, "Title: Backups. Content: Use snapshots. Category: ");
    }

    #[test]
    fn each_field_changes_the_text() {
        let base = compose_embedding_text("t", "b", Some("c"));
        assert_ne!(base, compose_embedding_text("t2", "b", Some("c")));
        assert_ne!(base, compose_embedding_text("t", "b2", Some("c")));
        assert_ne!(base, compose_embedding_text("t", "b", Some("c2")));
        assert_ne!(base, compose_embedding_text("t", "b", None));
    }

    #[test]
    fn clamp_keeps_short_text_untouched() {
        assert_eq!(clamp_preview("short", 10), "short");
        assert_eq!(clamp_preview("exact", 5), "exact");
    }

    #[test]
    fn clamp_cuts_on_char_boundaries() {
        // 4 multibyte characters; cutting at 2 must not split a codepoint.
        let s = "éééé";
        let out = clamp_preview(s, 2);
        assert_eq!(out, "éé…");
    }

    #[test]
    fn clamp_zero_is_empty() {
        assert_eq!(clamp_preview("anything", 0), "");
    }
}
