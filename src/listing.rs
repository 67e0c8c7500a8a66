use unicode_width::UnicodeWidthChar;

use crate::models::{formatted_date, PhotoItem};

/// One line per result: `<n>. <title> by <author> (<published>)`,
/// numbered from 1 and cut to `width` display columns.
pub fn format_listing(items: &[PhotoItem], width: usize) -> Vec<String> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let title = if item.title.trim().is_empty() {
                "(untitled)"
            } else {
                item.title.trim()
            };
            let line = format!(
                "{}. {} by {} ({})",
                index + 1,
                title,
                item.author_name(),
                formatted_date(&item.published)
            );
            truncate_to_width(&line, width)
        })
        .collect()
}

/// Cuts `s` so it fits in `width` columns, ending in `…` when shortened.
pub fn truncate_to_width(s: &str, width: usize) -> String {
    let total: usize = s.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= width {
        return s.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
