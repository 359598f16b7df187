//! Line-based section splitting shared by the resume and JD parsers.

/// A block of lines that follows a recognised heading.
#[derive(Debug, Clone, PartialEq)]
pub struct Section<K> {
    pub kind: K,
    /// Content written on the heading line itself, after the colon.
    pub inline: String,
    pub lines: Vec<String>,
}

impl<K> Section<K> {
    /// Inline content followed by the body lines.
    pub fn body(&self) -> Vec<&str> {
        std::iter::once(self.inline.as_str())
            .filter(|s| !s.is_empty())
            .chain(self.lines.iter().map(String::as_str))
            .collect()
    }
}

/// Splits `text` into the sections introduced by known headings.
/// Lines before the first heading are ignored.
///
/// `headings` maps a section kind to its lowercase aliases. When several aliases
/// match a line, the longest wins ("technical skills" over "skills").
pub fn split_sections<K: Copy>(text: &str, headings: &[(K, &[&str])]) -> Vec<Section<K>> {
    let mut sections: Vec<Section<K>> = Vec::new();

    for line in text.lines() {
        if let Some((kind, inline)) = detect_heading(line, headings) {
            sections.push(Section {
                kind,
                inline: inline.to_string(),
                lines: Vec::new(),
            });
            continue;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(current) = sections.last_mut() {
            current.lines.push(trimmed.to_string());
        }
    }

    sections
}

/// Returns the section kind and inline remainder if `line` is a heading.
pub fn detect_heading<'a, K: Copy>(
    line: &'a str,
    headings: &[(K, &[&str])],
) -> Option<(K, &'a str)> {
    let stripped = strip_bullet(line);
    // ASCII lowercasing keeps byte offsets aligned with `stripped`.
    let lower = stripped.to_ascii_lowercase();

    let mut best: Option<(K, usize)> = None;
    for (kind, aliases) in headings {
        for alias in aliases.iter() {
            if !lower.starts_with(alias) {
                continue;
            }
            let rest = lower[alias.len()..].trim_start();
            let is_heading = rest.is_empty() || rest.starts_with(':');
            if is_heading && best.map_or(true, |(_, len)| alias.len() > len) {
                best = Some((*kind, alias.len()));
            }
        }
    }

    let (kind, alias_len) = best?;
    let rest = stripped[alias_len..].trim_start();
    let inline = rest.strip_prefix(':').unwrap_or(rest).trim();
    Some((kind, inline))
}

/// Splits section content into list items on commas, semicolons, pipes,
/// bullets and line breaks, dropping bullet and numbering prefixes.
pub fn split_items<'a>(parts: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut items = Vec::new();
    for part in parts {
        for piece in part.split([',', ';', '|', '•', '·', '\n']) {
            let item = strip_bullet(piece).trim_end_matches('.').trim();
            if !item.is_empty() {
                items.push(item.to_string());
            }
        }
    }
    items
}

/// Splits section content into bullet-level entries (one per line, bullets removed).
pub fn split_lines<'a>(parts: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    parts
        .into_iter()
        .flat_map(|p| p.split(['•', '·', '\n']))
        .map(|p| strip_bullet(p).trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Order-preserving, case-insensitive dedup.
pub fn dedup_case_insensitive(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect()
}

fn strip_bullet(s: &str) -> &str {
    let s = s.trim_start();
    let s = s.trim_start_matches(['-', '•', '·', '#', '–', ' ']);
    // "1." / "2)" numbering
    let digits = s.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 && digits <= 2 {
        let after = &s[digits..];
        if let Some(rest) = after.strip_prefix('.').or_else(|| after.strip_prefix(')')) {
            if rest.starts_with(' ') {
                return rest.trim_start();
            }
        }
    }
    s
}
