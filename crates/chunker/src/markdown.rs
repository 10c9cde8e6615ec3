use crate::chunk::Chunk;
use crate::identity::content_hash;
use once_cell::sync::Lazy;
use regex::Regex;

/// Well-formed ATX heading: 1-6 `#`, whitespace, non-empty title.
static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6})\s+(\S.*)$").expect("heading regex is valid"));

struct Section {
    start: usize,
    end: usize,
    heading: String,
    level: u8,
}

/// Split markdown text into heading-aligned chunks.
///
/// Sections run from each heading line to the next heading (or end of file);
/// content before the first heading becomes a level-0 preamble chunk. Sections
/// whose trimmed content is empty are dropped, so no chunk is ever empty and
/// empty input yields no chunks. Within one document the emitted line ranges
/// never overlap and `start_line` is strictly increasing.
#[must_use]
pub fn chunk_markdown(text: &str, source: &str) -> Vec<Chunk> {
    let lines: Vec<&str> = text.split('\n').collect();

    let mut headings: Vec<(usize, u8, String)> = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if let Some(caps) = HEADING_RE.captures(line) {
            #[allow(clippy::cast_possible_truncation)]
            let level = caps[1].len() as u8;
            headings.push((i, level, caps[2].trim().to_string()));
        }
    }

    let mut sections: Vec<Section> = Vec::new();

    if headings.first().map_or(true, |(line, _, _)| *line > 0) {
        sections.push(Section {
            start: 0,
            end: headings.first().map_or(lines.len(), |(line, _, _)| *line),
            heading: String::new(),
            level: 0,
        });
    }

    for (idx, (line, level, title)) in headings.iter().enumerate() {
        let next_start = headings
            .get(idx + 1)
            .map_or(lines.len(), |(next, _, _)| *next);
        sections.push(Section {
            start: *line,
            end: next_start,
            heading: title.clone(),
            level: *level,
        });
    }

    let mut chunks = Vec::with_capacity(sections.len());
    for section in sections {
        let content = lines[section.start..section.end].join("\n");
        if content.trim().is_empty() {
            continue;
        }

        let hash = content_hash(&content);
        chunks.push(Chunk {
            content,
            source: source.to_string(),
            heading: section.heading,
            heading_level: section.level,
            start_line: section.start + 1,
            end_line: section.end,
            content_hash: hash,
        });
    }

    chunks
}
