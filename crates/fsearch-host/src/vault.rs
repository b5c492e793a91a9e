//! The host's note store and built-in search index.
//!
//! Search is substring matching over note contents plus nucleo fuzzy
//! scoring over note names; hits carry byte ranges so the preview can
//! highlight the match. This is the host-provided index the overlay drives,
//! not something the overlay implements.

use fsearch_types::{MatchRange, SearchState, SortOrder};
use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Markdown,
    Canvas,
}

/// A node inside a canvas document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasNode {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct NoteFile {
    pub name: String,
    pub path: String,
    pub kind: FileKind,
    pub content: String,
    pub canvas_nodes: Vec<CanvasNode>,
    pub created: u64,
    pub modified: u64,
}

/// One search hit: a file plus the match ranges inside its content.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub file: FileId,
    pub score: f64,
    pub ranges: Vec<MatchRange>,
    pub excerpt: String,
}

pub struct Vault {
    files: Vec<NoteFile>,
    matcher: Matcher,
    next_stamp: u64,
}

impl Default for Vault {
    fn default() -> Self {
        Self::new()
    }
}

impl Vault {
    #[must_use]
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            matcher: Matcher::new(Config::DEFAULT),
            next_stamp: 1,
        }
    }

    fn stamp(&mut self) -> u64 {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        stamp
    }

    pub fn add_markdown(&mut self, name: &str, content: &str) -> FileId {
        let stamp = self.stamp();
        let id = FileId(self.files.len());
        self.files.push(NoteFile {
            name: name.to_string(),
            path: format!("{name}.md"),
            kind: FileKind::Markdown,
            content: content.to_string(),
            canvas_nodes: Vec::new(),
            created: stamp,
            modified: stamp,
        });
        id
    }

    pub fn add_canvas(&mut self, name: &str, nodes: Vec<CanvasNode>) -> FileId {
        let stamp = self.stamp();
        let id = FileId(self.files.len());
        let content = nodes
            .iter()
            .map(|n| n.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.files.push(NoteFile {
            name: name.to_string(),
            path: format!("{name}.canvas"),
            kind: FileKind::Canvas,
            content,
            canvas_nodes: nodes,
            created: stamp,
            modified: stamp,
        });
        id
    }

    #[must_use]
    pub fn file(&self, id: FileId) -> Option<&NoteFile> {
        self.files.get(id.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> impl Iterator<Item = (FileId, &NoteFile)> {
        self.files.iter().enumerate().map(|(i, f)| (FileId(i), f))
    }

    /// Resolve a display name to a file, the way the host resolves a link
    /// path: exact name first, then case-insensitive.
    #[must_use]
    pub fn resolve_link(&self, name: &str) -> Option<FileId> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return None;
        }
        self.files()
            .find(|(_, f)| f.name == trimmed)
            .or_else(|| {
                self.files()
                    .find(|(_, f)| f.name.eq_ignore_ascii_case(trimmed))
            })
            .map(|(id, _)| id)
    }

    /// Resolve `name` to an existing file or create an empty note with that
    /// name, like the host's open-or-create link handling.
    pub fn open_or_create(&mut self, name: &str) -> FileId {
        if let Some(existing) = self.resolve_link(name) {
            return existing;
        }
        debug!("creating note for link: {name}");
        self.add_markdown(name.trim(), "")
    }

    /// Files whose content links to `target` via `[[Name]]`.
    #[must_use]
    pub fn backlinks(&self, target: FileId) -> Vec<FileId> {
        let Some(target_file) = self.file(target) else {
            return Vec::new();
        };
        let link = format!("[[{}]]", target_file.name);
        self.files()
            .filter(|(id, f)| *id != target && f.content.contains(&link))
            .map(|(id, _)| id)
            .collect()
    }

    /// Run the built-in search for `state`.
    pub fn search(&mut self, state: &SearchState) -> Vec<SearchHit> {
        if state.query.trim().is_empty() {
            return Vec::new();
        }

        let pattern = Pattern::new(
            &state.query,
            if state.matching_case {
                CaseMatching::Respect
            } else {
                CaseMatching::Ignore
            },
            Normalization::Smart,
            AtomKind::Fuzzy,
        );

        let mut hits = Vec::new();
        for (index, file) in self.files.iter().enumerate() {
            let ranges = content_ranges(&file.content, &state.query, state.matching_case);
            let mut buf = Vec::new();
            let name_haystack = Utf32Str::new(&file.name, &mut buf);
            let name_score = pattern.score(name_haystack, &mut self.matcher);

            if ranges.is_empty() && name_score.is_none() {
                continue;
            }

            let score = f64::from(name_score.unwrap_or(0)) + 10.0 * ranges.len() as f64;
            let excerpt = ranges
                .first()
                .map(|range| excerpt_around(&file.content, *range))
                .unwrap_or_default();
            hits.push(SearchHit {
                file: FileId(index),
                score,
                ranges,
                excerpt,
            });
        }

        debug!("search '{}' found {} hits", state.query, hits.len());
        self.sort_hits(&mut hits, state.sort_order);
        hits
    }

    fn sort_hits(&self, hits: &mut [SearchHit], order: SortOrder) {
        let key = |hit: &SearchHit| self.files.get(hit.file.0);
        match order {
            SortOrder::Alphabetical => {
                hits.sort_by(|a, b| key(a).map(|f| &f.name).cmp(&key(b).map(|f| &f.name)));
            }
            SortOrder::AlphabeticalReverse => {
                hits.sort_by(|a, b| key(b).map(|f| &f.name).cmp(&key(a).map(|f| &f.name)));
            }
            SortOrder::ByModifiedTime => {
                hits.sort_by_key(|h| std::cmp::Reverse(key(h).map_or(0, |f| f.modified)));
            }
            SortOrder::ByModifiedTimeReverse => {
                hits.sort_by_key(|h| key(h).map_or(0, |f| f.modified));
            }
            SortOrder::ByCreatedTime => {
                hits.sort_by_key(|h| std::cmp::Reverse(key(h).map_or(0, |f| f.created)));
            }
            SortOrder::ByCreatedTimeReverse => {
                hits.sort_by_key(|h| key(h).map_or(0, |f| f.created));
            }
        }
    }
}

/// Byte ranges of every occurrence of `query` inside `content`. Ranges are
/// always char boundaries of `content`, even when case folding changes byte
/// lengths (`İ` folds to the two-char `i̇`).
fn content_ranges(content: &str, query: &str, matching_case: bool) -> Vec<MatchRange> {
    if query.is_empty() {
        return Vec::new();
    }
    if matching_case {
        let mut ranges = Vec::new();
        let mut offset = 0;
        while let Some(pos) = content[offset..].find(query) {
            let start = offset + pos;
            ranges.push(MatchRange::new(start, start + query.len()));
            offset = start + query.len();
        }
        return ranges;
    }

    // Fold into a shadow haystack, recording for every folded byte the
    // start and end of the original char it came from.
    let needle = query.to_lowercase();
    let mut folded = String::with_capacity(content.len());
    let mut starts = Vec::with_capacity(content.len());
    let mut ends = Vec::with_capacity(content.len());
    for (offset, c) in content.char_indices() {
        let end = offset + c.len_utf8();
        let before = folded.len();
        for lower in c.to_lowercase() {
            folded.push(lower);
        }
        for _ in before..folded.len() {
            starts.push(offset);
            ends.push(end);
        }
    }

    let mut ranges = Vec::new();
    let mut offset = 0;
    while let Some(pos) = folded[offset..].find(&needle) {
        let start = offset + pos;
        let last = start + needle.len() - 1;
        ranges.push(MatchRange::new(starts[start], ends[last]));
        offset = start + needle.len();
    }
    ranges
}

/// The line containing the match, for the result list's context row.
fn excerpt_around(content: &str, range: MatchRange) -> String {
    let start = content[..range.start.min(content.len())]
        .rfind('\n')
        .map_or(0, |p| p + 1);
    let end = content[range.start.min(content.len())..]
        .find('\n')
        .map_or(content.len(), |p| range.start + p);
    content[start..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_vault() -> Vault {
        let mut vault = Vault::new();
        vault.add_markdown("Alpha", "first note\nwith a needle inside");
        vault.add_markdown("Beta", "second note, no hits here");
        vault.add_markdown("Gamma", "needle at start\nneedle again");
        vault
    }

    fn state(query: &str) -> SearchState {
        SearchState {
            query: query.to_string(),
            ..SearchState::default()
        }
    }

    #[test]
    fn test_search_finds_content_matches() {
        let mut vault = sample_vault();
        let hits = vault.search(&state("needle"));
        assert_eq!(hits.len(), 2);
        let names: Vec<_> = hits
            .iter()
            .map(|h| vault.file(h.file).unwrap().name.clone())
            .collect();
        assert_eq!(names, vec!["Alpha", "Gamma"]);
    }

    #[test]
    fn test_search_ranges_and_excerpt() {
        let mut vault = sample_vault();
        let hits = vault.search(&state("needle"));
        let alpha = &hits[0];
        assert_eq!(alpha.ranges.len(), 1);
        assert_eq!(alpha.excerpt, "with a needle inside");

        let gamma = &hits[1];
        assert_eq!(gamma.ranges.len(), 2);
        assert_eq!(gamma.ranges[0].start, 0);
    }

    #[test]
    fn test_search_empty_query() {
        let mut vault = sample_vault();
        assert!(vault.search(&state("")).is_empty());
        assert!(vault.search(&state("   ")).is_empty());
    }

    #[test]
    fn test_search_case_sensitivity() {
        let mut vault = Vault::new();
        vault.add_markdown("Note", "Needle here");

        let mut sensitive = state("needle");
        sensitive.matching_case = true;
        let hits = vault.search(&sensitive);
        assert!(hits.is_empty() || hits[0].ranges.is_empty());

        let hits = vault.search(&state("needle"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].ranges.len(), 1);
    }

    #[test]
    fn test_search_survives_width_changing_case_folds() {
        // `İ` lowercases to the two-char `i̇` (2 -> 3 bytes), shifting every
        // folded offset after it; ranges must still index the original text.
        let mut vault = Vault::new();
        let id = vault.add_markdown("Unicode", "İaÖÖ");

        let hits = vault.search(&state("Ö"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].file, id);
        assert_eq!(hits[0].ranges.len(), 2);

        let content = &vault.file(id).unwrap().content;
        for range in &hits[0].ranges {
            assert_eq!(&content[range.start..range.end], "Ö");
        }
        assert_eq!(hits[0].excerpt, "İaÖÖ");
    }

    #[test]
    fn test_search_matches_across_case_fold_widths() {
        let mut vault = Vault::new();
        vault.add_markdown("Turkish", "İstanbul");

        let hits = vault.search(&state("i̇stanbul"));
        assert_eq!(hits.len(), 1);
        let range = hits[0].ranges[0];
        assert_eq!(range.start, 0);
        assert_eq!(range.end, "İstanbul".len());
    }

    #[test]
    fn test_search_name_only_match() {
        let mut vault = sample_vault();
        let hits = vault.search(&state("Beta"));
        assert!(
            hits.iter()
                .any(|h| vault.file(h.file).unwrap().name == "Beta")
        );
    }

    #[test]
    fn test_sort_by_created_time() {
        let mut vault = sample_vault();
        let mut st = state("note");
        st.sort_order = SortOrder::ByCreatedTime;
        let hits = vault.search(&st);
        assert!(hits.len() >= 2);
        let created: Vec<u64> = hits
            .iter()
            .map(|h| vault.file(h.file).unwrap().created)
            .collect();
        let mut sorted = created.clone();
        sorted.sort_by_key(|c| std::cmp::Reverse(*c));
        assert_eq!(created, sorted);
    }

    #[test]
    fn test_resolve_link() {
        let vault = sample_vault();
        assert!(vault.resolve_link("Alpha").is_some());
        assert!(vault.resolve_link("alpha").is_some());
        assert!(vault.resolve_link("Delta").is_none());
        assert!(vault.resolve_link("").is_none());
    }

    #[test]
    fn test_open_or_create() {
        let mut vault = sample_vault();
        let before = vault.len();
        let existing = vault.open_or_create("Alpha");
        assert_eq!(vault.len(), before);
        assert_eq!(vault.file(existing).unwrap().name, "Alpha");

        let created = vault.open_or_create("My Note-Name");
        assert_eq!(vault.len(), before + 1);
        assert_eq!(vault.file(created).unwrap().name, "My Note-Name");
    }

    #[test]
    fn test_backlinks() {
        let mut vault = Vault::new();
        let target = vault.add_markdown("Target", "content");
        vault.add_markdown("Linker", "see [[Target]] for details");
        vault.add_markdown("Other", "no links");

        let backlinks = vault.backlinks(target);
        assert_eq!(backlinks.len(), 1);
        assert_eq!(vault.file(backlinks[0]).unwrap().name, "Linker");
    }

    #[test]
    fn test_canvas_file() {
        let mut vault = Vault::new();
        let id = vault.add_canvas(
            "Board",
            vec![
                CanvasNode {
                    id: "n1".to_string(),
                    text: "todo list".to_string(),
                },
                CanvasNode {
                    id: "n2".to_string(),
                    text: "needle card".to_string(),
                },
            ],
        );
        assert_eq!(vault.file(id).unwrap().kind, FileKind::Canvas);

        let hits = vault.search(&state("needle"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].file, id);
    }
}
