//! Shared types for the fsearch overlay components.
//!
//! This crate provides the state types used across fsearch-host,
//! fsearch-core, and fsearch-tui. All durable types are serializable so
//! they can live in the flat settings file.

use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// The six result sort orders the host's search view understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    #[default]
    Alphabetical,
    AlphabeticalReverse,
    ByModifiedTime,
    ByModifiedTimeReverse,
    ByCreatedTime,
    ByCreatedTimeReverse,
}

impl SortOrder {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Alphabetical => "alphabetical",
            SortOrder::AlphabeticalReverse => "alphabeticalReverse",
            SortOrder::ByModifiedTime => "byModifiedTime",
            SortOrder::ByModifiedTimeReverse => "byModifiedTimeReverse",
            SortOrder::ByCreatedTime => "byCreatedTime",
            SortOrder::ByCreatedTimeReverse => "byCreatedTimeReverse",
        }
    }

    #[must_use]
    pub fn all() -> [SortOrder; 6] {
        [
            SortOrder::Alphabetical,
            SortOrder::AlphabeticalReverse,
            SortOrder::ByModifiedTime,
            SortOrder::ByModifiedTimeReverse,
            SortOrder::ByCreatedTime,
            SortOrder::ByCreatedTimeReverse,
        ]
    }
}

impl TryFrom<&str> for SortOrder {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::all()
            .into_iter()
            .find(|order| order.as_str() == value)
            .ok_or_else(|| format!("unknown sort order: {value}"))
    }
}

/// The five ways the search UI can be hosted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    #[default]
    Modal,
    Sidebar,
    Split,
    Tab,
    Window,
}

impl ViewKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKind::Modal => "modal",
            ViewKind::Sidebar => "sidebar",
            ViewKind::Split => "split",
            ViewKind::Tab => "tab",
            ViewKind::Window => "window",
        }
    }

    #[must_use]
    pub fn all() -> [ViewKind; 5] {
        [
            ViewKind::Modal,
            ViewKind::Sidebar,
            ViewKind::Split,
            ViewKind::Tab,
            ViewKind::Window,
        ]
    }

    /// Targets offered by the view-switch menu: the current kind is never
    /// offered, and `Tab` is excluded while the current kind is `Split`.
    #[must_use]
    pub fn switch_targets(current: ViewKind) -> Vec<ViewKind> {
        Self::all()
            .into_iter()
            .filter(|kind| *kind != current)
            .filter(|kind| !(current == ViewKind::Split && *kind == ViewKind::Tab))
            .collect()
    }
}

impl TryFrom<&str> for ViewKind {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::all()
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| format!("unknown view kind: {value}"))
    }
}

/// A half-open byte range of a match inside a file's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRange {
    pub start: usize,
    pub end: usize,
}

impl MatchRange {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Transient view state passed when opening a file for preview.
///
/// Never persisted; carries the search match so the preview can highlight
/// (or, for canvas documents, zoom to) it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EphemeralState {
    pub match_text: String,
    pub ranges: Vec<MatchRange>,
    pub focus: bool,
}

impl EphemeralState {
    /// The primary offset used for duplicate-open detection.
    #[must_use]
    pub fn first_offset(&self) -> Option<usize> {
        self.ranges.first().map(|range| range.start)
    }
}

/// The search view's transient UI state.
///
/// Every field has a default so a partially populated settings file (or a
/// partial patch) never leaves a hole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
    #[serde(default)]
    pub query: String,

    #[serde(default)]
    pub matching_case: bool,

    #[serde(default)]
    pub explain_search: bool,

    #[serde(default)]
    pub extra_context: bool,

    #[serde(default)]
    pub collapse_all: bool,

    #[serde(default)]
    pub sort_order: SortOrder,

    /// Query was seeded from the active file; not persisted.
    #[serde(skip)]
    pub current_file_only: bool,
}

impl SearchState {
    /// Left-biased shallow merge: fields present in `patch` overwrite,
    /// everything else is kept from `self`.
    #[must_use]
    pub fn merged(&self, patch: &StatePatch) -> SearchState {
        let mut next = self.clone();
        next.apply(patch);
        next
    }

    /// In-place variant of [`SearchState::merged`].
    pub fn apply(&mut self, patch: &StatePatch) {
        if let Some(query) = &patch.query {
            self.query = query.clone();
        }
        if let Some(matching_case) = patch.matching_case {
            self.matching_case = matching_case;
        }
        if let Some(explain_search) = patch.explain_search {
            self.explain_search = explain_search;
        }
        if let Some(extra_context) = patch.extra_context {
            self.extra_context = extra_context;
        }
        if let Some(collapse_all) = patch.collapse_all {
            self.collapse_all = collapse_all;
        }
        if let Some(sort_order) = patch.sort_order {
            self.sort_order = sort_order;
        }
        if let Some(current_file_only) = patch.current_file_only {
            self.current_file_only = current_file_only;
        }
    }

    /// A patch carrying every field of this state, for wholesale reporting
    /// (e.g. the modal's final state on close).
    #[must_use]
    pub fn as_patch(&self) -> StatePatch {
        StatePatch {
            query: Some(self.query.clone()),
            matching_case: Some(self.matching_case),
            explain_search: Some(self.explain_search),
            extra_context: Some(self.extra_context),
            collapse_all: Some(self.collapse_all),
            sort_order: Some(self.sort_order),
            current_file_only: Some(self.current_file_only),
        }
    }
}

/// A partial update over [`SearchState`]. `None` means "leave unchanged".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub matching_case: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub explain_search: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_context: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapse_all: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,

    #[serde(skip)]
    pub current_file_only: Option<bool>,
}

impl StatePatch {
    #[must_use]
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query.is_none()
            && self.matching_case.is_none()
            && self.explain_search.is_none()
            && self.extra_context.is_none()
            && self.collapse_all.is_none()
            && self.sort_order.is_none()
            && self.current_file_only.is_none()
    }
}
