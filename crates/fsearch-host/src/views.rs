//! The host's built-in search view and file view models.
//!
//! These are the views the overlay re-hosts inside its modal. The search
//! view owns the result tree and the keyboard-navigation primitives the
//! host exposes (`focus_next`, `show_more_after`, ...); the file view is a
//! single open file with a preview/source mode toggle.

use crate::surface::{NodeId, Surface};
use crate::vault::{FileId, Vault};
use fsearch_types::{EphemeralState, SearchState};

/// One row in the search result tree.
#[derive(Debug, Clone)]
pub struct ResultItem {
    pub file: FileId,
    pub node: NodeId,
    pub ranges: Vec<fsearch_types::MatchRange>,
    pub excerpt: String,
    pub collapsed: bool,
    pub show_more: bool,
}

#[derive(Debug, Clone)]
pub struct SearchViewModel {
    state: SearchState,
    pub items: Vec<ResultItem>,
    focused: Option<usize>,

    pub container: NodeId,
    pub nav_header: NodeId,
    pub input: NodeId,
    pub input_container: NodeId,
    pub options: NodeId,
    pub results: NodeId,

    /// Labels of controls injected into the header by the overlay.
    pub header_controls: Vec<String>,
    /// Labels of controls injected into the options panel by the overlay.
    pub option_controls: Vec<String>,
}

impl SearchViewModel {
    pub fn build(surface: &mut Surface, parent: NodeId) -> Self {
        let container = surface.create_div(parent, "search-view");
        let nav_header = surface.create_div(container, "nav-header");
        let input_container = surface.create_div(container, "search-input-container");
        let input = surface.create_div(input_container, "search-input");
        let options = surface.create_div(container, "search-options");
        let results = surface.create_div(container, "search-results-children");

        Self {
            state: SearchState::default(),
            items: Vec::new(),
            focused: None,
            container,
            nav_header,
            input,
            input_container,
            options,
            results,
            header_controls: Vec::new(),
            option_controls: Vec::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Rebuild the result tree for the current state.
    pub fn run_search(&mut self, surface: &mut Surface, vault: &mut Vault) {
        surface.clear_children(self.results);
        surface.set_text(self.input, self.state.query.clone());
        self.focused = None;

        let hits = vault.search(&self.state);
        self.items = hits
            .into_iter()
            .map(|hit| {
                let node = surface.create_div(self.results, "tree-item");
                surface.create_div(node, "tree-item-icon");
                let inner = surface.create_div(node, "tree-item-inner");
                let name = vault.file(hit.file).map_or_else(String::new, |f| f.name.clone());
                surface.set_text(inner, name);
                surface.create_div(node, "search-result-hover-button");
                let children = surface.create_div(node, "tree-item-children");
                surface.set_text(children, hit.excerpt.clone());
                if self.state.collapse_all {
                    surface.add_class(node, "is-collapsed");
                }
                ResultItem {
                    file: hit.file,
                    node,
                    ranges: hit.ranges,
                    excerpt: hit.excerpt,
                    collapsed: self.state.collapse_all,
                    show_more: false,
                }
            })
            .collect();
    }

    pub fn set_state(&mut self, surface: &mut Surface, vault: &mut Vault, state: SearchState) {
        self.state = state;
        self.run_search(surface, vault);
    }

    pub fn set_query(&mut self, surface: &mut Surface, vault: &mut Vault, query: &str) {
        self.state.query = query.to_string();
        self.run_search(surface, vault);
    }

    pub fn set_matching_case(&mut self, surface: &mut Surface, vault: &mut Vault, value: bool) {
        self.state.matching_case = value;
        self.run_search(surface, vault);
    }

    pub fn set_explain_search(&mut self, value: bool) {
        self.state.explain_search = value;
    }

    pub fn set_extra_context(&mut self, value: bool) {
        self.state.extra_context = value;
    }

    pub fn set_collapse_all(&mut self, surface: &mut Surface, value: bool) {
        self.state.collapse_all = value;
        for item in &mut self.items {
            item.collapsed = value;
            surface.toggle_class(item.node, "is-collapsed", value);
        }
    }

    pub fn set_sort_order(
        &mut self,
        surface: &mut Surface,
        vault: &mut Vault,
        order: fsearch_types::SortOrder,
    ) {
        self.state.sort_order = order;
        self.run_search(surface, vault);
    }

    #[must_use]
    pub fn focused_index(&self) -> Option<usize> {
        self.focused
    }

    #[must_use]
    pub fn focused_item(&self) -> Option<&ResultItem> {
        self.focused.and_then(|i| self.items.get(i))
    }

    pub fn set_focused(&mut self, surface: &mut Surface, index: Option<usize>) {
        if let Some(old) = self.focused.and_then(|i| self.items.get(i)) {
            surface.remove_class(old.node, "is-focused");
        }
        self.focused = index.filter(|i| *i < self.items.len());
        if let Some(item) = self.focused_item() {
            surface.add_class(item.node, "is-focused");
        }
    }

    /// Focus the item showing `file`, if present.
    pub fn focus_file(&mut self, surface: &mut Surface, file: FileId) -> bool {
        let index = self.items.iter().position(|item| item.file == file);
        if index.is_some() {
            self.set_focused(surface, index);
        }
        index.is_some()
    }

    pub fn focus_next(&mut self, surface: &mut Surface) {
        if self.items.is_empty() {
            return;
        }
        let next = match self.focused {
            None => 0,
            Some(i) => (i + 1).min(self.items.len() - 1),
        };
        self.set_focused(surface, Some(next));
    }

    pub fn focus_previous(&mut self, surface: &mut Surface) {
        if self.items.is_empty() {
            return;
        }
        let previous = match self.focused {
            None => 0,
            Some(i) => i.saturating_sub(1),
        };
        self.set_focused(surface, Some(previous));
    }

    /// Expand the focused item's "show more matches" affordance.
    pub fn show_more_after(&mut self, surface: &mut Surface) {
        if let Some(index) = self.focused
            && let Some(item) = self.items.get_mut(index)
        {
            item.show_more = true;
            item.collapsed = false;
            surface.add_class(item.node, "show-more");
            surface.remove_class(item.node, "is-collapsed");
        }
    }

    /// Collapse the focused item's "show more matches" affordance.
    pub fn show_more_before(&mut self, surface: &mut Surface) {
        if let Some(index) = self.focused
            && let Some(item) = self.items.get_mut(index)
        {
            item.show_more = false;
            item.collapsed = true;
            surface.remove_class(item.node, "show-more");
            surface.add_class(item.node, "is-collapsed");
        }
    }

    /// The host's horizontal tree navigation: collapse the focused node.
    pub fn collapse_focused(&mut self, surface: &mut Surface) {
        if let Some(index) = self.focused
            && let Some(item) = self.items.get_mut(index)
        {
            item.collapsed = true;
            surface.add_class(item.node, "is-collapsed");
        }
    }

    /// The host's horizontal tree navigation: expand the focused node.
    pub fn expand_focused(&mut self, surface: &mut Surface) {
        if let Some(index) = self.focused
            && let Some(item) = self.items.get_mut(index)
        {
            item.collapsed = false;
            surface.remove_class(item.node, "is-collapsed");
        }
    }

    /// The result tree's visible entry count (the modal's click guard).
    #[must_use]
    pub fn visible_count(&self, surface: &Surface) -> usize {
        surface.child_count(self.results)
    }

    /// Map a clicked node to the result item owning it.
    #[must_use]
    pub fn item_index_at(&self, surface: &Surface, node: NodeId) -> Option<usize> {
        let item_node = surface.closest(node, "tree-item")?;
        self.items.iter().position(|item| item.node == item_node)
    }

    /// Ephemeral state carrying the focused item's match into a preview.
    #[must_use]
    pub fn focused_ephemeral(&self) -> Option<EphemeralState> {
        let item = self.focused_item()?;
        Some(EphemeralState {
            match_text: item.excerpt.clone(),
            ranges: item.ranges.clone(),
            focus: false,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileViewMode {
    Preview,
    Source,
}

#[derive(Debug, Clone)]
pub struct FileViewModel {
    pub file: FileId,
    pub mode: FileViewMode,
    pub ephemeral: Option<EphemeralState>,
    /// Canvas node id selected+zoomed after a canvas match bridge.
    pub canvas_selection: Option<String>,
    pub zoomed: bool,
}

impl FileViewModel {
    #[must_use]
    pub fn new(file: FileId, ephemeral: Option<EphemeralState>) -> Self {
        Self {
            file,
            mode: FileViewMode::Preview,
            ephemeral,
            canvas_selection: None,
            zoomed: false,
        }
    }

    /// Point the view at another file (or the same file with new state).
    pub fn retarget(&mut self, file: FileId, ephemeral: Option<EphemeralState>) {
        self.file = file;
        self.ephemeral = ephemeral;
        self.canvas_selection = None;
        self.zoomed = false;
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            FileViewMode::Preview => FileViewMode::Source,
            FileViewMode::Source => FileViewMode::Preview,
        };
    }
}
