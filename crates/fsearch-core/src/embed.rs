//! Registry of leaves the overlay embeds in containers the host does not
//! manage.
//!
//! The host only enumerates leaves it placed itself, so every embedded leaf
//! is recorded here; the interception layer consults the registry to answer
//! lifecycle questions (enumeration, root resolution, pin enforcement) on
//! the host's behalf.

use fsearch_host::{LeafId, NodeId, WindowId};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmbeddedViewId(pub usize);

/// One leaf the overlay grafted into a container of its own.
#[derive(Debug, Clone)]
pub struct EmbeddedView {
    pub id: EmbeddedViewId,
    pub leaf: LeafId,
    /// The window whose leaf enumeration should surface this leaf.
    pub window: WindowId,
    /// The overlay-owned container the leaf was reparented into.
    pub container: NodeId,
    /// What the leaf reports as its root instead of the real workspace root.
    pub synthetic_root: NodeId,
    /// Containers the overlay itself populates; opens into these get the
    /// extra canvas/recent-file treatment.
    pub plugin_owned: bool,
    disposed: bool,
}

#[derive(Debug, Default)]
pub struct EmbeddedRegistry {
    views: Vec<EmbeddedView>,
}

impl EmbeddedRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        leaf: LeafId,
        window: WindowId,
        container: NodeId,
        synthetic_root: NodeId,
        plugin_owned: bool,
    ) -> EmbeddedViewId {
        let id = EmbeddedViewId(self.views.len());
        self.views.push(EmbeddedView {
            id,
            leaf,
            window,
            container,
            synthetic_root,
            plugin_owned,
            disposed: false,
        });
        debug!("registered embedded leaf {leaf:?} as {id:?}");
        id
    }

    /// Mark a view disposed; returns the leaf to detach, once.
    pub fn dispose(&mut self, id: EmbeddedViewId) -> Option<LeafId> {
        let view = self.views.get_mut(id.0).filter(|v| !v.disposed)?;
        view.disposed = true;
        debug!("disposed embedded view {id:?}");
        Some(view.leaf)
    }

    #[must_use]
    pub fn view(&self, id: EmbeddedViewId) -> Option<&EmbeddedView> {
        self.views.get(id.0).filter(|v| !v.disposed)
    }

    #[must_use]
    pub fn view_for_leaf(&self, leaf: LeafId) -> Option<&EmbeddedView> {
        self.views.iter().find(|v| !v.disposed && v.leaf == leaf)
    }

    #[must_use]
    pub fn is_embedded(&self, leaf: LeafId) -> bool {
        self.view_for_leaf(leaf).is_some()
    }

    #[must_use]
    pub fn is_plugin_owned(&self, leaf: LeafId) -> bool {
        self.view_for_leaf(leaf).is_some_and(|v| v.plugin_owned)
    }

    pub fn views_for_window(&self, window: WindowId) -> impl Iterator<Item = &EmbeddedView> {
        self.views
            .iter()
            .filter(move |v| !v.disposed && v.window == window)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.views.iter().filter(|v| !v.disposed).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsearch_host::MAIN_WINDOW;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = EmbeddedRegistry::new();
        let id = registry.register(LeafId(3), MAIN_WINDOW, NodeId(1), NodeId(0), true);

        assert!(registry.is_embedded(LeafId(3)));
        assert!(registry.is_plugin_owned(LeafId(3)));
        assert_eq!(registry.view_for_leaf(LeafId(3)).unwrap().id, id);
        assert!(!registry.is_embedded(LeafId(4)));
    }

    #[test]
    fn test_dispose_is_one_shot() {
        let mut registry = EmbeddedRegistry::new();
        let id = registry.register(LeafId(0), MAIN_WINDOW, NodeId(1), NodeId(0), false);

        assert_eq!(registry.dispose(id), Some(LeafId(0)));
        assert_eq!(registry.dispose(id), None);
        assert!(!registry.is_embedded(LeafId(0)));
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_views_for_window_filters() {
        let mut registry = EmbeddedRegistry::new();
        registry.register(LeafId(0), MAIN_WINDOW, NodeId(1), NodeId(0), false);
        registry.register(LeafId(1), WindowId(2), NodeId(2), NodeId(0), false);

        let main: Vec<_> = registry.views_for_window(MAIN_WINDOW).collect();
        assert_eq!(main.len(), 1);
        assert_eq!(main[0].leaf, LeafId(0));
    }
}
