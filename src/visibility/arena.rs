//! Storage for resolved views. Child views point at their parent by
//! [`ViewId`], so propagation chains are plain indices into one arena.

use crate::visibility::view::View;

/// Lightweight handle for a view stored in a [`ViewArena`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(usize);

impl ViewId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ViewId({})", self.0)
    }
}

/// Append-only view storage owned by one receiver.
#[derive(Debug, Clone, Default)]
pub struct ViewArena {
    views: Vec<View>,
}

impl ViewArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, view: View) -> ViewId {
        self.views.push(view);
        ViewId(self.views.len() - 1)
    }

    pub fn get(&self, id: ViewId) -> Option<&View> {
        self.views.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ViewId, &View)> {
        self.views.iter().enumerate().map(|(i, v)| (ViewId(i), v))
    }

    /// `id` followed by its parent, grandparent, ... up to the seed view.
    pub fn ancestry(&self, id: ViewId) -> impl Iterator<Item = ViewId> + '_ {
        std::iter::successors(self.get(id).map(|_| id), move |current| {
            self.get(*current).and_then(View::parent)
        })
    }

    /// Number of views in the chain from `id` back to its seed view.
    pub fn chain_len(&self, id: ViewId) -> usize {
        self.ancestry(id).count()
    }
}
