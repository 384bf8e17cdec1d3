//! Row-major cell storage shared by static and dynamic layers.

use tilewalk_core::{CatalogId, LayerKind, TileValue};

#[derive(Clone, Debug)]
pub(crate) struct Layer {
    kind: LayerKind,
    catalogs: Vec<CatalogId>,
    cells: Vec<Option<TileValue>>,
}

impl Layer {
    pub(crate) fn new(
        kind: LayerKind,
        catalogs: Vec<CatalogId>,
        cells: Vec<Option<TileValue>>,
    ) -> Self {
        Self {
            kind,
            catalogs,
            cells,
        }
    }

    pub(crate) const fn kind(&self) -> LayerKind {
        self.kind
    }

    pub(crate) fn catalogs(&self) -> &[CatalogId] {
        &self.catalogs
    }

    pub(crate) fn uses(&self, catalog: CatalogId) -> bool {
        self.catalogs.contains(&catalog)
    }

    pub(crate) fn value(&self, index: usize) -> Option<TileValue> {
        self.cells.get(index).copied().flatten()
    }

    pub(crate) fn cells(&self) -> impl Iterator<Item = (usize, TileValue)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(index, value)| value.map(|value| (index, value)))
    }

    pub(crate) fn set(&mut self, index: usize, value: Option<TileValue>) {
        if let Some(slot) = self.cells.get_mut(index) {
            *slot = value;
        }
    }
}
