//! Grouping nodes into layer columns.

use serde::Serialize;

use crate::order::LayerOrder;

/// Node indices grouped by layer, one column per entry of a [`LayerOrder`].
///
/// Within a column nodes start in dataset order; only
/// [`crate::reorder::reorder_by_barycenter`] permutes them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodesByLayer {
    layers: Vec<String>,
    columns: Vec<Vec<usize>>,
}

impl NodesByLayer {
    /// Column for layer `name`, if it is part of the order.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[usize]> {
        let pos = self.layers.iter().position(|l| l == name)?;
        Some(&self.columns[pos])
    }

    /// Column at order position `pos`.
    #[must_use]
    pub fn column(&self, pos: usize) -> &[usize] {
        self.columns.get(pos).map_or(&[], Vec::as_slice)
    }

    pub(crate) fn column_mut(&mut self, pos: usize) -> Option<&mut Vec<usize>> {
        self.columns.get_mut(pos)
    }

    /// `(layer, column)` pairs in layer order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.layers
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter().map(Vec::as_slice))
    }

    /// Number of columns (equal to the layer order length).
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Total nodes across all columns.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    pub(crate) fn from_columns(layers: Vec<String>, columns: Vec<Vec<usize>>) -> Self {
        debug_assert_eq!(layers.len(), columns.len());
        Self { layers, columns }
    }
}

/// Group node indices by resolved layer, preserving dataset order.
///
/// Every layer of `order` gets a column, possibly empty. Nodes whose type is
/// `Unknown` or otherwise absent from `order` are left out.
#[must_use]
pub fn partition_by_layer(types: &[String], order: &LayerOrder) -> NodesByLayer {
    let mut columns = vec![Vec::new(); order.len()];
    for (i, ty) in types.iter().enumerate() {
        if let Some(pos) = order.position(ty) {
            columns[pos].push(i);
        }
    }
    NodesByLayer::from_columns(order.names().to_vec(), columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn preserves_dataset_order_within_layer() {
        let types = strings(&["B", "A", "B", "A", "B"]);
        let order = LayerOrder::explicit(&strings(&["A", "B"]), &types);
        let parts = partition_by_layer(&types, &order);
        assert_eq!(parts.get("A"), Some([1, 3].as_slice()));
        assert_eq!(parts.get("B"), Some([0, 2, 4].as_slice()));
        assert_eq!(parts.node_count(), 5);
    }

    #[test]
    fn unknown_nodes_are_excluded() {
        let types = strings(&["A", "Unknown", "A"]);
        let order = LayerOrder::inferred(&types);
        let parts = partition_by_layer(&types, &order);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts.column(0), &[0, 2]);
        assert!(parts.get("Unknown").is_none());
    }

    #[test]
    fn iterates_in_layer_order() {
        let types = strings(&["Test", "Req"]);
        let order = LayerOrder::explicit(&strings(&["Req", "Test"]), &types);
        let parts = partition_by_layer(&types, &order);
        let layers: Vec<&str> = parts.iter().map(|(l, _)| l).collect();
        assert_eq!(layers, vec!["Req", "Test"]);
        assert!(parts.column(7).is_empty());
    }
}
