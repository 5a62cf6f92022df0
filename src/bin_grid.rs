//! Fixed grid of storage slots owned by one shelf.
//!
//! Bins are indexed `[column][row]`. A bin holds at most one product,
//! stored as the product's id; the product keeps the matching
//! back-reference in its [`BinBinding`].

use log::warn;

use crate::error::{LayoutError, Result};
use crate::types::{BinBinding, BinDimensions, BinSnapshot, ProductId, ShelfId};

#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    dimensions: BinDimensions,
    content: Option<ProductId>,
}

impl Bin {
    fn new(dimensions: BinDimensions) -> Self {
        Self {
            dimensions,
            content: None,
        }
    }

    pub fn dimensions(&self) -> BinDimensions {
        self.dimensions
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn is_occupied(&self) -> bool {
        self.content.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct BinGrid {
    shelf: ShelfId,
    columns: usize,
    rows: usize,
    bins: Vec<Vec<Bin>>,
}

impl BinGrid {
    /// `columns x rows` empty bins of identical size.
    pub fn new(shelf: ShelfId, columns: usize, rows: usize, unit: BinDimensions) -> Self {
        let bins = (0..columns)
            .map(|_| (0..rows).map(|_| Bin::new(unit)).collect())
            .collect();
        Self {
            shelf,
            columns,
            rows,
            bins,
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    fn check(&self, column: usize, row: usize) -> Result<()> {
        if column >= self.columns || row >= self.rows {
            return Err(LayoutError::InvalidBinCoordinate {
                shelf: self.shelf.clone(),
                column,
                row,
                columns: self.columns,
                rows: self.rows,
            });
        }
        Ok(())
    }

    pub fn get(&self, column: usize, row: usize) -> Result<&Bin> {
        self.check(column, row)?;
        Ok(&self.bins[column][row])
    }

    /// Fails with `BinOccupied` (and changes nothing) if the bin is taken.
    pub fn set_content(&mut self, column: usize, row: usize, product: &str) -> Result<()> {
        self.check(column, row)?;
        let bin = &mut self.bins[column][row];
        if bin.is_occupied() {
            return Err(LayoutError::BinOccupied {
                shelf: self.shelf.clone(),
                column,
                row,
            });
        }
        bin.content = Some(product.to_string());
        Ok(())
    }

    /// Fails with `BinMismatch` unless the bin holds exactly `expected`.
    pub fn clear_content(&mut self, column: usize, row: usize, expected: &str) -> Result<()> {
        self.check(column, row)?;
        let bin = &mut self.bins[column][row];
        if bin.content() != Some(expected) {
            return Err(LayoutError::BinMismatch {
                shelf: self.shelf.clone(),
                column,
                row,
                product: expected.to_string(),
            });
        }
        bin.content = None;
        Ok(())
    }

    /// Empty every bin whose content no longer points back at it.
    ///
    /// `binding_of` looks up the binding a product currently records.
    /// Returns the ids that were dropped.
    pub fn reconcile<'a, F>(&mut self, binding_of: F) -> Vec<ProductId>
    where
        F: Fn(&str) -> Option<&'a BinBinding>,
    {
        let mut dropped = Vec::new();
        for (column, col_bins) in self.bins.iter_mut().enumerate() {
            for (row, bin) in col_bins.iter_mut().enumerate() {
                let Some(product) = bin.content.as_deref() else {
                    continue;
                };
                let consistent = binding_of(product).is_some_and(|b| {
                    b.shelf == self.shelf && b.column == column && b.row == row
                });
                if !consistent {
                    warn!(
                        "shelf {}: bin ({column}, {row}) held stale product {product}, clearing",
                        self.shelf
                    );
                    if let Some(id) = bin.content.take() {
                        dropped.push(id);
                    }
                }
            }
        }
        dropped
    }

    pub fn occupied_count(&self) -> usize {
        self.iter().filter(|(_, _, bin)| bin.is_occupied()).count()
    }

    pub fn free_count(&self) -> usize {
        self.columns * self.rows - self.occupied_count()
    }

    pub fn has_free_slot(&self) -> bool {
        self.iter().any(|(_, _, bin)| !bin.is_occupied())
    }

    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, _, bin)| !bin.is_occupied())
    }

    /// Column-major walk over every bin.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Bin)> + '_ {
        self.bins.iter().enumerate().flat_map(|(column, col_bins)| {
            col_bins
                .iter()
                .enumerate()
                .map(move |(row, bin)| (column, row, bin))
        })
    }

    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, &str)> + '_ {
        self.iter()
            .filter_map(|(column, row, bin)| bin.content().map(|id| (column, row, id)))
    }

    pub fn snapshot(&self) -> Vec<BinSnapshot> {
        self.iter()
            .map(|(column, row, bin)| BinSnapshot {
                column,
                row,
                content: bin.content.clone(),
            })
            .collect()
    }
}
