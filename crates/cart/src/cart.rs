use std::collections::HashSet;

use serde::{Deserialize, Serialize, Serializer};

use cartkit_core::{DomainError, DomainResult, Entity, ProductId};

use crate::entry::{CartEntry, Quantity};
use crate::product::Product;

/// Immutable cart snapshot.
///
/// Entries keep insertion order and hold at most one entry per product id.
/// Transitions (`with_*`, `without`) build a new snapshot; the receiver is
/// never modified, so whatever is persisted is exactly what gets committed.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "Vec<CartEntry>")]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from entries, enforcing one entry per id.
    pub fn from_entries(entries: Vec<CartEntry>) -> DomainResult<Self> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(entry.product_id()) {
                return Err(DomainError::invariant(format!(
                    "duplicate cart entry for product {}",
                    entry.product_id()
                )));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &CartEntry> {
        self.entries.iter()
    }

    pub fn get(&self, product_id: ProductId) -> Option<&CartEntry> {
        self.entries.iter().find(|e| *e.id() == product_id)
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.get(product_id).is_some()
    }

    /// Current amount for `product_id`, 0 when it is not in the cart.
    pub fn amount_of(&self, product_id: ProductId) -> u32 {
        self.get(product_id).map(|e| e.amount().get()).unwrap_or(0)
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all amounts.
    pub fn total_units(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.amount().get())).sum()
    }

    fn position(&self, product_id: ProductId) -> DomainResult<usize> {
        self.entries
            .iter()
            .position(|e| *e.id() == product_id)
            .ok_or_else(|| DomainError::not_found(format!("product {product_id} is not in the cart")))
    }

    /// New snapshot with the entry for `product_id` incremented by one.
    pub fn with_incremented(&self, product_id: ProductId) -> DomainResult<Self> {
        let idx = self.position(product_id)?;
        let amount = self.entries[idx].amount().incremented()?;
        Ok(self.replace_at(idx, amount))
    }

    /// New snapshot with `product` appended at amount 1.
    pub fn with_appended(&self, product: Product) -> DomainResult<Self> {
        if self.contains(product.id) {
            return Err(DomainError::conflict(format!(
                "product {} is already in the cart",
                product.id
            )));
        }
        let mut entries = self.entries.clone();
        entries.push(CartEntry::from_product(product, Quantity::ONE));
        Ok(Self { entries })
    }

    /// New snapshot with the entry for `product_id` set to `amount`.
    pub fn with_amount(&self, product_id: ProductId, amount: Quantity) -> DomainResult<Self> {
        let idx = self.position(product_id)?;
        Ok(self.replace_at(idx, amount))
    }

    /// New snapshot without the entry for `product_id`; other entries keep
    /// their relative order.
    pub fn without(&self, product_id: ProductId) -> DomainResult<Self> {
        let idx = self.position(product_id)?;
        let mut entries = self.entries.clone();
        entries.remove(idx);
        Ok(Self { entries })
    }

    fn replace_at(&self, idx: usize, amount: Quantity) -> Self {
        let entries = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| if i == idx { e.with_amount(amount) } else { e.clone() })
            .collect();
        Self { entries }
    }
}

impl TryFrom<Vec<CartEntry>> for Cart {
    type Error = DomainError;

    fn try_from(entries: Vec<CartEntry>) -> Result<Self, Self::Error> {
        Self::from_entries(entries)
    }
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.entries)
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartEntry;
    type IntoIter = core::slice::Iter<'a, CartEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
