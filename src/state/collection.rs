//! Ordered collection of materials keyed by identifier

use rust_decimal::Decimal;

use crate::models::{Material, MaterialId};

/// Ordered materials with unique identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialCollection {
    items: Vec<Material>,
}

impl MaterialCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from server records. Later duplicates of an id are dropped.
    pub fn from_materials(materials: Vec<Material>) -> Self {
        let mut collection = Self::new();
        for material in materials {
            collection.push(material);
        }
        collection
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Material] {
        &self.items
    }

    pub fn position(&self, id: &MaterialId) -> Option<usize> {
        self.items.iter().position(|m| &m.id == id)
    }

    pub fn contains(&self, id: &MaterialId) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &MaterialId) -> Option<&Material> {
        self.items.iter().find(|m| &m.id == id)
    }

    pub fn get_mut(&mut self, id: &MaterialId) -> Option<&mut Material> {
        self.items.iter_mut().find(|m| &m.id == id)
    }

    pub fn first_id(&self) -> Option<&MaterialId> {
        self.items.first().map(|m| &m.id)
    }

    pub fn id_at(&self, index: usize) -> Option<&MaterialId> {
        self.items.get(index).map(|m| &m.id)
    }

    /// Append; returns false if the id is already present
    pub fn push(&mut self, material: Material) -> bool {
        if self.contains(&material.id) {
            return false;
        }
        self.items.push(material);
        true
    }

    /// Insert at `index`, clamped to the current length
    pub fn insert_at(&mut self, index: usize, material: Material) -> bool {
        if self.contains(&material.id) {
            return false;
        }
        let index = index.min(self.items.len());
        self.items.insert(index, material);
        true
    }

    /// Remove by id, returning the former index and the record
    pub fn remove(&mut self, id: &MaterialId) -> Option<(usize, Material)> {
        let index = self.position(id)?;
        Some((index, self.items.remove(index)))
    }

    /// Swap the record stored under `id` for `material`, keeping its position.
    ///
    /// Fails if `id` is absent, or if `material` carries a different id that
    /// already exists elsewhere in the collection.
    pub fn replace(&mut self, id: &MaterialId, material: Material) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        if &material.id != id && self.contains(&material.id) {
            return false;
        }
        self.items[index] = material;
        true
    }

    /// Sum of all costs, saturating at `Decimal::MAX` / `Decimal::MIN`
    pub fn total_cost(&self) -> Decimal {
        self.items
            .iter()
            .fold(Decimal::ZERO, |total, m| total.saturating_add(m.cost))
    }
}

impl<'a> IntoIterator for &'a MaterialCollection {
    type Item = &'a Material;
    type IntoIter = std::slice::Iter<'a, Material>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
