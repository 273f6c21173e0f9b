use serde::{Deserialize, Serialize};

use super::food::FoodItem;

/// Ordered collection of food items a customer intends to buy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<FoodItem>,
}

impl Cart {
    /// An empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item; insertion order is preserved.
    pub fn add_item(&mut self, item: FoodItem) {
        self.items.push(item);
    }

    /// Remove and return the first item called `name`.
    pub fn remove_item(&mut self, name: &str) -> Option<FoodItem> {
        let index = self.items.iter().position(|item| item.name() == name)?;
        Some(self.items.remove(index))
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[FoodItem] {
        &self.items
    }

    /// Number of items held.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart holds nothing.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of item prices.
    pub fn total(&self) -> f64 {
        self.items.iter().map(FoodItem::price).sum()
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Move the contents out, leaving this cart empty.
    pub fn take(&mut self) -> Cart {
        std::mem::take(self)
    }
}
