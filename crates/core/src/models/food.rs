use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{MarketError, MarketResult};

/// Food categories a business can list under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Bread, pastries and other baked goods.
    Bakery,
    /// Tinned and jarred goods.
    #[serde(rename = "Canned Food")]
    CannedFood,
    /// Milk, cheese, yoghurt.
    Dairy,
    /// Meat and fish.
    Meat,
    /// Fruit and vegetables.
    Produce,
    /// Anything that fits nowhere else.
    Other,
}

impl Category {
    /// Every category, in the order a menu presents them.
    pub const ALL: [Category; 6] = [
        Category::Bakery,
        Category::CannedFood,
        Category::Dairy,
        Category::Meat,
        Category::Produce,
        Category::Other,
    ];

    /// Human-readable label, also the persisted form.
    pub fn label(self) -> &'static str {
        match self {
            Category::Bakery => "Bakery",
            Category::CannedFood => "Canned Food",
            Category::Dairy => "Dairy",
            Category::Meat => "Meat",
            Category::Produce => "Produce",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Category::ALL
            .into_iter()
            .find(|category| category.label() == needle)
            .ok_or_else(|| MarketError::InvalidInput(format!("unknown category '{needle}'")))
    }
}

/// Category selection used when browsing listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Every listing.
    #[default]
    All,
    /// Only listings of one category.
    Only(Category),
}

impl CategoryFilter {
    /// Whether a listing of `category` passes this filter.
    pub fn admits(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => wanted == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == "All" {
            return Ok(CategoryFilter::All);
        }
        s.parse().map(CategoryFilter::Only)
    }
}

/// A priced food item. Owned by exactly one listing or cart at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    name: String,
    price: f64,
    category: Category,
}

impl FoodItem {
    /// Build an item, rejecting prices that are negative or not finite.
    pub fn new(name: impl Into<String>, price: f64, category: Category) -> MarketResult<Self> {
        if !price.is_finite() || price < 0.0 {
            return Err(MarketError::InvalidInput(format!(
                "price must be a non-negative amount, got {price}"
            )));
        }
        Ok(Self {
            name: name.into(),
            price,
            category,
        })
    }

    /// Item name as entered by the seller.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price.
    pub fn price(&self) -> f64 {
        self.price
    }

    /// Item category.
    pub fn category(&self) -> Category {
        self.category
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_round_trip() {
        for category in Category::ALL {
            assert_eq!(category.label().parse::<Category>(), Ok(category));
        }
        assert_eq!(" Canned Food ".parse::<Category>(), Ok(Category::CannedFood));
    }

    #[test]
    fn unknown_category_is_invalid_input() {
        let err = "Candy".parse::<Category>().unwrap_err();
        assert!(matches!(err, MarketError::InvalidInput(_)));
        assert!("bakery".parse::<Category>().is_err());
    }

    #[test]
    fn filter_parses_all_or_category() {
        assert_eq!("All".parse::<CategoryFilter>(), Ok(CategoryFilter::All));
        assert_eq!(
            "Dairy".parse::<CategoryFilter>(),
            Ok(CategoryFilter::Only(Category::Dairy))
        );
        assert!(CategoryFilter::All.admits(Category::Meat));
        assert!(!CategoryFilter::Only(Category::Dairy).admits(Category::Meat));
    }

    #[test]
    fn price_must_be_non_negative_and_finite() {
        assert!(FoodItem::new("Bread", 0.0, Category::Bakery).is_ok());
        assert!(FoodItem::new("Bread", -0.5, Category::Bakery).is_err());
        assert!(FoodItem::new("Bread", f64::NAN, Category::Bakery).is_err());
        assert!(FoodItem::new("Bread", f64::INFINITY, Category::Bakery).is_err());
    }

    #[test]
    fn category_serializes_as_label() {
        let json = serde_json::to_string(&Category::CannedFood).unwrap();
        assert_eq!(json, "\"Canned Food\"");
    }
}
