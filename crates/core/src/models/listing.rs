#![allow(missing_docs)]

use std::fmt;

use chrono::{DateTime, Days, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::food::{Category, FoodItem};

const DATE_LABEL_FORMAT: &str = "%d-%m-%Y";

/// Identifier handed out by the marketplace, strictly increasing and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub u64);

impl ListingId {
    /// First id issued to an empty catalog.
    pub const FIRST: ListingId = ListingId(1);

    /// The id issued after this one, or `None` once the id space is exhausted.
    pub fn next(self) -> Option<ListingId> {
        self.0.checked_add(1).map(ListingId)
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A business's offer of one food item, with a posting date and shelf life.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    id: ListingId,
    item: FoodItem,
    seller: String,
    date_added: DateTime<Utc>,
    expiry_days: u32,
}

impl Listing {
    /// Wrap `item` in a listing attributed to `seller`.
    pub fn new(
        id: ListingId,
        item: FoodItem,
        seller: impl Into<String>,
        date_added: DateTime<Utc>,
        expiry_days: u32,
    ) -> Self {
        Self {
            id,
            item,
            seller: seller.into(),
            date_added,
            expiry_days,
        }
    }

    pub fn id(&self) -> ListingId {
        self.id
    }

    pub fn item(&self) -> &FoodItem {
        &self.item
    }

    /// Give up the item, dropping the listing around it.
    pub fn into_item(self) -> FoodItem {
        self.item
    }

    /// Shorthand for the item's name.
    pub fn name(&self) -> &str {
        self.item.name()
    }

    pub fn seller(&self) -> &str {
        &self.seller
    }

    pub fn category(&self) -> Category {
        self.item.category()
    }

    pub fn date_added(&self) -> DateTime<Utc> {
        self.date_added
    }

    pub fn expiry_days(&self) -> u32 {
        self.expiry_days
    }

    /// Expiration date on the local calendar.
    pub fn expiration_date(&self) -> NaiveDate {
        self.expiration_date_in(&Local)
    }

    /// Posting date advanced by `expiry_days` calendar days in `tz`.
    ///
    /// Day arithmetic happens on the calendar date, so a daylight-saving
    /// transition inside the window never shifts the result.
    pub fn expiration_date_in<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.date_added
            .with_timezone(tz)
            .date_naive()
            .checked_add_days(Days::new(u64::from(self.expiry_days)))
            .unwrap_or(NaiveDate::MAX)
    }

    /// True once `today` is past the expiration date.
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        today > self.expiration_date()
    }

    /// Posting date as `dd-mm-yyyy`.
    pub fn date_added_label(&self) -> String {
        self.date_added
            .with_timezone(&Local)
            .format(DATE_LABEL_FORMAT)
            .to_string()
    }

    /// Expiration date as `dd-mm-yyyy`.
    pub fn expiration_label(&self) -> String {
        self.expiration_date().format(DATE_LABEL_FORMAT).to_string()
    }

    /// Case-insensitive substring match against item name, seller and category.
    /// An empty query matches every listing.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name().to_lowercase().contains(&needle)
            || self.seller.to_lowercase().contains(&needle)
            || self.category().label().to_lowercase().contains(&needle)
    }
}
