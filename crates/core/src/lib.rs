#![warn(clippy::all, missing_docs)]

//! Core logic for the FeedForward food-surplus marketplace.
//!
//! This crate hosts the entity model, the snapshot persistence layer,
//! configuration and logging setup, and the [`Marketplace`] application
//! core that any presentation shell drives.

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod market;
pub mod models;
pub mod shared;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::AppConfig;
pub use error::{MarketError, MarketResult};
pub use market::Marketplace;
pub use models::{
    AccountKind, Cart, Category, CategoryFilter, FoodItem, Listing, ListingId, MenuKind, Ticket,
    TicketId, User,
};
pub use shared::SharedMarketplace;
pub use store::{Collection, FlushReport, LoadedCollections, PersistenceFailure, SnapshotStore};
