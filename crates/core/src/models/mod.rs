//! Marketplace entities: accounts, food items, listings, carts and tickets.

mod cart;
mod food;
mod listing;
mod ticket;
mod user;

pub use cart::Cart;
pub use food::{Category, CategoryFilter, FoodItem};
pub use listing::{Listing, ListingId};
pub use ticket::{Ticket, TicketId, TICKET_ID_LEN};
pub use user::{AccountKind, MenuKind, User};
