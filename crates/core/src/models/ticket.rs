#![allow(missing_docs)]

use std::fmt;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use rand::{distributions::Alphanumeric, Rng};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::cart::Cart;

/// Number of characters in a ticket id.
pub const TICKET_ID_LEN: usize = 6;

static TICKET_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{6}$").expect("failed to compile ticket id regex"));

/// Short alphanumeric receipt code handed to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(String);

impl TicketId {
    /// Draw each character uniformly from `[a-zA-Z0-9]`.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let code = (0..TICKET_ID_LEN)
            .map(|_| char::from(rng.sample(Alphanumeric)))
            .collect();
        Self(code)
    }

    /// Whether `candidate` has the shape of a ticket id.
    pub fn is_well_formed(candidate: &str) -> bool {
        TICKET_ID_RE.is_match(candidate)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for TicketId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Durable receipt pairing a ticket id with the cart that was ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    id: TicketId,
    cart: Cart,
    placed_at: DateTime<Utc>,
}

impl Ticket {
    pub fn new(id: TicketId, cart: Cart, placed_at: DateTime<Utc>) -> Self {
        Self {
            id,
            cart,
            placed_at,
        }
    }

    pub fn id(&self) -> &TicketId {
        &self.id
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn placed_at(&self) -> DateTime<Utc> {
        self.placed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn generated_ids_are_six_alphanumerics() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let id = TicketId::generate(&mut rng);
            assert_eq!(id.as_str().len(), TICKET_ID_LEN);
            assert!(id.as_str().chars().all(|ch| ch.is_ascii_alphanumeric()));
            assert!(TicketId::is_well_formed(id.as_str()));
        }
    }

    #[test]
    fn generation_is_reproducible_from_seed() {
        let first = TicketId::generate(&mut StdRng::seed_from_u64(42));
        let second = TicketId::generate(&mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(!TicketId::is_well_formed(""));
        assert!(!TicketId::is_well_formed("abc12"));
        assert!(!TicketId::is_well_formed("abc1234"));
        assert!(!TicketId::is_well_formed("abc-12"));
        assert!(!TicketId::is_well_formed(" abc12"));
        assert!(TicketId::is_well_formed("aZ09xY"));
    }

    #[test]
    fn ticket_id_serializes_as_plain_string() {
        let id = TicketId("aZ09xY".to_string());
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"aZ09xY\"");
        assert!(id == *"aZ09xY");
    }
}
