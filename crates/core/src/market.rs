//! Application core: accounts, the listing catalog, the active cart and tickets.
//!
//! A [`Marketplace`] owns every in-memory collection plus the session user
//! and the single active cart. Each mutating command re-saves all three
//! persisted collections through the [`SnapshotStore`]; persistence failures
//! are logged and recorded in [`Marketplace::last_flush`] but never fail the
//! command itself.

use rand::{rngs::StdRng, RngCore, SeedableRng};
use tracing::{debug, info, warn};

use crate::{
    clock::{Clock, SystemClock},
    config::AppConfig,
    error::{MarketError, MarketResult},
    models::{
        AccountKind, Cart, Category, CategoryFilter, FoodItem, Listing, ListingId, MenuKind,
        Ticket, TicketId, User,
    },
    store::{CollectionsRef, FlushReport, SnapshotStore},
};

/// The marketplace state for one interactive session.
pub struct Marketplace {
    store: SnapshotStore,
    clock: Box<dyn Clock>,
    rng: Box<dyn RngCore + Send>,
    ticket_id_attempts: usize,
    users: Vec<User>,
    listings: Vec<Listing>,
    tickets: Vec<Ticket>,
    cart: Cart,
    session: Option<User>,
    next_listing_id: ListingId,
    last_flush: Option<FlushReport>,
}

impl Marketplace {
    /// Open the marketplace described by `config`, restoring saved collections.
    pub fn open(config: &AppConfig) -> Self {
        Self::with_parts(
            SnapshotStore::from_config(config),
            SystemClock,
            StdRng::from_entropy(),
            config.ticket_id_attempts,
        )
    }

    /// Assemble a marketplace from explicit collaborators, then restore from `store`.
    pub fn with_parts(
        store: SnapshotStore,
        clock: impl Clock + 'static,
        rng: impl RngCore + Send + 'static,
        ticket_id_attempts: usize,
    ) -> Self {
        let mut market = Self {
            store,
            clock: Box::new(clock),
            rng: Box::new(rng),
            ticket_id_attempts: ticket_id_attempts.max(1),
            users: Vec::new(),
            listings: Vec::new(),
            tickets: Vec::new(),
            cart: Cart::new(),
            session: None,
            next_listing_id: ListingId::FIRST,
            last_flush: None,
        };
        market.restore();
        market
    }

    fn restore(&mut self) {
        let loaded = self.store.load_all();
        self.users = loaded.users.unwrap_or_default();
        self.tickets = loaded.tickets.unwrap_or_default();
        let (listings, recorded) = match loaded.listings {
            Some(listings) if listings.iter().any(|listing| listing.id().next().is_none()) => {
                warn!("Failed to load listings: listing id out of range, catalog left empty");
                (Vec::new(), None)
            }
            Some(listings) => (listings, loaded.next_listing_id),
            None => (Vec::new(), None),
        };
        self.listings = listings;
        // Never hand out an id at or below one already seen, even if the
        // recorded counter is stale or missing.
        let after_loaded = self
            .listings
            .iter()
            .filter_map(|listing| listing.id().next())
            .max()
            .unwrap_or(ListingId::FIRST);
        self.next_listing_id = recorded.map_or(after_loaded, |recorded| recorded.max(after_loaded));
        info!(
            "restored {} users, {} listings, {} tickets from {}",
            self.users.len(),
            self.listings.len(),
            self.tickets.len(),
            self.store.root().display()
        );
    }

    /// Register a new account. Usernames are not checked for uniqueness.
    pub fn register_user(
        &mut self,
        kind: AccountKind,
        username: impl Into<String>,
        password: impl Into<String>,
    ) {
        let user = User::new(kind, username, password);
        info!("registered {:?} user {}", kind, user.username());
        self.users.push(user);
        self.flush();
    }

    /// Start a session for the first user whose credentials match exactly.
    pub fn login_user(&mut self, username: &str, password: &str) -> MarketResult<&User> {
        match self
            .users
            .iter()
            .find(|user| user.matches_credentials(username, password))
        {
            Some(user) => {
                info!("user {} logged in", user.username());
                self.session = Some(user.clone());
                Ok(user)
            }
            None => {
                debug!("rejected login attempt for {username}");
                Err(MarketError::AuthenticationFailure)
            }
        }
    }

    /// Which menu the session user should see.
    pub fn determine_menu(&self) -> MarketResult<MenuKind> {
        self.session_user().map(User::kind)
    }

    /// Post a listing on behalf of the business session user.
    pub fn add_listing(
        &mut self,
        name: impl Into<String>,
        price: f64,
        expiry_days: u32,
        category: Category,
    ) -> MarketResult<ListingId> {
        let seller = self.session_user()?;
        if !seller.is_business() {
            return Err(MarketError::PreconditionViolation(format!(
                "{} is not a business account",
                seller.username()
            )));
        }
        let seller = seller.username().to_string();
        let item = FoodItem::new(name, price, category)?;

        let id = self.next_listing_id;
        self.next_listing_id = id.next().ok_or_else(|| {
            MarketError::InvalidInput(format!("listing id {id} is the last one available"))
        })?;
        let listing = Listing::new(id, item, seller, self.clock.now(), expiry_days);
        info!(
            "listing {} added: {} by {}",
            id,
            listing.name(),
            listing.seller()
        );
        self.listings.push(listing);
        self.flush();
        Ok(id)
    }

    /// Move the first listing named exactly `item_name` into the active cart.
    ///
    /// The listing leaves the catalog. An unmatched name is reported as
    /// [`MarketError::NotFound`] and leaves the cart untouched.
    pub fn add_item_to_cart(&mut self, item_name: &str) -> MarketResult<ListingId> {
        self.session_user()?;
        let Some(index) = self
            .listings
            .iter()
            .position(|listing| listing.name() == item_name)
        else {
            debug!("no listing named {item_name}");
            return Err(MarketError::NotFound(format!(
                "no listing named '{item_name}'"
            )));
        };

        let listing = self.listings.remove(index);
        let id = listing.id();
        self.cart.add_item(listing.into_item());
        info!("listing {id} ({item_name}) moved to cart");
        self.flush();
        Ok(id)
    }

    /// Turn the active cart into a ticket and return its id. The cart is emptied.
    pub fn place_order(&mut self) -> MarketResult<TicketId> {
        self.session_user()?;
        let id = self.fresh_ticket_id();
        let ticket = Ticket::new(id.clone(), self.cart.take(), self.clock.now());
        info!(
            "order placed: ticket {} with {} items",
            id,
            ticket.cart().len()
        );
        self.tickets.push(ticket);
        self.flush();
        Ok(id)
    }

    /// Cart recorded under `ticket_id`.
    pub fn get_cart_by_id(&self, ticket_id: &str) -> MarketResult<&Cart> {
        let not_found = || MarketError::NotFound(format!("no ticket with id '{ticket_id}'"));
        if !TicketId::is_well_formed(ticket_id) {
            return Err(not_found());
        }
        self.tickets
            .iter()
            .find(|ticket| *ticket.id() == *ticket_id)
            .map(Ticket::cart)
            .ok_or_else(not_found)
    }

    /// End the session. Safe to call when nobody is logged in.
    pub fn logout_user(&mut self) {
        if let Some(user) = self.session.take() {
            info!("user {} logged out", user.username());
        }
    }

    /// Forget every user, listing and ticket and delete the snapshot files.
    pub fn wipe_data(&mut self) {
        self.users.clear();
        self.listings.clear();
        self.tickets.clear();
        self.cart.clear();
        self.session = None;
        self.next_listing_id = ListingId::FIRST;
        match self.store.wipe() {
            Ok(()) => {
                info!("wiped marketplace data in {}", self.store.root().display());
                self.last_flush = None;
            }
            Err(err) => {
                warn!("Failed to delete snapshots, overwriting instead: {err:#}");
                self.flush();
            }
        }
    }

    /// Active catalog in posting order.
    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    /// Listings admitted by `filter`.
    pub fn listings_in(&self, filter: CategoryFilter) -> Vec<&Listing> {
        self.listings
            .iter()
            .filter(|listing| filter.admits(listing.category()))
            .collect()
    }

    /// Listings admitted by `filter` whose text matches `query`.
    pub fn search_listings(&self, query: &str, filter: CategoryFilter) -> Vec<&Listing> {
        self.listings
            .iter()
            .filter(|listing| filter.admits(listing.category()) && listing.matches(query))
            .collect()
    }

    /// Items in the active cart.
    pub fn cart_items(&self) -> &[FoodItem] {
        self.cart.items()
    }

    /// The active cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Session user, if any.
    pub fn current_user(&self) -> Option<&User> {
        self.session.as_ref()
    }

    /// Registered accounts in registration order.
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Placed tickets in order of placement.
    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    /// Outcome of the most recent flush.
    pub fn last_flush(&self) -> Option<&FlushReport> {
        self.last_flush.as_ref()
    }

    /// Id the next listing will receive.
    pub fn next_listing_id(&self) -> ListingId {
        self.next_listing_id
    }

    fn session_user(&self) -> MarketResult<&User> {
        self.session
            .as_ref()
            .ok_or_else(|| MarketError::PreconditionViolation("no user is logged in".to_string()))
    }

    fn ticket_exists(&self, id: &TicketId) -> bool {
        self.tickets.iter().any(|ticket| ticket.id() == id)
    }

    fn fresh_ticket_id(&mut self) -> TicketId {
        let mut candidate = TicketId::generate(&mut self.rng);
        let mut attempt = 1;
        while attempt < self.ticket_id_attempts && self.ticket_exists(&candidate) {
            candidate = TicketId::generate(&mut self.rng);
            attempt += 1;
        }
        if self.ticket_exists(&candidate) {
            warn!(
                "ticket id {candidate} collides after {} attempts; issuing anyway",
                self.ticket_id_attempts
            );
        }
        candidate
    }

    fn flush(&mut self) {
        let report = self.store.save_all(CollectionsRef {
            users: &self.users,
            listings: &self.listings,
            tickets: &self.tickets,
            next_listing_id: self.next_listing_id,
        });
        if !report.is_complete() {
            warn!(
                "flush incomplete: {} of {} collections failed",
                report.failed.len(),
                report.failed.len() + report.saved.len()
            );
        }
        self.last_flush = Some(report);
    }
}
