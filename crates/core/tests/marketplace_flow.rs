use std::fs;

use anyhow::Result;
use chrono::{Days, TimeZone, Utc};
use feedforward_core::{
    store::Collection, AccountKind, AppConfig, Category, CategoryFilter, FixedClock, ListingId,
    MarketError, Marketplace, SnapshotStore, TicketId,
};
use rand::{rngs::StdRng, SeedableRng};
use tempfile::tempdir;

fn open_at(root: &std::path::Path, seed: u64) -> Marketplace {
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 3, 10, 15, 30, 0).unwrap());
    Marketplace::with_parts(
        SnapshotStore::new(root),
        clock,
        StdRng::seed_from_u64(seed),
        8,
    )
}

#[test]
fn business_lists_customer_orders_counter_reads_ticket() -> Result<()> {
    let dir = tempdir()?;
    let mut market = open_at(dir.path(), 11);

    market.register_user(AccountKind::Business, "shopA", "pw1");
    market.login_user("shopA", "pw1")?;
    assert_eq!(market.determine_menu()?, AccountKind::Business);

    let id = market.add_listing("Bread", 2.50, 3, Category::Bakery)?;
    assert_eq!(id, ListingId(1));
    let listing = &market.listings()[0];
    let expected = listing
        .date_added()
        .date_naive()
        .checked_add_days(Days::new(3))
        .unwrap();
    assert_eq!(listing.expiration_date_in(&Utc), expected);
    market.logout_user();

    market.register_user(AccountKind::Customer, "cust1", "pw2");
    market.login_user("cust1", "pw2")?;
    assert_eq!(market.determine_menu()?, AccountKind::Customer);

    let bakery = market.listings_in("Bakery".parse::<CategoryFilter>()?);
    assert_eq!(bakery.len(), 1);

    market.add_item_to_cart("Bread")?;
    assert_eq!(market.cart_items().len(), 1);
    assert!(market.listings().is_empty());

    let ticket = market.place_order()?;
    assert_eq!(ticket.as_str().len(), 6);
    assert!(ticket.as_str().chars().all(|ch| ch.is_ascii_alphanumeric()));
    assert!(market.cart_items().is_empty());

    let cart = market.get_cart_by_id(ticket.as_str())?;
    assert_eq!(cart.len(), 1);
    assert_eq!(cart.items()[0].name(), "Bread");
    assert_eq!(cart.items()[0].price(), 2.50);
    assert_eq!(cart.items()[0].category(), Category::Bakery);
    assert!(market.last_flush().map(|r| r.is_complete()).unwrap_or(false));
    Ok(())
}

#[test]
fn restart_restores_users_listings_and_tickets() -> Result<()> {
    let dir = tempdir()?;
    let ticket = {
        let mut market = open_at(dir.path(), 12);
        market.register_user(AccountKind::Business, "shopA", "pw1");
        market.login_user("shopA", "pw1")?;
        market.add_listing("Yoghurt", 0.99, 4, Category::Dairy)?;
        market.add_listing("Carrots", 1.10, 6, Category::Produce)?;
        market.add_item_to_cart("Carrots")?;
        market.place_order()?
    };

    let mut market = open_at(dir.path(), 13);
    assert_eq!(market.users().len(), 1);
    assert_eq!(market.listings().len(), 1);
    assert_eq!(market.listings()[0].name(), "Yoghurt");
    assert_eq!(market.get_cart_by_id(ticket.as_str())?.items()[0].name(), "Carrots");

    assert!(market.current_user().is_none());
    market.login_user("shopA", "pw1")?;
    assert_eq!(
        market.add_listing("Eggs", 2.0, 7, Category::Other)?,
        ListingId(3)
    );
    Ok(())
}

#[test]
fn a_corrupt_snapshot_only_loses_its_own_collection() -> Result<()> {
    let dir = tempdir()?;
    let ticket = {
        let mut market = open_at(dir.path(), 14);
        market.register_user(AccountKind::Customer, "cust1", "pw2");
        market.register_user(AccountKind::Business, "shopA", "pw1");
        market.login_user("shopA", "pw1")?;
        market.add_listing("Soup", 1.5, 30, Category::CannedFood)?;
        market.place_order()?
    };

    let store = SnapshotStore::new(dir.path());
    fs::write(store.path_for(Collection::Users), "{ truncated")?;

    let mut market = open_at(dir.path(), 15);
    assert!(market.users().is_empty());
    assert_eq!(market.listings().len(), 1);
    assert!(market.get_cart_by_id(ticket.as_str()).is_ok());
    assert_eq!(
        market.login_user("shopA", "pw1").unwrap_err(),
        MarketError::AuthenticationFailure
    );
    Ok(())
}

#[test]
fn open_uses_configured_locations() -> Result<()> {
    let dir = tempdir()?;
    let mut config = AppConfig::with_data_dir(dir.path());
    config.users_file = "people.json".to_string();

    let mut market = Marketplace::open(&config);
    market.register_user(AccountKind::Customer, "cust1", "pw2");
    assert!(dir.path().join("people.json").exists());
    assert!(dir.path().join(&config.tickets_file).exists());

    let reopened = Marketplace::open(&config);
    assert_eq!(reopened.users().len(), 1);
    assert!(!TicketId::is_well_formed("nope"));
    Ok(())
}
