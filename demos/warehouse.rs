//! End-to-end walkthrough: seed users, stock the shelves, then run one
//! request through submit -> approve -> dispatch.
//!
//! Run with `cargo run --example warehouse`. Set STOCK_DB to keep the
//! database somewhere other than ./stock-approval-demo.

use stock_approval::{
    ledger::InventoryLedger,
    lifecycle::RequestLifecycle,
    request::{NewRequest, RequestStatus},
    store::StockStore,
    user::{City, Role, User},
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let path = std::env::var("STOCK_DB").unwrap_or_else(|_| "stock-approval-demo".into());
    let db = sled::open(path)?;
    let store = StockStore::open(&db)?;

    // start from a clean slate on every run
    store.clear_products()?;
    store.clear_requests()?;

    let mut ledger = InventoryLedger::open(store.clone())?;
    let mut lifecycle = RequestLifecycle::open(store.clone())?;

    // the identity layer would normally seed these
    let warehouse = User::new("wh-ops", "Warehouse Ops", Role::Warehouse, None)?;
    let shop = User::new("syd-shop", "Sydney Shop", Role::Shop, Some(City::Sydney))?;
    store.put_user(&warehouse)?;
    store.put_user(&shop)?;

    store.set_setting("company_name", Some("Acme Stockrooms"))?;
    println!("company: {:?}", store.get_setting("company_name")?);

    // initial stock plus a restock against the same SKU, different casing
    println!("{}", ledger.upsert_by_sku("ABC-001", "Widget", 10).message);
    println!("{}", ledger.upsert_by_sku("abc-001", "Widget", 5).message);

    let product_id = ledger
        .find_by_sku("ABC-001")
        .expect("product was just created")
        .id
        .clone();

    let submission = NewRequest {
        product_id,
        shop_name: shop.shop_name().unwrap_or_default(),
        shop_location: shop.city.map(|c| c.to_string()).unwrap_or_default(),
        requested_quantity: 3,
        notes: Some("Front window restock".into()),
    };
    println!("{}", lifecycle.submit(submission, &shop.id, &ledger).message);

    let request_id = lifecycle.requests()[0].id.clone();
    println!(
        "{}",
        lifecycle
            .set_status(&request_id, RequestStatus::Approved)
            .message
    );
    println!("{}", lifecycle.dispatch(&request_id, &mut ledger).message);

    println!("total units on hand: {}", ledger.total_units());
    let counts = lifecycle.status_counts();
    println!(
        "requests: {} pending / {} approved / {} dispatched / {} cancelled",
        counts.pending, counts.approved, counts.dispatched, counts.cancelled
    );

    Ok(())
}
