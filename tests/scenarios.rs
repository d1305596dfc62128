//! End-to-end scenarios for the stock request workflow: restocking, the
//! request lifecycle, and the dispatch-time reconciliation between the two.

use anyhow::Context;
use stock_approval::{
    ledger::InventoryLedger,
    lifecycle::RequestLifecycle,
    request::{NewRequest, RequestStatus},
    store::StockStore,
};
use tempfile::TempDir;

// Sled uses file-based locking to prevent concurrent access, so only one test
// can hold a lock at a time. As is good practice in testing, create a separate
// database for each test. The db lives under a tempdir for simplified cleanup.
fn open_stack(name: &str) -> anyhow::Result<(TempDir, StockStore, InventoryLedger, RequestLifecycle)>
{
    let temp_dir = tempfile::tempdir()?;
    let db = sled::open(temp_dir.path().join(name))?;
    let store = StockStore::open(&db)?;
    let ledger = InventoryLedger::open(store.clone())?;
    let lifecycle = RequestLifecycle::open(store.clone())?;
    Ok((temp_dir, store, ledger, lifecycle))
}

fn submission(product_id: &str, quantity: u32) -> NewRequest {
    NewRequest {
        product_id: product_id.to_owned(),
        shop_name: "SYDNEY Store".into(),
        shop_location: "SYDNEY".into(),
        requested_quantity: quantity,
        notes: None,
    }
}

#[test]
fn restock_accumulates_per_sku() -> anyhow::Result<()> {
    let (_dir, _store, mut ledger, _lifecycle) = open_stack("restock.db")?;

    // listing a product ahead of its first delivery starts it at zero
    let outcome = ledger.upsert_by_sku("ABC-001", "Widget", 0);
    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(outcome.message, "Added new product: ABC-001");
    assert_eq!(ledger.products()[0].quantity, 0);

    let outcome = ledger.upsert_by_sku("ABC-001", "Widget", 10);
    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(outcome.message, "Updated ABC-001: added 10 units (total: 10)");

    // same SKU in different casing folds into the same product
    let outcome = ledger.upsert_by_sku("abc-001", "Widget", 5);
    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(outcome.message, "Updated ABC-001: added 5 units (total: 15)");

    assert_eq!(ledger.products().len(), 1);
    assert_eq!(ledger.products()[0].quantity, 15);
    assert_eq!(ledger.total_units(), 15);

    Ok(())
}

#[test]
fn insufficient_stock_is_never_partial() -> anyhow::Result<()> {
    let (_dir, _store, mut ledger, _lifecycle) = open_stack("insufficient.db")?;

    ledger.upsert_by_sku("ABC-001", "Widget", 5);
    let id = ledger
        .find_by_sku("ABC-001")
        .context("product missing after upsert")?
        .id
        .clone();

    let outcome = ledger.decrease(&id, 10);
    assert!(!outcome.success);
    assert!(
        outcome.message.contains("Insufficient stock"),
        "unexpected message: {}",
        outcome.message
    );

    // the failed decrease must not have moved anything
    assert_eq!(ledger.find(&id).context("product vanished")?.quantity, 5);

    Ok(())
}

#[test]
fn approve_then_dispatch_settles_stock() -> anyhow::Result<()> {
    let (_dir, _store, mut ledger, mut lifecycle) = open_stack("dispatch.db")?;

    ledger.upsert_by_sku("ABC-001", "Widget", 5);
    let product_id = ledger.find_by_sku("ABC-001").context("missing")?.id.clone();

    let outcome = lifecycle.submit(submission(&product_id, 3), "user-1", &ledger);
    assert!(outcome.success, "{}", outcome.message);

    let request_id = lifecycle.requests()[0].id.clone();
    assert_eq!(lifecycle.requests()[0].status, RequestStatus::Pending);

    let outcome = lifecycle.set_status(&request_id, RequestStatus::Approved);
    assert!(outcome.success, "{}", outcome.message);

    let outcome = lifecycle.dispatch(&request_id, &mut ledger);
    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(outcome.message, "Successfully dispatched 3 units of ABC-001");

    assert_eq!(
        ledger.find(&product_id).context("missing")?.quantity,
        2,
        "dispatch must deduct exactly the requested quantity"
    );
    assert_eq!(
        lifecycle.find(&request_id).context("missing")?.status,
        RequestStatus::Dispatched
    );

    Ok(())
}

#[test]
fn dispatch_fails_when_stock_was_depleted() -> anyhow::Result<()> {
    let (_dir, _store, mut ledger, mut lifecycle) = open_stack("depleted.db")?;

    ledger.upsert_by_sku("ABC-001", "Widget", 3);
    let product_id = ledger.find_by_sku("ABC-001").context("missing")?.id.clone();

    lifecycle.submit(submission(&product_id, 3), "user-1", &ledger);
    let request_id = lifecycle.requests()[0].id.clone();
    lifecycle.set_status(&request_id, RequestStatus::Approved);

    // another action empties the stock between approval and dispatch
    let outcome = ledger.decrease(&product_id, 3);
    assert!(outcome.success, "{}", outcome.message);

    let outcome = lifecycle.dispatch(&request_id, &mut ledger);
    assert!(!outcome.success);
    assert!(outcome.message.contains("Insufficient stock"));

    // the request must remain approved, untouched by the failed dispatch
    assert_eq!(
        lifecycle.find(&request_id).context("missing")?.status,
        RequestStatus::Approved
    );
    assert_eq!(ledger.find(&product_id).context("missing")?.quantity, 0);

    Ok(())
}

#[test]
fn cancelled_requests_are_terminal() -> anyhow::Result<()> {
    let (_dir, _store, mut ledger, mut lifecycle) = open_stack("cancelled.db")?;

    ledger.upsert_by_sku("ABC-001", "Widget", 5);
    let product_id = ledger.find_by_sku("ABC-001").context("missing")?.id.clone();

    lifecycle.submit(submission(&product_id, 2), "user-1", &ledger);
    let request_id = lifecycle.requests()[0].id.clone();

    let outcome = lifecycle.set_status(&request_id, RequestStatus::Cancelled);
    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(outcome.message, "Request cancelled successfully");

    let outcome = lifecycle.set_status(&request_id, RequestStatus::Approved);
    assert!(!outcome.success);
    assert!(outcome.message.contains("cannot move from cancelled"));

    let outcome = lifecycle.dispatch(&request_id, &mut ledger);
    assert!(!outcome.success);
    assert_eq!(ledger.find(&product_id).context("missing")?.quantity, 5);

    Ok(())
}

#[test]
fn set_status_cannot_shortcut_dispatch() -> anyhow::Result<()> {
    let (_dir, _store, mut ledger, mut lifecycle) = open_stack("shortcut.db")?;

    ledger.upsert_by_sku("ABC-001", "Widget", 5);
    let product_id = ledger.find_by_sku("ABC-001").context("missing")?.id.clone();

    lifecycle.submit(submission(&product_id, 2), "user-1", &ledger);
    let request_id = lifecycle.requests()[0].id.clone();
    lifecycle.set_status(&request_id, RequestStatus::Approved);

    // marking dispatched without settling stock is not allowed
    let outcome = lifecycle.set_status(&request_id, RequestStatus::Dispatched);
    assert!(!outcome.success);

    assert_eq!(
        lifecycle.find(&request_id).context("missing")?.status,
        RequestStatus::Approved
    );
    assert_eq!(ledger.find(&product_id).context("missing")?.quantity, 5);

    Ok(())
}

#[test]
fn removing_dispatched_request_keeps_deduction() -> anyhow::Result<()> {
    let (_dir, _store, mut ledger, mut lifecycle) = open_stack("remove.db")?;

    ledger.upsert_by_sku("ABC-001", "Widget", 5);
    let product_id = ledger.find_by_sku("ABC-001").context("missing")?.id.clone();

    lifecycle.submit(submission(&product_id, 3), "user-1", &ledger);
    let request_id = lifecycle.requests()[0].id.clone();
    lifecycle.set_status(&request_id, RequestStatus::Approved);
    lifecycle.dispatch(&request_id, &mut ledger);

    let outcome = lifecycle.remove(&request_id);
    assert!(outcome.success, "{}", outcome.message);
    assert!(lifecycle.find(&request_id).is_none());

    // no compensating re-increment on deletion
    assert_eq!(ledger.find(&product_id).context("missing")?.quantity, 2);

    Ok(())
}

#[test]
fn submit_rejects_unknown_product_and_zero_quantity() -> anyhow::Result<()> {
    let (_dir, _store, mut ledger, mut lifecycle) = open_stack("submit.db")?;

    let outcome = lifecycle.submit(submission("prod_does_not_exist", 1), "user-1", &ledger);
    assert!(!outcome.success);
    assert!(outcome.message.contains("not found"));

    ledger.upsert_by_sku("ABC-001", "Widget", 5);
    let product_id = ledger.find_by_sku("ABC-001").context("missing")?.id.clone();

    let outcome = lifecycle.submit(submission(&product_id, 0), "user-1", &ledger);
    assert!(!outcome.success);
    assert!(outcome.message.contains("at least 1"));
    assert!(lifecycle.requests().is_empty());

    Ok(())
}

#[test]
fn over_requesting_is_a_soft_limit_until_dispatch() -> anyhow::Result<()> {
    let (_dir, _store, mut ledger, mut lifecycle) = open_stack("soft_limit.db")?;

    ledger.upsert_by_sku("ABC-001", "Widget", 2);
    let product_id = ledger.find_by_sku("ABC-001").context("missing")?.id.clone();

    // more than available, still accepted at submission time
    let outcome = lifecycle.submit(submission(&product_id, 10), "user-1", &ledger);
    assert!(outcome.success, "{}", outcome.message);

    let request_id = lifecycle.requests()[0].id.clone();
    lifecycle.set_status(&request_id, RequestStatus::Approved);

    // the hard check happens here
    let outcome = lifecycle.dispatch(&request_id, &mut ledger);
    assert!(!outcome.success);
    assert!(outcome.message.contains("Available: 2, Requested: 10"));

    Ok(())
}
