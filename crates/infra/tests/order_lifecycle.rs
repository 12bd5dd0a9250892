//! End-to-end lifecycle scenarios over the in-memory backend.

use pantry_core::{DomainError, OrderId, StockItemId};
use pantry_infra::{InMemoryStateStore, OrderService, ServiceError, StateStore};
use pantry_orders::{Cart, OrderStatus};

fn service() -> OrderService<InMemoryStateStore> {
    pantry_observability::init();
    OrderService::new(InMemoryStateStore::new())
}

fn seeded_id(service: &OrderService<InMemoryStateStore>, name: &str) -> StockItemId {
    service
        .inventory()
        .unwrap()
        .iter()
        .find(|i| i.name() == name)
        .map(|i| i.id_typed())
        .unwrap_or_else(|| panic!("seed item {name} missing"))
}

fn stock_of(service: &OrderService<InMemoryStateStore>, item_id: StockItemId) -> i64 {
    service
        .inventory()
        .unwrap()
        .iter()
        .find(|i| i.id_typed() == item_id)
        .map(|i| i.stock())
        .unwrap_or(0)
}

/// Build a cart holding `qty` units of `item_id` against current inventory.
fn cart_with(
    service: &OrderService<InMemoryStateStore>,
    item_id: StockItemId,
    qty: usize,
) -> Cart {
    let inventory = service.inventory().unwrap();
    let mut cart = Cart::new();
    for _ in 0..qty {
        cart.add(item_id, &inventory).unwrap();
    }
    cart
}

#[test]
fn cart_to_approval_happy_path() {
    let service = service();
    let item_id = service.create_item("Mint tea", 2).unwrap();
    let inventory = service.inventory().unwrap();

    let mut cart = Cart::new();
    cart.add(item_id, &inventory).unwrap();
    cart.add(item_id, &inventory).unwrap();

    // The cart now holds the whole reservation.
    match cart.add(item_id, &inventory).unwrap_err() {
        DomainError::InsufficientStock { item } => assert_eq!(item, "Mint tea"),
        other => panic!("Expected InsufficientStock, got {other:?}"),
    }
    assert_eq!(cart.len(), 2);

    let order_id = service.submit("Dina", None, &mut cart).unwrap();
    assert!(cart.is_empty());

    let orders = service.orders().unwrap();
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order.id_typed(), order_id);
    assert_eq!(order.status(), OrderStatus::Pending);
    assert_eq!(order.items().len(), 2);
    assert!(order.items().iter().all(|l| l.item_id == item_id));

    service.approve(order_id, "Omar").unwrap();

    assert_eq!(stock_of(&service, item_id), 0);
    let orders = service.orders().unwrap();
    let order = &orders[0];
    assert_eq!(order.status(), OrderStatus::Approved);
    assert_eq!(order.processed_by(), Some("Omar"));
    assert!(order.processed_at().is_some());
}

#[test]
fn submitting_an_empty_cart_changes_nothing() {
    let service = service();
    let before = service.orders().unwrap();

    let mut cart = Cart::new();
    match service.submit("Dina", None, &mut cart).unwrap_err() {
        ServiceError::Domain(DomainError::EmptyCart) => {}
        other => panic!("Expected EmptyCart, got {other:?}"),
    }

    assert_eq!(service.orders().unwrap(), before);
}

#[test]
fn submission_revalidates_against_fresh_inventory() {
    let service = service();
    let item_id = service.create_item("Mint tea", 2).unwrap();
    let mut cart = cart_with(&service, item_id, 2);

    // Stock moves while the employee is still browsing.
    service.decrease_stock(item_id, 1).unwrap();

    match service.submit("Dina", None, &mut cart).unwrap_err() {
        ServiceError::Domain(DomainError::InsufficientStock { item }) => {
            assert_eq!(item, "Mint tea");
        }
        other => panic!("Expected InsufficientStock, got {other:?}"),
    }

    // Aborted whole: no order, cart untouched.
    assert!(service.orders().unwrap().is_empty());
    assert_eq!(cart.len(), 2);
}

#[test]
fn approval_shortfall_leaves_both_stores_unchanged() {
    let service = service();
    let item_id = service.create_item("Mint tea", 3).unwrap();
    let mut cart = cart_with(&service, item_id, 3);
    let order_id = service.submit("Dina", None, &mut cart).unwrap();

    // Stock drops below the order's aggregated request before approval.
    service.decrease_stock(item_id, 1).unwrap();
    let inventory_before = service.inventory().unwrap();
    let orders_before = service.orders().unwrap();

    match service.approve(order_id, "Omar").unwrap_err() {
        ServiceError::Domain(DomainError::InsufficientStock { item }) => {
            assert_eq!(item, "Mint tea");
        }
        other => panic!("Expected InsufficientStock, got {other:?}"),
    }

    assert_eq!(service.inventory().unwrap(), inventory_before);
    assert_eq!(service.orders().unwrap(), orders_before);
    assert_eq!(service.orders().unwrap()[0].status(), OrderStatus::Pending);
}

#[test]
fn approval_is_all_or_nothing_across_line_items() {
    let service = service();
    let tea = seeded_id(&service, "Tea");
    let juice = seeded_id(&service, "Orange juice");
    let tea_stock = stock_of(&service, tea);

    let inventory = service.inventory().unwrap();
    let mut cart = Cart::new();
    cart.add(tea, &inventory).unwrap();
    cart.add(tea, &inventory).unwrap();
    cart.add(juice, &inventory).unwrap();
    let order_id = service.submit("Dina", None, &mut cart).unwrap();

    // Drain the juice entirely; tea stays plentiful.
    let juice_stock = stock_of(&service, juice);
    service.decrease_stock(juice, juice_stock).unwrap();

    assert!(service.approve(order_id, "Omar").is_err());

    // The satisfiable tea lines were not deducted either.
    assert_eq!(stock_of(&service, tea), tea_stock);
    assert_eq!(service.orders().unwrap()[0].status(), OrderStatus::Pending);
}

#[test]
fn approval_deducts_exactly_the_aggregated_quantities() {
    let service = service();
    let tea = seeded_id(&service, "Tea");
    let coffee = seeded_id(&service, "Turkish coffee");
    let nescafe = seeded_id(&service, "Nescafe");

    let inventory = service.inventory().unwrap();
    let mut cart = Cart::new();
    cart.add(tea, &inventory).unwrap();
    cart.add(coffee, &inventory).unwrap();
    cart.add(tea, &inventory).unwrap();
    cart.add(tea, &inventory).unwrap();
    let order_id = service.submit("Dina", Some("afternoon round".to_string()), &mut cart).unwrap();

    service.approve(order_id, "Omar").unwrap();

    assert_eq!(stock_of(&service, tea), 50 - 3);
    assert_eq!(stock_of(&service, coffee), 30 - 1);
    assert_eq!(stock_of(&service, nescafe), 40);
}

#[test]
fn processing_an_unknown_order_is_a_silent_no_op() {
    let service = service();
    let inventory_before = service.inventory().unwrap();

    service.approve(OrderId::new(), "Omar").unwrap();
    service.reject(OrderId::new(), "Omar").unwrap();
    service.rate_order(OrderId::new(), 5).unwrap();

    assert_eq!(service.inventory().unwrap(), inventory_before);
    assert!(service.orders().unwrap().is_empty());
}

#[test]
fn terminal_orders_cannot_be_reprocessed() {
    let service = service();
    let tea = seeded_id(&service, "Tea");
    let mut cart = cart_with(&service, tea, 1);
    let order_id = service.submit("Dina", None, &mut cart).unwrap();

    service.approve(order_id, "Omar").unwrap();
    assert_eq!(stock_of(&service, tea), 49);

    // A second approval must not deduct again.
    match service.approve(order_id, "Omar").unwrap_err() {
        ServiceError::Domain(DomainError::Conflict(_)) => {}
        other => panic!("Expected Conflict, got {other:?}"),
    }
    assert!(service.reject(order_id, "Omar").is_err());
    assert_eq!(stock_of(&service, tea), 49);
}

#[test]
fn rejection_stamps_the_order_and_never_touches_inventory() {
    let service = service();
    let tea = seeded_id(&service, "Tea");
    let mut cart = cart_with(&service, tea, 2);
    let order_id = service.submit("Dina", None, &mut cart).unwrap();
    let inventory_before = service.inventory().unwrap();

    service.reject(order_id, "Omar").unwrap();

    assert_eq!(service.inventory().unwrap(), inventory_before);
    let orders = service.orders().unwrap();
    let order = &orders[0];
    assert_eq!(order.status(), OrderStatus::Rejected);
    assert_eq!(order.processed_by(), Some("Omar"));
    assert!(order.processed_at().is_some());
}

#[test]
fn stock_adjustment_rules() {
    let service = service();
    let tea = seeded_id(&service, "Tea");

    match service.decrease_stock(tea, -1).unwrap_err() {
        ServiceError::Domain(DomainError::InvalidQuantity(-1)) => {}
        other => panic!("Expected InvalidQuantity, got {other:?}"),
    }
    match service.decrease_stock(tea, 51).unwrap_err() {
        ServiceError::Domain(DomainError::InsufficientStock { item }) => assert_eq!(item, "Tea"),
        other => panic!("Expected InsufficientStock, got {other:?}"),
    }
    service.decrease_stock(tea, 1).unwrap();
    assert_eq!(stock_of(&service, tea), 49);

    assert!(service.add_stock(tea, 0).is_err());
    service.add_stock(tea, 11).unwrap();
    assert_eq!(stock_of(&service, tea), 60);

    // Unknown ids are ignored on both adjustments.
    let before = service.inventory().unwrap();
    service.add_stock(StockItemId::new(), 5).unwrap();
    service.decrease_stock(StockItemId::new(), 5).unwrap();
    assert_eq!(service.inventory().unwrap(), before);
}

#[test]
fn order_snapshot_survives_catalog_rename_and_delete() {
    let service = service();
    let tea = seeded_id(&service, "Tea");
    let mut cart = cart_with(&service, tea, 2);
    service.submit("Dina", None, &mut cart).unwrap();

    // Rename behind the engine's back, straight through the store.
    let mut inventory = service.store().read_inventory().unwrap();
    inventory
        .iter_mut()
        .find(|i| i.id_typed() == tea)
        .unwrap()
        .rename("Green tea")
        .unwrap();
    service.store().write_inventory(inventory).unwrap();

    let orders = service.orders().unwrap();
    let order = &orders[0];
    assert!(order.items().iter().all(|l| l.name == "Tea"));

    // Deleting the item does not disturb the snapshot either, and a later
    // approval reports the shortfall by the snapshot name.
    service.remove_item(tea).unwrap();
    let order_id = order.id_typed();
    match service.approve(order_id, "Omar").unwrap_err() {
        ServiceError::Domain(DomainError::InsufficientStock { item }) => assert_eq!(item, "Tea"),
        other => panic!("Expected InsufficientStock, got {other:?}"),
    }
    assert_eq!(service.orders().unwrap()[0].status(), OrderStatus::Pending);
}

#[test]
fn only_approved_orders_accept_ratings() {
    let service = service();
    let tea = seeded_id(&service, "Tea");
    let mut cart = cart_with(&service, tea, 1);
    let order_id = service.submit("Dina", None, &mut cart).unwrap();

    assert!(matches!(
        service.rate_order(order_id, 5).unwrap_err(),
        ServiceError::Domain(DomainError::InvariantViolation(_))
    ));

    service.approve(order_id, "Omar").unwrap();
    assert!(matches!(
        service.rate_order(order_id, 6).unwrap_err(),
        ServiceError::Domain(DomainError::Validation(_))
    ));

    service.rate_order(order_id, 4).unwrap();
    assert_eq!(service.orders().unwrap()[0].rating(), Some(4));
}

#[test]
fn read_surface_filters_and_orders_correctly() {
    let service = service();
    let tea = seeded_id(&service, "Tea");

    // Spaced out so submission timestamps are strictly increasing.
    let mut cart = cart_with(&service, tea, 1);
    let first = service.submit("Dina", None, &mut cart).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let mut cart = cart_with(&service, tea, 1);
    let second = service.submit("Samir", None, &mut cart).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let mut cart = cart_with(&service, tea, 1);
    let third = service.submit("Dina", None, &mut cart).unwrap();

    service.approve(second, "Omar").unwrap();

    let pending: Vec<OrderId> = service
        .pending_orders()
        .unwrap()
        .iter()
        .map(|o| o.id_typed())
        .collect();
    assert_eq!(pending, vec![third, first]);

    let processed = service.processed_orders().unwrap();
    assert_eq!(processed.len(), 1);
    assert_eq!(processed[0].id_typed(), second);

    let dina: Vec<OrderId> = service
        .orders_for("Dina")
        .unwrap()
        .iter()
        .map(|o| o.id_typed())
        .collect();
    assert_eq!(dina, vec![third, first]);
}

#[test]
fn concurrent_approvals_of_overlapping_items_are_linearizable() {
    let service = service();
    let item_id = service.create_item("Mint tea", 5).unwrap();

    // Ten pending orders of one unit each against a stock of five.
    let order_ids: Vec<OrderId> = (0..10)
        .map(|n| {
            let mut cart = cart_with(&service, item_id, 1);
            service.submit(&format!("employee-{n}"), None, &mut cart).unwrap()
        })
        .collect();

    let approved = std::sync::atomic::AtomicUsize::new(0);
    std::thread::scope(|s| {
        let service = &service;
        let approved = &approved;
        for &order_id in &order_ids {
            s.spawn(move || {
                if service.approve(order_id, "Omar").is_ok() {
                    approved.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                }
            });
        }
    });

    // Exactly the available stock was granted; no interleaving overdrew it.
    assert_eq!(approved.load(std::sync::atomic::Ordering::SeqCst), 5);
    assert_eq!(stock_of(&service, item_id), 0);

    let orders = service.orders().unwrap();
    let approved_count = orders
        .iter()
        .filter(|o| o.status() == OrderStatus::Approved)
        .count();
    let pending_count = orders.iter().filter(|o| o.is_pending()).count();
    assert_eq!(approved_count, 5);
    assert_eq!(pending_count, 5);
}

#[test]
fn concurrent_stock_adjustments_never_lose_updates() {
    let service = service();
    let item_id = service.create_item("Mint tea", 50).unwrap();

    let successful_decrements = std::sync::atomic::AtomicI64::new(0);
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..25 {
                    service.add_stock(item_id, 1).unwrap();
                }
            });
            s.spawn(|| {
                for _ in 0..25 {
                    if service.decrease_stock(item_id, 1).is_ok() {
                        successful_decrements.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    }
                }
            });
        }
    });

    let final_stock = stock_of(&service, item_id);
    let decremented = successful_decrements.load(std::sync::atomic::Ordering::SeqCst);
    assert_eq!(final_stock, 50 + 100 - decremented);
    assert!(final_stock >= 0);
}
