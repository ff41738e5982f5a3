//! Integration tests for the cart application service.
//!
//! These tests wire the service to the in-memory store, a provisioned
//! catalog and the reference promotion rules, and exercise the use cases
//! end to end.

use std::sync::Arc;

use cart_store::{CartStore, InMemoryCartStore, StoreError};
use common::{ArticleCode, CartId};
use domain::promotion::rules::register_reference_rules;
use domain::{
    Article, CartItemDiscount, CartService, Catalog, Discount, InMemoryCatalog, Money, PriceList,
    PromotionEngine, PromotionError, Promotion, SequentialIdGenerator, ServiceError,
};

fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::with_articles([
        Article::new("VOUCHER", "Acme Voucher", Money::from_cents(500)),
        Article::new("TSHIRT", "Acme T-Shirt", Money::from_cents(2000)),
        Article::new("MUG", "Acme Coffee Mug", Money::from_cents(750)),
    ])
}

struct Harness {
    service: CartService,
    store: Arc<InMemoryCartStore>,
    engine: Arc<PromotionEngine>,
}

fn harness() -> Harness {
    let store = Arc::new(InMemoryCartStore::new());
    let engine = Arc::new(PromotionEngine::new());
    register_reference_rules(&engine);

    let service = CartService::new(
        Arc::new(SequentialIdGenerator::new()),
        store.clone(),
        Arc::new(catalog()),
        engine.clone(),
    );
    Harness {
        service,
        store,
        engine,
    }
}

fn cart_with(service: &CartService, items: &[(&str, i64)]) -> CartId {
    let cart_id = service.create_cart().unwrap();
    for (code, quantity) in items {
        service.add_article_to_cart(cart_id, code, *quantity).unwrap();
    }
    cart_id
}

mod readiness {
    use super::*;

    #[test]
    fn unbound_service_is_not_initialized() {
        let service = CartService::builder().build();
        assert!(!service.is_ready());
        assert_eq!(service.create_cart(), Err(ServiceError::NotInitialized));
        assert_eq!(
            service.get_cart(CartId::new(1)),
            Err(ServiceError::NotInitialized)
        );
        assert_eq!(
            service.delete_cart(CartId::new(1)),
            Err(ServiceError::NotInitialized)
        );
        assert_eq!(service.articles(), Err(ServiceError::NotInitialized));
    }

    #[test]
    fn every_collaborator_is_required() {
        let partial = [
            CartService::builder()
                .store(Arc::new(InMemoryCartStore::new()))
                .catalog(Arc::new(catalog()))
                .promotions(Arc::new(PromotionEngine::new()))
                .build(),
            CartService::builder()
                .id_generator(Arc::new(SequentialIdGenerator::new()))
                .catalog(Arc::new(catalog()))
                .promotions(Arc::new(PromotionEngine::new()))
                .build(),
            CartService::builder()
                .id_generator(Arc::new(SequentialIdGenerator::new()))
                .store(Arc::new(InMemoryCartStore::new()))
                .promotions(Arc::new(PromotionEngine::new()))
                .build(),
            CartService::builder()
                .id_generator(Arc::new(SequentialIdGenerator::new()))
                .store(Arc::new(InMemoryCartStore::new()))
                .catalog(Arc::new(catalog()))
                .build(),
        ];

        for service in partial {
            assert!(!service.is_ready());
            assert_eq!(
                service.add_article_to_cart(CartId::new(1), "MUG", 1),
                Err(ServiceError::NotInitialized)
            );
        }
    }

    #[test]
    fn non_positive_generated_id_fails_creation() {
        let service = CartService::builder()
            .id_generator(Arc::new(|| CartId::new(0)))
            .store(Arc::new(InMemoryCartStore::new()))
            .catalog(Arc::new(catalog()))
            .promotions(Arc::new(PromotionEngine::new()))
            .build();

        assert_eq!(
            service.create_cart(),
            Err(ServiceError::CartCreation(CartId::new(0)))
        );
    }

    #[test]
    fn reused_id_fails_creation_with_conflict() {
        let service = CartService::builder()
            .id_generator(Arc::new(|| CartId::new(7)))
            .store(Arc::new(InMemoryCartStore::new()))
            .catalog(Arc::new(catalog()))
            .promotions(Arc::new(PromotionEngine::new()))
            .build();

        assert_eq!(service.create_cart(), Ok(CartId::new(7)));
        assert!(matches!(
            service.create_cart(),
            Err(ServiceError::Conflict(StoreError::ConcurrencyConflict { .. }))
        ));
    }
}

mod cart_lifecycle {
    use super::*;

    #[test]
    fn new_cart_is_empty() {
        let h = harness();
        let cart_id = h.service.create_cart().unwrap();

        let priced = h.service.get_cart(cart_id).unwrap();
        assert_eq!(priced.cart_id(), cart_id);
        assert_eq!(priced.quantity(), 0);
        assert_eq!(priced.subtotal(), Money::zero());
        assert!(priced.items().is_empty());
    }

    #[test]
    fn created_ids_are_distinct() {
        let h = harness();
        let first = h.service.create_cart().unwrap();
        let second = h.service.create_cart().unwrap();
        assert_ne!(first, second);
        assert_eq!(h.store.len(), 2);
    }

    #[test]
    fn single_article_is_priced_from_catalog() {
        let store = Arc::new(InMemoryCartStore::new());
        let service = CartService::new(
            Arc::new(SequentialIdGenerator::new()),
            store,
            Arc::new(InMemoryCatalog::with_articles([Article::new(
                "A",
                "Article A",
                Money::from_cents(2000),
            )])),
            Arc::new(PromotionEngine::new()),
        );
        let cart_id = cart_with(&service, &[("A", 1)]);

        let priced = service.get_cart(cart_id).unwrap();
        let item = priced.item("A").unwrap();
        assert_eq!(priced.subtotal(), Money::from_cents(2000));
        assert_eq!(item.unit_price, Money::from_cents(2000));
        assert_eq!(item.total_price, Money::from_cents(2000));
    }

    #[test]
    fn delete_is_idempotent() {
        let h = harness();
        let cart_id = cart_with(&h.service, &[("MUG", 1)]);

        assert_eq!(h.service.delete_cart(cart_id), Ok(true));
        assert_eq!(
            h.service.get_cart(cart_id),
            Err(ServiceError::CartNotFound(cart_id))
        );
        assert_eq!(h.service.delete_cart(cart_id), Ok(false));
    }

    #[test]
    fn operations_on_missing_cart_fail_not_found() {
        let h = harness();
        let missing = CartId::new(404);

        assert_eq!(
            h.service.add_article_to_cart(missing, "MUG", 1),
            Err(ServiceError::CartNotFound(missing))
        );
        assert_eq!(
            h.service.set_article_quantity(missing, "MUG", 1),
            Err(ServiceError::CartNotFound(missing))
        );
        assert_eq!(
            h.service.get_cart(missing),
            Err(ServiceError::CartNotFound(missing))
        );
    }

    #[test]
    fn articles_are_listed_sorted() {
        let codes: Vec<String> = harness()
            .service
            .articles()
            .unwrap()
            .into_iter()
            .map(|a| a.code.to_string())
            .collect();
        assert_eq!(codes, ["MUG", "TSHIRT", "VOUCHER"]);
    }
}

mod invariants {
    use super::*;

    #[test]
    fn non_positive_quantity_leaves_cart_unchanged() {
        let h = harness();
        let cart_id = cart_with(&h.service, &[("MUG", 1)]);
        let before = h.store.get(cart_id).unwrap();

        for quantity in [0, -3] {
            assert_eq!(
                h.service.add_article_to_cart(cart_id, "TSHIRT", quantity),
                Err(ServiceError::NonPositiveQuantity(quantity))
            );
            assert_eq!(
                h.service.set_article_quantity(cart_id, "MUG", quantity),
                Err(ServiceError::NonPositiveQuantity(quantity))
            );
        }

        assert_eq!(h.store.get(cart_id).unwrap(), before);
    }

    #[test]
    fn duplicate_article_keeps_first_addition() {
        let h = harness();
        let cart_id = cart_with(&h.service, &[("MUG", 2)]);

        assert_eq!(
            h.service.add_article_to_cart(cart_id, "MUG", 5),
            Err(ServiceError::ArticleAlreadyAdded(ArticleCode::new("MUG")))
        );

        let priced = h.service.get_cart(cart_id).unwrap();
        assert_eq!(priced.quantity(), 2);
        assert_eq!(priced.item("MUG").unwrap().quantity, 2);
    }

    #[test]
    fn unknown_article_is_rejected() {
        let h = harness();
        let cart_id = h.service.create_cart().unwrap();
        assert_eq!(
            h.service.add_article_to_cart(cart_id, "HAT", 1),
            Err(ServiceError::ArticleNotFound(ArticleCode::new("HAT")))
        );
    }

    #[test]
    fn updating_absent_article_fails() {
        let h = harness();
        let cart_id = cart_with(&h.service, &[("MUG", 1)]);
        assert_eq!(
            h.service.set_article_quantity(cart_id, "TSHIRT", 2),
            Err(ServiceError::ArticleNotInCart(ArticleCode::new("TSHIRT")))
        );
    }

    #[test]
    fn quantity_overflow_is_rejected_and_cart_unchanged() {
        let h = harness();
        let cart_id = cart_with(&h.service, &[("MUG", i64::MAX)]);
        let before = h.store.get(cart_id).unwrap();

        assert_eq!(
            h.service.add_article_to_cart(cart_id, "TSHIRT", 1),
            Err(ServiceError::QuantityTooLarge(1))
        );
        assert_eq!(h.store.get(cart_id).unwrap(), before);

        let cart_id = cart_with(&h.service, &[("MUG", 1), ("TSHIRT", 1)]);
        assert_eq!(
            h.service.set_article_quantity(cart_id, "MUG", i64::MAX),
            Err(ServiceError::QuantityTooLarge(i64::MAX))
        );
        assert_eq!(h.service.get_cart(cart_id).unwrap().quantity(), 2);
    }

    #[test]
    fn huge_line_totals_saturate_instead_of_panicking() {
        let h = harness();
        let cart_id = cart_with(&h.service, &[("MUG", i64::MAX / 100)]);

        let priced = h.service.get_cart(cart_id).unwrap();
        assert_eq!(priced.item("MUG").unwrap().total_price, Money::from_cents(i64::MAX));
        assert_eq!(priced.subtotal(), Money::from_cents(i64::MAX));
    }

    #[test]
    fn fetched_copy_is_isolated_from_store() {
        let h = harness();
        let cart_id = cart_with(&h.service, &[("MUG", 1)]);

        let mut copy = h.store.get(cart_id).unwrap();
        copy.add_article("TSHIRT", 3).unwrap();
        copy.set_quantity("MUG", 9).unwrap();

        let stored = h.store.get(cart_id).unwrap();
        assert_eq!(stored.quantity(), 1);
        assert!(stored.get_item("TSHIRT").is_none());
        assert_eq!(h.service.get_cart(cart_id).unwrap().quantity(), 1);
    }
}

mod promotions {
    use super::*;

    #[test]
    fn no_promotion_triggers() {
        let h = harness();
        let cart_id = cart_with(&h.service, &[("VOUCHER", 1), ("TSHIRT", 1), ("MUG", 1)]);
        assert_eq!(
            h.service.get_cart(cart_id).unwrap().subtotal(),
            Money::from_cents(3250)
        );
    }

    #[test]
    fn two_for_one_on_vouchers() {
        let h = harness();
        let cart_id = cart_with(&h.service, &[("VOUCHER", 1), ("TSHIRT", 1)]);
        h.service.set_article_quantity(cart_id, "VOUCHER", 2).unwrap();

        let priced = h.service.get_cart(cart_id).unwrap();
        assert_eq!(priced.subtotal(), Money::from_cents(2500));
        assert_eq!(
            priced.item("VOUCHER").unwrap().total_price,
            Money::from_cents(500)
        );
    }

    #[test]
    fn bulk_discount_on_tshirts() {
        let h = harness();
        let cart_id = cart_with(&h.service, &[("VOUCHER", 1), ("TSHIRT", 4)]);

        let priced = h.service.get_cart(cart_id).unwrap();
        assert_eq!(priced.subtotal(), Money::from_cents(8100));
        let tshirt = priced.item("TSHIRT").unwrap();
        assert_eq!(tshirt.unit_price, Money::from_cents(2000));
        assert_eq!(tshirt.total_price, Money::from_cents(7600));
    }

    #[test]
    fn bulk_discount_needs_three_units() {
        let h = harness();
        let cart_id = cart_with(&h.service, &[("TSHIRT", 2)]);
        assert_eq!(
            h.service.get_cart(cart_id).unwrap().subtotal(),
            Money::from_cents(4000)
        );
    }

    #[test]
    fn items_keep_insertion_order() {
        let h = harness();
        let cart_id = cart_with(&h.service, &[("TSHIRT", 1), ("MUG", 1), ("VOUCHER", 1)]);
        let codes: Vec<String> = h
            .service
            .get_cart(cart_id)
            .unwrap()
            .items()
            .iter()
            .map(|i| i.code.to_string())
            .collect();
        assert_eq!(codes, ["TSHIRT", "MUG", "VOUCHER"]);
    }

    #[test]
    fn prices_are_read_at_pricing_time() {
        let store = Arc::new(InMemoryCartStore::new());
        let catalog = Arc::new(InMemoryCatalog::new());
        let service = CartService::new(
            Arc::new(SequentialIdGenerator::new()),
            store,
            catalog.clone(),
            Arc::new(PromotionEngine::new()),
        );
        catalog.add_article(Article::new("MUG", "Mug", Money::from_cents(750)));
        let cart_id = cart_with(&service, &[("MUG", 2)]);

        assert_eq!(
            service.get_cart(cart_id).unwrap().subtotal(),
            Money::from_cents(1500)
        );
    }

    #[test]
    fn removing_a_rule_disables_it() {
        let h = harness();
        let cart_id = cart_with(&h.service, &[("VOUCHER", 2)]);
        assert_eq!(
            h.service.get_cart(cart_id).unwrap().subtotal(),
            Money::from_cents(500)
        );

        for id in h.engine.rule_ids() {
            h.engine.del_rule(id);
        }
        assert_eq!(
            h.service.get_cart(cart_id).unwrap().subtotal(),
            Money::from_cents(1000)
        );
    }

    #[test]
    fn later_rule_wins_on_same_article() {
        let h = harness();
        h.engine.add_rule(|cart: &cart_store::Cart, _: &PriceList| {
            cart.get_item("VOUCHER")
                .map(|item| {
                    Promotion::ItemDiscount(CartItemDiscount::new(
                        "VOUCHER",
                        Discount::NewValue(Money::from_cents(100)),
                        item.quantity,
                    ))
                })
                .into_iter()
                .collect()
        });
        let cart_id = cart_with(&h.service, &[("VOUCHER", 2)]);

        // two-for-one is overridden by the later flat repricing: 2 * 100
        assert_eq!(
            h.service.get_cart(cart_id).unwrap().subtotal(),
            Money::from_cents(200)
        );
    }

    #[test]
    fn malformed_promotion_is_internal_error() {
        let h = harness();
        let faulty = h.engine.add_rule(|_: &cart_store::Cart, _: &PriceList| {
            vec![Promotion::ItemDiscount(CartItemDiscount::new(
                "HAT",
                Discount::Percentage(100),
                1,
            ))]
        });
        let cart_id = cart_with(&h.service, &[("MUG", 1)]);

        let err = h.service.get_cart(cart_id).unwrap_err();
        assert!(!err.is_client_error());
        match err {
            ServiceError::PromoRules(PromotionError::Malformed { rule_id, .. }) => {
                assert_eq!(rule_id, faulty)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

mod concurrency {
    use super::*;

    #[test]
    fn concurrent_carts_do_not_interfere() {
        let h = harness();
        let codes = ["VOUCHER", "TSHIRT", "MUG"];

        let ids: Vec<CartId> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let service = &h.service;
                    s.spawn(move || {
                        let cart_id = service.create_cart().unwrap();
                        service
                            .add_article_to_cart(cart_id, codes[i % 3], 1 + i as i64)
                            .unwrap();
                        cart_id
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for (i, cart_id) in ids.into_iter().enumerate() {
            let priced = h.service.get_cart(cart_id).unwrap();
            assert_eq!(priced.quantity(), 1 + i as i64);
            assert!(priced.item(codes[i % 3]).is_some());
        }
    }

    #[test]
    fn racing_writers_never_lose_updates_silently() {
        let h = harness();
        let cart_id = h.service.create_cart().unwrap();
        let codes = ["VOUCHER", "TSHIRT", "MUG"];

        let outcomes: Vec<Result<(), ServiceError>> = std::thread::scope(|s| {
            let handles: Vec<_> = codes
                .iter()
                .map(|code| {
                    let service = &h.service;
                    s.spawn(move || service.add_article_to_cart(cart_id, code, 1).map(|_| ()))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let succeeded = outcomes.iter().filter(|o| o.is_ok()).count();
        assert!(succeeded >= 1);
        for outcome in &outcomes {
            if let Err(err) = outcome {
                assert!(matches!(err, ServiceError::Conflict(_)), "{err:?}");
            }
        }

        let priced = h.service.get_cart(cart_id).unwrap();
        assert_eq!(priced.items().len(), succeeded);
    }
}
