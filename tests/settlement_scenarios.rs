//! End-to-end settlement scenarios through the public engine API.
//!
//! Each test builds a fresh engine and state, signs orders with Ed25519
//! keys, and drives one or more calls through a `RecordingExecutor`.

use ed25519_dalek::SigningKey;

use dark_settlement::criteria::{merkle_proof, merkle_root};
use dark_settlement::engine::{
    CallContext, FulfillAvailableOrders, FulfillOrder, MatchOrders, SettlementEngine,
    SettlementState,
};
use dark_settlement::events::SettlementEvent;
use dark_settlement::interfaces::{
    address_of, sign_digest, Ed25519Verifier, RecordingExecutor, StaticZoneRegistry, Zone,
    ZoneDecision, ZoneValidation,
};
use dark_settlement::types::{
    identifier, Address, AdvancedOrder, ConsiderationItem, CriteriaResolver, Fulfillment,
    FulfillmentComponent, ItemSide, ItemType, OfferItem, Order, OrderParameters, OrderType,
    ZERO_WORD,
};
use dark_settlement::{EngineConfig, SettlementError, TransferError};

// ============================================================================
// HELPERS
// ============================================================================

const NFT: Address = [0x11; 32];
const USDC: Address = [0x22; 32];
const DAI: Address = [0x33; 32];
const ZONE: Address = [0x20; 32];
const MATCHER: Address = [0xCA; 32];

const START: u64 = 1_000;
const END: u64 = 2_000;
const NOW: u64 = 1_500;

fn key(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32])
}

fn engine() -> SettlementEngine {
    SettlementEngine::with_defaults(EngineConfig::default()).unwrap()
}

fn sign(engine: &SettlementEngine, state: &SettlementState, signer: &SigningKey, parameters: OrderParameters) -> Order {
    let digest = engine.signing_digest(state, &parameters).unwrap();
    Order::new(parameters, sign_digest(signer, &digest))
}

/// Seller lists unique token #5 for 10 USDC.
fn nft_listing(seller: Address) -> OrderParameters {
    OrderParameters::new(
        seller,
        vec![OfferItem::new(ItemType::Unique, NFT, identifier(5), 1)],
        vec![ConsiderationItem::new(ItemType::Fungible, USDC, ZERO_WORD, 10, seller)],
        START,
        END,
    )
}

fn fc(order_index: usize, item_index: usize) -> FulfillmentComponent {
    FulfillmentComponent::new(order_index, item_index)
}

struct RejectingZone;

impl Zone for RejectingZone {
    fn validate_order(&self, validation: &ZoneValidation<'_>) -> ZoneDecision {
        if validation.extra_data == b"approved" {
            ZoneDecision::Accept
        } else {
            ZoneDecision::Reject
        }
    }
}

// ============================================================================
// BASIC FULFILLMENT
// ============================================================================

#[test]
fn test_basic_order_unique_for_fungible() {
    let engine = engine();
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();

    let seller_key = key(1);
    let seller = address_of(&seller_key);
    let buyer = address_of(&key(2));
    let order = sign(&engine, &state, &seller_key, nft_listing(seller));

    let outcome = engine
        .fulfill_basic_order(&mut state, &mut executor, CallContext::new(buyer, NOW), order, ZERO_WORD)
        .unwrap();

    assert_eq!(outcome.executions.len(), 2);

    // Consideration first: buyer pays the seller
    let payment = &outcome.executions[0];
    assert_eq!(payment.offerer, buyer);
    assert_eq!(payment.item.recipient, seller);
    assert_eq!(payment.item.token, USDC);
    assert_eq!(payment.item.amount, 10);

    let delivery = &outcome.executions[1];
    assert_eq!(delivery.offerer, seller);
    assert_eq!(delivery.item.recipient, buyer);
    assert_eq!(delivery.item.identifier, identifier(5));
    assert_eq!(delivery.item.amount, 1);

    let status = outcome.status(0).unwrap();
    assert!(status.is_validated);
    assert!(status.is_fully_filled());
    assert_eq!(executor.transfers(), outcome.executions.as_slice());
    assert_eq!(outcome.receipt.batch_id, 1);
    assert_eq!(outcome.receipt.orders_fulfilled, 1);
    assert!(matches!(outcome.events[0], SettlementEvent::OrderFulfilled { recipient, .. } if recipient == buyer));
}

#[test]
fn test_fulfill_available_with_components_on_both_sides() {
    let engine = engine();
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();

    let seller_key = key(1);
    let seller = address_of(&seller_key);
    let buyer = address_of(&key(2));
    let order = AdvancedOrder::from(sign(&engine, &state, &seller_key, nft_listing(seller)));

    let request = FulfillAvailableOrders::new(vec![order], vec![vec![fc(0, 0)]], vec![vec![fc(0, 0)]]);
    let outcome = engine
        .fulfill_available_orders(&mut state, &mut executor, CallContext::new(buyer, NOW), request)
        .unwrap();

    assert_eq!(outcome.executions.len(), 2);
    assert_eq!(outcome.executions[0].item.amount, 10);
    assert_eq!(outcome.executions[0].item.recipient, seller);
    assert_eq!(outcome.executions[1].item.identifier, identifier(5));
    assert_eq!(outcome.executions[1].item.recipient, buyer);
    assert!(outcome.status(0).unwrap().is_fully_filled());

    // A second attempt finds nothing available
    let order = AdvancedOrder::from(sign(&engine, &state, &seller_key, nft_listing(seller)));
    let request = FulfillAvailableOrders::new(vec![order], vec![vec![fc(0, 0)]], vec![vec![fc(0, 0)]]);
    let result = engine.fulfill_available_orders(&mut state, &mut executor, CallContext::new(buyer, NOW), request);
    assert_eq!(result.unwrap_err(), SettlementError::NoSpecifiedOrdersAvailable);
}

#[test]
fn test_invalid_signature_rejected() {
    let engine = engine();
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();

    let seller = address_of(&key(1));
    // Signed by the wrong key
    let order = sign(&engine, &state, &key(9), nft_listing(seller));
    let hash = engine.order_hash(&state, &order.parameters).unwrap();

    let result = engine.fulfill_basic_order(&mut state, &mut executor, CallContext::new(MATCHER, NOW), order, ZERO_WORD);
    assert_eq!(result.unwrap_err(), SettlementError::InvalidSignature { order_hash: hash });
    assert_eq!(state.batches_settled(), 0);
}

#[test]
fn test_expired_order_rejected() {
    let engine = engine();
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();
    let seller_key = key(1);
    let order = sign(&engine, &state, &seller_key, nft_listing(address_of(&seller_key)));

    let result = engine.fulfill_basic_order(&mut state, &mut executor, CallContext::new(MATCHER, END), order, ZERO_WORD);
    assert_eq!(
        result.unwrap_err(),
        SettlementError::InvalidTime { start_time: START, end_time: END, now: END }
    );
}

#[test]
fn test_descending_consideration_amount() {
    let engine = engine();
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();

    let seller_key = key(1);
    let seller = address_of(&seller_key);
    let mut parameters = nft_listing(seller);
    parameters.consideration[0] = parameters.consideration[0].clone().with_amounts(100, 50);
    let order = sign(&engine, &state, &seller_key, parameters);

    let outcome = engine
        .fulfill_basic_order(&mut state, &mut executor, CallContext::new(MATCHER, NOW), order, ZERO_WORD)
        .unwrap();
    // Halfway through the window
    assert_eq!(outcome.executions[0].item.amount, 75);
}

#[test]
fn test_appended_consideration_tip() {
    let engine = engine();
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();

    let seller_key = key(1);
    let seller = address_of(&seller_key);
    let mut order = sign(&engine, &state, &seller_key, nft_listing(seller));
    let hash = engine.order_hash(&state, &order.parameters).unwrap();

    let tip_recipient = [0x77; 32];
    order
        .parameters
        .consideration
        .push(ConsiderationItem::new(ItemType::Fungible, USDC, ZERO_WORD, 1, tip_recipient));

    // The tip does not change the hash, so the signature still holds
    assert_eq!(engine.order_hash(&state, &order.parameters).unwrap(), hash);

    let outcome = engine
        .fulfill_basic_order(&mut state, &mut executor, CallContext::new(MATCHER, NOW), order, ZERO_WORD)
        .unwrap();
    assert_eq!(outcome.executions.len(), 3);
    assert_eq!(outcome.executions[1].item.recipient, tip_recipient);
}

#[test]
fn test_missing_original_consideration() {
    let engine = engine();
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();

    let seller_key = key(1);
    let mut order = sign(&engine, &state, &seller_key, nft_listing(address_of(&seller_key)));
    order.parameters.consideration.clear();

    let result = engine.fulfill_basic_order(&mut state, &mut executor, CallContext::new(MATCHER, NOW), order, ZERO_WORD);
    assert_eq!(
        result.unwrap_err(),
        SettlementError::MissingOriginalConsiderationItems { order_index: 0, supplied: 0, required: 1 }
    );
}

// ============================================================================
// PARTIAL FILLS
// ============================================================================

fn partial_order(engine: &SettlementEngine, state: &SettlementState, signer: &SigningKey) -> Order {
    let offerer = address_of(signer);
    let mut parameters = OrderParameters::new(
        offerer,
        vec![OfferItem::new(ItemType::Fungible, USDC, ZERO_WORD, 100)],
        vec![ConsiderationItem::new(ItemType::Fungible, DAI, ZERO_WORD, 1_000, offerer)],
        START,
        END,
    );
    parameters.order_type = OrderType::PartialOpen;
    sign(engine, state, signer, parameters)
}

#[test]
fn test_partial_fill_sequence_caps_last_request() {
    let engine = engine();
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();
    let signer = key(3);
    let ctx = CallContext::new(MATCHER, NOW);
    let order = partial_order(&engine, &state, &signer);

    let fill = |num: u128, den: u128| FulfillOrder::new(AdvancedOrder::from(order.clone()).with_fraction(num, den));

    let first = engine.fulfill_order(&mut state, &mut executor, ctx, fill(3, 10)).unwrap();
    assert_eq!(first.executions[0].item.amount, 300);
    assert_eq!(first.executions[1].item.amount, 30);
    let status = first.status(0).unwrap();
    assert_eq!((status.numerator, status.denominator), (3, 10));

    let second = engine.fulfill_order(&mut state, &mut executor, ctx, fill(4, 10)).unwrap();
    assert_eq!(second.executions[1].item.amount, 40);
    let status = second.status(0).unwrap();
    assert_eq!((status.numerator, status.denominator), (7, 10));

    // Half requested, 3/10 remaining: capped rather than rejected
    let third = engine.fulfill_order(&mut state, &mut executor, ctx, fill(1, 2)).unwrap();
    assert_eq!(third.executions[0].item.amount, 300);
    assert_eq!(third.executions[1].item.amount, 30);
    assert!(third.status(0).unwrap().is_fully_filled());

    let hash = *third.order_hash(0).unwrap();
    let result = engine.fulfill_order(&mut state, &mut executor, ctx, fill(1, 10));
    assert_eq!(result.unwrap_err(), SettlementError::OrderAlreadyFilled { order_hash: hash });

    // Conservation across all fills
    let paid: u128 = executor.transfers().iter().filter(|e| e.item.token == USDC).map(|e| e.item.amount).sum();
    assert_eq!(paid, 100);
}

#[test]
fn test_partial_fill_on_full_order_rejected() {
    let engine = engine();
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();
    let seller_key = key(1);
    let order = sign(&engine, &state, &seller_key, nft_listing(address_of(&seller_key)));
    let hash = engine.order_hash(&state, &order.parameters).unwrap();

    let request = FulfillOrder::new(AdvancedOrder::from(order).with_fraction(1, 2));
    let result = engine.fulfill_order(&mut state, &mut executor, CallContext::new(MATCHER, NOW), request);
    assert_eq!(result.unwrap_err(), SettlementError::PartialFillsNotEnabledForOrder { order_hash: hash });
}

#[test]
fn test_inexact_fraction_rejected() {
    let engine = engine();
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();
    let order = partial_order(&engine, &state, &key(3));

    // 100 * 1/3 is not an integer
    let request = FulfillOrder::new(AdvancedOrder::from(order).with_fraction(1, 3));
    let result = engine.fulfill_order(&mut state, &mut executor, CallContext::new(MATCHER, NOW), request);
    assert!(matches!(result, Err(SettlementError::InexactFraction { .. })));
    assert_eq!(state.order_count(), 0);
}

// ============================================================================
// MATCHING
// ============================================================================

#[test]
fn test_match_criss_cross() {
    let engine = engine();
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();

    let alice_key = key(4);
    let bob_key = key(5);
    let alice = address_of(&alice_key);
    let bob = address_of(&bob_key);

    let ask = sign(&engine, &state, &alice_key, nft_listing(alice));
    let bid = sign(
        &engine,
        &state,
        &bob_key,
        OrderParameters::new(
            bob,
            vec![OfferItem::new(ItemType::Fungible, USDC, ZERO_WORD, 12)],
            vec![ConsiderationItem::new(ItemType::Unique, NFT, identifier(5), 1, bob)],
            START,
            END,
        ),
    );

    let fulfillments = vec![
        Fulfillment::new(vec![fc(0, 0)], vec![fc(1, 0)]),
        Fulfillment::new(vec![fc(1, 0)], vec![fc(0, 0)]),
    ];
    let request = MatchOrders::new(vec![ask.into(), bid.into()], fulfillments);
    let outcome = engine
        .match_orders(&mut state, &mut executor, CallContext::new(MATCHER, NOW), request)
        .unwrap();

    // Two fulfillments plus one sweep of Bob's surplus to the matcher
    assert_eq!(outcome.executions.len(), 3);
    assert_eq!(outcome.executions[0].offerer, alice);
    assert_eq!(outcome.executions[0].item.recipient, bob);
    assert_eq!(outcome.executions[1].offerer, bob);
    assert_eq!(outcome.executions[1].item.recipient, alice);
    assert_eq!(outcome.executions[1].item.amount, 10);
    assert_eq!(outcome.executions[2].item.recipient, MATCHER);
    assert_eq!(outcome.executions[2].item.amount, 2);

    // Everything Bob offered went somewhere; nothing extra was created
    let usdc_out: u128 = outcome
        .executions
        .iter()
        .filter(|e| e.item.token == USDC)
        .map(|e| e.item.amount)
        .sum();
    assert_eq!(usdc_out, 12);

    assert!(outcome.status(0).unwrap().is_fully_filled());
    assert!(outcome.status(1).unwrap().is_fully_filled());
    assert!(outcome
        .events
        .iter()
        .any(|event| matches!(event, SettlementEvent::OrdersMatched { order_hashes } if order_hashes.len() == 2)));
}

#[test]
fn test_match_unmet_consideration() {
    let engine = engine();
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();

    let alice_key = key(4);
    let bob_key = key(5);
    let alice = address_of(&alice_key);
    let bob = address_of(&bob_key);

    let ask = sign(&engine, &state, &alice_key, nft_listing(alice));
    let bid = sign(
        &engine,
        &state,
        &bob_key,
        OrderParameters::new(
            bob,
            vec![OfferItem::new(ItemType::Fungible, USDC, ZERO_WORD, 8)],
            vec![ConsiderationItem::new(ItemType::Unique, NFT, identifier(5), 1, bob)],
            START,
            END,
        ),
    );

    let fulfillments = vec![
        Fulfillment::new(vec![fc(0, 0)], vec![fc(1, 0)]),
        Fulfillment::new(vec![fc(1, 0)], vec![fc(0, 0)]),
    ];
    let request = MatchOrders::new(vec![ask.into(), bid.into()], fulfillments);
    let result = engine.match_orders(&mut state, &mut executor, CallContext::new(MATCHER, NOW), request);
    assert_eq!(
        result.unwrap_err(),
        SettlementError::ConsiderationNotMet { order_index: 0, item_index: 0, shortfall: 2 }
    );
    assert!(executor.transfers().is_empty());
    assert_eq!(state.order_count(), 0);
}

#[test]
fn test_match_reused_offer_item_leaves_consideration_unmet() {
    let engine = engine();
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();

    let (alice_key, bob_key, carol_key) = (key(4), key(5), key(7));
    let (alice, bob, carol) = (address_of(&alice_key), address_of(&bob_key), address_of(&carol_key));

    // Alice pays 10 USDC for token #5; Bob and Carol each want 10 USDC
    let buy = sign(
        &engine,
        &state,
        &alice_key,
        OrderParameters::new(
            alice,
            vec![OfferItem::new(ItemType::Fungible, USDC, ZERO_WORD, 10)],
            vec![ConsiderationItem::new(ItemType::Unique, NFT, identifier(5), 1, alice)],
            START,
            END,
        ),
    );
    let sell = sign(&engine, &state, &bob_key, nft_listing(bob));
    let ask = sign(
        &engine,
        &state,
        &carol_key,
        OrderParameters::new(
            carol,
            vec![OfferItem::new(ItemType::Fungible, DAI, ZERO_WORD, 5)],
            vec![ConsiderationItem::new(ItemType::Fungible, USDC, ZERO_WORD, 10, carol)],
            START,
            END,
        ),
    );

    // The third fulfillment draws on Alice's USDC again after Bob took all of it
    let fulfillments = vec![
        Fulfillment::new(vec![fc(1, 0)], vec![fc(0, 0)]),
        Fulfillment::new(vec![fc(0, 0)], vec![fc(1, 0)]),
        Fulfillment::new(vec![fc(0, 0), fc(0, 0)], vec![fc(2, 0)]),
    ];
    let request = MatchOrders::new(vec![buy.into(), sell.into(), ask.into()], fulfillments);
    let root = state.state_root().unwrap();
    let result = engine.match_orders(&mut state, &mut executor, CallContext::new(MATCHER, NOW), request);

    assert_eq!(
        result.unwrap_err(),
        SettlementError::ConsiderationNotMet { order_index: 2, item_index: 0, shortfall: 10 }
    );
    assert!(executor.transfers().is_empty());
    assert_eq!(state.state_root().unwrap(), root);
}

// ============================================================================
// CANCELLATION AND COUNTERS
// ============================================================================

#[test]
fn test_cancel_blocks_fulfillment() {
    let engine = engine();
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();

    let seller_key = key(1);
    let seller = address_of(&seller_key);
    let order = sign(&engine, &state, &seller_key, nft_listing(seller));
    let hash = engine.order_hash(&state, &order.parameters).unwrap();

    // Pre-validated orders are cancellable too
    engine.validate(&mut state, CallContext::new(MATCHER, NOW), &[order.clone()]).unwrap();

    let stranger = engine.cancel(&mut state, CallContext::new(MATCHER, NOW), &[order.parameters.clone()]);
    assert_eq!(stranger.unwrap_err(), SettlementError::InvalidCanceller { order_hash: hash });

    let outcome = engine.cancel(&mut state, CallContext::new(seller, NOW), &[order.parameters.clone()]).unwrap();
    assert_eq!(outcome.events.len(), 1);
    let status = state.order_status(&hash);
    assert!(status.is_cancelled);
    assert!(status.is_validated);

    let result = engine.fulfill_basic_order(&mut state, &mut executor, CallContext::new(MATCHER, NOW), order.clone(), ZERO_WORD);
    assert_eq!(result.unwrap_err(), SettlementError::OrderIsCancelled { order_hash: hash });

    // Second cancel is a no-op
    let again = engine.cancel(&mut state, CallContext::new(seller, NOW), &[order.parameters]).unwrap();
    assert!(again.events.is_empty());
}

#[test]
fn test_zone_can_cancel() {
    let engine = engine();
    let mut state = SettlementState::new();
    let seller_key = key(1);
    let mut parameters = nft_listing(address_of(&seller_key));
    parameters.zone = ZONE;

    let outcome = engine.cancel(&mut state, CallContext::new(ZONE, NOW), &[parameters]).unwrap();
    assert!(outcome.status(0).unwrap().is_cancelled);
}

#[test]
fn test_counter_increment_invalidates_signed_orders() {
    let engine = engine();
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();

    let seller_key = key(1);
    let seller = address_of(&seller_key);
    let order = sign(&engine, &state, &seller_key, nft_listing(seller));

    let outcome = engine.increment_counter(&mut state, CallContext::new(seller, NOW)).unwrap();
    assert_eq!(outcome.events, vec![SettlementEvent::CounterIncremented { offerer: seller, counter: 1 }]);

    let new_hash = engine.order_hash(&state, &order.parameters).unwrap();
    let result = engine.fulfill_basic_order(&mut state, &mut executor, CallContext::new(MATCHER, NOW), order, ZERO_WORD);
    assert_eq!(result.unwrap_err(), SettlementError::InvalidSignature { order_hash: new_hash });

    // Re-signing under the new counter works
    let order = sign(&engine, &state, &seller_key, nft_listing(seller));
    assert!(engine
        .fulfill_basic_order(&mut state, &mut executor, CallContext::new(MATCHER, NOW), order, ZERO_WORD)
        .is_ok());
}

#[test]
fn test_validated_order_skips_signature() {
    let engine = engine();
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();

    let seller_key = key(1);
    let order = sign(&engine, &state, &seller_key, nft_listing(address_of(&seller_key)));
    let outcome = engine.validate(&mut state, CallContext::new(MATCHER, NOW), &[order.clone()]).unwrap();
    assert!(matches!(outcome.events[0], SettlementEvent::OrderValidated { .. }));

    let unsigned = Order::new(order.parameters, Vec::new());
    assert!(engine
        .fulfill_basic_order(&mut state, &mut executor, CallContext::new(MATCHER, NOW), unsigned, ZERO_WORD)
        .is_ok());
}

#[test]
fn test_cancelled_error_outranks_other_rejections() {
    let engine = engine();
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();

    let seller_key = key(1);
    let seller = address_of(&seller_key);
    let order = sign(&engine, &state, &seller_key, nft_listing(seller));
    let hash = engine.order_hash(&state, &order.parameters).unwrap();
    engine.cancel(&mut state, CallContext::new(seller, NOW), &[order.parameters.clone()]).unwrap();
    let cancelled = SettlementError::OrderIsCancelled { order_hash: hash };

    // Past the end of the window
    let expired = engine.fulfill_basic_order(
        &mut state,
        &mut executor,
        CallContext::new(MATCHER, END + 500),
        order.clone(),
        ZERO_WORD,
    );
    assert_eq!(expired.unwrap_err(), cancelled);

    // Partial fraction on a full order
    let half = FulfillOrder::new(AdvancedOrder::from(order.clone()).with_fraction(1, 2));
    let result = engine.fulfill_order(&mut state, &mut executor, CallContext::new(MATCHER, NOW), half);
    assert_eq!(result.unwrap_err(), cancelled);

    let zero = FulfillOrder::new(AdvancedOrder::from(order).with_fraction(0, 1));
    let result = engine.fulfill_order(&mut state, &mut executor, CallContext::new(MATCHER, NOW), zero);
    assert_eq!(result.unwrap_err(), cancelled);
}

#[test]
fn test_cancel_requires_original_consideration() {
    let engine = engine();
    let mut state = SettlementState::new();

    let seller_key = key(1);
    let seller = address_of(&seller_key);
    let mut truncated = nft_listing(seller);
    truncated.consideration.clear();
    let missing = SettlementError::MissingOriginalConsiderationItems { order_index: 0, supplied: 0, required: 1 };

    let result = engine.cancel(&mut state, CallContext::new(seller, NOW), &[truncated.clone()]);
    assert_eq!(result.unwrap_err(), missing);
    assert_eq!(engine.order_hash(&state, &truncated).unwrap_err(), missing);
    assert_eq!(state.batches_settled(), 0);

    // The full listing is still fillable
    assert!(!engine.order_status(&state, &nft_listing(seller)).unwrap().is_cancelled);
}

// ============================================================================
// ATOMICITY
// ============================================================================

#[test]
fn test_executor_failure_rolls_back() {
    let engine = engine();
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();
    executor.fail_on(1);

    let seller_key = key(1);
    let order = sign(&engine, &state, &seller_key, nft_listing(address_of(&seller_key)));
    let hash = engine.order_hash(&state, &order.parameters).unwrap();
    let root = state.state_root().unwrap();

    let result = engine.fulfill_basic_order(&mut state, &mut executor, CallContext::new(MATCHER, NOW), order.clone(), ZERO_WORD);
    assert!(matches!(result, Err(SettlementError::Transfer(TransferError::Rejected { .. }))));
    assert_eq!(state.state_root().unwrap(), root);
    assert_eq!(state.order_status(&hash), Default::default());
    assert_eq!(state.batches_settled(), 0);
    assert!(executor.transfers().is_empty());

    let mut healthy = RecordingExecutor::new();
    let outcome = engine
        .fulfill_basic_order(&mut state, &mut healthy, CallContext::new(MATCHER, NOW), order, ZERO_WORD)
        .unwrap();
    assert_eq!(outcome.receipt.batch_id, 1);
}

#[test]
fn test_unopened_conduit_aborts() {
    let engine = engine();
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();

    let seller_key = key(1);
    let mut parameters = nft_listing(address_of(&seller_key));
    parameters.conduit_key = [0xC0; 32];
    let order = sign(&engine, &state, &seller_key, parameters);

    let result = engine.fulfill_basic_order(&mut state, &mut executor, CallContext::new(MATCHER, NOW), order.clone(), ZERO_WORD);
    assert!(matches!(result, Err(SettlementError::Transfer(TransferError::UnknownConduit { .. }))));

    executor.open_conduit([0xC0; 32]);
    let outcome = engine
        .fulfill_basic_order(&mut state, &mut executor, CallContext::new(MATCHER, NOW), order, ZERO_WORD)
        .unwrap();
    assert!(!outcome.executions[1].is_direct());
}

// ============================================================================
// ZONES
// ============================================================================

#[test]
fn test_restricted_order_requires_zone_approval() {
    let mut zones = StaticZoneRegistry::new();
    zones.register(ZONE, Box::new(RejectingZone));
    let engine = SettlementEngine::new(EngineConfig::default(), Box::new(Ed25519Verifier::new()), Box::new(zones)).unwrap();
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();

    let seller_key = key(1);
    let mut parameters = nft_listing(address_of(&seller_key));
    parameters.zone = ZONE;
    parameters.order_type = OrderType::FullRestricted;
    let order = sign(&engine, &state, &seller_key, parameters);
    let hash = engine.order_hash(&state, &order.parameters).unwrap();

    let plain = FulfillOrder::new(AdvancedOrder::from(order.clone()));
    let result = engine.fulfill_order(&mut state, &mut executor, CallContext::new(MATCHER, NOW), plain);
    assert_eq!(result.unwrap_err(), SettlementError::InvalidRestrictedOrder { order_hash: hash });

    let approved = FulfillOrder::new(AdvancedOrder::from(order.clone()).with_extra_data(b"approved".to_vec()));
    assert!(engine
        .fulfill_order(&mut state, &mut executor, CallContext::new(MATCHER, NOW), approved)
        .is_ok());
}

#[test]
fn test_unregistered_zone_rejects() {
    let engine = engine();
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();

    let seller_key = key(1);
    let mut parameters = nft_listing(address_of(&seller_key));
    parameters.zone = ZONE;
    parameters.order_type = OrderType::FullRestricted;
    let order = sign(&engine, &state, &seller_key, parameters);

    let result = engine.fulfill_basic_order(&mut state, &mut executor, CallContext::new(MATCHER, NOW), order.clone(), ZERO_WORD);
    assert!(matches!(result, Err(SettlementError::InvalidRestrictedOrder { .. })));

    // The zone itself may fill without a callback
    assert!(engine
        .fulfill_basic_order(&mut state, &mut executor, CallContext::new(ZONE, NOW), order, ZERO_WORD)
        .is_ok());
}

// ============================================================================
// CRITERIA
// ============================================================================

/// Buyer bids 10 USDC for any token in the collection subset {1..=8}.
fn collection_bid(engine: &SettlementEngine, state: &SettlementState, signer: &SigningKey) -> Order {
    let buyer = address_of(signer);
    let ids: Vec<_> = (1..=8).map(identifier).collect();
    let parameters = OrderParameters::new(
        buyer,
        vec![OfferItem::new(ItemType::Fungible, USDC, ZERO_WORD, 10)],
        vec![ConsiderationItem::new(ItemType::UniqueWithCriteria, NFT, merkle_root(&ids), 1, buyer)],
        START,
        END,
    );
    sign(engine, state, signer, parameters)
}

#[test]
fn test_criteria_bid_accepted_with_proof() {
    let engine = engine();
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();

    let buyer_key = key(6);
    let buyer = address_of(&buyer_key);
    let holder = [0x40; 32];
    let order = collection_bid(&engine, &state, &buyer_key);

    let ids: Vec<_> = (1..=8).map(identifier).collect();
    let resolver = CriteriaResolver::new(0, ItemSide::Consideration, 0, ids[4], merkle_proof(&ids, 4).unwrap());
    let request = FulfillOrder::new(AdvancedOrder::from(order)).with_resolvers(vec![resolver]);
    let outcome = engine
        .fulfill_order(&mut state, &mut executor, CallContext::new(holder, NOW), request)
        .unwrap();

    let delivery = &outcome.executions[0];
    assert_eq!(delivery.item.item_type, ItemType::Unique);
    assert_eq!(delivery.item.identifier, identifier(5));
    assert_eq!(delivery.offerer, holder);
    assert_eq!(delivery.item.recipient, buyer);
    assert_eq!(outcome.executions[1].item.amount, 10);
    assert_eq!(outcome.executions[1].item.recipient, holder);
}

#[test]
fn test_criteria_bid_rejects_outsider() {
    let engine = engine();
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();
    let order = collection_bid(&engine, &state, &key(6));

    let ids: Vec<_> = (1..=8).map(identifier).collect();
    let resolver = CriteriaResolver::new(0, ItemSide::Consideration, 0, identifier(42), merkle_proof(&ids, 4).unwrap());
    let request = FulfillOrder::new(AdvancedOrder::from(order.clone())).with_resolvers(vec![resolver]);
    let result = engine.fulfill_order(&mut state, &mut executor, CallContext::new(MATCHER, NOW), request);
    assert_eq!(
        result.unwrap_err(),
        SettlementError::CriteriaNotMet { order_index: 0, side: ItemSide::Consideration, item_index: 0 }
    );

    let request = FulfillOrder::new(AdvancedOrder::from(order));
    let result = engine.fulfill_order(&mut state, &mut executor, CallContext::new(MATCHER, NOW), request);
    assert_eq!(
        result.unwrap_err(),
        SettlementError::UnresolvedCriteria { order_index: 0, side: ItemSide::Consideration, item_index: 0 }
    );
    assert_eq!(state.batches_settled(), 0);
}

#[test]
fn test_basic_order_rejects_criteria_items() {
    let engine = engine();
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();

    let order = collection_bid(&engine, &state, &key(6));
    let result = engine.fulfill_basic_order(&mut state, &mut executor, CallContext::new(MATCHER, NOW), order, ZERO_WORD);
    assert_eq!(
        result.unwrap_err(),
        SettlementError::UnresolvedCriteria { order_index: 0, side: ItemSide::Consideration, item_index: 0 }
    );
}

// ============================================================================
// AVAILABLE MODE
// ============================================================================

#[test]
fn test_available_skips_cancelled_and_respects_maximum() {
    let engine = engine();
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();

    let seller_key = key(1);
    let seller = address_of(&seller_key);
    let first = nft_listing(seller);
    let mut second = nft_listing(seller);
    second.offer[0].identifier_or_criteria = identifier(6);
    let mut third = nft_listing(seller);
    third.offer[0].identifier_or_criteria = identifier(7);

    engine.cancel(&mut state, CallContext::new(seller, NOW), &[first.clone()]).unwrap();

    let orders: Vec<AdvancedOrder> = [first, second, third]
        .into_iter()
        .map(|parameters| sign(&engine, &state, &seller_key, parameters).into())
        .collect();
    let request = FulfillAvailableOrders::new(
        orders,
        vec![vec![fc(0, 0)], vec![fc(1, 0)], vec![fc(2, 0)]],
        vec![vec![fc(0, 0), fc(1, 0), fc(2, 0)]],
    )
    .with_maximum_fulfilled(1);

    let outcome = engine
        .fulfill_available_orders(&mut state, &mut executor, CallContext::new(MATCHER, NOW), request)
        .unwrap();

    // Only the second order fills: the first is cancelled, the third is past the maximum
    assert_eq!(outcome.receipt.orders_fulfilled, 1);
    assert_eq!(outcome.executions.len(), 2);
    assert_eq!(outcome.executions[0].item.amount, 10);
    assert_eq!(outcome.executions[1].item.identifier, identifier(6));
    assert!(outcome.status(0).unwrap().is_cancelled);
    assert!(outcome.status(1).unwrap().is_fully_filled());
    assert_eq!(outcome.status(2).unwrap().numerator, 0);
}

#[test]
fn test_too_many_orders() {
    let config = EngineConfig { max_orders_per_batch: 1, ..EngineConfig::default() };
    let engine = SettlementEngine::with_defaults(config).unwrap();
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();

    let seller_key = key(1);
    let order: AdvancedOrder = sign(&engine, &state, &seller_key, nft_listing(address_of(&seller_key))).into();
    let request = MatchOrders::new(vec![order.clone(), order], vec![]);
    let result = engine.match_orders(&mut state, &mut executor, CallContext::new(MATCHER, NOW), request);
    assert_eq!(result.unwrap_err(), SettlementError::TooManyOrders { count: 2, max: 1 });
}
