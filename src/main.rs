//! Dark Settlement - Binary Entry Point
//!
//! Settles a sample trade end to end: a seller lists unique token #5 for 10
//! units of a fungible token, signs the order, and a buyer fills it.
//!
//! An optional first argument names a JSON engine configuration file.

use ed25519_dalek::SigningKey;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dark_settlement::config::EngineConfig;
use dark_settlement::engine::{CallContext, SettlementEngine, SettlementState};
use dark_settlement::interfaces::{address_of, sign_digest, RecordingExecutor};
use dark_settlement::types::{
    identifier, ConsiderationItem, ItemType, OfferItem, Order, OrderParameters, ZERO_WORD,
};

const NFT: [u8; 32] = [0x11; 32];
const USDC: [u8; 32] = [0x22; 32];

fn load_config() -> Result<EngineConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => Ok(EngineConfig::from_json(&std::fs::read_to_string(path)?)?),
        None => Ok(EngineConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dark_settlement=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("===========================================");
    println!("  Dark Settlement - Order Settlement Engine");
    println!("===========================================");
    println!();

    let engine = SettlementEngine::with_defaults(load_config()?)?;
    let mut state = SettlementState::new();
    let mut executor = RecordingExecutor::new();

    let seller_key = SigningKey::from_bytes(&[0x5E; 32]);
    let seller = address_of(&seller_key);
    let buyer = [0xB0; 32];

    let parameters = OrderParameters::new(
        seller,
        vec![OfferItem::new(ItemType::Unique, NFT, identifier(5), 1)],
        vec![ConsiderationItem::new(ItemType::Fungible, USDC, ZERO_WORD, 10, seller)],
        1_700_000_000,
        1_700_086_400,
    );
    let digest = engine.signing_digest(&state, &parameters)?;
    let order = Order::new(parameters, sign_digest(&seller_key, &digest));
    info!(order = %hex::encode(engine.order_hash(&state, &order.parameters)?), "order signed");

    let ctx = CallContext::new(buyer, 1_700_000_100);
    let outcome = engine.fulfill_basic_order(&mut state, &mut executor, ctx, order, ZERO_WORD)?;

    println!("Executions:");
    for execution in &outcome.executions {
        println!("  {}", execution.summary());
    }
    println!();
    println!("Events:");
    for event in &outcome.events {
        println!("  {}", event.summary());
    }
    println!();
    println!("Receipt:");
    println!("  Batch:      {}", outcome.receipt.batch_id);
    println!("  Orders:     {}", outcome.receipt.orders_fulfilled);
    println!("  Executions: {}", outcome.receipt.executions);
    println!("  State root: {}", outcome.receipt.state_root_hex());

    Ok(())
}
