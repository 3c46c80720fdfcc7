//! Limit Order Protocol - demo binary
//!
//! Deploys an exchange into an in-memory sandbox, signs one order and fills it
//! in two parts. Configuration comes from `LOP_*` environment variables, log
//! verbosity from `RUST_LOG`.

use alloy::primitives::{B256, U256};
use alloy::signers::local::PrivateKeySigner;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use limit_order_protocol::config::ProtocolConfig;
use limit_order_protocol::engine::{FillRequest, LimitOrderProtocol};
use limit_order_protocol::hashing::sign_digest;
use limit_order_protocol::sandbox::{Sandbox, TokenFlavor};
use limit_order_protocol::types::amount::{format_units, parse_units};
use limit_order_protocol::types::OrderBuilder;

const DECIMALS: u32 = 18;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run() {
        error!(error = %e, "demo failed");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ProtocolConfig::from_env()?;
    if config.verifying_contract.is_zero() {
        config.verifying_contract = alloy::primitives::Address::repeat_byte(0xEE);
    }
    let exchange_address = config.verifying_contract;
    let mut exchange = LimitOrderProtocol::new(config);
    info!(
        exchange = %exchange_address,
        domain_separator = %exchange.domain_separator(),
        "exchange deployed"
    );

    let mut sandbox = Sandbox::new();
    let maker = PrivateKeySigner::from_bytes(&B256::repeat_byte(0x11))?;
    let taker = PrivateKeySigner::from_bytes(&B256::repeat_byte(0x22))?.address();

    let weth = sandbox.deploy_token(TokenFlavor::Standard);
    let dai = sandbox.deploy_token(TokenFlavor::Standard);
    let units = |s: &str| parse_units(s, DECIMALS).ok_or_else(|| format!("bad amount {s}"));

    sandbox.mint(weth, maker.address(), units("10")?)?;
    sandbox.mint(dai, taker, units("30000")?)?;
    sandbox.approve(weth, maker.address(), exchange_address, U256::MAX)?;
    sandbox.approve(dai, taker, exchange_address, U256::MAX)?;

    // 10 WETH for 25,000 DAI
    let order = OrderBuilder::new(exchange_address, maker.address())
        .assets(weth, dai)
        .amounts(units("10")?, units("25000")?)
        .salt(U256::from(1u64))
        .build();
    let order_hash = exchange.hash_order(&order);
    let signature = sign_digest(&maker, order_hash)?;
    info!(order_hash = %order_hash, "order signed");

    let first = exchange.fill_order(
        &mut sandbox,
        taker,
        &order,
        &signature,
        &FillRequest::making(units("3")?, units("7500")?),
    )?;
    let second = exchange.fill_order(
        &mut sandbox,
        taker,
        &order,
        &signature,
        &FillRequest::taking(units("17500")?, units("7")?),
    )?;

    for (i, fill) in [first, second].iter().enumerate() {
        info!(
            fill = i + 1,
            making = %format_units(fill.making_amount, DECIMALS),
            taking = %format_units(fill.taking_amount, DECIMALS),
            remaining = %format_units(fill.remaining, DECIMALS),
            "fill applied"
        );
    }

    info!(
        taker_weth = %format_units(sandbox.balance_of(weth, taker), DECIMALS),
        maker_dai = %format_units(sandbox.balance_of(dai, maker.address()), DECIMALS),
        state_root = %exchange.state_root_hex()?,
        "final balances"
    );
    Ok(())
}
