//! End-to-end ledger flows against the in-memory custody ledger.

use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;

use reservoir_ledger::{
    AddLiquidityParams, Address, Custody, MemoryCustody, PoolLedger, SharedLedger, PRICE_SCALE,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn addr(last: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[19] = last;
    Address::new(bytes)
}

fn fund(custody: &mut MemoryCustody, tokens: &[Address], owner: Address, amount: u128) {
    for (i, &token_a) in tokens.iter().enumerate() {
        custody.mint(token_a, owner, amount);
        for &token_b in &tokens[i + 1..] {
            let vault = PoolLedger::vault_account(token_a, token_b).unwrap();
            custody.approve(token_a, owner, vault, amount);
            custody.approve(token_b, owner, vault, amount);
        }
    }
}

fn deposit(
    ledger: &mut PoolLedger,
    custody: &mut MemoryCustody,
    token_a: Address,
    token_b: Address,
    provider: Address,
    amount_a: u128,
    amount_b: u128,
) -> Result<reservoir_ledger::LiquidityAdded> {
    Ok(ledger.add_liquidity(
        custody,
        token_a,
        token_b,
        provider,
        AddLiquidityParams {
            amount_a_desired: amount_a,
            amount_b_desired: amount_b,
            amount_a_min: 0,
            amount_b_min: 0,
            recipient: provider,
        },
    )?)
}

#[test]
fn pools_sharing_a_token_keep_separate_vaults() -> Result<()> {
    init_tracing();
    let (shared, token_b, token_c) = (addr(1), addr(2), addr(3));
    let lp = addr(10);
    let trader = addr(11);
    let mut ledger = PoolLedger::new();
    let mut custody = MemoryCustody::new();
    fund(&mut custody, &[shared, token_b, token_c], lp, 1_000_000);
    fund(&mut custody, &[shared, token_b, token_c], trader, 1_000_000);

    deposit(&mut ledger, &mut custody, shared, token_b, lp, 1000, 2000)?;
    deposit(&mut ledger, &mut custody, shared, token_c, lp, 5000, 500)?;

    // Each pool reconciles reserves against its own vault even though both
    // hold the shared token.
    let vault_ab = PoolLedger::vault_account(shared, token_b)?;
    let vault_ac = PoolLedger::vault_account(shared, token_c)?;
    assert_ne!(vault_ab, vault_ac);
    assert_eq!(custody.balance_of(shared, vault_ab), 1000);
    assert_eq!(custody.balance_of(shared, vault_ac), 5000);

    // A swap on one pool leaves the other untouched.
    ledger.swap(&mut custody, shared, 100, token_b, 0, trader, trader)?;
    assert_eq!(ledger.get_reserves(shared, token_c)?, (5000, 500));
    assert_eq!(custody.balance_of(shared, vault_ac), 5000);
    Ok(())
}

#[test]
fn add_then_remove_round_trip_loses_only_rounding() -> Result<()> {
    init_tracing();
    let (token_a, token_b) = (addr(1), addr(2));
    let (lp1, lp2) = (addr(10), addr(11));
    let mut ledger = PoolLedger::new();
    let mut custody = MemoryCustody::new();
    fund(&mut custody, &[token_a, token_b], lp1, 1_000_000);
    fund(&mut custody, &[token_a, token_b], lp2, 1_000_000);

    deposit(&mut ledger, &mut custody, token_a, token_b, lp1, 3333, 7777)?;
    let added = deposit(&mut ledger, &mut custody, token_a, token_b, lp2, 555, 10_000)?;
    let removed = ledger.remove_liquidity(
        &mut custody,
        token_a,
        token_b,
        lp2,
        added.shares,
        0,
        0,
        lp2,
    )?;

    assert!(removed.amount_a <= added.amount_a);
    assert!(removed.amount_b <= added.amount_b);
    // And lp2's shares are fully gone
    assert_eq!(ledger.share_balance(token_a, token_b, lp2)?, 0);
    Ok(())
}

#[test]
fn price_reciprocals_multiply_to_the_scale_square() -> Result<()> {
    init_tracing();
    let (token_a, token_b) = (addr(1), addr(2));
    let lp = addr(10);
    let mut ledger = PoolLedger::new();
    let mut custody = MemoryCustody::new();
    fund(&mut custody, &[token_a, token_b], lp, 1_000_000);
    deposit(&mut ledger, &mut custody, token_a, token_b, lp, 1000, 3000)?;

    let price_ab = ledger.price(token_a, token_b)?;
    let price_ba = ledger.price(token_b, token_a)?;
    assert_eq!(price_ab, 3 * PRICE_SCALE);

    let scale_sq = PRICE_SCALE * PRICE_SCALE;
    let product = price_ab * price_ba;
    assert!(product <= scale_sq);
    // Flooring of the reciprocal costs at most one unit times the forward price
    assert!(scale_sq - product <= price_ab);
    Ok(())
}

#[test]
fn ledger_round_trips_through_json() -> Result<()> {
    init_tracing();
    let (token_a, token_b) = (addr(1), addr(2));
    let (lp, trader) = (addr(10), addr(11));
    let mut ledger = PoolLedger::new();
    let mut custody = MemoryCustody::new();
    fund(&mut custody, &[token_a, token_b], lp, 1_000_000);
    fund(&mut custody, &[token_a, token_b], trader, 1_000_000);
    deposit(&mut ledger, &mut custody, token_a, token_b, lp, 10_000, 10_000)?;
    ledger.swap(&mut custody, token_a, 1000, token_b, 0, trader, trader)?;

    let json = serde_json::to_string(&ledger)?;
    let restored: PoolLedger = serde_json::from_str(&json)?;

    assert_eq!(
        restored.get_reserves(token_a, token_b)?,
        ledger.get_reserves(token_a, token_b)?
    );
    assert_eq!(
        restored.share_balance(token_a, token_b, lp)?,
        ledger.share_balance(token_a, token_b, lp)?
    );
    assert_eq!(restored.mint_policy(), ledger.mint_policy());
    Ok(())
}

#[test]
fn shared_ledger_serializes_concurrent_swaps() -> Result<()> {
    init_tracing();
    let (token_a, token_b) = (addr(1), addr(2));
    let lp = addr(10);
    let ledger = SharedLedger::new(PoolLedger::new());
    let custody = Arc::new(Mutex::new(MemoryCustody::new()));

    {
        let mut guard = custody.lock();
        fund(&mut guard, &[token_a, token_b], lp, 10_000_000);
        for i in 0..4u8 {
            fund(&mut guard, &[token_a, token_b], addr(100 + i), 10_000_000);
        }
        ledger.add_liquidity(
            &mut *guard,
            token_a,
            token_b,
            lp,
            AddLiquidityParams {
                amount_a_desired: 1_000_000,
                amount_b_desired: 1_000_000,
                amount_a_min: 0,
                amount_b_min: 0,
                recipient: lp,
            },
        )?;
    }

    std::thread::scope(|scope| {
        for i in 0..4u8 {
            let ledger = ledger.clone();
            let custody = Arc::clone(&custody);
            scope.spawn(move || {
                let trader = addr(100 + i);
                let (token_in, token_out) = if i % 2 == 0 {
                    (token_a, token_b)
                } else {
                    (token_b, token_a)
                };
                for _ in 0..50 {
                    let mut guard = custody.lock();
                    ledger
                        .swap(&mut *guard, token_in, 997, token_out, 0, trader, trader)
                        .expect("swap under contention");
                }
            });
        }
    });

    // Reserves still reconcile exactly with the vault's custody balances,
    // and the invariant product never went down.
    let (reserve_a, reserve_b) = ledger.get_reserves(token_a, token_b)?;
    let vault = PoolLedger::vault_account(token_a, token_b)?;
    let custody = custody.lock();
    assert_eq!(custody.balance_of(token_a, vault), reserve_a);
    assert_eq!(custody.balance_of(token_b, vault), reserve_b);
    assert!(reserve_a * reserve_b >= 1_000_000u128 * 1_000_000);
    Ok(())
}
