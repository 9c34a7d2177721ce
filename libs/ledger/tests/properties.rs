//! Property tests for the ledger's stated invariants.

use proptest::prelude::*;

use reservoir_ledger::{
    AddLiquidityParams, Address, CpmmMath, Custody, MemoryCustody, PairKey, PoolLedger,
};

fn address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::new)
}

fn addr(last: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[19] = last;
    Address::new(bytes)
}

fn fund_pair(
    custody: &mut MemoryCustody,
    token_a: Address,
    token_b: Address,
    owner: Address,
    amount: u128,
) {
    let vault = PoolLedger::vault_account(token_a, token_b).unwrap();
    custody.mint(token_a, owner, amount);
    custody.mint(token_b, owner, amount);
    custody.approve(token_a, owner, vault, amount);
    custody.approve(token_b, owner, vault, amount);
}

fn seed_pool(
    ledger: &mut PoolLedger,
    custody: &mut MemoryCustody,
    token_a: Address,
    token_b: Address,
    provider: Address,
    amount_a: u128,
    amount_b: u128,
) {
    ledger
        .add_liquidity(
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
        )
        .unwrap();
}

proptest! {
    /// Pair identity never depends on argument order.
    #[test]
    fn pair_key_symmetry(a in address(), b in address()) {
        prop_assume!(a != b);
        prop_assert_eq!(PairKey::new(a, b), PairKey::new(b, a));
        prop_assert_eq!(
            PairKey::new(a, b).vault_account(),
            PairKey::new(b, a).vault_account()
        );
    }

    /// Across any sequence of valid swaps the reserve product never
    /// decreases, and caller-order reserve views stay mirror images.
    #[test]
    fn swaps_never_shrink_the_product(
        seed_a in 1_000u128..1_000_000,
        seed_b in 1_000u128..1_000_000,
        amounts in proptest::collection::vec(1u128..10_000, 1..8),
    ) {
        let (token_a, token_b) = (addr(1), addr(2));
        let (lp, trader) = (addr(10), addr(11));
        let mut ledger = PoolLedger::new();
        let mut custody = MemoryCustody::new();
        fund_pair(&mut custody, token_a, token_b, lp, 2_000_000);
        fund_pair(&mut custody, token_a, token_b, trader, 2_000_000);
        seed_pool(&mut ledger, &mut custody, token_a, token_b, lp, seed_a, seed_b);

        let mut k = seed_a * seed_b;
        for (i, amount) in amounts.iter().enumerate() {
            let (token_in, token_out) = if i % 2 == 0 {
                (token_a, token_b)
            } else {
                (token_b, token_a)
            };
            ledger
                .swap(&mut custody, token_in, *amount, token_out, 0, trader, trader)
                .unwrap();

            let (reserve_a, reserve_b) = ledger.get_reserves(token_a, token_b).unwrap();
            let (reserve_b2, reserve_a2) = ledger.get_reserves(token_b, token_a).unwrap();
            prop_assert_eq!((reserve_a, reserve_b), (reserve_a2, reserve_b2));

            let k_after = reserve_a * reserve_b;
            prop_assert!(k_after >= k);
            k = k_after;
        }
    }

    /// Depositing at the pool ratio and immediately withdrawing the minted
    /// shares returns at most the deposit (flooring losses only).
    #[test]
    fn add_remove_round_trip_never_gains(
        seed_a in 1_000u128..1_000_000,
        seed_b in 1_000u128..1_000_000,
        amount_a in 1u128..50_000,
    ) {
        let (token_a, token_b) = (addr(1), addr(2));
        let (lp1, lp2) = (addr(10), addr(11));
        let amount_b = match CpmmMath::quote(amount_a, seed_a, seed_b) {
            Ok(v) if v > 0 => v,
            _ => return Ok(()),
        };

        let mut ledger = PoolLedger::new();
        let mut custody = MemoryCustody::new();
        fund_pair(&mut custody, token_a, token_b, lp1, 2_000_000);
        // amount_b can reach amount_a * seed_b / seed_a, well past amount_a
        fund_pair(&mut custody, token_a, token_b, lp2, 100_000_000);
        seed_pool(&mut ledger, &mut custody, token_a, token_b, lp1, seed_a, seed_b);

        let added = ledger
            .add_liquidity(
                &mut custody,
                token_a,
                token_b,
                lp2,
                AddLiquidityParams {
                    amount_a_desired: amount_a,
                    amount_b_desired: amount_b,
                    amount_a_min: 0,
                    amount_b_min: 0,
                    recipient: lp2,
                },
            )
            .unwrap();
        prop_assert!(added.amount_a <= amount_a);
        prop_assert!(added.amount_b <= amount_b);

        let removed = ledger
            .remove_liquidity(
                &mut custody,
                token_a,
                token_b,
                lp2,
                added.shares,
                0,
                0,
                lp2,
            )
            .unwrap();
        prop_assert!(removed.amount_a <= added.amount_a);
        prop_assert!(removed.amount_b <= added.amount_b);
    }
}
