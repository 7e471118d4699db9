mod common;

use anchor_lang::prelude::Pubkey;
use common::*;
use proptest::prelude::*;
use synthetic_engine::constants::MIN_HEALTH_FACTOR;

const USERS: usize = 3;

#[derive(Clone, Debug)]
enum Op {
    Deposit { user: usize, amount: u128 },
    Mint { user: usize, amount: u128 },
    Redeem { user: usize, amount: u128 },
    Burn { user: usize, amount: u128 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let user = 0..USERS;
    prop_oneof![
        (user.clone(), 1u128..=50).prop_map(|(user, amount)| Op::Deposit {
            user,
            amount: eth(amount),
        }),
        (user.clone(), 1u128..=60_000).prop_map(|(user, amount)| Op::Mint {
            user,
            amount: usd(amount),
        }),
        (user.clone(), 1u128..=50).prop_map(|(user, amount)| Op::Redeem {
            user,
            amount: eth(amount),
        }),
        (user, 1u128..=60_000).prop_map(|(user, amount)| Op::Burn {
            user,
            amount: usd(amount),
        }),
    ]
}

fn apply(fixture: &Fixture, users: &[Pubkey], op: &Op) -> anchor_lang::Result<()> {
    let weth = fixture.weth();
    match *op {
        Op::Deposit { user, amount } => fixture
            .engine
            .deposit_collateral(users[user], weth, amount),
        Op::Mint { user, amount } => fixture.engine.mint_debt(users[user], amount),
        Op::Redeem { user, amount } => fixture
            .engine
            .redeem_collateral(users[user], weth, amount),
        Op::Burn { user, amount } => fixture.engine.burn_debt(users[user], amount),
    }
}

fn user_of(op: &Op) -> usize {
    match *op {
        Op::Deposit { user, .. }
        | Op::Mint { user, .. }
        | Op::Redeem { user, .. }
        | Op::Burn { user, .. } => user,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn positions_stay_solvent(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let fixture = Fixture::new();
        let users: Vec<Pubkey> = (0..USERS).map(|_| fixture.user_with_weth(eth(1_000))).collect();

        for op in &ops {
            let user = users[user_of(op)];
            let before = fixture.engine.position(&user);

            if apply(&fixture, &users, op).is_err() {
                // Rejected operations leave the position untouched
                prop_assert_eq!(fixture.engine.position(&user), before);
            }

            for participant in &users {
                let health_factor = fixture.engine.health_factor(participant).unwrap();
                prop_assert!(health_factor >= MIN_HEALTH_FACTOR);
            }

            let total_debt = fixture.engine.total_debt().unwrap();
            let backing = fixture.engine.total_collateral_value_usd().unwrap();
            prop_assert!(total_debt * 2 <= backing);
            prop_assert_eq!(fixture.synthetic.supply(), total_debt);
            prop_assert!(!fixture.engine.is_operation_in_flight());
        }
    }

    #[test]
    fn liquidation_only_touches_unhealthy_positions(
        debt in 1_000u128..=10_000,
        price in 500i64..=3_000,
        cover in 1u128..=10_000,
    ) {
        let fixture = Fixture::new();
        let weth = fixture.weth();
        let user = fixture.user_with_weth(eth(10));
        let liquidator = fixture.user_with_weth(eth(1_000));
        fixture.engine.deposit_and_mint(user, weth, eth(10), usd(debt)).unwrap();
        fixture.engine.deposit_and_mint(liquidator, weth, eth(1_000), usd(10_000)).unwrap();

        fixture.set_weth_price(price);
        let starting = fixture.engine.health_factor(&user).unwrap();
        let before = fixture.engine.position(&user);

        match fixture.engine.liquidate(liquidator, weth, user, usd(cover.min(debt))) {
            Ok(outcome) => {
                prop_assert!(starting < MIN_HEALTH_FACTOR);
                prop_assert!(outcome.ending_health_factor > starting);
                prop_assert_eq!(
                    fixture.engine.debt_balance(&user),
                    usd(debt) - usd(cover.min(debt))
                );
            }
            Err(_) => {
                prop_assert_eq!(fixture.engine.position(&user), before);
            }
        }
    }
}
