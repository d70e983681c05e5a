#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use soroban_sdk::testutils::{Address as _, Ledger};
use soroban_sdk::{token, Address, Env};
use staking::{StakingContract, StakingContractClient};

const T0: u64 = 1_000_000;

#[derive(Arbitrary, Debug)]
enum Action {
    Stake { who: u8, amount: u32 },
    Withdraw { who: u8, amount: u32 },
    Claim { who: u8 },
    Exit { who: u8 },
    Fund { amount: u32 },
    NewPeriod { delay: u16, length: u16 },
    Pause,
    Unpause,
    Advance { seconds: u16 },
}

#[derive(Arbitrary, Debug)]
struct Input {
    period_length: u16,
    actions: Vec<Action>,
}

// Drive the deployed contract with arbitrary call sequences and check that
// custody always matches the books.
fuzz_target!(|input: Input| {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(T0);

    let owner = Address::generate(&env);
    let staking_id = env
        .register_stellar_asset_contract_v2(owner.clone())
        .address();
    let rewards_id = env
        .register_stellar_asset_contract_v2(owner.clone())
        .address();
    let contract_id = env.register(StakingContract, ());
    let client = StakingContractClient::new(&env, &contract_id);

    let period = (T0, T0 + 1 + u64::from(input.period_length));
    client.initialize(&owner, &staking_id, &rewards_id, &Some(period));

    let staking = token::Client::new(&env, &staking_id);
    let rewards = token::Client::new(&env, &rewards_id);
    token::StellarAssetClient::new(&env, &rewards_id).mint(&owner, &i128::from(u64::MAX));

    let stakers: [Address; 3] = core::array::from_fn(|_| Address::generate(&env));
    let staking_sac = token::StellarAssetClient::new(&env, &staking_id);
    for s in &stakers {
        staking_sac.mint(s, &i128::from(u64::MAX));
    }

    let mut now = T0;
    for action in input.actions.iter().take(64) {
        match *action {
            Action::Stake { who, amount } => {
                let _ = client.try_stake(&stakers[who as usize % 3], &i128::from(amount));
            }
            Action::Withdraw { who, amount } => {
                let _ = client.try_withdraw(&stakers[who as usize % 3], &i128::from(amount));
            }
            Action::Claim { who } => {
                let _ = client.try_get_reward(&stakers[who as usize % 3]);
            }
            Action::Exit { who } => {
                let _ = client.try_exit(&stakers[who as usize % 3]);
            }
            Action::Fund { amount } => {
                let _ = client.try_add_to_rewards_allocation(&owner, &i128::from(amount));
            }
            Action::NewPeriod { delay, length } => {
                let start = now + u64::from(delay);
                let _ = client.try_set_new_period(&owner, &start, &(start + u64::from(length)));
            }
            Action::Pause => {
                let _ = client.try_pause(&owner);
            }
            Action::Unpause => {
                let _ = client.try_unpause(&owner);
            }
            Action::Advance { seconds } => {
                now += u64::from(seconds);
                env.ledger().set_timestamp(now);
            }
        }

        let total_staked = client.total_staked();
        let staked_sum: i128 = stakers.iter().map(|s| client.balance_of(s)).sum();
        assert_eq!(total_staked, staked_sum);
        assert_eq!(staking.balance(&contract_id), total_staked);

        let funded = client.total_funded();
        let paid = client.total_paid();
        assert_eq!(rewards.balance(&contract_id), funded - paid);

        let owed: i128 = stakers.iter().map(|s| client.earned(s)).sum();
        assert!(paid + owed <= funded, "paid {paid} + owed {owed} > funded {funded}");
    }
});
