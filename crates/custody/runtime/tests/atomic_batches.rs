//! Batch atomicity and quorum properties.

use custody_runtime::CustodyPool;
use custody_types::{ActionState, ActionStep, Amount, CustodyError, MemberId};
use proptest::prelude::*;

fn member(n: usize) -> MemberId {
    MemberId::new(format!("member-{n}"))
}

#[test]
fn failing_step_discards_earlier_steps() {
    let mut pool = CustodyPool::create(member(0), vec![member(1)]);
    pool.receive(&member(9), Amount::new(100)).unwrap();

    let id = pool
        .create_action(
            &member(0),
            vec![
                ActionStep::add_member(member(2)),
                ActionStep::transfer(member(9), Amount::new(60)),
                ActionStep::transfer(member(9), Amount::new(60)),
            ],
        )
        .unwrap();
    pool.approve_action(&member(1), id, true).unwrap();
    let receipts_before = pool.receipts().len();

    assert_eq!(
        pool.execute_action(&member(1), id),
        Err(CustodyError::InsufficientPoolBalance {
            required: Amount::new(60),
            available: Amount::new(40),
        })
    );
    assert!(!pool.is_member(&member(2)));
    assert_eq!(pool.pool_balance(), Amount::new(100));
    assert_eq!(pool.paid_to(&member(9)), Amount::zero());
    assert_eq!(pool.get_action_info(id).unwrap().state, ActionState::Created);
    assert_eq!(pool.receipts().len(), receipts_before);

    // Retry succeeds once the pool is topped up
    pool.receive(&member(9), Amount::new(20)).unwrap();
    pool.execute_action(&member(1), id).unwrap();
    assert!(pool.is_member(&member(2)));
    assert_eq!(pool.pool_balance(), Amount::zero());
    assert_eq!(pool.paid_to(&member(9)), Amount::new(120));
}

#[test]
fn later_steps_see_membership_changes_of_earlier_steps() {
    let mut pool = CustodyPool::create(member(0), vec![]);
    let id = pool
        .create_action(
            &member(0),
            vec![
                ActionStep::add_member(member(1)),
                ActionStep::remove_member(member(0)),
            ],
        )
        .unwrap();
    pool.execute_action(&member(0), id).unwrap();
    assert_eq!(pool.members(), &[member(1)]);
}

proptest! {
    /// An action executes only once every current member has said yes.
    #[test]
    fn execution_requires_unanimity(
        size in 1usize..6,
        votes in prop::collection::vec(any::<bool>(), 6),
    ) {
        let others: Vec<MemberId> = (1..size).map(member).collect();
        let mut pool = CustodyPool::create(member(0), others.clone());
        let id = pool
            .create_action(&member(0), vec![ActionStep::add_member(member(99))])
            .unwrap();

        for (i, who) in others.iter().enumerate() {
            pool.approve_action(who, id, votes[i]).unwrap();
        }
        let unanimous = votes.iter().take(others.len()).all(|v| *v);

        prop_assert_eq!(pool.is_action_approved(id), unanimous);
        let result = pool.execute_action(&member(0), id);
        if unanimous {
            prop_assert!(result.is_ok());
            prop_assert_eq!(pool.total_members(), size + 1);
        } else {
            prop_assert_eq!(result, Err(CustodyError::NotApproved(id)));
            prop_assert_eq!(pool.total_members(), size);
        }
    }

    /// Value is conserved across deposits, withdrawals and payouts,
    /// whether or not a batch succeeds.
    #[test]
    fn value_is_conserved(
        deposits in prop::collection::vec(1u64..1_000, 1..5),
        withdraw in prop::collection::vec(1u64..1_500, 1..5),
        payout in 1u64..3_000,
    ) {
        let mut pool = CustodyPool::create(member(0), vec![]);
        for (i, amount) in deposits.iter().enumerate() {
            pool.deposit(&member(10 + i), Amount::new(*amount)).unwrap();
        }
        let total_in: u64 = deposits.iter().sum();

        let mut steps: Vec<ActionStep> = withdraw
            .iter()
            .enumerate()
            .map(|(i, amount)| ActionStep::escrow_withdraw(member(10 + i), Amount::new(*amount)))
            .collect();
        steps.push(ActionStep::transfer(member(50), Amount::new(payout)));
        let id = pool.create_action(&member(0), steps).unwrap();

        let executed = pool.execute_action(&member(0), id).is_ok();
        let escrowed = pool.escrow_total().unwrap().0;
        let held = escrowed + pool.pool_balance().0 + pool.paid_to(&member(50)).0;
        prop_assert_eq!(held, total_in);
        if !executed {
            prop_assert_eq!(escrowed, total_in);
            prop_assert_eq!(pool.pool_balance(), Amount::zero());
        }
    }
}
