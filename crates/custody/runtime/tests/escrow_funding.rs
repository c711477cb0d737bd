//! Funding a pool from escrow through governed withdrawals.

use custody_runtime::CustodyPool;
use custody_types::{codec, ActionStep, Amount, CustodyError, MemberId, ReceiptKind};

fn account(n: u8) -> MemberId {
    MemberId::new(format!("account-{n}"))
}

fn withdraw_payload(depositor: &MemberId, amount: u64) -> Vec<u8> {
    format!(r#"{{"depositor":"{}","amount":{}}}"#, depositor, amount).into_bytes()
}

#[test]
fn members_fund_the_pool_from_escrow() {
    let mut pool = CustodyPool::create(account(0), vec![account(9)]);

    pool.deposit(&account(0), Amount::new(1_000)).unwrap();
    pool.deposit(&account(9), Amount::new(1_000)).unwrap();
    assert_eq!(pool.deposits_of(&account(0)), Amount::new(1_000));
    assert_eq!(pool.deposits_of(&account(9)), Amount::new(1_000));

    let id = pool
        .create_action_encoded(
            &account(0),
            &[codec::WITHDRAW, codec::WITHDRAW],
            &[
                withdraw_payload(&account(0), 1_000),
                withdraw_payload(&account(9), 1_000),
            ],
        )
        .unwrap();
    pool.approve_action(&account(9), id, true).unwrap();

    let before = pool.pool_balance();
    pool.execute_action(&account(9), id).unwrap();

    assert_eq!(pool.pool_balance(), Amount::new(before.0 + 2_000));
    assert_eq!(pool.deposits_of(&account(0)), Amount::zero());
    assert_eq!(pool.deposits_of(&account(9)), Amount::zero());
    assert_eq!(pool.escrow_total(), Ok(Amount::zero()));
    assert_eq!(
        pool.journal().receipts_of_kind(ReceiptKind::EscrowWithdrawn).len(),
        2
    );
}

#[test]
fn outsiders_may_deposit_but_never_withdraw() {
    let mut pool = CustodyPool::create(account(0), vec![]);
    pool.deposit(&account(5), Amount::new(7)).unwrap();

    assert_eq!(
        pool.create_action(
            &account(5),
            vec![ActionStep::escrow_withdraw(account(5), Amount::new(7))]
        ),
        Err(CustodyError::NotAMember(account(5)))
    );
    assert_eq!(pool.deposits_of(&account(5)), Amount::new(7));
}

#[test]
fn overdrawn_escrow_aborts_the_whole_batch() {
    let mut pool = CustodyPool::create(account(0), vec![]);
    pool.deposit(&account(1), Amount::new(5)).unwrap();
    pool.deposit(&account(2), Amount::new(1)).unwrap();

    let id = pool
        .create_action(
            &account(0),
            vec![
                ActionStep::escrow_withdraw(account(1), Amount::new(5)),
                ActionStep::escrow_withdraw(account(2), Amount::new(2)),
            ],
        )
        .unwrap();

    assert_eq!(
        pool.execute_action(&account(0), id),
        Err(CustodyError::InsufficientEscrowBalance {
            depositor: account(2),
            required: Amount::new(2),
            available: Amount::new(1),
        })
    );
    assert_eq!(pool.deposits_of(&account(1)), Amount::new(5));
    assert_eq!(pool.pool_balance(), Amount::zero());
    assert_eq!(pool.escrow_total(), Ok(Amount::new(6)));
}

#[test]
fn withdrawn_value_can_be_paid_out_in_the_same_batch() {
    let mut pool = CustodyPool::create(account(0), vec![]);
    pool.deposit(&account(3), Amount::new(40)).unwrap();

    let id = pool
        .create_action(
            &account(0),
            vec![
                ActionStep::escrow_withdraw(account(3), Amount::new(40)),
                ActionStep::transfer(account(6), Amount::new(25)),
            ],
        )
        .unwrap();
    pool.execute_action(&account(0), id).unwrap();

    assert_eq!(pool.pool_balance(), Amount::new(15));
    assert_eq!(pool.paid_to(&account(6)), Amount::new(25));
}
