//! Escrow deposit/withdraw scenarios against the wired protocol.

use zkauction_protocol::ProtocolError;
use zkauction_test_fixtures::{participants, prove_membership, TestWorld};

#[test]
fn deposits_accumulate_into_one_leaf() {
    let mut world = TestWorld::quick();
    let mut people = participants(1, 1);
    let p = &mut people[0];
    world.assets.mint(p.actor, 10_000);

    let record = world
        .protocol
        .deposit(p.actor, p.commitment(), 1000)
        .unwrap();
    assert_eq!(record.index, 0);
    assert_eq!(record.previous_balance, 0);
    assert_eq!(world.assets.balance_of(p.actor), 9_000);
    assert_eq!(world.assets.balance_of(world.vault), 1000);

    let (index, siblings) = world.protocol.escrow_proof(&p.commitment()).unwrap();
    let record = world
        .protocol
        .deposit_existing(p.actor, p.commitment(), 1000, 500, &siblings)
        .unwrap();
    assert_eq!(record.previous_balance, 1000);
    assert_eq!(record.index, index);
    assert_eq!(world.assets.balance_of(world.vault), 1500);
    assert_eq!(world.protocol.escrow_index_of(&p.commitment()), Some(0));
}

#[test]
fn deposit_existing_rejects_wrong_claimed_balance() {
    let mut world = TestWorld::quick();
    let mut people = participants(2, 1);
    let p = &mut people[0];
    world.assets.mint(p.actor, 2_000);
    world
        .protocol
        .deposit(p.actor, p.commitment(), 1000)
        .unwrap();

    let (_, siblings) = world.protocol.escrow_proof(&p.commitment()).unwrap();
    assert!(matches!(
        world
            .protocol
            .deposit_existing(p.actor, p.commitment(), 999, 500, &siblings),
        Err(ProtocolError::NotFound(_))
    ));
}

#[test]
fn withdraw_round_trip_restores_external_balance() {
    let mut world = TestWorld::quick();
    let mut people = participants(3, 2);
    let receiver = people[1].actor;
    let p = &mut people[0];
    world.assets.mint(p.actor, 1000);
    world
        .protocol
        .deposit(p.actor, p.commitment(), 1000)
        .unwrap();

    let (index, siblings) = world.protocol.escrow_proof(&p.commitment()).unwrap();
    let nonce = p.next_nonce();
    let proof = prove_membership(
        &p.identity,
        nonce,
        1000,
        receiver,
        index,
        &siblings,
        world.protocol.escrow_root(),
    )
    .unwrap();
    world
        .protocol
        .withdraw(
            nonce,
            1000,
            10,
            receiver,
            p.commitment(),
            proof.signal,
            &siblings,
            &proof.proof,
        )
        .unwrap();

    let (index, siblings) = world.protocol.escrow_proof(&p.commitment()).unwrap();
    let nonce = p.next_nonce();
    let proof = prove_membership(
        &p.identity,
        nonce,
        990,
        receiver,
        index,
        &siblings,
        world.protocol.escrow_root(),
    )
    .unwrap();
    world
        .protocol
        .withdraw(
            nonce,
            990,
            990,
            receiver,
            p.commitment(),
            proof.signal,
            &siblings,
            &proof.proof,
        )
        .unwrap();

    assert_eq!(world.assets.balance_of(receiver), 1000);
    assert_eq!(world.assets.balance_of(world.vault), 0);

    // The zero-balance leaf persists; deposits against it keep working.
    world.assets.mint(p.actor, 5);
    let (_, siblings) = world.protocol.escrow_proof(&p.commitment()).unwrap();
    let record = world
        .protocol
        .deposit_existing(p.actor, p.commitment(), 0, 5, &siblings)
        .unwrap();
    assert_eq!(record.previous_balance, 0);
    assert_eq!(record.index, 0);
}

#[test]
fn overdraw_is_rejected_before_the_verifier_runs() {
    let mut world = TestWorld::quick();
    let mut people = participants(4, 1);
    let p = &mut people[0];
    world.assets.mint(p.actor, 1000);
    world
        .protocol
        .deposit(p.actor, p.commitment(), 1000)
        .unwrap();

    let (_, siblings) = world.protocol.escrow_proof(&p.commitment()).unwrap();
    let err = world
        .protocol
        .withdraw(
            0,
            1000,
            1001,
            p.actor,
            p.commitment(),
            zkauction_common::Fr::from(1u64),
            &siblings,
            b"junk",
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::InsufficientBalance {
            balance: 1000,
            amount: 1001
        }
    ));
}

#[test]
fn reusing_a_nonce_is_rejected() {
    let mut world = TestWorld::quick();
    let mut people = participants(5, 1);
    let p = &mut people[0];
    world.assets.mint(p.actor, 1000);
    world
        .protocol
        .deposit(p.actor, p.commitment(), 1000)
        .unwrap();

    let (index, siblings) = world.protocol.escrow_proof(&p.commitment()).unwrap();
    let nonce = p.next_nonce();
    let proof = prove_membership(
        &p.identity,
        nonce,
        1000,
        p.actor,
        index,
        &siblings,
        world.protocol.escrow_root(),
    )
    .unwrap();
    world
        .protocol
        .withdraw(
            nonce,
            1000,
            10,
            p.actor,
            p.commitment(),
            proof.signal,
            &siblings,
            &proof.proof,
        )
        .unwrap();

    // Same nonce, fresh proof over the new state: the signal is already
    // consumed.
    let (index, siblings) = world.protocol.escrow_proof(&p.commitment()).unwrap();
    let proof = prove_membership(
        &p.identity,
        nonce,
        990,
        p.actor,
        index,
        &siblings,
        world.protocol.escrow_root(),
    )
    .unwrap();
    assert!(matches!(
        world.protocol.withdraw(
            nonce,
            990,
            10,
            p.actor,
            p.commitment(),
            proof.signal,
            &siblings,
            &proof.proof,
        ),
        Err(ProtocolError::ReplayedNonce)
    ));
}

#[test]
fn forged_proof_bytes_are_rejected() {
    let mut world = TestWorld::quick();
    let mut people = participants(6, 1);
    let p = &mut people[0];
    world.assets.mint(p.actor, 1000);
    world
        .protocol
        .deposit(p.actor, p.commitment(), 1000)
        .unwrap();

    let (index, siblings) = world.protocol.escrow_proof(&p.commitment()).unwrap();
    let nonce = p.next_nonce();
    let proof = prove_membership(
        &p.identity,
        nonce,
        1000,
        p.actor,
        index,
        &siblings,
        world.protocol.escrow_root(),
    )
    .unwrap();

    let mut forged = proof.proof.clone();
    forged[0] ^= 0x01;
    assert!(matches!(
        world.protocol.withdraw(
            nonce,
            1000,
            10,
            p.actor,
            p.commitment(),
            proof.signal,
            &siblings,
            &forged,
        ),
        Err(ProtocolError::InvalidProof)
    ));
}

#[test]
fn stale_proofs_fail_and_regenerated_proofs_succeed() {
    // Window of 4 roots; five later mutations evict the captured anchor.
    let mut world = TestWorld::quick();
    let mut people = participants(7, 6);

    for person in people.iter() {
        world.assets.mint(person.actor, 1_000_000);
    }
    let commitment = people[0].commitment();
    world
        .protocol
        .deposit(people[0].actor, commitment, 1000)
        .unwrap();

    // Captured against the current root, then aged past the window.
    let (index, old_siblings) = world.protocol.escrow_proof(&commitment).unwrap();
    let old_root = world.protocol.escrow_root();
    for person in people.iter().skip(1) {
        world
            .protocol
            .deposit(person.actor, person.commitment(), 10)
            .unwrap();
    }
    assert!(!world.protocol.escrow_history().contains(&old_root));

    let p = &mut people[0];
    let nonce = p.next_nonce();
    let proof =
        prove_membership(&p.identity, nonce, 1000, p.actor, index, &old_siblings, old_root)
            .unwrap();
    assert!(matches!(
        world.protocol.withdraw(
            nonce,
            1000,
            10,
            p.actor,
            commitment,
            proof.signal,
            &old_siblings,
            &proof.proof,
        ),
        Err(ProtocolError::StaleRoot)
    ));

    // Regenerate against the live tree and retry with the same nonce.
    let (index, siblings) = world.protocol.escrow_proof(&commitment).unwrap();
    let proof = prove_membership(
        &p.identity,
        nonce,
        1000,
        p.actor,
        index,
        &siblings,
        world.protocol.escrow_root(),
    )
    .unwrap();
    world
        .protocol
        .withdraw(
            nonce,
            1000,
            10,
            p.actor,
            commitment,
            proof.signal,
            &siblings,
            &proof.proof,
        )
        .unwrap();
}
