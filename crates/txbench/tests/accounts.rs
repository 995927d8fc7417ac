//! Mnemonic derivation against the well-known development accounts.

use alloy_primitives::address;
use txbench::{ADMIN_ACCOUNT_INDEX, AccountDeriver};

const MNEMONIC: &str = "test test test test test test test test test test test junk";

#[test]
fn derives_development_accounts() {
    let deriver = AccountDeriver::new(MNEMONIC).unwrap();

    assert_eq!(
        deriver.address(ADMIN_ACCOUNT_INDEX).unwrap(),
        address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
    );
    assert_eq!(deriver.address(1).unwrap(), address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8"));
    assert_eq!(deriver.address(2).unwrap(), address!("0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC"));
}

#[test]
fn admin_matches_index_zero() {
    let deriver = AccountDeriver::new(MNEMONIC).unwrap();
    assert_eq!(deriver.admin().unwrap().address(), deriver.address(0).unwrap());
}

#[test]
fn rejects_invalid_phrase() {
    assert!(AccountDeriver::new("definitely not a bip39 phrase").is_err());
}
