//! Program-derived addresses used by launches.

use solana_sdk::pubkey::Pubkey;

pub const METADATA_SEED: &[u8] = b"metadata";
pub const BONDING_CURVE_SEED: &[u8] = b"bonding-curve";
pub const LEGACY_CURVE_SEED: &[u8] = b"curve";

/// Metaplex metadata account for `mint`
pub fn metadata_pda(mint: &Pubkey, metadata_program: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[METADATA_SEED, metadata_program.as_ref(), mint.as_ref()],
        metadata_program,
    )
    .0
}

/// Bonding curve state account for `mint`
pub fn bonding_curve_pda(mint: &Pubkey, curve_program: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[BONDING_CURVE_SEED, mint.as_ref()], curve_program).0
}

/// Curve address under the older `curve` seed
pub fn curve_pda(mint: &Pubkey, curve_program: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[LEGACY_CURVE_SEED, mint.as_ref()], curve_program).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::constants::{BONDING_CURVE_PROGRAM_ID, METADATA_PROGRAM_ID};
    use std::str::FromStr;

    #[test]
    fn test_pdas_are_deterministic_and_distinct() {
        let mint = Pubkey::new_unique();
        let metadata_program = Pubkey::from_str(METADATA_PROGRAM_ID).unwrap();
        let curve_program = Pubkey::from_str(BONDING_CURVE_PROGRAM_ID).unwrap();

        assert_eq!(
            metadata_pda(&mint, &metadata_program),
            metadata_pda(&mint, &metadata_program)
        );

        let curve = bonding_curve_pda(&mint, &curve_program);
        let legacy = curve_pda(&mint, &curve_program);
        assert_ne!(curve, legacy);
        assert!(!curve.is_on_curve());
        assert!(!metadata_pda(&mint, &metadata_program).is_on_curve());
    }

    #[test]
    fn test_pdas_depend_on_mint() {
        let program = Pubkey::new_unique();
        let a = bonding_curve_pda(&Pubkey::new_unique(), &program);
        let b = bonding_curve_pda(&Pubkey::new_unique(), &program);
        assert_ne!(a, b);
    }
}
