//! Metaplex Token Metadata Instruction
//!
//! Borsh encoding of `CreateMetadataAccountV3`. Only the fields a launch
//! sets are modelled; optional sections are always written as `None`.

use borsh::BorshSerialize;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;

/// Instruction index of `CreateMetadataAccountV3` in the metadata program
pub const CREATE_METADATA_ACCOUNT_V3: u8 = 33;

#[derive(Debug, Clone, PartialEq, BorshSerialize)]
pub struct Creator {
    pub address: [u8; 32],
    pub verified: bool,
    pub share: u8,
}

#[derive(Debug, Clone, PartialEq, BorshSerialize)]
pub struct Collection {
    pub verified: bool,
    pub key: [u8; 32],
}

#[derive(Debug, Clone, PartialEq, BorshSerialize)]
pub enum UseMethod {
    Burn,
    Multiple,
    Single,
}

#[derive(Debug, Clone, PartialEq, BorshSerialize)]
pub struct Uses {
    pub use_method: UseMethod,
    pub remaining: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, BorshSerialize)]
pub enum CollectionDetails {
    V1 { size: u64 },
}

#[derive(Debug, Clone, PartialEq, BorshSerialize)]
pub struct DataV2 {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Option<Vec<Creator>>,
    pub collection: Option<Collection>,
    pub uses: Option<Uses>,
}

impl DataV2 {
    /// Launch metadata: no royalties, the creator listed unverified with 100% share
    pub fn for_launch(name: &str, symbol: &str, uri: &str, creator: &Pubkey) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            uri: uri.to_string(),
            seller_fee_basis_points: 0,
            creators: Some(vec![Creator {
                address: creator.to_bytes(),
                verified: false,
                share: 100,
            }]),
            collection: None,
            uses: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, BorshSerialize)]
pub struct CreateMetadataAccountArgsV3 {
    pub data: DataV2,
    pub is_mutable: bool,
    pub collection_details: Option<CollectionDetails>,
}

/// Accounts of a `CreateMetadataAccountV3` call
#[derive(Debug, Clone, Copy)]
pub struct MetadataAccounts {
    pub metadata: Pubkey,
    pub mint: Pubkey,
    pub mint_authority: Pubkey,
    pub payer: Pubkey,
    pub update_authority: Pubkey,
}

/// Build the instruction; the update authority is not required to sign
pub fn create_metadata_accounts_v3(
    program_id: &Pubkey,
    accounts: MetadataAccounts,
    args: &CreateMetadataAccountArgsV3,
) -> Result<Instruction, std::io::Error> {
    let mut data = vec![CREATE_METADATA_ACCOUNT_V3];
    args.serialize(&mut data)?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(accounts.metadata, false),
            AccountMeta::new_readonly(accounts.mint, false),
            AccountMeta::new_readonly(accounts.mint_authority, true),
            AccountMeta::new(accounts.payer, true),
            AccountMeta::new_readonly(accounts.update_authority, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data,
    })
}
