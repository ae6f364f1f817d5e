//! Launch Transaction Builder
//!
//! Assembles the mint, metadata and initial supply instructions for a new
//! token. The platform wallet pays fees and rent in both launch flavours.
//!
//! - user launch: the creator is mint authority and co-signs client-side
//! - curve launch: the platform is mint authority, supply goes to the
//!   bonding curve's token account and the transaction is sent server-side

use base64::Engine;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::program_pack::Pack;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::system_instruction;
use solana_sdk::transaction::Transaction;
use spl_associated_token_account::get_associated_token_address;
use spl_associated_token_account::instruction::create_associated_token_account;

use super::metadata::{
    create_metadata_accounts_v3, CreateMetadataAccountArgsV3, DataV2, MetadataAccounts,
};
use super::pda::{bonding_curve_pda, metadata_pda};
use super::LaunchError;
use crate::domain::constants::{CURVE_LAUNCH_SUPPLY, TOKEN_DECIMALS, USER_LAUNCH_SUPPLY};
use crate::domain::token::LaunchMetadata;

/// Size of an SPL mint account
pub fn mint_account_len() -> usize {
    spl_token::state::Mint::LEN
}

/// A curve launch ready for submission
#[derive(Debug)]
pub struct CurveLaunch {
    pub transaction: Transaction,
    pub bonding_curve: Pubkey,
}

pub struct LaunchTransactionBuilder<'a> {
    platform: &'a Keypair,
    metadata_program: Pubkey,
    curve_program: Pubkey,
}

impl<'a> LaunchTransactionBuilder<'a> {
    pub fn new(platform: &'a Keypair, metadata_program: Pubkey, curve_program: Pubkey) -> Self {
        Self {
            platform,
            metadata_program,
            curve_program,
        }
    }

    /// Mint account creation, mint initialization and metadata
    fn mint_instructions(
        &self,
        mint: &Pubkey,
        mint_authority: &Pubkey,
        creator: &Pubkey,
        metadata: &LaunchMetadata,
        mint_rent: u64,
    ) -> Result<Vec<Instruction>, LaunchError> {
        let payer = self.platform.pubkey();

        let create_mint = system_instruction::create_account(
            &payer,
            mint,
            mint_rent,
            mint_account_len() as u64,
            &spl_token::id(),
        );

        let init_mint = spl_token::instruction::initialize_mint(
            &spl_token::id(),
            mint,
            mint_authority,
            None,
            TOKEN_DECIMALS,
        )
        .map_err(|e| LaunchError::Instruction(e.to_string()))?;

        let args = CreateMetadataAccountArgsV3 {
            data: DataV2::for_launch(
                metadata.onchain_name(),
                metadata.onchain_symbol(),
                metadata.uri(),
                creator,
            ),
            is_mutable: true,
            collection_details: None,
        };
        let accounts = MetadataAccounts {
            metadata: metadata_pda(mint, &self.metadata_program),
            mint: *mint,
            mint_authority: *mint_authority,
            payer,
            update_authority: *mint_authority,
        };
        let create_metadata = create_metadata_accounts_v3(&self.metadata_program, accounts, &args)
            .map_err(|e| LaunchError::Serialization(e.to_string()))?;

        Ok(vec![create_mint, init_mint, create_metadata])
    }

    /// Token creation for a user wallet.
    ///
    /// The full supply is minted to the user's associated token account. The
    /// returned transaction carries the platform and mint signatures; the
    /// user's signature slot is left empty.
    pub fn user_launch(
        &self,
        mint: &Keypair,
        user: &Pubkey,
        metadata: &LaunchMetadata,
        mint_rent: u64,
        blockhash: Hash,
    ) -> Result<Transaction, LaunchError> {
        let payer = self.platform.pubkey();
        let mint_key = mint.pubkey();
        let user_ata = get_associated_token_address(user, &mint_key);

        let mut instructions = self.mint_instructions(&mint_key, user, user, metadata, mint_rent)?;
        instructions.push(create_associated_token_account(
            &payer,
            user,
            &mint_key,
            &spl_token::id(),
        ));
        instructions.push(
            spl_token::instruction::mint_to(
                &spl_token::id(),
                &mint_key,
                &user_ata,
                user,
                &[],
                USER_LAUNCH_SUPPLY,
            )
            .map_err(|e| LaunchError::Instruction(e.to_string()))?,
        );

        let mut transaction = Transaction::new_with_payer(&instructions, Some(&payer));
        transaction
            .try_partial_sign(&[self.platform, mint], blockhash)
            .map_err(|e| LaunchError::Signing(e.to_string()))?;

        Ok(transaction)
    }

    /// Token creation seeded into the bonding curve, fully signed
    pub fn curve_launch(
        &self,
        mint: &Keypair,
        creator: &Pubkey,
        metadata: &LaunchMetadata,
        mint_rent: u64,
        blockhash: Hash,
    ) -> Result<CurveLaunch, LaunchError> {
        let payer = self.platform.pubkey();
        let mint_key = mint.pubkey();
        let bonding_curve = bonding_curve_pda(&mint_key, &self.curve_program);
        let curve_ata = get_associated_token_address(&bonding_curve, &mint_key);

        let mut instructions =
            self.mint_instructions(&mint_key, &payer, creator, metadata, mint_rent)?;
        instructions.push(create_associated_token_account(
            &payer,
            &bonding_curve,
            &mint_key,
            &spl_token::id(),
        ));
        instructions.push(
            spl_token::instruction::mint_to(
                &spl_token::id(),
                &mint_key,
                &curve_ata,
                &payer,
                &[],
                CURVE_LAUNCH_SUPPLY,
            )
            .map_err(|e| LaunchError::Instruction(e.to_string()))?,
        );

        let mut transaction = Transaction::new_with_payer(&instructions, Some(&payer));
        transaction
            .try_sign(&[self.platform, mint], blockhash)
            .map_err(|e| LaunchError::Signing(e.to_string()))?;

        Ok(CurveLaunch {
            transaction,
            bonding_curve,
        })
    }
}

/// Wire-encode a transaction as base64, missing signatures included as zeroes
pub fn serialize_transaction(transaction: &Transaction) -> Result<String, LaunchError> {
    let bytes =
        bincode::serialize(transaction).map_err(|e| LaunchError::Serialization(e.to_string()))?;
    Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
}
