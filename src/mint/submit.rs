use std::{
    thread::sleep,
    time::{Duration, Instant},
};

use anchor_client::solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    system_instruction, system_program, sysvar,
    transaction::Transaction,
};
use anchor_lang::{prelude::AccountMeta, InstructionData, ToAccountMetas};
use mpl_candy_machine::{
    accounts as nft_accounts, instruction as nft_instruction, CandyMachine, WhitelistMintMode,
};
use mpl_token_metadata::ID as TOKEN_METADATA_ID;
use solana_client::rpc_client::RpcClient;
use spl_associated_token_account::{create_associated_token_account, get_associated_token_address};
use spl_token::{
    instruction::{initialize_mint, mint_to},
    ID as TOKEN_PROGRAM_ID,
};
use tracing::{debug, info, warn};

use crate::{
    candy_machine::{get_candy_machine_state, CANDY_MACHINE_ID},
    constants::{CONFIRMATION_POLL_MS, MINT_LAYOUT},
    mint::{errors::MintFailure, pdas::*},
    sale::SaleConfig,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MintOutcome {
    Success { signature: Signature, mint: Pubkey },
    Failure(MintFailure),
}

/// Sends a mint transaction for the submitting wallet.
pub trait MintSubmit {
    fn wallet(&self) -> Pubkey;

    /// `sale` is the configuration the decision to mint was taken on.
    fn submit(&self, candy_machine_id: &Pubkey, sale: &SaleConfig) -> MintOutcome;
}

pub struct RpcMinter<'a> {
    rpc: &'a RpcClient,
    payer: &'a Keypair,
    tx_timeout: Duration,
}

/// Instructions and signers of one mint, plus the instructions that clean
/// up token delegations once the mint landed.
struct MintTransaction {
    nft_mint: Keypair,
    instructions: Vec<Instruction>,
    signers: Vec<Keypair>,
    cleanup_instructions: Vec<Instruction>,
}

impl<'a> RpcMinter<'a> {
    pub fn new(rpc: &'a RpcClient, payer: &'a Keypair, tx_timeout: Duration) -> Self {
        RpcMinter {
            rpc,
            payer,
            tx_timeout,
        }
    }

    fn account_exists(&self, address: &Pubkey) -> bool {
        self.rpc
            .get_account_data(address)
            .map(|data| !data.is_empty())
            .unwrap_or(false)
    }

    fn build(
        &self,
        candy_machine_id: &Pubkey,
        candy_machine: &CandyMachine,
    ) -> Result<MintTransaction, MintFailure> {
        let payer = self.payer.pubkey();
        let nft_mint = Keypair::new();

        let min_rent = self
            .rpc
            .get_minimum_balance_for_rent_exemption(MINT_LAYOUT as usize)?;

        let mut instructions = vec![
            system_instruction::create_account(
                &payer,
                &nft_mint.pubkey(),
                min_rent,
                MINT_LAYOUT,
                &TOKEN_PROGRAM_ID,
            ),
            initialize_mint(
                &TOKEN_PROGRAM_ID,
                &nft_mint.pubkey(),
                &payer,
                Some(&payer),
                0,
            )
            .map_err(|_| MintFailure::Rejected { code: None })?,
            create_associated_token_account(&payer, &payer, &nft_mint.pubkey()),
            mint_to(
                &TOKEN_PROGRAM_ID,
                &nft_mint.pubkey(),
                &get_associated_token_address(&payer, &nft_mint.pubkey()),
                &payer,
                &[],
                1,
            )
            .map_err(|_| MintFailure::Rejected { code: None })?,
        ];

        let mut remaining_accounts: Vec<AccountMeta> = Vec::new();
        let mut signers: Vec<Keypair> = Vec::new();
        let mut cleanup_instructions: Vec<Instruction> = Vec::new();

        if let Some(whitelist) = &candy_machine.data.whitelist_mint_settings {
            let whitelist_token = get_associated_token_address(&payer, &whitelist.mint);
            remaining_accounts.push(AccountMeta::new(whitelist_token, false));

            if whitelist.mode == WhitelistMintMode::BurnEveryTime {
                let burn_authority = Keypair::new();

                remaining_accounts.push(AccountMeta::new(whitelist.mint, false));
                remaining_accounts
                    .push(AccountMeta::new_readonly(burn_authority.pubkey(), true));

                if self.account_exists(&whitelist_token) {
                    instructions.push(
                        spl_token::instruction::approve(
                            &TOKEN_PROGRAM_ID,
                            &whitelist_token,
                            &burn_authority.pubkey(),
                            &payer,
                            &[],
                            1,
                        )
                        .map_err(|_| MintFailure::Rejected { code: None })?,
                    );
                    cleanup_instructions.push(
                        spl_token::instruction::revoke(
                            &TOKEN_PROGRAM_ID,
                            &whitelist_token,
                            &payer,
                            &[],
                        )
                        .map_err(|_| MintFailure::Rejected { code: None })?,
                    );
                }

                signers.push(burn_authority);
            }
        }

        if let Some(token_mint) = candy_machine.token_mint {
            let transfer_authority = Keypair::new();
            let paying_account = get_associated_token_address(&payer, &token_mint);

            remaining_accounts.push(AccountMeta::new(paying_account, false));
            remaining_accounts.push(AccountMeta::new_readonly(
                transfer_authority.pubkey(),
                true,
            ));

            if self.account_exists(&paying_account) {
                instructions.push(
                    spl_token::instruction::approve(
                        &TOKEN_PROGRAM_ID,
                        &paying_account,
                        &transfer_authority.pubkey(),
                        &payer,
                        &[],
                        candy_machine.data.price,
                    )
                    .map_err(|_| MintFailure::Rejected { code: None })?,
                );
                cleanup_instructions.push(
                    spl_token::instruction::revoke(
                        &TOKEN_PROGRAM_ID,
                        &paying_account,
                        &payer,
                        &[],
                    )
                    .map_err(|_| MintFailure::Rejected { code: None })?,
                );
            }

            signers.push(transfer_authority);
        }

        let (candy_machine_creator, creator_bump) =
            get_candy_machine_creator_pda(candy_machine_id);

        let mut accounts = nft_accounts::MintNFT {
            candy_machine: *candy_machine_id,
            candy_machine_creator,
            payer,
            wallet: candy_machine.wallet,
            metadata: get_metadata_pda(&nft_mint.pubkey()),
            mint: nft_mint.pubkey(),
            mint_authority: payer,
            update_authority: payer,
            master_edition: get_master_edition_pda(&nft_mint.pubkey()),
            token_metadata_program: TOKEN_METADATA_ID,
            token_program: TOKEN_PROGRAM_ID,
            system_program: system_program::id(),
            rent: sysvar::rent::ID,
            clock: sysvar::clock::ID,
            recent_blockhashes: sysvar::recent_blockhashes::ID,
            instruction_sysvar_account: sysvar::instructions::ID,
        }
        .to_account_metas(None);
        accounts.extend(remaining_accounts);

        instructions.push(Instruction {
            program_id: CANDY_MACHINE_ID,
            accounts,
            data: nft_instruction::MintNft { creator_bump }.data(),
        });

        Ok(MintTransaction {
            nft_mint,
            instructions,
            signers,
            cleanup_instructions,
        })
    }

    fn send(
        &self,
        instructions: &[Instruction],
        extra: &[&Keypair],
    ) -> Result<Signature, MintFailure> {
        let mut signers: Vec<&dyn Signer> = vec![self.payer];
        signers.extend(extra.iter().map(|keypair| *keypair as &dyn Signer));

        let blockhash = self.rpc.get_latest_blockhash()?;
        let transaction = Transaction::new_signed_with_payer(
            instructions,
            Some(&self.payer.pubkey()),
            &signers,
            blockhash,
        );

        Ok(self.rpc.send_transaction(&transaction)?)
    }

    /// Polls the signature status until it settles or the timeout elapses.
    fn await_confirmation(&self, signature: &Signature) -> Result<(), MintFailure> {
        let started = Instant::now();

        while started.elapsed() < self.tx_timeout {
            match self.rpc.get_signature_status(signature) {
                Ok(Some(Ok(()))) => return Ok(()),
                Ok(Some(Err(err))) => return Err(MintFailure::from_transaction_error(&err)),
                Ok(None) => (),
                Err(err) => warn!("Signature status of {} unavailable: {}", signature, err),
            }
            sleep(Duration::from_millis(CONFIRMATION_POLL_MS));
        }

        Err(MintFailure::Timeout)
    }

    fn try_submit(
        &self,
        candy_machine_id: &Pubkey,
        sale: &SaleConfig,
    ) -> Result<(Signature, Pubkey), MintFailure> {
        if sale.gatekeeper.is_some() {
            return Err(MintFailure::GatewayRequired);
        }

        // the account may have changed since the sale was read
        let candy_machine = get_candy_machine_state(self.rpc, candy_machine_id)?;
        if candy_machine.data.gatekeeper.is_some() {
            return Err(MintFailure::GatewayRequired);
        }

        let transaction = self.build(candy_machine_id, &candy_machine)?;

        let mut extra: Vec<&Keypair> = vec![&transaction.nft_mint];
        extra.extend(transaction.signers.iter());

        let signature = self.send(&transaction.instructions, &extra)?;
        debug!("Mint transaction sent: {}", signature);

        self.await_confirmation(&signature)?;
        info!("Minted! TxId: {}", signature);

        // delegations are revoked in a separate transaction
        if !transaction.cleanup_instructions.is_empty() {
            match self.send(&transaction.cleanup_instructions, &[]) {
                Ok(cleanup) => info!("Cleanup TxId: {}", cleanup),
                Err(err) => warn!("Cleanup transaction failed: {}", err),
            }
        }

        Ok((signature, transaction.nft_mint.pubkey()))
    }
}

impl MintSubmit for RpcMinter<'_> {
    fn wallet(&self) -> Pubkey {
        self.payer.pubkey()
    }

    fn submit(&self, candy_machine_id: &Pubkey, sale: &SaleConfig) -> MintOutcome {
        match self.try_submit(candy_machine_id, sale) {
            Ok((signature, mint)) => MintOutcome::Success { signature, mint },
            Err(failure) => {
                warn!("Mint from {} failed: {:?}", candy_machine_id, failure);
                MintOutcome::Failure(failure)
            }
        }
    }
}
