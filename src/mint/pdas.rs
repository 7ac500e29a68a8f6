use anchor_client::solana_sdk::pubkey::Pubkey;
use mpl_token_metadata::ID as TOKEN_METADATA_ID;

use crate::candy_machine::CANDY_MACHINE_ID;

pub fn get_metadata_pda(mint: &Pubkey) -> Pubkey {
    let metadata_seeds = &[
        "metadata".as_bytes(),
        &TOKEN_METADATA_ID.to_bytes(),
        &mint.to_bytes(),
    ];
    let (pda, _bump) = Pubkey::find_program_address(metadata_seeds, &TOKEN_METADATA_ID);

    pda
}

pub fn get_master_edition_pda(mint: &Pubkey) -> Pubkey {
    let master_edition_seeds = &[
        "metadata".as_bytes(),
        &TOKEN_METADATA_ID.to_bytes(),
        &mint.to_bytes(),
        "edition".as_bytes(),
    ];
    let (pda, _bump) = Pubkey::find_program_address(master_edition_seeds, &TOKEN_METADATA_ID);

    pda
}

pub fn get_candy_machine_creator_pda(candy_machine_id: &Pubkey) -> (Pubkey, u8) {
    let creator_seeds = &["candy_machine".as_bytes(), candy_machine_id.as_ref()];

    Pubkey::find_program_address(creator_seeds, &CANDY_MACHINE_ID)
}
