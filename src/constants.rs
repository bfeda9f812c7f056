//! Well-known program ids and PDA seeds for the candy-machine v2 ecosystem.

use solana_sdk::pubkey::Pubkey;

/// Candy machine v2 program.
pub const CANDY_MACHINE_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("cndy3Z4yapfJBmL3ShUp5exZKqR3z33thTzeNMm2gRZ");

/// Metaplex token-metadata program.
pub const TOKEN_METADATA_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

/// Civic gateway program, issuer of gatekeeper proof tokens.
pub const CIVIC_GATEWAY_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("gatem74V238djXdzWnJf94Wo1DcnuGkfijbf3AuBhfs");

/// Seed prefix of the candy-machine creator PDA.
pub const CANDY_MACHINE_PREFIX: &str = "candy_machine";

/// Seed prefix of token-metadata PDAs.
pub const METADATA_PREFIX: &str = "metadata";

/// Seed suffix of the master-edition PDA.
pub const EDITION_SUFFIX: &str = "edition";

/// Seed of civic gateway token PDAs.
pub const GATEWAY_SEED: &str = "gateway";

/// Metadata PDA for a mint: `["metadata", token_metadata_program, mint]`.
pub fn metadata_address(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[
            METADATA_PREFIX.as_bytes(),
            TOKEN_METADATA_PROGRAM_ID.as_ref(),
            mint.as_ref(),
        ],
        &TOKEN_METADATA_PROGRAM_ID,
    )
    .0
}

/// Master-edition PDA for a mint: metadata seeds plus `"edition"`.
pub fn master_edition_address(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[
            METADATA_PREFIX.as_bytes(),
            TOKEN_METADATA_PROGRAM_ID.as_ref(),
            mint.as_ref(),
            EDITION_SUFFIX.as_bytes(),
        ],
        &TOKEN_METADATA_PROGRAM_ID,
    )
    .0
}

/// Creator PDA plus bump for a candy machine account.
pub fn candy_machine_creator_address(candy_machine: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[CANDY_MACHINE_PREFIX.as_bytes(), candy_machine.as_ref()],
        &CANDY_MACHINE_PROGRAM_ID,
    )
}

/// Civic gateway token PDA for an owner under a gatekeeper network.
pub fn gateway_token_address(owner: &Pubkey, gatekeeper_network: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[
            owner.as_ref(),
            GATEWAY_SEED.as_bytes(),
            &[0u8; 8],
            gatekeeper_network.as_ref(),
        ],
        &CIVIC_GATEWAY_PROGRAM_ID,
    )
    .0
}
