//! Sale-configuration account decoder.
//!
//! The on-chain record is Anchor-encoded: an 8-byte account discriminator
//! followed by borsh fields, then config-line data and a claim bitmask we
//! explicitly never deserialize. Decoding goes through raw wire structs and
//! converts into the typed [`SaleConfig`]; truncated or mismatched input is
//! rejected, never defaulted.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::hash::hash;
use solana_sdk::pubkey::Pubkey;

use crate::errors::DecodeError;
use crate::types::{EndCondition, SaleConfig, WhitelistConfig, WhitelistMode};

const DISCRIMINATOR_LEN: usize = 8;

/// Anchor account discriminator: `sha256("account:CandyMachine")[..8]`.
fn sale_account_discriminator() -> [u8; 8] {
    let digest = hash(b"account:CandyMachine").to_bytes();
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&digest[..8]);
    discriminator
}

// Wire-layout structs. Field order is the candy-machine v2 account layout and
// must not be rearranged. Keys stay as byte arrays here and become `Pubkey`
// only in the typed config.

#[derive(BorshSerialize, BorshDeserialize)]
struct RawSaleAccount {
    authority: [u8; 32],
    wallet: [u8; 32],
    token_mint: Option<[u8; 32]>,
    items_redeemed: u64,
    data: RawSaleData,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct RawSaleData {
    uuid: String,
    price: u64,
    symbol: String,
    seller_fee_basis_points: u16,
    max_supply: u64,
    is_mutable: bool,
    retain_authority: bool,
    go_live_date: Option<i64>,
    end_settings: Option<RawEndSettings>,
    creators: Vec<RawCreator>,
    hidden_settings: Option<RawHiddenSettings>,
    whitelist_mint_settings: Option<RawWhitelistSettings>,
    items_available: u64,
    gatekeeper: Option<RawGatekeeperConfig>,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct RawEndSettings {
    end_setting_type: RawEndSettingType,
    number: u64,
}

#[derive(BorshSerialize, BorshDeserialize)]
enum RawEndSettingType {
    Date,
    Amount,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct RawCreator {
    address: [u8; 32],
    verified: bool,
    share: u8,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct RawHiddenSettings {
    name: String,
    uri: String,
    hash: [u8; 32],
}

#[derive(BorshSerialize, BorshDeserialize)]
struct RawWhitelistSettings {
    mode: RawWhitelistMode,
    mint: [u8; 32],
    presale: bool,
    discount_price: Option<u64>,
}

#[derive(BorshSerialize, BorshDeserialize)]
enum RawWhitelistMode {
    BurnEveryTime,
    NeverBurn,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct RawGatekeeperConfig {
    gatekeeper_network: [u8; 32],
    expire_on_use: bool,
}

/// Encodes a typed config back into account bytes, with neutral placeholder
/// values for the metadata fields the typed config does not carry. The engine
/// itself only decodes; this exists for fixtures and local tooling.
pub fn encode_sale_config(config: &SaleConfig) -> Result<Vec<u8>, borsh::io::Error> {
    let raw = RawSaleAccount {
        authority: config.authority.to_bytes(),
        wallet: config.treasury_wallet.to_bytes(),
        token_mint: config.payment_mint.map(|k| k.to_bytes()),
        items_redeemed: config.items_redeemed,
        data: RawSaleData {
            uuid: "000000".to_string(),
            price: config.price,
            symbol: "ITEM".to_string(),
            seller_fee_basis_points: 0,
            max_supply: 0,
            is_mutable: true,
            retain_authority: true,
            go_live_date: config.go_live_time,
            end_settings: config.end_condition.map(|ec| match ec {
                EndCondition::Date(t) => RawEndSettings {
                    end_setting_type: RawEndSettingType::Date,
                    number: t as u64,
                },
                EndCondition::ItemLimit(n) => RawEndSettings {
                    end_setting_type: RawEndSettingType::Amount,
                    number: n,
                },
            }),
            creators: Vec::new(),
            hidden_settings: None,
            whitelist_mint_settings: config.whitelist.as_ref().map(|w| RawWhitelistSettings {
                mode: match w.mode {
                    WhitelistMode::BurnEveryTime => RawWhitelistMode::BurnEveryTime,
                    WhitelistMode::NeverBurn => RawWhitelistMode::NeverBurn,
                },
                mint: w.mint.to_bytes(),
                presale: w.presale_only,
                discount_price: w.discount_price,
            }),
            items_available: config.items_available,
            gatekeeper: config.gatekeeper.map(|network| RawGatekeeperConfig {
                gatekeeper_network: network.to_bytes(),
                expire_on_use: false,
            }),
        },
    };

    let mut bytes = sale_account_discriminator().to_vec();
    bytes.extend(borsh::to_vec(&raw)?);
    Ok(bytes)
}

/// Parses raw account bytes into a typed [`SaleConfig`].
pub fn decode_sale_config(data: &[u8]) -> Result<SaleConfig, DecodeError> {
    if data.len() < DISCRIMINATOR_LEN {
        return Err(DecodeError::TooShort { len: data.len() });
    }
    if data[..DISCRIMINATOR_LEN] != sale_account_discriminator() {
        return Err(DecodeError::DiscriminatorMismatch);
    }

    // Trailing config-line bytes are expected and left untouched, so this
    // deserializes from a moving slice rather than demanding full consumption.
    let mut body = &data[DISCRIMINATOR_LEN..];
    let raw = RawSaleAccount::deserialize(&mut body)?;

    if raw.items_redeemed > raw.data.items_available {
        return Err(DecodeError::SupplyInvariant {
            redeemed: raw.items_redeemed,
            available: raw.data.items_available,
        });
    }

    let end_condition = raw.data.end_settings.map(|es| match es.end_setting_type {
        RawEndSettingType::Date => EndCondition::Date(es.number as i64),
        RawEndSettingType::Amount => EndCondition::ItemLimit(es.number),
    });

    let whitelist = raw.data.whitelist_mint_settings.map(|ws| WhitelistConfig {
        mint: Pubkey::new_from_array(ws.mint),
        mode: match ws.mode {
            RawWhitelistMode::BurnEveryTime => WhitelistMode::BurnEveryTime,
            RawWhitelistMode::NeverBurn => WhitelistMode::NeverBurn,
        },
        presale_only: ws.presale,
        discount_price: ws.discount_price,
    });

    Ok(SaleConfig {
        authority: Pubkey::new_from_array(raw.authority),
        treasury_wallet: Pubkey::new_from_array(raw.wallet),
        payment_mint: raw.token_mint.map(Pubkey::new_from_array),
        items_available: raw.data.items_available,
        items_redeemed: raw.items_redeemed,
        price: raw.data.price,
        go_live_time: raw.data.go_live_date,
        end_condition,
        whitelist,
        gatekeeper: raw
            .data
            .gatekeeper
            .map(|g| Pubkey::new_from_array(g.gatekeeper_network)),
    })
}
