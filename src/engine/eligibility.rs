//! Eligibility evaluator.
//!
//! A pure function from `(SaleConfig, wallet whitelist balance, now)` to the
//! [`DerivedView`]. No hidden state, no side effects: identical inputs always
//! produce identical views, which is what lets the projector re-run the same
//! rules on locally adjusted counters after a confirmed mint.

use crate::types::{DerivedView, EndCondition, SaleConfig};

/// Whether the wallet currently qualifies for whitelist treatment: the sale
/// has a whitelist, the wallet holds at least one token, and the sale has not
/// ended.
pub fn whitelist_qualifies(config: &SaleConfig, wallet_whitelist_balance: u64, now: i64) -> bool {
    config.whitelist.is_some() && wallet_whitelist_balance > 0 && !is_ended(config, now)
}

fn is_ended(config: &SaleConfig, now: i64) -> bool {
    let effective_available = config.effective_items_available();
    let limit_reached = matches!(config.end_condition, Some(EndCondition::ItemLimit(_)))
        && config.items_redeemed >= effective_available;
    let date_passed = matches!(config.end_condition, Some(EndCondition::Date(t)) if now >= t);
    // Either condition ends the sale; neither can re-enable it.
    limit_reached || date_passed
}

/// Computes the derived eligibility/price/supply view.
pub fn evaluate(config: &SaleConfig, wallet_whitelist_balance: u64, now: i64) -> DerivedView {
    let effective_available = config.effective_items_available();
    let items_remaining = effective_available.saturating_sub(config.items_redeemed);
    let ended = is_ended(config, now);
    let sold_out = items_remaining == 0;

    let effective_price = match &config.whitelist {
        Some(whitelist) => match whitelist.discount_price {
            Some(discount) if whitelist_qualifies(config, wallet_whitelist_balance, now) => {
                discount
            }
            _ => config.price,
        },
        None => config.price,
    };

    // Whitelist-only sales have no public tier: not a presale window, and no
    // discounted price implying a public price exists.
    let is_whitelist_only = config
        .whitelist
        .as_ref()
        .map(|w| !w.presale_only && w.discount_price.is_none())
        .unwrap_or(false);

    let past_go_live = config.go_live_time.map(|t| now >= t).unwrap_or(false);
    let presale_open = config
        .whitelist
        .as_ref()
        .map(|w| w.presale_only && wallet_whitelist_balance > 0)
        .unwrap_or(false);

    let is_active = !ended && !sold_out && (past_go_live || presale_open);

    let end_date = match config.end_condition {
        Some(EndCondition::Date(t)) => Some(t),
        _ => None,
    };

    DerivedView {
        is_active,
        is_ended: ended,
        is_sold_out: sold_out,
        items_available: effective_available,
        items_redeemed: config.items_redeemed,
        items_remaining,
        effective_price,
        is_whitelist_only,
        wallet_whitelist_balance,
        go_live_time: config.go_live_time,
        end_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_support::sale_config;
    use crate::types::{WhitelistConfig, WhitelistMode};
    use solana_sdk::pubkey::Pubkey;

    const LIVE: i64 = 1_640_000_000;
    const AFTER_LIVE: i64 = LIVE + 100;
    const BEFORE_LIVE: i64 = LIVE - 100;

    fn whitelist(presale_only: bool, discount_price: Option<u64>) -> WhitelistConfig {
        WhitelistConfig {
            mint: Pubkey::new_unique(),
            mode: WhitelistMode::BurnEveryTime,
            presale_only,
            discount_price,
        }
    }

    #[test]
    fn open_sale_is_active_after_go_live() {
        let view = evaluate(&sale_config(), 0, AFTER_LIVE);
        assert!(view.is_active);
        assert!(!view.is_ended);
        assert!(!view.is_sold_out);
        assert_eq!(view.items_remaining, 2222);
    }

    #[test]
    fn sale_is_inactive_before_go_live() {
        let view = evaluate(&sale_config(), 0, BEFORE_LIVE);
        assert!(!view.is_active);
        assert!(!view.is_ended);
    }

    #[test]
    fn unconfigured_go_live_keeps_public_sale_closed() {
        let mut config = sale_config();
        config.go_live_time = None;
        let view = evaluate(&config, 0, AFTER_LIVE);
        assert!(!view.is_active);
    }

    #[test]
    fn fully_redeemed_supply_is_sold_out_and_inactive() {
        let mut config = sale_config();
        config.items_redeemed = 2222;
        let view = evaluate(&config, 0, AFTER_LIVE);
        assert!(view.is_sold_out);
        assert!(!view.is_active);
        assert_eq!(view.items_remaining, 0);
    }

    #[test]
    fn item_limit_clamps_and_ends_the_sale() {
        let mut config = sale_config();
        config.end_condition = Some(EndCondition::ItemLimit(1000));
        config.items_redeemed = 1000;
        let view = evaluate(&config, 0, AFTER_LIVE);
        assert_eq!(view.items_available, 1000);
        assert_eq!(view.items_remaining, 0);
        assert!(view.is_ended);
        assert!(view.is_sold_out);
        assert!(!view.is_active);
    }

    #[test]
    fn item_limit_below_redemptions_still_counts_remaining() {
        let mut config = sale_config();
        config.end_condition = Some(EndCondition::ItemLimit(1000));
        config.items_redeemed = 400;
        let view = evaluate(&config, 0, AFTER_LIVE);
        assert_eq!(view.items_available, 1000);
        assert_eq!(view.items_remaining, 600);
        assert!(!view.is_ended);
    }

    #[test]
    fn date_condition_ends_regardless_of_supply() {
        let mut config = sale_config();
        config.end_condition = Some(EndCondition::Date(AFTER_LIVE - 1));
        let view = evaluate(&config, 0, AFTER_LIVE);
        assert!(view.is_ended);
        assert!(!view.is_active);
        assert_eq!(view.items_remaining, 2222);
        assert_eq!(view.end_date, Some(AFTER_LIVE - 1));
    }

    #[test]
    fn date_condition_in_future_does_not_end() {
        let mut config = sale_config();
        config.end_condition = Some(EndCondition::Date(AFTER_LIVE + 1000));
        let view = evaluate(&config, 0, AFTER_LIVE);
        assert!(!view.is_ended);
        assert!(view.is_active);
    }

    #[test]
    fn presale_holder_is_active_before_go_live() {
        let mut config = sale_config();
        config.whitelist = Some(whitelist(true, None));
        let view = evaluate(&config, 3, BEFORE_LIVE);
        assert!(view.is_active);
    }

    #[test]
    fn presale_without_balance_stays_locked_before_go_live() {
        let mut config = sale_config();
        config.whitelist = Some(whitelist(true, None));
        let view = evaluate(&config, 0, BEFORE_LIVE);
        assert!(!view.is_active);
    }

    #[test]
    fn presale_config_opens_publicly_at_go_live() {
        let mut config = sale_config();
        config.whitelist = Some(whitelist(true, None));
        let view = evaluate(&config, 0, AFTER_LIVE);
        assert!(view.is_active);
    }

    #[test]
    fn discount_applies_only_to_qualified_wallets() {
        let mut config = sale_config();
        config.whitelist = Some(whitelist(false, Some(400_000_000)));

        let holder = evaluate(&config, 1, AFTER_LIVE);
        assert_eq!(holder.effective_price, 400_000_000);

        let outsider = evaluate(&config, 0, AFTER_LIVE);
        assert_eq!(outsider.effective_price, config.price);
    }

    #[test]
    fn no_discount_price_means_base_price_for_holders() {
        let mut config = sale_config();
        config.whitelist = Some(whitelist(false, None));
        let view = evaluate(&config, 5, AFTER_LIVE);
        assert_eq!(view.effective_price, config.price);
    }

    #[test]
    fn whitelist_only_detection() {
        let mut config = sale_config();
        config.whitelist = Some(whitelist(false, None));
        assert!(evaluate(&config, 0, AFTER_LIVE).is_whitelist_only);

        config.whitelist = Some(whitelist(true, None));
        assert!(!evaluate(&config, 0, AFTER_LIVE).is_whitelist_only);

        config.whitelist = Some(whitelist(false, Some(1)));
        assert!(!evaluate(&config, 0, AFTER_LIVE).is_whitelist_only);
    }

    #[test]
    fn evaluate_is_idempotent() {
        let mut config = sale_config();
        config.whitelist = Some(whitelist(true, Some(250)));
        config.end_condition = Some(EndCondition::Date(AFTER_LIVE + 50));
        let first = evaluate(&config, 2, AFTER_LIVE);
        let second = evaluate(&config, 2, AFTER_LIVE);
        assert_eq!(first, second);
    }
}
