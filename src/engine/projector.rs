//! Local state projector.
//!
//! After a confirmed mint the engine already knows the deterministic effects:
//! one item consumed, and one whitelist token burned when the sale burns per
//! mint. Applying them locally keeps the view honest without a round trip.
//! The adjusted counters are fed back through the same evaluator rules, so
//! sold-out and active flags flip exactly as a fresh refresh would flip them.
//! The next full refresh always supersedes these optimistic values.

use tracing::debug;

use crate::types::{DerivedView, SaleConfig, WhitelistMode};

use super::eligibility::evaluate;

/// Applies one confirmed mint to the retained snapshot and recomputes the
/// view from the adjusted counters.
pub fn apply_confirmed_mint(
    sale: &mut SaleConfig,
    wallet_whitelist_balance: &mut u64,
    now: i64,
) -> DerivedView {
    sale.items_redeemed = sale.items_redeemed.saturating_add(1);

    let burns_per_mint = sale
        .whitelist
        .as_ref()
        .map(|w| w.mode == WhitelistMode::BurnEveryTime)
        .unwrap_or(false);
    if burns_per_mint && *wallet_whitelist_balance > 0 {
        *wallet_whitelist_balance -= 1;
    }

    debug!(
        "Projected confirmed mint: {} redeemed, whitelist balance {}",
        sale.items_redeemed, wallet_whitelist_balance
    );

    evaluate(sale, *wallet_whitelist_balance, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_support::sale_config;
    use crate::types::WhitelistConfig;
    use solana_sdk::pubkey::Pubkey;

    const NOW: i64 = 1_640_000_100;

    #[test]
    fn decrements_remaining_by_exactly_one() {
        let mut sale = sale_config();
        let mut balance = 0;
        let before = evaluate(&sale, balance, NOW);
        let after = apply_confirmed_mint(&mut sale, &mut balance, NOW);
        assert_eq!(after.items_remaining, before.items_remaining - 1);
        assert_eq!(after.items_redeemed, before.items_redeemed + 1);
    }

    #[test]
    fn burn_mode_consumes_one_whitelist_token() {
        let mut sale = sale_config();
        sale.whitelist = Some(WhitelistConfig {
            mint: Pubkey::new_unique(),
            mode: WhitelistMode::BurnEveryTime,
            presale_only: false,
            discount_price: None,
        });
        let mut balance = 3;
        let view = apply_confirmed_mint(&mut sale, &mut balance, NOW);
        assert_eq!(balance, 2);
        assert_eq!(view.wallet_whitelist_balance, 2);
    }

    #[test]
    fn never_burn_mode_keeps_whitelist_balance() {
        let mut sale = sale_config();
        sale.whitelist = Some(WhitelistConfig {
            mint: Pubkey::new_unique(),
            mode: WhitelistMode::NeverBurn,
            presale_only: false,
            discount_price: None,
        });
        let mut balance = 3;
        apply_confirmed_mint(&mut sale, &mut balance, NOW);
        assert_eq!(balance, 3);
    }

    #[test]
    fn zero_balance_is_never_decremented() {
        let mut sale = sale_config();
        sale.whitelist = Some(WhitelistConfig {
            mint: Pubkey::new_unique(),
            mode: WhitelistMode::BurnEveryTime,
            presale_only: false,
            discount_price: None,
        });
        let mut balance = 0;
        apply_confirmed_mint(&mut sale, &mut balance, NOW);
        assert_eq!(balance, 0);
    }

    #[test]
    fn last_item_flips_sold_out_and_inactive() {
        let mut sale = sale_config();
        sale.items_redeemed = 2221;
        let mut balance = 0;
        let view = apply_confirmed_mint(&mut sale, &mut balance, NOW);
        assert_eq!(view.items_remaining, 0);
        assert!(view.is_sold_out);
        assert!(!view.is_active);
    }

    #[test]
    fn presale_access_closes_when_last_token_burns() {
        let mut sale = sale_config();
        sale.go_live_time = Some(NOW + 10_000); // presale window still open
        sale.whitelist = Some(WhitelistConfig {
            mint: Pubkey::new_unique(),
            mode: WhitelistMode::BurnEveryTime,
            presale_only: true,
            discount_price: None,
        });
        let mut balance = 1;
        let view = apply_confirmed_mint(&mut sale, &mut balance, NOW);
        assert_eq!(balance, 0);
        assert!(!view.is_active);
    }
}
