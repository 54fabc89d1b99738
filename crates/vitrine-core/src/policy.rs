//! # Pricing Policy
//!
//! Store-wide parameters that drive default prices, profit and stock alerts.
//!
//! ## Where the Policy Is Read
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │ PricingPolicy                                                        │
//! │   online_commission_rate ──► online profit, custom-profit pricing    │
//! │   physical_profit_margin ──► default physical unit price             │
//! │   low_stock_threshold    ──► StockStatus::Low, dashboard alert count │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The policy is a plain value. Whoever needs it receives it explicitly
//! (cart constructor, calculator argument); nothing reads it from a global.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Channel, Product};
use crate::validation::ValidationResult;

/// Default online commission, percent.
pub const DEFAULT_COMMISSION_PERCENT: i64 = 15;

/// Default physical margin, percent.
pub const DEFAULT_MARGIN_PERCENT: i64 = 15;

/// Default low-stock threshold, units.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 3;

// =============================================================================
// Rate
// =============================================================================

/// A fraction in `[0, 1]`, entered and shown as a percentage.
///
/// ## Example
/// ```rust
/// use vitrine_core::policy::Rate;
/// use rust_decimal::Decimal;
///
/// let rate = Rate::from_percentage(Decimal::from(15)).unwrap();
/// assert_eq!(rate.fraction(), Decimal::new(15, 2));
/// assert!(Rate::from_percentage(Decimal::from(101)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate(Decimal);

impl Rate {
    /// Zero rate.
    pub const fn zero() -> Self {
        Rate(Decimal::ZERO)
    }

    /// Builds a rate from a percentage in `[0, 100]`.
    pub fn from_percentage(percent: Decimal) -> ValidationResult<Self> {
        if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
            return Err(ValidationError::OutOfRange {
                field: "rate".to_string(),
                min: 0,
                max: 100,
            });
        }
        Ok(Rate(percent / Decimal::ONE_HUNDRED))
    }

    /// Builds a rate from a fraction in `[0, 1]`.
    pub fn from_fraction(fraction: Decimal) -> ValidationResult<Self> {
        if fraction < Decimal::ZERO || fraction > Decimal::ONE {
            return Err(ValidationError::OutOfRange {
                field: "rate".to_string(),
                min: 0,
                max: 1,
            });
        }
        Ok(Rate(fraction))
    }

    /// The fraction, e.g. `0.15`.
    pub const fn fraction(&self) -> Decimal {
        self.0
    }

    /// The percentage, e.g. `15`.
    pub fn percentage(&self) -> Decimal {
        (self.0 * Decimal::ONE_HUNDRED).normalize()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

// =============================================================================
// Pricing Policy
// =============================================================================

/// Commission, margin and stock alert settings for one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    online_commission_rate: Rate,
    physical_profit_margin: Rate,
    low_stock_threshold: u32,
}

impl PricingPolicy {
    pub fn new(online_commission_rate: Rate, physical_profit_margin: Rate, low_stock_threshold: u32) -> Self {
        PricingPolicy {
            online_commission_rate,
            physical_profit_margin,
            low_stock_threshold,
        }
    }

    pub fn online_commission_rate(&self) -> Rate {
        self.online_commission_rate
    }

    pub fn physical_profit_margin(&self) -> Rate {
        self.physical_profit_margin
    }

    pub fn low_stock_threshold(&self) -> u32 {
        self.low_stock_threshold
    }

    /// Price a freshly added cart line starts at.
    ///
    /// - Physical: `cost × (1 + margin)`
    /// - Online: the catalog price (`cost_price`) as is
    ///
    /// With the default 15% margin a product costing 10.00 starts at 11.50
    /// in a physical sale and at 10.00 online.
    pub fn default_unit_price(&self, product: &Product, channel: Channel) -> Money {
        match channel {
            Channel::Physical => product.cost_price.mark_up(self.physical_profit_margin),
            Channel::Online => product.cost_price,
        }
    }

    /// Applies a settings update.
    ///
    /// Every supplied field is validated before any is written; a single
    /// bad value leaves the policy untouched.
    pub fn apply(&mut self, update: &SettingsUpdate) -> ValidationResult<()> {
        let commission = update
            .commission_percent
            .map(|p| percent_field("commission_percent", p))
            .transpose()?;
        let margin = update
            .margin_percent
            .map(|p| percent_field("margin_percent", p))
            .transpose()?;
        let threshold = update
            .low_stock_threshold
            .map(|t| {
                u32::try_from(t).map_err(|_| ValidationError::OutOfRange {
                    field: "low_stock_threshold".to_string(),
                    min: 0,
                    max: i64::from(u32::MAX),
                })
            })
            .transpose()?;

        if let Some(rate) = commission {
            self.online_commission_rate = rate;
        }
        if let Some(rate) = margin {
            self.physical_profit_margin = rate;
        }
        if let Some(threshold) = threshold {
            self.low_stock_threshold = threshold;
        }
        Ok(())
    }
}

fn percent_field(field: &str, percent: Decimal) -> ValidationResult<Rate> {
    Rate::from_percentage(percent).map_err(|_| ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: 100,
    })
}

impl Default for PricingPolicy {
    fn default() -> Self {
        PricingPolicy {
            online_commission_rate: Rate(Decimal::new(DEFAULT_COMMISSION_PERCENT, 2)),
            physical_profit_margin: Rate(Decimal::new(DEFAULT_MARGIN_PERCENT, 2)),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

/// Partial settings change, percentages as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub commission_percent: Option<Decimal>,
    pub margin_percent: Option<Decimal>,
    pub low_stock_threshold: Option<i64>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = PricingPolicy::default();
        assert_eq!(policy.online_commission_rate().percentage(), Decimal::from(15));
        assert_eq!(policy.physical_profit_margin().fraction(), Decimal::new(15, 2));
        assert_eq!(policy.low_stock_threshold(), 3);
    }

    #[test]
    fn test_rate_bounds() {
        assert!(Rate::from_percentage(Decimal::ZERO).is_ok());
        assert!(Rate::from_percentage(Decimal::ONE_HUNDRED).is_ok());
        assert!(Rate::from_percentage(Decimal::from(-1)).is_err());
        assert!(Rate::from_fraction(Decimal::new(11, 1)).is_err());
    }

    #[test]
    fn test_apply_partial_update() {
        let mut policy = PricingPolicy::default();
        policy
            .apply(&SettingsUpdate {
                commission_percent: Some(Decimal::from(20)),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(policy.online_commission_rate().fraction(), Decimal::new(20, 2));
        assert_eq!(policy.physical_profit_margin().fraction(), Decimal::new(15, 2));
    }

    #[test]
    fn test_apply_is_all_or_nothing() {
        let mut policy = PricingPolicy::default();
        let err = policy
            .apply(&SettingsUpdate {
                commission_percent: Some(Decimal::from(30)),
                margin_percent: Some(Decimal::from(150)),
                low_stock_threshold: Some(5),
            })
            .unwrap_err();

        assert!(matches!(err, ValidationError::OutOfRange { ref field, .. } if field == "margin_percent"));
        assert_eq!(policy, PricingPolicy::default());
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let mut policy = PricingPolicy::default();
        assert!(policy
            .apply(&SettingsUpdate {
                low_stock_threshold: Some(-1),
                ..Default::default()
            })
            .is_err());
    }
}
