//! Storefront configuration.
//!
//! Values come from `STOREFRONT_*` environment variables, falling back to the
//! defaults every brand target ships with.

use crate::domain::coupon::CouponBook;
use crate::domain::delivery::{
    DEFAULT_DELIVERY_HORIZON_DAYS, DeliveryWindow, available_delivery_dates,
};
use crate::domain::money::{Money, Rate};
use crate::domain::pricing::PricingPolicy;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: String, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorefrontConfig {
    /// White-label brand target this build serves.
    pub brand: String,
    pub policy: PricingPolicy,
    /// Tax rate used when pricing without a POS.
    pub tax_rate: Rate,
    pub delivery_horizon_days: u32,
    pub coupons: CouponBook,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            brand: "storefront".to_string(),
            policy: PricingPolicy::default(),
            tax_rate: Rate::ZERO,
            delivery_horizon_days: DEFAULT_DELIVERY_HORIZON_DAYS,
            coupons: CouponBook::new(),
        }
    }
}

impl StorefrontConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let point_value: Decimal = parse_or(&lookup, "STOREFRONT_POINT_VALUE", defaults.policy.point_value)?;
        if point_value < Decimal::ZERO {
            return Err(invalid("STOREFRONT_POINT_VALUE", &point_value.to_string()));
        }

        let policy = PricingPolicy {
            point_value,
            premium_rate: rate_or(&lookup, "STOREFRONT_PREMIUM_RATE", defaults.policy.premium_rate)?,
            premium_threshold: Money::new(parse_or(
                &lookup,
                "STOREFRONT_PREMIUM_THRESHOLD",
                defaults.policy.premium_threshold.value(),
            )?),
            employee_rate: rate_or(&lookup, "STOREFRONT_EMPLOYEE_RATE", defaults.policy.employee_rate)?,
        };

        Ok(Self {
            brand: lookup("STOREFRONT_BRAND")
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty())
                .unwrap_or(defaults.brand),
            policy,
            tax_rate: rate_or(&lookup, "STOREFRONT_TAX_RATE", defaults.tax_rate)?,
            delivery_horizon_days: parse_or(
                &lookup,
                "STOREFRONT_DELIVERY_HORIZON_DAYS",
                defaults.delivery_horizon_days,
            )?,
            coupons: match lookup("STOREFRONT_COUPONS") {
                Some(raw) => parse_coupons(&raw)?,
                None => defaults.coupons,
            },
        })
    }

    /// Delivery dates offered from `today` within the configured horizon.
    pub fn delivery_dates(&self, today: NaiveDate, schedule: &[DeliveryWindow]) -> Vec<NaiveDate> {
        available_delivery_dates(today, schedule, self.delivery_horizon_days)
    }
}

fn invalid(name: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|_| invalid(name, &raw)),
        None => Ok(default),
    }
}

fn rate_or<F>(lookup: &F, name: &str, default: Rate) -> Result<Rate, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value: Decimal = parse_or(lookup, name, default.value())?;
    Rate::new(value).map_err(|_| invalid(name, &value.to_string()))
}

/// Parses `CODE=rate,CODE=rate`.
fn parse_coupons(raw: &str) -> Result<CouponBook, ConfigError> {
    let mut book = CouponBook::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (code, rate) = entry
            .split_once('=')
            .ok_or_else(|| invalid("STOREFRONT_COUPONS", entry))?;
        let rate = Decimal::from_str(rate.trim())
            .ok()
            .and_then(|r| Rate::new(r).ok())
            .filter(|r| r.value() > dec!(0))
            .ok_or_else(|| invalid("STOREFRONT_COUPONS", entry))?;
        book.insert(code, rate);
    }
    Ok(book)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = StorefrontConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StorefrontConfig::default());
        assert_eq!(config.policy.point_value, dec!(0.05));
        assert_eq!(config.delivery_horizon_days, 30);
    }

    #[test]
    fn test_overrides() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            ("STOREFRONT_BRAND", "green-leaf"),
            ("STOREFRONT_POINT_VALUE", "0.01"),
            ("STOREFRONT_PREMIUM_RATE", "0.2"),
            ("STOREFRONT_EMPLOYEE_RATE", "0.25"),
            ("STOREFRONT_TAX_RATE", "0.13"),
            ("STOREFRONT_DELIVERY_HORIZON_DAYS", "14"),
            ("STOREFRONT_COUPONS", "welcome=0.1, VIP=0.2"),
        ]))
        .unwrap();

        assert_eq!(config.brand, "green-leaf");
        assert_eq!(config.policy.point_value, dec!(0.01));
        assert_eq!(config.policy.premium_rate.value(), dec!(0.2));
        assert_eq!(config.policy.employee_rate.value(), dec!(0.25));
        assert_eq!(config.tax_rate.value(), dec!(0.13));
        assert_eq!(config.delivery_horizon_days, 14);
        assert_eq!(config.coupons.len(), 2);
        assert_eq!(config.coupons.rate("WELCOME").unwrap().value(), dec!(0.1));
    }

    #[test]
    fn test_delivery_dates_follow_horizon() {
        let schedule = [DeliveryWindow {
            day: chrono::Weekday::Sat,
            start: chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end: chrono::NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        }];
        // Saturday
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();

        let week = StorefrontConfig::from_lookup(lookup(&[("STOREFRONT_DELIVERY_HORIZON_DAYS", "7")])).unwrap();
        assert_eq!(week.delivery_dates(today, &schedule), vec![today]);

        let dates = StorefrontConfig::default().delivery_dates(today, &schedule);
        assert_eq!(dates.len(), 5);
        assert_eq!(dates[4], NaiveDate::from_ymd_opt(2026, 11, 14).unwrap());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = StorefrontConfig::from_lookup(lookup(&[("STOREFRONT_TAX_RATE", "lots")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                name: "STOREFRONT_TAX_RATE".to_string(),
                value: "lots".to_string()
            }
        );

        assert!(StorefrontConfig::from_lookup(lookup(&[("STOREFRONT_EMPLOYEE_RATE", "1.5")])).is_err());
        assert!(StorefrontConfig::from_lookup(lookup(&[("STOREFRONT_POINT_VALUE", "-1")])).is_err());
        assert!(StorefrontConfig::from_lookup(lookup(&[("STOREFRONT_COUPONS", "broken")])).is_err());
    }
}
