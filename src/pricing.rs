//! Currency conversion and regional price gaps.

use crate::steam::{PriceQuote, Region};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Market whose prices get converted.
pub const SOURCE_REGION: Region = Region::Ua;

/// Market the report is expressed in.
pub const TARGET_REGION: Region = Region::Id;

/// Multiplier converting source-region amounts into the target currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeRate(f64);

/// Approximate rate, 1 UAH = 380 IDR. Advisory only.
pub const UAH_TO_IDR: ExchangeRate = ExchangeRate(380.0);

impl ExchangeRate {
    pub fn new(rate: f64) -> Self {
        Self(rate)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn convert(&self, amount: f64) -> f64 {
        amount * self.0
    }

    /// Rate for the opposite direction.
    pub fn inverse(&self) -> Self {
        Self(1.0 / self.0)
    }
}

impl Default for ExchangeRate {
    fn default() -> Self {
        UAH_TO_IDR
    }
}

/// Result of comparing two quotes, expressed in the target currency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceGap {
    /// Source final price converted into the target currency
    pub converted: f64,
    /// `|target - converted|`
    pub abs_diff: f64,
    /// `abs_diff` as a percentage of the larger of the two amounts
    pub pct_diff: f64,
}

/// Compares a source-region quote against a target-region quote.
///
/// When either final price is exactly zero the gap is `(0, 0)`.
pub fn compare(source: &PriceQuote, target: &PriceQuote, rate: ExchangeRate) -> PriceGap {
    let converted = rate.convert(source.final_price);

    if source.final_price == 0.0 || target.final_price == 0.0 {
        return PriceGap { converted, abs_diff: 0.0, pct_diff: 0.0 };
    }

    let abs_diff = (target.final_price - converted).abs();
    let pct_diff = abs_diff / converted.max(target.final_price) * 100.0;

    PriceGap { converted, abs_diff, pct_diff }
}

/// One ranked line of the report. Only built when both regions have a quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub app_id: String,
    pub name: String,
    /// Quote in the source region (UAH)
    pub source_price: PriceQuote,
    /// Quote in the target region (IDR)
    pub target_price: PriceQuote,
    /// Source final price in the target currency
    pub source_converted: f64,
    /// Savings, in the target currency
    pub difference: f64,
    pub difference_percent: f64,
}

impl ComparisonRecord {
    pub fn new(
        app_id: impl Into<String>,
        name: impl Into<String>,
        source_price: PriceQuote,
        target_price: PriceQuote,
        rate: ExchangeRate,
    ) -> Self {
        let gap = compare(&source_price, &target_price, rate);
        Self {
            app_id: app_id.into(),
            name: name.into(),
            source_price,
            target_price,
            source_converted: gap.converted,
            difference: gap.abs_diff,
            difference_percent: gap.pct_diff,
        }
    }
}

/// Sorts records by savings, highest first.
pub fn sort_by_savings(records: &mut [ComparisonRecord]) {
    records.sort_by(|a, b| b.difference.partial_cmp(&a.difference).unwrap_or(Ordering::Equal));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(currency: &str, final_price: f64) -> PriceQuote {
        PriceQuote {
            currency: currency.to_string(),
            initial: final_price,
            final_price,
            discount_percent: 0,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_compare_worked_example() {
        // 1000 minor UAH = 10.00, 300000 minor IDR = 3000.00
        let gap = compare(&quote("UAH", 10.0), &quote("IDR", 3000.0), UAH_TO_IDR);

        assert!(approx(gap.converted, 3800.0));
        assert!(approx(gap.abs_diff, 800.0));
        assert!((gap.pct_diff - 21.052631).abs() < 1e-4);
    }

    #[test]
    fn test_compare_zero_on_either_side() {
        let free_source = compare(&quote("UAH", 0.0), &quote("IDR", 3000.0), UAH_TO_IDR);
        assert_eq!((free_source.abs_diff, free_source.pct_diff), (0.0, 0.0));

        let free_target = compare(&quote("UAH", 10.0), &quote("IDR", 0.0), UAH_TO_IDR);
        assert_eq!((free_target.abs_diff, free_target.pct_diff), (0.0, 0.0));
        assert!(approx(free_target.converted, 3800.0));
    }

    #[test]
    fn test_compare_equal_prices() {
        let gap = compare(&quote("UAH", 10.0), &quote("IDR", 3800.0), UAH_TO_IDR);
        assert!(gap.abs_diff.abs() < 1e-9);
        assert!(gap.pct_diff.abs() < 1e-9);
    }

    #[test]
    fn test_pct_diff_bounded_by_larger_amount() {
        let sources = [0.01, 1.0, 9.99, 199.5, 1499.0, 25000.0];
        let targets = [1.0, 999.0, 3800.0, 15999.0, 249999.0, 5_000_000.0];

        for &s in &sources {
            for &t in &targets {
                let gap = compare(&quote("UAH", s), &quote("IDR", t), UAH_TO_IDR);
                let larger = gap.converted.max(t);
                assert!(gap.pct_diff >= 0.0, "negative pct for {s}/{t}");
                assert!(gap.pct_diff <= 100.0, "pct above 100 for {s}/{t}");
                assert!(approx(gap.pct_diff, gap.abs_diff / larger * 100.0));
            }
        }
    }

    #[test]
    fn test_compare_symmetric_with_inverse_rate() {
        let pairs = [(10.0, 3000.0), (199.0, 99999.0), (0.5, 1_000_000.0), (42.0, 15960.0)];

        for (s, t) in pairs {
            let forward = compare(&quote("UAH", s), &quote("IDR", t), UAH_TO_IDR);
            let backward = compare(&quote("IDR", t), &quote("UAH", s), UAH_TO_IDR.inverse());

            // Same gap, expressed in the other currency
            assert!(approx(forward.abs_diff, UAH_TO_IDR.convert(backward.abs_diff)));
            assert!(approx(forward.pct_diff, backward.pct_diff));
        }
    }

    #[test]
    fn test_record_new_and_sort() {
        let mut records = vec![
            ComparisonRecord::new("1", "Small", quote("UAH", 10.0), quote("IDR", 3700.0), UAH_TO_IDR),
            ComparisonRecord::new("2", "Big", quote("UAH", 100.0), quote("IDR", 50000.0), UAH_TO_IDR),
            ComparisonRecord::new("3", "Mid", quote("UAH", 10.0), quote("IDR", 3000.0), UAH_TO_IDR),
        ];

        sort_by_savings(&mut records);

        let ids: Vec<&str> = records.iter().map(|r| r.app_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
        assert!(approx(records[0].difference, 12000.0));
        assert!(approx(records[0].source_converted, 38000.0));
    }

    #[test]
    fn test_exchange_rate() {
        assert_eq!(ExchangeRate::default(), UAH_TO_IDR);
        assert_eq!(UAH_TO_IDR.value(), 380.0);
        assert!(approx(UAH_TO_IDR.inverse().convert(3800.0), 10.0));
        assert_eq!(ExchangeRate::new(2.5).convert(4.0), 10.0);
    }

    #[test]
    fn test_exchange_rate_serde_transparent() {
        let json = serde_json::to_string(&ExchangeRate::new(380.0)).unwrap();
        assert_eq!(json, "380.0");
    }
}
