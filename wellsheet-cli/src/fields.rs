//! Generated values for synthesized columns

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::DateSettings;
use crate::sheet::CellValue;

/// Produces one single-value row per table row, ready for a batch statement
pub trait FieldsGenerator {
    fn generate_fields(&mut self, size: usize) -> Vec<Vec<CellValue>>;
}

/// Random ISO dates (`YYYY-MM-DD`) within one month
pub struct DateFieldsGenerator {
    year: i32,
    month: u32,
    days: u32,
    rng: StdRng,
}

impl DateFieldsGenerator {
    /// Generator for the configured month, seeded from the OS when no seed is set
    pub fn new(settings: &DateSettings) -> Result<Self> {
        let days = days_in_month(settings.year, settings.month).with_context(|| {
            format!("Invalid date month: {}-{:02}", settings.year, settings.month)
        })?;

        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            year: settings.year,
            month: settings.month,
            days,
            rng,
        })
    }

    fn next_date(&mut self) -> Option<NaiveDate> {
        let day = self.rng.random_range(1..=self.days);
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }
}

impl FieldsGenerator for DateFieldsGenerator {
    fn generate_fields(&mut self, size: usize) -> Vec<Vec<CellValue>> {
        (0..size)
            .filter_map(|_| self.next_date())
            .map(|date| vec![CellValue::Text(date.format("%Y-%m-%d").to_string())])
            .collect()
    }
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from((next - first).num_days()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(year: i32, month: u32, seed: Option<u64>) -> DateSettings {
        DateSettings { year, month, seed }
    }

    #[test]
    fn test_dates_stay_in_month() {
        let mut generator = DateFieldsGenerator::new(&settings(2023, 5, None)).unwrap();

        let fields = generator.generate_fields(200);

        assert_eq!(fields.len(), 200);
        for row in &fields {
            let CellValue::Text(date) = &row[0] else {
                panic!("expected text date, got {:?}", row);
            };
            assert!(date.starts_with("2023-05-"), "{}", date);
            let day: u32 = date[8..].parse().unwrap();
            assert!((1..=31).contains(&day));
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let mut a = DateFieldsGenerator::new(&settings(2024, 2, Some(42))).unwrap();
        let mut b = DateFieldsGenerator::new(&settings(2024, 2, Some(42))).unwrap();

        assert_eq!(a.generate_fields(20), b.generate_fields(20));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2023, 5), Some(31));
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2023, 12), Some(31));
        assert_eq!(days_in_month(2023, 13), None);
    }

    #[test]
    fn test_invalid_month_rejected() {
        assert!(DateFieldsGenerator::new(&settings(2023, 0, None)).is_err());
    }

    #[test]
    fn test_zero_size() {
        let mut generator = DateFieldsGenerator::new(&settings(2023, 5, Some(1))).unwrap();
        assert!(generator.generate_fields(0).is_empty());
    }
}
