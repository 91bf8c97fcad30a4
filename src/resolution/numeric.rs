//! Numeric resolution: maximum and average.
//!
//! Both abort on the first value that is not a finite number, leaving the attribute unresolved.

use super::{ResolutionFunction, ValuePair};
use crate::dataset::Dataset;
use crate::error::StrategyWarning;
use crate::types::AVERAGE_PROVENANCE;

/// Parse a contributed value as a finite number.
pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_all(strategy: &'static str, pairs: &[ValuePair]) -> Result<Vec<f64>, StrategyWarning> {
    pairs
        .iter()
        .map(|pair| {
            parse_number(&pair.value).ok_or_else(|| StrategyWarning::NonNumeric {
                strategy,
                value: pair.value.clone(),
            })
        })
        .collect()
}

/// Keep the largest number. Every source contributing an equal number is credited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Maximum;

impl ResolutionFunction for Maximum {
    fn name(&self) -> &'static str {
        "maximum"
    }

    fn apply(&self, _dataset: &Dataset, pairs: &[ValuePair]) -> Result<Vec<ValuePair>, StrategyWarning> {
        let numbers = parse_all(self.name(), pairs)?;
        let Some(max) = numbers.iter().copied().reduce(f64::max) else {
            return Ok(Vec::new());
        };
        let winners: Vec<&ValuePair> = pairs
            .iter()
            .zip(&numbers)
            .filter(|(_, n)| **n == max)
            .map(|(pair, _)| pair)
            .collect();
        let provenance: Vec<&str> = winners.iter().map(|p| p.provenance.as_str()).collect();
        Ok(vec![ValuePair::new(
            winners[0].value.clone(),
            provenance.join(","),
        )])
    }
}

/// Replace all values by their arithmetic mean, tagged with a synthetic provenance marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Average;

impl ResolutionFunction for Average {
    fn name(&self) -> &'static str {
        "average"
    }

    fn apply(&self, _dataset: &Dataset, pairs: &[ValuePair]) -> Result<Vec<ValuePair>, StrategyWarning> {
        let numbers = parse_all(self.name(), pairs)?;
        if numbers.is_empty() {
            return Ok(Vec::new());
        }
        let mean = numbers.iter().sum::<f64>() / numbers.len() as f64;
        Ok(vec![ValuePair::new(mean.to_string(), AVERAGE_PROVENANCE)])
    }
}
