use super::{keep_highest, ResolutionFunction, ValuePair};
use crate::dataset::Dataset;
use crate::error::StrategyWarning;
use crate::types::SOURCE_FIELD;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keep the value(s) contributed by the most trusted source.
///
/// A contribution's source is the `source` field of its provenance entry; weights come from the
/// trust table keyed by source name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MostTrusted {
    #[serde(default)]
    pub trust: BTreeMap<String, f64>,
    #[serde(default)]
    pub select_first: bool,
}

impl MostTrusted {
    pub fn new(trust: BTreeMap<String, f64>) -> Self {
        Self {
            trust,
            select_first: false,
        }
    }

    fn weight(&self, dataset: &Dataset, provenance: &str) -> Result<f64, StrategyWarning> {
        let source = dataset.provenance_field(provenance, SOURCE_FIELD).ok_or_else(|| {
            StrategyWarning::MissingProvenance {
                provenance: provenance.to_string(),
                field: SOURCE_FIELD,
            }
        })?;
        self.trust
            .get(&source)
            .copied()
            .filter(|w| w.is_finite())
            .ok_or(StrategyWarning::UnknownSource {
                provenance: provenance.to_string(),
                source_name: source,
            })
    }
}

impl ResolutionFunction for MostTrusted {
    fn name(&self) -> &'static str {
        "most_trusted"
    }

    fn apply(&self, dataset: &Dataset, pairs: &[ValuePair]) -> Result<Vec<ValuePair>, StrategyWarning> {
        let scored = pairs
            .iter()
            .map(|pair| Ok((self.weight(dataset, &pair.provenance)?, pair)))
            .collect::<Result<Vec<_>, StrategyWarning>>()?;
        Ok(keep_highest(&scored, self.select_first))
    }
}
