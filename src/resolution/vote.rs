use super::{emit_winners, group_by_value, ResolutionFunction, ValuePair};
use crate::dataset::Dataset;
use crate::error::StrategyWarning;
use serde::{Deserialize, Serialize};

/// Majority vote: the value(s) contributed most often win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// Keep only one winner when several values tie.
    #[serde(default)]
    pub select_first: bool,
}

impl ResolutionFunction for Vote {
    fn name(&self) -> &'static str {
        "vote"
    }

    fn apply(&self, _dataset: &Dataset, pairs: &[ValuePair]) -> Result<Vec<ValuePair>, StrategyWarning> {
        let groups = group_by_value(pairs);
        let top = groups.values().map(Vec::len).max().unwrap_or(0);
        let winners = groups.into_iter().filter(|(_, provenance)| provenance.len() == top);
        Ok(emit_winners(winners, self.select_first))
    }
}
