//! Raw damage rolls returned by the engine

/// The engine's numeric output for one work item. Never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RollResult(Vec<i64>);

impl RollResult {
    pub fn new(values: Vec<i64>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[i64] {
        &self.0
    }
}

impl From<Vec<i64>> for RollResult {
    fn from(values: Vec<i64>) -> Self {
        Self(values)
    }
}
