use serde::Serialize;

/// How a parameter's value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    /// Measured in meters; the value is a maximum distance.
    Distance,
    /// Unit-less level from 1 to 10; the value is a required level.
    Scale,
}

impl ParameterKind {
    /// Increment used when nudging a value up or down.
    pub fn step(self) -> i64 {
        match self {
            ParameterKind::Distance => 50,
            ParameterKind::Scale => 1,
        }
    }

    /// Label shown next to the adjustable value.
    pub fn value_label(self) -> &'static str {
        match self {
            ParameterKind::Distance => "Maximum Distance",
            ParameterKind::Scale => "Required Level",
        }
    }
}

/// A single site-selection criterion. Immutable once the catalog is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ParameterKind,
    pub unit: &'static str,
    pub min: i64,
    pub max: i64,
    pub default_value: i64,
    pub default_weight: u32,
    /// Lower raw values are more favorable (e.g. rent).
    pub inverted: bool,
}

impl ParameterDefinition {
    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.min, self.max)
    }
}
