use crate::catalog::REQUIRED_TOTAL_WEIGHT;
use crate::error::ModelError;
use crate::params::ParameterStore;

/// Gate check run before every submission.
///
/// Pure: the store is only read, so a rejection leaves it exactly as it was.
pub fn validate_for_submission(store: &ParameterStore) -> Result<(), ModelError> {
    if store.active_count() == 0 {
        return Err(ModelError::NoActiveParameters);
    }

    let total = store.total_weight();
    if total != REQUIRED_TOTAL_WEIGHT {
        return Err(ModelError::WeightMismatch(total));
    }

    Ok(())
}

/// Where the active weights stand relative to the required total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightStatus {
    NoneActive,
    Under(u32),
    Ready,
    Over(u32),
}

impl WeightStatus {
    pub fn of(store: &ParameterStore) -> Self {
        let total = store.total_weight();
        if store.active_count() == 0 {
            WeightStatus::NoneActive
        } else if total < REQUIRED_TOTAL_WEIGHT {
            WeightStatus::Under(total)
        } else if total > REQUIRED_TOTAL_WEIGHT {
            WeightStatus::Over(total)
        } else {
            WeightStatus::Ready
        }
    }

    pub fn is_ready(self) -> bool {
        self == WeightStatus::Ready
    }

    pub fn message(self) -> &'static str {
        match self {
            WeightStatus::Ready => "Perfect! Ready for analysis.",
            WeightStatus::Over(_) => "Total exceeds 100%. Please adjust weights.",
            WeightStatus::Under(_) | WeightStatus::NoneActive => {
                "Add more parameters or increase weights to reach 100%."
            }
        }
    }
}
