//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::{Category, DecayMode, TransferRulesError, constants};

/// Base lockup duration per recipient category, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseDurations {
    pub domestic: u64,
    pub foreign: u64,
}

impl BaseDurations {
    #[must_use]
    pub fn for_category(&self, category: Category) -> u64 {
        match category {
            Category::Domestic => self.domestic,
            Category::Foreign => self.foreign,
        }
    }

    /// # Errors
    /// Returns `InvalidParameters` if either duration is zero.
    pub fn validate(&self) -> crate::Result<()> {
        if self.domestic == 0 || self.foreign == 0 {
            return Err(TransferRulesError::InvalidParameters {
                reason: format!(
                    "base durations must be positive (domestic={}, foreign={})",
                    self.domestic, self.foreign
                ),
            });
        }
        Ok(())
    }
}

impl Default for BaseDurations {
    fn default() -> Self {
        Self {
            domestic: constants::DEFAULT_DOMESTIC_LOCKUP_SECS,
            foreign: constants::DEFAULT_FOREIGN_LOCKUP_SECS,
        }
    }
}

/// Decay mode given to a lot created by propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PropagationDecay {
    /// Copy the mode of the source lot.
    #[default]
    Inherit,
    /// Always use a cliff.
    Cliff,
}

impl PropagationDecay {
    #[must_use]
    pub fn resolve(self, source: DecayMode) -> DecayMode {
        match self {
            Self::Inherit => source,
            Self::Cliff => DecayMode::Cliff,
        }
    }
}

/// Process-wide rules engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Initial base lockup durations.
    pub base_durations: BaseDurations,
    /// Category assumed for accounts that were never classified.
    pub default_category: Category,
    /// Decay mode for lots originated by issuer transfers.
    pub issuer_lot_decay: DecayMode,
    /// Decay mode policy for propagated lots.
    pub propagation_decay: PropagationDecay,
    /// Admin audit events retained in memory.
    pub audit_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_durations: BaseDurations::default(),
            default_category: Category::Domestic,
            issuer_lot_decay: DecayMode::Cliff,
            propagation_decay: PropagationDecay::Inherit,
            audit_capacity: constants::DEFAULT_AUDIT_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config; missing fields take their defaults.
    ///
    /// # Errors
    /// Returns `Configuration` if the JSON is malformed or fails validation.
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| TransferRulesError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    /// Returns `Configuration` on zero durations or zero audit capacity.
    pub fn validate(&self) -> crate::Result<()> {
        self.base_durations
            .validate()
            .map_err(|e| TransferRulesError::Configuration(e.to_string()))?;
        if self.audit_capacity == 0 {
            return Err(TransferRulesError::Configuration(
                "audit_capacity must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
