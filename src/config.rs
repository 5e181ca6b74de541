use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Category weights for the migration difficulty score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Weight for the logic complexity category (0.0-1.0)
    #[serde(default = "default_logic_weight")]
    pub logic: f64,

    /// Weight for the data complexity category (0.0-1.0)
    #[serde(default = "default_data_weight")]
    pub data: f64,

    /// Weight for the COBOL-specific risk category (0.0-1.0)
    #[serde(default = "default_risk_weight")]
    pub cobol_risk: f64,
}

fn default_logic_weight() -> f64 {
    0.35
}

fn default_data_weight() -> f64 {
    0.35
}

fn default_risk_weight() -> f64 {
    0.30
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            logic: default_logic_weight(),
            data: default_data_weight(),
            cobol_risk: default_risk_weight(),
        }
    }
}

impl ScoringWeights {
    fn is_valid_weight(weight: f64) -> bool {
        (0.0..=1.0).contains(&weight)
    }

    pub fn validate(&self) -> Result<()> {
        for (weight, name) in [
            (self.logic, "logic"),
            (self.data, "data"),
            (self.cobol_risk, "cobol_risk"),
        ] {
            if !Self::is_valid_weight(weight) {
                return Err(anyhow!("{} weight must be between 0.0 and 1.0", name));
            }
        }

        let sum = self.logic + self.data + self.cobol_risk;
        if (sum - 1.0).abs() > 0.001 {
            return Err(anyhow!(
                "Scoring weights must sum to 1.0, but sum to {:.3}",
                sum
            ));
        }
        Ok(())
    }
}

/// Analysis options shared by the analyzers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Linkage-library tokens that mark a CALL as suspected assembly.
    /// Shop-specific, hence configuration rather than a constant.
    #[serde(default = "default_assembly_tokens")]
    pub assembly_linkage_tokens: Vec<String>,

    /// Treat column 7 as the fixed-format indicator column
    #[serde(default = "default_fixed_column")]
    pub fixed_column_comments: bool,

    /// Glob patterns excluded from directory walks
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

fn default_assembly_tokens() -> Vec<String> {
    ["ASMLIB", "ASSEMBLER", "ASMPGM", "BALR"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_fixed_column() -> bool {
    true
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            assembly_linkage_tokens: default_assembly_tokens(),
            fixed_column_comments: default_fixed_column(),
            ignore_patterns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CobmapConfig {
    #[serde(default)]
    pub scoring: ScoringWeights,

    #[serde(default)]
    pub analysis: AnalysisConfig,
}

pub const DEFAULT_CONFIG_FILE: &str = "cobmap.toml";

impl CobmapConfig {
    /// Load configuration from an explicit path, or from `cobmap.toml`
    /// in the working directory when present, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let candidate = match path {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                default.exists().then(|| default.to_path_buf())
            }
        };

        let config = match candidate {
            Some(p) => {
                let raw = fs::read_to_string(&p)
                    .with_context(|| format!("Failed to read config file {}", p.display()))?;
                let config: CobmapConfig = toml::from_str(&raw)
                    .with_context(|| format!("Failed to parse config file {}", p.display()))?;
                log::debug!("Loaded config from {}", p.display());
                config
            }
            None => {
                log::debug!("No config file found, using defaults");
                CobmapConfig::default()
            }
        };

        config.scoring.validate()?;
        Ok(config)
    }
}

/// Commented starter configuration written by `cobmap init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# cobmap configuration

[scoring]
# Category weights for the overall migration difficulty score.
# Must sum to 1.0.
logic = 0.35
data = 0.35
cobol_risk = 0.30

[analysis]
# CALL statements mentioning any of these tokens are counted as
# suspected assembly-language calls. Adjust to your shop's linkage
# library naming.
assembly_linkage_tokens = ["ASMLIB", "ASSEMBLER", "ASMPGM", "BALR"]

# Treat column 7 as the fixed-format indicator column.
fixed_column_comments = true

# Glob patterns excluded from directory walks.
ignore_patterns = []
"#;
