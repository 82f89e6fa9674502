use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Every field has a default, so an empty document is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconConfig {
    pub bom: BomConfig,
    pub authority: AuthorityConfig,
    pub reference: ReferenceConfig,
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Per-source BOM exports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BomConfig {
    /// Accepted names (case-insensitive) for the hierarchy level column.
    pub level_aliases: Vec<String>,
    /// Accepted names (case-insensitive) for the description column.
    pub description_aliases: Vec<String>,
    /// Level value that opens a new top assembly.
    pub top_level_sentinel: String,
    /// Header of the inserted source-id column.
    pub source_column: String,
    /// Header of the inserted group-label column.
    pub group_column: String,
}

impl Default for BomConfig {
    fn default() -> Self {
        Self {
            level_aliases: strings(&["dglvl", "dg_lvl", "bom level"]),
            description_aliases: strings(&["ojtxp", "description"]),
            top_level_sentinel: ".1".into(),
            source_column: "Source File".into(),
            group_column: "GA Name".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// OEM structure report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorityConfig {
    pub sheet: String,
    /// 1-based physical row holding the header; rows above it are skipped.
    pub header_row: u32,
    pub material: String,
    pub third_party: String,
    pub part_version: String,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            sheet: "Structure Report".into(),
            header_row: 3,
            material: "Material".into(),
            third_party: "3rd Party Company No.".into(),
            part_version: "part version (AI)".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation columns read from the consolidated BOM
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReferenceConfig {
    pub component: String,
    pub bmw_part: String,
    pub needed: String,
    pub ai_index: String,
    pub description: String,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            component: "Component".into(),
            bmw_part: "BMW part no.".into(),
            needed: "Part No. needed at BMW".into(),
            ai_index: "BMW AI index".into(),
            description: "Description".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub dir: String,
    pub prefix: String,
    /// Also write the consolidated BOM as a second sheet.
    pub include_merged_sheet: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: ".".into(),
            prefix: "BMW_Validation_Result".into(),
            include_merged_sheet: true,
        }
    }
}

impl OutputConfig {
    /// `<prefix>_<YYYYMMDD_HHMMSS>.xlsx`
    pub fn file_name(&self, at: chrono::NaiveDateTime) -> String {
        format!("{}_{}.xlsx", self.prefix, at.format("%Y%m%d_%H%M%S"))
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ReconError> {
        toml::to_string_pretty(self).map_err(|e| ReconError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let bom = &self.bom;
        if bom.level_aliases.iter().all(|a| a.trim().is_empty()) {
            return Err(ReconError::ConfigValidation(
                "bom.level_aliases must name at least one column".into(),
            ));
        }
        if bom.description_aliases.iter().all(|a| a.trim().is_empty()) {
            return Err(ReconError::ConfigValidation(
                "bom.description_aliases must name at least one column".into(),
            ));
        }
        if bom.top_level_sentinel.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "bom.top_level_sentinel must not be blank".into(),
            ));
        }
        if bom.source_column.is_empty() || bom.group_column.is_empty() {
            return Err(ReconError::ConfigValidation(
                "bom.source_column and bom.group_column must not be empty".into(),
            ));
        }

        if self.authority.header_row == 0 {
            return Err(ReconError::ConfigValidation(
                "authority.header_row is 1-based, got 0".into(),
            ));
        }
        let authority_cols = [
            ("authority.sheet", &self.authority.sheet),
            ("authority.material", &self.authority.material),
            ("authority.third_party", &self.authority.third_party),
            ("authority.part_version", &self.authority.part_version),
        ];
        let reference_cols = [
            ("reference.component", &self.reference.component),
            ("reference.bmw_part", &self.reference.bmw_part),
            ("reference.needed", &self.reference.needed),
            ("reference.ai_index", &self.reference.ai_index),
            ("reference.description", &self.reference.description),
        ];
        for (key, value) in authority_cols.iter().chain(reference_cols.iter()) {
            if value.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!("{key} must not be blank")));
            }
        }

        if self.output.prefix.trim().is_empty() {
            return Err(ReconError::ConfigValidation("output.prefix must not be blank".into()));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = ReconConfig::from_toml("").unwrap();
        assert_eq!(config, ReconConfig::default());
        assert_eq!(config.bom.top_level_sentinel, ".1");
        assert_eq!(config.authority.sheet, "Structure Report");
        assert_eq!(config.authority.header_row, 3);
        assert!(config.output.include_merged_sheet);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let input = r#"
[bom]
level_aliases = ["Level"]

[authority]
header_row = 1

[output]
prefix = "Check"
include_merged_sheet = false
"#;
        let config = ReconConfig::from_toml(input).unwrap();
        assert_eq!(config.bom.level_aliases, vec!["Level"]);
        assert_eq!(config.bom.description_aliases, vec!["ojtxp", "description"]);
        assert_eq!(config.authority.header_row, 1);
        assert_eq!(config.authority.material, "Material");
        assert_eq!(config.output.prefix, "Check");
        assert!(!config.output.include_merged_sheet);
    }

    #[test]
    fn round_trips_through_toml() {
        let text = ReconConfig::default().to_toml().unwrap();
        assert_eq!(ReconConfig::from_toml(&text).unwrap(), ReconConfig::default());
    }

    #[test]
    fn reject_unknown_key() {
        let err = ReconConfig::from_toml("[bom]\nlevel = [\"x\"]\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn reject_empty_alias_set() {
        let err = ReconConfig::from_toml("[bom]\ndescription_aliases = []\n").unwrap_err();
        assert!(err.to_string().contains("description_aliases"));
    }

    #[test]
    fn reject_zero_header_row() {
        let err = ReconConfig::from_toml("[authority]\nheader_row = 0\n").unwrap_err();
        assert!(err.to_string().contains("1-based"));
    }

    #[test]
    fn reject_blank_reference_column() {
        let err = ReconConfig::from_toml("[reference]\ncomponent = \" \"\n").unwrap_err();
        assert!(err.to_string().contains("reference.component"));
    }

    #[test]
    fn output_file_name_uses_timestamp() {
        let at = chrono::NaiveDate::from_ymd_opt(2026, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 7)
            .unwrap();
        assert_eq!(
            OutputConfig::default().file_name(at),
            "BMW_Validation_Result_20260309_140507.xlsx"
        );
    }
}
