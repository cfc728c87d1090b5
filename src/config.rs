// src/config.rs - Survey extract configuration (column maps, strategies, paths)
use crate::error::CleaningError;
use crate::table::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Code → label lookup for a coded categorical column
pub type CategoryMap = IndexMap<i64, String>;

/// Everything the cleaning stages need to know about the extract.
/// Built once at startup and passed by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SurveyConfig {
    pub paths: PathsConfig,
    pub load: LoadOptions,
    /// Source column → output column, in output order
    pub column_map: IndexMap<String, String>,
    pub drop_after_age_filter: Vec<String>,
    pub min_age: f64,
    pub age_column: String,
    /// Count rows with an unparseable age separately from rows below the threshold
    pub report_unparseable_ages: bool,
    pub work_status: WorkStatusConfig,
    pub income_column: String,
    pub imputation: IndexMap<String, Strategy>,
    /// Source column → code map; each produces a `<column>_mapped` column
    pub category_maps: IndexMap<String, CategoryMap>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub raw: PathBuf,
    pub selected: PathBuf,
    pub cleaned: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadOptions {
    /// Encoding labels, tried in order
    pub encodings: Vec<String>,
    pub delimiter: char,
    /// Field contents read as missing
    pub na_values: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatusInput {
    /// Numeric codes that still need mapping to labels
    Coded,
    /// Already holds text labels
    Labeled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkStatusConfig {
    pub column: String,
    pub input: WorkStatusInput,
    pub codes: CategoryMap,
    pub worked_label: String,
    pub not_worked_label: String,
}

/// How to fill a column's missing values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawStrategy", into = "RawStrategy")]
pub enum Strategy {
    Median,
    MostFrequent,
    Literal(Value),
}

const MOST_FREQUENT_KEYWORDS: [&str; 3] = ["mode", "most_frequent", "most-frequent"];

impl Strategy {
    /// Text literals that would be read back as a strategy keyword.
    fn shadows_keyword(&self) -> bool {
        match self {
            Strategy::Literal(Value::Text(s)) => {
                s == "median" || MOST_FREQUENT_KEYWORDS.contains(&s.as_str())
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawStrategy {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<RawStrategy> for Strategy {
    fn from(raw: RawStrategy) -> Self {
        match raw {
            RawStrategy::Int(i) => Strategy::Literal(Value::Int(i)),
            RawStrategy::Float(f) => Strategy::Literal(Value::Float(f)),
            RawStrategy::Text(s) if s == "median" => Strategy::Median,
            RawStrategy::Text(s) if MOST_FREQUENT_KEYWORDS.contains(&s.as_str()) => {
                Strategy::MostFrequent
            }
            RawStrategy::Text(s) => Strategy::Literal(Value::Text(s)),
        }
    }
}

impl From<Strategy> for RawStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Median => RawStrategy::Text("median".to_string()),
            Strategy::MostFrequent => RawStrategy::Text("mode".to_string()),
            Strategy::Literal(Value::Int(i)) => RawStrategy::Int(i),
            Strategy::Literal(Value::Float(f)) => RawStrategy::Float(f),
            Strategy::Literal(other) => RawStrategy::Text(other.to_string()),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Median => f.write_str("median"),
            Strategy::MostFrequent => f.write_str("mode"),
            Strategy::Literal(value) => write!(f, "literal '{}'", value),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            raw: PathBuf::from("data/01_raw/AHIES2022Q1_2023Q3_SEC01234_202402.csv"),
            selected: PathBuf::from("data/02_intermediate/ahies_selected_for_ev_propensity.csv"),
            cleaned: PathBuf::from("data/02_intermediate/ahies_cleaned_for_eda.csv"),
        }
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            encodings: vec!["ISO-8859-1".to_string(), "windows-1252".to_string()],
            delimiter: ',',
            na_values: ["", "NA", "N/A", "NaN", "nan", "NULL", "null", "#N/A"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for WorkStatusConfig {
    fn default() -> Self {
        WorkStatusConfig {
            column: "worked_last_7_days".to_string(),
            input: WorkStatusInput::Coded,
            codes: category_map(&[(1, "Yes"), (2, "No")]),
            worked_label: "Yes".to_string(),
            not_worked_label: "No".to_string(),
        }
    }
}

fn category_map(pairs: &[(i64, &str)]) -> CategoryMap {
    pairs
        .iter()
        .map(|(code, label)| (*code, label.to_string()))
        .collect()
}

fn string_map(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}

impl Default for SurveyConfig {
    fn default() -> Self {
        let column_map = string_map(&[
            ("hhid", "household_id"),
            ("personid", "person_id"),
            ("region", "region"),
            ("urbrur", "urban_rural"),
            // demographics
            ("s1aq1", "sex"),
            ("s1aq4y", "age"),
            ("s1aq5", "marital_status"),
            // education
            ("s2aq3", "highest_education_level"),
            ("s2aq4", "grade_completed"),
            ("s2aq6", "still_in_school"),
            // income
            ("s4aq55a", "primary_job_income_monthly"),
            ("s4bq9", "secondary_job_income_monthly"),
            // expenditure
            ("s2aq11a2", "tuition_fee_paid_last_12m"),
            ("s2aq11a15", "transportation_cost_to_school_last_12m"),
            ("s2aq11a16", "school_food_cost_last_12m"),
            ("s3aq21", "total_medical_expense_last_12m"),
            // employment
            ("s4aq1", "worked_last_7_days"),
        ]);

        let drop_after_age_filter = [
            "tuition_fee_paid_last_12m",
            "transportation_cost_to_school_last_12m",
            "school_food_cost_last_12m",
            "still_in_school",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let imputation = [
            ("highest_education_level", Strategy::MostFrequent),
            ("grade_completed", Strategy::Median),
            ("secondary_job_income_monthly", Strategy::Literal(Value::Int(0))),
            ("total_medical_expense_last_12m", Strategy::Literal(Value::Int(0))),
            ("marital_status", Strategy::MostFrequent),
        ]
        .into_iter()
        .map(|(col, strategy)| (col.to_string(), strategy))
        .collect();

        let mut category_maps = IndexMap::new();
        category_maps.insert(
            "region".to_string(),
            category_map(&[
                (1, "Western"),
                (2, "Central"),
                (3, "Greater Accra"),
                (4, "Volta"),
                (5, "Eastern"),
                (6, "Ashanti"),
                (7, "Brong Ahafo"),
                (8, "Northern"),
                (9, "Upper East"),
                (10, "Upper West"),
                (11, "Oti"),
                (12, "Bono East"),
                (13, "Ahafo"),
                (14, "Western North"),
                (15, "Savannah"),
                (16, "North East"),
            ]),
        );
        category_maps.insert(
            "urban_rural".to_string(),
            category_map(&[(1, "Urban"), (2, "Rural")]),
        );
        category_maps.insert("sex".to_string(), category_map(&[(1, "Male"), (2, "Female")]));

        SurveyConfig {
            paths: PathsConfig::default(),
            load: LoadOptions::default(),
            column_map,
            drop_after_age_filter,
            min_age: 15.0,
            age_column: "age".to_string(),
            report_unparseable_ages: true,
            work_status: WorkStatusConfig::default(),
            income_column: "primary_job_income_monthly".to_string(),
            imputation,
            category_maps,
        }
    }
}

impl SurveyConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CleaningError> {
        let config: SurveyConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, CleaningError> {
        if !path.exists() {
            return Err(CleaningError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml(&self) -> Result<String, CleaningError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), CleaningError> {
        if self.column_map.is_empty() {
            return Err(CleaningError::Config("column_map cannot be empty".to_string()));
        }
        self.load.delimiter_byte()?;
        if self.load.encodings.is_empty() {
            return Err(CleaningError::Config(
                "at least one encoding is required".to_string(),
            ));
        }
        for label in &self.load.encodings {
            if encoding_rs::Encoding::for_label(label.as_bytes()).is_none() {
                return Err(CleaningError::Config(format!("unknown encoding '{}'", label)));
            }
        }
        if !self.min_age.is_finite() {
            return Err(CleaningError::Config("min_age must be a finite number".to_string()));
        }
        if self.work_status.worked_label == self.work_status.not_worked_label {
            return Err(CleaningError::Config(
                "worked and not-worked labels must differ".to_string(),
            ));
        }
        for (column, strategy) in &self.imputation {
            if strategy.shadows_keyword() {
                return Err(CleaningError::Config(format!(
                    "literal fill {} for '{}' is a strategy name",
                    strategy, column
                )));
            }
        }
        let mut targets = HashSet::new();
        for target in self.column_map.values() {
            if !targets.insert(target.as_str()) {
                return Err(CleaningError::Config(format!(
                    "column_map maps more than one column to '{}'",
                    target
                )));
            }
        }
        Ok(())
    }
}

impl LoadOptions {
    pub fn delimiter_byte(&self) -> Result<u8, CleaningError> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(CleaningError::Config(format!(
                "delimiter '{}' must be a single ASCII character",
                self.delimiter
            )))
        }
    }

    pub fn is_na(&self, field: &str) -> bool {
        self.na_values.iter().any(|na| na == field)
    }
}
