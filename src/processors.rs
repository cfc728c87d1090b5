// src/processors.rs - Table cleaning stages
pub mod age;
pub mod columns;
pub mod decode;
pub mod impute;
pub mod income;
pub mod missing;
pub mod select;
pub mod work_status;

pub use age::{filter_by_age, AgeFilter};
pub use columns::{drop_columns, DropColumns};
pub use decode::{decode_categorical, mapped_column_name, DecodeCategorical};
pub use impute::{impute_missing, ImputeMissing};
pub use income::{impute_income, ImputeIncome, IncomeRule, HAS_INCOME_FLAG};
pub use missing::{missing_values_summary, ColumnMissing, MissingSummary};
pub use select::{select_and_rename, SelectColumns};
pub use work_status::{normalize_work_status, NormalizeWorkStatus};
