//! The fixed set of dashboards and their datasets.
//!
//! Built once in `main` and shared read-only with the handlers.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::dataset::Dataset;
use crate::record::Column;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    Personal,
    Meal,
    BodyShop,
    Commercial,
}

/// How the UI lays out the records table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMode {
    Normal,
    BodyShop,
}

impl TableMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TableMode::Normal => "normal",
            TableMode::BodyShop => "bodyshop",
        }
    }
}

const STANDARD_EXPORT: &[Column] = &[
    Column::Month,
    Column::SaName,
    Column::LinksTriggered,
    Column::Response,
    Column::PercentResponse,
    Column::ConcernCount,
    Column::CcPer1000,
    Column::Osat,
    Column::Nps,
    Column::Division,
    Column::MileId,
];

const BODY_SHOP_EXPORT: &[Column] = &[
    Column::Month,
    Column::SaName,
    Column::LinksTriggered,
    Column::Response,
    Column::PercentResponse,
    Column::ConcernCount,
    Column::CcPer1000,
    Column::Division,
    Column::MileId,
];

impl DatasetKind {
    pub const ALL: [DatasetKind; 4] = [
        DatasetKind::Personal,
        DatasetKind::Meal,
        DatasetKind::BodyShop,
        DatasetKind::Commercial,
    ];

    /// Route and query-parameter key. Unknown keys fall back to Personal.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_lowercase().as_str() {
            "meal" => DatasetKind::Meal,
            "bodyshop" => DatasetKind::BodyShop,
            "commercial" => DatasetKind::Commercial,
            _ => DatasetKind::Personal,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            DatasetKind::Personal => "personal",
            DatasetKind::Meal => "meal",
            DatasetKind::BodyShop => "bodyshop",
            DatasetKind::Commercial => "commercial",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            DatasetKind::Personal => "Personal",
            DatasetKind::Meal => "MEAL",
            DatasetKind::BodyShop => "Body Shop",
            DatasetKind::Commercial => "Commercial",
        }
    }

    pub fn page_title(self) -> String {
        format!(
            "UNNATI MOTORS - SERVICE INTELLO ({})",
            self.display_name().to_uppercase()
        )
    }

    /// Body Shop workbooks carry no OSAT/NPS.
    pub fn show_osat(self) -> bool {
        !matches!(self, DatasetKind::BodyShop)
    }

    pub fn table_mode(self) -> TableMode {
        match self {
            DatasetKind::BodyShop => TableMode::BodyShop,
            _ => TableMode::Normal,
        }
    }

    pub fn export_columns(self) -> &'static [Column] {
        match self {
            DatasetKind::BodyShop => BODY_SHOP_EXPORT,
            _ => STANDARD_EXPORT,
        }
    }

    pub fn path_env_var(self) -> &'static str {
        match self {
            DatasetKind::Personal => "PERSONAL_XLSX",
            DatasetKind::Meal => "MEAL_XLSX",
            DatasetKind::BodyShop => "BODYSHOP_XLSX",
            DatasetKind::Commercial => "COMMERCIAL_XLSX",
        }
    }

    pub fn default_file_name(self) -> &'static str {
        match self {
            DatasetKind::Personal => "Link Triggered.xlsx",
            DatasetKind::Meal => "Link Triggered MEAL.xlsx",
            DatasetKind::BodyShop => "Link Triggered BP.xlsx",
            DatasetKind::Commercial => "Link Triggered Commercial.xlsx",
        }
    }
}

/// Every dataset, loaded once.
#[derive(Debug)]
pub struct DatasetRegistry {
    datasets: HashMap<DatasetKind, Dataset>,
}

impl DatasetRegistry {
    /// Load each configured workbook in turn. Broken workbooks yield datasets
    /// in the error state rather than failing startup.
    pub fn load(sources: &[(DatasetKind, PathBuf)]) -> Self {
        Self::from_datasets(
            sources
                .iter()
                .map(|(kind, path)| (*kind, Dataset::load(kind.display_name(), path))),
        )
    }

    pub fn from_datasets(datasets: impl IntoIterator<Item = (DatasetKind, Dataset)>) -> Self {
        Self {
            datasets: datasets.into_iter().collect(),
        }
    }

    pub fn get(&self, kind: DatasetKind) -> Option<&Dataset> {
        self.datasets.get(&kind)
    }

    /// Resolve a request key: unknown keys mean Personal.
    pub fn resolve(&self, key: &str) -> (DatasetKind, Option<&Dataset>) {
        let kind = DatasetKind::from_key(key);
        (kind, self.get(kind))
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }
}
