//! Reporting record types.

use serde::{Serialize, Serializer};

/// Fiscal month. Ordering follows the fiscal year, April first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Month {
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
    Jan,
    Feb,
    Mar,
}

impl Month {
    pub const FISCAL_ORDER: [Month; 12] = [
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
        Month::Jan,
        Month::Feb,
        Month::Mar,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
        }
    }

    /// Month a sheet reports on, from the first three characters of its name.
    /// "April-Summary" is `Apr`; "Notes" is not a month sheet.
    pub fn detect(sheet_name: &str) -> Option<Month> {
        let key: String = sheet_name.trim().chars().take(3).collect::<String>().to_lowercase();
        Self::FISCAL_ORDER
            .into_iter()
            .find(|m| m.label().to_lowercase() == key)
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One normalized reporting row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    #[serde(rename = "Month")]
    pub month: Month,
    #[serde(rename = "SA Name")]
    pub sa_name: Option<String>,
    #[serde(rename = "Division")]
    pub division: Option<String>,
    #[serde(rename = "Mile id")]
    pub mile_id: Option<String>,
    #[serde(rename = "Links Triggered")]
    pub links_triggered: Option<f64>,
    #[serde(rename = "Response")]
    pub response: Option<f64>,
    #[serde(rename = "NPS")]
    pub nps: Option<f64>,
    #[serde(rename = "% of Response")]
    pub percent_response: Option<f64>,
    #[serde(rename = "Concern Count")]
    pub concern_count: Option<f64>,
    #[serde(rename = "CC/1000")]
    pub cc_per_1000: Option<f64>,
    #[serde(rename = "OSAT")]
    pub osat: Option<f64>,
}

impl Record {
    pub fn new(month: Month) -> Self {
        Self {
            month,
            sa_name: None,
            division: None,
            mile_id: None,
            links_triggered: None,
            response: None,
            nps: None,
            percent_response: None,
            concern_count: None,
            cc_per_1000: None,
            osat: None,
        }
    }

    /// A row with no advisor, no division and none of the headline metrics.
    pub fn is_noise(&self) -> bool {
        self.sa_name.is_none()
            && self.division.is_none()
            && self.links_triggered.is_none()
            && self.response.is_none()
            && self.nps.is_none()
            && self.osat.is_none()
    }

    pub fn value(&self, column: Column) -> CellOut<'_> {
        match column {
            Column::Month => CellOut::Text(self.month.label()),
            Column::SaName => CellOut::text(&self.sa_name),
            Column::Division => CellOut::text(&self.division),
            Column::MileId => CellOut::text(&self.mile_id),
            Column::LinksTriggered => CellOut::number(self.links_triggered),
            Column::Response => CellOut::number(self.response),
            Column::Nps => CellOut::number(self.nps),
            Column::PercentResponse => CellOut::number(self.percent_response),
            Column::ConcernCount => CellOut::number(self.concern_count),
            Column::CcPer1000 => CellOut::number(self.cc_per_1000),
            Column::Osat => CellOut::number(self.osat),
        }
    }
}

/// Exportable record columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Month,
    SaName,
    Division,
    MileId,
    LinksTriggered,
    Response,
    Nps,
    PercentResponse,
    ConcernCount,
    CcPer1000,
    Osat,
}

impl Column {
    pub fn label(self) -> &'static str {
        match self {
            Column::Month => "Month",
            Column::SaName => "SA Name",
            Column::Division => "Division",
            Column::MileId => "Mile id",
            Column::LinksTriggered => "Links Triggered",
            Column::Response => "Response",
            Column::Nps => "NPS",
            Column::PercentResponse => "% of Response",
            Column::ConcernCount => "Concern Count",
            Column::CcPer1000 => "CC/1000",
            Column::Osat => "OSAT",
        }
    }
}

/// A record value as it goes into an export cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellOut<'a> {
    Blank,
    Text(&'a str),
    Number(f64),
}

impl<'a> CellOut<'a> {
    fn text(value: &'a Option<String>) -> Self {
        match value {
            Some(s) => CellOut::Text(s.as_str()),
            None => CellOut::Blank,
        }
    }

    fn number(value: Option<f64>) -> Self {
        match value {
            Some(n) => CellOut::Number(n),
            None => CellOut::Blank,
        }
    }
}
