//! KPI summary over a filtered set of records.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::normalize::{mean, round2};
use crate::record::{Month, Record};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub total_links_triggered: i64,
    pub total_responses: i64,
    pub avg_percent_response: Option<f64>,
    pub total_concern_count: i64,
    pub avg_cc_per_1000: Option<f64>,
    pub record_count: usize,
    /// Present only for datasets that report OSAT.
    #[serde(flatten)]
    pub osat: Option<OsatSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OsatSummary {
    pub avg_osat: Option<f64>,
}

pub fn compute_kpis(rows: &[&Record], include_osat: bool) -> KpiSummary {
    let total_links: f64 = rows.iter().filter_map(|r| r.links_triggered).sum();
    let total_responses: f64 = rows.iter().filter_map(|r| r.response).sum();
    let total_concerns: f64 = rows.iter().filter_map(|r| r.concern_count).sum();

    let per_link = |total: f64, scale: f64| {
        if total_links != 0.0 {
            round2(Some(total / total_links * scale))
        } else {
            None
        }
    };

    KpiSummary {
        total_links_triggered: total_links as i64,
        total_responses: total_responses as i64,
        avg_percent_response: per_link(total_responses, 100.0),
        total_concern_count: total_concerns as i64,
        avg_cc_per_1000: per_link(total_concerns, 1000.0),
        record_count: rows.len(),
        osat: include_osat.then(|| OsatSummary {
            avg_osat: round2(mean(rows.iter().map(|r| r.osat))),
        }),
    }
}

/// CC/1000 for one month of the trend chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub month: Month,
    pub cc_per_1000: f64,
}

/// Month-wise CC/1000 in fiscal order, with the mean across plotted months.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CcTrend {
    pub points: Vec<TrendPoint>,
    pub average: Option<f64>,
}

/// Per month: total concerns / total links * 1000. Months without links are
/// left out; absent values count as zero.
pub fn month_wise_cc(rows: &[&Record]) -> CcTrend {
    let mut totals: BTreeMap<Month, (f64, f64)> = BTreeMap::new();
    for record in rows {
        let entry = totals.entry(record.month).or_default();
        entry.0 += record.links_triggered.unwrap_or(0.0);
        entry.1 += record.concern_count.unwrap_or(0.0);
    }

    let points: Vec<TrendPoint> = totals
        .into_iter()
        .filter(|(_, (links, _))| *links > 0.0)
        .filter_map(|(month, (links, concerns))| {
            round2(Some(concerns / links * 1000.0)).map(|cc_per_1000| TrendPoint { month, cc_per_1000 })
        })
        .collect();

    let average = round2(mean(points.iter().map(|p| Some(p.cc_per_1000))));
    CcTrend { points, average }
}
