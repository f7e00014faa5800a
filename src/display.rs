//! Presentation settings the dashboard page reads at load time.

use serde_json::{json, Value};

use crate::registry::DatasetKind;

/// Full division name (as exported) → short label shown in the table.
const DIVISION_SHORT_NAMES: &[(&str, &str)] = &[
    ("NAGPUR_KAMPTHEE ROAD", "HO"),
    ("YAVATMAL", "YAT"),
    ("WAGHOLI", "WAG"),
    ("CHAUFULA_SZZ", "CHA"),
    ("AMRAVATI", "AMT"),
    ("KOLHAPUR_WS", "KOL"),
    ("SHIKRAPUR_SZS", "SHI"),
    ("CHIKHALI", "CHI"),
    ("NAGPUR_WARDHAMAN NGR", "CITY"),
    ("NAGPUR_WARDHAMANNGR", "CITY"),
    ("NAGPUR_WARDHAMAN_NGR", "CITY"),
];

/// % of Response at or above this is good.
const PERCENT_RESPONSE_GOOD_MIN: f64 = 30.0;
/// CC/1000 above this is bad.
const CC_PER_1000_BAD_ABOVE: f64 = 20.0;
/// OSAT at or above this is good.
const OSAT_GOOD_MIN: f64 = 70.0;

const PAGE_SIZES: [usize; 4] = [25, 50, 100, 200];
const DEFAULT_PAGE_SIZE: usize = 50;

/// Short table label for a division; unknown names are shown trimmed.
pub fn division_short(name: &str) -> &str {
    let trimmed = name.trim();
    DIVISION_SHORT_NAMES
        .iter()
        .find(|(full, _)| *full == trimmed)
        .map(|(_, short)| *short)
        .unwrap_or(trimmed)
}

/// Settings object embedded in the page as `PAGE`.
pub fn page_config(kind: DatasetKind) -> Value {
    let short_names: serde_json::Map<String, Value> = DIVISION_SHORT_NAMES
        .iter()
        .map(|(full, _)| (full.to_string(), Value::from(division_short(full))))
        .collect();

    json!({
        "dataset": kind.key(),
        "show_osat": kind.show_osat(),
        "table_mode": kind.table_mode().as_str(),
        "columns": kind.export_columns().iter().map(|c| c.label()).collect::<Vec<_>>(),
        "division_short": short_names,
        "thresholds": {
            "percent_response_good_min": PERCENT_RESPONSE_GOOD_MIN,
            "cc_per_1000_bad_above": CC_PER_1000_BAD_ABOVE,
            "osat_good_min": OSAT_GOOD_MIN,
        },
        "page_sizes": PAGE_SIZES,
        "default_page_size": DEFAULT_PAGE_SIZE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_division_short() {
        assert_eq!(division_short("NAGPUR_KAMPTHEE ROAD"), "HO");
        assert_eq!(division_short(" WAGHOLI "), "WAG");
        assert_eq!(division_short("NAGPUR_WARDHAMANNGR"), "CITY");
        assert_eq!(division_short("  Pune "), "Pune");
        assert_eq!(division_short(""), "");
    }

    #[test]
    fn test_page_config() {
        let config = page_config(DatasetKind::BodyShop);
        assert_eq!(config["show_osat"], false);
        assert_eq!(config["table_mode"], "bodyshop");
        assert_eq!(config["division_short"]["YAVATMAL"], "YAT");
        assert_eq!(config["thresholds"]["percent_response_good_min"], 30.0);
        assert_eq!(config["thresholds"]["cc_per_1000_bad_above"], 20.0);
        assert_eq!(config["thresholds"]["osat_good_min"], 70.0);
        assert_eq!(config["default_page_size"], 50);
        assert!(!config["columns"]
            .as_array()
            .unwrap()
            .iter()
            .any(|c| c == "OSAT"));
    }
}
