//! Header row resolution.
//!
//! The four workbooks name their columns inconsistently ("Division", "Branch",
//! "Outlet", "Diviosion"...). Each semantic field carries an ordered list of
//! token groups; the first group with a substring hit on any header wins.

use crate::sheet_parser::Cell;

/// Canonical header text: whitespace runs collapsed, known misspelling fixed.
/// An empty result means the column has no usable header.
pub fn normalize_header(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.to_lowercase() == "diviosion" {
        return "Division".to_string();
    }
    collapsed
}

/// Lowercased normalized header → column index, in first-seen order.
///
/// A repeated header keeps its original position but points at the later column.
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    entries: Vec<(String, usize)>,
}

impl HeaderMap {
    pub fn build(header_row: &[Cell]) -> Self {
        let mut map = Self::default();
        for (idx, cell) in header_row.iter().enumerate() {
            let Some(raw) = cell.as_text() else {
                continue;
            };
            let header = normalize_header(&raw);
            if header.is_empty() {
                continue;
            }
            map.insert(header.to_lowercase(), idx);
        }
        map
    }

    fn insert(&mut self, key: String, idx: usize) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = idx,
            None => self.entries.push((key, idx)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// First header (in map order) containing any of the tokens.
    fn find_any(&self, tokens: &[&str]) -> Option<usize> {
        self.entries
            .iter()
            .find(|(header, _)| tokens.iter().any(|t| header.contains(t)))
            .map(|(_, idx)| *idx)
    }

    /// Try token groups in priority order.
    pub fn resolve(&self, token_groups: &[&[&str]]) -> Option<usize> {
        token_groups.iter().find_map(|tokens| self.find_any(tokens))
    }
}

/// Semantic columns the loader looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    MileId,
    LinksTriggered,
    Response,
    Nps,
    ConcernCount,
    CcPer1000,
    Osat,
    AdvisorName,
    Division,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::MileId,
        Field::LinksTriggered,
        Field::Response,
        Field::Nps,
        Field::ConcernCount,
        Field::CcPer1000,
        Field::Osat,
        Field::AdvisorName,
        Field::Division,
    ];

    pub fn token_groups(self) -> &'static [&'static [&'static str]] {
        match self {
            Field::MileId => &[&["mile id"], &["mileid"], &["mile"], &["mile_id"]],
            Field::LinksTriggered => &[
                &["links triggered"],
                &["links trig"],
                &["link triggered"],
                &["links"],
                &["trigger"],
            ],
            Field::Response => &[
                &["total response"],
                &["responses"],
                &["response"],
                &["respon"],
                &["reply"],
            ],
            Field::Nps => &[&["nps"], &["np score"], &["np"]],
            Field::ConcernCount => &[&["concern count"], &["concern"], &["complaint"]],
            Field::CcPer1000 => &[&["cc/1000"], &["cc/10"], &["cc per"], &["cc per 1000"]],
            Field::Osat => &[
                &["osat"],
                &["overall satisfaction"],
                &["overall sat"],
                &["osat%"],
                &["os"],
            ],
            Field::AdvisorName => &[
                &["sa name"],
                &["service advisor name"],
                &["service advisor"],
                &["advisor name"],
                &["advisor"],
                &["sa  "],
                &["sa_"],
                &["sa"],
            ],
            Field::Division => &[
                &["division name"],
                &["division"],
                &["diviosion"],
                &["divn"],
                &["div."],
                &["div "],
                &["div"],
                &["branch name"],
                &["branch"],
                &["outlet"],
                &["workshop"],
                &["dealer location"],
                &["location"],
            ],
        }
    }
}

/// Column index of every field for one sheet, resolved once per header row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnLayout {
    pub mile_id: Option<usize>,
    pub links_triggered: Option<usize>,
    pub response: Option<usize>,
    pub nps: Option<usize>,
    pub concern_count: Option<usize>,
    pub cc_per_1000: Option<usize>,
    pub osat: Option<usize>,
    pub advisor_name: Option<usize>,
    pub division: Option<usize>,
}

impl ColumnLayout {
    pub fn resolve(map: &HeaderMap) -> Self {
        let mut layout = Self::default();
        for field in Field::ALL {
            let idx = map.resolve(field.token_groups());
            match field {
                Field::MileId => layout.mile_id = idx,
                Field::LinksTriggered => layout.links_triggered = idx,
                Field::Response => layout.response = idx,
                Field::Nps => layout.nps = idx,
                Field::ConcernCount => layout.concern_count = idx,
                Field::CcPer1000 => layout.cc_per_1000 = idx,
                Field::Osat => layout.osat = idx,
                Field::AdvisorName => layout.advisor_name = idx,
                Field::Division => layout.division = idx,
            }
        }
        layout
    }
}
