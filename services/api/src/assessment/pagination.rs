use serde_json::Value;
use vitalwatch_scoring::PatientRecord;

/// Hard cap on listing requests per run.
pub const MAX_PAGE_ITERATIONS: u32 = 100;
/// Largest gap between the server-reported page and our own counter that
/// still lets the server's number drive the `totalPages` comparison.
pub const PAGE_DRIFT_TOLERANCE: u64 = 2;

/// `pagination` object attached to a listing response.
///
/// Only the fields that steer continuation are read; `limit` and
/// `hasPrevious` carry nothing the cursor needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationMeta {
    pub page: Option<u64>,
    pub total: Option<u64>,
    pub total_pages: Option<u64>,
    pub has_next: Option<bool>,
}

impl PaginationMeta {
    /// Read each field on its own, so one badly typed field only loses itself.
    pub fn from_body(body: &Value) -> Option<Self> {
        let raw = body.get("pagination")?;
        if !raw.is_object() {
            tracing::debug!("ignoring non-object pagination metadata");
            return None;
        }
        Some(Self {
            page: raw.get("page").and_then(count_from_value),
            total: raw.get("total").and_then(count_from_value),
            total_pages: raw.get("totalPages").and_then(count_from_value),
            has_next: raw.get("hasNext").and_then(Value::as_bool),
        })
    }
}

/// Non-negative whole number from an integer, an integral float or a
/// numeric string.
fn count_from_value(value: &Value) -> Option<u64> {
    let n = match value {
        Value::Number(n) => match n.as_u64() {
            Some(u) => return Some(u),
            None => n.as_f64()?,
        },
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= u64::MAX as f64).then_some(n as u64)
}

type ShapeExtractor = fn(&Value) -> Option<&Vec<Value>>;

/// Listing shapes the provider has been seen to return, in priority order.
const PAGE_SHAPES: &[(&str, ShapeExtractor)] = &[
    ("data", data_list),
    ("bare_list", bare_list),
    ("patients", patients_list),
    ("results", results_list),
];

fn data_list(body: &Value) -> Option<&Vec<Value>> {
    body.get("data")?.as_array()
}

fn bare_list(body: &Value) -> Option<&Vec<Value>> {
    body.as_array()
}

fn patients_list(body: &Value) -> Option<&Vec<Value>> {
    body.get("patients")?.as_array()
}

fn results_list(body: &Value) -> Option<&Vec<Value>> {
    body.get("results")?.as_array()
}

/// Locate the patient list in a listing body.
///
/// Returns the matched shape name and the raw entries, or `None` when no
/// known shape matches.
pub fn extract_page(body: &Value) -> Option<(&'static str, &[Value])> {
    PAGE_SHAPES
        .iter()
        .find_map(|(name, extract)| extract(body).map(|items| (*name, items.as_slice())))
}

/// Convert raw entries into patient records, skipping entries that are not
/// JSON objects.
pub fn records_from_entries(page: u64, entries: &[Value]) -> Vec<PatientRecord> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            if !entry.is_object() {
                tracing::warn!(page, index, "skipping non-object patient entry");
                return None;
            }
            match serde_json::from_value(entry.clone()) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(page, index, error = %e, "skipping undecodable patient entry");
                    None
                }
            }
        })
        .collect()
}

/// Cursor over the listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    pub page: u64,
    pub has_next: bool,
    pub remaining: u32,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page: 1,
            has_next: true,
            remaining: MAX_PAGE_ITERATIONS,
        }
    }
}

impl PaginationState {
    pub fn should_fetch(&self) -> bool {
        self.has_next && self.remaining > 0
    }

    /// Stopped by the iteration cap while the last page still pointed at more data.
    pub fn hit_safety_cap(&self) -> bool {
        self.has_next && self.remaining == 0
    }

    /// Fold one fetched page into the cursor.
    ///
    /// More data is assumed when the metadata says so or when the page came
    /// back full. A short page never overrides metadata that reports more.
    pub fn advance(&mut self, meta: Option<&PaginationMeta>, returned: usize, limit: usize) {
        let local = self.page;
        let reported = meta.and_then(|m| m.page);
        let current = match reported {
            Some(r) if r.abs_diff(local) <= PAGE_DRIFT_TOLERANCE => r,
            _ => local,
        };

        let metadata_more = meta.is_some_and(|m| {
            m.has_next == Some(true) || m.total_pages.is_some_and(|total| current < total)
        });
        let count_more = returned >= limit;

        self.page = reported.map_or(local + 1, |r| (r + 1).max(local + 1));
        self.has_next = metadata_more || count_more;
        self.remaining = self.remaining.saturating_sub(1);
    }
}
