use std::cmp::Ordering;

use chrono::NaiveDate;
use icu_collator::{Collator, CollatorOptions, Strength};
use icu_locid::locale;
use serde::{Deserialize, Serialize};

use crate::schema::FieldKind;

/// Locale-aware text ordering for the view tables. Primary strength so
/// case and diacritics do not split otherwise-equal names; Khmer collation
/// rules since that is the script the sheets hold. Byte-wise ordering is
/// not an acceptable substitute for the name columns.
pub struct Collation {
    collator: Option<Collator>,
}

impl Collation {
    pub fn khmer() -> Self {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Primary);
        let collator = Collator::try_new(&locale!("km").into(), options).ok();
        if collator.is_none() {
            tracing::warn!("km collation data unavailable, falling back to case-folded ordering");
        }
        Collation { collator }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match &self.collator {
            Some(c) => c.compare(a, b),
            None => a.to_lowercase().cmp(&b.to_lowercase()),
        }
    }
}

/// Active filter set. All criteria AND-combine and each is independently
/// optional; `None` selectors are wildcards (the IPC layer maps the "ALL"
/// sentinel down to `None` before it gets here).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub query: String,
    pub teacher: Option<String>,
    pub grade: Option<String>,
    pub gender: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    fn flipped(self) -> SortDir {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec<K> {
    pub key: K,
    pub dir: SortDir,
}

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    /// 1-based; clamped against the filtered total at compute time.
    pub page: usize,
    pub page_size: usize,
}

impl Default for PageSpec {
    fn default() -> Self {
        PageSpec {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    /// 1-based inclusive display range; 0-0 when the view is empty.
    pub start: usize,
    pub end: usize,
}

/// Clamp and slice bookkeeping. Pure; the caller slices with `start..end`.
pub fn paginate(total_items: usize, spec: &PageSpec) -> Pagination {
    let page_size = spec.page_size.max(1);
    let total_pages = (total_items.div_ceil(page_size)).max(1);
    let page = spec.page.clamp(1, total_pages);
    let begin = (page - 1) * page_size;
    let end = (begin + page_size).min(total_items);
    Pagination {
        page,
        page_size,
        total_items,
        total_pages,
        start: if total_items == 0 { 0 } else { begin + 1 },
        end,
    }
}

/// Aggregate over any subset of records: the filtered view gets its own
/// totals and the dashboard aggregates the complete sets separately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub count: usize,
    pub students: i64,
    pub total_fee: f64,
    pub teacher_share: f64,
    pub school_share: f64,
}

pub fn aggregate<R: ViewRecord>(records: &[R]) -> Totals {
    let mut totals = Totals::default();
    for r in records {
        r.accumulate(&mut totals);
    }
    totals
}

/// A mapped, named-field record the pipeline can filter, sort and total.
pub trait ViewRecord: Clone {
    type Field: Copy + Eq;

    fn field_kind(f: Self::Field) -> FieldKind;
    fn text(&self, f: Self::Field) -> &str;
    fn number(&self, f: Self::Field) -> f64;
    fn date(&self, f: Self::Field) -> Option<NaiveDate>;
    fn matches(&self, criteria: &FilterCriteria) -> bool;
    fn accumulate(&self, totals: &mut Totals);
}

fn compare_by_field<R: ViewRecord>(a: &R, b: &R, f: R::Field, coll: &Collation) -> Ordering {
    match R::field_kind(f) {
        // Missing dates order before every real date ascending.
        FieldKind::Date => a.date(f).cmp(&b.date(f)),
        // Coerced numbers are always finite, so this order is total.
        FieldKind::Number => a
            .number(f)
            .partial_cmp(&b.number(f))
            .unwrap_or(Ordering::Equal),
        FieldKind::Text => coll.compare(a.text(f), b.text(f)),
    }
}

/// Explicit per-table view state, threaded through the pipeline as a value.
/// Transitions consume and return a state; nothing here mutates ambiently.
#[derive(Debug, Clone)]
pub struct ViewState<K: Copy + Eq> {
    pub criteria: FilterCriteria,
    pub sort: Option<SortSpec<K>>,
    pub page: PageSpec,
}

impl<K: Copy + Eq> Default for ViewState<K> {
    fn default() -> Self {
        ViewState {
            criteria: FilterCriteria::default(),
            sort: None,
            page: PageSpec::default(),
        }
    }
}

impl<K: Copy + Eq> ViewState<K> {
    /// Filter changes jump back to the first page.
    pub fn with_criteria(self, criteria: FilterCriteria) -> Self {
        ViewState {
            criteria,
            page: PageSpec {
                page: 1,
                ..self.page
            },
            ..self
        }
    }

    /// Picking the current sort key again flips direction; a new key sorts
    /// ascending. Either way the view returns to the first page.
    pub fn with_sort_key(self, key: K) -> Self {
        let sort = match self.sort {
            Some(s) if s.key == key => SortSpec {
                key,
                dir: s.dir.flipped(),
            },
            _ => SortSpec {
                key,
                dir: SortDir::Asc,
            },
        };
        ViewState {
            sort: Some(sort),
            page: PageSpec {
                page: 1,
                ..self.page
            },
            ..self
        }
    }

    pub fn with_page(self, page: usize) -> Self {
        ViewState {
            page: PageSpec { page, ..self.page },
            ..self
        }
    }

    /// Page-size changes keep the current page and rely on clamping alone.
    pub fn with_page_size(self, page_size: usize) -> Self {
        ViewState {
            page: PageSpec {
                page_size: page_size.max(1),
                ..self.page
            },
            ..self
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound = "R: Serialize, R::Field: Serialize")]
pub struct ViewOutput<R: ViewRecord> {
    pub rows: Vec<R>,
    pub pagination: Pagination,
    /// Totals over the whole filtered view, not just the visible page.
    pub totals: Totals,
    pub sort: Option<SortSpec<R::Field>>,
    pub criteria: FilterCriteria,
}

/// Filter + stable sort without pagination, for export and print
/// consumers that want the whole current view.
pub fn filtered_records<R: ViewRecord>(
    records: &[R],
    state: &ViewState<R::Field>,
    coll: &Collation,
) -> Vec<R> {
    let mut filtered: Vec<R> = records
        .iter()
        .filter(|r| r.matches(&state.criteria))
        .cloned()
        .collect();

    if let Some(sort) = state.sort {
        filtered.sort_by(|a, b| {
            let ord = compare_by_field(a, b, sort.key, coll);
            match sort.dir {
                SortDir::Asc => ord,
                SortDir::Desc => ord.reverse(),
            }
        });
    }
    filtered
}

/// The whole pipeline in one synchronous pass: filter preserving input
/// order, stable sort, clamp + slice, aggregate the filtered subset.
/// Recomputed wholesale from the raw set on every change.
pub fn compute_view<R: ViewRecord>(
    records: &[R],
    state: &ViewState<R::Field>,
    coll: &Collation,
) -> ViewOutput<R> {
    let filtered = filtered_records(records, state, coll);
    let totals = aggregate(&filtered);
    let pagination = paginate(filtered.len(), &state.page);
    let rows = if pagination.total_items == 0 {
        Vec::new()
    } else {
        filtered[pagination.start - 1..pagination.end].to_vec()
    };

    ViewOutput {
        rows,
        pagination,
        totals,
        sort: state.sort,
        criteria: state.criteria.clone(),
    }
}
