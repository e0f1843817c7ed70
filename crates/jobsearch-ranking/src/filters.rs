//! Null-safe structured filtering over the columnar metadata table.
//!
//! A row is dropped only when it has a known value that fails the
//! predicate. Missing values always pass.

use jobsearch_core::models::{canonical_seniority, FilterField, FilterValue, Filters};
use jobsearch_index::{DictColumn, MetadataTable};

/// How one active filter judged one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Matched,
    /// Value missing; kept without evidence.
    Null,
    Rejected,
}

#[derive(Debug)]
enum Predicate<'a> {
    /// `accepted[code]` says whether that dictionary value satisfies the filter.
    Categorical {
        field: FilterField,
        column: &'a DictColumn,
        accepted: Vec<bool>,
    },
    MinSalary {
        threshold: f64,
    },
    Industries {
        accepted: Vec<bool>,
    },
}

/// Filters compiled against one table: string comparisons happen once per
/// dictionary entry, rows are then checked by code.
#[derive(Debug)]
pub struct FilterPlan<'a> {
    table: &'a MetadataTable,
    predicates: Vec<Predicate<'a>>,
}

impl<'a> FilterPlan<'a> {
    /// Kind mismatches are expected to have been rejected by validation and
    /// are skipped here.
    pub fn compile(filters: &Filters, table: &'a MetadataTable) -> Self {
        let mut predicates = Vec::with_capacity(filters.len());
        for (field, value) in filters.iter() {
            let predicate = match (field, value) {
                (FilterField::MinSalary, FilterValue::NumericLowerBound(threshold)) => {
                    Some(Predicate::MinSalary {
                        threshold: *threshold,
                    })
                }
                (FilterField::Industries, FilterValue::SetIntersection(wanted)) => {
                    let accepted = table
                        .industries()
                        .dictionary()
                        .iter()
                        .map(|d| wanted.contains(d))
                        .collect();
                    Some(Predicate::Industries { accepted })
                }
                (field, FilterValue::Categorical(wanted)) => table.categorical(field).map(|column| {
                    let accepted = column
                        .dictionary()
                        .iter()
                        .map(|d| categorical_eq(field, d, wanted))
                        .collect();
                    Predicate::Categorical {
                        field,
                        column,
                        accepted,
                    }
                }),
                _ => None,
            };
            predicates.extend(predicate);
        }
        Self { table, predicates }
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Whether `row` survives every active filter.
    pub fn passes(&self, row: usize) -> bool {
        self.predicates
            .iter()
            .all(|p| self.verdict(p, row) != Verdict::Rejected)
    }

    /// Active filters split into those matched on a real value and those
    /// passed on a missing one. Only meaningful for rows that pass.
    pub fn explain(&self, row: usize) -> (Vec<FilterField>, Vec<FilterField>) {
        let mut matched = Vec::new();
        let mut null = Vec::new();
        for p in &self.predicates {
            match self.verdict(p, row) {
                Verdict::Matched => matched.push(field_of(p)),
                Verdict::Null => null.push(field_of(p)),
                Verdict::Rejected => {}
            }
        }
        (matched, null)
    }

    fn verdict(&self, predicate: &Predicate<'_>, row: usize) -> Verdict {
        match predicate {
            Predicate::Categorical {
                column, accepted, ..
            } => match column.code(row) {
                None => Verdict::Null,
                Some(code) if accepted[code as usize] => Verdict::Matched,
                Some(_) => Verdict::Rejected,
            },
            Predicate::MinSalary { threshold } => match self.table.salary_max().get(row).copied().flatten() {
                None => Verdict::Null,
                Some(max) if max >= *threshold => Verdict::Matched,
                Some(_) => Verdict::Rejected,
            },
            Predicate::Industries { accepted } => {
                let codes = self.table.industries().codes(row);
                if codes.is_empty() {
                    Verdict::Null
                } else if codes.iter().any(|c| accepted[*c as usize]) {
                    Verdict::Matched
                } else {
                    Verdict::Rejected
                }
            }
        }
    }
}

fn field_of(predicate: &Predicate<'_>) -> FilterField {
    match predicate {
        Predicate::Categorical { field, .. } => *field,
        Predicate::MinSalary { .. } => FilterField::MinSalary,
        Predicate::Industries { .. } => FilterField::Industries,
    }
}

/// Both sides are already lowercased; seniority labels compare by canonical form.
fn categorical_eq(field: FilterField, stored: &str, wanted: &str) -> bool {
    if field == FilterField::SeniorityLevel {
        canonical_seniority(stored) == canonical_seniority(wanted)
    } else {
        stored == wanted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobsearch_core::models::JobMetadata;

    fn table() -> MetadataTable {
        let mut t = MetadataTable::new();
        let mut a = JobMetadata::new("a", "A");
        a.remote_type = Some("remote".into());
        a.seniority_level = Some("senior".into());
        a.salary_max = Some(150_000.0);
        a.industries = vec!["Software".into()];
        let mut b = JobMetadata::new("b", "B");
        b.remote_type = Some("onsite".into());
        b.seniority_level = Some("entry level".into());
        b.salary_max = Some(90_000.0);
        b.industries = vec!["Retail".into()];
        let c = JobMetadata::new("c", "C");
        t.push(a);
        t.push(b);
        t.push(c);
        t
    }

    #[test]
    fn categorical_filter_is_null_safe() {
        let t = table();
        let filters = Filters::new().with(FilterField::RemoteType, FilterValue::Categorical("Remote".into()));
        let plan = FilterPlan::compile(&filters, &t);
        assert!(plan.passes(0));
        assert!(!plan.passes(1));
        assert!(plan.passes(2));
        assert_eq!(plan.explain(0), (vec![FilterField::RemoteType], vec![]));
        assert_eq!(plan.explain(2), (vec![], vec![FilterField::RemoteType]));
    }

    #[test]
    fn seniority_matches_through_aliases() {
        let t = table();
        let filters = Filters::new().with(
            FilterField::SeniorityLevel,
            FilterValue::Categorical("senior level".into()),
        );
        let plan = FilterPlan::compile(&filters, &t);
        assert!(plan.passes(0));
        assert!(!plan.passes(1));
    }

    #[test]
    fn min_salary_uses_salary_max() {
        let t = table();
        let filters = Filters::new().with(FilterField::MinSalary, FilterValue::NumericLowerBound(100_000.0));
        let plan = FilterPlan::compile(&filters, &t);
        assert!(plan.passes(0));
        assert!(!plan.passes(1));
        assert!(plan.passes(2));
    }

    #[test]
    fn industries_need_an_overlap() {
        let t = table();
        let filters = Filters::new().with(
            FilterField::Industries,
            FilterValue::SetIntersection(vec!["software".into(), "finance".into()]),
        );
        let plan = FilterPlan::compile(&filters, &t);
        assert!(plan.passes(0));
        assert!(!plan.passes(1));
        assert!(plan.passes(2));
    }

    #[test]
    fn value_missing_from_dictionary_rejects_known_values() {
        let t = table();
        let filters = Filters::new().with(FilterField::RemoteType, FilterValue::Categorical("hybrid".into()));
        let plan = FilterPlan::compile(&filters, &t);
        assert!(!plan.passes(0));
        assert!(!plan.passes(1));
        assert!(plan.passes(2));
    }
}
