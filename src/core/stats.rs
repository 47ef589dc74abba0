//! Credit aggregation
//!
//! Turns an [`Akiko`] into a [`CreditStats`] tree. Each level (cell, column,
//! compulsory/elective) clamps its sums to its own maximum with
//! [`base_credit_stats_new`], and the next level sums the *effective* figures
//! of the level below. Clamping does not commute with summation, so the order
//! cell → column → compulsory/elective is part of the result.

use crate::core::akiko::Akiko;
use crate::core::models::{Bound, CellId, ColumnId, CreditRange, ListKind};
use std::collections::BTreeMap;

/// Credit figures of one cell, column or partition.
///
/// `raw_*` are unclamped sums, `effective_*` are clamped to `max`, and
/// `overflow_*` is what the clamp cut off. `raw = effective + overflow` for
/// every figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseCreditStats {
    /// Credits required
    pub min: f64,
    /// Credits that count at most
    pub max: Bound,
    /// Planned or in-progress credits
    pub raw_might_take: f64,
    /// Earned credits
    pub raw_taken: f64,
    /// `raw_might_take + raw_taken`
    pub raw_total: f64,
    /// Planned credits that still fit under `max` after taken credits
    pub effective_might_take: f64,
    /// Earned credits that count
    pub effective_taken: f64,
    /// Total credits that count
    pub effective_total: f64,
    /// Planned credits beyond `max`
    pub overflow_might_take: f64,
    /// Earned credits beyond `max`
    pub overflow_taken: f64,
    /// All credits beyond `max`
    pub overflow_total: f64,
}

/// Clamp raw sums against a range.
///
/// Taken credits fill the cap first; might-take credits only count in the
/// room that is left.
#[must_use]
pub fn base_credit_stats_new(
    raw_might_take: f64,
    raw_taken: f64,
    min: f64,
    max: Bound,
) -> BaseCreditStats {
    let raw_total = raw_might_take + raw_taken;
    let effective_total = max.clamp(raw_total);
    let effective_taken = max.clamp(raw_taken);
    let effective_might_take = effective_total - effective_taken;

    BaseCreditStats {
        min,
        max,
        raw_might_take,
        raw_taken,
        raw_total,
        effective_might_take,
        effective_taken,
        effective_total,
        overflow_might_take: raw_might_take - effective_might_take,
        overflow_taken: raw_taken - effective_taken,
        overflow_total: raw_total - effective_total,
    }
}

impl BaseCreditStats {
    fn from_range(raw_might_take: f64, raw_taken: f64, range: &CreditRange) -> Self {
        base_credit_stats_new(raw_might_take, raw_taken, range.min, range.max)
    }

    /// Credits still needed from earned credits alone
    #[must_use]
    pub fn shortfall(&self) -> f64 {
        (self.min - self.effective_taken).max(0.0)
    }

    /// Credits still needed even if every planned course is passed
    #[must_use]
    pub fn planned_shortfall(&self) -> f64 {
        (self.min - self.effective_total).max(0.0)
    }

    /// Returns `true` once earned credits reach `min`
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        self.effective_taken >= self.min
    }
}

/// Full aggregation result
#[derive(Debug, Clone, PartialEq)]
pub struct CreditStats {
    /// Per cell, for every cell with a requirement entry
    pub cells: BTreeMap<CellId, BaseCreditStats>,
    /// Per column, for every column with a requirement entry
    pub columns: BTreeMap<ColumnId, BaseCreditStats>,
    /// Compulsory columns together, clamped to the compulsory target
    pub compulsory: BaseCreditStats,
    /// Elective columns together, clamped to the elective target
    pub elective: BaseCreditStats,
}

impl CreditStats {
    /// Stats of one cell
    #[must_use]
    pub fn cell(&self, id: &CellId) -> Option<&BaseCreditStats> {
        self.cells.get(id)
    }

    /// Stats of one column
    #[must_use]
    pub fn column(&self, id: ColumnId) -> Option<&BaseCreditStats> {
        self.columns.get(&id)
    }

    /// Sum of every column's effective total, before the compulsory/elective clamp
    #[must_use]
    pub fn columns_effective_total(&self) -> f64 {
        self.columns.values().map(|c| c.effective_total).sum()
    }
}

/// Might-take and taken sums
#[derive(Debug, Clone, Copy, Default)]
struct Sums {
    might_take: f64,
    taken: f64,
}

impl Sums {
    fn add_effective(&mut self, stats: &BaseCreditStats) {
        self.might_take += stats.effective_might_take;
        self.taken += stats.effective_taken;
    }
}

impl Akiko {
    /// Aggregate credits into a [`CreditStats`] tree.
    ///
    /// Pure: reads the state only and may be called after every change.
    /// Courses in cells without a requirement entry are skipped, as are
    /// cells whose column has no entry at the column level.
    #[must_use]
    pub fn credit_stats(&self) -> CreditStats {
        let requirements = self.requirements();

        let mut cell_sums: BTreeMap<&CellId, Sums> = BTreeMap::new();
        for (course_id, position) in self.course_positions() {
            let credit = self.credit_of(course_id).unwrap_or(0.0);
            match position.list_kind {
                ListKind::WontTake => {}
                ListKind::MightTake => {
                    cell_sums.entry(&position.cell_id).or_default().might_take += credit;
                }
                ListKind::Taken => {
                    cell_sums.entry(&position.cell_id).or_default().taken += credit;
                }
            }
        }
        for (fake_id, cell_id) in self.fake_course_positions() {
            let credit = self.fake_courses().get(fake_id).map_or(0.0, |c| c.credit);
            cell_sums.entry(cell_id).or_default().taken += credit;
        }

        let cells: BTreeMap<CellId, BaseCreditStats> = requirements
            .cells
            .iter()
            .map(|(cell_id, range)| {
                let sums = cell_sums.get(cell_id).copied().unwrap_or_default();
                let stats = BaseCreditStats::from_range(sums.might_take, sums.taken, range);
                (cell_id.clone(), stats)
            })
            .collect();

        let columns: BTreeMap<ColumnId, BaseCreditStats> = requirements
            .columns
            .iter()
            .map(|(column_id, range)| {
                let mut sums = Sums::default();
                cells
                    .iter()
                    .filter(|(cell_id, _)| cell_id.column() == *column_id)
                    .for_each(|(_, stats)| sums.add_effective(stats));
                let stats = BaseCreditStats::from_range(sums.might_take, sums.taken, range);
                (*column_id, stats)
            })
            .collect();

        let mut compulsory_sums = Sums::default();
        let mut elective_sums = Sums::default();
        for (column_id, stats) in &columns {
            if column_id.is_compulsory() {
                compulsory_sums.add_effective(stats);
            } else {
                elective_sums.add_effective(stats);
            }
        }

        let compulsory = BaseCreditStats::from_range(
            compulsory_sums.might_take,
            compulsory_sums.taken,
            &CreditRange::exact(requirements.compulsory_min),
        );
        let elective = BaseCreditStats::from_range(
            elective_sums.might_take,
            elective_sums.taken,
            &CreditRange::exact(requirements.elective_min),
        );

        crate::debug!(
            "Aggregated {} cells and {} columns (compulsory {}/{}, elective {}/{})",
            cells.len(),
            columns.len(),
            compulsory.effective_taken,
            requirements.compulsory_min,
            elective.effective_taken,
            requirements.elective_min
        );

        CreditStats {
            cells,
            columns,
            compulsory,
            elective,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classify::Classification;
    use crate::core::models::{
        CourseId, CreditRequirements, FakeCourse, FakeCourseIdAllocator, Grade, KnownCourse,
        KnownCourses, RealCourse, Transcript, TranscriptEntry,
    };

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn assert_conserves(stats: &BaseCreditStats) {
        assert!(close(stats.raw_might_take, stats.effective_might_take + stats.overflow_might_take));
        assert!(close(stats.raw_taken, stats.effective_taken + stats.overflow_taken));
        assert!(close(stats.raw_total, stats.effective_total + stats.overflow_total));
    }

    fn id(s: &str) -> CourseId {
        s.parse().unwrap()
    }

    fn cell(s: &str) -> CellId {
        s.parse().unwrap()
    }

    fn taken(course_id: &str, credit: f64) -> TranscriptEntry {
        TranscriptEntry::Real(RealCourse {
            id: id(course_id),
            name: format!("Course {course_id}"),
            credit,
            taken_year: 2023,
            grade: Grade::A,
        })
    }

    #[test]
    fn test_unbounded_is_identity() {
        for (might, taken) in [(0.0, 0.0), (3.5, 10.0), (100.0, 0.5)] {
            let stats = base_credit_stats_new(might, taken, 10.0, Bound::Unbounded);
            assert!(close(stats.effective_might_take, might));
            assert!(close(stats.effective_taken, taken));
            assert!(close(stats.effective_total, might + taken));
            assert!(close(stats.overflow_total, 0.0));
            assert!(close(stats.overflow_taken, 0.0));
            assert!(close(stats.overflow_might_take, 0.0));
        }
    }

    #[test]
    fn test_bounded_never_exceeds_max() {
        for (might, taken) in [(0.0, 30.0), (30.0, 0.0), (10.0, 10.0), (1e6, 1e6)] {
            let stats = base_credit_stats_new(might, taken, 18.0, Bound::Bounded(18.0));
            assert!(stats.effective_total <= 18.0);
            assert!(stats.effective_taken <= 18.0);
            assert_conserves(&stats);
        }
    }

    #[test]
    fn test_taken_fills_cap_first() {
        let stats = base_credit_stats_new(6.0, 20.0, 18.0, Bound::Bounded(18.0));
        assert!(close(stats.effective_taken, 18.0));
        assert!(close(stats.effective_might_take, 0.0));
        assert!(close(stats.overflow_might_take, 6.0));
        assert!(close(stats.overflow_taken, 2.0));

        let partial = base_credit_stats_new(6.0, 14.0, 18.0, Bound::Bounded(18.0));
        assert!(close(partial.effective_taken, 14.0));
        assert!(close(partial.effective_might_take, 4.0));
        assert!(close(partial.overflow_might_take, 2.0));
        assert_conserves(&partial);
    }

    #[test]
    fn test_shortfall() {
        let stats = base_credit_stats_new(4.0, 6.0, 12.0, Bound::Unbounded);
        assert!(close(stats.shortfall(), 6.0));
        assert!(close(stats.planned_shortfall(), 2.0));
        assert!(!stats.is_satisfied());

        let done = base_credit_stats_new(0.0, 12.0, 12.0, Bound::Unbounded);
        assert!(close(done.shortfall(), 0.0));
        assert!(done.is_satisfied());
    }

    /// b1 and b2 in column b, capped at 18 each; column b capped at 20.
    fn requirements() -> CreditRequirements {
        CreditRequirements::from_toml(
            r"
compulsory = 6
elective = 20

[cells.a1]
min = 4
max = 4

[cells.e3]
min = 4
max = 4

[cells.b1]
min = 0
max = 18

[cells.b2]
min = 18
max = 18

[columns.a]
min = 4
max = 4

[columns.b]
min = 18
max = 20

[columns.e]
min = 4
max = 4
",
        )
        .unwrap()
    }

    fn build(entries: Vec<TranscriptEntry>, real_cells: &[(&str, &str)]) -> Akiko {
        let classification = Classification {
            real: real_cells
                .iter()
                .map(|(course_id, cell_id)| (id(course_id), cell(cell_id)))
                .collect(),
            ..Classification::default()
        };
        Akiko::new(
            KnownCourses::new(),
            Transcript::from_entries(entries),
            &[],
            classification,
            requirements(),
        )
        .unwrap()
    }

    #[test]
    fn test_cell_overflow() {
        // GB22621 plus enough b2 courses for 25 raw credits
        let mut entries = vec![taken("GB22621", 2.0)];
        let mut cells = vec![("GB22621", "b2")];
        let others = [
            "GB20101", "GB20201", "GB20301", "GB20401", "GB20501", "GB20601", "GB20701",
            "GB20801", "GB20901", "GB21001",
        ];
        for other in others {
            entries.push(taken(other, 2.0));
            cells.push((other, "b2"));
        }
        entries.push(taken("GB21101", 3.0));
        cells.push(("GB21101", "b2"));

        let stats = build(entries, &cells).credit_stats();
        let b2 = stats.cell(&cell("b2")).unwrap();

        assert!(close(b2.raw_taken, 25.0));
        assert!(close(b2.effective_taken, 18.0));
        assert!(close(b2.overflow_taken, 7.0));
    }

    #[test]
    fn test_capped_cell_does_not_spill_into_column() {
        // b2 has 24 taken (capped at 18), b1 has 4 taken; column b caps at 20
        let mut entries = Vec::new();
        let mut cells = Vec::new();
        for n in 0..12 {
            let course_id = format!("GB2{n:02}01");
            entries.push(taken(&course_id, 2.0));
            cells.push((course_id, "b2"));
        }
        entries.push(taken("GB10101", 4.0));
        cells.push(("GB10101".to_string(), "b1"));
        let cell_refs: Vec<(&str, &str)> = cells.iter().map(|(c, k)| (c.as_str(), *k)).collect();

        let stats = build(entries, &cell_refs).credit_stats();
        let b = stats.column(ColumnId::B).unwrap();

        // 18 (clamped b2) + 4, not 24 + 4
        assert!(close(b.raw_taken, 22.0));
        assert!(close(b.effective_taken, 20.0));
        assert!(close(b.overflow_taken, 2.0));
        assert_conserves(b);
    }

    #[test]
    fn test_fake_course_counts_as_taken() {
        let mut allocator = FakeCourseIdAllocator::new();
        let fake_id = allocator.next_unique();
        let mut classification = Classification::default();
        classification.fake.insert(fake_id, cell("e3"));
        let transcript = Transcript::from_entries(vec![TranscriptEntry::Fake(FakeCourse {
            id: fake_id,
            name: "English (transfer)".to_string(),
            credit: 4.0,
            taken_year: 2021,
        })]);

        let akiko = Akiko::new(
            KnownCourses::new(),
            transcript,
            &[],
            classification,
            requirements(),
        )
        .unwrap();
        let stats = akiko.credit_stats();
        let e3 = stats.cell(&cell("e3")).unwrap();

        assert!(close(e3.raw_taken, 4.0));
        assert!(close(e3.effective_taken, 4.0));
        assert!(close(e3.raw_might_take, 0.0));
    }

    #[test]
    fn test_compulsory_target_clamps() {
        // a1 4 + e3 4 = 8 compulsory credits against an exact target of 6
        let mut allocator = FakeCourseIdAllocator::new();
        let fake_id = allocator.next_unique();
        let mut classification = Classification::default();
        classification.fake.insert(fake_id, cell("e3"));
        classification.real.insert(id("GA10101"), cell("a1"));
        let transcript = Transcript::from_entries(vec![
            TranscriptEntry::Fake(FakeCourse {
                id: fake_id,
                name: "English (transfer)".to_string(),
                credit: 4.0,
                taken_year: 2021,
            }),
            taken("GA10101", 4.0),
        ]);

        let akiko = Akiko::new(
            KnownCourses::new(),
            transcript,
            &[],
            classification,
            requirements(),
        )
        .unwrap();
        let stats = akiko.credit_stats();

        assert!(close(stats.columns_effective_total(), 8.0));
        assert!(close(stats.compulsory.raw_taken, 8.0));
        assert!(close(stats.compulsory.effective_taken, 6.0));
        assert!(close(stats.compulsory.overflow_taken, 2.0));
        assert!(close(stats.compulsory.min, 6.0));
        assert!(close(stats.elective.raw_total, 0.0));
    }

    #[test]
    fn test_might_take_uses_catalog_credit() {
        let mut known = KnownCourses::new();
        known.insert(
            id("GB10101"),
            KnownCourse::new(id("GB10101"), "Planned".to_string(), Some(3.0)),
        );
        known.insert(
            id("GB10102"),
            KnownCourse::new(id("GB10102"), "Variable".to_string(), None),
        );
        let classification = Classification {
            known: [(id("GB10101"), cell("b1")), (id("GB10102"), cell("b1"))]
                .into_iter()
                .collect(),
            ..Classification::default()
        };

        let akiko = Akiko::new(
            known,
            Transcript::default(),
            &[id("GB10101"), id("GB10102")],
            classification,
            requirements(),
        )
        .unwrap();
        let stats = akiko.credit_stats();
        let b1 = stats.cell(&cell("b1")).unwrap();

        // Missing credit contributes 0
        assert!(close(b1.raw_might_take, 3.0));
        assert!(close(b1.raw_taken, 0.0));
    }

    #[test]
    fn test_cells_without_requirement_are_skipped() {
        let akiko = build(vec![taken("GB10101", 2.0)], &[("GB10101", "b7")]);
        let stats = akiko.credit_stats();

        assert!(stats.cell(&cell("b7")).is_none());
        assert!(close(stats.column(ColumnId::B).unwrap().raw_total, 0.0));
        // Every requirement cell is present even when empty
        assert_eq!(stats.cells.len(), 4);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let akiko = build(vec![taken("GB10101", 2.0)], &[("GB10101", "b1")]);
        assert_eq!(akiko.credit_stats(), akiko.credit_stats());
    }
}
