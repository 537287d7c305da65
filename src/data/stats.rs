//! Rating categories and the per-category running-average aggregator.
//!
//! The aggregator is a small value type (`CategoryStats`) with explicit
//! update operations, unit-testable without the persistence layer. Column
//! names for the faculty aggregate row come from the category enum, never
//! from user input.

/// The four rating categories. `Overall` is mandatory on every submission;
/// the others are optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingCategory {
    Teaching,
    Attendance,
    DoubtClarification,
    Overall,
}

impl RatingCategory {
    /// Every category, in a fixed order, for iteration over a submission.
    pub const ALL: [RatingCategory; 4] = [
        RatingCategory::Teaching,
        RatingCategory::Attendance,
        RatingCategory::DoubtClarification,
        RatingCategory::Overall,
    ];

    /// Canonical lower-case name, used in validation messages and as the
    /// key for preference matching.
    pub fn as_str(&self) -> &'static str {
        match self {
            RatingCategory::Teaching => "teaching",
            RatingCategory::Attendance => "attendance",
            RatingCategory::DoubtClarification => "doubt_clarification",
            RatingCategory::Overall => "overall",
        }
    }

    /// Name of the average column on the `faculty` row for this category.
    pub fn avg_column(&self) -> &'static str {
        match self {
            RatingCategory::Teaching => "avg_teaching",
            RatingCategory::Attendance => "avg_attendance",
            RatingCategory::DoubtClarification => "avg_doubt_clarification",
            RatingCategory::Overall => "avg_overall",
        }
    }

    /// Name of the count column on the `faculty` row for this category.
    pub fn count_column(&self) -> &'static str {
        match self {
            RatingCategory::Teaching => "count_teaching",
            RatingCategory::Attendance => "count_attendance",
            RatingCategory::DoubtClarification => "count_doubt_clarification",
            RatingCategory::Overall => "count_overall",
        }
    }

    /// Parse a category name as supplied by a user (preferences or the
    /// rankings query). Lower-cased with spaces folded to underscores;
    /// unknown names yield `None`.
    pub fn parse(s: &str) -> Option<RatingCategory> {
        let key = s.trim().to_lowercase().replace(' ', "_");
        match key.as_str() {
            "teaching" => Some(RatingCategory::Teaching),
            "attendance" => Some(RatingCategory::Attendance),
            "doubt_clarification" => Some(RatingCategory::DoubtClarification),
            "overall" => Some(RatingCategory::Overall),
            _ => None,
        }
    }
}

/// Running average and rating count for a single category.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CategoryStats {
    pub average: f64,
    pub count: i32,
}

impl CategoryStats {
    /// Fold one submission into the running average.
    ///
    /// A first submission (`old_value` absent) increments the count and adds
    /// the new value to the total. A revision (`old_value` present) keeps the
    /// count and swaps the old value out of the total for the new one. Full
    /// precision is kept internally; rounding happens only at the API
    /// boundary.
    pub fn apply(&self, new_value: i16, old_value: Option<i16>) -> CategoryStats {
        let total = self.average * f64::from(self.count);
        let new = f64::from(new_value);

        let (new_total, new_count) = match old_value {
            Some(old) => (total - f64::from(old) + new, self.count),
            None => (total + new, self.count + 1),
        };

        let average = if new_count > 0 {
            new_total / f64::from(new_count)
        } else {
            0.0
        };

        CategoryStats {
            average,
            count: new_count,
        }
    }
}

/// The full per-category aggregate set for one faculty row.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FacultyStats {
    pub teaching: CategoryStats,
    pub attendance: CategoryStats,
    pub doubt_clarification: CategoryStats,
    pub overall: CategoryStats,
}

impl FacultyStats {
    /// The stats for one category.
    pub fn get(&self, category: RatingCategory) -> CategoryStats {
        match category {
            RatingCategory::Teaching => self.teaching,
            RatingCategory::Attendance => self.attendance,
            RatingCategory::DoubtClarification => self.doubt_clarification,
            RatingCategory::Overall => self.overall,
        }
    }

    /// Replace the stats for one category.
    pub fn set(&mut self, category: RatingCategory, stats: CategoryStats) {
        match category {
            RatingCategory::Teaching => self.teaching = stats,
            RatingCategory::Attendance => self.attendance = stats,
            RatingCategory::DoubtClarification => self.doubt_clarification = stats,
            RatingCategory::Overall => self.overall = stats,
        }
    }
}
