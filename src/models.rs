//! Domain models that mirror the `students` table and get passed throughout the
//! TUI. These types stay light-weight data holders so the other layers can
//! focus on presentation and persistence logic.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One row of the `students` table.
pub struct Student {
    /// Store-assigned primary key. Edit and delete flows carry it back to the
    /// gateway, so it is bound to the row when the row is selected.
    pub id: i64,
    /// Free-text name; the search dialog matches it exactly.
    pub name: String,
    /// Course label exactly as stored. Usually one of [`Course::ALL`], but rows
    /// written by other tools are shown as-is.
    pub course: String,
    /// Mobile number kept as raw text.
    pub mobile: String,
}

/// The fixed set of courses offered by the enrolment form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Course {
    Biology,
    Astronomy,
    Physics,
    DishwasherRepair,
}

impl Course {
    /// Every course in the order the form cycles through them.
    pub const ALL: [Course; 4] = [
        Course::Biology,
        Course::Astronomy,
        Course::Physics,
        Course::DishwasherRepair,
    ];

    /// Text written to the `course` column.
    pub fn label(self) -> &'static str {
        match self {
            Course::Biology => "Biology",
            Course::Astronomy => "Astronomy",
            Course::Physics => "Physics",
            Course::DishwasherRepair => "Dishwasher Repair",
        }
    }

    /// Step forwards or backwards through [`Course::ALL`], wrapping at the ends.
    pub fn cycle(self, offset: isize) -> Course {
        let len = Course::ALL.len() as isize;
        let current = Course::ALL
            .iter()
            .position(|course| *course == self)
            .unwrap_or(0) as isize;
        let next = (current + offset).rem_euclid(len);
        Course::ALL[next as usize]
    }
}

impl Default for Course {
    fn default() -> Self {
        Course::Biology
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Course {
    type Err = String;

    /// Parsing is exact: `"physics"` is not a course.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Course::ALL
            .iter()
            .copied()
            .find(|course| course.label() == s)
            .ok_or_else(|| s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_labels_parse_back_exactly() {
        for course in Course::ALL {
            assert_eq!(course.label().parse::<Course>(), Ok(course));
        }
        assert!("physics".parse::<Course>().is_err());
        assert!("Dishwasher repair".parse::<Course>().is_err());
    }

    #[test]
    fn cycle_wraps_both_ways() {
        assert_eq!(Course::Biology.cycle(-1), Course::DishwasherRepair);
        assert_eq!(Course::DishwasherRepair.cycle(1), Course::Biology);
        assert_eq!(Course::Astronomy.cycle(2), Course::DishwasherRepair);
    }
}
