use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::coerce::{self, DateOrder};
use crate::view::{FilterCriteria, Totals, ViewRecord};

/// One row as the sheet service returns it, field order significant.
pub type RawRow = Vec<serde_json::Value>;

/// Student sheet layout. Columns 5..8 are legacy padding the upstream sheet
/// still carries; the payment date column drifted between revisions of the
/// sheet and is pinned here, in the one place that knows raw indices.
pub mod student_col {
    pub const NAME: usize = 0;
    pub const GENDER: usize = 1;
    pub const GRADE: usize = 2;
    pub const TEACHER: usize = 3;
    pub const FEE: usize = 4;
    pub const PAYMENT_DATE: usize = 8;
}

/// Teacher-summary sheet layout.
pub mod teacher_col {
    pub const TEACHER: usize = 0;
    pub const GENDER: usize = 1;
    pub const STUDENTS: usize = 2;
    pub const TOTAL_FEE: usize = 3;
    pub const TEACHER_SHARE: usize = 4;
    pub const SCHOOL_SHARE: usize = 5;
}

/// Declared value kind per sortable field. The comparator dispatches on
/// this, never on runtime inspection of the values themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StudentField {
    Name,
    Gender,
    Grade,
    Teacher,
    Fee,
    PaymentDate,
}

impl StudentField {
    pub fn kind(self) -> FieldKind {
        match self {
            StudentField::Fee => FieldKind::Number,
            StudentField::PaymentDate => FieldKind::Date,
            _ => FieldKind::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TeacherField {
    Teacher,
    Gender,
    Students,
    TotalFee,
    TeacherShare,
    SchoolShare,
}

impl TeacherField {
    pub fn kind(self) -> FieldKind {
        match self {
            TeacherField::Teacher | TeacherField::Gender => FieldKind::Text,
            _ => FieldKind::Number,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub name: String,
    pub gender: String,
    pub grade: String,
    pub teacher: String,
    pub fee: f64,
    /// Fee cell as the sheet displayed it ("50 $", "1,200 ៛", ...).
    pub fee_display: String,
    pub payment_date: Option<NaiveDate>,
    pub payment_date_display: String,
}

impl Student {
    pub fn from_row(row: &RawRow, order: DateOrder) -> Self {
        let fee_display = cell_text(row, student_col::FEE);
        let payment_date_display = cell_text(row, student_col::PAYMENT_DATE);
        Student {
            name: cell_text(row, student_col::NAME),
            gender: cell_text(row, student_col::GENDER),
            grade: cell_text(row, student_col::GRADE),
            teacher: cell_text(row, student_col::TEACHER),
            fee: coerce::to_number(cell(row, student_col::FEE)),
            fee_display,
            payment_date: coerce::parse_date(&payment_date_display, order),
            payment_date_display,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherRow {
    pub teacher: String,
    pub gender: String,
    pub students: i64,
    pub total_fee: f64,
    pub teacher_share: f64,
    pub school_share: f64,
}

impl TeacherRow {
    pub fn from_row(row: &RawRow) -> Self {
        let total_fee = coerce::to_number(cell(row, teacher_col::TOTAL_FEE));
        let mut teacher_share = coerce::to_number(cell(row, teacher_col::TEACHER_SHARE));
        let mut school_share = coerce::to_number(cell(row, teacher_col::SCHOOL_SHARE));
        // Sheets without precomputed split columns report both shares as 0;
        // derive the 80/20 split silently in that case.
        if teacher_share == 0.0 && school_share == 0.0 && total_fee > 0.0 {
            teacher_share = total_fee * 0.8;
            school_share = total_fee * 0.2;
        }
        TeacherRow {
            teacher: cell_text(row, teacher_col::TEACHER),
            gender: cell_text(row, teacher_col::GENDER),
            students: coerce::to_number(cell(row, teacher_col::STUDENTS)).round() as i64,
            total_fee,
            teacher_share,
            school_share,
        }
    }
}

pub fn map_students(rows: &[RawRow], order: DateOrder) -> Vec<Student> {
    rows.iter().map(|r| Student::from_row(r, order)).collect()
}

pub fn map_teachers(rows: &[RawRow]) -> Vec<TeacherRow> {
    rows.iter().map(TeacherRow::from_row).collect()
}

fn cell(row: &RawRow, idx: usize) -> &serde_json::Value {
    row.get(idx).unwrap_or(&serde_json::Value::Null)
}

fn cell_text(row: &RawRow, idx: usize) -> String {
    match cell(row, idx) {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

impl ViewRecord for Student {
    type Field = StudentField;

    fn field_kind(f: StudentField) -> FieldKind {
        f.kind()
    }

    fn text(&self, f: StudentField) -> &str {
        match f {
            StudentField::Name => &self.name,
            StudentField::Gender => &self.gender,
            StudentField::Grade => &self.grade,
            StudentField::Teacher => &self.teacher,
            StudentField::Fee => &self.fee_display,
            StudentField::PaymentDate => &self.payment_date_display,
        }
    }

    fn number(&self, f: StudentField) -> f64 {
        match f {
            StudentField::Fee => self.fee,
            _ => 0.0,
        }
    }

    fn date(&self, f: StudentField) -> Option<NaiveDate> {
        match f {
            StudentField::PaymentDate => self.payment_date,
            _ => None,
        }
    }

    fn matches(&self, c: &FilterCriteria) -> bool {
        if !c.query.is_empty() {
            let q = c.query.to_lowercase();
            let hit = self.name.to_lowercase().contains(&q)
                || self.teacher.to_lowercase().contains(&q);
            if !hit {
                return false;
            }
        }
        if let Some(t) = &c.teacher {
            if self.teacher != *t {
                return false;
            }
        }
        if let Some(g) = &c.grade {
            if self.grade != *g {
                return false;
            }
        }
        if let Some(g) = &c.gender {
            if self.gender != *g {
                return false;
            }
        }
        if c.date_from.is_some() || c.date_to.is_some() {
            // Records without a parseable payment date fail closed.
            let Some(d) = self.payment_date else {
                return false;
            };
            if c.date_from.is_some_and(|from| d < from) {
                return false;
            }
            if c.date_to.is_some_and(|to| d > to) {
                return false;
            }
        }
        true
    }

    fn accumulate(&self, t: &mut Totals) {
        t.count += 1;
        t.students += 1;
        t.total_fee += self.fee;
        t.teacher_share += self.fee * 0.8;
        t.school_share += self.fee * 0.2;
    }
}

impl ViewRecord for TeacherRow {
    type Field = TeacherField;

    fn field_kind(f: TeacherField) -> FieldKind {
        f.kind()
    }

    fn text(&self, f: TeacherField) -> &str {
        match f {
            TeacherField::Teacher => &self.teacher,
            TeacherField::Gender => &self.gender,
            _ => "",
        }
    }

    fn number(&self, f: TeacherField) -> f64 {
        match f {
            TeacherField::Students => self.students as f64,
            TeacherField::TotalFee => self.total_fee,
            TeacherField::TeacherShare => self.teacher_share,
            TeacherField::SchoolShare => self.school_share,
            TeacherField::Teacher | TeacherField::Gender => 0.0,
        }
    }

    fn date(&self, _f: TeacherField) -> Option<NaiveDate> {
        None
    }

    fn matches(&self, c: &FilterCriteria) -> bool {
        if !c.query.is_empty() {
            let q = c.query.to_lowercase();
            if !self.teacher.to_lowercase().contains(&q) {
                return false;
            }
        }
        if let Some(t) = &c.teacher {
            if self.teacher != *t {
                return false;
            }
        }
        if let Some(g) = &c.gender {
            if self.gender != *g {
                return false;
            }
        }
        // Summary rows carry no date; a date-bounded query excludes them.
        if c.date_from.is_some() || c.date_to.is_some() {
            return false;
        }
        true
    }

    fn accumulate(&self, t: &mut Totals) {
        t.count += 1;
        t.students += self.students;
        t.total_fee += self.total_fee;
        t.teacher_share += self.teacher_share;
        t.school_share += self.school_share;
    }
}
