use serde::Serialize;

use crate::coerce::format_khr;
use crate::schema::{Student, TeacherRow};
use crate::view::{aggregate, Totals};

/// Tab-separated export of the student set, spreadsheet-friendly: numeric
/// fee, payment date exactly as displayed. Reads the records, never
/// mutates them.
pub fn students_tsv(records: &[Student]) -> String {
    let mut out = String::from("Name\tGender\tGrade\tTeacher\tFee\tPayment Date\n");
    for s in records {
        out.push_str(&[
            sanitize(&s.name),
            sanitize(&s.gender),
            sanitize(&s.grade),
            sanitize(&s.teacher),
            s.fee.to_string(),
            sanitize(&s.payment_date_display),
        ]
        .join("\t"));
        out.push('\n');
    }
    out
}

pub fn teachers_tsv(records: &[TeacherRow]) -> String {
    let mut out = String::from("Teacher\tGender\tStudents\tTotal\t80%\t20%\n");
    for t in records {
        out.push_str(&[
            sanitize(&t.teacher),
            sanitize(&t.gender),
            t.students.to_string(),
            t.total_fee.to_string(),
            t.teacher_share.to_string(),
            t.school_share.to_string(),
        ]
        .join("\t"));
        out.push('\n');
    }
    out
}

// Cell text can contain anything a sheet user typed.
fn sanitize(s: &str) -> String {
    s.replace(['\t', '\n', '\r'], " ")
}

/// Plain structured report for the shell's print layer. Money is
/// display-formatted here; layout stays on the shell side.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportModel {
    pub title: String,
    pub scope: String,
    pub generated_at: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub totals: ReportTotals,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTotals {
    pub count: usize,
    pub students: i64,
    pub total_fee: String,
    pub teacher_share: String,
    pub school_share: String,
}

impl ReportTotals {
    fn from_totals(t: Totals) -> Self {
        ReportTotals {
            count: t.count,
            students: t.students,
            total_fee: format_khr(t.total_fee),
            teacher_share: format_khr(t.teacher_share),
            school_share: format_khr(t.school_share),
        }
    }
}

pub fn students_report(records: &[Student], scope: &str, generated_at: String) -> ReportModel {
    ReportModel {
        title: "Student Fee Report".to_string(),
        scope: scope.to_string(),
        generated_at,
        columns: ["Name", "Gender", "Grade", "Teacher", "Fee", "Payment Date"]
            .map(String::from)
            .to_vec(),
        rows: records
            .iter()
            .map(|s| {
                vec![
                    s.name.clone(),
                    s.gender.clone(),
                    s.grade.clone(),
                    s.teacher.clone(),
                    format_khr(s.fee),
                    s.payment_date_display.clone(),
                ]
            })
            .collect(),
        totals: ReportTotals::from_totals(aggregate(records)),
    }
}

pub fn teachers_report(records: &[TeacherRow], scope: &str, generated_at: String) -> ReportModel {
    ReportModel {
        title: "Teacher Fee Split Report".to_string(),
        scope: scope.to_string(),
        generated_at,
        columns: ["Teacher", "Gender", "Students", "Total", "80%", "20%"]
            .map(String::from)
            .to_vec(),
        rows: records
            .iter()
            .map(|t| {
                vec![
                    t.teacher.clone(),
                    t.gender.clone(),
                    t.students.to_string(),
                    format_khr(t.total_fee),
                    format_khr(t.teacher_share),
                    format_khr(t.school_share),
                ]
            })
            .collect(),
        totals: ReportTotals::from_totals(aggregate(records)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::DateOrder;
    use crate::schema::{map_students, map_teachers};
    use serde_json::json;

    #[test]
    fn students_tsv_keeps_numeric_fee_and_raw_date() {
        let records = map_students(
            &[vec![
                json!("Dara"),
                json!("Male"),
                json!("Grade5"),
                json!("Ms. Sok"),
                json!("1,200 ៛"),
                json!(null),
                json!(null),
                json!(null),
                json!("2024-03-01"),
            ]],
            DateOrder::DayFirst,
        );
        let tsv = students_tsv(&records);
        let mut lines = tsv.lines();
        assert_eq!(
            lines.next(),
            Some("Name\tGender\tGrade\tTeacher\tFee\tPayment Date")
        );
        assert_eq!(
            lines.next(),
            Some("Dara\tMale\tGrade5\tMs. Sok\t1200\t2024-03-01")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn teacher_report_formats_money_and_totals() {
        let records = map_teachers(&[
            vec![json!("Ms. Sok"), json!("Female"), json!(3), json!(1000), json!(0), json!(0)],
            vec![json!("Mr. Rith"), json!("Male"), json!(2), json!(500), json!(400), json!(100)],
        ]);
        let report = teachers_report(&records, "all", "2024-03-20 09:00".into());
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0][3], "1,000 ៛");
        assert_eq!(report.rows[0][4], "800 ៛");
        assert_eq!(report.totals.students, 5);
        assert_eq!(report.totals.total_fee, "1,500 ៛");
        assert_eq!(report.totals.teacher_share, "1,200 ៛");
        assert_eq!(report.totals.school_share, "300 ៛");
    }

    #[test]
    fn tabs_in_cells_cannot_break_columns() {
        let records = map_students(
            &[vec![json!("Da\tra"), json!("Male"), json!(""), json!("Ms. Sok"), json!(10)]],
            DateOrder::DayFirst,
        );
        let tsv = students_tsv(&records);
        let data_line = tsv.lines().nth(1).unwrap();
        assert_eq!(data_line.split('\t').count(), 6);
    }
}
