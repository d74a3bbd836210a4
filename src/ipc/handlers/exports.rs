use serde_json::json;

use crate::export;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{self, respond};
use crate::ipc::types::{AppState, Request};
use crate::schema::{Student, TeacherRow};
use crate::view;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    All,
    Filtered,
}

impl Scope {
    fn as_str(self) -> &'static str {
        match self {
            Scope::All => "all",
            Scope::Filtered => "filtered",
        }
    }
}

fn parse_scope(req: &Request) -> Result<Scope, serde_json::Value> {
    match helpers::opt_str(req, "scope").as_deref() {
        None | Some("all") => Ok(Scope::All),
        Some("filtered") => Ok(Scope::Filtered),
        Some(other) => Err(err(
            &req.id,
            "bad_params",
            "scope must be one of: all, filtered",
            Some(json!({ "scope": other })),
        )),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "export.students" => Some(export_students(state, req)),
        "export.teachers" => Some(export_teachers(state, req)),
        "report.students" => Some(report_students(state, req)),
        "report.teachers" => Some(report_teachers(state, req)),
        _ => None,
    }
}

fn student_records(state: &AppState, scope: Scope) -> Vec<Student> {
    match scope {
        Scope::All => state.store.students().to_vec(),
        Scope::Filtered => view::filtered_records(
            state.store.students(),
            &state.students_view,
            &state.collation,
        ),
    }
}

fn teacher_records(state: &AppState, scope: Scope) -> Vec<TeacherRow> {
    match scope {
        Scope::All => state.store.teachers().to_vec(),
        Scope::Filtered => view::filtered_records(
            state.store.teachers(),
            &state.teachers_view,
            &state.collation,
        ),
    }
}

fn generated_at() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M").to_string()
}

fn export_students(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond((|| {
        helpers::session(state, req)?;
        let scope = parse_scope(req)?;
        let records = student_records(state, scope);
        Ok(ok(
            &req.id,
            json!({ "scope": scope.as_str(), "tsv": export::students_tsv(&records) }),
        ))
    })())
}

fn export_teachers(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond((|| {
        helpers::session(state, req)?;
        let scope = parse_scope(req)?;
        let records = teacher_records(state, scope);
        Ok(ok(
            &req.id,
            json!({ "scope": scope.as_str(), "tsv": export::teachers_tsv(&records) }),
        ))
    })())
}

fn report_students(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond((|| {
        helpers::session(state, req)?;
        let scope = parse_scope(req)?;
        let records = student_records(state, scope);
        let report = export::students_report(&records, scope.as_str(), generated_at());
        Ok(ok(&req.id, json!(report)))
    })())
}

fn report_teachers(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond((|| {
        helpers::session(state, req)?;
        let scope = parse_scope(req)?;
        let records = teacher_records(state, scope);
        let report = export::teachers_report(&records, scope.as_str(), generated_at());
        Ok(ok(&req.id, json!(report)))
    })())
}
