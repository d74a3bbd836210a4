use serde_json::json;

use crate::coerce::format_khr;
use crate::ipc::error::ok;
use crate::ipc::helpers::{self, respond};
use crate::ipc::types::{AppState, Request};
use crate::view;

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.summary" => Some(summary(state, req)),
        _ => None,
    }
}

fn summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond((|| {
        helpers::session(state, req)?;
        // Global totals always come from the complete sets, never from the
        // currently filtered views.
        let teachers = view::aggregate(state.store.teachers());
        let students = view::aggregate(state.store.students());
        Ok(ok(
            &req.id,
            json!({
                "teachers": teachers,
                "students": students,
                "display": {
                    "totalStudents": teachers.students,
                    "totalFee": format_khr(teachers.total_fee),
                    "teacherShare": format_khr(teachers.teacher_share),
                    "schoolShare": format_khr(teachers.school_share),
                }
            }),
        ))
    })())
}
