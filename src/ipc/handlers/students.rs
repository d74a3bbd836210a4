use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{self, respond};
use crate::ipc::types::{AppState, Request};
use crate::remote::StudentForm;
use crate::schema::StudentField;
use crate::view;

const SORT_KEYS: &str = "name, gender, grade, teacher, fee, paymentDate";

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.view" => Some(current_view(state, req)),
        "students.filter" => Some(apply_filter(state, req)),
        "students.sort" => Some(apply_sort(state, req)),
        "students.page" => Some(set_page(state, req)),
        "students.pageSize" => Some(set_page_size(state, req)),
        "students.create" => Some(create(state, req)),
        "students.update" => Some(update(state, req)),
        "students.delete" => Some(delete(state, req)),
        _ => None,
    }
}

fn view_response(state: &AppState, req: &Request) -> serde_json::Value {
    let out = view::compute_view(
        state.store.students(),
        &state.students_view,
        &state.collation,
    );
    ok(&req.id, json!(out))
}

fn current_view(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond((|| {
        helpers::session(state, req)?;
        Ok(view_response(state, req))
    })())
}

fn apply_filter(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond((|| {
        helpers::session(state, req)?;
        let criteria = helpers::parse_student_criteria(req, state.date_order);
        state.students_view = state.students_view.clone().with_criteria(criteria);
        Ok(view_response(state, req))
    })())
}

fn apply_sort(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond((|| {
        helpers::session(state, req)?;
        let key: StudentField = helpers::parse_sort_key(req, SORT_KEYS)?;
        state.students_view = state.students_view.clone().with_sort_key(key);
        Ok(view_response(state, req))
    })())
}

fn set_page(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond((|| {
        helpers::session(state, req)?;
        let page = helpers::required_usize(req, "page")?;
        state.students_view = state.students_view.clone().with_page(page);
        Ok(view_response(state, req))
    })())
}

fn set_page_size(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond((|| {
        helpers::session(state, req)?;
        let size = helpers::required_usize(req, "pageSize")?;
        if size == 0 {
            return Err(err(&req.id, "bad_params", "pageSize must be >= 1", None));
        }
        state.students_view = state.students_view.clone().with_page_size(size);
        Ok(view_response(state, req))
    })())
}

fn parse_form(req: &Request) -> Result<StudentForm, serde_json::Value> {
    let Some(v) = req.params.get("form") else {
        return Err(err(&req.id, "bad_params", "missing params.form", None));
    };
    let form: StudentForm = serde_json::from_value(v.clone())
        .map_err(|e| err(&req.id, "bad_params", format!("invalid form: {e}"), None))?;
    if form.name.trim().is_empty() {
        return Err(err(&req.id, "bad_params", "form.name is required", None));
    }
    if form.teacher.trim().is_empty() {
        return Err(err(&req.id, "bad_params", "form.teacher is required", None));
    }
    Ok(form)
}

// Writes go straight to the sheet; the shell follows up with data.refresh,
// record sets are replaced wholesale rather than patched.

fn create(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond((|| {
        helpers::require_admin(state, req)?;
        let form = parse_form(req)?;
        let client = helpers::client(state, req)?;
        client.save_student(&form).map_err(|e| {
            tracing::warn!("saveStudentToTeacherSheet failed: {e:#}");
            err(&req.id, "remote_failed", format!("{e:#}"), None)
        })?;
        Ok(ok(&req.id, json!({ "saved": true })))
    })())
}

fn update(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond((|| {
        helpers::require_admin(state, req)?;
        let original_name = helpers::required_str(req, "originalName")?;
        let form = parse_form(req)?;
        let client = helpers::client(state, req)?;
        client.update_student(&original_name, &form).map_err(|e| {
            tracing::warn!("updateStudentData failed: {e:#}");
            err(&req.id, "remote_failed", format!("{e:#}"), None)
        })?;
        Ok(ok(&req.id, json!({ "updated": true })))
    })())
}

fn delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond((|| {
        helpers::require_admin(state, req)?;
        let name = helpers::required_str(req, "name")?;
        let teacher_name = helpers::required_str(req, "teacherName")?;
        let client = helpers::client(state, req)?;
        client.delete_student(&name, &teacher_name).map_err(|e| {
            tracing::warn!("deleteStudentData failed: {e:#}");
            err(&req.id, "remote_failed", format!("{e:#}"), None)
        })?;
        Ok(ok(&req.id, json!({ "deleted": true })))
    })())
}
