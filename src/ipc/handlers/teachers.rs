use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{self, respond};
use crate::ipc::types::{AppState, Request};
use crate::schema::TeacherField;
use crate::view;

const SORT_KEYS: &str = "teacher, gender, students, totalFee, teacherShare, schoolShare";

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "teachers.view" => Some(current_view(state, req)),
        "teachers.filter" => Some(apply_filter(state, req)),
        "teachers.sort" => Some(apply_sort(state, req)),
        "teachers.page" => Some(set_page(state, req)),
        "teachers.pageSize" => Some(set_page_size(state, req)),
        _ => None,
    }
}

fn view_response(state: &AppState, req: &Request) -> serde_json::Value {
    let out = view::compute_view(
        state.store.teachers(),
        &state.teachers_view,
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
        let criteria = helpers::parse_teacher_criteria(req);
        state.teachers_view = state.teachers_view.clone().with_criteria(criteria);
        Ok(view_response(state, req))
    })())
}

fn apply_sort(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond((|| {
        helpers::session(state, req)?;
        let key: TeacherField = helpers::parse_sort_key(req, SORT_KEYS)?;
        state.teachers_view = state.teachers_view.clone().with_sort_key(key);
        Ok(view_response(state, req))
    })())
}

fn set_page(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond((|| {
        helpers::session(state, req)?;
        let page = helpers::required_usize(req, "page")?;
        state.teachers_view = state.teachers_view.clone().with_page(page);
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
        state.teachers_view = state.teachers_view.clone().with_page_size(size);
        Ok(view_response(state, req))
    })())
}
