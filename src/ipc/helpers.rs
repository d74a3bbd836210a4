use super::error::err;
use super::types::{AppState, Request, Session};
use crate::coerce::{self, DateOrder};
use crate::remote::SheetClient;
use crate::view::FilterCriteria;

pub fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn opt_str(req: &Request, key: &str) -> Option<String> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

pub fn required_usize(req: &Request, key: &str) -> Result<usize, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                format!("{} must be a non-negative integer", key),
                None,
            )
        })
}

/// Exact-match selector; absent, empty, or the "ALL" sentinel all mean
/// "don't filter on this".
pub fn selector(req: &Request, key: &str) -> Option<String> {
    opt_str(req, key).filter(|s| !s.eq_ignore_ascii_case("all"))
}

pub fn parse_sort_key<T: serde::de::DeserializeOwned>(
    req: &Request,
    valid: &str,
) -> Result<T, serde_json::Value> {
    let Some(v) = req.params.get("key") else {
        return Err(err(&req.id, "bad_params", "missing params.key", None));
    };
    serde_json::from_value(v.clone())
        .map_err(|_| err(&req.id, "bad_params", format!("key must be one of: {valid}"), None))
}

/// Criteria for the student table. Malformed date bounds coerce to `None`
/// like every other bad date in the system.
pub fn parse_student_criteria(req: &Request, order: DateOrder) -> FilterCriteria {
    FilterCriteria {
        query: opt_str(req, "query").unwrap_or_default(),
        teacher: selector(req, "teacher"),
        grade: selector(req, "grade"),
        gender: selector(req, "gender"),
        date_from: opt_str(req, "dateFrom").and_then(|s| coerce::parse_date(&s, order)),
        date_to: opt_str(req, "dateTo").and_then(|s| coerce::parse_date(&s, order)),
    }
}

/// The teacher-summary table only filters on name text and gender.
pub fn parse_teacher_criteria(req: &Request) -> FilterCriteria {
    FilterCriteria {
        query: opt_str(req, "query").unwrap_or_default(),
        gender: selector(req, "gender"),
        ..FilterCriteria::default()
    }
}

pub fn client<'a>(state: &'a AppState, req: &Request) -> Result<&'a SheetClient, serde_json::Value> {
    state
        .client
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_service", "call service.connect first", None))
}

pub fn session<'a>(state: &'a AppState, req: &Request) -> Result<&'a Session, serde_json::Value> {
    state
        .session
        .as_ref()
        .ok_or_else(|| err(&req.id, "not_logged_in", "log in first", None))
}

/// Mutating methods are gated locally; a rejected caller never reaches the
/// remote service.
pub fn require_admin(state: &AppState, req: &Request) -> Result<(), serde_json::Value> {
    let s = session(state, req)?;
    if !s.is_admin() {
        return Err(err(
            &req.id,
            "forbidden",
            format!("role '{}' may not modify student records", s.role),
            None,
        ));
    }
    Ok(())
}

/// Handlers assemble a `Result` where both sides are complete responses.
pub fn respond(r: Result<serde_json::Value, serde_json::Value>) -> serde_json::Value {
    r.unwrap_or_else(|e| e)
}
