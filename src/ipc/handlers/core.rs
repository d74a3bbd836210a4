use serde_json::json;
use uuid::Uuid;

use crate::coerce::DateOrder;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{self, respond};
use crate::ipc::types::{AppState, Request, Session};
use crate::remote::SheetClient;
use crate::schema;
use crate::view::ViewState;

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "service.connect" => Some(handle_connect(state, req)),
        "auth.login" => Some(handle_login(state, req)),
        "auth.logout" => Some(handle_logout(state, req)),
        "data.refresh" => Some(handle_refresh(state, req)),
        _ => None,
    }
}

fn handle_health(state: &AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "serviceUrl": state.client.as_ref().map(|c| c.base_url().to_string()),
            "loggedIn": state.session.is_some(),
            "role": state.session.as_ref().map(|s| s.role.clone()),
        }),
    )
}

fn handle_connect(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond((|| {
        let url = helpers::required_str(req, "url")?;
        let date_order = match req.params.get("dateOrder") {
            None | Some(serde_json::Value::Null) => DateOrder::default(),
            Some(v) => serde_json::from_value::<DateOrder>(v.clone()).map_err(|_| {
                err(
                    &req.id,
                    "bad_params",
                    "dateOrder must be \"day-first\" or \"month-first\"",
                    None,
                )
            })?,
        };
        let client = SheetClient::new(url)
            .map_err(|e| err(&req.id, "bad_params", format!("{e:#}"), None))?;

        // Rows mapped under a previous service or date order are stale now.
        state.store.clear();
        state.students_view = ViewState::default();
        state.teachers_view = ViewState::default();
        state.date_order = date_order;
        let url = client.base_url().to_string();
        state.client = Some(client);

        Ok(ok(
            &req.id,
            json!({ "serviceUrl": url, "dateOrder": date_order }),
        ))
    })())
}

fn handle_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond((|| {
        let username = helpers::required_str(req, "username")?;
        let password = helpers::required_str(req, "password")?;
        let client = helpers::client(state, req)?;

        let api = client.check_login(&username, &password).map_err(|e| {
            tracing::warn!("checkLogin failed: {e:#}");
            err(&req.id, "remote_failed", format!("{e:#}"), None)
        })?;

        if !api.success {
            return Err(err(
                &req.id,
                "login_failed",
                api.message
                    .unwrap_or_else(|| "invalid username or password".to_string()),
                None,
            ));
        }

        let role = api.role.unwrap_or_else(|| "viewer".to_string());
        let session = Session {
            id: Uuid::new_v4(),
            username,
            role: role.clone(),
        };
        let session_id = session.id.to_string();
        tracing::debug!(session = %session_id, user = %session.username, role, "login ok");
        state.session = Some(session);

        Ok(ok(
            &req.id,
            json!({ "sessionId": session_id, "role": role }),
        ))
    })())
}

fn handle_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    // Installed rows stay; only the session goes away.
    state.session = None;
    ok(&req.id, json!({}))
}

fn handle_refresh(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond((|| {
        helpers::session(state, req)?;

        // Token first: a refresh issued later must win over this one.
        let token = state.store.begin_refresh();
        let client = helpers::client(state, req)?;

        let remote_err = |e: anyhow::Error| {
            tracing::warn!("data refresh failed: {e:#}");
            err(&req.id, "remote_failed", format!("{e:#}"), None)
        };
        let teacher_rows = client.get_teacher_data().map_err(remote_err)?;
        let student_rows = client.get_student_data().map_err(remote_err)?;

        let students = schema::map_students(&student_rows, state.date_order);
        let teachers = schema::map_teachers(&teacher_rows);
        let counts = json!({ "students": students.len(), "teachers": teachers.len() });

        if !state.store.install(token, students, teachers) {
            return Err(err(
                &req.id,
                "stale_refresh",
                "a newer refresh superseded this one",
                None,
            ));
        }
        Ok(ok(&req.id, counts))
    })())
}
