use serde::Deserialize;
use uuid::Uuid;

use crate::coerce::DateOrder;
use crate::remote::SheetClient;
use crate::schema::{StudentField, TeacherField};
use crate::store::DataStore;
use crate::view::{Collation, ViewState};

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct Session {
    pub id: Uuid,
    pub username: String,
    pub role: String,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role.eq_ignore_ascii_case("admin")
    }
}

pub struct AppState {
    pub client: Option<SheetClient>,
    pub date_order: DateOrder,
    pub session: Option<Session>,
    pub store: DataStore,
    pub students_view: ViewState<StudentField>,
    pub teachers_view: ViewState<TeacherField>,
    pub collation: Collation,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            client: None,
            date_order: DateOrder::default(),
            session: None,
            store: DataStore::default(),
            students_view: ViewState::default(),
            teachers_view: ViewState::default(),
            collation: Collation::khmer(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
