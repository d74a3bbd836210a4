use std::time::Duration;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::schema::RawRow;

/// Everything the sheet macro endpoint ever answers with. Absent fields
/// deserialize to their defaults so older deployments stay readable.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub rows: Option<Vec<RawRow>>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Student form as the UI shell submits it. `fee` is tolerated as either
/// display text or a bare number, matching what the sheet itself stores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub teacher: String,
    #[serde(default)]
    pub fee: serde_json::Value,
    #[serde(default)]
    pub payment_date: String,
}

impl StudentForm {
    fn fee_arg(&self) -> String {
        match &self.fee {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => String::new(),
        }
    }
}

/// Blocking client for the spreadsheet macro service: a single GET
/// endpoint dispatching on `action=<functionName>` with named string
/// arguments and a JSON body back.
pub struct SheetClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl SheetClient {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("building http client")?;
        Ok(SheetClient {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn invoke(&self, action: &str, args: &[(&str, &str)]) -> anyhow::Result<ApiResponse> {
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[("action", action)])
            .query(args)
            .send()
            .with_context(|| format!("{action}: request failed"))?;
        let status = resp.status();
        if !status.is_success() {
            bail!("{action}: service returned HTTP {status}");
        }
        resp.json::<ApiResponse>()
            .with_context(|| format!("{action}: invalid JSON from service"))
    }

    /// Like `invoke`, but treats `success: false` as a failure too.
    fn invoke_ok(&self, action: &str, args: &[(&str, &str)]) -> anyhow::Result<ApiResponse> {
        let api = self.invoke(action, args)?;
        if !api.success {
            bail!(
                "{action}: {}",
                api.message.as_deref().unwrap_or("service rejected the call")
            );
        }
        Ok(api)
    }

    /// `success: false` here means bad credentials, not a transport error,
    /// so the raw response goes back to the caller to interpret.
    pub fn check_login(&self, username: &str, password: &str) -> anyhow::Result<ApiResponse> {
        self.invoke(
            "checkLogin",
            &[("username", username), ("password", password)],
        )
    }

    pub fn get_student_data(&self) -> anyhow::Result<Vec<RawRow>> {
        let api = self.invoke_ok("getStudentData", &[])?;
        Ok(api.rows.unwrap_or_default())
    }

    pub fn get_teacher_data(&self) -> anyhow::Result<Vec<RawRow>> {
        let api = self.invoke_ok("getTeacherData", &[])?;
        Ok(api.rows.unwrap_or_default())
    }

    pub fn save_student(&self, form: &StudentForm) -> anyhow::Result<()> {
        let fee = form.fee_arg();
        self.invoke_ok(
            "saveStudentToTeacherSheet",
            &[
                ("name", form.name.as_str()),
                ("gender", form.gender.as_str()),
                ("grade", form.grade.as_str()),
                ("teacher", form.teacher.as_str()),
                ("fee", fee.as_str()),
                ("paymentDate", form.payment_date.as_str()),
            ],
        )?;
        Ok(())
    }

    pub fn update_student(&self, original_name: &str, form: &StudentForm) -> anyhow::Result<()> {
        let fee = form.fee_arg();
        self.invoke_ok(
            "updateStudentData",
            &[
                ("originalName", original_name),
                ("name", form.name.as_str()),
                ("gender", form.gender.as_str()),
                ("grade", form.grade.as_str()),
                ("teacher", form.teacher.as_str()),
                ("fee", fee.as_str()),
                ("paymentDate", form.payment_date.as_str()),
            ],
        )?;
        Ok(())
    }

    pub fn delete_student(&self, name: &str, teacher_name: &str) -> anyhow::Result<()> {
        self.invoke_ok(
            "deleteStudentData",
            &[("name", name), ("teacherName", teacher_name)],
        )?;
        Ok(())
    }
}
