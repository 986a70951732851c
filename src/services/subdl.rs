use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;

use super::SubtitleUploadService;
use crate::error::UploadError;
use crate::model::UploadTask;

const DEFAULT_BASE_URL: &str = "https://api3.subdl.com";
const UPLOAD_TAG: &str = "subdl_batch";

#[derive(Debug, Deserialize)]
struct NidResponse {
    #[serde(default)]
    ok: bool,
    n_id: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct FileResponse {
    #[serde(default)]
    ok: bool,
    file: Option<UploadedFile>,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    file_n_id: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CompleteResponse {
    status: Option<bool>,
    ok: Option<bool>,
    error: Option<String>,
}

// Ids come back as either numbers or strings.
fn id_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Fields of the final `uploadSubtitle` request. The episode range is not sent.
fn completion_form(
    task: &UploadTask,
    n_id: &str,
    file_n_id: &str,
) -> Vec<(&'static str, String)> {
    let name = task
        .file_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default();

    vec![
        ("file_n_ids", json_array(&[file_n_id])),
        ("tmdb_id", task.target_id.to_string()),
        ("type", "tv".to_string()),
        ("quality", "web".to_string()),
        ("production_type", "2".to_string()),
        ("name", name),
        ("releases", json_array(&task.releases)),
        ("framerate", task.framerate.code().to_string()),
        ("comment", task.comment.clone()),
        ("lang", task.language_id.clone()),
        ("season", task.season.to_string()),
        ("hi", "false".to_string()),
        ("is_full_season", "false".to_string()),
        ("n_id", n_id.to_string()),
        ("tags", json_array(&[UPLOAD_TAG])),
    ]
}

fn json_array<S: AsRef<str>>(items: &[S]) -> String {
    let items: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
    serde_json::to_string(&items).unwrap_or_else(|_| "[]".to_string())
}

pub struct SubdlClient {
    client: Client,
    token: Option<String>,
    base_url: String,
}

impl SubdlClient {
    pub fn new(token: Option<String>) -> Self {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(token: Option<String>, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            token: token.filter(|t| !t.trim().is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn token(&self) -> Result<&str, UploadError> {
        self.token.as_deref().ok_or(UploadError::MissingToken)
    }

    async fn fetch_nid(&self) -> Result<String, UploadError> {
        let response = self
            .client
            .get(format!("{}/user/getNId", self.base_url))
            .header("token", self.token()?)
            .send()
            .await?
            .error_for_status()?;

        let body: NidResponse = response.json().await?;
        match (body.ok, body.n_id.and_then(id_string)) {
            (true, Some(n_id)) => Ok(n_id),
            _ => Err(UploadError::Rejected("failed to get NID".to_string())),
        }
    }

    async fn upload_file(&self, task: &UploadTask) -> Result<String, UploadError> {
        let bytes = tokio::fs::read(&task.file_path).await?;
        let part = Part::bytes(bytes).file_name(task.file_name());
        let form = Form::new().part("subtitle", part);

        let response = self
            .client
            .post(format!("{}/user/uploadSingleSubtitle", self.base_url))
            .header("token", self.token()?)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        let body: FileResponse = response.json().await?;
        match (body.ok, body.file.and_then(|f| f.file_n_id).and_then(id_string)) {
            (true, Some(file_n_id)) => Ok(file_n_id),
            _ => Err(UploadError::Rejected("failed to upload subtitle file".to_string())),
        }
    }

    async fn complete_upload(
        &self,
        task: &UploadTask,
        n_id: &str,
        file_n_id: &str,
    ) -> Result<bool, UploadError> {
        let form = completion_form(task, n_id, file_n_id);

        let response = self
            .client
            .post(format!("{}/user/uploadSubtitle", self.base_url))
            .header("token", self.token()?)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!("uploadSubtitle response ({}): {}", status, text);

        let body: CompleteResponse = serde_json::from_str(&text).map_err(|_| {
            UploadError::Rejected(format!("unexpected response ({}): {}", status, text))
        })?;

        if !status.is_success() {
            let reason = body.error.unwrap_or_else(|| status.to_string());
            return Err(UploadError::Rejected(reason));
        }

        match body.status.or(body.ok) {
            Some(accepted) => {
                if !accepted {
                    warn!("subdl did not accept {}: {:?}", task.file_name(), body.error);
                }
                Ok(accepted)
            }
            None => Err(UploadError::Rejected("unexpected response format".to_string())),
        }
    }
}

#[async_trait]
impl SubtitleUploadService for SubdlClient {
    async fn upload(&self, task: &UploadTask) -> Result<bool, UploadError> {
        if task.language_id.trim().is_empty() {
            return Err(UploadError::Validation("language code is empty".to_string()));
        }

        let n_id = self.fetch_nid().await?;
        debug!("fetched subdl nid: {}", n_id);

        let file_n_id = self.upload_file(task).await?;
        debug!("uploaded subtitle file {}: {}", task.file_name(), file_n_id);

        let accepted = self.complete_upload(task, &n_id, &file_n_id).await?;
        if accepted {
            info!("Uploaded {}", task.file_name());
        }
        Ok(accepted)
    }
}
