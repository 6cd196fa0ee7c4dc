//! Form filling through a narrow host-form adapter
//!
//! The filler never touches the host page directly: it drives a `HostForm`
//! implementation with the values derived from one catalog record. The
//! shipped implementation, `PlanWriter`, records every write into a
//! serializable `FillPlan` that a browser-side shim replays against the real
//! form controls. A control missing on the host page is skipped silently;
//! an avatar attach failure is reported but does not abort the fill.

use crate::catalog::CharacterRecord;
use crate::config::HostFields;
use crate::html_text::HtmlToText;
use crate::infobox::{build_infobox, source_url, Gender};
use anyhow::Result;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tokio::time::{sleep, Duration};

/// Generate a unique ID with prefix
pub fn make_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}

/// The narrow seam between the filler and the host page.
///
/// Implementations decide how each write lands; they also own the
/// missing-control rule (skip silently, never error).
pub trait HostForm {
    fn set_name(&mut self, name: &str);
    fn set_summary(&mut self, summary: &str);
    fn attach_avatar(&mut self, file_name: &str, bytes: &[u8]) -> Result<()>;
    fn enable_raw_markup_mode(&mut self);
    fn set_infobox(&mut self, markup: &str);
}

/// Avatar bytes carried inside a fill plan
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AvatarPayload {
    pub file_name: String,
    pub media_type: String,
    pub data_base64: String,
}

/// One complete, replayable form fill
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FillPlan {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub character_id: String,
    /// host control id -> value to write
    pub fields: BTreeMap<String, String>,
    pub avatar: Option<AvatarPayload>,
    /// Whether the host editor must be switched to raw-markup mode first
    pub raw_markup_mode: bool,
}

/// `HostForm` implementation that records writes into a `FillPlan`
pub struct PlanWriter {
    host_fields: HostFields,
    /// Host control ids to treat as absent (skips the write)
    missing_controls: HashSet<String>,
    fields: BTreeMap<String, String>,
    avatar: Option<AvatarPayload>,
    raw_markup_mode: bool,
}

impl PlanWriter {
    pub fn new(host_fields: HostFields) -> Self {
        Self {
            host_fields,
            missing_controls: HashSet::new(),
            fields: BTreeMap::new(),
            avatar: None,
            raw_markup_mode: false,
        }
    }

    /// Treat a host control id as absent from the page
    pub fn mark_control_missing(&mut self, control_id: impl Into<String>) {
        self.missing_controls.insert(control_id.into());
    }

    fn write_field(&mut self, control_id: &str, value: &str) {
        if self.missing_controls.contains(control_id) {
            return;
        }
        self.fields.insert(control_id.to_string(), value.to_string());
    }

    /// Finish and take the recorded plan
    pub fn into_plan(self, character_id: &str) -> FillPlan {
        FillPlan {
            id: make_id("fill"),
            timestamp: Utc::now(),
            character_id: character_id.to_string(),
            fields: self.fields,
            avatar: self.avatar,
            raw_markup_mode: self.raw_markup_mode,
        }
    }
}

impl HostForm for PlanWriter {
    fn set_name(&mut self, name: &str) {
        let control = self.host_fields.name.clone();
        self.write_field(&control, name);
    }

    fn set_summary(&mut self, summary: &str) {
        let control = self.host_fields.summary.clone();
        self.write_field(&control, summary);
    }

    fn attach_avatar(&mut self, file_name: &str, bytes: &[u8]) -> Result<()> {
        if self.missing_controls.contains(&self.host_fields.upload) {
            return Ok(());
        }
        self.avatar = Some(AvatarPayload {
            file_name: file_name.to_string(),
            media_type: media_type_for(file_name).to_string(),
            data_base64: BASE64.encode(bytes),
        });
        Ok(())
    }

    fn enable_raw_markup_mode(&mut self) {
        self.raw_markup_mode = true;
    }

    fn set_infobox(&mut self, markup: &str) {
        let control = self.host_fields.infobox.clone();
        self.write_field(&control, markup);
    }
}

fn media_type_for(file_name: &str) -> &'static str {
    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else if lower.ends_with(".gif") {
        "image/gif"
    } else if lower.ends_with(".webp") {
        "image/webp"
    } else if lower.ends_with(".bmp") {
        "image/bmp"
    } else {
        "image/png"
    }
}

/// Orchestrates one form fill against any `HostForm`
pub struct FormFiller {
    source_url_template: String,
    settle_delay: Duration,
    converter: HtmlToText,
}

impl FormFiller {
    pub fn new(source_url_template: impl Into<String>, settle_delay_ms: u64) -> Self {
        Self {
            source_url_template: source_url_template.into(),
            settle_delay: Duration::from_millis(settle_delay_ms),
            converter: HtmlToText::new(),
        }
    }

    /// Fill the form for one record. `avatar` carries the cached bytes, if
    /// any. The markup write waits out the settle delay after the raw-mode
    /// switch; the host may still be slower, which is the operator's cue to
    /// re-run the fill.
    pub async fn fill(
        &self,
        form: &mut dyn HostForm,
        id: &str,
        record: &CharacterRecord,
        gender: Gender,
        avatar: Option<(&str, &[u8])>,
    ) -> Result<()> {
        form.set_name(&record.name);

        if !record.description.is_empty() {
            form.set_summary(&self.converter.convert(&record.description));
        }

        if let Some((file_name, bytes)) = avatar {
            if let Err(e) = form.attach_avatar(file_name, bytes) {
                eprintln!("Warning: Failed to attach avatar {}: {:#}", file_name, e);
            }
        }

        let url = source_url(&self.source_url_template, id);
        let markup = build_infobox(&record.name, gender, &record.nick_name, &url);

        form.enable_raw_markup_mode();
        // Best-effort wait for the host editor's mode switch
        sleep(self.settle_delay).await;
        form.set_infobox(&markup);

        Ok(())
    }
}
