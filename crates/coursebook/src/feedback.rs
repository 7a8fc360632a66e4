//! Playtest feedback, one spreadsheet tab per project.
//!
//! Report types and blocks are free text. [`REPORT_TYPES`] and
//! [`REPORT_BLOCKS`] list the values the client UI suggests; they are only
//! used to generate mock reports and are never enforced.

use std::sync::LazyLock;

use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::AppError;
use crate::mapping::{record_to_row, rows_to_records, Column, Record};
use crate::sheets::{SheetRange, SheetStore, SheetsError};
use crate::util::now_string;

/// Tab used when no usable project name is given.
pub const DEFAULT_TAB: &str = "theDev";
const MAX_TAB_NAME_CHARS: usize = 100;

pub const FEEDBACK_HEADERS: [&str; 5] = ["回报时间", "回报类型", "回报区块", "回报内容", "开发版本号"];
const FEEDBACK_COLUMNS: [Column<'static>; 5] = [
    Column::text(FEEDBACK_HEADERS[0]),
    Column::text(FEEDBACK_HEADERS[1]),
    Column::text(FEEDBACK_HEADERS[2]),
    Column::text(FEEDBACK_HEADERS[3]),
    Column::text(FEEDBACK_HEADERS[4]),
];

const HEADER_CELLS: &str = "A1:E1";
const APPEND_CELLS: &str = "A:E";
const READ_CELLS: &str = "A1:E999";

/// Body and query keys accepted for the project name.
const PROJECT_KEYS: [&str; 4] = ["专案", "專案", "项目", "project"];
const TYPE_KEYS: [&str; 2] = ["回报类型", "回報類型"];
const BLOCK_KEYS: [&str; 2] = ["回报区块", "回報區塊"];
const CONTENT_KEYS: [&str; 2] = ["回报内容", "回報內容"];
const VERSION_KEYS: [&str; 2] = ["开发版本号", "開發版本號"];

pub const REPORT_TYPES: [&str; 5] = ["bug", "优化", "纪录", "建议", "其他"];
pub const REPORT_BLOCKS: [&str; 7] = ["选单", "UX", "战斗", "设定", "商店", "主画面", "其他"];
const MOCK_CONTENTS: [&str; 5] = [
    "进入选单时偶发闪退",
    "按钮点击反馈不明显，建议加强动效",
    "完成关卡 3 后成就未解锁",
    "设定页面载入较慢",
    "战斗中技能冷却数字不清楚",
];
pub const MOCK_VERSION: &str = "v0.1.0";

/// Characters a sheet tab name may not contain.
static UNSAFE_TAB_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\\/:*?\[\]]").expect("valid tab name pattern"));

/// One feedback report as stored in a tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feedback {
    #[serde(rename = "回报时间")]
    pub report_time: String,
    #[serde(rename = "回报类型")]
    pub report_type: String,
    #[serde(rename = "回报区块")]
    pub report_block: String,
    #[serde(rename = "回报内容")]
    pub report_content: String,
    #[serde(rename = "开发版本号")]
    pub dev_version: String,
}

impl Feedback {
    /// Builds a report from a submitted body. The timestamp is always generated here.
    pub fn from_body(body: &Record, report_time: String) -> Self {
        Self {
            report_time,
            report_type: text_field(body, &TYPE_KEYS),
            report_block: text_field(body, &BLOCK_KEYS),
            report_content: text_field(body, &CONTENT_KEYS),
            dev_version: text_field(body, &VERSION_KEYS),
        }
    }

    /// A random report drawn from the suggested values.
    pub fn mock<R: Rng + ?Sized>(rng: &mut R, report_time: String) -> Self {
        Self {
            report_time,
            report_type: pick(rng, &REPORT_TYPES),
            report_block: pick(rng, &REPORT_BLOCKS),
            report_content: pick(rng, &MOCK_CONTENTS),
            dev_version: MOCK_VERSION.to_string(),
        }
    }

    pub fn to_row(&self) -> Vec<Value> {
        let record: Record = [
            &self.report_time,
            &self.report_type,
            &self.report_block,
            &self.report_content,
            &self.dev_version,
        ]
        .into_iter()
        .zip(FEEDBACK_HEADERS)
        .map(|(value, key)| (key.to_string(), Value::from(value.as_str())))
        .collect();

        record_to_row(&record, &FEEDBACK_COLUMNS)
    }
}

#[derive(Debug, Serialize)]
pub struct FeedbackReceipt {
    pub success: bool,
    pub message: String,
    pub data: Feedback,
}

fn pick<R: Rng + ?Sized>(rng: &mut R, values: &[&str]) -> String {
    values.choose(rng).copied().unwrap_or_default().to_string()
}

/// First value present under any of `keys`.
fn lookup<'a>(body: &'a Record, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| body.get(*key))
}

/// Free-text coercion: strings as-is, other values as JSON text, null or absent as "".
fn text_field(body: &Record, keys: &[&str]) -> String {
    match lookup(body, keys) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Turns a free-form project name into a legal tab name.
///
/// `\ / : * ? [ ]` become `_`, the result is trimmed and cut to 100
/// characters, and an empty result falls back to [`DEFAULT_TAB`].
pub fn sheet_tab_name(project: Option<&str>) -> String {
    let Some(project) = project.filter(|p| !p.is_empty()) else {
        return DEFAULT_TAB.to_string();
    };

    let replaced = UNSAFE_TAB_CHARS.replace_all(project, "_");
    let safe: String = replaced.trim().chars().take(MAX_TAB_NAME_CHARS).collect();

    if safe.is_empty() {
        DEFAULT_TAB.to_string()
    } else {
        safe
    }
}

/// Resolves the tab for a JSON project value; anything but a string uses the default.
pub fn tab_for_project(project: Option<&Value>) -> String {
    sheet_tab_name(project.and_then(Value::as_str))
}

/// Tab named by a submitted body.
pub fn tab_for_body(body: &Record) -> String {
    tab_for_project(lookup(body, &PROJECT_KEYS))
}

/// Tab named by query parameters, checked in [`PROJECT_KEYS`] order.
pub fn tab_for_query<'a, F>(param: F) -> String
where
    F: Fn(&str) -> Option<&'a str>,
{
    sheet_tab_name(PROJECT_KEYS.iter().find_map(|key| param(*key)))
}

/// Writes the header row into `tab` unless its first cell is already filled.
///
/// Returns whether a write happened. Two first writes racing each other may
/// both write the header; the content is identical so the outcome is the same.
pub async fn ensure_header(store: &dyn SheetStore, tab: &str) -> Result<bool, SheetsError> {
    let range = SheetRange::new(tab, HEADER_CELLS);
    let existing = store.read_range(&range).await?;

    let has_header = existing
        .first()
        .and_then(|row| row.first())
        .is_some_and(|cell| !cell.is_empty());
    if has_header {
        return Ok(false);
    }

    let header: Vec<Value> = FEEDBACK_HEADERS.iter().map(|h| Value::from(*h)).collect();
    store.update_range(&range, vec![header]).await?;
    info!(tab, "Wrote feedback header row");

    Ok(true)
}

/// Appends `feedback` to `tab`, creating the header first if needed.
pub async fn append_feedback(
    store: &dyn SheetStore,
    tab: &str,
    feedback: &Feedback,
) -> Result<(), SheetsError> {
    ensure_header(store, tab).await?;
    store
        .append_row(&SheetRange::new(tab, APPEND_CELLS), feedback.to_row())
        .await
}

fn require_configured(store: &dyn SheetStore) -> Result<(), AppError> {
    if store.is_configured() {
        Ok(())
    } else {
        Err(AppError::Configuration("SHEET_ID is not set".to_string()))
    }
}

/// Records a submitted report in the tab its project resolves to.
pub async fn submit_feedback(
    store: &dyn SheetStore,
    body: &Record,
) -> Result<FeedbackReceipt, AppError> {
    require_configured(store)?;

    let tab = tab_for_body(body);
    let feedback = Feedback::from_body(body, now_string());

    append_feedback(store, &tab, &feedback)
        .await
        .map_err(|e| AppError::upstream("Failed to write feedback to the spreadsheet", e))?;

    Ok(FeedbackReceipt {
        success: true,
        message: format!("Feedback written to tab \"{tab}\""),
        data: feedback,
    })
}

/// Records one random report in the default tab.
pub async fn submit_mock_feedback(store: &dyn SheetStore) -> Result<FeedbackReceipt, AppError> {
    require_configured(store)?;

    let feedback = Feedback::mock(&mut rand::thread_rng(), now_string());

    append_feedback(store, DEFAULT_TAB, &feedback)
        .await
        .map_err(|e| AppError::upstream("Failed to write mock feedback to the spreadsheet", e))?;

    Ok(FeedbackReceipt {
        success: true,
        message: format!("Mock feedback written to tab \"{DEFAULT_TAB}\""),
        data: feedback,
    })
}

/// Reads every report in `tab`, keyed by the tab's own header row.
pub async fn list_feedback(store: &dyn SheetStore, tab: &str) -> Result<Vec<Record>, AppError> {
    require_configured(store)?;

    let raw = store
        .read_range(&SheetRange::new(tab, READ_CELLS))
        .await
        .map_err(|e| AppError::upstream("Failed to read feedback", e))?;

    Ok(rows_to_records(&raw, 0, 1))
}
