//! DocumentStore port - 外部ドキュメントストアへのインターフェース
//!
//! このモジュールは Hexagonal Architecture の「ポート」です。
//! マネージドなドキュメント DB（live query 付き）を抽象化し、
//! 一貫性・永続性・リアルタイム配信はすべて実装側（外部サービス）に委ねます。
//!
//! # 設計原則
//! - live query は「owner で等値フィルタした全件スナップショット」を毎回 push する
//! - 購読のキャンセルは `watch::Receiver` を drop するだけ（guard 不要）
//! - wire format は schemaless: フィールドの欠落・型違いは decode 側で吸収する
//!
//! # 実装
//! - **InMemoryStore**（開発・テスト用）: `impls::inmem_store`
//! - 本番用のマネージドバックエンド実装は別クレートで提供する想定

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};
use thiserror::Error;
use tokio::sync::watch;

use crate::domain::{Task, TaskId, UserId};

/// Wire format のフィールド名（ストアに保存される JSON のキー）
pub mod fields {
    pub const TEXT: &str = "text";
    pub const COMPLETED: &str = "completed";
    /// Unix epoch milliseconds、または null
    pub const DUE_DATE: &str = "dueDate";
    pub const USER_ID: &str = "userId";
}

/// StoreError はバックエンド操作の失敗
///
/// UI はこれらを区別せず一律「store failure」として扱うが、
/// ログと in-memory 実装のために分類は保持する。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// ネットワーク断・バックエンド停止など
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// バックエンドのセキュリティルールによる拒否
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// update 対象の document が存在しない（delete は対象不在でも成功）
    #[error("document not found: {0}")]
    NotFound(TaskId),
}

/// Document はストアとの境界を流れる wire 型
///
/// `data` は schemaless な JSON オブジェクト。`to_task()` で [`Task`] に
/// 変換する際、欠落・型違いのフィールドは寛容に扱います。
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: TaskId,
    pub data: Value,
}

impl Document {
    pub fn new(id: TaskId, data: Value) -> Self {
        Self { id, data }
    }

    /// Document を Task に変換する（tolerant decode）
    ///
    /// - `dueDate` が欠落・型違い・範囲外 → `None`
    /// - `text` が欠落 → 空文字列、`completed` が欠落 → false
    /// - `userId` が欠落・解釈不能 → document ごと捨てる（`None` を返す）。
    ///   owner で絞った live query から届く以上、起こらないはずの状態。
    pub fn to_task(&self) -> Option<Task> {
        let user_id = self
            .data
            .get(fields::USER_ID)
            .and_then(Value::as_str)
            .and_then(UserId::parse)?;

        let text = self
            .data
            .get(fields::TEXT)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let completed = self
            .data
            .get(fields::COMPLETED)
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let due_date = self
            .data
            .get(fields::DUE_DATE)
            .and_then(Value::as_i64)
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single());

        Some(Task {
            id: self.id,
            text,
            completed,
            due_date,
            user_id,
        })
    }
}

/// 新規 task の document データを組み立てる（`completed` は必ず false）
pub fn new_task_data(text: &str, due_date: DateTime<Utc>, user: UserId) -> Value {
    json!({
        (fields::TEXT): text,
        (fields::COMPLETED): false,
        (fields::DUE_DATE): due_date.timestamp_millis(),
        (fields::USER_ID): user.as_ulid().to_string(),
    })
}

/// toggle 用の patch（`completed` のみ上書き）
pub fn completed_patch(completed: bool) -> Value {
    json!({ (fields::COMPLETED): completed })
}

/// edit 用の patch（`text` と `dueDate` を無条件に上書き）
pub fn edit_patch(text: &str, due_date: DateTime<Utc>) -> Value {
    json!({
        (fields::TEXT): text,
        (fields::DUE_DATE): due_date.timestamp_millis(),
    })
}

/// DocumentStore は外部ドキュメントストアの正本（source of truth）
///
/// # 設計原則
/// - mutation は write-through: ローカルの楽観的更新はしない。
///   変更は次の live query 通知で反映される
/// - 並行編集は実装側の last-write-wins に委ねる（コア側でロックしない）
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// owner で等値フィルタした live query を開始する
    ///
    /// 戻り値の receiver は常に「最新の全件スナップショット」を保持し、
    /// 変更のたびに通知されます。購読解除は receiver を drop するだけです。
    async fn watch(&self, user: UserId) -> Result<watch::Receiver<Vec<Document>>, StoreError>;

    /// document を作成し、ストアが発行した id を返す
    async fn create(&self, data: Value) -> Result<TaskId, StoreError>;

    /// document の指定フィールドを上書きする（対象不在は NotFound）
    async fn update(&self, id: TaskId, patch: Value) -> Result<(), StoreError>;

    /// document を削除する（対象不在でも成功として扱う）
    async fn delete(&self, id: TaskId) -> Result<(), StoreError>;
}
