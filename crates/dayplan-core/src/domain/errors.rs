//! Errors - アプリケーションレベルのエラー分類
//!
//! # 分類
//! - **Unauthenticated**: サインインしていない状態で操作を試みた
//! - **EmptyText**: trim 後のテキストが空（作成時のクライアント側バリデーション）
//! - **InvalidDueDate**: 過去の期日での作成（日単位で比較）
//! - **Store**: バックエンドの create/read/write エラー（ネットワーク・権限を含む）
//!
//! ポート側のエラー（`StoreError`, `AuthError`）は各ポートのモジュールで定義し、
//! ここでは `#[from]` で包むだけにします。

use chrono::NaiveDate;
use thiserror::Error;

use crate::ports::document_store::StoreError;

/// TaskError は task 操作が呼び出し側へ返すエラー
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("no user is signed in")]
    Unauthenticated,

    #[error("task text is empty after trimming")]
    EmptyText,

    #[error("due date {due} is before today ({today})")]
    InvalidDueDate { due: NaiveDate, today: NaiveDate },

    #[error("store request failed: {0}")]
    Store(#[from] StoreError),
}
