//! AuthGateway port - 外部アイデンティティプロバイダへのインターフェース
//!
//! コアが扱うのは「サインイン中のユーザー（または不在）」と sign-out だけです。
//! トークンのライフサイクルやサインインの UI フローはプロバイダ側の責務であり、
//! ここでは opaque な `UserId` のみを受け取ります。
//!
//! # 設計原則
//! - auth 状態は `watch` チャンネルで配信する（full-state replacement）
//! - ユーザー切り替え・サインアウトの検知はこのチャンネル経由で行う

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;

use crate::domain::UserId;

/// AuthError はプロバイダ操作の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// AuthGateway はサインイン状態の正本
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// サインイン状態の live view。`None` はサインアウト状態。
    fn watch(&self) -> watch::Receiver<Option<UserId>>;

    /// 現時点のサインイン中ユーザー
    fn current_user(&self) -> Option<UserId>;

    /// サインアウトする（失敗はログのみ、UI には出さない想定）
    async fn sign_out(&self) -> Result<(), AuthError>;
}
