//! InMemoryAuth - 開発・テスト用のアイデンティティプロバイダ
//!
//! 外部プロバイダの「サインイン中のユーザー or 不在」だけを watch チャンネルで
//! 模倣します。トークンや資格情報は扱いません。

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::UserId;
use crate::ports::{AuthError, AuthGateway};

/// In-memory AuthGateway implementation.
pub struct InMemoryAuth {
    tx: watch::Sender<Option<UserId>>,
}

impl InMemoryAuth {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// サインインする（ユーザー切り替えもこれで表現する）
    pub fn sign_in(&self, user: UserId) {
        let _ = self.tx.send(Some(user));
    }
}

impl Default for InMemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthGateway for InMemoryAuth {
    fn watch(&self) -> watch::Receiver<Option<UserId>> {
        self.tx.subscribe()
    }

    fn current_user(&self) -> Option<UserId> {
        *self.tx.borrow()
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let _ = self.tx.send(None);
        Ok(())
    }
}
