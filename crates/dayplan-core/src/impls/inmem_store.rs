//! InMemoryStore - 開発・テスト用のドキュメントストア
//!
//! 外部のマネージドバックエンドが担う live query を、プロセス内で演じます。
//!
//! # 実装詳細
//! - `BTreeMap<TaskId, Value>` で document を保持（ULID 順 = 作成順）
//! - owner ごとの `watch::Sender` を保持し、mutation のたびに
//!   該当ユーザーの全件スナップショットを再送する
//! - receiver が drop された購読は、次の broadcast で刈り取る
//! - 並行編集はロック順で直列化される（= last-write-wins）

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{Mutex, watch};

use crate::domain::{TaskId, UserId};
use crate::ports::document_store::{Document, DocumentStore, StoreError, fields};
use crate::ports::{IdGenerator, SystemClock, UlidGenerator};

/// In-memory store state.
struct StoreState {
    /// All documents (single source of truth).
    docs: BTreeMap<TaskId, Value>,

    /// One live query per subscribed receiver, keyed by owner.
    watchers: Vec<(UserId, watch::Sender<Vec<Document>>)>,

    /// Injected failure for the next operation (test hook).
    fail_next: Option<StoreError>,
}

impl StoreState {
    fn new() -> Self {
        Self {
            docs: BTreeMap::new(),
            watchers: Vec::new(),
            fail_next: None,
        }
    }

    /// Consume an injected failure, if any.
    fn take_fault(&mut self) -> Result<(), StoreError> {
        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Whole-collection snapshot filtered by owner.
    fn snapshot_for(&self, user: UserId) -> Vec<Document> {
        let key = user.as_ulid().to_string();
        self.docs
            .iter()
            .filter(|(_, data)| {
                data.get(fields::USER_ID).and_then(Value::as_str) == Some(key.as_str())
            })
            .map(|(id, data)| Document::new(*id, data.clone()))
            .collect()
    }

    /// Re-send snapshots to every live watcher, pruning closed ones.
    fn broadcast(&mut self) {
        let mut watchers = std::mem::take(&mut self.watchers);
        // send が失敗した watcher は receiver が drop 済み = 購読解除
        watchers.retain(|(user, tx)| tx.send(self.snapshot_for(*user)).is_ok());
        self.watchers = watchers;
    }
}

/// In-memory DocumentStore implementation.
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
    ids: UlidGenerator<SystemClock>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState::new())),
            ids: UlidGenerator::new(SystemClock),
        }
    }

    /// Inject a failure for the next operation (for testing).
    #[cfg(test)]
    pub fn fail_next(&self, err: StoreError) {
        // blocking_lock は async context では使えないので try_lock で十分
        // （テストは mutation と競合しないタイミングで呼ぶ）
        self.state.try_lock().expect("store busy").fail_next = Some(err);
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn watch(&self, user: UserId) -> Result<watch::Receiver<Vec<Document>>, StoreError> {
        let mut state = self.state.lock().await;
        state.take_fault()?;

        let (tx, rx) = watch::channel(state.snapshot_for(user));
        state.watchers.push((user, tx));
        Ok(rx)
    }

    async fn create(&self, data: Value) -> Result<TaskId, StoreError> {
        let mut state = self.state.lock().await;
        state.take_fault()?;

        let id = self.ids.generate_task_id();
        state.docs.insert(id, data);
        state.broadcast();
        Ok(id)
    }

    async fn update(&self, id: TaskId, patch: Value) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.take_fault()?;

        let Some(doc) = state.docs.get_mut(&id) else {
            return Err(StoreError::NotFound(id));
        };

        match (doc.as_object_mut(), patch.as_object()) {
            (Some(doc_obj), Some(patch_obj)) => {
                for (key, value) in patch_obj {
                    doc_obj.insert(key.clone(), value.clone());
                }
            }
            // オブジェクト以外の patch は document の置き換えとして扱う
            _ => *doc = patch,
        }

        state.broadcast();
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.take_fault()?;

        // 対象不在の削除は成功扱い（broadcast も不要）
        if state.docs.remove(&id).is_some() {
            state.broadcast();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::document_store::{completed_patch, new_task_data};
    use chrono::{TimeZone, Utc};
    use ulid::Ulid;

    fn user() -> UserId {
        UserId::from_ulid(Ulid::new())
    }

    fn due() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 16, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn snapshots_are_scoped_by_owner() {
        let store = InMemoryStore::new();
        let alice = user();
        let bob = user();

        store.create(new_task_data("for alice", due(), alice)).await.unwrap();
        store.create(new_task_data("for bob", due(), bob)).await.unwrap();

        let alice_rx = store.watch(alice).await.unwrap();
        let bob_rx = store.watch(bob).await.unwrap();

        let alice_docs = alice_rx.borrow().clone();
        let bob_docs = bob_rx.borrow().clone();
        assert_eq!(alice_docs.len(), 1);
        assert_eq!(bob_docs.len(), 1);
        assert_ne!(alice_docs[0].id, bob_docs[0].id);
    }

    #[tokio::test]
    async fn mutations_rebroadcast_the_snapshot() {
        let store = InMemoryStore::new();
        let me = user();
        let mut rx = store.watch(me).await.unwrap();
        assert!(rx.borrow().is_empty());

        let id = store.create(new_task_data("hello", due(), me)).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        store.update(id, completed_patch(true)).await.unwrap();
        rx.changed().await.unwrap();
        let doc = rx.borrow_and_update()[0].clone();
        assert_eq!(doc.to_task().unwrap().completed, true);
        // patch は他のフィールドに触らない
        assert_eq!(doc.to_task().unwrap().text, "hello");

        store.delete(id).await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_empty());
    }

    #[tokio::test]
    async fn update_of_absent_document_is_not_found() {
        let store = InMemoryStore::new();
        let id = TaskId::from_ulid(Ulid::new());

        let err = store.update(id, completed_patch(true)).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound(id));
    }

    #[tokio::test]
    async fn delete_of_absent_document_is_ok() {
        let store = InMemoryStore::new();
        let id = TaskId::from_ulid(Ulid::new());

        assert!(store.delete(id).await.is_ok());
    }

    #[tokio::test]
    async fn dropped_receivers_are_pruned() {
        let store = InMemoryStore::new();
        let me = user();

        let rx = store.watch(me).await.unwrap();
        drop(rx);

        // 次の broadcast で閉じた購読が刈り取られる
        store.create(new_task_data("prune trigger", due(), me)).await.unwrap();
        assert!(store.state.lock().await.watchers.is_empty());
    }

    #[tokio::test]
    async fn injected_failure_fires_exactly_once() {
        let store = InMemoryStore::new();
        let me = user();

        store.fail_next(StoreError::Unavailable("offline".into()));
        let err = store.create(new_task_data("doomed", due(), me)).await.unwrap_err();
        assert_eq!(err, StoreError::Unavailable("offline".into()));

        // 次の操作は成功する
        assert!(store.create(new_task_data("fine", due(), me)).await.is_ok());
    }

    #[tokio::test]
    async fn document_ids_follow_creation_order() {
        let store = InMemoryStore::new();
        let me = user();

        let id1 = store.create(new_task_data("first", due(), me)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let id2 = store.create(new_task_data("second", due(), me)).await.unwrap();

        // ULID は時刻順なので BTreeMap のイテレーション順 = 作成順
        assert!(id1 < id2);
    }
}
