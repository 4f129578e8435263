//! TaskClient - UI と外部ドキュメントストアの橋渡し
//!
//! 購読のライフサイクルを所有し、サインイン中ユーザーにスコープした
//! CRUD 操作を公開します。
//!
//! # 設計原則
//! - **Write-through**: mutation はストアへ送るだけ。ローカルのリストは
//!   次の live query 通知でのみ更新する（楽観的更新はしない）
//! - 同時に有効な購読は常に 1 本。ユーザー切り替え時は旧購読を
//!   drop してから新しい購読を張る
//! - サインアウト時は即座に空リストを publish し、以降は旧ユーザーの
//!   通知を一切処理しない

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::app::views::{self, CalendarEvent};
use crate::domain::{Task, TaskError, TaskId, UserId};
use crate::ports::document_store::{completed_patch, edit_patch, new_task_data};
use crate::ports::{AuthGateway, Clock, Document, DocumentStore};

/// TaskClient はサインイン中ユーザーの task リストを同期し、CRUD を提供する
///
/// 生成と同時にセッションループ（auth 状態と live query を select する
/// tokio task）を spawn します。drop 時にループごと購読を破棄します。
pub struct TaskClient {
    store: Arc<dyn DocumentStore>,
    auth: Arc<dyn AuthGateway>,
    clock: Arc<dyn Clock>,
    tasks_rx: watch::Receiver<Vec<Task>>,
    session: JoinHandle<()>,
}

impl TaskClient {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthGateway>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (tasks_tx, tasks_rx) = watch::channel(Vec::new());
        let session = tokio::spawn(session_loop(Arc::clone(&store), auth.watch(), tasks_tx));
        Self {
            store,
            auth,
            clock,
            tasks_rx,
            session,
        }
    }

    /// task リストの live view（期日昇順にソート済み）
    ///
    /// 値は常に「最後に届いたスナップショット」の反映であり、
    /// ローカルで組み立てたキャッシュではありません。
    pub fn tasks(&self) -> watch::Receiver<Vec<Task>> {
        self.tasks_rx.clone()
    }

    /// 現時点のスナップショットを複製して返す
    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks_rx.borrow().clone()
    }

    /// 今日が期日の task（"Today" ページ相当）
    pub fn due_today(&self) -> Vec<Task> {
        views::due_today(&self.snapshot(), self.clock.today())
    }

    /// カレンダーイベントへの射影（"Upcoming" ページ相当）
    pub fn calendar(&self) -> Vec<CalendarEvent> {
        views::calendar_events(&self.snapshot())
    }

    /// task を作成する
    ///
    /// - サインインしていなければ `Unauthenticated`
    /// - trim 後のテキストが空なら `EmptyText`
    /// - 期日が（日単位で）今日より前なら `InvalidDueDate`
    ///
    /// 成功してもローカルのリストは触りません。反映は次の live query 通知で。
    pub async fn add_task(
        &self,
        text: &str,
        due_date: DateTime<Utc>,
    ) -> Result<TaskId, TaskError> {
        let Some(user) = self.auth.current_user() else {
            return Err(TaskError::Unauthenticated);
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(TaskError::EmptyText);
        }

        let today = self.clock.today();
        let due = due_date.date_naive();
        if due < today {
            return Err(TaskError::InvalidDueDate { due, today });
        }

        match self.store.create(new_task_data(text, due_date, user)).await {
            Ok(id) => Ok(id),
            Err(err) => {
                tracing::warn!(error = %err, "create request rejected by store");
                Err(err.into())
            }
        }
    }

    /// `completed` を反転する
    ///
    /// 現在のスナップショットに `id` が見つからない場合は黙って no-op
    /// （操作は破棄され、エラーも返さない）。呼び出し側は反転が起きた前提で
    /// 動いてはいけません。
    pub async fn toggle_task(&self, id: TaskId) -> Result<(), TaskError> {
        let completed = self.tasks_rx.borrow().iter().find(|t| t.id == id).map(|t| t.completed);
        let Some(completed) = completed else {
            tracing::debug!(id = %id, "toggle for a task not in the current snapshot; dropped");
            return Ok(());
        };

        if let Err(err) = self.store.update(id, completed_patch(!completed)).await {
            tracing::warn!(id = %id, error = %err, "toggle write rejected by store");
            return Err(err.into());
        }
        Ok(())
    }

    /// `text` と期日を無条件に上書きする
    ///
    /// 過去の期日もここでは受け付けます（検証は作成時のみ）。
    pub async fn edit_task(
        &self,
        id: TaskId,
        text: &str,
        due_date: DateTime<Utc>,
    ) -> Result<(), TaskError> {
        if let Err(err) = self.store.update(id, edit_patch(text, due_date)).await {
            tracing::warn!(id = %id, error = %err, "edit write rejected by store");
            return Err(err.into());
        }
        Ok(())
    }

    /// task を削除する
    ///
    /// クライアント側の存在チェックはしません。対象不在の削除は
    /// ストア側が成功として扱います。
    pub async fn delete_task(&self, id: TaskId) -> Result<(), TaskError> {
        if let Err(err) = self.store.delete(id).await {
            tracing::warn!(id = %id, error = %err, "delete request rejected by store");
            return Err(err.into());
        }
        Ok(())
    }
}

impl Drop for TaskClient {
    fn drop(&mut self) {
        // セッションループごと購読を破棄する。in-flight の write は
        // キャンセルしない（awaited している呼び出し側に委ねる）。
        self.session.abort();
    }
}

/// セッションループ: auth 状態の変化と live query の通知を 1 本の task で捌く
///
/// サインイン中のユーザーが変わったら、旧購読を drop → 空リストを publish →
/// 新ユーザーの live query を確立、の順で進めます。この順序により、
/// 切り替え後に stale なユーザーのデータを処理することがありません。
async fn session_loop(
    store: Arc<dyn DocumentStore>,
    mut auth_rx: watch::Receiver<Option<UserId>>,
    tasks_tx: watch::Sender<Vec<Task>>,
) {
    let mut subscription: Option<(UserId, watch::Receiver<Vec<Document>>)> = None;

    loop {
        let desired = *auth_rx.borrow_and_update();
        let active = subscription.as_ref().map(|(user, _)| *user);

        if desired != active {
            // 旧購読を先に手放す
            subscription = None;
            let _ = tasks_tx.send(Vec::new());

            if let Some(user) = desired {
                match store.watch(user).await {
                    Ok(mut docs_rx) => {
                        tracing::debug!(user = %user, "live query established");
                        publish(&tasks_tx, &docs_rx.borrow_and_update());
                        subscription = Some((user, docs_rx));
                    }
                    Err(err) => {
                        tracing::warn!(user = %user, error = %err, "live query could not be established");
                        // 自動リトライはしない: 次の auth 変化まで待つ
                        if auth_rx.changed().await.is_err() {
                            break;
                        }
                    }
                }
            } else {
                tracing::debug!("signed out; task list cleared");
            }
            // watch().await の間に auth が変わったかもしれないので読み直す
            continue;
        }

        let mut lost_subscription = false;
        match subscription.as_mut() {
            Some((user, docs_rx)) => {
                tokio::select! {
                    changed = auth_rx.changed() => {
                        if changed.is_err() {
                            // auth gateway が落ちた: セッション終了
                            break;
                        }
                    }
                    changed = docs_rx.changed() => match changed {
                        Ok(()) => publish(&tasks_tx, &docs_rx.borrow_and_update()),
                        Err(_) => {
                            tracing::warn!(user = %user, "store closed the live query");
                            lost_subscription = true;
                        }
                    },
                }
            }
            None => {
                if auth_rx.changed().await.is_err() {
                    break;
                }
            }
        }

        if lost_subscription {
            subscription = None;
            let _ = tasks_tx.send(Vec::new());
        }
    }
}

/// スナップショットを decode → ソートして publish する
fn publish(tasks_tx: &watch::Sender<Vec<Task>>, docs: &[Document]) {
    let mut tasks: Vec<Task> = docs
        .iter()
        .filter_map(|doc| {
            let task = doc.to_task();
            if task.is_none() {
                tracing::debug!(id = %doc.id, "dropping document without a readable owner");
            }
            task
        })
        .collect();
    views::sort_by_due_date(&mut tasks);
    let _ = tasks_tx.send(tasks);
}
