use std::sync::Arc;

use chrono::{Duration, Utc};
use dayplan_core::app::TaskClient;
use dayplan_core::domain::{Task, UserId};
use dayplan_core::impls::{InMemoryAuth, InMemoryStore};
use dayplan_core::ports::{AuthGateway, SystemClock};
use tracing_subscriber::EnvFilter;
use ulid::Ulid;

fn print_task(task: &Task) {
    let check = if task.completed { "x" } else { " " };
    let date = task
        .due_day()
        .map(|d| d.to_string())
        .unwrap_or_else(|| "no due date".to_string());
    println!("  [{check}] {}  ({date})", task.text);
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // (A) 開発用のストアと auth gateway を用意して client を組み立てる
    let store = Arc::new(InMemoryStore::new());
    let auth = Arc::new(InMemoryAuth::new());
    let client = TaskClient::new(store.clone(), auth.clone(), Arc::new(SystemClock));
    let mut tasks_rx = client.tasks();

    // (B) サインイン（本番ではアイデンティティプロバイダから届く）
    let me = UserId::from_ulid(Ulid::new());
    auth.sign_in(me);
    println!("signed in as {me}");

    // (C) タスク投入（write-through: リストは live query 経由で追いつく）
    let now = Utc::now();
    client.add_task("water the plants", now).await.expect("add task");
    client
        .add_task("file the report", now + Duration::days(3))
        .await
        .expect("add task");

    // 過去の期日は作成時に拒否される
    if let Err(err) = client.add_task("time travel", now - Duration::days(1)).await {
        println!("Failed to add task. Please try again.");
        tracing::warn!(error = %err, "add task rejected");
    }

    // (D) 反映を待ってから各ビューを表示
    while tasks_rx.borrow_and_update().len() < 2 {
        tasks_rx.changed().await.expect("task channel closed");
    }

    println!("\nAll tasks (due date ascending):");
    for task in client.snapshot() {
        print_task(&task);
    }

    println!("\nToday:");
    let today = client.due_today();
    if today.is_empty() {
        println!("  No tasks due today.");
    } else {
        for task in &today {
            print_task(task);
        }
    }

    // 先頭のタスクを完了にする
    let first = client.snapshot().first().cloned().expect("at least one task");
    client.toggle_task(first.id).await.expect("toggle task");
    while !tasks_rx
        .borrow_and_update()
        .iter()
        .any(|t| t.id == first.id && t.completed)
    {
        tasks_rx.changed().await.expect("task channel closed");
    }

    println!("\nUpcoming (calendar):");
    for event in client.calendar() {
        let marker = if event.completed { "done" } else { "open" };
        println!("  {}  {}  [{marker}]", event.start.date_naive(), event.title);
    }

    // (E) サインアウト → リストは即座に空になる（失敗はログのみ）
    if let Err(err) = auth.sign_out().await {
        tracing::error!(error = %err, "failed to sign out");
    }
    while !tasks_rx.borrow_and_update().is_empty() {
        tasks_rx.changed().await.expect("task channel closed");
    }
    println!("\nsigned out; {} tasks visible", client.snapshot().len());
}
