//! dayplan-core
//!
//! シングルユーザー向けタスクトラッカーのコア。永続化とリアルタイム同期は
//! 外部のマネージドバックエンド（live query 付きドキュメント DB）と
//! アイデンティティプロバイダに委ね、このクレートはその境界と
//! view model の導出だけを実装します。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, task, errors）
//! - **ports**: 抽象化レイヤー（DocumentStore, AuthGateway, Clock, IdGenerator）
//! - **app**: アプリケーションロジック（TaskClient, views）
//! - **impls**: 実装（InMemoryStore / InMemoryAuth、開発・テスト用）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
