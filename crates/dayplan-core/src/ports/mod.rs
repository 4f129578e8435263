//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（ドキュメントストア、アイデンティティプロバイダ）への
//! インターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - ドキュメントストアが task の正本（source of truth）
//! - コアは「最新スナップショットを信じる」だけで、キャッシュ整合性を持たない
//! - 時刻と ID 生成も trait にして、テストで差し替え可能にする

pub mod auth;
pub mod clock;
pub mod document_store;
pub mod id_generator;

// 主要な trait を再エクスポート
pub use self::auth::{AuthError, AuthGateway};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::document_store::{Document, DocumentStore, StoreError};
pub use self::id_generator::{IdGenerator, UlidGenerator};
