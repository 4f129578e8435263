//! Impls - ポートの実装（開発・テスト用）
//!
//! 本番ではマネージドバックエンドの SDK を包む実装に差し替わります。

pub mod inmem_auth;
pub mod inmem_store;

pub use self::inmem_auth::InMemoryAuth;
pub use self::inmem_store::InMemoryStore;
