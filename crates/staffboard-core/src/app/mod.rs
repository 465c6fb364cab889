//! App - アプリケーション層
//!
//! ports を組み合わせてクライアント側のロジックを実装する。
//!
//! # 主要コンポーネント
//! - **ApiClient**: REST 契約（パス・メソッド・ボディ）
//! - **CollectionCache**: staff / task / assignment のミラー
//! - **RelationResolver**: 表示用の行と選択肢
//! - **AssignmentWorkflow**: assignment の add / edit / delete
//! - **RecordPanel**: staff / task の add / edit / delete
//! - **ClientShell**: 上記を束ね、Signal でリフレッシュする

pub mod api;
pub mod cache;
pub mod panel;
pub mod resolver;
pub mod shell;
pub mod workflow;

// 主要な型を再エクスポート
pub use self::api::ApiClient;
pub use self::cache::CollectionCache;
pub use self::panel::{RecordPanel, StaffPanel, TaskPanel};
pub use self::resolver::{AssignmentRow, Choice, RelationResolver};
pub use self::shell::{ClientShell, SignalListener};
pub use self::workflow::{AssignmentWorkflow, Submitted};
