//! Resource trait - レコード型とコレクションの対応付け
//!
//! associated const でエンドポイントを型に結び付け、
//! `ApiClient` / `RecordPanel` をジェネリックに書けるようにする。

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;

use super::collection::CollectionKind;

/// Resource はサーバ側コレクションの 1 レコード
///
/// # Trait Bounds
/// - `DeserializeOwned`: `{data: [...]}` からの復元
/// - `Serialize`: update 時に全フィールドを送るため
/// - `Clone`: copy-on-edit のため
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    type Id: Copy + PartialEq + Display + Serialize + Send + Sync;
    type Draft: Draft + Serialize + Default + Clone + Send + Sync;

    /// このレコードが属するコレクション
    const COLLECTION: CollectionKind;

    fn id(&self) -> Self::Id;

    /// 選択肢に表示するラベル（name / title）
    fn label(&self) -> &str;
}

/// Draft は add フォームのバッファ
pub trait Draft {
    /// 必須フィールドのうち最初に欠けているもの
    fn missing_field(&self) -> Option<&'static str>;
}
