//! ApiClient - REST 契約を Transport の上に組み立てる
//!
//! | 操作 | メソッド | パス | ボディ |
//! |---|---|---|---|
//! | 一覧 | GET | `/api/{kind}/` | - |
//! | assignment 作成 | POST | `/api/assignment/` | id 無しの Assignment |
//! | assignment 更新 | PUT | `/api/assignment/{id}/` | id 付きの Assignment |
//! | assignment 削除 | DELETE | `/api/assignment/{id}/` | - |
//! | staff / task 作成 | POST | `/api/{kind}/` | Draft |
//! | staff / task 更新 | PUT | `/api/{kind}/` | id 付きのレコード |
//! | staff / task 削除 | DELETE | `/api/{kind}/` | `{id}` |
//!
//! assignment だけ item をパスで指定し、staff / task はボディの `id` で
//! 指定する。バックエンドの実装に合わせた非対称なので揃えてはいけない。

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domain::{
    Assignment, AssignmentDraft, AssignmentId, CollectionKind, Resource, StoreError,
};
use crate::ports::{ApiRequest, ApiResponse, Transport};

/// 一覧レスポンスの外側 `{data: [...]}`
#[derive(Deserialize)]
struct ListEnvelope<T> {
    data: Vec<T>,
}

pub fn assignment_path(id: AssignmentId) -> String {
    format!("{}{id}/", CollectionKind::Assignment.root_path())
}

fn encode<T: Serialize>(path: &str, value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|error| StoreError::Encode {
        path: path.to_owned(),
        message: error.to_string(),
    })
}

/// ApiClient は型付きの REST 操作を提供
///
/// 変更系の操作はステータスを解釈せず `ApiResponse` をそのまま返す。
/// 成功判定は呼び出し側の方針（assignment は確認する、削除は確認しない）に任せる。
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// 一覧を取得（2xx 以外・`data` 欠落はエラー）
    pub async fn list<T: DeserializeOwned>(
        &self,
        kind: CollectionKind,
    ) -> Result<Vec<T>, StoreError> {
        let path = kind.root_path();
        let response = self.transport.execute(ApiRequest::get(path)).await?;
        if !response.is_success() {
            return Err(StoreError::Status {
                path: path.to_owned(),
                status: response.status,
            });
        }
        serde_json::from_value::<ListEnvelope<T>>(response.body)
            .map(|envelope| envelope.data)
            .map_err(|error| StoreError::Decode {
                path: path.to_owned(),
                message: error.to_string(),
            })
    }

    pub async fn create_assignment(
        &self,
        draft: &AssignmentDraft,
    ) -> Result<ApiResponse, StoreError> {
        let path = CollectionKind::Assignment.root_path();
        let body = encode(path, draft)?;
        self.transport.execute(ApiRequest::post(path, body)).await
    }

    pub async fn update_assignment(&self, record: &Assignment) -> Result<ApiResponse, StoreError> {
        let path = assignment_path(record.id);
        let body = encode(&path, record)?;
        self.transport.execute(ApiRequest::put(path, body)).await
    }

    pub async fn delete_assignment(&self, id: AssignmentId) -> Result<ApiResponse, StoreError> {
        self.transport
            .execute(ApiRequest::delete(assignment_path(id), None))
            .await
    }

    /// staff / task の作成
    pub async fn create<R: Resource>(&self, draft: &R::Draft) -> Result<ApiResponse, StoreError> {
        let path = R::COLLECTION.root_path();
        let body = encode(path, draft)?;
        self.transport.execute(ApiRequest::post(path, body)).await
    }

    /// staff / task の更新（ルートに id 入りの全フィールド）
    pub async fn update<R: Resource>(&self, record: &R) -> Result<ApiResponse, StoreError> {
        let path = R::COLLECTION.root_path();
        let body = encode(path, record)?;
        self.transport.execute(ApiRequest::put(path, body)).await
    }

    /// staff / task の削除（ルートにボディ `{id}`）
    pub async fn delete<R: Resource>(&self, id: R::Id) -> Result<ApiResponse, StoreError> {
        let path = R::COLLECTION.root_path();
        let body = json!({ "id": encode(path, &id)? });
        self.transport
            .execute(ApiRequest::delete(path, Some(body)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Staff, StaffId, Task};
    use crate::impls::InMemoryBackend;
    use crate::ports::Method;
    use async_trait::async_trait;

    /// 固定のレスポンスを返す Transport
    struct Canned(ApiResponse);

    #[async_trait]
    impl Transport for Canned {
        async fn execute(&self, _request: ApiRequest) -> Result<ApiResponse, StoreError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn assignment_item_path() {
        assert_eq!(assignment_path(AssignmentId::new(5)), "/api/assignment/5/");
    }

    #[tokio::test]
    async fn list_rejects_non_success_status() {
        let client = ApiClient::new(Arc::new(Canned(ApiResponse::new(500, Value::Null))));
        let err = client.list::<Staff>(CollectionKind::Staff).await.unwrap_err();
        assert!(matches!(err, StoreError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn list_rejects_missing_data_key() {
        let body = json!({ "error": "Method not allowed" });
        let client = ApiClient::new(Arc::new(Canned(ApiResponse::new(200, body))));
        let err = client.list::<Task>(CollectionKind::Task).await.unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
    }

    #[tokio::test]
    async fn staff_mutations_address_the_collection_root() {
        let backend = Arc::new(InMemoryBackend::new());
        let ana = backend.seed_staff("Ana", "Analyst").await;
        let client = ApiClient::new(backend.clone());

        let mut staff = client.list::<Staff>(CollectionKind::Staff).await.unwrap();
        staff[0].role = "Lead".into();
        client.update(&staff[0]).await.unwrap();
        client.delete::<Staff>(ana).await.unwrap();

        let requests = backend.requests().await;
        let put = &requests[1];
        assert_eq!((put.method, put.path.as_str()), (Method::Put, "/api/staff/"));
        assert_eq!(put.body.as_ref().unwrap()["role"], json!("Lead"));

        let delete = &requests[2];
        assert_eq!((delete.method, delete.path.as_str()), (Method::Delete, "/api/staff/"));
        assert_eq!(delete.body, Some(json!({ "id": 1 })));
        assert_eq!(ana, StaffId::new(1));
    }

    #[tokio::test]
    async fn assignment_delete_addresses_the_item_without_body() {
        let backend = Arc::new(InMemoryBackend::new());
        let client = ApiClient::new(backend.clone());

        client.delete_assignment(AssignmentId::new(9)).await.unwrap();

        let requests = backend.requests().await;
        assert_eq!(requests[0].path, "/api/assignment/9/");
        assert_eq!(requests[0].body, None);
    }
}
