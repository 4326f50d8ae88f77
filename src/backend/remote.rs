//! HTTP client for the hosted backend-as-a-service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{
    Account, AccountService, Collection, Document, DocumentList, DocumentStore, ObjectStorage,
    Query, StoredObject,
};
use crate::config::BackendConfig;
use crate::{DriveError, Result};

/// User agent sent with every request.
const USER_AGENT: &str = concat!("cloudrive/", env!("CARGO_PKG_VERSION"));

/// Limit appended to list requests that carry none; the backend's own default is small.
const DEFAULT_LIST_LIMIT: usize = 5000;

const PROJECT_HEADER: &str = "X-Appwrite-Project";
const KEY_HEADER: &str = "X-Appwrite-Key";
const SESSION_HEADER: &str = "X-Appwrite-Session";

/// Error body returned by the backend.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Backend reached over its REST API.
pub struct RemoteBackend {
    client: Client,
    endpoint: String,
    api_key: String,
    database_id: String,
    files_collection_id: String,
    folders_collection_id: String,
    users_collection_id: String,
    bucket_id: String,
}

impl RemoteBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            PROJECT_HEADER,
            HeaderValue::from_str(&config.project_id)
                .map_err(|e| DriveError::Config(format!("invalid project id: {e}")))?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| DriveError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            database_id: config.database_id.clone(),
            files_collection_id: config.files_collection_id.clone(),
            folders_collection_id: config.folders_collection_id.clone(),
            users_collection_id: config.users_collection_id.clone(),
            bucket_id: config.bucket_id.clone(),
        })
    }

    fn collection_id(&self, collection: Collection) -> &str {
        match collection {
            Collection::Files => &self.files_collection_id,
            Collection::Folders => &self.folders_collection_id,
            Collection::Users => &self.users_collection_id,
        }
    }

    fn documents_url(&self, collection: Collection) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.endpoint,
            urlencoding::encode(&self.database_id),
            urlencoding::encode(self.collection_id(collection))
        )
    }

    fn document_url(&self, collection: Collection, id: &str) -> String {
        format!(
            "{}/{}",
            self.documents_url(collection),
            urlencoding::encode(id)
        )
    }

    fn files_url(&self) -> String {
        format!(
            "{}/storage/buckets/{}/files",
            self.endpoint,
            urlencoding::encode(&self.bucket_id)
        )
    }

    /// Attach the server API key.
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(KEY_HEADER, &self.api_key)
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Backend request failed");
            DriveError::Backend(format!("request failed: {e}"))
        })?;
        check_status(response, what).await
    }

    async fn parse_document(response: Response) -> Result<Document> {
        let document: Document = response.json().await?;
        Ok(document.strip_system_fields())
    }
}

/// Map a non-2xx response to a `DriveError`.
async fn check_status(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status.to_string(),
    };
    tracing::debug!(status = %status, message = %message, "Backend returned an error");

    Err(match status {
        StatusCode::NOT_FOUND => DriveError::NotFound(what.to_string()),
        StatusCode::UNAUTHORIZED => DriveError::Auth(message),
        StatusCode::FORBIDDEN => DriveError::Permission(message),
        _ => DriveError::Backend(format!("{status}: {message}")),
    })
}

/// Encode queries as repeated `queries[]` parameters.
fn query_params(queries: &[Query]) -> Vec<(&'static str, String)> {
    let mut params: Vec<_> = queries
        .iter()
        .map(|q| ("queries[]", q.to_query_string()))
        .collect();
    if !queries.iter().any(|q| matches!(q, Query::Limit(_))) {
        params.push(("queries[]", Query::limit(DEFAULT_LIST_LIMIT).to_query_string()));
    }
    params
}

#[async_trait]
impl DocumentStore for RemoteBackend {
    async fn create_document(
        &self,
        collection: Collection,
        data: Map<String, Value>,
    ) -> Result<Document> {
        let request = self
            .authorized(self.client.post(self.documents_url(collection)))
            .json(&json!({ "documentId": "unique()", "data": data }));
        let response = self.send(request, collection.label()).await?;
        Self::parse_document(response).await
    }

    async fn get_document(&self, collection: Collection, id: &str) -> Result<Document> {
        let request = self.authorized(self.client.get(self.document_url(collection, id)));
        let response = self.send(request, collection.label()).await?;
        Self::parse_document(response).await
    }

    async fn list_documents(
        &self,
        collection: Collection,
        queries: &[Query],
    ) -> Result<DocumentList> {
        let request = self
            .authorized(self.client.get(self.documents_url(collection)))
            .query(&query_params(queries));
        let response = self.send(request, collection.label()).await?;

        let mut list: DocumentList = response.json().await?;
        list.documents = list
            .documents
            .into_iter()
            .map(Document::strip_system_fields)
            .collect();
        Ok(list)
    }

    async fn update_document(
        &self,
        collection: Collection,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<Document> {
        let request = self
            .authorized(self.client.patch(self.document_url(collection, id)))
            .json(&json!({ "data": patch }));
        let response = self.send(request, collection.label()).await?;
        Self::parse_document(response).await
    }

    async fn delete_document(&self, collection: Collection, id: &str) -> Result<()> {
        let request = self.authorized(self.client.delete(self.document_url(collection, id)));
        self.send(request, collection.label()).await?;
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for RemoteBackend {
    async fn create_object(
        &self,
        name: &str,
        content_type: &str,
        content: Vec<u8>,
    ) -> Result<StoredObject> {
        let part = Part::bytes(content)
            .file_name(name.to_string())
            .mime_str(content_type)?;
        let form = Form::new().text("fileId", "unique()").part("file", part);

        let request = self
            .authorized(self.client.post(self.files_url()))
            .multipart(form);
        let response = self.send(request, "bucket").await?;
        Ok(response.json().await?)
    }

    async fn delete_object(&self, id: &str) -> Result<()> {
        let url = format!("{}/{}", self.files_url(), urlencoding::encode(id));
        let request = self.authorized(self.client.delete(url));
        self.send(request, "stored object").await?;
        Ok(())
    }
}

#[async_trait]
impl AccountService for RemoteBackend {
    async fn get_account(&self, session: &str) -> Result<Account> {
        let request = self
            .client
            .get(format!("{}/account", self.endpoint))
            .header(SESSION_HEADER, session);

        match self.send(request, "account").await {
            Ok(response) => Ok(response.json().await?),
            Err(DriveError::NotFound(_)) | Err(DriveError::Permission(_)) => {
                Err(DriveError::Auth("invalid session".to_string()))
            }
            Err(e) => Err(e),
        }
    }
}
