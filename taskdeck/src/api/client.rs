use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::dto::{parse_raw_tasks, CreateTaskRequest, RawTask, UpdateTaskRequest};
use super::{ApiError, TaskApi};
use crate::domain::TaskId;

const TASKS_PATH: &str = "/api/tasks";

/// HTTP client for the remote task API.
#[derive(Debug, Clone)]
pub struct TasksClient {
    client: Client,
    base_url: Url,
}

impl TasksClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;

        let client = Client::builder()
            .build()
            .map_err(|source| ApiError::Transport {
                call: "build HTTP client".to_string(),
                source,
            })?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
    }

    fn task_endpoint(&self, id: &TaskId) -> Result<Url, ApiError> {
        self.endpoint(&format!(
            "{}/{}",
            TASKS_PATH,
            urlencoding::encode(id.as_str())
        ))
    }

    async fn send(
        &self,
        request: RequestBuilder,
        token: &str,
        call: &str,
    ) -> Result<Response, ApiError> {
        let response = request
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                call: call.to_string(),
                source,
            })?;

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(ApiError::Unauthorized {
                call: call.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ApiError::status(call, status.as_u16()));
        }

        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(response: Response, call: &str) -> Result<T, ApiError> {
        response.json::<T>().await.map_err(|e| ApiError::Decode {
            call: call.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl TaskApi for TasksClient {
    async fn fetch_tasks(&self, token: &str) -> Result<Vec<RawTask>, ApiError> {
        let call = "GET /api/tasks";
        let response = self
            .send(self.client.get(self.endpoint(TASKS_PATH)?), token, call)
            .await?;
        let values: Vec<serde_json::Value> = Self::read_json(response, call).await?;
        Ok(parse_raw_tasks(values))
    }

    async fn create_task(
        &self,
        token: &str,
        body: &CreateTaskRequest,
    ) -> Result<RawTask, ApiError> {
        let call = "POST /api/tasks";
        let response = self
            .send(
                self.client.post(self.endpoint(TASKS_PATH)?).json(body),
                token,
                call,
            )
            .await?;
        Self::read_json(response, call).await
    }

    async fn update_task(
        &self,
        token: &str,
        id: &TaskId,
        body: &UpdateTaskRequest,
    ) -> Result<(), ApiError> {
        let call = "PUT /api/tasks/:id";
        let response = self
            .send(
                self.client.put(self.task_endpoint(id)?).json(body),
                token,
                call,
            )
            .await?;
        let _: serde_json::Value = Self::read_json(response, call).await?;
        Ok(())
    }

    async fn delete_task(&self, token: &str, id: &TaskId) -> Result<(), ApiError> {
        let call = "DELETE /api/tasks/:id";
        let response = self
            .send(self.client.delete(self.task_endpoint(id)?), token, call)
            .await?;
        let _: serde_json::Value = Self::read_json(response, call).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Priority;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn request_complete(request: &[u8]) -> bool {
        let Some(header_end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let headers = String::from_utf8_lossy(&request[..header_end]).to_ascii_lowercase();
        let body_len = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        request.len() >= header_end + 4 + body_len
    }

    /// Accept one connection, answer with `status` and `body`, and hand back
    /// the raw request text.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request_complete(&request) {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{addr}"), handle)
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(matches!(
            TasksClient::new("not a url"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn task_endpoint_escapes_ids() {
        let client = TasksClient::new("http://localhost:3000/").unwrap();
        let url = client.task_endpoint(&TaskId::new("a b/c")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/tasks/a%20b%2Fc");
    }

    #[tokio::test]
    async fn fetch_sends_bearer_token() {
        let (url, server) = serve_once(
            "200 OK",
            r#"[{"id":"1","title":"a","priority":3,"status":false,"userId":"u1"}]"#,
        )
        .await;
        let client = TasksClient::new(&url).unwrap();

        let tasks = client.fetch_tasks("tok-123").await.unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with("GET /api/tasks HTTP/1.1"));
        assert!(request
            .to_ascii_lowercase()
            .contains("authorization: bearer tok-123"));
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "a");
    }

    #[tokio::test]
    async fn update_sends_numeric_priority() {
        let (url, server) = serve_once("200 OK", r#"{"ok":true}"#).await;
        let client = TasksClient::new(&url).unwrap();

        let body = UpdateTaskRequest {
            priority: Some(Priority::High.code()),
            ..Default::default()
        };
        client
            .update_task("tok", &TaskId::new("x"), &body)
            .await
            .unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with("PUT /api/tasks/x HTTP/1.1"));
        assert!(request.ends_with(r#"{"priority":3}"#));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (url, server) = serve_once("500 Internal Server Error", "{}").await;
        let client = TasksClient::new(&url).unwrap();

        let err = client
            .delete_task("tok", &TaskId::new("1"))
            .await
            .unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, ApiError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn unauthorized_is_reported_separately() {
        let (url, server) = serve_once("401 Unauthorized", "{}").await;
        let client = TasksClient::new(&url).unwrap();

        let err = client.fetch_tasks("expired").await.unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, ApiError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn connection_failure_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = TasksClient::new(&format!("http://{addr}")).unwrap();
        let err = client.fetch_tasks("tok").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
    }
}
