use crate::sync::ConnectionId;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use studio_booking_api_structs::CONNECTION_ID_HEADER;

pub(crate) struct BaseClient {
    address: String,
    connection_id: ConnectionId,
    client: Client,
}

#[derive(Debug)]
pub enum APIError {
    Network,
    MalformedResponse,
    BadClientData,
    NotFound,
    Conflict,
    UnexpectedStatusCode(StatusCode),
}
pub type APIResponse<T> = Result<T, APIError>;

impl BaseClient {
    pub fn new(address: String, connection_id: ConnectionId) -> Self {
        Self {
            address,
            connection_id,
            client: Client::new(),
        }
    }

    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }

    fn get_client(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/api/v1/{}", self.address, path);
        self.client
            .request(method, url)
            .header(CONNECTION_ID_HEADER, self.connection_id.as_str())
    }

    fn check_status_code(res: &Response, expected_status_code: StatusCode) -> Result<(), APIError> {
        let status = res.status();
        if status == expected_status_code {
            return Ok(());
        }
        match status {
            StatusCode::BAD_REQUEST => Err(APIError::BadClientData),
            StatusCode::NOT_FOUND => Err(APIError::NotFound),
            StatusCode::CONFLICT => Err(APIError::Conflict),
            _ => Err(APIError::UnexpectedStatusCode(status)),
        }
    }

    async fn handle_api_response<T: for<'de> Deserialize<'de>>(
        &self,
        res: Result<Response, reqwest::Error>,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let res = res.map_err(|_| APIError::Network)?;
        Self::check_status_code(&res, expected_status_code)?;
        res.json::<T>()
            .await
            .map_err(|_| APIError::MalformedResponse)
    }

    pub async fn get<T: for<'de> Deserialize<'de>, Q: Serialize>(
        &self,
        path: &str,
        query: &Q,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let res = self.get_client(Method::GET, path).query(query).send().await;
        self.handle_api_response(res, expected_status_code).await
    }

    pub async fn delete<T: for<'de> Deserialize<'de>, Q: Serialize>(
        &self,
        path: &str,
        query: &Q,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let res = self
            .get_client(Method::DELETE, path)
            .query(query)
            .send()
            .await;
        self.handle_api_response(res, expected_status_code).await
    }

    pub async fn put<T: for<'de> Deserialize<'de>, S: Serialize>(
        &self,
        body: S,
        path: &str,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let res = self.get_client(Method::PUT, path).json(&body).send().await;
        self.handle_api_response(res, expected_status_code).await
    }

    pub async fn post<T: for<'de> Deserialize<'de>, S: Serialize>(
        &self,
        body: S,
        path: &str,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let res = self.get_client(Method::POST, path).json(&body).send().await;
        self.handle_api_response(res, expected_status_code).await
    }

    /// Opens a long lived response whose body is consumed as a stream
    pub async fn open_stream(&self, path: &str) -> APIResponse<Response> {
        let res = self
            .get_client(Method::GET, path)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|_| APIError::Network)?;
        Self::check_status_code(&res, StatusCode::OK)?;
        Ok(res)
    }
}
