use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum APIErrorVariant {
    Network,
    MalformedResponse,
    BadClientData,
    Unauthorized,
    NotFound,
    Conflict,
    InternalError,
    UnexpectedStatusCode,
}

#[derive(Debug)]
pub struct APIError {
    pub variant: APIErrorVariant,
    pub message: String,
}

pub type APIResponse<T> = Result<T, APIError>;

pub(crate) struct BaseClient {
    client: Client,
    address: String,
    api_key: Option<String>,
}

impl BaseClient {
    pub fn new(address: String) -> Self {
        Self {
            client: Client::new(),
            address,
            api_key: None,
        }
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.address, path)
    }

    async fn request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: String,
        body: Option<B>,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let mut req = self.client.request(method, &self.url(&path));
        if let Some(api_key) = &self.api_key {
            req = req.header("x-api-key", api_key);
        }
        if let Some(body) = &body {
            req = req.json(body);
        }

        let res = req.send().await.map_err(|e| APIError {
            variant: APIErrorVariant::Network,
            message: e.to_string(),
        })?;

        let status = res.status();
        if status != expected_status_code {
            let variant = match status {
                StatusCode::BAD_REQUEST => APIErrorVariant::BadClientData,
                StatusCode::UNAUTHORIZED => APIErrorVariant::Unauthorized,
                StatusCode::NOT_FOUND => APIErrorVariant::NotFound,
                StatusCode::CONFLICT => APIErrorVariant::Conflict,
                StatusCode::INTERNAL_SERVER_ERROR => APIErrorVariant::InternalError,
                _ => APIErrorVariant::UnexpectedStatusCode,
            };
            let message = res.text().await.unwrap_or_default();
            return Err(APIError { variant, message });
        }

        res.json::<T>().await.map_err(|e| APIError {
            variant: APIErrorVariant::MalformedResponse,
            message: e.to_string(),
        })
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: String,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        self.request::<T, ()>(Method::GET, path, None, expected_status_code)
            .await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        body: B,
        path: String,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        self.request(Method::POST, path, Some(body), expected_status_code)
            .await
    }
}
