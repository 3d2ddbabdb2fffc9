//! Typed HTTP verbs

use super::types::ApiClient;
use crate::api::RequestDescriptor;
use crate::error::{ApiError, ApiErrorKind};
use serde::Serialize;
use serde::de::DeserializeOwned;

impl ApiClient {
    /// `GET path?params`, skipping parameters with empty values
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let request = RequestDescriptor::get(path).with_params(params.iter().copied());
        self.send(request).await
    }

    /// `POST path` with a JSON body
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = RequestDescriptor::post(path)
            .with_json(body)
            .map_err(encode_error)?;
        self.send(request).await
    }

    /// `PUT path` with a JSON body
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = RequestDescriptor::put(path)
            .with_json(body)
            .map_err(encode_error)?;
        self.send(request).await
    }

    /// `DELETE path`
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(RequestDescriptor::delete(path)).await
    }

    /// Execute an arbitrary descriptor and decode the JSON response.
    ///
    /// An empty success body decodes as JSON `null`, so `()` and
    /// `Option<T>` work for endpoints that return nothing.
    pub async fn send<T: DeserializeOwned>(&self, request: RequestDescriptor) -> Result<T, ApiError> {
        let body = self.execute(request.clone()).await?;
        decode(&body).map_err(|failure| self.report_failure(&request, failure))
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let result = if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(serde_json::Value::Null)
    } else {
        serde_json::from_slice(body)
    };
    result.map_err(|e| {
        ApiError::new(ApiErrorKind::Unknown).with_message(format!("Invalid response body: {}", e))
    })
}

fn encode_error(error: serde_json::Error) -> ApiError {
    ApiError::new(ApiErrorKind::Unknown).with_message(format!("Invalid request body: {}", error))
}
