use anyhow::Result;
use async_trait::async_trait;
use futures::{future, StreamExt};
use playwright::api::{
    page::{Event, Page},
    response::Response,
};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Same-origin `fetch` from inside the page, so requests carry the page's
/// cookies exactly like the app's own calls would.
#[async_trait]
pub trait PageFetchExt {
    async fn fetch<S: Serialize + Send>(
        &self,
        method: Method,
        url: &str,
        body: Option<S>,
    ) -> Result<Response>;

    async fn get(&self, url: &str) -> Result<Response> {
        self.fetch::<()>(Method::GET, url, None).await
    }

    async fn post<S: Serialize + Send>(&self, url: &str, body: S) -> Result<Response> {
        self.fetch(Method::POST, url, Some(body)).await
    }

    async fn post_empty(&self, url: &str) -> Result<Response> {
        self.fetch::<()>(Method::POST, url, None).await
    }

    async fn put<S: Serialize + Send>(&self, url: &str, body: S) -> Result<Response> {
        self.fetch(Method::PUT, url, Some(body)).await
    }

    async fn delete(&self, url: &str) -> Result<Response> {
        self.fetch::<()>(Method::DELETE, url, None).await
    }
}

const FETCH_ID_HEADER: &str = "x-e2e-fetch-id";

/// The argument handed to the page-side `fetch`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FetchRequest<'a, S> {
    method: Method,
    url: &'a str,
    body: Option<S>,
    fetch_id: u32,
}

/// The id a request sent through [`PageFetchExt::fetch`] was tagged with.
fn tagged_fetch_id(response: &Response) -> Option<u32> {
    let headers = response.request().headers().ok()?;
    headers.get(FETCH_ID_HEADER)?.parse().ok()
}

#[async_trait]
impl PageFetchExt for Page {
    async fn fetch<S: Serialize + Send>(
        &self,
        method: Method,
        url: &str,
        body: Option<S>,
    ) -> Result<Response> {
        let id = self
            .eval::<u32>("() => window.e2eFetchId = (window.e2eFetchId ?? 0) + 1")
            .await?;

        // Subscribed before the request is sent.
        let mut responses = Box::pin(self.subscribe_event()?.filter_map(move |event| {
            future::ready(match event {
                Ok(Event::Response(response)) if tagged_fetch_id(&response) == Some(id) => {
                    Some(Ok(response))
                }
                Ok(_) => None,
                Err(err) => Some(Err(err)),
            })
        }));

        let request = FetchRequest {
            method,
            url,
            body,
            fetch_id: id,
        };
        self.evaluate::<_, ()>(
            r#"({ method, url, body, fetchId }) => {
            const headers = { "x-e2e-fetch-id": String(fetchId), "Content-Type": "application/json" };
            fetch(url, { method, headers, body: body === null ? null : JSON.stringify(body) });
        }"#,
            request,
        )
        .await?;

        match responses.next().await {
            Some(response) => Ok(response?),
            None => Err(NoResponse(url.to_string()).into()),
        }
    }
}

#[async_trait]
pub trait ResponseJsonExt {
    async fn parse_json<T: DeserializeOwned>(&self) -> Result<T>;
}

#[async_trait]
impl ResponseJsonExt for Response {
    async fn parse_json<T: DeserializeOwned>(&self) -> Result<T> {
        let text = self.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[derive(Debug, Copy, Clone, Serialize)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
}

#[derive(Debug, Error)]
#[error("No response to {0}")]
struct NoResponse(String);
