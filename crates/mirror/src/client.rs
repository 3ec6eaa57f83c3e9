use reqwest::{Response, Url};
use serde::Deserialize;

use crate::{
    LedgerMirror, MirrorEntry, MirrorError, MirrorHealth, MirrorSummary, NewMirrorEntry,
    ResultMirror,
};

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// HTTP implementation of [`LedgerMirror`].
///
/// No retry and no timeout policy beyond the transport defaults; a failed
/// call is reported once and the caller decides what it means.
#[derive(Debug, Clone)]
pub struct MirrorClient {
    base_url: Url,
    http: reqwest::Client,
}

impl MirrorClient {
    pub fn new(base_url: &str) -> ResultMirror<Self> {
        // A base without a trailing slash would swallow the last path
        // segment on join.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|err| MirrorError::InvalidBaseUrl(err.to_string()))?;
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, path: &str) -> ResultMirror<Url> {
        self.base_url
            .join(path)
            .map_err(|err| MirrorError::InvalidBaseUrl(err.to_string()))
    }

    async fn error_for(res: Response) -> MirrorError {
        let status = res.status();
        let body = res
            .json::<ErrorResponse>()
            .await
            .map(|err| err.error)
            .unwrap_or_else(|_| "unknown error".to_string());

        match status.as_u16() {
            404 => MirrorError::NotFound,
            400 | 422 => MirrorError::Validation(body),
            _ => MirrorError::Server(body),
        }
    }
}

#[async_trait::async_trait]
impl LedgerMirror for MirrorClient {
    async fn health(&self) -> ResultMirror<MirrorHealth> {
        let res = self.http.get(self.endpoint("api/health")?).send().await?;
        if res.status().is_success() {
            return res.json::<MirrorHealth>().await.map_err(Into::into);
        }
        Err(Self::error_for(res).await)
    }

    async fn list(&self) -> ResultMirror<Vec<MirrorEntry>> {
        let res = self
            .http
            .get(self.endpoint("api/transactions")?)
            .send()
            .await?;
        if res.status().is_success() {
            return res.json::<Vec<MirrorEntry>>().await.map_err(Into::into);
        }
        Err(Self::error_for(res).await)
    }

    async fn list_for_sme(&self, sme_id: &str) -> ResultMirror<Vec<MirrorEntry>> {
        let res = self
            .http
            .get(self.endpoint(&format!("api/transactions/sme/{sme_id}"))?)
            .send()
            .await?;
        if res.status().is_success() {
            return res.json::<Vec<MirrorEntry>>().await.map_err(Into::into);
        }
        Err(Self::error_for(res).await)
    }

    async fn create(&self, entry: &NewMirrorEntry) -> ResultMirror<MirrorEntry> {
        let res = self
            .http
            .post(self.endpoint("api/transactions")?)
            .json(entry)
            .send()
            .await?;
        if res.status().is_success() {
            return res.json::<MirrorEntry>().await.map_err(Into::into);
        }
        Err(Self::error_for(res).await)
    }

    async fn delete(&self, id: &str) -> ResultMirror<()> {
        let res = self
            .http
            .delete(self.endpoint(&format!("api/transactions/{id}"))?)
            .send()
            .await?;
        if res.status().is_success() {
            return Ok(());
        }
        Err(Self::error_for(res).await)
    }

    async fn summary(&self, sme_id: &str) -> ResultMirror<MirrorSummary> {
        let res = self
            .http
            .get(self.endpoint(&format!("api/summary/{sme_id}"))?)
            .send()
            .await?;
        if res.status().is_success() {
            return res.json::<MirrorSummary>().await.map_err(Into::into);
        }
        Err(Self::error_for(res).await)
    }
}
