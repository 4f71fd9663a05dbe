//! `reqwest`-backed [`ContentApi`] implementation against a repository's REST
//! search surface.
//!
//! [`connect`] resolves the repository metadata at the endpoint root, pins
//! the master ref, and returns a handle. Queries hit
//! `{endpoint}/documents/search`; preview resolution queries against the
//! preview token as ref. No retries, no timeouts beyond the client defaults.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::api::{ContentApi, Document, QueryOptions, QueryResponse};
use crate::error::ApiError;
use crate::predicate::Predicate;

/// Transport-level context attached to every request, e.g. cookies or tenant
/// headers for server-side credential scoping.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub headers: HeaderMap,
}

/// Options for [`connect`].
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    pub access_token: String,
    pub request_context: Option<RequestContext>,
}

#[derive(Debug, Deserialize)]
struct RepositoryInfo {
    refs: Vec<RepositoryRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(default)]
    is_master_ref: bool,
}

/// Connected handle against one repository endpoint.
#[derive(Debug)]
pub struct RestApi {
    client: Client,
    endpoint: String,
    access_token: String,
    master_ref: String,
    context_headers: HeaderMap,
}

/// Resolve the repository metadata at `endpoint` and return a handle pinned
/// to the master ref.
pub async fn connect(endpoint: &str, options: ConnectOptions) -> Result<RestApi, ApiError> {
    let endpoint = endpoint.trim_end_matches('/').to_string(); // avoid "//"
    let client = Client::new();
    let context_headers = options
        .request_context
        .map(|ctx| ctx.headers)
        .unwrap_or_default();

    debug!(endpoint = %endpoint, "resolving repository metadata");
    let response = client
        .get(&endpoint)
        .headers(context_headers.clone())
        .query(&[("access_token", options.access_token.as_str())])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<unreadable body>"));
        return Err(format!("repository metadata request failed ({status}): {body}").into());
    }

    let info: RepositoryInfo = response.json().await?;
    let master_ref = info
        .refs
        .iter()
        .find(|r| r.is_master_ref)
        .or_else(|| info.refs.first())
        .map(|r| r.reference.clone())
        .ok_or("repository metadata contains no refs")?;

    debug!(master_ref = %master_ref, "connected to repository");
    Ok(RestApi {
        client,
        endpoint,
        access_token: options.access_token,
        master_ref,
        context_headers,
    })
}

impl RestApi {
    /// Run one search request against the given ref.
    async fn search(
        &self,
        reference: &str,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<QueryResponse, ApiError> {
        let mut params: Vec<(&str, String)> = vec![
            ("ref", reference.to_string()),
            ("access_token", self.access_token.clone()),
        ];
        if !predicates.is_empty() {
            let rendered: String = predicates.iter().map(Predicate::render).collect();
            params.push(("q", format!("[{rendered}]")));
        }
        if let Some(lang) = &options.lang {
            params.push(("lang", lang.clone()));
        }
        if let Some(page) = options.page {
            params.push(("page", page.to_string()));
        }
        if let Some(page_size) = options.page_size {
            params.push(("pageSize", page_size.to_string()));
        }
        if let Some(orderings) = &options.orderings {
            params.push(("orderings", orderings.clone()));
        }

        let url = format!("{}/documents/search", self.endpoint);
        debug!(url = %url, reference = %reference, predicates = predicates.len(), "searching documents");
        let response = self
            .client
            .get(&url)
            .headers(self.context_headers.clone())
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<unreadable body>"));
            return Err(format!("search request failed ({status}): {body}").into());
        }

        Ok(response.json::<QueryResponse>().await?)
    }
}

#[async_trait]
impl ContentApi for RestApi {
    async fn query<'a>(
        &self,
        predicates: &'a [Predicate],
        options: QueryOptions,
    ) -> Result<QueryResponse, ApiError> {
        self.search(&self.master_ref, predicates, &options).await
    }

    async fn preview_doc<'a>(
        &self,
        token: &'a str,
        document_id: Option<&'a str>,
    ) -> Result<Option<Document>, ApiError> {
        let predicates = match document_id {
            Some(id) => vec![Predicate::at("document.id", id)],
            None => Vec::new(),
        };
        let options = QueryOptions {
            page_size: Some(1),
            ..QueryOptions::default()
        };
        // The preview token acts as the ref to query against.
        let mut response = self.search(token, &predicates, &options).await?;
        if response.results.is_empty() {
            Ok(None)
        } else {
            Ok(Some(response.results.remove(0)))
        }
    }
}
