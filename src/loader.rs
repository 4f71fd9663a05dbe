//! The loader: connect once, then fetch, flatten and sanitize documents.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use futures::future::try_join_all;
use serde_json::Value;
use tracing::warn;

use crate::api::{ContentApi, Document, QueryOptions};
use crate::config::{LinkResolver, LoaderConfig};
use crate::error::Error;
use crate::predicate::Predicate;
use crate::rest::{self, ConnectOptions, RequestContext};

/// One fetched page together with the totals the service reported.
#[derive(Debug, Clone)]
pub struct Page {
    pub documents: Vec<Document>,
    pub total_documents: u64,
    pub total_pages: u32,
}

/// Options for [`Loader::fetch_all`].
#[derive(Debug, Clone)]
pub struct FetchAllOptions {
    /// Language to query; `*` matches every language.
    pub lang: String,
    /// Number of documents to fetch per page.
    pub page_size: u32,
}

impl Default for FetchAllOptions {
    fn default() -> Self {
        Self {
            lang: "*".to_string(),
            page_size: 100,
        }
    }
}

/// Convenience loader around a connected content-repository API handle.
///
/// Construct with a validated [`LoaderConfig`], then call
/// [`connect`](Self::connect) before any fetch method. The handle lives for
/// the lifetime of the loader; there is no explicit teardown.
pub struct Loader {
    config: LoaderConfig,
    api: Option<Arc<dyn ContentApi>>,
}

impl Loader {
    /// Validates the configuration and returns a loader that still needs
    /// [`connect`](Self::connect) before fetching.
    pub fn new(config: LoaderConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self { config, api: None })
    }

    /// Establish the API handle against the configured endpoint, optionally
    /// threading a transport-level request context through every call.
    /// Replaces any previously connected handle.
    pub async fn connect(&mut self, request_context: Option<RequestContext>) -> Result<(), Error> {
        let options = ConnectOptions {
            access_token: self.config.access_token.clone(),
            request_context,
        };
        let api = rest::connect(&self.config.api_endpoint, options).await?;
        self.api = Some(Arc::new(api));
        Ok(())
    }

    /// Install an externally constructed API handle (alternative transports,
    /// tests).
    pub fn attach(&mut self, api: Arc<dyn ContentApi>) {
        self.api = Some(api);
    }

    fn api(&self) -> Result<&Arc<dyn ContentApi>, Error> {
        self.api.as_ref().ok_or(Error::NotConnected)
    }

    /// Fetch a single page of a predicate query. Remote failures are logged
    /// once on the error channel and re-raised; no retry.
    pub async fn fetch_page(
        &self,
        predicates: &[Predicate],
        page: u32,
        page_size: u32,
        options: QueryOptions,
    ) -> Result<Page, Error> {
        let api = self.api()?;
        let options = QueryOptions {
            page: Some(page),
            page_size: Some(page_size),
            ..options
        };
        match api.query(predicates, options).await {
            Ok(response) => Ok(Page {
                documents: response.results,
                total_documents: response.total_results_size,
                total_pages: response.total_pages,
            }),
            Err(error) => {
                self.config.logger.error("Loader.fetch_page error", &error);
                Err(Error::Api(error))
            }
        }
    }

    /// Fetch every document in the repository: page 1 first to learn the
    /// page count, then all remaining pages concurrently. Assembly is in
    /// page-number order regardless of completion timing; a single page
    /// failure fails the whole batch.
    pub async fn fetch_all(&self, options: FetchAllOptions) -> Result<Vec<Document>, Error> {
        let query_options = QueryOptions {
            lang: Some(options.lang.clone()),
            ..QueryOptions::default()
        };

        let first = self
            .fetch_page(&[], 1, options.page_size, query_options.clone())
            .await?;
        self.config.logger.log(&format!(
            "{} documents exist across {} pages of size {}",
            first.total_documents, first.total_pages, options.page_size
        ));

        if first.total_pages == 0 {
            return Ok(Vec::new());
        }
        if first.total_pages <= 1 {
            return Ok(first.documents);
        }

        let remaining = (2..=first.total_pages).map(|page| {
            let query_options = query_options.clone();
            async move {
                self.fetch_page(&[], page, options.page_size, query_options)
                    .await
                    .map(|fetched| fetched.documents)
            }
        });
        let additional = try_join_all(remaining).await?;

        let mut documents = first.documents;
        documents.extend(additional.into_iter().flatten());
        Ok(documents)
    }

    /// Fetch documents matching one equality predicate per query entry, all
    /// forwarded in a single combined query. Every returned document is
    /// sanitized with [`escape_doc`].
    pub async fn fetch(
        &self,
        query: &BTreeMap<String, Value>,
        options: QueryOptions,
    ) -> Result<Vec<Document>, Error> {
        let api = self.api()?;
        let predicates: Vec<Predicate> = query
            .iter()
            .map(|(field, value)| Predicate::at(field.clone(), value.clone()))
            .collect();

        match api.query(&predicates, options).await {
            Ok(response) => Ok(response.results.iter().map(escape_doc).collect()),
            Err(error) => {
                self.config.logger.error("Loader.fetch error", &error);
                Err(Error::Api(error))
            }
        }
    }

    /// [`fetch_all`](Self::fetch_all), indexed by document id as sanitized
    /// documents. Later duplicates overwrite earlier ones.
    pub async fn fetch_all_as_indexed(
        &self,
        options: FetchAllOptions,
    ) -> Result<HashMap<String, Document>, Error> {
        let documents = self.fetch_all(options).await?;
        Ok(index_by_id(documents.iter().map(escape_doc)))
    }

    /// [`fetch`](Self::fetch), indexed by document id.
    pub async fn fetch_as_indexed(
        &self,
        query: &BTreeMap<String, Value>,
        options: QueryOptions,
    ) -> Result<HashMap<String, Document>, Error> {
        let documents = self.fetch(query, options).await?;
        Ok(index_by_id(documents.into_iter()))
    }

    /// Resolve a preview token to a destination path via the configured link
    /// resolver (or the given override). Returns `/` when the token does not
    /// lead to anything routable.
    pub async fn get_preview_resolver(
        &self,
        token: &str,
        document_id: Option<&str>,
        link_resolver: Option<&LinkResolver>,
    ) -> Result<String, Error> {
        let api = self.api()?;
        let resolver = link_resolver.unwrap_or(&self.config.link_resolver);
        match api.preview_doc(token, document_id).await {
            Ok(Some(doc)) => {
                let path = resolver(&doc);
                if path.is_empty() {
                    Ok("/".to_string())
                } else {
                    Ok(path)
                }
            }
            Ok(None) => Ok("/".to_string()),
            Err(error) => {
                self.config
                    .logger
                    .error("Loader.get_preview_resolver error", &error);
                Err(Error::Api(error))
            }
        }
    }
}

/// Replace every U+2028 line separator in any string value with the literal
/// two-character text `\n`, making the payload safe to embed in generated
/// script contexts. Runs over the serialized form so nested values are
/// covered; idempotent, everything else preserved exactly.
pub fn escape_doc(doc: &Document) -> Document {
    let serialized = match serde_json::to_string(doc) {
        Ok(text) => text,
        Err(_) => return doc.clone(),
    };
    if !serialized.contains('\u{2028}') {
        return doc.clone();
    }
    // U+2028 only occurs inside string literals; "\\n" in the JSON text
    // deserializes to the two characters backslash-n.
    let escaped = serialized.replace('\u{2028}', "\\\\n");
    serde_json::from_str(&escaped).unwrap_or_else(|_| doc.clone())
}

fn index_by_id(documents: impl Iterator<Item = Document>) -> HashMap<String, Document> {
    let mut indexed = HashMap::new();
    for doc in documents {
        let id = doc
            .get("id")
            .and_then(|id| id.as_str())
            .map(str::to_string);
        match id {
            Some(id) => {
                indexed.insert(id, doc);
            }
            None => warn!("document without a string id skipped while indexing"),
        }
    }
    indexed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn escape_doc_replaces_line_separator_in_nested_strings() {
        let doc = json!({
            "id": "X1",
            "title": "one\u{2028}two",
            "body": {
                "paragraphs": ["a\u{2028}b", "plain"],
            },
        });
        let escaped = escape_doc(&doc);
        assert_eq!(escaped["title"], "one\\ntwo");
        assert_eq!(escaped["body"]["paragraphs"][0], "a\\nb");
        assert_eq!(escaped["body"]["paragraphs"][1], "plain");
        assert_eq!(escaped["id"], "X1");
    }

    #[test]
    fn escape_doc_is_idempotent() {
        let doc = json!({"text": "first\u{2028}second"});
        let once = escape_doc(&doc);
        let twice = escape_doc(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn escape_doc_preserves_documents_without_line_separators() {
        let doc = json!({
            "id": "X1",
            "n": 42,
            "newline": "a\nb",
            "tags": ["x", "y"],
            "flag": true,
            "nothing": null,
        });
        assert_eq!(escape_doc(&doc), doc);
    }

    #[test]
    fn index_by_id_keeps_last_duplicate() {
        let docs = vec![
            json!({"id": "a", "rev": 1}),
            json!({"id": "b", "rev": 1}),
            json!({"id": "a", "rev": 2}),
        ];
        let indexed = index_by_id(docs.into_iter());
        assert_eq!(indexed.len(), 2);
        assert_eq!(indexed["a"]["rev"], 2);
        assert_eq!(indexed["b"]["rev"], 1);
    }

    #[test]
    fn index_by_id_skips_documents_without_string_id() {
        let docs = vec![json!({"rev": 1}), json!({"id": 7}), json!({"id": "ok"})];
        let indexed = index_by_id(docs.into_iter());
        assert_eq!(indexed.len(), 1);
        assert!(indexed.contains_key("ok"));
    }
}
