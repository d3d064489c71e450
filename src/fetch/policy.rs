use std::sync::Arc;

use clap::ValueEnum;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::cache::detail_cache::{empty_object, is_empty_body, DetailCache};
use crate::credentials::CredentialProvider;
use crate::fetch::fetcher::ResilientFetcher;
use crate::utils::constants::POLICY_PATH;

/// Number of search hits whose details are prefetched by
/// [`PolicyClient::search_with_details`].
pub const PREFETCH_DETAILS: usize = 3;

/// Link endpoints hanging off an object url.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LinkKind {
    Children,
    Expanded,
    #[value(name = "usedby")]
    UsedBy,
    #[value(name = "classinfo")]
    ClassInfo,
    #[value(name = "editinfo")]
    EditInfo,
}

impl LinkKind {
    /// Query suffixes start with `?`, path suffixes are joined with `/`.
    pub fn suffix(self) -> &'static str {
        match self {
            LinkKind::Children => "children",
            LinkKind::Expanded => "?op=expanded",
            LinkKind::UsedBy => "usedby",
            LinkKind::ClassInfo => "classinfo",
            LinkKind::EditInfo => "?op=editinfo",
        }
    }
}

/// Search hits plus the details prefetched for the first few of them.
#[derive(Debug, Default)]
pub struct SearchWithDetails {
    pub items: Vec<Value>,
    pub details: Vec<Value>,
}

/// Policy object operations on top of [`ResilientFetcher`].
pub struct PolicyClient<P> {
    base_url: String,
    fetcher: ResilientFetcher<P>,
    details: Arc<DetailCache>,
}

impl<P: CredentialProvider> PolicyClient<P> {
    pub fn new(base_url: &str, fetcher: ResilientFetcher<P>, details: Arc<DetailCache>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            fetcher,
            details,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn fetcher(&self) -> &ResilientFetcher<P> {
        &self.fetcher
    }

    pub fn class_url(&self, class_name: &str) -> String {
        format!("{}{}/{}", self.base_url, POLICY_PATH, class_name)
    }

    pub fn build_object_id_url(&self, obj_id: &str) -> String {
        format!("{}{}/objects/{}", self.base_url, POLICY_PATH, obj_id)
    }

    /// Absolute hrefs pass through, relative ones are joined to the base url.
    pub fn resolve_href(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_owned()
        } else if href.starts_with('/') {
            format!("{}{}", self.base_url, href)
        } else {
            format!("{}/{}", self.base_url, href)
        }
    }

    /// All objects of `class_name`.
    pub async fn fetch_list(&self, class_name: &str, token: Option<&str>) -> Vec<Value> {
        let url = self.class_url(class_name);
        debug!("[FETCH] {}: {}", class_name, url);
        data_items(self.fetcher.get(&url, token).await)
    }

    /// Objects of `class_name` matching `filter_expr`, passed through unparsed.
    pub async fn search_filtered(&self, class_name: &str, filter_expr: &str, token: Option<&str>) -> Vec<Value> {
        let mut url = match Url::parse(&self.class_url(class_name)) {
            Ok(url) => url,
            Err(e) => {
                error!("cannot build search url for {}: {}", class_name, e);
                return Vec::new();
            }
        };
        url.query_pairs_mut().append_pair("filter", filter_expr);
        debug!("[FILTER] {} filter: {}", class_name, filter_expr);
        data_items(self.fetcher.get(url.as_str(), token).await)
    }

    /// Object body at `href`, memoized in the detail cache.
    pub async fn fetch_by_href(&self, href: &str, token: Option<&str>) -> Value {
        let url = self.resolve_href(href);
        self.details
            .get_detail_cached(&url, move |url| async move { self.fetcher.get(&url, token).await })
            .await
    }

    /// Object body by id; not memoized.
    pub async fn fetch_by_id(&self, obj_id: &str, token: Option<&str>) -> Value {
        let url = self.build_object_id_url(obj_id);
        debug!("[GET BY ID] Fetching object from: {}", url);
        self.fetcher.get(&url, token).await.unwrap_or_else(empty_object)
    }

    /// Url of the `kind` link endpoint for an object id or a full object url.
    pub fn link_url(&self, id_or_url: &str, kind: LinkKind) -> String {
        let object_url = if id_or_url.starts_with("http") {
            id_or_url.to_owned()
        } else {
            self.build_object_id_url(id_or_url)
        };
        let suffix = kind.suffix();
        if suffix.starts_with('?') {
            format!("{}{}", object_url, suffix)
        } else {
            format!("{}/{}", object_url, suffix)
        }
    }

    /// Link endpoint body, memoized in the detail cache like [`Self::fetch_by_href`].
    pub async fn fetch_link(&self, id_or_url: &str, kind: LinkKind, token: Option<&str>) -> Value {
        let url = self.link_url(id_or_url, kind);
        debug!("[LINK] {:?}: {}", kind, url);
        self.fetch_by_href(&url, token).await
    }

    /// [`Self::search_filtered`], then the hrefs of the first hits are pulled
    /// into the detail cache. Empty details are left out.
    pub async fn search_with_details(
        &self,
        class_name: &str,
        filter_expr: &str,
        token: Option<&str>,
    ) -> SearchWithDetails {
        let items = self.search_filtered(class_name, filter_expr, token).await;
        let hrefs: Vec<String> = items
            .iter()
            .filter_map(|item| item.get("href").and_then(Value::as_str))
            .filter(|href| !href.is_empty())
            .take(PREFETCH_DETAILS)
            .map(str::to_owned)
            .collect();

        let mut details = Vec::with_capacity(hrefs.len());
        for href in hrefs {
            let detail = self.fetch_by_href(&href, token).await;
            if is_empty_body(&detail) {
                warn!("no detail for search hit {}", href);
            } else {
                details.push(detail);
            }
        }
        SearchWithDetails { items, details }
    }

    pub async fn list_cached_keys(&self) -> Vec<String> {
        self.details.list_keys().await
    }

    pub async fn clear_cache(&self) {
        self.details.clear().await;
    }
}

/// The `data` field of a listing response; a lone object becomes a one-item list.
fn data_items(body: Option<Value>) -> Vec<Value> {
    match body {
        Some(Value::Object(mut fields)) => match fields.remove("data") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(item) => vec![item],
        },
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn link_suffixes_are_joined_by_kind() {
        assert_eq!(LinkKind::Expanded.suffix(), "?op=expanded");
        assert_eq!(LinkKind::UsedBy.suffix(), "usedby");
    }

    #[test]
    fn data_items_passes_data_through() {
        assert_eq!(data_items(Some(json!({"data": [{"id": 1}, {"id": 2}]}))).len(), 2);
        assert_eq!(data_items(Some(json!({"data": {"id": 1}}))), vec![json!({"id": 1})]);
        assert!(data_items(Some(json!({"other": []}))).is_empty());
        assert!(data_items(None).is_empty());
    }
}
