use std::io::Read;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::asset::RemoteAsset;
use crate::error::ImmpruneError;

/// Records requested per search page. A shorter page ends the scan.
pub const PAGE_SIZE: usize = 1000;

const SEARCH_PATH: &str = "/api/search/metadata";

/// Body of `POST /api/search/metadata`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub page: u32,
    pub size: usize,
    pub with_exif: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<&'static str>,
}

impl SearchRequest {
    pub fn new(page: u32, only_videos: bool) -> Self {
        Self {
            page,
            size: PAGE_SIZE,
            with_exif: true,
            asset_type: only_videos.then_some("VIDEO"),
        }
    }
}

/// Older servers return a bare array, newer ones wrap it in a page object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AssetsField {
    List(Vec<RemoteAsset>),
    Page { items: Vec<RemoteAsset> },
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    assets: AssetsField,
}

pub fn parse_search_response(body: &[u8]) -> Result<Vec<RemoteAsset>, ImmpruneError> {
    let response: SearchResponse =
        serde_json::from_slice(body).map_err(|e| ImmpruneError::Parse {
            source_name: "Immich",
            message: e.to_string(),
        })?;
    Ok(match response.assets {
        AssetsField::List(items) | AssetsField::Page { items } => items,
    })
}

/// One page of the remote catalog.
pub trait SearchPages {
    fn search_page(&self, request: &SearchRequest) -> anyhow::Result<Vec<RemoteAsset>>;
}

/// Walk pages from 1 until a short page. Any failure discards what was collected.
pub fn fetch_all_assets(
    source: &dyn SearchPages,
    only_videos: bool,
) -> anyhow::Result<Vec<RemoteAsset>> {
    let mut all = Vec::new();
    let mut page = 1u32;
    loop {
        let request = SearchRequest::new(page, only_videos);
        let assets = source
            .search_page(&request)
            .with_context(|| format!("Immich search page {} failed", page))?;
        let count = assets.len();
        log::debug!("page {}: {} assets", page, count);
        all.extend(assets);
        if count < PAGE_SIZE {
            break;
        }
        page += 1;
    }
    log::info!("fetched {} remote assets in {} pages", all.len(), page);
    Ok(all)
}

/// Blocking HTTP client for the Immich search API.
pub struct ImmichClient {
    base_url: String,
    api_key: String,
    agent: ureq::Agent,
}

impl ImmichClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout_read(Duration::from_secs(120))
            .timeout_write(Duration::from_secs(30))
            .build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            agent,
        }
    }

    pub fn search_url(&self) -> String {
        format!("{}{}", self.base_url, SEARCH_PATH)
    }
}

impl SearchPages for ImmichClient {
    fn search_page(&self, request: &SearchRequest) -> anyhow::Result<Vec<RemoteAsset>> {
        let response = self
            .agent
            .post(&self.search_url())
            .set("x-api-key", &self.api_key)
            .set("Content-Type", "application/json")
            .send_json(request)
            .map_err(|e| match e {
                ureq::Error::Status(code, resp) => ImmpruneError::Network(format!(
                    "{} returned HTTP {} {}",
                    SEARCH_PATH,
                    code,
                    resp.status_text()
                )),
                ureq::Error::Transport(transport) => ImmpruneError::Network(transport.to_string()),
            })?;

        let mut body = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|e| ImmpruneError::Network(e.to_string()))?;
        Ok(parse_search_response(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FakePages {
        sizes: Vec<usize>,
        fail_on: Option<u32>,
        seen: RefCell<Vec<SearchRequest>>,
    }

    impl FakePages {
        fn new(sizes: Vec<usize>) -> Self {
            Self { sizes, fail_on: None, seen: RefCell::new(Vec::new()) }
        }
    }

    impl SearchPages for FakePages {
        fn search_page(&self, request: &SearchRequest) -> anyhow::Result<Vec<RemoteAsset>> {
            self.seen.borrow_mut().push(request.clone());
            if self.fail_on == Some(request.page) {
                return Err(ImmpruneError::Network("connection reset".into()).into());
            }
            let n = self.sizes.get(request.page as usize - 1).copied().unwrap_or(0);
            Ok(vec![RemoteAsset::default(); n])
        }
    }

    #[test]
    fn test_pages_until_short_page() {
        let fake = FakePages::new(vec![PAGE_SIZE, PAGE_SIZE, 3]);
        let assets = fetch_all_assets(&fake, false).unwrap();
        assert_eq!(assets.len(), 2 * PAGE_SIZE + 3);

        let pages: Vec<u32> = fake.seen.borrow().iter().map(|r| r.page).collect();
        assert_eq!(pages, vec![1, 2, 3]);
    }

    #[test]
    fn test_exact_multiple_needs_an_empty_page() {
        let fake = FakePages::new(vec![PAGE_SIZE]);
        let assets = fetch_all_assets(&fake, true).unwrap();
        assert_eq!(assets.len(), PAGE_SIZE);
        let seen = fake.seen.borrow();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|r| r.asset_type == Some("VIDEO") && r.with_exif));
    }

    #[test]
    fn test_failure_discards_everything() {
        let mut fake = FakePages::new(vec![PAGE_SIZE, PAGE_SIZE, PAGE_SIZE]);
        fake.fail_on = Some(2);
        let err = fetch_all_assets(&fake, false).unwrap_err();
        assert!(matches!(err.downcast_ref::<ImmpruneError>(), Some(ImmpruneError::Network(_))));
    }

    #[test]
    fn test_request_body() {
        let body = serde_json::to_value(SearchRequest::new(3, true)).unwrap();
        assert_eq!(body, serde_json::json!({"page": 3, "size": 1000, "withExif": true, "type": "VIDEO"}));

        let body = serde_json::to_value(SearchRequest::new(1, false)).unwrap();
        assert!(body.get("type").is_none());
    }

    #[test]
    fn test_both_response_shapes() {
        let bare = br#"{"assets":[{"originalFileName":"a.jpg","fileSizeInByte":1}]}"#;
        let paged = br#"{"assets":{"total":1,"count":1,"items":[{"originalFileName":"b.jpg"}],"nextPage":null}}"#;
        assert_eq!(parse_search_response(bare).unwrap()[0].original_file_name, "a.jpg");
        assert_eq!(parse_search_response(paged).unwrap()[0].original_file_name, "b.jpg");
        assert!(parse_search_response(b"<html>").is_err());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ImmichClient::new("https://photos.example.org/", "k");
        assert_eq!(client.search_url(), "https://photos.example.org/api/search/metadata");
    }
}
