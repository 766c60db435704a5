//! YouTube Data API live search

use crate::live::LiveSearch;
use anyhow::{anyhow, Result};
use std::time::Duration;

const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Public watch page of a video
pub fn watch_url(video_id: &str) -> String {
    format!("{}{}", WATCH_URL, video_id)
}

/// Searches a channel for broadcasts that are live right now
pub struct YouTubeSearch {
    client: reqwest::Client,
}

#[derive(serde::Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchResult>,
}

#[derive(serde::Deserialize)]
struct SearchResult {
    id: ResourceId,
}

#[derive(serde::Deserialize)]
struct ResourceId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

impl SearchResponse {
    /// Video ids in result order.  Results without a video id (channels, playlists) are dropped.
    fn video_ids(self) -> Vec<String> {
        self.items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect()
    }
}

impl YouTubeSearch {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow!("Could not build YouTube HTTP client: {}", e))?;

        Ok(Self { client })
    }
}

#[serenity::async_trait]
impl LiveSearch for YouTubeSearch {
    async fn live_video_ids(&self, api_key: &str, channel_id: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("part", "snippet"),
                ("channelId", channel_id),
                ("type", "video"),
                ("eventType", "live"),
                ("key", api_key),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            // The request URL carries the API key; keep it out of the logs
            .map_err(|e| anyhow!("YouTube search failed: {}", e.without_url()))?
            .json::<SearchResponse>()
            .await
            .map_err(|e| anyhow!("Could not parse YouTube search response: {}", e.without_url()))?;

        Ok(response.video_ids())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_url_embeds_video_id() {
        assert_eq!(
            watch_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn live_search_response_yields_video_ids_in_order() {
        let body = r#"{
            "kind": "youtube#searchListResponse",
            "pageInfo": { "totalResults": 3, "resultsPerPage": 5 },
            "items": [
                { "kind": "youtube#searchResult", "id": { "kind": "youtube#channel", "channelId": "UCxyz" } },
                { "kind": "youtube#searchResult", "id": { "kind": "youtube#video", "videoId": "first" },
                  "snippet": { "liveBroadcastContent": "live" } },
                { "kind": "youtube#searchResult", "id": { "kind": "youtube#video", "videoId": "second" } }
            ]
        }"#;

        let response: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.video_ids(), vec!["first", "second"]);
    }

    #[test]
    fn nobody_live_yields_nothing() {
        let with_empty_items: SearchResponse =
            serde_json::from_str(r#"{ "kind": "youtube#searchListResponse", "items": [] }"#)
                .unwrap();
        assert!(with_empty_items.video_ids().is_empty());

        let without_items: SearchResponse =
            serde_json::from_str(r#"{ "kind": "youtube#searchListResponse" }"#).unwrap();
        assert!(without_items.video_ids().is_empty());
    }
}
