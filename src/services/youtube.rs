//! YouTube data API client

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{check_status, ServiceError};
use crate::config::YoutubeSettings;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Largest page the API hands out
const PAGE_SIZE: u32 = 50;

/// Stop following `nextPageToken` after this many pages
const MAX_PAGES: usize = 40;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentDetails {
    video_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItem {
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemsPage {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    next_page_token: Option<String>,
}

impl PlaylistItemsPage {
    fn into_parts(self) -> (Vec<String>, Option<String>) {
        let ids = self
            .items
            .into_iter()
            .map(|item| item.content_details.video_id)
            .collect();
        (ids, self.next_page_token.filter(|t| !t.is_empty()))
    }
}

pub struct YoutubeClient {
    client: Client,
    settings: YoutubeSettings,
}

impl YoutubeClient {
    pub fn new(settings: YoutubeSettings) -> Result<Self, ServiceError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, settings })
    }

    async fn page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistItemsPage, ServiceError> {
        let url = format!("{}/playlistItems", self.settings.api_url);
        let page_size = PAGE_SIZE.to_string();

        let mut query = vec![
            ("part", "contentDetails"),
            ("maxResults", page_size.as_str()),
            ("playlistId", playlist_id),
            ("key", self.settings.api_key.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self.client.get(&url).query(&query).send().await?;
        Ok(check_status(response).await?.json().await?)
    }

    /// Every video id in a playlist, in playlist order
    pub async fn playlist_video_ids(&self, playlist_id: &str) -> Result<Vec<String>, ServiceError> {
        if self.settings.api_key.is_empty() {
            return Err(ServiceError::NotConfigured("youtube api key"));
        }

        let mut video_ids = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let (ids, next) = self
                .page(playlist_id, page_token.as_deref())
                .await?
                .into_parts();
            video_ids.extend(ids);

            match next {
                Some(token) => page_token = Some(token),
                None => {
                    debug!("Playlist {} has {} videos", playlist_id, video_ids.len());
                    return Ok(video_ids);
                }
            }
        }

        warn!(
            "Playlist {} still had pages after {} requests, truncating",
            playlist_id, MAX_PAGES
        );
        Ok(video_ids)
    }
}
