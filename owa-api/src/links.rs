//! Hyperlinks attached to every resource

use serde::Serialize;
use std::fmt::Display;
use uuid::Uuid;

pub const ARTISTS: &str = "artist";
pub const MEMBERS: &str = "member";
pub const TRACKS: &str = "track";
pub const TRACKLISTS: &str = "tracklist";
pub const TAGS: &str = "tag";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_link: String,
    pub collection: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
}

impl Links {
    /// `self` and `collection` links for one resource
    ///
    /// ```
    /// use owa_api::links::{Links, TAGS};
    ///
    /// let links = Links::resource("http://host", TAGS, "abc");
    /// assert_eq!(links.self_link, "http://host/tag/abc");
    /// assert_eq!(links.collection, "http://host/tag");
    /// ```
    pub fn resource(base_url: &str, collection: &str, id: impl Display) -> Self {
        Self {
            self_link: format!("{}/{}/{}", base_url, collection, id),
            collection: format!("{}/{}", base_url, collection),
            stream: None,
        }
    }

    pub fn with_stream(mut self, base_url: &str, stream: Uuid) -> Self {
        self.stream = Some(format!("{}/stream/{}", base_url, stream));
        self
    }
}
