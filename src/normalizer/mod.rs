use html_escape::decode_html_entities;
use serde::Deserialize;

use crate::app::{HearsayError, Result};
use crate::domain::{Comment, ExtractedContent};

/// A listing response. The comments endpoint returns a pair of listings
/// (the post, then its comments); other endpoints return a single listing
/// whose children are posts.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListingResponse {
    Thread(Vec<Listing>),
    Single(Listing),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListingData {
    pub children: Vec<Thing>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Thing {
    pub kind: String,
    pub data: ThingData,
}

/// The fields of a post (`t3`) or comment (`t1`) that we read.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ThingData {
    pub id: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub selftext: Option<String>,
    pub author: Option<String>,
    pub body: Option<String>,
    pub permalink: Option<String>,
    pub url: Option<String>,
    pub stickied: bool,
}

fn decode(text: Option<String>) -> Option<String> {
    text.map(|t| decode_html_entities(&t).into_owned())
}

#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    fn parse(&self, body: &[u8]) -> Result<ListingResponse> {
        serde_json::from_slice(body).map_err(|e| HearsayError::ListingParse(e.to_string()))
    }

    /// Extract the post and its top comments from a comments endpoint response.
    pub fn normalize(&self, body: &[u8]) -> Result<ExtractedContent> {
        let (post, comments) = match self.parse(body)? {
            ListingResponse::Thread(listings) => {
                let mut listings = listings.into_iter();
                let post = listings
                    .next()
                    .and_then(|l| l.data.children.into_iter().next());
                let comments = listings
                    .next()
                    .map(|l| l.data.children)
                    .unwrap_or_default();
                (post, comments)
            }
            ListingResponse::Single(listing) => {
                let mut children = listing.data.children.into_iter();
                let post = children.next();
                (post, children.collect())
            }
        };

        let post = post
            .map(|thing| thing.data)
            .filter(|data| data.title.is_some())
            .ok_or_else(|| {
                HearsayError::EmptyContent("Could not extract post data from response".into())
            })?;

        let comments = comments.into_iter().filter_map(|thing| {
            let body = decode(thing.data.body)?;
            Some(Comment::new(decode(thing.data.author), body))
        });

        let content = ExtractedContent::new(
            decode(post.title).unwrap_or_default(),
            decode(post.selftext),
            comments,
        );

        if content.is_empty() {
            return Err(HearsayError::EmptyContent("The post has no readable text".into()));
        }

        Ok(content)
    }

    /// Posts of a subreddit listing, in listing order.
    pub fn posts(&self, body: &[u8]) -> Result<Vec<ThingData>> {
        let children = match self.parse(body)? {
            ListingResponse::Single(listing) => listing.data.children,
            ListingResponse::Thread(listings) => listings
                .into_iter()
                .next()
                .map(|l| l.data.children)
                .unwrap_or_default(),
        };

        Ok(children
            .into_iter()
            .filter(|thing| thing.kind == "t3")
            .map(|thing| thing.data)
            .collect())
    }
}
