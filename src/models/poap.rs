use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::poap::{self, PoapStatus};
use crate::entities::poap_token;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoapView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub website: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub attendees: Option<i32>,
    pub creator_wallet: String,
    pub status: PoapStatus,
    pub total_claims: u64,
    pub token: Option<PoapTokenView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PoapView {
    pub fn new(model: poap::Model, token: Option<poap_token::Model>, total_claims: u64) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            image_url: model.image_url,
            website: model.website,
            start_date: model.start_date.with_timezone(&Utc),
            end_date: model.end_date.with_timezone(&Utc),
            attendees: model.attendees,
            creator_wallet: model.creator_wallet,
            status: model.status,
            total_claims,
            token: token.map(PoapTokenView::from),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoapSummary {
    pub id: i64,
    pub title: String,
    pub image_url: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: PoapStatus,
    pub creator_wallet: String,
}

impl From<poap::Model> for PoapSummary {
    fn from(model: poap::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            image_url: model.image_url,
            start_date: model.start_date.with_timezone(&Utc),
            end_date: model.end_date.with_timezone(&Utc),
            status: model.status,
            creator_wallet: model.creator_wallet,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoapTokenView {
    pub mint_address: String,
    pub metadata_uri: String,
    pub updated_at: DateTime<Utc>,
}

impl From<poap_token::Model> for PoapTokenView {
    fn from(model: poap_token::Model) -> Self {
        Self {
            mint_address: model.mint_address,
            metadata_uri: model.metadata_uri,
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

// Request types for the POAP HTTP API

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoapCreateRequest {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub website: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub attendees: Option<i32>,
    pub creator_wallet: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoapUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub website: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub attendees: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoapTokenRequest {
    pub mint_address: String,
    pub metadata_uri: String,
}
