//! Fixtures shared by the async tests: an in-memory SQLite schema built from
//! the entities and an `AppState` wired to a recording minter.

use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbBackend, Schema};

use crate::config::{CacheConfig, DistributionConfig};
use crate::entities::distribution_method::MethodKind;
use crate::entities::poap::PoapStatus;
use crate::entities::prelude::*;
use crate::entities::{distribution_method, poap, poap_token, secret_word};
use crate::minter::mock::MockMinter;
use crate::state::{ApiCache, AppState};

pub const CREATOR: &str = "CreAtor1111111111111111111111111111111111111";
pub const MINT: &str = "MintAddr111111111111111111111111111111111111";

pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let schema = Schema::new(DbBackend::Sqlite);

    let statements = [
        schema.create_table_from_entity(Poap),
        schema.create_table_from_entity(PoapToken),
        schema.create_table_from_entity(DistributionMethod),
        schema.create_table_from_entity(ClaimLink),
        schema.create_table_from_entity(SecretWord),
        schema.create_table_from_entity(LocationRule),
        schema.create_table_from_entity(Airdrop),
        schema.create_table_from_entity(PoapClaim),
    ];
    for stmt in statements {
        db.execute(db.get_database_backend().build(&stmt))
            .await
            .unwrap();
    }

    db
}

pub fn test_state(db: DatabaseConnection) -> (AppState, Arc<MockMinter>) {
    let cache = Arc::new(ApiCache::new(&CacheConfig {
        analytics_max_capacity: 100,
        analytics_ttl_seconds: 60,
        overview_max_capacity: 100,
        overview_ttl_seconds: 60,
    }));
    let minter = Arc::new(MockMinter::default());
    let state = AppState::new(
        db,
        cache,
        minter.clone(),
        DistributionConfig {
            max_claim_links_per_batch: 50,
            max_airdrop_addresses: 100,
        },
    );
    (state, minter)
}

pub async fn insert_poap(db: &DatabaseConnection) -> poap::Model {
    let now = Utc::now().fixed_offset();
    poap::ActiveModel {
        id: NotSet,
        title: Set("RustConf 2026".to_string()),
        description: Set("Attended the conference".to_string()),
        image_url: Set("https://img.example/rustconf.png".to_string()),
        website: Set(None),
        start_date: Set(now - Duration::days(1)),
        end_date: Set(now + Duration::days(1)),
        attendees: Set(Some(500)),
        creator_wallet: Set(CREATOR.to_string()),
        status: Set(PoapStatus::Draft),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_token(db: &DatabaseConnection, poap_id: i64) -> poap_token::Model {
    let now = Utc::now().fixed_offset();
    poap_token::ActiveModel {
        poap_id: Set(poap_id),
        mint_address: Set(MINT.to_string()),
        metadata_uri: Set("https://meta.example/1.json".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_method(
    db: &DatabaseConnection,
    poap_id: i64,
    kind: MethodKind,
) -> distribution_method::Model {
    let now = Utc::now().fixed_offset();
    distribution_method::ActiveModel {
        id: NotSet,
        poap_id: Set(poap_id),
        kind: Set(kind),
        disabled: Set(false),
        deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_secret_word(
    db: &DatabaseConnection,
    poap_id: i64,
    word: &str,
    max_claims: Option<i32>,
) -> distribution_method::Model {
    let method = insert_method(db, poap_id, MethodKind::SecretWord).await;
    secret_word::ActiveModel {
        distribution_method_id: Set(method.id),
        word: Set(word.to_string()),
        claim_count: Set(0),
        max_claims: Set(max_claims),
        start_date: Set(None),
        end_date: Set(None),
    }
    .insert(db)
    .await
    .unwrap();
    method
}
