//! Claim analytics for a single POAP and for a creator's whole catalogue.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::{ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use tracing::debug;

use crate::entities::distribution_method::MethodKind;
use crate::entities::poap::PoapStatus;
use crate::entities::{
    airdrop, claim_link, distribution_method, location_rule, poap, poap_claim, secret_word,
};
use crate::models::analytics::{
    ClaimStatistics, DayCount, MethodAnalytics, OverviewAnalyticsView, PoapAnalyticsView,
};
use crate::state::AppState;

const ALL_CREATORS_KEY: &str = "*";

pub fn aggregate_claims(claims: &[poap_claim::Model]) -> ClaimStatistics {
    let mut claims_by_method: BTreeMap<MethodKind, u64> =
        MethodKind::ALL.iter().map(|kind| (*kind, 0)).collect();
    let mut by_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    let mut wallets = HashSet::new();

    for claim in claims {
        *claims_by_method.entry(claim.method_kind).or_insert(0) += 1;
        *by_day
            .entry(claim.claimed_at.with_timezone(&Utc).date_naive())
            .or_insert(0) += 1;
        wallets.insert(claim.wallet_address.as_str());
    }

    let claims_by_day: Vec<DayCount> = by_day
        .into_iter()
        .map(|(date, claims)| DayCount { date, claims })
        .collect();

    // Strict comparisons keep the first entry, i.e. the earliest day and
    // the first kind in declaration order.
    let most_active_day = claims_by_day.iter().fold(None::<DayCount>, |best, day| {
        match best {
            Some(current) if current.claims >= day.claims => Some(current),
            _ => Some(*day),
        }
    });
    let top_method = claims_by_method
        .iter()
        .filter(|(_, count)| **count > 0)
        .fold(None::<(MethodKind, u64)>, |best, (kind, count)| match best {
            Some(current) if current.1 >= *count => Some(current),
            _ => Some((*kind, *count)),
        })
        .map(|(kind, _)| kind);

    ClaimStatistics {
        total_claims: claims.len() as u64,
        unique_wallets: wallets.len() as u64,
        claims_by_method,
        claims_by_day,
        most_active_day,
        top_method,
    }
}

/// Returns `None` when the POAP does not exist.
pub async fn poap_analytics(
    state: &AppState,
    poap_id: i64,
) -> Result<Option<Arc<PoapAnalyticsView>>, DbErr> {
    if let Some(cached) = state.cache.poap_analytics.get(&poap_id).await {
        return Ok(Some(cached));
    }

    let db = &state.database;
    let Some(poap) = poap::Entity::find_by_id(poap_id).one(db).await? else {
        return Ok(None);
    };

    let claims = poap_claim::Entity::find()
        .filter(poap_claim::Column::PoapId.eq(poap_id))
        .all(db)
        .await?;
    let methods = distribution_method::Entity::find()
        .filter(distribution_method::Column::PoapId.eq(poap_id))
        .order_by_asc(distribution_method::Column::Id)
        .all(db)
        .await?;

    let method_ids: Vec<i64> = methods.iter().map(|method| method.id).collect();
    let mut claims_per_method: HashMap<i64, u64> = HashMap::new();
    for claim in &claims {
        *claims_per_method
            .entry(claim.distribution_method_id)
            .or_insert(0) += 1;
    }

    let open_links = claim_link::Entity::find()
        .filter(claim_link::Column::DistributionMethodId.is_in(method_ids.clone()))
        .filter(claim_link::Column::Claimed.eq(false))
        .all(db)
        .await?
        .into_iter()
        .fold(HashMap::<i64, i64>::new(), |mut acc, link| {
            *acc.entry(link.distribution_method_id).or_insert(0) += 1;
            acc
        });
    let secret_limits: HashMap<i64, Option<i32>> = secret_word::Entity::find()
        .filter(secret_word::Column::DistributionMethodId.is_in(method_ids.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(|row| (row.distribution_method_id, row.max_claims))
        .collect();
    let location_limits: HashMap<i64, Option<i32>> = location_rule::Entity::find()
        .filter(location_rule::Column::DistributionMethodId.is_in(method_ids.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(|row| (row.distribution_method_id, row.max_claims))
        .collect();
    let airdrop_sizes: HashMap<i64, i64> = airdrop::Entity::find()
        .filter(airdrop::Column::DistributionMethodId.is_in(method_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|row| (row.distribution_method_id, row.recipients().len() as i64))
        .collect();

    let methods = methods
        .into_iter()
        .map(|method| {
            let claimed = claims_per_method.get(&method.id).copied().unwrap_or(0);
            let max_claims = match method.kind {
                MethodKind::SecretWord => secret_limits.get(&method.id).copied().flatten(),
                MethodKind::LocationBased => location_limits.get(&method.id).copied().flatten(),
                MethodKind::ClaimLinks | MethodKind::Airdrop => None,
            };
            let remaining = match method.kind {
                MethodKind::ClaimLinks => Some(open_links.get(&method.id).copied().unwrap_or(0)),
                MethodKind::Airdrop => airdrop_sizes
                    .get(&method.id)
                    .map(|size| (size - claimed as i64).max(0)),
                MethodKind::SecretWord | MethodKind::LocationBased => {
                    max_claims.map(|max| (i64::from(max) - claimed as i64).max(0))
                }
            };
            MethodAnalytics {
                distribution_method_id: method.id,
                kind: method.kind,
                disabled: method.disabled,
                deleted: method.deleted,
                claims: claimed,
                max_claims,
                remaining,
            }
        })
        .collect();

    let view = Arc::new(PoapAnalyticsView {
        poap_id,
        status: poap.status,
        statistics: aggregate_claims(&claims),
        methods,
        generated_at: Utc::now(),
    });
    state
        .cache
        .poap_analytics
        .insert(poap_id, Arc::clone(&view))
        .await;
    debug!("Computed analytics for POAP {poap_id}");

    Ok(Some(view))
}

pub async fn overview(
    state: &AppState,
    creator: Option<String>,
) -> Result<Arc<OverviewAnalyticsView>, DbErr> {
    let cache_key = creator
        .clone()
        .unwrap_or_else(|| ALL_CREATORS_KEY.to_string());
    if let Some(cached) = state.cache.overview_analytics.get(&cache_key).await {
        return Ok(cached);
    }

    let db = &state.database;
    let mut poap_query = poap::Entity::find();
    if let Some(creator) = &creator {
        poap_query = poap_query.filter(poap::Column::CreatorWallet.eq(creator.as_str()));
    }
    let poaps = poap_query.all(db).await?;

    let mut poaps_by_status: BTreeMap<PoapStatus, u64> = BTreeMap::new();
    for poap in &poaps {
        *poaps_by_status.entry(poap.status).or_insert(0) += 1;
    }

    let claims = if creator.is_some() {
        let poap_ids: Vec<i64> = poaps.iter().map(|poap| poap.id).collect();
        poap_claim::Entity::find()
            .filter(poap_claim::Column::PoapId.is_in(poap_ids))
            .all(db)
            .await?
    } else {
        poap_claim::Entity::find().all(db).await?
    };

    let view = Arc::new(OverviewAnalyticsView {
        creator,
        total_poaps: poaps.len() as u64,
        poaps_by_status,
        statistics: aggregate_claims(&claims),
        generated_at: Utc::now(),
    });
    state
        .cache
        .overview_analytics
        .insert(cache_key, Arc::clone(&view))
        .await;

    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::{ClaimProcessor, ClaimSubmission};
    use crate::test_support::{CREATOR, insert_poap, insert_secret_word, insert_token, setup_db, test_state};
    use crate::wallet::tests::{ALICE, BOB, CAROL};
    use chrono::{DateTime, TimeZone};

    fn claim(wallet: &str, kind: MethodKind, at: DateTime<Utc>) -> poap_claim::Model {
        poap_claim::Model {
            poap_id: 1,
            wallet_address: wallet.to_string(),
            distribution_method_id: 1,
            method_kind: kind,
            transaction_signature: None,
            claimed_at: at.fixed_offset(),
        }
    }

    #[test]
    fn empty_claims_zero_fill_every_method() {
        let stats = aggregate_claims(&[]);
        assert_eq!(stats.total_claims, 0);
        assert_eq!(stats.claims_by_method.len(), 4);
        assert!(stats.claims_by_method.values().all(|count| *count == 0));
        assert!(stats.claims_by_day.is_empty());
        assert_eq!(stats.most_active_day, None);
        assert_eq!(stats.top_method, None);
    }

    #[test]
    fn aggregates_by_day_and_method() {
        let day_one = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let day_two = Utc.with_ymd_and_hms(2026, 3, 2, 23, 30, 0).unwrap();
        let claims = vec![
            claim(ALICE, MethodKind::SecretWord, day_two),
            claim(BOB, MethodKind::Airdrop, day_one),
            claim(CAROL, MethodKind::Airdrop, day_two),
        ];

        let stats = aggregate_claims(&claims);
        assert_eq!(stats.total_claims, 3);
        assert_eq!(stats.unique_wallets, 3);
        assert_eq!(stats.claims_by_method[&MethodKind::Airdrop], 2);
        assert_eq!(stats.claims_by_method[&MethodKind::ClaimLinks], 0);
        assert_eq!(stats.top_method, Some(MethodKind::Airdrop));

        let days: Vec<_> = stats
            .claims_by_day
            .iter()
            .map(|day| (day.date.to_string(), day.claims))
            .collect();
        assert_eq!(
            days,
            vec![("2026-03-01".to_string(), 1), ("2026-03-02".to_string(), 2)]
        );
        assert_eq!(stats.most_active_day.map(|day| day.claims), Some(2));
    }

    #[test]
    fn ties_prefer_earliest_day_and_first_kind() {
        let day_one = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let day_two = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
        let claims = vec![
            claim(ALICE, MethodKind::LocationBased, day_two),
            claim(BOB, MethodKind::SecretWord, day_one),
        ];

        let stats = aggregate_claims(&claims);
        assert_eq!(
            stats.most_active_day.map(|day| day.date.to_string()),
            Some("2026-03-01".to_string())
        );
        assert_eq!(stats.top_method, Some(MethodKind::SecretWord));
    }

    #[tokio::test]
    async fn cached_analytics_refresh_after_claim() {
        let db = setup_db().await;
        let poap = insert_poap(&db).await;
        insert_token(&db, poap.id).await;
        let method = insert_secret_word(&db, poap.id, "ferris", Some(10)).await;
        let (state, _) = test_state(db);

        let before = poap_analytics(&state, poap.id).await.unwrap().unwrap();
        assert_eq!(before.statistics.total_claims, 0);
        assert_eq!(before.methods[0].remaining, Some(10));

        ClaimProcessor::new(&state)
            .claim(
                poap.id,
                ALICE,
                ClaimSubmission::SecretWord {
                    method_id: Some(method.id),
                    word: "ferris".to_string(),
                },
            )
            .await
            .unwrap();

        let after = poap_analytics(&state, poap.id).await.unwrap().unwrap();
        assert_eq!(after.statistics.total_claims, 1);
        assert_eq!(after.status, PoapStatus::Distributed);
        assert_eq!(after.methods[0].claims, 1);
        assert_eq!(after.methods[0].remaining, Some(9));

        let overview = overview(&state, Some(CREATOR.to_string())).await.unwrap();
        assert_eq!(overview.total_poaps, 1);
        assert_eq!(overview.poaps_by_status[&PoapStatus::Distributed], 1);
        assert_eq!(overview.statistics.unique_wallets, 1);
    }

    #[tokio::test]
    async fn missing_poap_has_no_analytics() {
        let db = setup_db().await;
        let (state, _) = test_state(db);
        assert!(poap_analytics(&state, 7).await.unwrap().is_none());

        let overview = overview(&state, None).await.unwrap();
        assert_eq!(overview.total_poaps, 0);
        assert_eq!(overview.statistics.total_claims, 0);
    }
}
