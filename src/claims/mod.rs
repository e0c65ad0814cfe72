//! Claim processing shared by every claim route and the airdrop runner.
//!
//! A claim resolves the distribution method, evaluates it with
//! [`crate::eligibility`], then reserves the claim row and counter inside a
//! transaction that only commits once the transfer service has moved the
//! token.

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, SqlErr, TransactionTrait,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::eligibility::{
    self, ClaimProof, ClaimRejection, ClaimWindow, MethodRule, MethodSnapshot,
};
use crate::entities::distribution_method::MethodKind;
use crate::entities::{
    airdrop, claim_link, distribution_method, location_rule, poap, poap_claim, poap_token,
    secret_word,
};
use crate::geo::Coordinates;
use crate::models::distribution::{
    AirdropExecutionView, AirdropOutcome, AirdropRecipientResult,
};
use crate::state::AppState;
use crate::status::recompute_status;
use crate::wallet::sanitize_wallet_address;

#[derive(Debug, Error)]
pub enum ClaimError {
    #[error(transparent)]
    Rejected(#[from] ClaimRejection),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("POAP {0} has no minted token yet")]
    TokenMissing(i64),
    #[error("Token transfer failed: {0}")]
    Transfer(anyhow::Error),
    #[error("Inconsistent distribution data: {0}")]
    Inconsistent(String),
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// What the claimant submitted, before the method is resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimSubmission {
    Link {
        token: String,
    },
    SecretWord {
        method_id: Option<i64>,
        word: String,
    },
    Location {
        method_id: Option<i64>,
        position: Coordinates,
    },
    Airdrop {
        method_id: Option<i64>,
    },
}

impl ClaimSubmission {
    fn kind(&self) -> MethodKind {
        match self {
            ClaimSubmission::Link { .. } => MethodKind::ClaimLinks,
            ClaimSubmission::SecretWord { .. } => MethodKind::SecretWord,
            ClaimSubmission::Location { .. } => MethodKind::LocationBased,
            ClaimSubmission::Airdrop { .. } => MethodKind::Airdrop,
        }
    }

    fn method_id(&self) -> Option<i64> {
        match self {
            ClaimSubmission::Link { .. } => None,
            ClaimSubmission::SecretWord { method_id, .. }
            | ClaimSubmission::Location { method_id, .. }
            | ClaimSubmission::Airdrop { method_id } => *method_id,
        }
    }

    fn into_proof(self) -> ClaimProof {
        match self {
            ClaimSubmission::Link { .. } => ClaimProof::ClaimLink,
            ClaimSubmission::SecretWord { word, .. } => ClaimProof::SecretWord { word },
            ClaimSubmission::Location { position, .. } => ClaimProof::Location { position },
            ClaimSubmission::Airdrop { .. } => ClaimProof::Airdrop,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClaimReceipt {
    pub claim: poap_claim::Model,
    pub mint_address: String,
    pub distance_meters: Option<f64>,
}

/// Kind-specific row backing a distribution method.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodRow {
    Link(claim_link::Model),
    SecretWord(secret_word::Model),
    Location(location_rule::Model),
    Airdrop(airdrop::Model),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMethod {
    pub method: distribution_method::Model,
    pub row: MethodRow,
}

impl ResolvedMethod {
    pub fn snapshot(&self) -> Result<MethodSnapshot, ClaimError> {
        let (window, claim_count, max_claims, rule) = match &self.row {
            MethodRow::Link(link) => (
                ClaimWindow {
                    starts_at: None,
                    ends_at: link.expires_at.map(to_utc),
                },
                0,
                None,
                MethodRule::ClaimLink {
                    claimed: link.claimed,
                },
            ),
            MethodRow::SecretWord(secret) => (
                ClaimWindow {
                    starts_at: secret.start_date.map(to_utc),
                    ends_at: secret.end_date.map(to_utc),
                },
                secret.claim_count,
                secret.max_claims,
                MethodRule::SecretWord {
                    word: secret.word.clone(),
                },
            ),
            MethodRow::Location(rule) => {
                let center = Coordinates::new(rule.latitude, rule.longitude)
                    .map_err(|err| ClaimError::Inconsistent(err.to_string()))?;
                (
                    ClaimWindow {
                        starts_at: rule.start_date.map(to_utc),
                        ends_at: rule.end_date.map(to_utc),
                    },
                    rule.claim_count,
                    rule.max_claims,
                    MethodRule::Location {
                        center,
                        radius_meters: rule.radius_meters,
                    },
                )
            }
            MethodRow::Airdrop(drop) => (
                ClaimWindow::default(),
                drop.claim_count,
                None,
                MethodRule::Airdrop {
                    recipients: drop.recipients(),
                },
            ),
        };

        Ok(MethodSnapshot {
            method_id: self.method.id,
            disabled: self.method.disabled,
            deleted: self.method.deleted,
            window,
            claim_count,
            max_claims,
            rule,
        })
    }
}

pub struct ClaimProcessor<'a> {
    state: &'a AppState,
}

impl<'a> ClaimProcessor<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub async fn claim(
        &self,
        poap_id: i64,
        wallet_address: &str,
        submission: ClaimSubmission,
    ) -> Result<ClaimReceipt, ClaimError> {
        let wallet = sanitize_wallet_address(wallet_address)
            .map_err(|err| ClaimError::InvalidRequest(err.to_string()))?;
        let poap = self.load_poap(poap_id).await?;
        let resolved = self.resolve(poap.id, &submission).await?;
        let proof = submission.into_proof();

        let receipt = self.claim_resolved(&poap, &wallet, &resolved, &proof).await?;
        self.after_claims(poap.id).await?;
        Ok(receipt)
    }

    /// Claims on behalf of every listed wallet that has not claimed yet.
    pub async fn execute_airdrop(
        &self,
        poap_id: i64,
        method_id: i64,
    ) -> Result<AirdropExecutionView, ClaimError> {
        let poap = self.load_poap(poap_id).await?;
        let resolved = self
            .resolve(
                poap.id,
                &ClaimSubmission::Airdrop {
                    method_id: Some(method_id),
                },
            )
            .await?;
        let MethodRow::Airdrop(drop) = &resolved.row else {
            return Err(ClaimError::InvalidRequest(format!(
                "Distribution method {method_id} is not an airdrop"
            )));
        };
        if !resolved.method.is_active() {
            return Err(ClaimRejection::MethodUnavailable.into());
        }
        self.load_token(poap.id).await?;

        let recipients = drop.recipients();
        let mut results = Vec::with_capacity(recipients.len());
        for wallet in recipients {
            let result = match self
                .claim_resolved(&poap, &wallet, &resolved, &ClaimProof::Airdrop)
                .await
            {
                Ok(receipt) => AirdropRecipientResult {
                    wallet_address: wallet,
                    outcome: AirdropOutcome::Claimed,
                    transaction_signature: receipt.claim.transaction_signature,
                    reason: None,
                },
                Err(ClaimError::Rejected(rejection)) => AirdropRecipientResult {
                    wallet_address: wallet,
                    outcome: AirdropOutcome::Skipped,
                    transaction_signature: None,
                    reason: Some(rejection.to_string()),
                },
                Err(ClaimError::Transfer(err)) => AirdropRecipientResult {
                    wallet_address: wallet,
                    outcome: AirdropOutcome::Failed,
                    transaction_signature: None,
                    reason: Some(err.to_string()),
                },
                Err(err) => {
                    // Earlier recipients may already hold committed claims.
                    if let Err(refresh_err) = self.after_claims(poap.id).await {
                        warn!("Failed to refresh POAP {} after airdrop error: {refresh_err}", poap.id);
                    }
                    return Err(err);
                }
            };
            results.push(result);
        }

        self.after_claims(poap.id).await?;

        let count = |outcome: AirdropOutcome| {
            results
                .iter()
                .filter(|result| result.outcome == outcome)
                .count() as u64
        };
        let view = AirdropExecutionView {
            poap_id: poap.id,
            distribution_method_id: method_id,
            claimed: count(AirdropOutcome::Claimed),
            skipped: count(AirdropOutcome::Skipped),
            failed: count(AirdropOutcome::Failed),
            results,
        };
        info!(
            "Airdrop {method_id} for POAP {}: {} claimed, {} skipped, {} failed",
            poap.id, view.claimed, view.skipped, view.failed
        );
        Ok(view)
    }

    pub async fn resolve(
        &self,
        poap_id: i64,
        submission: &ClaimSubmission,
    ) -> Result<ResolvedMethod, ClaimError> {
        let db = &self.state.database;

        if let ClaimSubmission::Link { token } = submission {
            let token = token.trim();
            if token.is_empty() {
                return Err(ClaimError::InvalidRequest(
                    "Claim link token must not be empty".to_string(),
                ));
            }
            let link = claim_link::Entity::find()
                .filter(claim_link::Column::Token.eq(token))
                .one(db)
                .await?
                .ok_or_else(|| ClaimError::NotFound("Claim link not found".to_string()))?;
            let method = distribution_method::Entity::find_by_id(link.distribution_method_id)
                .one(db)
                .await?
                .filter(|method| method.poap_id == poap_id)
                .ok_or_else(|| ClaimError::NotFound("Claim link not found".to_string()))?;
            return Ok(ResolvedMethod {
                method,
                row: MethodRow::Link(link),
            });
        }

        let kind = submission.kind();
        let method = match submission.method_id() {
            Some(method_id) => distribution_method::Entity::find_by_id(method_id)
                .one(db)
                .await?
                .filter(|method| method.poap_id == poap_id)
                .ok_or_else(|| {
                    ClaimError::NotFound(format!("Distribution method {method_id} not found"))
                })?,
            None => {
                // Enabled methods first; a disabled one is still returned so
                // the claim is rejected as unavailable rather than not found.
                let candidates = distribution_method::Entity::find()
                    .filter(distribution_method::Column::PoapId.eq(poap_id))
                    .filter(distribution_method::Column::Kind.eq(kind))
                    .filter(distribution_method::Column::Deleted.eq(false));
                let enabled = candidates
                    .clone()
                    .filter(distribution_method::Column::Disabled.eq(false))
                    .order_by_desc(distribution_method::Column::Id)
                    .one(db)
                    .await?;
                let method = match enabled {
                    Some(method) => Some(method),
                    None => {
                        candidates
                            .order_by_desc(distribution_method::Column::Id)
                            .one(db)
                            .await?
                    }
                };
                method.ok_or_else(|| {
                    ClaimError::NotFound(format!(
                        "POAP {poap_id} has no {} distribution method",
                        kind.as_str()
                    ))
                })?
            }
        };

        let row = load_method_row(db, &method).await?;
        Ok(ResolvedMethod { method, row })
    }

    async fn claim_resolved(
        &self,
        poap: &poap::Model,
        wallet: &str,
        resolved: &ResolvedMethod,
        proof: &ClaimProof,
    ) -> Result<ClaimReceipt, ClaimError> {
        let db = &self.state.database;
        let now = Utc::now();

        let already_claimed = poap_claim::Entity::find_by_id((poap.id, wallet.to_string()))
            .one(db)
            .await?
            .is_some();
        let snapshot = resolved.snapshot()?;
        let eligibility = eligibility::evaluate(&snapshot, wallet, already_claimed, proof, now)?;
        let token = self.load_token(poap.id).await?;

        let txn = db.begin().await?;
        let claim = poap_claim::ActiveModel {
            poap_id: Set(poap.id),
            wallet_address: Set(wallet.to_string()),
            distribution_method_id: Set(resolved.method.id),
            method_kind: Set(resolved.method.kind),
            transaction_signature: Set(None),
            claimed_at: Set(now.fixed_offset()),
        }
        .insert(&txn)
        .await
        .map_err(map_claim_insert_error)?;

        reserve_slot(&txn, resolved, wallet, now.fixed_offset()).await?;

        let transfer = match self.state.minter.transfer(&token.mint_address, wallet).await {
            Ok(transfer) => transfer,
            Err(err) => {
                warn!(
                    "Transfer of POAP {} to {wallet} failed, rolling back claim: {err:#}",
                    poap.id
                );
                txn.rollback().await?;
                return Err(ClaimError::Transfer(err));
            }
        };

        let mut active = claim.into_active_model();
        active.transaction_signature = Set(Some(transfer.signature));
        let claim = active.update(&txn).await?;
        txn.commit().await?;

        info!(
            "POAP {} claimed by {wallet} via {} (method {})",
            poap.id,
            resolved.method.kind.as_str(),
            resolved.method.id
        );

        Ok(ClaimReceipt {
            claim,
            mint_address: token.mint_address,
            distance_meters: eligibility.distance_meters,
        })
    }

    async fn after_claims(&self, poap_id: i64) -> Result<(), ClaimError> {
        recompute_status(&self.state.database, poap_id).await?;
        self.state.cache.invalidate_poap(poap_id).await;
        Ok(())
    }

    async fn load_poap(&self, poap_id: i64) -> Result<poap::Model, ClaimError> {
        poap::Entity::find_by_id(poap_id)
            .one(&self.state.database)
            .await?
            .ok_or_else(|| ClaimError::NotFound(format!("POAP {poap_id} not found")))
    }

    async fn load_token(&self, poap_id: i64) -> Result<poap_token::Model, ClaimError> {
        poap_token::Entity::find_by_id(poap_id)
            .one(&self.state.database)
            .await?
            .ok_or(ClaimError::TokenMissing(poap_id))
    }
}

pub async fn load_method_row<C>(
    db: &C,
    method: &distribution_method::Model,
) -> Result<MethodRow, ClaimError>
where
    C: sea_orm::ConnectionTrait,
{
    let missing = || {
        ClaimError::Inconsistent(format!(
            "Distribution method {} has no {} settings",
            method.id,
            method.kind.as_str()
        ))
    };

    let row = match method.kind {
        MethodKind::ClaimLinks => {
            return Err(ClaimError::InvalidRequest(
                "Claim links are redeemed with their token".to_string(),
            ));
        }
        MethodKind::SecretWord => MethodRow::SecretWord(
            secret_word::Entity::find_by_id(method.id)
                .one(db)
                .await?
                .ok_or_else(missing)?,
        ),
        MethodKind::LocationBased => MethodRow::Location(
            location_rule::Entity::find_by_id(method.id)
                .one(db)
                .await?
                .ok_or_else(missing)?,
        ),
        MethodKind::Airdrop => MethodRow::Airdrop(
            airdrop::Entity::find_by_id(method.id)
                .one(db)
                .await?
                .ok_or_else(missing)?,
        ),
    };
    Ok(row)
}

/// Takes one unit of capacity from the method. Conditional updates keep
/// concurrent claims from overshooting `max_claims` or reusing a link.
async fn reserve_slot(
    txn: &DatabaseTransaction,
    resolved: &ResolvedMethod,
    wallet: &str,
    now: DateTime<FixedOffset>,
) -> Result<(), ClaimError> {
    match &resolved.row {
        MethodRow::Link(link) => {
            let updated = claim_link::Entity::update_many()
                .col_expr(claim_link::Column::Claimed, Expr::value(true))
                .col_expr(claim_link::Column::ClaimedBy, Expr::value(wallet.to_string()))
                .col_expr(claim_link::Column::ClaimedAt, Expr::value(now))
                .filter(claim_link::Column::Id.eq(link.id))
                .filter(claim_link::Column::Claimed.eq(false))
                .exec(txn)
                .await?;
            if updated.rows_affected == 0 {
                return Err(ClaimRejection::LinkAlreadyUsed.into());
            }
        }
        MethodRow::SecretWord(secret) => {
            let updated = secret_word::Entity::update_many()
                .col_expr(
                    secret_word::Column::ClaimCount,
                    Expr::col(secret_word::Column::ClaimCount).add(1),
                )
                .filter(secret_word::Column::DistributionMethodId.eq(secret.distribution_method_id))
                .filter(
                    Condition::any()
                        .add(secret_word::Column::MaxClaims.is_null())
                        .add(
                            Expr::col(secret_word::Column::ClaimCount)
                                .lt(Expr::col(secret_word::Column::MaxClaims)),
                        ),
                )
                .exec(txn)
                .await?;
            if updated.rows_affected == 0 {
                return Err(ClaimRejection::MaxClaimsReached {
                    max_claims: secret.max_claims.unwrap_or_default(),
                }
                .into());
            }
        }
        MethodRow::Location(rule) => {
            let updated = location_rule::Entity::update_many()
                .col_expr(
                    location_rule::Column::ClaimCount,
                    Expr::col(location_rule::Column::ClaimCount).add(1),
                )
                .filter(location_rule::Column::DistributionMethodId.eq(rule.distribution_method_id))
                .filter(
                    Condition::any()
                        .add(location_rule::Column::MaxClaims.is_null())
                        .add(
                            Expr::col(location_rule::Column::ClaimCount)
                                .lt(Expr::col(location_rule::Column::MaxClaims)),
                        ),
                )
                .exec(txn)
                .await?;
            if updated.rows_affected == 0 {
                return Err(ClaimRejection::MaxClaimsReached {
                    max_claims: rule.max_claims.unwrap_or_default(),
                }
                .into());
            }
        }
        MethodRow::Airdrop(drop) => {
            airdrop::Entity::update_many()
                .col_expr(
                    airdrop::Column::ClaimCount,
                    Expr::col(airdrop::Column::ClaimCount).add(1),
                )
                .filter(airdrop::Column::DistributionMethodId.eq(drop.distribution_method_id))
                .exec(txn)
                .await?;
        }
    }
    Ok(())
}

fn map_claim_insert_error(err: DbErr) -> ClaimError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ClaimRejection::AlreadyClaimed.into(),
        _ => ClaimError::Database(err),
    }
}

fn to_utc(value: DateTime<FixedOffset>) -> DateTime<Utc> {
    value.with_timezone(&Utc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::poap::PoapStatus;
    use crate::test_support::{
        MINT, insert_method, insert_poap, insert_secret_word, insert_token, setup_db, test_state,
    };
    use crate::wallet::tests::{ALICE, BOB, CAROL};
    use chrono::Duration;
    use sea_orm::ActiveValue::NotSet;
    use sea_orm::ConnectionTrait;

    fn word(word: &str) -> ClaimSubmission {
        ClaimSubmission::SecretWord {
            method_id: None,
            word: word.to_string(),
        }
    }

    #[tokio::test]
    async fn secret_word_claim_records_and_counts() {
        let db = setup_db().await;
        let poap = insert_poap(&db).await;
        insert_token(&db, poap.id).await;
        let method = insert_secret_word(&db, poap.id, "ferris", None).await;
        let (state, minter) = test_state(db.clone());

        let receipt = ClaimProcessor::new(&state)
            .claim(poap.id, ALICE, word("ferris"))
            .await
            .unwrap();

        assert_eq!(receipt.mint_address, MINT);
        assert_eq!(receipt.claim.wallet_address, ALICE);
        assert_eq!(receipt.claim.method_kind, MethodKind::SecretWord);
        assert_eq!(receipt.claim.transaction_signature.as_deref(), Some("sig-0"));
        assert_eq!(minter.transfer_count(), 1);

        let secret = secret_word::Entity::find_by_id(method.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(secret.claim_count, 1);

        let stored = poap::Entity::find_by_id(poap.id).one(&db).await.unwrap().unwrap();
        assert_eq!(stored.status, PoapStatus::Distributed);
    }

    #[tokio::test]
    async fn second_claim_is_rejected() {
        let db = setup_db().await;
        let poap = insert_poap(&db).await;
        insert_token(&db, poap.id).await;
        insert_secret_word(&db, poap.id, "ferris", None).await;
        let (state, minter) = test_state(db);
        let processor = ClaimProcessor::new(&state);

        processor.claim(poap.id, ALICE, word("ferris")).await.unwrap();
        let err = processor
            .claim(poap.id, ALICE, word("ferris"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ClaimError::Rejected(ClaimRejection::AlreadyClaimed)
        ));
        assert_eq!(minter.transfer_count(), 1);
    }

    #[tokio::test]
    async fn max_claims_stops_further_claims() {
        let db = setup_db().await;
        let poap = insert_poap(&db).await;
        insert_token(&db, poap.id).await;
        insert_secret_word(&db, poap.id, "ferris", Some(1)).await;
        let (state, _) = test_state(db);
        let processor = ClaimProcessor::new(&state);

        processor.claim(poap.id, ALICE, word("ferris")).await.unwrap();
        let err = processor
            .claim(poap.id, BOB, word("ferris"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ClaimError::Rejected(ClaimRejection::MaxClaimsReached { max_claims: 1 })
        ));
    }

    #[tokio::test]
    async fn failed_transfer_rolls_back() {
        let db = setup_db().await;
        let poap = insert_poap(&db).await;
        insert_token(&db, poap.id).await;
        let method = insert_secret_word(&db, poap.id, "ferris", None).await;
        let (state, minter) = test_state(db.clone());
        minter.fail_for(ALICE);

        let err = ClaimProcessor::new(&state)
            .claim(poap.id, ALICE, word("ferris"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::Transfer(_)));

        let claim = poap_claim::Entity::find_by_id((poap.id, ALICE.to_string()))
            .one(&db)
            .await
            .unwrap();
        assert!(claim.is_none());
        let secret = secret_word::Entity::find_by_id(method.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(secret.claim_count, 0);
    }

    #[tokio::test]
    async fn missing_token_blocks_claim() {
        let db = setup_db().await;
        let poap = insert_poap(&db).await;
        insert_secret_word(&db, poap.id, "ferris", None).await;
        let (state, _) = test_state(db);

        let err = ClaimProcessor::new(&state)
            .claim(poap.id, ALICE, word("ferris"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::TokenMissing(id) if id == poap.id));
    }

    #[tokio::test]
    async fn claim_link_is_single_use_and_expires() {
        let db = setup_db().await;
        let poap = insert_poap(&db).await;
        insert_token(&db, poap.id).await;
        let method = insert_method(&db, poap.id, MethodKind::ClaimLinks).await;
        for (token, expires_at) in [
            ("open-link", None),
            ("stale-link", Some(Utc::now() - Duration::hours(1))),
        ] {
            claim_link::ActiveModel {
                id: NotSet,
                distribution_method_id: Set(method.id),
                token: Set(token.to_string()),
                expires_at: Set(expires_at.map(|dt| dt.fixed_offset())),
                claimed: Set(false),
                claimed_by: Set(None),
                claimed_at: Set(None),
            }
            .insert(&db)
            .await
            .unwrap();
        }
        let (state, _) = test_state(db.clone());
        let processor = ClaimProcessor::new(&state);
        let link = |token: &str| ClaimSubmission::Link {
            token: token.to_string(),
        };

        processor.claim(poap.id, ALICE, link("open-link")).await.unwrap();
        let reused = processor
            .claim(poap.id, BOB, link("open-link"))
            .await
            .unwrap_err();
        assert!(matches!(
            reused,
            ClaimError::Rejected(ClaimRejection::LinkAlreadyUsed)
        ));

        let expired = processor
            .claim(poap.id, CAROL, link("stale-link"))
            .await
            .unwrap_err();
        assert!(matches!(
            expired,
            ClaimError::Rejected(ClaimRejection::Expired { .. })
        ));

        let stored = claim_link::Entity::find()
            .filter(claim_link::Column::Token.eq("open-link"))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.claimed);
        assert_eq!(stored.claimed_by.as_deref(), Some(ALICE));
    }

    #[tokio::test]
    async fn airdrop_execution_skips_existing_claims() {
        let db = setup_db().await;
        let poap = insert_poap(&db).await;
        insert_token(&db, poap.id).await;
        let method = insert_method(&db, poap.id, MethodKind::Airdrop).await;
        airdrop::ActiveModel {
            distribution_method_id: Set(method.id),
            addresses: Set(serde_json::json!([ALICE, BOB, CAROL])),
            claim_count: Set(0),
        }
        .insert(&db)
        .await
        .unwrap();
        let (state, minter) = test_state(db.clone());
        minter.fail_for(CAROL);
        let processor = ClaimProcessor::new(&state);

        processor
            .claim(poap.id, ALICE, ClaimSubmission::Airdrop { method_id: None })
            .await
            .unwrap();
        let view = processor.execute_airdrop(poap.id, method.id).await.unwrap();

        assert_eq!(view.claimed, 1);
        assert_eq!(view.skipped, 1);
        assert_eq!(view.failed, 1);
        assert_eq!(view.results[1].wallet_address, BOB);
        assert_eq!(view.results[1].outcome, AirdropOutcome::Claimed);

        let drop = airdrop::Entity::find_by_id(method.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(drop.claim_count, 2);
    }

    #[tokio::test]
    async fn disabled_newer_method_does_not_hide_enabled_one() {
        let db = setup_db().await;
        let poap = insert_poap(&db).await;
        insert_token(&db, poap.id).await;
        let older = insert_secret_word(&db, poap.id, "ferris", None).await;
        let newer = insert_secret_word(&db, poap.id, "corro", None).await;
        let mut active = newer.into_active_model();
        active.disabled = Set(true);
        active.update(&db).await.unwrap();
        let (state, _) = test_state(db);

        let receipt = ClaimProcessor::new(&state)
            .claim(poap.id, ALICE, word("ferris"))
            .await
            .unwrap();
        assert_eq!(receipt.claim.distribution_method_id, older.id);
    }

    #[tokio::test]
    async fn only_disabled_methods_reject_as_unavailable() {
        let db = setup_db().await;
        let poap = insert_poap(&db).await;
        insert_token(&db, poap.id).await;
        let method = insert_secret_word(&db, poap.id, "ferris", None).await;
        let mut active = method.into_active_model();
        active.disabled = Set(true);
        active.update(&db).await.unwrap();
        let (state, _) = test_state(db);

        let err = ClaimProcessor::new(&state)
            .claim(poap.id, ALICE, word("ferris"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClaimError::Rejected(ClaimRejection::MethodUnavailable)
        ));
    }

    #[tokio::test]
    async fn airdrop_database_error_still_refreshes_status() {
        let db = setup_db().await;
        let poap = insert_poap(&db).await;
        insert_token(&db, poap.id).await;
        let method = insert_method(&db, poap.id, MethodKind::Airdrop).await;
        airdrop::ActiveModel {
            distribution_method_id: Set(method.id),
            addresses: Set(serde_json::json!([ALICE, BOB])),
            claim_count: Set(0),
        }
        .insert(&db)
        .await
        .unwrap();
        db.execute_unprepared(&format!(
            "CREATE TRIGGER reject_bob BEFORE INSERT ON poap_claims \
             WHEN NEW.wallet_address = '{BOB}' \
             BEGIN SELECT RAISE(ABORT, 'write refused'); END;"
        ))
        .await
        .unwrap();
        let (state, minter) = test_state(db.clone());

        let err = ClaimProcessor::new(&state)
            .execute_airdrop(poap.id, method.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::Database(_)));
        assert_eq!(minter.transfer_count(), 1);

        let stored = poap::Entity::find_by_id(poap.id).one(&db).await.unwrap().unwrap();
        assert_eq!(stored.status, PoapStatus::Distributed);
    }

    #[tokio::test]
    async fn unknown_method_kind_is_not_found() {
        let db = setup_db().await;
        let poap = insert_poap(&db).await;
        let (state, _) = test_state(db);

        let err = ClaimProcessor::new(&state)
            .claim(poap.id, ALICE, ClaimSubmission::Airdrop { method_id: None })
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::NotFound(_)));
    }
}
