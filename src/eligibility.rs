//! Claim eligibility rules shared by every distribution method.
//!
//! Evaluation is pure: callers load a [`MethodSnapshot`] from the database,
//! pair it with the submitted [`ClaimProof`] and get back either an
//! [`Eligibility`] or the first [`ClaimRejection`] that applies. Guards run
//! in a fixed order:
//!
//! 1. duplicate claim
//! 2. disabled or deleted method
//! 3. proof kind matches the method kind
//! 4. date window (not yet active, expired)
//! 5. max claims
//! 6. the kind-specific rule (link unused, secret word, geofence, airdrop list)

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::entities::distribution_method::MethodKind;
use crate::geo::{Coordinates, check_geofence};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClaimWindow {
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MethodRule {
    ClaimLink { claimed: bool },
    SecretWord { word: String },
    Location { center: Coordinates, radius_meters: f64 },
    Airdrop { recipients: Vec<String> },
}

impl MethodRule {
    pub fn kind(&self) -> MethodKind {
        match self {
            MethodRule::ClaimLink { .. } => MethodKind::ClaimLinks,
            MethodRule::SecretWord { .. } => MethodKind::SecretWord,
            MethodRule::Location { .. } => MethodKind::LocationBased,
            MethodRule::Airdrop { .. } => MethodKind::Airdrop,
        }
    }
}

/// State of one distribution method at the moment of the claim.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSnapshot {
    pub method_id: i64,
    pub disabled: bool,
    pub deleted: bool,
    pub window: ClaimWindow,
    pub claim_count: i32,
    pub max_claims: Option<i32>,
    pub rule: MethodRule,
}

impl MethodSnapshot {
    pub fn kind(&self) -> MethodKind {
        self.rule.kind()
    }
}

/// What the claimant submitted. Claim link tokens are resolved to their
/// link row before evaluation, so the link proof carries no payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimProof {
    ClaimLink,
    SecretWord { word: String },
    Location { position: Coordinates },
    Airdrop,
}

impl ClaimProof {
    pub fn kind(&self) -> MethodKind {
        match self {
            ClaimProof::ClaimLink => MethodKind::ClaimLinks,
            ClaimProof::SecretWord { .. } => MethodKind::SecretWord,
            ClaimProof::Location { .. } => MethodKind::LocationBased,
            ClaimProof::Airdrop => MethodKind::Airdrop,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Eligibility {
    /// Distance from the geofence centre, for location claims
    pub distance_meters: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClaimRejection {
    #[error("This wallet has already claimed this POAP")]
    AlreadyClaimed,
    #[error("This distribution method is not available")]
    MethodUnavailable,
    #[error("Submitted proof is for {submitted:?} but the method is {expected:?}")]
    WrongMethod {
        expected: MethodKind,
        submitted: MethodKind,
    },
    #[error("Claiming is not active yet, it opens at {starts_at}")]
    NotYetActive { starts_at: DateTime<Utc> },
    #[error("This distribution method expired at {ended_at}")]
    Expired { ended_at: DateTime<Utc> },
    #[error("Maximum number of claims reached ({max_claims})")]
    MaxClaimsReached { max_claims: i32 },
    #[error("This claim link has already been used")]
    LinkAlreadyUsed,
    #[error("Incorrect secret word")]
    IncorrectSecretWord,
    #[error("You are {distance_meters:.0}m away, claims are limited to {radius_meters:.0}m")]
    OutOfRange {
        distance_meters: f64,
        radius_meters: f64,
    },
    #[error("Wallet is not on the airdrop list")]
    NotOnAirdropList,
}

pub fn evaluate(
    snapshot: &MethodSnapshot,
    wallet: &str,
    already_claimed: bool,
    proof: &ClaimProof,
    now: DateTime<Utc>,
) -> Result<Eligibility, ClaimRejection> {
    if already_claimed {
        return Err(ClaimRejection::AlreadyClaimed);
    }

    if snapshot.disabled || snapshot.deleted {
        return Err(ClaimRejection::MethodUnavailable);
    }

    if proof.kind() != snapshot.kind() {
        return Err(ClaimRejection::WrongMethod {
            expected: snapshot.kind(),
            submitted: proof.kind(),
        });
    }

    check_window(&snapshot.window, now)?;
    check_capacity(snapshot.claim_count, snapshot.max_claims)?;

    match (&snapshot.rule, proof) {
        (MethodRule::ClaimLink { claimed }, ClaimProof::ClaimLink) => {
            if *claimed {
                return Err(ClaimRejection::LinkAlreadyUsed);
            }
            Ok(Eligibility::default())
        }
        (MethodRule::SecretWord { word }, ClaimProof::SecretWord { word: submitted }) => {
            if word != submitted.trim() {
                return Err(ClaimRejection::IncorrectSecretWord);
            }
            Ok(Eligibility::default())
        }
        (
            MethodRule::Location {
                center,
                radius_meters,
            },
            ClaimProof::Location { position },
        ) => {
            let check = check_geofence(*center, *radius_meters, *position);
            if !check.in_range {
                return Err(ClaimRejection::OutOfRange {
                    distance_meters: check.distance_meters,
                    radius_meters: check.radius_meters,
                });
            }
            Ok(Eligibility {
                distance_meters: Some(check.distance_meters),
            })
        }
        (MethodRule::Airdrop { recipients }, ClaimProof::Airdrop) => {
            if !recipients.iter().any(|recipient| recipient == wallet) {
                return Err(ClaimRejection::NotOnAirdropList);
            }
            Ok(Eligibility::default())
        }
        (rule, proof) => Err(ClaimRejection::WrongMethod {
            expected: rule.kind(),
            submitted: proof.kind(),
        }),
    }
}

pub fn check_window(window: &ClaimWindow, now: DateTime<Utc>) -> Result<(), ClaimRejection> {
    if let Some(starts_at) = window.starts_at {
        if now < starts_at {
            return Err(ClaimRejection::NotYetActive { starts_at });
        }
    }
    if let Some(ended_at) = window.ends_at {
        if now > ended_at {
            return Err(ClaimRejection::Expired { ended_at });
        }
    }
    Ok(())
}

pub fn check_capacity(claim_count: i32, max_claims: Option<i32>) -> Result<(), ClaimRejection> {
    match max_claims {
        Some(max_claims) if claim_count >= max_claims => {
            Err(ClaimRejection::MaxClaimsReached { max_claims })
        }
        _ => Ok(()),
    }
}
