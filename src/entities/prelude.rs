#![allow(unused_imports)]

pub use super::airdrop::Entity as Airdrop;
pub use super::claim_link::Entity as ClaimLink;
pub use super::distribution_method::Entity as DistributionMethod;
pub use super::location_rule::Entity as LocationRule;
pub use super::poap::Entity as Poap;
pub use super::poap_claim::Entity as PoapClaim;
pub use super::poap_token::Entity as PoapToken;
pub use super::secret_word::Entity as SecretWord;
