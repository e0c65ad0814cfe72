pub mod prelude;

pub mod airdrop;
pub mod claim_link;
pub mod distribution_method;
pub mod location_rule;
pub mod poap;
pub mod poap_claim;
pub mod poap_token;
pub mod secret_word;
