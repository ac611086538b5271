//! Farmstall Domain Concerns

pub mod checkout;
pub mod orders;
pub mod products;
pub mod profiles;
