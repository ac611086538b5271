//! Orders service errors.

use farmstall::{
    identity::Forbidden,
    orders::{OrderStatus, TransitionError, ValidationError},
    pricing::PricingError,
    products::ProductUuid,
};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::retry::IsTransient;

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("only {available} of product {product} in stock, {requested} requested")]
    OutOfStock {
        product: ProductUuid,
        requested: u32,
        available: u32,
    },

    #[error("product {0} does not exist")]
    UnknownProduct(ProductUuid),

    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    #[error("order was expected to be {expected} but is now {actual}")]
    StatusConflict {
        expected: OrderStatus,
        actual: OrderStatus,
    },

    #[error(transparent)]
    Forbidden(#[from] Forbidden),

    #[error("order not found")]
    NotFound,

    #[error("order already exists")]
    AlreadyExists,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}

impl IsTransient for OrdersServiceError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Sql(error) => error.is_transient(),
            _ => false,
        }
    }
}
