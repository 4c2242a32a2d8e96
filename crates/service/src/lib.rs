//! Service layer providing bill bookkeeping operations on top of models.
//! - Separates business logic from data access (`BillRepository`).
//! - Reuses the entity, status derivation and validators from `models`.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod pagination;
pub mod bill;
#[cfg(test)]
pub mod test_support;
