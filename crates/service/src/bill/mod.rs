//! Bill module: three-layer architecture (domain, repository, service),
//! plus the CSV importer that feeds the same repository.

pub mod domain;
pub mod repository;
pub mod repo;
pub mod service;
pub mod csv_import;

pub use service::BillService;
