//! Business logic services for the point of sale.
//!
//! # Services
//!
//! - `auth` - Username/password authentication
//! - `csv_io` - Catalog import and CSV exports
//! - `invoice` - Invoice PDF rendering
//! - `sales` - Atomic checkout transaction

pub mod auth;
pub mod csv_io;
pub mod invoice;
pub mod sales;

pub use auth::{AuthError, AuthService};
pub use csv_io::{CsvError, ProductImport};
pub use invoice::{InvoiceContext, InvoiceError};
pub use sales::{CreatedSale, NewSale, NewSaleItem, SaleError, SaleService};
