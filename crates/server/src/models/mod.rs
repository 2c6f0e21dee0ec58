//! Domain models for the point of sale.

pub mod product;
pub mod sale;
pub mod session;
pub mod shop_info;
pub mod user;

pub use product::{NewProduct, Product};
pub use sale::{Payment, Sale, SaleItem, SaleLine, SaleSummary};
pub use session::CurrentUser;
pub use session::keys as session_keys;
pub use shop_info::{ShopInfo, ShopInfoUpdate};
pub use user::User;
