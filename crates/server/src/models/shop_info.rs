//! Shop identity shown in page headers and printed on invoices.

/// The shop's own details. Stored as a single database row and editable
/// from the settings page.
#[derive(Debug, Clone)]
pub struct ShopInfo {
    pub shop_name: String,
    pub address: String,
    pub phone: String,
    pub gstin: String,
    /// File name of the uploaded logo under the uploads directory.
    pub logo_filename: String,
}

impl Default for ShopInfo {
    fn default() -> Self {
        Self {
            shop_name: "Patidar Traders".to_owned(),
            address: "Mugaliya".to_owned(),
            phone: "1234567890".to_owned(),
            gstin: "GSTN000001".to_owned(),
            logo_filename: "logo.png".to_owned(),
        }
    }
}

/// Input from the settings form. The logo is handled separately because it
/// only changes when a new file is uploaded.
#[derive(Debug, Clone)]
pub struct ShopInfoUpdate {
    pub shop_name: String,
    pub address: String,
    pub phone: String,
    pub gstin: String,
    pub logo_filename: Option<String>,
}
