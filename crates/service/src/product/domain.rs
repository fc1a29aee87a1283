use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use models::product;

/// Product creation input; `quantity` starts at `initial_stock`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub unit: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub min_stock: i32,
    #[serde(default)]
    pub initial_stock: i32,
}

/// Partial update; absent fields are left untouched. `description: null`
/// clears the description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub product_id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    pub price: Option<Decimal>,
    pub min_stock: Option<i32>,
    pub quantity: Option<i32>,
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field (`None`).
fn present<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// `status` filter of the product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatus {
    #[default]
    All,
    /// `quantity > minStock`
    InStock,
    /// `quantity <= minStock`
    LowStock,
    /// `quantity == 0`
    OutOfStock,
}

impl StockStatus {
    pub fn matches(&self, p: &product::Model) -> bool {
        match self {
            StockStatus::All => true,
            StockStatus::InStock => !p.is_low_stock(),
            StockStatus::LowStock => p.is_low_stock(),
            StockStatus::OutOfStock => p.is_out_of_stock(),
        }
    }
}

/// Filters of `GET /products`; every supplied filter applies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub status: StockStatus,
}

impl ProductQuery {
    pub fn category(category: &str) -> Self {
        Self { category: Some(category.to_string()), ..Self::default() }
    }

    pub fn search(term: &str) -> Self {
        Self { search: Some(term.to_string()), ..Self::default() }
    }

    pub fn status(status: StockStatus) -> Self {
        Self { status, ..Self::default() }
    }

    /// Search term trimmed, or `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn category_name(&self) -> Option<&str> {
        self.category.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Low-stock views sort by quantity ascending, every other view by name.
    pub fn orders_by_quantity(&self) -> bool {
        self.status == StockStatus::LowStock
    }

    pub fn matches(&self, p: &product::Model) -> bool {
        if let Some(category) = self.category_name() {
            if p.category != category {
                return false;
            }
        }
        if let Some(term) = self.search_term() {
            let needle = term.to_lowercase();
            let hit = p.product_id.to_lowercase().contains(&needle)
                || p.name.to_lowercase().contains(&needle)
                || p.description.as_deref().is_some_and(|d| d.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        self.status.matches(p)
    }

    /// Same order the database listing uses: names compare case-insensitively.
    pub fn sort(&self, rows: &mut [product::Model]) {
        let by_name = |a: &product::Model, b: &product::Model| {
            a.name.to_lowercase().cmp(&b.name.to_lowercase()).then_with(|| a.name.cmp(&b.name))
        };
        if self.orders_by_quantity() {
            rows.sort_by(|a, b| a.quantity.cmp(&b.quantity).then_with(|| by_name(a, b)));
        } else {
            rows.sort_by(by_name);
        }
    }
}

/// Dashboard figures over all products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total_products: u64,
    pub low_stock: u64,
    pub out_of_stock: u64,
    pub total_quantity: i64,
    pub total_value: Decimal,
}

impl InventorySummary {
    pub fn from_products(rows: &[product::Model]) -> Self {
        rows.iter().fold(
            Self { total_products: 0, low_stock: 0, out_of_stock: 0, total_quantity: 0, total_value: Decimal::ZERO },
            |mut acc, p| {
                acc.total_products += 1;
                if p.is_low_stock() { acc.low_stock += 1; }
                if p.is_out_of_stock() { acc.out_of_stock += 1; }
                acc.total_quantity += i64::from(p.quantity);
                acc.total_value += p.price * Decimal::from(p.quantity);
                acc
            },
        )
    }
}
