//! # Domain Types
//!
//! Core domain types used throughout Vitrine POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Customer     │   │      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  brand          │   │  tags           │   │  customer_id    │       │
//! │  │  stock_quantity │   │  total_spent    │   │  channel        │       │
//! │  │  cost / sale    │   │  last_purchase  │   │  items (snap.)  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │     Brand       │   │    Channel      │                             │
//! │  │  Natura / Avon  │   │  Physical       │ stock-backed, margin priced │
//! │  │  Outra          │   │  Online         │ catalog priced, commission  │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! Every record carries an `owner_id`; stores only ever return the
//! records of the owner they were opened for.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Tag applied to customers created without explicit tags.
pub const TAG_NEW: &str = "Novo";

/// Tag marking a best customer.
pub const TAG_VIP: &str = "VIP";

/// Tag marking a customer who stopped buying.
pub const TAG_INACTIVE: &str = "Inativo";

// =============================================================================
// Brand
// =============================================================================

/// Product brand. Anything not Natura or Avon is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Brand {
    Natura,
    Avon,
    #[default]
    #[serde(rename = "Outra")]
    Other,
}

impl Brand {
    pub const ALL: [Brand; 3] = [Brand::Natura, Brand::Avon, Brand::Other];

    /// Label as stored and shown.
    pub const fn label(&self) -> &'static str {
        match self {
            Brand::Natura => "Natura",
            Brand::Avon => "Avon",
            Brand::Other => "Outra",
        }
    }

    /// Parses a stored label. Unknown labels map to `Other`.
    pub fn from_label(label: &str) -> Brand {
        match label.trim() {
            "Natura" => Brand::Natura,
            "Avon" => Brand::Avon,
            _ => Brand::Other,
        }
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Channel
// =============================================================================

/// Sales channel.
///
/// ## Rules by Channel
/// ```text
///              Default price        Stock checked   Profit
/// PHYSICAL     cost × (1+margin)    yes             (subtotal − cost) − discount
/// ONLINE       catalog price        no              subtotal × commission − discount
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    #[default]
    Physical,
    Online,
}

impl Channel {
    /// Label as stored.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Channel::Physical => "PHYSICAL",
            Channel::Online => "ONLINE",
        }
    }

    /// Label shown to the seller.
    pub const fn label(&self) -> &'static str {
        match self {
            Channel::Physical => "Física (Estoque)",
            Channel::Online => "Online (Link)",
        }
    }

    pub fn parse(value: &str) -> Option<Channel> {
        match value {
            "PHYSICAL" => Some(Channel::Physical),
            "ONLINE" => Some(Channel::Online),
            _ => None,
        }
    }

    /// Whether sales on this channel consume physical stock.
    pub const fn is_stock_backed(&self) -> bool {
        matches!(self, Channel::Physical)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A cosmetic product in the owner's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owner this product belongs to.
    pub owner_id: String,

    pub name: String,

    pub brand: Brand,

    /// Free-form, optionally `"Category - Subcategory"`.
    pub category: String,

    /// Units on hand. Never negative.
    pub stock_quantity: u32,

    /// What the reseller pays per unit; also the online catalog price.
    pub cost_price: Money,

    /// Suggested retail price.
    pub sale_price: Money,

    /// Optional image reference (URL or data URI).
    pub image: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Splits `"Perfumaria - Masculino"` into category and subcategory.
    ///
    /// ## Example
    /// ```rust
    /// use vitrine_core::types::category_parts;
    ///
    /// assert_eq!(category_parts("Perfumaria - Masculino"), ("Perfumaria", Some("Masculino")));
    /// assert_eq!(category_parts("Maquiagem"), ("Maquiagem", None));
    /// ```
    pub fn category_parts(&self) -> (&str, Option<&str>) {
        category_parts(&self.category)
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.stock_quantity == 0
    }

    /// Suggested markup over cost, in the store currency.
    pub fn suggested_markup(&self) -> Money {
        self.sale_price - self.cost_price
    }
}

/// Separator between category and subcategory.
pub const CATEGORY_SEPARATOR: &str = " - ";

/// Splits a category on the first `" - "` separator.
pub fn category_parts(category: &str) -> (&str, Option<&str>) {
    match category.split_once(CATEGORY_SEPARATOR) {
        Some((parent, child)) => {
            let child = child.trim();
            (parent.trim(), (!child.is_empty()).then_some(child))
        }
        None => (category.trim(), None),
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub brand: Brand,
    pub category: String,
    pub stock_quantity: u32,
    pub cost_price: Money,
    pub sale_price: Money,
    pub image: Option<String>,
}

/// Partial product update. `None` leaves the field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub brand: Option<Brand>,
    pub category: Option<String>,
    pub stock_quantity: Option<u32>,
    pub cost_price: Option<Money>,
    pub sale_price: Option<Money>,
    pub image: Option<String>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self == &ProductPatch::default()
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer of the reseller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
    pub birth_date: Option<NaiveDate>,

    /// Labels such as "VIP", "Novo", "Inativo".
    pub tags: BTreeSet<String>,

    /// Sum of the totals charged across the customer's sales.
    pub total_spent: Money,

    /// Business date of the most recent sale.
    pub last_purchase_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Denormalized reference carried by a sale.
    pub fn to_ref(&self) -> CustomerRef {
        CustomerRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Just enough of a customer to attach it to a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRef {
    pub id: String,
    pub name: String,
}

/// Input for creating a customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
    pub birth_date: Option<NaiveDate>,

    /// Empty means `{"Novo"}`.
    pub tags: BTreeSet<String>,
}

impl NewCustomer {
    /// Tags the record will be created with.
    pub fn effective_tags(&self) -> BTreeSet<String> {
        if self.tags.is_empty() {
            BTreeSet::from([TAG_NEW.to_string()])
        } else {
            self.tags.clone()
        }
    }
}

/// Partial customer update, aggregate fields included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub tags: Option<BTreeSet<String>>,
    pub total_spent: Option<Money>,
    pub last_purchase_date: Option<NaiveDate>,
}

impl CustomerPatch {
    pub fn is_empty(&self) -> bool {
        self == &CustomerPatch::default()
    }
}

// =============================================================================
// Sale
// =============================================================================

/// One line of a recorded sale. Name and price are snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl SaleItem {
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

/// A recorded sale. Immutable once written.
///
/// ## Invariant
/// `total_amount = max(0, Σ quantity × unit_price − discount)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    pub owner_id: String,
    pub customer_id: String,

    /// Customer name at the time of sale.
    pub customer_name: String,

    /// Business date, which may differ from `created_at`.
    pub date: NaiveDate,

    pub channel: Channel,

    /// Amount charged after discount.
    pub total_amount: Money,

    /// Discount amount applied.
    pub discount: Money,

    /// Profit, negative for a loss.
    pub profit: Money,

    pub items: Vec<SaleItem>,

    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Sum of the line totals before discount.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(SaleItem::line_total).sum()
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// A sale ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSale {
    pub customer_id: String,
    pub customer_name: String,
    pub date: NaiveDate,
    pub channel: Channel,
    pub total_amount: Money,
    pub discount: Money,
    pub profit: Money,
    pub items: Vec<SaleItem>,
}

// =============================================================================
// Unit Tests
// =============================================================================
