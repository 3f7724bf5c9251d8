//! # Domain Types
//!
//! Core domain types shared by the storefront, the POS terminal and the
//! service desk.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │   UserProfile   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id (GE-/POS-)  │   │  uid (phone)    │       │
//! │  │  name {en, bn}  │   │  items[]        │   │  accountId      │       │
//! │  │  pricePoisha    │   │  total / paid   │   │  role           │       │
//! │  │  stock          │   │  status         │   │  email          │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    SaleItem     │   │ ServiceRequest  │   │     Staff       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  snapshot of    │   │  kind, slot     │   │  skills         │       │
//! │  │  name + price   │   │  technicianId   │   │  availability   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Document Shape
//! Every type here is stored as one JSON document, keyed by its id, with
//! camelCase field names. Timestamps are epoch milliseconds.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::i18n::{Bilingual, Label, Language};
use crate::money::Money;

// =============================================================================
// Category
// =============================================================================

/// Fixed product categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    SolarPanel,
    Inverter,
    Battery,
    ChargeController,
    Lighting,
    Fan,
    Cable,
    SwitchSocket,
    Accessory,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::SolarPanel,
        Category::Inverter,
        Category::Battery,
        Category::ChargeController,
        Category::Lighting,
        Category::Fan,
        Category::Cable,
        Category::SwitchSocket,
        Category::Accessory,
    ];

    /// Display name in `lang`.
    pub fn label(self, lang: Language) -> &'static str {
        let (en, bn) = match self {
            Category::SolarPanel => ("Solar Panel", "সোলার প্যানেল"),
            Category::Inverter => ("Inverter / IPS", "ইনভার্টার / আইপিএস"),
            Category::Battery => ("Battery", "ব্যাটারি"),
            Category::ChargeController => ("Charge Controller", "চার্জ কন্ট্রোলার"),
            Category::Lighting => ("Lighting", "লাইট"),
            Category::Fan => ("Fan", "ফ্যান"),
            Category::Cable => ("Cable & Wire", "ক্যাবল ও তার"),
            Category::SwitchSocket => ("Switch & Socket", "সুইচ ও সকেট"),
            Category::Accessory => ("Accessory", "আনুষঙ্গিক"),
        };
        match lang {
            Language::En => en,
            Language::Bn => bn,
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Document key.
    pub id: String,

    pub name: Bilingual,

    #[serde(default)]
    pub description: Bilingual,

    /// Regular price in poisha.
    pub price_poisha: i64,

    /// Sale price in poisha. Zero is treated as "no discount".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_price_poisha: Option<i64>,

    /// Units on hand. Never negative.
    pub stock: i64,

    pub category: Category,

    #[serde(default)]
    pub is_best_seller: bool,

    #[serde(default)]
    pub is_offer: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Product {
    /// Regular price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_poisha(self.price_poisha)
    }

    /// The price a buyer pays: the discount price when present and
    /// non-zero, otherwise the regular price.
    pub fn effective_price(&self) -> Money {
        match self.discount_price_poisha {
            Some(discount) if discount > 0 => Money::from_poisha(discount),
            _ => self.price(),
        }
    }

    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// True when `code` names this product by barcode, SKU or id.
    ///
    /// ## User Workflow
    /// ```text
    /// Scanner / manual entry: "  8901234567890 "
    ///      │ trim
    ///      ▼
    /// barcode == code  ||  sku == code  ||  id == code
    /// ```
    pub fn matches_code(&self, code: &str) -> bool {
        let code = code.trim();
        if code.is_empty() {
            return false;
        }
        self.barcode.as_deref() == Some(code) || self.sku.as_deref() == Some(code) || self.id == code
    }

    /// Free-text match against both names, SKU, barcode and brand.
    /// `needle` must already be trimmed and lower-cased.
    pub fn matches_text(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        let field_matches = |field: &Option<String>| {
            field
                .as_deref()
                .map(|value| value.to_lowercase().contains(needle))
                .unwrap_or(false)
        };
        self.name.contains_lowercase(needle)
            || field_matches(&self.sku)
            || field_matches(&self.barcode)
            || field_matches(&self.brand)
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line of a sale or cart.
///
/// Name and unit price are snapshots taken when the line was created, so a
/// later catalog edit never rewrites history. The total is always
/// `quantity × unit price`: it is computed by the constructor, recomputed by
/// every quantity change, and re-checked when a stored document is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", try_from = "RawSaleItem")]
pub struct SaleItem {
    product_id: String,
    name: Bilingual,
    quantity: i64,
    unit_price_poisha: i64,
    total_price_poisha: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSaleItem {
    product_id: String,
    name: Bilingual,
    quantity: i64,
    unit_price_poisha: i64,
    total_price_poisha: i64,
}

impl TryFrom<RawSaleItem> for SaleItem {
    type Error = CoreError;

    fn try_from(raw: RawSaleItem) -> Result<Self, Self::Error> {
        let item = SaleItem::new(
            raw.product_id,
            raw.name,
            raw.quantity,
            Money::from_poisha(raw.unit_price_poisha),
        )?;
        if item.total_price_poisha != raw.total_price_poisha {
            return Err(ValidationError::InvalidFormat {
                field: "totalPricePoisha".to_string(),
                reason: format!(
                    "expected {} for {} x {}",
                    item.total_price_poisha, raw.quantity, raw.unit_price_poisha
                ),
            }
            .into());
        }
        Ok(item)
    }
}

impl SaleItem {
    /// Creates a line, computing its total.
    pub fn new(
        product_id: impl Into<String>,
        name: Bilingual,
        quantity: i64,
        unit_price: Money,
    ) -> CoreResult<Self> {
        crate::validation::validate_quantity(quantity)?;
        if unit_price.is_negative() {
            return Err(ValidationError::MustBePositive {
                field: "unitPricePoisha".to_string(),
            }
            .into());
        }
        Ok(SaleItem {
            product_id: product_id.into(),
            name,
            quantity,
            unit_price_poisha: unit_price.poisha(),
            total_price_poisha: unit_price.multiply_quantity(quantity).poisha(),
        })
    }

    /// Snapshot of `product` at its effective price.
    pub fn from_product(product: &Product, quantity: i64) -> CoreResult<Self> {
        SaleItem::new(
            product.id.clone(),
            product.name.clone(),
            quantity,
            product.effective_price(),
        )
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn name(&self) -> &Bilingual {
        &self.name
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        Money::from_poisha(self.unit_price_poisha)
    }

    pub fn total_price(&self) -> Money {
        Money::from_poisha(self.total_price_poisha)
    }

    /// Changes the quantity and recomputes the total.
    pub(crate) fn set_quantity(&mut self, quantity: i64) -> CoreResult<()> {
        crate::validation::validate_quantity(quantity)?;
        self.quantity = quantity;
        self.total_price_poisha = self.unit_price().multiply_quantity(quantity).poisha();
        Ok(())
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// Lifecycle of an order.
///
/// ```text
/// Pending ──► Processing ──► Shipped ──► Delivered
///    │            │             │
///    └────────────┴─────────────┴──────► Cancelled
/// ```
/// POS sales are created directly as `Delivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum SaleStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl SaleStatus {
    /// Delivered and Cancelled accept no further changes.
    pub fn is_final(self) -> bool {
        matches!(self, SaleStatus::Delivered | SaleStatus::Cancelled)
    }

    /// Forward moves along the delivery chain (skipping allowed), or a
    /// cancellation from any non-final status.
    pub fn can_advance_to(self, next: SaleStatus) -> bool {
        if self.is_final() {
            return false;
        }
        match next {
            SaleStatus::Cancelled => true,
            _ => next > self,
        }
    }

    pub fn label(self, lang: Language) -> &'static str {
        let (en, bn) = match self {
            SaleStatus::Pending => ("Pending", "অপেক্ষমাণ"),
            SaleStatus::Processing => ("Processing", "প্রক্রিয়াধীন"),
            SaleStatus::Shipped => ("Shipped", "পাঠানো হয়েছে"),
            SaleStatus::Delivered => ("Delivered", "সরবরাহ করা হয়েছে"),
            SaleStatus::Cancelled => ("Cancelled", "বাতিল"),
        };
        match lang {
            Language::En => en,
            Language::Bn => bn,
        }
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label(Language::En))
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Bkash,
    Nagad,
    Card,
    /// Paid to the courier on delivery; nothing is collected at checkout.
    CashOnDelivery,
    /// Partial payment; the operator enters what was collected.
    Due,
    /// POS only: several tenders add up to the paid amount.
    Split,
}

impl PaymentMethod {
    /// Methods that settle the whole total at once.
    pub fn pays_in_full(self) -> bool {
        matches!(
            self,
            PaymentMethod::Cash | PaymentMethod::Bkash | PaymentMethod::Nagad | PaymentMethod::Card
        )
    }

    pub fn label(self, lang: Language) -> &'static str {
        let (en, bn) = match self {
            PaymentMethod::Cash => ("Cash", "নগদ টাকা"),
            PaymentMethod::Bkash => ("bKash", "বিকাশ"),
            PaymentMethod::Nagad => ("Nagad", "নগদ"),
            PaymentMethod::Card => ("Card", "কার্ড"),
            PaymentMethod::CashOnDelivery => ("Cash on Delivery", "ক্যাশ অন ডেলিভারি"),
            PaymentMethod::Due => ("Partial / Due", "আংশিক / বাকি"),
            PaymentMethod::Split => ("Split", "একাধিক পদ্ধতি"),
        };
        match lang {
            Language::En => en,
            Language::Bn => bn,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label(Language::En))
    }
}

/// One method/amount pair of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Tender {
    pub method: PaymentMethod,
    pub amount_poisha: i64,
}

impl Tender {
    pub fn new(method: PaymentMethod, amount: Money) -> Self {
        Tender {
            method,
            amount_poisha: amount.poisha(),
        }
    }

    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_poisha(self.amount_poisha)
    }
}

// =============================================================================
// Customer snapshot
// =============================================================================

/// Where an online order is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryZone {
    /// Near tier.
    InsideCity,
    /// Far tier.
    OutsideCity,
}

/// Where a sale came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleChannel {
    Online,
    Pos,
}

/// Buyer details copied into the sale.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<DeliveryZone>,
}

// =============================================================================
// Sale
// =============================================================================

/// Everything needed to assemble a [`Sale`]; the totals are derived.
#[derive(Debug, Clone)]
pub(crate) struct SaleParts {
    pub id: String,
    pub customer: CustomerInfo,
    pub items: Vec<SaleItem>,
    pub discount: Money,
    pub delivery_fee: Money,
    pub paid: Money,
    pub payment_method: PaymentMethod,
    pub tenders: Vec<Tender>,
    pub channel: SaleChannel,
    pub status: SaleStatus,
    pub date: DateTime<Utc>,
}

/// A committed order, online or POS.
///
/// The amounts are only ever derived from the items, so a `Sale` value always
/// satisfies:
/// ```text
/// subtotal = Σ item totals
/// total    = subtotal − discount + deliveryFee   (never negative)
/// 0 ≤ paid ≤ total
/// due      = total − paid                        (stored, re-checked on load)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", try_from = "RawSale")]
pub struct Sale {
    id: String,
    customer: CustomerInfo,
    items: Vec<SaleItem>,
    subtotal_poisha: i64,
    discount_poisha: i64,
    delivery_fee_poisha: i64,
    total_poisha: i64,
    paid_poisha: i64,
    due_poisha: i64,
    payment_method: PaymentMethod,
    tenders: Vec<Tender>,
    channel: SaleChannel,
    status: SaleStatus,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    date: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSale {
    id: String,
    customer: CustomerInfo,
    items: Vec<SaleItem>,
    subtotal_poisha: i64,
    #[serde(default)]
    discount_poisha: i64,
    #[serde(default)]
    delivery_fee_poisha: i64,
    total_poisha: i64,
    paid_poisha: i64,
    /// Absent on documents written before the due amount was stored.
    #[serde(default)]
    due_poisha: Option<i64>,
    payment_method: PaymentMethod,
    #[serde(default)]
    tenders: Vec<Tender>,
    channel: SaleChannel,
    status: SaleStatus,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    date: DateTime<Utc>,
}

impl TryFrom<RawSale> for Sale {
    type Error = CoreError;

    fn try_from(raw: RawSale) -> Result<Self, Self::Error> {
        let sale = Sale::assemble(SaleParts {
            id: raw.id,
            customer: raw.customer,
            items: raw.items,
            discount: Money::from_poisha(raw.discount_poisha),
            delivery_fee: Money::from_poisha(raw.delivery_fee_poisha),
            paid: Money::from_poisha(raw.paid_poisha),
            payment_method: raw.payment_method,
            tenders: raw.tenders,
            channel: raw.channel,
            status: raw.status,
            date: raw.date,
        })?;
        if sale.subtotal_poisha != raw.subtotal_poisha || sale.total_poisha != raw.total_poisha {
            return Err(ValidationError::InvalidFormat {
                field: "totalPoisha".to_string(),
                reason: "stored totals do not match the items".to_string(),
            }
            .into());
        }
        if raw.due_poisha.is_some_and(|due| due != sale.due_poisha) {
            return Err(ValidationError::InvalidFormat {
                field: "duePoisha".to_string(),
                reason: "stored due does not match total and paid".to_string(),
            }
            .into());
        }
        Ok(sale)
    }
}

impl Sale {
    pub(crate) fn assemble(parts: SaleParts) -> CoreResult<Self> {
        if parts.items.is_empty() {
            return Err(CoreError::EmptySale);
        }
        if parts.discount.is_negative() {
            return Err(ValidationError::MustBePositive {
                field: "discount".to_string(),
            }
            .into());
        }
        if parts.delivery_fee.is_negative() {
            return Err(ValidationError::MustBePositive {
                field: "deliveryFee".to_string(),
            }
            .into());
        }
        if parts.paid.is_negative() {
            return Err(ValidationError::MustBePositive {
                field: "paid".to_string(),
            }
            .into());
        }

        let subtotal: Money = parts.items.iter().map(SaleItem::total_price).sum();
        if parts.discount > subtotal {
            return Err(CoreError::DiscountExceedsSubtotal {
                discount: parts.discount,
                subtotal,
            });
        }
        let total = subtotal - parts.discount + parts.delivery_fee;
        if parts.paid > total {
            return Err(CoreError::Overpayment {
                paid: parts.paid,
                total,
            });
        }

        Ok(Sale {
            id: parts.id,
            customer: parts.customer,
            items: parts.items,
            subtotal_poisha: subtotal.poisha(),
            discount_poisha: parts.discount.poisha(),
            delivery_fee_poisha: parts.delivery_fee.poisha(),
            total_poisha: total.poisha(),
            paid_poisha: parts.paid.poisha(),
            due_poisha: (total - parts.paid).floor_zero().poisha(),
            payment_method: parts.payment_method,
            tenders: parts.tenders,
            channel: parts.channel,
            status: parts.status,
            date: parts.date,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn customer(&self) -> &CustomerInfo {
        &self.customer
    }

    pub fn items(&self) -> &[SaleItem] {
        &self.items
    }

    pub fn subtotal(&self) -> Money {
        Money::from_poisha(self.subtotal_poisha)
    }

    pub fn discount(&self) -> Money {
        Money::from_poisha(self.discount_poisha)
    }

    pub fn delivery_fee(&self) -> Money {
        Money::from_poisha(self.delivery_fee_poisha)
    }

    pub fn total(&self) -> Money {
        Money::from_poisha(self.total_poisha)
    }

    pub fn paid(&self) -> Money {
        Money::from_poisha(self.paid_poisha)
    }

    /// Outstanding amount, `max(0, total − paid)`.
    pub fn due(&self) -> Money {
        Money::from_poisha(self.due_poisha)
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Method/amount breakdown of `paid`. A single-method sale carries one
    /// tender (or none when nothing was collected).
    pub fn tenders(&self) -> &[Tender] {
        &self.tenders
    }

    pub fn channel(&self) -> SaleChannel {
        self.channel
    }

    pub fn status(&self) -> SaleStatus {
        self.status
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Gives the sale a fresh id (order id collision at commit time).
    pub fn reassign_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Moves the sale to `next` when the lifecycle allows it.
    pub fn advance_status(&mut self, next: SaleStatus) -> CoreResult<()> {
        if !self.status.can_advance_to(next) {
            return Err(CoreError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }
}

// =============================================================================
// Users
// =============================================================================

/// Account roles. Customers and technicians register; admin and POS are
/// configured staff accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Technician,
    Admin,
    Pos,
}

impl Role {
    /// Roles open to self-registration.
    pub fn can_register(self) -> bool {
        matches!(self, Role::Customer | Role::Technician)
    }

    /// Account id prefix for registered roles.
    pub fn account_prefix(self) -> Option<&'static str> {
        match self {
            Role::Customer => Some("GE-C-"),
            Role::Technician => Some("GE-T-"),
            Role::Admin | Role::Pos => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Technician => "technician",
            Role::Admin => "admin",
            Role::Pos => "pos",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered customer or technician, keyed by phone number.
///
/// Password hashes are stored in a separate `credentials` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Phone number, also the document key.
    pub uid: String,
    /// `GE-C-xxxxx` or `GE-T-xxxxx`.
    pub account_id: String,
    pub role: Role,
    pub name: String,
    /// Stored lower-cased.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub created_at: DateTime<Utc>,
}

/// Editable subset of a profile. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

// =============================================================================
// Service desk
// =============================================================================

/// Kinds of on-site work; also the skill set of a technician.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    SolarInstallation,
    SolarMaintenance,
    InverterService,
    HouseWiring,
    ApplianceRepair,
    SafetyInspection,
}

impl ServiceKind {
    pub fn label(self, lang: Language) -> &'static str {
        let (en, bn) = match self {
            ServiceKind::SolarInstallation => ("Solar installation", "সোলার স্থাপন"),
            ServiceKind::SolarMaintenance => ("Solar maintenance", "সোলার রক্ষণাবেক্ষণ"),
            ServiceKind::InverterService => ("Inverter / IPS service", "ইনভার্টার / আইপিএস সার্ভিস"),
            ServiceKind::HouseWiring => ("House wiring", "বাড়ির ওয়্যারিং"),
            ServiceKind::ApplianceRepair => ("Appliance repair", "যন্ত্রপাতি মেরামত"),
            ServiceKind::SafetyInspection => ("Safety inspection", "নিরাপত্তা পরিদর্শন"),
        };
        match lang {
            Language::En => en,
            Language::Bn => bn,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
}

/// ```text
/// Pending ──► Assigned ──► InProgress ──► Completed
///    │           │            │
///    └───────────┴────────────┴─────────► Cancelled
/// ```
/// Re-assigning an `Assigned` request is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ServiceStatus {
    #[default]
    Pending,
    Assigned,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Cancelled,
}

impl ServiceStatus {
    pub fn is_final(self) -> bool {
        matches!(self, ServiceStatus::Completed | ServiceStatus::Cancelled)
    }

    pub fn can_advance_to(self, next: ServiceStatus) -> bool {
        use ServiceStatus::*;
        match (self, next) {
            (from, Cancelled) => !from.is_final(),
            (Pending, Assigned) | (Assigned, Assigned) => true,
            (Assigned, InProgress) | (InProgress, Completed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ServiceStatus::Pending => "Pending",
            ServiceStatus::Assigned => "Assigned",
            ServiceStatus::InProgress => "In Progress",
            ServiceStatus::Completed => "Completed",
            ServiceStatus::Cancelled => "Cancelled",
        };
        f.write_str(text)
    }
}

/// A booked on-site service visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub id: String,
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub kind: ServiceKind,
    /// Free-text problem description.
    #[serde(default)]
    pub problem: String,
    #[ts(as = "String")]
    pub preferred_date: NaiveDate,
    pub preferred_slot: TimeSlot,
    pub status: ServiceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technician_id: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub created_at: DateTime<Utc>,
}

impl ServiceRequest {
    /// Moves the request to `next` when the lifecycle allows it.
    pub fn advance_status(&mut self, next: ServiceStatus) -> CoreResult<()> {
        if !self.status.can_advance_to(next) {
            return Err(CoreError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    Technician,
    Cashier,
}

/// A staff member as the service desk sees them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub role: StaffRole,
    #[serde(default)]
    pub skills: BTreeSet<ServiceKind>,
    #[serde(default)]
    pub available: bool,
    /// Average customer rating, 0.0 to 5.0.
    #[serde(default)]
    pub rating: f32,
}

impl Staff {
    pub fn can_do(&self, kind: ServiceKind) -> bool {
        self.role == StaffRole::Technician && self.skills.contains(&kind)
    }
}

// =============================================================================
// Notices
// =============================================================================

/// A non-error outcome the terminal shows to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    OutOfStock,
    StockExceeded,
}

impl Notice {
    pub fn label(self) -> Label {
        match self {
            Notice::OutOfStock => Label::OutOfStock,
            Notice::StockExceeded => Label::StockExceeded,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
