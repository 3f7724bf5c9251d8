//! # POS Working Set
//!
//! The cashier's in-progress sale: lines bounded by stock, an optional
//! discount, and a payment captured across one or more methods.
//!
//! ## Counter Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Scan / type code ──► find_by_code() ──► add_to_sale()                  │
//! │                                            │                            │
//! │                     stock ≤ 0 ─────────────┼──► Notice::OutOfStock      │
//! │                     qty + 1 > stock ───────┼──► Notice::StockExceeded   │
//! │                                            ▼                            │
//! │  +/− buttons ──────► update_quantity() ─► clamp to [1, min(stock, cap)] │
//! │  Discount field ───► set_discount()                                     │
//! │  Payment panel ────► payment() ─────────► PaymentDraft                  │
//! │                                            │                            │
//! │                                            ▼                            │
//! │                     finalize() ─► Sale { status: Delivered, POS-… }     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{check_line_stock, deduct_lines};
use crate::checkout::{PaymentDraft, Quote};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::i18n::{Label, Language};
use crate::money::Money;
use crate::types::{
    Category, CustomerInfo, Notice, PaymentMethod, Product, Sale, SaleChannel, SaleItem,
    SaleParts, SaleStatus, Tender,
};
use crate::validation::{normalize_search_query, validate_line_count};
use crate::MAX_ITEM_QUANTITY;

/// Phone placeholder for walk-in sales.
pub const WALK_IN_PHONE: &str = "N/A";

// =============================================================================
// Catalog lookup
// =============================================================================

/// First catalog product whose barcode, SKU or id equals the trimmed code.
/// A miss is `None`, never an error.
pub fn find_by_code<'a>(catalog: &'a [Product], code: &str) -> Option<&'a Product> {
    catalog.iter().find(|product| product.matches_code(code))
}

/// Catalog filtered by free text (either language, SKU, barcode, brand) and
/// an optional category.
pub fn search<'a>(
    catalog: &'a [Product],
    query: &str,
    category: Option<Category>,
) -> CoreResult<Vec<&'a Product>> {
    let needle = normalize_search_query(query)?;
    Ok(catalog
        .iter()
        .filter(|product| category.map_or(true, |c| product.category == c))
        .filter(|product| product.matches_text(&needle))
        .collect())
}

// =============================================================================
// Working set
// =============================================================================

/// Result of [`WorkingSet::add_to_sale`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "notice")]
pub enum AddOutcome {
    Added,
    Incremented,
    Refused(Notice),
}

/// Payment inputs of the POS payment panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PosPayment {
    pub method: PaymentMethod,
    /// Read for `Due` only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_poisha: Option<i64>,
    /// Read for `Split` only.
    #[serde(default)]
    pub tenders: Vec<Tender>,
}

/// Optional buyer details typed at the counter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PosCustomer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

/// The POS "current sale".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct WorkingSet {
    lines: Vec<SaleItem>,
    discount_poisha: i64,
}

impl WorkingSet {
    pub fn new() -> Self {
        WorkingSet::default()
    }

    pub fn lines(&self) -> &[SaleItem] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(SaleItem::total_price).sum()
    }

    pub fn discount(&self) -> Money {
        Money::from_poisha(self.discount_poisha)
    }

    /// `subtotal − discount`, never negative.
    pub fn total(&self) -> Money {
        (self.subtotal() - self.discount()).floor_zero()
    }

    /// Adds one unit of `product`, bounded by its stock.
    ///
    /// A refused add leaves the working set untouched.
    pub fn add_to_sale(&mut self, product: &Product) -> CoreResult<AddOutcome> {
        if !product.in_stock() {
            return Ok(AddOutcome::Refused(Notice::OutOfStock));
        }

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product_id() == product.id)
        {
            let next = line.quantity() + 1;
            if next > product.stock {
                return Ok(AddOutcome::Refused(Notice::StockExceeded));
            }
            line.set_quantity(next)?;
            return Ok(AddOutcome::Incremented);
        }

        validate_line_count(self.lines.len())?;
        self.lines.push(SaleItem::from_product(product, 1)?);
        Ok(AddOutcome::Added)
    }

    /// Changes a line by `delta`, clamped to `[1, min(stock, MAX_ITEM_QUANTITY)]`.
    ///
    /// Returns the notice to show when the request was clamped at the stock
    /// ceiling. When the product has sold out since the line was added, the
    /// line is dropped and `OutOfStock` is returned.
    pub fn update_quantity(&mut self, product: &Product, delta: i64) -> CoreResult<Option<Notice>> {
        let index = self
            .lines
            .iter()
            .position(|line| line.product_id() == product.id)
            .ok_or_else(|| CoreError::ProductNotFound(product.id.clone()))?;

        if product.stock <= 0 {
            self.lines.remove(index);
            return Ok(Some(Notice::OutOfStock));
        }

        let line = &mut self.lines[index];
        let requested = line.quantity().saturating_add(delta);
        let clamped = requested.clamp(1, product.stock.min(MAX_ITEM_QUANTITY));
        line.set_quantity(clamped)?;

        Ok((requested > product.stock).then_some(Notice::StockExceeded))
    }

    pub fn remove_line(&mut self, product_id: &str) -> CoreResult<()> {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id() != product_id);
        if self.lines.len() == before {
            return Err(CoreError::ProductNotFound(product_id.to_string()));
        }
        Ok(())
    }

    pub fn set_discount(&mut self, discount: Money) -> CoreResult<()> {
        if discount.is_negative() {
            return Err(ValidationError::MustBePositive {
                field: "discount".to_string(),
            }
            .into());
        }
        self.discount_poisha = discount.poisha();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.discount_poisha = 0;
    }

    /// Re-checks every line against the current catalog.
    pub fn check_stock(&self, catalog: &[Product]) -> CoreResult<()> {
        check_line_stock(&self.lines, catalog)
    }

    /// Removes what `submitted` sold. Lines and a discount entered after the
    /// snapshot was taken stay in place.
    pub fn deduct(&mut self, submitted: &WorkingSet) {
        deduct_lines(&mut self.lines, &submitted.lines);
        if self.discount_poisha == submitted.discount_poisha || self.lines.is_empty() {
            self.discount_poisha = 0;
        }
    }

    /// Builds the payment draft for the panel inputs.
    pub fn payment(&self, input: &PosPayment) -> CoreResult<PaymentDraft> {
        if input.method == PaymentMethod::CashOnDelivery {
            return Err(ValidationError::NotAllowed {
                field: "paymentMethod".to_string(),
                allowed: vec![
                    "cash".to_string(),
                    "bkash".to_string(),
                    "nagad".to_string(),
                    "card".to_string(),
                    "due".to_string(),
                    "split".to_string(),
                ],
            }
            .into());
        }
        if self.discount() > self.subtotal() {
            return Err(CoreError::DiscountExceedsSubtotal {
                discount: self.discount(),
                subtotal: self.subtotal(),
            });
        }

        let mut draft = PaymentDraft::new(self.total(), input.method);
        match input.method {
            PaymentMethod::Due => {
                draft.set_paid(Money::from_poisha(input.paid_poisha.unwrap_or(0)))?;
            }
            PaymentMethod::Split => draft.set_tenders(input.tenders.clone())?,
            _ => {}
        }
        Ok(draft)
    }

    pub fn quote(&self, input: &PosPayment) -> CoreResult<Quote> {
        let payment = self.payment(input)?;
        Ok(Quote::new(self.subtotal(), self.discount(), Money::zero(), &payment))
    }

    /// Assembles the counter sale: status `Delivered`, no delivery fee, and
    /// walk-in placeholders for omitted customer fields.
    pub fn finalize(
        &self,
        id: impl Into<String>,
        customer: &PosCustomer,
        input: &PosPayment,
        now: DateTime<Utc>,
    ) -> CoreResult<Sale> {
        if self.is_empty() {
            return Err(CoreError::EmptySale);
        }
        let payment = self.payment(input)?;

        let name = customer.name.trim();
        let phone = customer.phone.trim();
        let customer = CustomerInfo {
            name: if name.is_empty() {
                Label::WalkInCustomer.text(Language::En).to_string()
            } else {
                name.to_string()
            },
            phone: if phone.is_empty() {
                WALK_IN_PHONE.to_string()
            } else {
                phone.to_string()
            },
            email: None,
            address: String::new(),
            zone: None,
        };

        Sale::assemble(SaleParts {
            id: id.into(),
            customer,
            items: self.lines.clone(),
            discount: self.discount(),
            delivery_fee: Money::zero(),
            paid: payment.paid(),
            payment_method: payment.method(),
            tenders: payment.tenders(),
            channel: SaleChannel::Pos,
            status: SaleStatus::Delivered,
            date: now,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
