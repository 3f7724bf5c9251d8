//! # Checkout Reconciliation
//!
//! Turns a cart plus payment and shipping inputs into an internally
//! consistent [`Sale`].
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Cart ──► subtotal ──┐                                                 │
//! │                       ├──► total = subtotal − discount + deliveryFee    │
//! │   Zone ──► fee ───────┘            │                                    │
//! │                                    ▼                                    │
//! │   Method ──────────────────► PaymentDraft                               │
//! │                               │ Cash/bKash/Nagad/Card → paid = total    │
//! │                               │ CashOnDelivery        → paid = 0        │
//! │                               │ Due                   → operator edits  │
//! │                               │ Split (POS)           → Σ tenders       │
//! │                               ▼                                         │
//! │                          due() = max(0, total − paid), read live        │
//! │                               │                                         │
//! │                               ▼                                         │
//! │                    build_online_sale() ──► Sale { status: Pending }     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{
    CustomerInfo, DeliveryZone, PaymentMethod, Sale, SaleChannel, SaleParts, SaleStatus, Tender,
};
use crate::validation::{normalize_email, normalize_phone, validate_text};

// =============================================================================
// Delivery fees
// =============================================================================

/// Two-tier flat delivery fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryFees {
    pub inside_city: Money,
    pub outside_city: Money,
}

impl Default for DeliveryFees {
    fn default() -> Self {
        DeliveryFees {
            inside_city: Money::from_taka(crate::DEFAULT_FEE_INSIDE_CITY_TAKA),
            outside_city: Money::from_taka(crate::DEFAULT_FEE_OUTSIDE_CITY_TAKA),
        }
    }
}

impl DeliveryFees {
    pub fn fee(&self, zone: DeliveryZone) -> Money {
        match zone {
            DeliveryZone::InsideCity => self.inside_city,
            DeliveryZone::OutsideCity => self.outside_city,
        }
    }
}

// =============================================================================
// Payment draft
// =============================================================================

/// The payment half of a checkout or POS form.
///
/// `paid` is only stored for methods that let the operator type it; for the
/// others it is derived from the method and the current total, and `due` is
/// always derived, so no read can see a stale value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDraft {
    total: Money,
    method: PaymentMethod,
    entered_paid: Money,
    tenders: Vec<Tender>,
}

impl PaymentDraft {
    pub fn new(total: Money, method: PaymentMethod) -> Self {
        PaymentDraft {
            total: total.floor_zero(),
            method,
            entered_paid: Money::zero(),
            tenders: Vec::new(),
        }
    }

    /// Switches method. Editable amounts start over from zero.
    pub fn select_method(&mut self, method: PaymentMethod) {
        if self.method != method {
            self.method = method;
            self.entered_paid = Money::zero();
            self.tenders.clear();
        }
    }

    /// Updates the total (cart edited, zone or discount changed).
    ///
    /// An operator-entered paid amount larger than the new total is clamped.
    pub fn set_total(&mut self, total: Money) {
        self.total = total.floor_zero();
        if self.entered_paid > self.total {
            self.entered_paid = self.total;
        }
    }

    /// Sets the collected amount. Only the `Due` method accepts this.
    pub fn set_paid(&mut self, paid: Money) -> CoreResult<()> {
        if self.method != PaymentMethod::Due {
            return Err(CoreError::PaidAmountLocked {
                method: self.method.to_string(),
            });
        }
        if paid.is_negative() {
            return Err(ValidationError::MustBePositive {
                field: "paid".to_string(),
            }
            .into());
        }
        if paid > self.total {
            return Err(CoreError::Overpayment {
                paid,
                total: self.total,
            });
        }
        self.entered_paid = paid;
        Ok(())
    }

    /// Sets the tenders of a split payment.
    ///
    /// Each tender must use a pay-in-full method with a positive amount, and
    /// together they may not exceed the total.
    pub fn set_tenders(&mut self, tenders: Vec<Tender>) -> CoreResult<()> {
        if self.method != PaymentMethod::Split {
            return Err(CoreError::PaidAmountLocked {
                method: self.method.to_string(),
            });
        }
        for tender in &tenders {
            if !tender.method.pays_in_full() {
                return Err(ValidationError::NotAllowed {
                    field: "tenders.method".to_string(),
                    allowed: ["cash", "bkash", "nagad", "card"]
                        .iter()
                        .map(|m| m.to_string())
                        .collect(),
                }
                .into());
            }
            if !tender.amount().is_positive() {
                return Err(ValidationError::MustBePositive {
                    field: "tenders.amount".to_string(),
                }
                .into());
            }
        }
        let paid: Money = tenders.iter().map(Tender::amount).sum();
        if paid > self.total {
            return Err(CoreError::Overpayment {
                paid,
                total: self.total,
            });
        }
        self.tenders = tenders;
        Ok(())
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn paid(&self) -> Money {
        match self.method {
            m if m.pays_in_full() => self.total,
            PaymentMethod::CashOnDelivery => Money::zero(),
            PaymentMethod::Due => self.entered_paid,
            PaymentMethod::Split => self.tenders.iter().map(Tender::amount).sum(),
            _ => Money::zero(),
        }
    }

    pub fn due(&self) -> Money {
        (self.total - self.paid()).floor_zero()
    }

    /// Method/amount breakdown of `paid()`.
    pub fn tenders(&self) -> Vec<Tender> {
        match self.method {
            PaymentMethod::Split => self.tenders.clone(),
            method => {
                let paid = self.paid();
                if paid.is_positive() {
                    vec![Tender::new(method, paid)]
                } else {
                    Vec::new()
                }
            }
        }
    }
}

// =============================================================================
// Quote
// =============================================================================

/// Every derived amount of a checkout or POS form, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub subtotal_poisha: i64,
    pub discount_poisha: i64,
    pub delivery_fee_poisha: i64,
    pub total_poisha: i64,
    pub paid_poisha: i64,
    pub due_poisha: i64,
}

impl Quote {
    pub fn new(subtotal: Money, discount: Money, delivery_fee: Money, payment: &PaymentDraft) -> Self {
        Quote {
            subtotal_poisha: subtotal.poisha(),
            discount_poisha: discount.poisha(),
            delivery_fee_poisha: delivery_fee.poisha(),
            total_poisha: payment.total().poisha(),
            paid_poisha: payment.paid().poisha(),
            due_poisha: payment.due().poisha(),
        }
    }
}

// =============================================================================
// Online checkout
// =============================================================================

/// What the storefront checkout form submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub customer: CustomerInfo,
    pub zone: DeliveryZone,
    pub payment_method: PaymentMethod,
    /// Only read when `payment_method` is `Due`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_poisha: Option<i64>,
}

/// Builds the payment draft for a checkout request against `cart`.
pub fn checkout_payment(
    cart: &Cart,
    request: &CheckoutRequest,
    fees: &DeliveryFees,
) -> CoreResult<PaymentDraft> {
    if request.payment_method == PaymentMethod::Split {
        return Err(ValidationError::NotAllowed {
            field: "paymentMethod".to_string(),
            allowed: vec![
                "cash".to_string(),
                "bkash".to_string(),
                "nagad".to_string(),
                "card".to_string(),
                "cash_on_delivery".to_string(),
                "due".to_string(),
            ],
        }
        .into());
    }

    let total = cart.subtotal() + fees.fee(request.zone);
    let mut payment = PaymentDraft::new(total, request.payment_method);
    if request.payment_method == PaymentMethod::Due {
        payment.set_paid(Money::from_poisha(request.paid_poisha.unwrap_or(0)))?;
    }
    Ok(payment)
}

/// Derived amounts for the checkout summary panel.
pub fn quote_checkout(
    cart: &Cart,
    request: &CheckoutRequest,
    fees: &DeliveryFees,
) -> CoreResult<Quote> {
    let payment = checkout_payment(cart, request, fees)?;
    Ok(Quote::new(
        cart.subtotal(),
        Money::zero(),
        fees.fee(request.zone),
        &payment,
    ))
}

/// Validates and normalizes the customer block of an online order.
fn checkout_customer(request: &CheckoutRequest) -> CoreResult<CustomerInfo> {
    let customer = &request.customer;
    validate_text("name", &customer.name, 100)?;
    validate_text("address", &customer.address, 300)?;
    let phone = normalize_phone(&customer.phone)?;
    let email = match customer.email.as_deref().map(str::trim) {
        Some(email) if !email.is_empty() => Some(normalize_email(email)?),
        _ => None,
    };

    Ok(CustomerInfo {
        name: customer.name.trim().to_string(),
        phone,
        email,
        address: customer.address.trim().to_string(),
        zone: Some(request.zone),
    })
}

/// Assembles an online order with status `Pending`.
///
/// ## Example
/// ```text
/// cart = [{price 100, qty 2}], zone = InsideCity (fee 60), Cash
///   → subtotal 200, total 260, paid 260, due 0
/// cart = same, Due with paid 100
///   → total 260, paid 100, due 160
/// ```
pub fn build_online_sale(
    id: impl Into<String>,
    cart: &Cart,
    request: &CheckoutRequest,
    fees: &DeliveryFees,
    now: DateTime<Utc>,
) -> CoreResult<Sale> {
    if cart.is_empty() {
        return Err(CoreError::EmptySale);
    }
    let customer = checkout_customer(request)?;
    let payment = checkout_payment(cart, request, fees)?;

    Sale::assemble(SaleParts {
        id: id.into(),
        customer,
        items: cart.items().to_vec(),
        discount: Money::zero(),
        delivery_fee: fees.fee(request.zone),
        paid: payment.paid(),
        payment_method: payment.method(),
        tenders: payment.tenders(),
        channel: SaleChannel::Online,
        status: SaleStatus::Pending,
        date: now,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Bilingual;
    use crate::types::{Category, Product};

    fn cart_with(price_taka: i64, qty: i64) -> Cart {
        let product = Product {
            id: "sp-100w".to_string(),
            name: Bilingual::new("Solar Panel 100W", "সোলার প্যানেল ১০০ ওয়াট"),
            description: Bilingual::default(),
            price_poisha: Money::from_taka(price_taka).poisha(),
            discount_price_poisha: None,
            stock: 10,
            category: Category::SolarPanel,
            is_best_seller: false,
            is_offer: false,
            sku: None,
            barcode: None,
            brand: None,
            image_url: None,
        };
        let mut cart = Cart::new();
        cart.add(&product, qty).unwrap();
        cart
    }

    fn request(method: PaymentMethod, paid: Option<i64>) -> CheckoutRequest {
        CheckoutRequest {
            customer: CustomerInfo {
                name: "Rahim Uddin".to_string(),
                phone: "01711000000".to_string(),
                email: Some("Rahim@Example.com".to_string()),
                address: "House 12, Road 3, Dhanmondi".to_string(),
                zone: None,
            },
            zone: DeliveryZone::InsideCity,
            payment_method: method,
            paid_poisha: paid,
        }
    }

    #[test]
    fn test_checkout_happy_path() {
        let cart = cart_with(100, 2);
        let sale = build_online_sale(
            "GE-100001",
            &cart,
            &request(PaymentMethod::Cash, None),
            &DeliveryFees::default(),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(sale.subtotal(), Money::from_taka(200));
        assert_eq!(sale.total(), Money::from_taka(260));
        assert_eq!(sale.paid(), Money::from_taka(260));
        assert_eq!(sale.due(), Money::zero());
        assert_eq!(sale.status(), SaleStatus::Pending);
        assert_eq!(sale.channel(), SaleChannel::Online);
        assert_eq!(sale.customer().email.as_deref(), Some("rahim@example.com"));
        assert_eq!(sale.tenders(), &[Tender::new(PaymentMethod::Cash, Money::from_taka(260))]);
    }

    #[test]
    fn test_checkout_partial_payment() {
        let cart = cart_with(100, 2);
        let req = request(PaymentMethod::Due, Some(Money::from_taka(100).poisha()));
        let sale =
            build_online_sale("GE-100002", &cart, &req, &DeliveryFees::default(), Utc::now()).unwrap();

        assert_eq!(sale.total(), Money::from_taka(260));
        assert_eq!(sale.due(), Money::from_taka(160));
    }

    #[test]
    fn test_checkout_rejects_overpayment() {
        let cart = cart_with(100, 2);
        let req = request(PaymentMethod::Due, Some(Money::from_taka(300).poisha()));
        let result = build_online_sale("GE-1", &cart, &req, &DeliveryFees::default(), Utc::now());
        assert!(matches!(result, Err(CoreError::Overpayment { .. })));
    }

    #[test]
    fn test_cash_on_delivery_and_far_zone() {
        let cart = cart_with(100, 2);
        let mut req = request(PaymentMethod::CashOnDelivery, None);
        req.zone = DeliveryZone::OutsideCity;
        let quote = quote_checkout(&cart, &req, &DeliveryFees::default()).unwrap();

        assert_eq!(quote.total_poisha, Money::from_taka(320).poisha());
        assert_eq!(quote.paid_poisha, 0);
        assert_eq!(quote.due_poisha, quote.total_poisha);
    }

    #[test]
    fn test_empty_cart_and_invalid_customer() {
        let req = request(PaymentMethod::Cash, None);
        let result = build_online_sale("GE-1", &Cart::new(), &req, &DeliveryFees::default(), Utc::now());
        assert!(matches!(result, Err(CoreError::EmptySale)));

        let mut req = request(PaymentMethod::Cash, None);
        req.customer.phone = "12345".to_string();
        let result = build_online_sale("GE-1", &cart_with(10, 1), &req, &DeliveryFees::default(), Utc::now());
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_payment_draft_tracks_total() {
        let mut draft = PaymentDraft::new(Money::from_taka(260), PaymentMethod::Bkash);
        assert_eq!(draft.paid(), Money::from_taka(260));

        draft.set_total(Money::from_taka(320));
        assert_eq!(draft.paid(), Money::from_taka(320));
        assert_eq!(draft.due(), Money::zero());
        assert!(matches!(
            draft.set_paid(Money::from_taka(10)),
            Err(CoreError::PaidAmountLocked { .. })
        ));
    }

    #[test]
    fn test_payment_draft_due_never_stale() {
        let mut draft = PaymentDraft::new(Money::from_taka(260), PaymentMethod::Due);
        draft.set_paid(Money::from_taka(100)).unwrap();
        assert_eq!(draft.due(), Money::from_taka(160));

        draft.set_total(Money::from_taka(200));
        assert_eq!(draft.due(), Money::from_taka(100));

        draft.set_total(Money::from_taka(50));
        assert_eq!(draft.paid(), Money::from_taka(50));
        assert_eq!(draft.due(), Money::zero());

        draft.select_method(PaymentMethod::CashOnDelivery);
        assert_eq!(draft.paid(), Money::zero());
        assert_eq!(draft.due(), Money::from_taka(50));
    }

    #[test]
    fn test_split_tenders() {
        let mut draft = PaymentDraft::new(Money::from_taka(1000), PaymentMethod::Split);
        draft
            .set_tenders(vec![
                Tender::new(PaymentMethod::Cash, Money::from_taka(600)),
                Tender::new(PaymentMethod::Bkash, Money::from_taka(300)),
            ])
            .unwrap();
        assert_eq!(draft.paid(), Money::from_taka(900));
        assert_eq!(draft.due(), Money::from_taka(100));
        assert_eq!(draft.tenders().len(), 2);

        let too_much = vec![Tender::new(PaymentMethod::Card, Money::from_taka(1001))];
        assert!(draft.set_tenders(too_much).is_err());

        let nested = vec![Tender::new(PaymentMethod::Due, Money::from_taka(1))];
        assert!(draft.set_tenders(nested).is_err());
        assert_eq!(draft.paid(), Money::from_taka(900));
    }

    #[test]
    fn test_split_not_offered_online() {
        let cart = cart_with(100, 1);
        let req = request(PaymentMethod::Split, None);
        assert!(quote_checkout(&cart, &req, &DeliveryFees::default()).is_err());
    }
}
