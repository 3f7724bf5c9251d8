//! # Sales Reporting
//!
//! Daily summary of committed sales, split by payment method.
//!
//! ```text
//! sales (mirror) ──► filter: local date == day, status != Cancelled
//!                        │
//!                        ▼
//!             ┌──────────────────────┐
//!             │ SalesSummary         │
//!             │  orders, online, pos │
//!             │  gross / discount    │
//!             │  collected / due     │
//!             │  byMethod {cash: …}  │
//!             └──────────────────────┘
//! ```
//! Split payments are attributed tender by tender, so `byMethod` always adds
//! up to `collectedPoisha`.

use chrono::{FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::money::Money;
use crate::types::{PaymentMethod, Sale, SaleChannel, SaleStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    #[ts(as = "String")]
    pub day: NaiveDate,
    pub orders: u32,
    pub online_orders: u32,
    pub pos_orders: u32,
    pub gross_poisha: i64,
    pub discount_poisha: i64,
    pub collected_poisha: i64,
    pub due_poisha: i64,
    pub by_method: BTreeMap<PaymentMethod, i64>,
}

impl SalesSummary {
    fn empty(day: NaiveDate) -> Self {
        SalesSummary {
            day,
            orders: 0,
            online_orders: 0,
            pos_orders: 0,
            gross_poisha: 0,
            discount_poisha: 0,
            collected_poisha: 0,
            due_poisha: 0,
            by_method: BTreeMap::new(),
        }
    }

    pub fn gross(&self) -> Money {
        Money::from_poisha(self.gross_poisha)
    }

    pub fn collected(&self) -> Money {
        Money::from_poisha(self.collected_poisha)
    }

    pub fn due(&self) -> Money {
        Money::from_poisha(self.due_poisha)
    }
}

/// Summarizes the sales whose local date (at `offset`) is `day`.
pub fn summarize_day<'a, I>(sales: I, day: NaiveDate, offset: FixedOffset) -> SalesSummary
where
    I: IntoIterator<Item = &'a Sale>,
{
    let mut summary = SalesSummary::empty(day);

    for sale in sales {
        if sale.status() == SaleStatus::Cancelled {
            continue;
        }
        if sale.date().with_timezone(&offset).date_naive() != day {
            continue;
        }

        summary.orders += 1;
        match sale.channel() {
            SaleChannel::Online => summary.online_orders += 1,
            SaleChannel::Pos => summary.pos_orders += 1,
        }
        summary.gross_poisha += sale.total().poisha();
        summary.discount_poisha += sale.discount().poisha();
        summary.collected_poisha += sale.paid().poisha();
        summary.due_poisha += sale.due().poisha();

        for tender in sale.tenders() {
            *summary.by_method.entry(tender.method).or_insert(0) += tender.amount_poisha;
        }
    }

    summary
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Bilingual;
    use crate::invoice::local_offset;
    use crate::pos::{PosCustomer, PosPayment, WorkingSet};
    use crate::cart::Cart;
    use crate::checkout::{build_online_sale, CheckoutRequest, DeliveryFees};
    use crate::types::{Category, CustomerInfo, DeliveryZone, Product, Tender};
    use chrono::{TimeZone, Utc};

    fn product() -> Product {
        Product {
            id: "bat-100ah".to_string(),
            name: Bilingual::new("Battery 100Ah", "ব্যাটারি ১০০ এএইচ"),
            description: Bilingual::default(),
            price_poisha: Money::from_taka(1000).poisha(),
            discount_price_poisha: None,
            stock: 50,
            category: Category::Battery,
            is_best_seller: false,
            is_offer: false,
            sku: None,
            barcode: None,
            brand: None,
            image_url: None,
        }
    }

    fn pos_sale(id: &str, payment: PosPayment, hour_utc: u32) -> Sale {
        let mut set = WorkingSet::new();
        set.add_to_sale(&product()).unwrap();
        let date = Utc.with_ymd_and_hms(2024, 3, 1, hour_utc, 0, 0).unwrap();
        set.finalize(id, &PosCustomer::default(), &payment, date).unwrap()
    }

    fn cancelled_online_sale() -> Sale {
        let mut cart = Cart::new();
        cart.add(&product(), 1).unwrap();
        let request = CheckoutRequest {
            customer: CustomerInfo {
                name: "Karim".to_string(),
                phone: "01711000000".to_string(),
                email: None,
                address: "Uttara, Dhaka".to_string(),
                zone: None,
            },
            zone: DeliveryZone::InsideCity,
            payment_method: PaymentMethod::Bkash,
            paid_poisha: None,
        };
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 5, 0, 0).unwrap();
        let mut sale =
            build_online_sale("GE-3", &cart, &request, &DeliveryFees::default(), date).unwrap();
        sale.advance_status(SaleStatus::Cancelled).unwrap();
        sale
    }

    #[test]
    fn test_summary_by_method() {
        let cash = PosPayment {
            method: PaymentMethod::Cash,
            paid_poisha: None,
            tenders: Vec::new(),
        };
        let split = PosPayment {
            method: PaymentMethod::Split,
            paid_poisha: None,
            tenders: vec![
                Tender::new(PaymentMethod::Cash, Money::from_taka(300)),
                Tender::new(PaymentMethod::Bkash, Money::from_taka(500)),
            ],
        };
        let sales = vec![
            pos_sale("POS-1", cash, 4),
            pos_sale("POS-2", split, 6),
            cancelled_online_sale(),
        ];

        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let summary = summarize_day(&sales, day, local_offset());

        assert_eq!(summary.orders, 2);
        assert_eq!(summary.pos_orders, 2);
        assert_eq!(summary.gross(), Money::from_taka(2000));
        assert_eq!(summary.collected(), Money::from_taka(1800));
        assert_eq!(summary.due(), Money::from_taka(200));
        assert_eq!(summary.by_method[&PaymentMethod::Cash], Money::from_taka(1300).poisha());
        assert_eq!(summary.by_method[&PaymentMethod::Bkash], Money::from_taka(500).poisha());
    }

    #[test]
    fn test_summary_uses_local_day() {
        let cash = PosPayment {
            method: PaymentMethod::Cash,
            paid_poisha: None,
            tenders: Vec::new(),
        };
        // 20:00 UTC on Mar 1 is 02:00 on Mar 2 in Dhaka.
        let late = pos_sale("POS-9", cash, 20);
        let mar1 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mar2 = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();

        assert_eq!(summarize_day([&late], mar1, local_offset()).orders, 0);
        assert_eq!(summarize_day([&late], mar2, local_offset()).orders, 1);
    }
}
