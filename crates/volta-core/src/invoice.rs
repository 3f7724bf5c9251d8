//! # Invoice Rendering
//!
//! Plain-text invoice for any sale, in either language. The web front end
//! prints it as-is in a monospace block.
//!
//! ```text
//! ==========================================
//!              Volta Electric & Solar
//!       Road 5, Mirpur 10, Dhaka · 017…
//! ------------------------------------------
//! INVOICE
//! Order ID:        GE-482913
//! Date:            2024-03-01 14:05
//! ...
//! Item                 Qty        Amount
//! Solar Panel 200W       2      ৳200.00
//! ------------------------------------------
//! Subtotal                      ৳200.00
//! ...
//! ```

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::i18n::{Bilingual, Label, Language};
use crate::money::Money;
use crate::types::Sale;
use crate::LOCAL_UTC_OFFSET_SECS;

const WIDTH: usize = 42;

/// Store header printed on every invoice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoreInfo {
    pub name: Bilingual,
    pub address: Bilingual,
    pub phone: String,
}

/// Shop-local offset (Asia/Dhaka has no DST).
pub fn local_offset() -> FixedOffset {
    FixedOffset::east_opt(LOCAL_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

fn centered(out: &mut String, text: &str) {
    let len = text.chars().count();
    let pad = WIDTH.saturating_sub(len) / 2;
    let _ = writeln!(out, "{}{}", " ".repeat(pad), text);
}

fn field(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "{:<16} {}", format!("{}:", label), value);
}

fn amount_row(out: &mut String, lang: Language, label: &str, amount: Money) {
    let amount = lang.localize_digits(&amount.to_string());
    let _ = writeln!(out, "{:<28}{:>14}", label, amount);
}

/// Renders `sale` as a fixed-width text invoice in `lang`.
pub fn render_invoice(sale: &Sale, store: &StoreInfo, lang: Language) -> String {
    let mut out = String::new();
    let rule = "-".repeat(WIDTH);
    let text = |label: Label| label.text(lang);

    let _ = writeln!(out, "{}", "=".repeat(WIDTH));
    centered(&mut out, store.name.get(lang));
    centered(&mut out, store.address.get(lang));
    centered(&mut out, &lang.localize_digits(&store.phone));
    let _ = writeln!(out, "{}", rule);

    let _ = writeln!(out, "{}", text(Label::Invoice));
    field(&mut out, text(Label::OrderId), sale.id());
    let date = sale
        .date()
        .with_timezone(&local_offset())
        .format("%Y-%m-%d %H:%M")
        .to_string();
    field(&mut out, text(Label::Date), &lang.localize_digits(&date));

    let customer = sale.customer();
    field(&mut out, text(Label::Customer), &customer.name);
    field(&mut out, text(Label::Phone), &lang.localize_digits(&customer.phone));
    if !customer.address.is_empty() {
        field(&mut out, text(Label::Address), &customer.address);
    }
    field(&mut out, text(Label::Status), sale.status().label(lang));
    let _ = writeln!(out, "{}", rule);

    let _ = writeln!(
        out,
        "{:<24}{:>4}{:>14}",
        text(Label::Item),
        text(Label::Qty),
        text(Label::Amount)
    );
    for item in sale.items() {
        let name: String = item.name().get(lang).chars().take(23).collect();
        let _ = writeln!(
            out,
            "{:<24}{:>4}{:>14}",
            name,
            lang.localize_digits(&item.quantity().to_string()),
            lang.localize_digits(&item.total_price().to_string())
        );
        let _ = writeln!(
            out,
            "  @ {}",
            lang.localize_digits(&item.unit_price().to_string())
        );
    }
    let _ = writeln!(out, "{}", rule);

    amount_row(&mut out, lang, text(Label::Subtotal), sale.subtotal());
    if sale.discount().is_positive() {
        amount_row(&mut out, lang, text(Label::Discount), sale.discount());
    }
    if sale.delivery_fee().is_positive() {
        amount_row(&mut out, lang, text(Label::DeliveryFee), sale.delivery_fee());
    }
    amount_row(&mut out, lang, text(Label::Total), sale.total());
    amount_row(&mut out, lang, text(Label::Paid), sale.paid());
    amount_row(&mut out, lang, text(Label::Due), sale.due());

    let _ = writeln!(out, "{}", rule);
    field(
        &mut out,
        text(Label::PaymentMethod),
        sale.payment_method().label(lang),
    );
    if sale.tenders().len() > 1 {
        for tender in sale.tenders() {
            let _ = writeln!(
                out,
                "  {:<14}{:>14}",
                tender.method.label(lang),
                lang.localize_digits(&tender.amount().to_string())
            );
        }
    }
    let _ = writeln!(out, "{}", "=".repeat(WIDTH));
    centered(&mut out, text(Label::ThankYou));

    out
}

// =============================================================================
// Unit Tests
// =============================================================================
