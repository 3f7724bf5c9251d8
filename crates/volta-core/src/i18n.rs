//! # Localization
//!
//! Every user-facing string exists in English and Bengali. A [`Language`]
//! flag picks one of the pair; the flag itself lives in a single process-wide
//! state object owned by the application layer (`volta-sync::state`).
//!
//! ```text
//! ┌──────────────────────────┐      ┌─────────────────────────────────┐
//! │ Bilingual { en, bn }     │      │ Label::OutOfStock               │
//! │  product names,          │      │  fixed UI messages, invoice     │
//! │  descriptions, store     │      │  headings, notices              │
//! │  name                    │      │                                 │
//! └────────────┬─────────────┘      └────────────────┬────────────────┘
//!              └──────────── .get(lang) / .text(lang) ┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Language
// =============================================================================

/// Display language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Bn,
}

impl Language {
    /// The other language (the header toggle).
    pub fn toggled(self) -> Self {
        match self {
            Language::En => Language::Bn,
            Language::Bn => Language::En,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Bn => "bn",
        }
    }

    /// Rewrites ASCII digits as Bengali digits when `self` is `Bn`.
    pub fn localize_digits(self, text: &str) -> String {
        match self {
            Language::En => text.to_string(),
            Language::Bn => text
                .chars()
                .map(|c| match c.to_digit(10) {
                    Some(d) if c.is_ascii_digit() => {
                        char::from_u32('০' as u32 + d).unwrap_or(c)
                    }
                    _ => c,
                })
                .collect(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "bn" | "bangla" | "bengali" => Ok(Language::Bn),
            _ => Err(ValidationError::NotAllowed {
                field: "language".to_string(),
                allowed: vec!["en".to_string(), "bn".to_string()],
            }),
        }
    }
}

// =============================================================================
// Bilingual text
// =============================================================================

/// A pair of parallel strings, one per language.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Bilingual {
    pub en: String,
    pub bn: String,
}

impl Bilingual {
    pub fn new(en: impl Into<String>, bn: impl Into<String>) -> Self {
        Bilingual {
            en: en.into(),
            bn: bn.into(),
        }
    }

    /// Returns the text for `lang`, falling back to English when the Bengali
    /// text was left empty by the admin.
    pub fn get(&self, lang: Language) -> &str {
        match lang {
            Language::Bn if !self.bn.trim().is_empty() => &self.bn,
            _ => &self.en,
        }
    }

    /// True when `needle` (already lower-cased) occurs in either language.
    pub fn contains_lowercase(&self, needle: &str) -> bool {
        self.en.to_lowercase().contains(needle) || self.bn.to_lowercase().contains(needle)
    }
}

// =============================================================================
// Labels
// =============================================================================

/// Fixed user-facing messages.
///
/// Services never build message strings themselves; they return errors or
/// notices that map onto one of these labels, and the caller renders it in
/// the active language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    // Auth
    InvalidCredentials,
    AlreadyRegistered,
    EmailInUse,
    PasswordTooShort,
    InvalidPhone,
    CheckFields,
    PermissionDenied,
    LoggedOut,
    // Catalog / POS
    OutOfStock,
    StockExceeded,
    ProductNotFound,
    DeleteCancelled,
    SaveFailed,
    // Checkout / orders
    CartEmpty,
    OrderPlaced,
    OrderFailedRetry,
    OrderNotFound,
    Overpayment,
    DiscountTooLarge,
    StatusChangeNotAllowed,
    RequestTimedOut,
    // Service desk
    ServiceBooked,
    ServiceNotFound,
    TechnicianNotFound,
    // Advisor
    AdvisorUnavailable,
    AdvisorApology,
    // Invoice
    Invoice,
    OrderId,
    Date,
    Customer,
    Phone,
    Address,
    Item,
    Qty,
    UnitPrice,
    Amount,
    Subtotal,
    Discount,
    DeliveryFee,
    Total,
    Paid,
    Due,
    PaymentMethod,
    Status,
    WalkInCustomer,
    ThankYou,
}

impl Label {
    /// Returns the text for `lang`.
    pub fn text(self, lang: Language) -> &'static str {
        let (en, bn) = self.pair();
        match lang {
            Language::En => en,
            Language::Bn => bn,
        }
    }

    fn pair(self) -> (&'static str, &'static str) {
        use Label::*;
        match self {
            InvalidCredentials => ("Invalid login ID or password", "লগইন আইডি বা পাসওয়ার্ড সঠিক নয়"),
            AlreadyRegistered => (
                "This phone number is already registered",
                "এই ফোন নম্বর দিয়ে আগেই নিবন্ধন করা হয়েছে",
            ),
            EmailInUse => ("This email is already in use", "এই ইমেইল আগেই ব্যবহার করা হয়েছে"),
            PasswordTooShort => (
                "Password must be at least 6 characters",
                "পাসওয়ার্ড কমপক্ষে ৬ অক্ষরের হতে হবে",
            ),
            InvalidPhone => ("Enter a valid mobile number", "সঠিক মোবাইল নম্বর লিখুন"),
            CheckFields => ("Please check the highlighted fields", "চিহ্নিত ঘরগুলো যাচাই করুন"),
            PermissionDenied => ("You are not allowed to do this", "আপনার এই কাজের অনুমতি নেই"),
            LoggedOut => ("You have been logged out", "আপনি লগআউট হয়েছেন"),
            OutOfStock => ("Out of stock", "স্টকে নেই"),
            StockExceeded => ("Not enough stock for this quantity", "এই পরিমাণের জন্য যথেষ্ট স্টক নেই"),
            ProductNotFound => ("Product not found", "পণ্য পাওয়া যায়নি"),
            DeleteCancelled => ("Delete cancelled", "মুছে ফেলা বাতিল করা হয়েছে"),
            SaveFailed => ("Could not save changes. Please try again", "পরিবর্তন সংরক্ষণ করা যায়নি। আবার চেষ্টা করুন"),
            CartEmpty => ("Your cart is empty", "আপনার কার্ট খালি"),
            OrderPlaced => ("Order placed successfully", "অর্ডার সফলভাবে সম্পন্ন হয়েছে"),
            OrderFailedRetry => (
                "Could not place the order. Your cart is saved, please try again",
                "অর্ডার করা যায়নি। আপনার কার্ট সংরক্ষিত আছে, আবার চেষ্টা করুন",
            ),
            OrderNotFound => ("No order found with this ID", "এই আইডিতে কোনো অর্ডার পাওয়া যায়নি"),
            Overpayment => ("Paid amount cannot exceed the total", "পরিশোধিত টাকা মোটের বেশি হতে পারে না"),
            DiscountTooLarge => ("Discount cannot exceed the subtotal", "ছাড় উপমোটের বেশি হতে পারে না"),
            StatusChangeNotAllowed => ("This status change is not allowed", "এই অবস্থা পরিবর্তন অনুমোদিত নয়"),
            RequestTimedOut => ("The server did not respond in time", "সার্ভার সময়মতো সাড়া দেয়নি"),
            ServiceBooked => ("Service request booked", "সার্ভিস অনুরোধ গ্রহণ করা হয়েছে"),
            ServiceNotFound => ("Service request not found", "সার্ভিস অনুরোধ পাওয়া যায়নি"),
            TechnicianNotFound => ("Technician not found", "টেকনিশিয়ান পাওয়া যায়নি"),
            AdvisorUnavailable => (
                "The solar advisor is not available right now. Please call our hotline",
                "সোলার পরামর্শদাতা এখন উপলব্ধ নয়। অনুগ্রহ করে আমাদের হটলাইনে কল করুন",
            ),
            AdvisorApology => (
                "Sorry, we could not get advice right now. Please try again later",
                "দুঃখিত, এই মুহূর্তে পরামর্শ পাওয়া যায়নি। পরে আবার চেষ্টা করুন",
            ),
            Invoice => ("INVOICE", "চালান"),
            OrderId => ("Order ID", "অর্ডার আইডি"),
            Date => ("Date", "তারিখ"),
            Customer => ("Customer", "গ্রাহক"),
            Phone => ("Phone", "ফোন"),
            Address => ("Address", "ঠিকানা"),
            Item => ("Item", "পণ্য"),
            Qty => ("Qty", "পরিমাণ"),
            UnitPrice => ("Unit price", "একক মূল্য"),
            Amount => ("Amount", "মূল্য"),
            Subtotal => ("Subtotal", "উপমোট"),
            Discount => ("Discount", "ছাড়"),
            DeliveryFee => ("Delivery fee", "ডেলিভারি চার্জ"),
            Total => ("Total", "সর্বমোট"),
            Paid => ("Paid", "পরিশোধিত"),
            Due => ("Due", "বাকি"),
            PaymentMethod => ("Payment method", "পেমেন্ট পদ্ধতি"),
            Status => ("Status", "অবস্থা"),
            WalkInCustomer => ("Walk-in Customer", "সাধারণ গ্রাহক"),
            ThankYou => ("Thank you for shopping with us", "আমাদের সাথে কেনাকাটার জন্য ধন্যবাদ"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
