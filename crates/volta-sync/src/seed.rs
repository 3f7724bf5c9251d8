//! Bootstrap catalog written into an empty product collection.

use volta_core::{Bilingual, Category, Money, Product};

#[allow(clippy::too_many_arguments)]
fn product(
    id: &str,
    en: &str,
    bn: &str,
    category: Category,
    price_taka: i64,
    discount_taka: Option<i64>,
    stock: i64,
    brand: &str,
    sku: &str,
    barcode: &str,
) -> Product {
    Product {
        id: id.to_string(),
        name: Bilingual::new(en, bn),
        description: Bilingual::default(),
        price_poisha: Money::from_taka(price_taka).poisha(),
        discount_price_poisha: discount_taka.map(|t| Money::from_taka(t).poisha()),
        stock,
        category,
        is_best_seller: false,
        is_offer: discount_taka.is_some(),
        sku: Some(sku.to_string()),
        barcode: Some(barcode.to_string()),
        brand: Some(brand.to_string()),
        image_url: None,
    }
}

/// The products every fresh store starts with, keyed by their designated ids.
pub fn bootstrap_products() -> Vec<Product> {
    let mut products = vec![
        product(
            "sp-mono-200w",
            "Monocrystalline Solar Panel 200W",
            "মনোক্রিস্টালাইন সোলার প্যানেল ২০০ ওয়াট",
            Category::SolarPanel,
            9_500,
            Some(8_900),
            25,
            "Rahimafrooz",
            "SP-200M",
            "8901000000011",
        ),
        product(
            "sp-poly-100w",
            "Polycrystalline Solar Panel 100W",
            "পলিক্রিস্টালাইন সোলার প্যানেল ১০০ ওয়াট",
            Category::SolarPanel,
            5_200,
            None,
            40,
            "Walton",
            "SP-100P",
            "8901000000028",
        ),
        product(
            "inv-ips-1000va",
            "IPS Inverter 1000VA",
            "আইপিএস ইনভার্টার ১০০০ ভিএ",
            Category::Inverter,
            18_500,
            None,
            12,
            "Luminous",
            "INV-1000",
            "8901000000035",
        ),
        product(
            "inv-hybrid-3kw",
            "Hybrid Solar Inverter 3kW",
            "হাইব্রিড সোলার ইনভার্টার ৩ কিলোওয়াট",
            Category::Inverter,
            42_000,
            Some(39_500),
            5,
            "Growatt",
            "INV-3KH",
            "8901000000042",
        ),
        product(
            "bat-tubular-150ah",
            "Tubular Battery 150Ah",
            "টিউবুলার ব্যাটারি ১৫০ অ্যাম্পিয়ার-আওয়ার",
            Category::Battery,
            16_800,
            None,
            18,
            "Hamko",
            "BAT-150T",
            "8901000000059",
        ),
        product(
            "cc-mppt-40a",
            "MPPT Charge Controller 40A",
            "এমপিপিটি চার্জ কন্ট্রোলার ৪০ অ্যাম্পিয়ার",
            Category::ChargeController,
            6_400,
            None,
            20,
            "EPEver",
            "CC-40M",
            "8901000000066",
        ),
        product(
            "led-bulb-12w",
            "LED Bulb 12W",
            "এলইডি বাল্ব ১২ ওয়াট",
            Category::Lighting,
            220,
            Some(190),
            300,
            "Super Star",
            "LED-12",
            "8901000000073",
        ),
        product(
            "led-tube-20w",
            "LED Tube Light 20W",
            "এলইডি টিউব লাইট ২০ ওয়াট",
            Category::Lighting,
            450,
            None,
            150,
            "Transtec",
            "LED-T20",
            "8901000000080",
        ),
        product(
            "fan-ceiling-56",
            "Ceiling Fan 56 inch",
            "সিলিং ফ্যান ৫৬ ইঞ্চি",
            Category::Fan,
            3_900,
            None,
            30,
            "GFC",
            "FAN-C56",
            "8901000000097",
        ),
        product(
            "fan-dc-solar-16",
            "Solar DC Table Fan 16 inch",
            "সোলার ডিসি টেবিল ফ্যান ১৬ ইঞ্চি",
            Category::Fan,
            2_600,
            None,
            24,
            "Walton",
            "FAN-DC16",
            "8901000000103",
        ),
        product(
            "cable-2.5rm-90m",
            "House Wiring Cable 2.5 rm (90 m coil)",
            "হাউজ ওয়্যারিং ক্যাবল ২.৫ আরএম (৯০ মিটার কয়েল)",
            Category::Cable,
            4_300,
            None,
            35,
            "BRB",
            "CBL-25-90",
            "8901000000110",
        ),
        product(
            "sw-gang-2",
            "2 Gang Switch",
            "২ গ্যাং সুইচ",
            Category::SwitchSocket,
            180,
            None,
            500,
            "MK",
            "SW-2G",
            "8901000000127",
        ),
        product(
            "sock-universal-13a",
            "Universal Socket 13A",
            "ইউনিভার্সাল সকেট ১৩ অ্যাম্পিয়ার",
            Category::SwitchSocket,
            240,
            None,
            400,
            "Click",
            "SK-13U",
            "8901000000134",
        ),
        product(
            "acc-mc4-pair",
            "MC4 Connector Pair",
            "এমসি৪ কানেক্টর জোড়া",
            Category::Accessory,
            150,
            None,
            600,
            "Staubli",
            "ACC-MC4",
            "8901000000141",
        ),
    ];

    for id in ["sp-mono-200w", "inv-ips-1000va", "led-bulb-12w", "fan-ceiling-56"] {
        if let Some(p) = products.iter_mut().find(|p| p.id == id) {
            p.is_best_seller = true;
        }
    }
    products
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use volta_core::validation::validate_product;

    #[test]
    fn test_bootstrap_products_are_valid_and_unique() {
        let products = bootstrap_products();
        let ids: HashSet<&str> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), products.len());

        for product in &products {
            validate_product(product).unwrap();
            assert!(!product.name.bn.is_empty());
        }
    }

    #[test]
    fn test_every_category_is_stocked() {
        let products = bootstrap_products();
        for category in Category::ALL {
            assert!(products.iter().any(|p| p.category == category), "{:?}", category);
        }
    }
}
