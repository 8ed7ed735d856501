use serde::Serialize;

/// Credits consumed by one successful recipe generation.
pub const RECIPE_GENERATION_COST: i64 = 5;

/// Balance assumed for users without a credits row yet.
pub const DEFAULT_NEW_USER_CREDITS: i64 = 10;

/// A purchasable credit bundle. The catalog is fixed at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricingPackage {
    pub id: &'static str,
    pub name: &'static str,
    pub credits: i64,
    pub recipes_count: i64,
    pub price_inr: u32,
    pub price_usd: f64,
    pub popular: bool,
}

pub const PRICING_PACKAGES: [PricingPackage; 3] = [
    PricingPackage {
        id: "starter",
        name: "Starter",
        credits: 50,
        recipes_count: 10,
        price_inr: 50,
        price_usd: 2.50,
        popular: false,
    },
    PricingPackage {
        id: "standard",
        name: "Standard",
        credits: 100,
        recipes_count: 20,
        price_inr: 100,
        price_usd: 5.00,
        popular: true,
    },
    PricingPackage {
        id: "pro",
        name: "Pro",
        credits: 500,
        recipes_count: 100,
        price_inr: 500,
        price_usd: 25.00,
        popular: false,
    },
];

pub fn find_package(id: &str) -> Option<&'static PricingPackage> {
    PRICING_PACKAGES.iter().find(|p| p.id == id)
}
