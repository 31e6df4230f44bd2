use std::{env, str::FromStr};

use crate::cart::shipping::ShippingPolicy;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Store phone number that receives WhatsApp orders, digits only once normalized.
    pub whatsapp_number: String,
    pub shipping: ShippingPolicy,
    pub cart_ttl_minutes: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parsed_or("APP_PORT", 3000);
        let whatsapp_number = env::var("WHATSAPP_NUMBER").unwrap_or_default();

        let defaults = ShippingPolicy::default();
        let shipping = ShippingPolicy {
            free_shipping_threshold: parsed_or(
                "SHIPPING_FREE_THRESHOLD",
                defaults.free_shipping_threshold,
            ),
            local_city: env::var("SHIPPING_LOCAL_CITY")
                .ok()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(defaults.local_city),
            local_rate: parsed_or("SHIPPING_LOCAL_RATE", defaults.local_rate),
            national_rate: parsed_or("SHIPPING_NATIONAL_RATE", defaults.national_rate),
        };

        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            whatsapp_number,
            shipping,
            cart_ttl_minutes: parsed_or("CART_TTL_MINUTES", 120_i64).max(1),
        })
    }
}

fn parsed_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
