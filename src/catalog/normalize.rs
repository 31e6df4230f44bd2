//! Conversion of loosely-typed catalog rows into [`Product`].
//!
//! Rows arrive as JSON objects whose numeric columns may be numbers or
//! strings and whose flags may be booleans or `0`/`1`. This is the only place
//! those shapes are interpreted.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;

use crate::models::{Availability, CategoryRef, Product};

const SECONDARY_IMAGE_KEYS: [&str; 3] = ["image_2", "image_3", "image_4"];

/// Image references the admin UI writes when no file was uploaded.
const IMAGE_PLACEHOLDERS: [&str; 5] = ["null", "undefined", "none", "n/a", "-"];

#[derive(Debug, Error, PartialEq)]
pub enum RowError {
    #[error("row is not an object")]
    NotAnObject,

    #[error("missing or invalid `{0}`")]
    Missing(&'static str),

    #[error("negative `{field}`: {value}")]
    Negative { field: &'static str, value: Decimal },
}

pub fn product_from_row(row: &Value) -> Result<Product, RowError> {
    if !row.is_object() {
        return Err(RowError::NotAnObject);
    }

    let id = int_field(row, "id").ok_or(RowError::Missing("id"))?;
    let name = text_field(row, "name").ok_or(RowError::Missing("name"))?;

    let price = decimal_field(row, "price").unwrap_or(Decimal::ZERO);
    if price < Decimal::ZERO {
        return Err(RowError::Negative {
            field: "price",
            value: price,
        });
    }

    let on_offer = flag_field(row, "on_offer");
    let mut previous_price = decimal_field(row, "previous_price").filter(|p| !p.is_zero());
    if on_offer && previous_price.is_some_and(|p| p < price) {
        tracing::debug!(product_id = id, "previous price below current price ignored");
        previous_price = None;
    }

    let discount_percent = decimal_field(row, "discount_percent")
        .filter(|d| !d.is_zero())
        .or_else(|| derived_discount(price, previous_price));

    let availability = text_field(row, "availability")
        .and_then(|a| Availability::parse(&a))
        .unwrap_or_default();

    let category = match (
        int_field(row, "category_id"),
        text_field(row, "category_name"),
    ) {
        (Some(id), Some(name)) => Some(CategoryRef {
            id,
            slug: text_field(row, "category_slug").unwrap_or_else(|| slugify(&name)),
            name,
        }),
        _ => None,
    };

    let images = SECONDARY_IMAGE_KEYS
        .iter()
        .filter_map(|key| image_field(row, key))
        .collect();

    Ok(Product {
        id,
        name,
        description: text_field(row, "description"),
        price,
        previous_price,
        discount_percent,
        on_offer,
        availability,
        category,
        size: text_field(row, "size"),
        color: text_field(row, "color"),
        image: image_field(row, "image"),
        images,
        // Rows missing the column come from the active-only catalog query.
        active: row.get("active").is_none_or(|_| flag_field(row, "active")),
    })
}

/// Lowercase, ASCII-folded, hyphen-separated form of a category name.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.trim().to_lowercase().chars() {
        let ch = match ch {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            other => other,
        };
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

fn derived_discount(price: Decimal, previous: Option<Decimal>) -> Option<Decimal> {
    let previous = previous.filter(|p| *p > price && !p.is_zero())?;
    Some(((previous - price) / previous * Decimal::ONE_HUNDRED).round())
}

fn int_field(row: &Value, key: &str) -> Option<i64> {
    match row.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn decimal_field(row: &Value, key: &str) -> Option<Decimal> {
    match row.get(key)? {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Value::String(s) => {
            let s = s.trim();
            Decimal::from_str(s)
                .or_else(|_| Decimal::from_scientific(s))
                .ok()
        }
        _ => None,
    }
}

fn flag_field(row: &Value, key: &str) -> bool {
    match row.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => crate::catalog::filters::parse_flag(s),
        _ => false,
    }
}

fn text_field(row: &Value, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn image_field(row: &Value, key: &str) -> Option<String> {
    text_field(row, key).filter(|r| !is_placeholder(r))
}

fn is_placeholder(reference: &str) -> bool {
    let lower = reference.to_lowercase();
    IMAGE_PLACEHOLDERS.contains(&lower.as_str()) || lower.contains("placeholder")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn dec(v: &str) -> Decimal {
        Decimal::from_str(v).expect("decimal literal")
    }

    fn row() -> Value {
        json!({
            "id": 12,
            "category_id": 3,
            "name": "Camiseta Oversize",
            "description": "Algodón peinado",
            "price": "45000.00",
            "previous_price": "60000.00",
            "discount_percent": null,
            "on_offer": 1,
            "availability": "disponible",
            "size": "M",
            "color": "",
            "image": "camiseta.jpg",
            "image_2": "camiseta-2.jpg",
            "image_3": "",
            "image_4": "placeholder.png",
            "active": 1,
            "category_name": "Camisetas",
            "category_slug": "camisetas"
        })
    }

    #[test]
    fn coerces_strings_and_flags() {
        let product = product_from_row(&row()).expect("valid row");

        assert_eq!(product.id, 12);
        assert_eq!(product.price, dec("45000"));
        assert_eq!(product.previous_price, Some(dec("60000")));
        assert_eq!(product.discount_percent, Some(dec("25")));
        assert!(product.on_offer);
        assert!(product.active);
        assert_eq!(product.availability, Availability::Available);
        assert_eq!(product.color, None);
        assert_eq!(product.size.as_deref(), Some("M"));
        assert_eq!(
            product.category,
            Some(CategoryRef {
                id: 3,
                name: "Camisetas".into(),
                slug: "camisetas".into()
            })
        );
    }

    #[test]
    fn secondary_images_collapse_to_present_references() {
        let product = product_from_row(&row()).expect("valid row");
        assert_eq!(product.image.as_deref(), Some("camiseta.jpg"));
        assert_eq!(product.images, vec!["camiseta-2.jpg".to_string()]);

        let mut all = row();
        all["image_3"] = json!("c.jpg");
        all["image_4"] = json!("d.jpg");
        let product = product_from_row(&all).expect("valid row");
        assert_eq!(product.images, vec!["camiseta-2.jpg", "c.jpg", "d.jpg"]);
    }

    #[test]
    fn numeric_and_boolean_shapes_are_accepted() {
        let mut raw = row();
        raw["price"] = json!(45000);
        raw["on_offer"] = json!(true);
        raw["active"] = json!("0");
        raw["discount_percent"] = json!(10.5);
        raw["availability"] = json!("agotado");

        let product = product_from_row(&raw).expect("valid row");
        assert_eq!(product.price, dec("45000"));
        assert_eq!(product.discount_percent, Some(dec("10.5")));
        assert!(!product.active);
        assert_eq!(product.availability, Availability::SoldOut);
    }

    #[test]
    fn null_prices_default_to_zero() {
        let mut raw = row();
        raw["price"] = Value::Null;
        raw["previous_price"] = json!("not a number");
        raw["on_offer"] = json!(0);

        let product = product_from_row(&raw).expect("valid row");
        assert_eq!(product.price, Decimal::ZERO);
        assert_eq!(product.previous_price, None);
        assert_eq!(product.discount_percent, None);
        assert!(!product.on_offer);
    }

    #[test]
    fn inconsistent_offer_price_is_dropped() {
        let mut raw = row();
        raw["previous_price"] = json!("30000");

        let product = product_from_row(&raw).expect("valid row");
        assert_eq!(product.previous_price, None);
        assert_eq!(product.discount_percent, None);
    }

    #[test]
    fn rows_without_identity_or_with_negative_price_are_rejected() {
        let mut raw = row();
        raw["id"] = Value::Null;
        assert_eq!(product_from_row(&raw), Err(RowError::Missing("id")));

        let mut raw = row();
        raw["name"] = json!("  ");
        assert_eq!(product_from_row(&raw), Err(RowError::Missing("name")));

        let mut raw = row();
        raw["price"] = json!("-1");
        assert!(matches!(
            product_from_row(&raw),
            Err(RowError::Negative { field: "price", .. })
        ));

        assert_eq!(product_from_row(&json!([1, 2])), Err(RowError::NotAnObject));
    }

    #[test]
    fn slugify_folds_accents_and_spaces() {
        assert_eq!(slugify("Ropa Niños"), "ropa-ninos");
        assert_eq!(slugify("  Accesorios & Más  "), "accesorios-mas");
        assert_eq!(slugify("Zapatos"), "zapatos");
    }
}
