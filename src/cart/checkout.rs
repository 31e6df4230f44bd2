use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{
    Cart,
    shipping::{ShippingPolicy, ShippingStatus},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub city: String,
    pub notes: Option<String>,
}

impl CustomerInfo {
    /// Field-level problems that keep an order from being submitted.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.phone.trim().is_empty() {
            missing.push("phone");
        }
        if self.address.trim().is_empty() {
            missing.push("address");
        }
        if self.city.trim().is_empty() {
            missing.push("city");
        }
        missing
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CheckoutLine {
    pub product_id: i64,
    pub name: String,
    #[schema(value_type = f64)]
    pub unit_price: Decimal,
    pub quantity: u32,
    #[schema(value_type = f64)]
    pub line_total: Decimal,
}

/// Immutable snapshot of a cart at checkout time.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CheckoutPayload {
    pub customer: CustomerInfo,
    pub lines: Vec<CheckoutLine>,
    #[schema(value_type = f64)]
    pub subtotal: Decimal,
    pub shipping_status: ShippingStatus,
    #[schema(value_type = f64)]
    pub shipping_cost: Decimal,
    #[schema(value_type = f64)]
    pub total: Decimal,
}

impl CheckoutPayload {
    pub fn unit_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

/// Shipping is quoted against the customer's city.
pub fn build_checkout_payload(
    cart: &Cart,
    customer: CustomerInfo,
    policy: &ShippingPolicy,
) -> CheckoutPayload {
    let lines = cart
        .items()
        .iter()
        .map(|item| CheckoutLine {
            product_id: item.product_id,
            name: item.name.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
            line_total: item.line_total(),
        })
        .collect();

    let subtotal = cart.subtotal();
    let quote = policy.quote(Some(&customer.city), subtotal);

    CheckoutPayload {
        customer,
        lines,
        subtotal,
        shipping_status: quote.status(),
        shipping_cost: quote.amount(),
        total: subtotal + quote.amount(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cart::tests::snapshot;

    pub(crate) fn customer(city: &str) -> CustomerInfo {
        CustomerInfo {
            name: "Laura Gómez".into(),
            phone: "3001234567".into(),
            email: None,
            address: "Calle 5 # 38-25".into(),
            city: city.into(),
            notes: Some("Entregar en portería".into()),
        }
    }

    #[test]
    fn payload_snapshots_lines_and_totals() {
        let mut cart = Cart::new();
        cart.add_item(snapshot(1, 50_000));
        cart.add_item(snapshot(2, 30_000));
        cart.add_item(snapshot(2, 30_000));

        let payload = build_checkout_payload(&cart, customer("Cali"), &ShippingPolicy::default());

        assert_eq!(payload.lines.len(), 2);
        assert_eq!(payload.lines[1].quantity, 2);
        assert_eq!(payload.lines[1].line_total, Decimal::from(60_000));
        assert_eq!(payload.subtotal, Decimal::from(110_000));
        assert_eq!(payload.shipping_status, ShippingStatus::Local);
        assert_eq!(payload.shipping_cost, Decimal::from(5_000));
        assert_eq!(payload.total, Decimal::from(115_000));
        assert_eq!(payload.unit_count(), 3);
    }

    #[test]
    fn payload_is_detached_from_later_cart_changes() {
        let mut cart = Cart::new();
        cart.add_item(snapshot(1, 10_000));
        let payload =
            build_checkout_payload(&cart, customer("Bogota"), &ShippingPolicy::default());

        cart.clear();

        assert_eq!(payload.lines.len(), 1);
        assert_eq!(payload.total, Decimal::from(26_000));
    }

    #[test]
    fn missing_customer_fields_are_reported() {
        let mut info = customer("");
        info.phone = " ".into();
        assert_eq!(info.missing_fields(), vec!["phone", "city"]);
        assert!(customer("Cali").missing_fields().is_empty());
    }
}
