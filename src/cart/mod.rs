//! Shopping cart engine.
//!
//! A [`Cart`] is an ordered list of line items, unique by product id, whose
//! quantities are always at least one. Totals are derived on every read and
//! never stored.

pub mod checkout;
pub mod shipping;
pub mod store;
pub mod whatsapp;

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Product;

use self::shipping::{ShippingPolicy, ShippingQuote};

/// Upper bound on the quantity of a single cart line.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// Display fields copied from a product at the moment it enters the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSnapshot {
    pub product_id: i64,
    pub name: String,
    pub unit_price: Decimal,
    pub image: Option<String>,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            image: product.image.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CartLineItem {
    pub product_id: i64,
    pub name: String,
    #[schema(value_type = f64)]
    pub unit_price: Decimal,
    pub image: Option<String>,
    pub quantity: u32,
}

impl CartLineItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities across all lines.
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn quantity_of(&self, product_id: i64) -> Option<u32> {
        self.line(product_id).map(|i| i.quantity)
    }

    /// Adds one unit of the product, appending a new line the first time it is seen.
    /// A line already at [`MAX_LINE_QUANTITY`] stays there.
    pub fn add_item(&mut self, product: impl Into<ProductSnapshot>) {
        let product = product.into();
        match self.line_mut(product.product_id) {
            Some(line) => line.quantity = bumped(line.quantity),
            None => self.items.push(CartLineItem {
                product_id: product.product_id,
                name: product.name,
                unit_price: product.unit_price,
                image: product.image,
                quantity: 1,
            }),
        }
    }

    /// Returns `false` without touching the cart when the product has no line.
    /// Quantities stop at [`MAX_LINE_QUANTITY`]; the call still reports the line as found.
    pub fn increase_quantity(&mut self, product_id: i64) -> bool {
        match self.line_mut(product_id) {
            Some(line) => {
                line.quantity = bumped(line.quantity);
                true
            }
            None => false,
        }
    }

    /// Removes the line once its quantity would drop to zero.
    /// Returns `false` when the product has no line.
    pub fn decrease_quantity(&mut self, product_id: i64) -> bool {
        let Some(index) = self.position(product_id) else {
            return false;
        };
        let line = &mut self.items[index];
        if line.quantity <= 1 {
            self.items.remove(index);
        } else {
            line.quantity -= 1;
        }
        true
    }

    /// Returns `false` when the product has no line.
    pub fn remove_item(&mut self, product_id: i64) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Folds `other` into this cart: shared products add their quantities
    /// (capped), new products are appended in `other`'s order.
    pub fn merge(&mut self, other: Cart) {
        for incoming in other.items {
            match self.line_mut(incoming.product_id) {
                Some(line) => {
                    line.quantity = line
                        .quantity
                        .saturating_add(incoming.quantity)
                        .min(MAX_LINE_QUANTITY);
                }
                None => self.items.push(incoming),
            }
        }
    }

    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    pub fn shipping(&self, policy: &ShippingPolicy, city: Option<&str>) -> ShippingQuote {
        policy.quote(city, self.subtotal())
    }

    pub fn total(&self, policy: &ShippingPolicy, city: Option<&str>) -> Decimal {
        let subtotal = self.subtotal();
        subtotal + policy.quote(city, subtotal).amount()
    }

    fn position(&self, product_id: i64) -> Option<usize> {
        self.items.iter().position(|i| i.product_id == product_id)
    }

    fn line(&self, product_id: i64) -> Option<&CartLineItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    fn line_mut(&mut self, product_id: i64) -> Option<&mut CartLineItem> {
        self.items.iter_mut().find(|i| i.product_id == product_id)
    }
}

fn bumped(quantity: u32) -> u32 {
    quantity.saturating_add(1).min(MAX_LINE_QUANTITY)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashSet;

    use super::*;

    pub(crate) fn snapshot(id: i64, price: i64) -> ProductSnapshot {
        ProductSnapshot {
            product_id: id,
            name: format!("Producto {id}"),
            unit_price: Decimal::from(price),
            image: None,
        }
    }

    fn assert_invariants(cart: &Cart) {
        let mut seen = HashSet::new();
        for line in cart.items() {
            assert!(line.quantity >= 1, "line {} has quantity 0", line.product_id);
            assert!(line.quantity <= MAX_LINE_QUANTITY, "line {} over cap", line.product_id);
            assert!(seen.insert(line.product_id), "duplicate line {}", line.product_id);
        }
    }

    #[test]
    fn add_item_merges_repeated_products() {
        let mut cart = Cart::new();
        cart.add_item(snapshot(1, 50_000));
        cart.add_item(snapshot(2, 30_000));
        cart.add_item(snapshot(1, 50_000));

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.quantity_of(1), Some(2));
        assert_eq!(cart.quantity_of(2), Some(1));
        assert_eq!(cart.items()[0].product_id, 1);
    }

    #[test]
    fn decrease_removes_line_at_zero() {
        let mut cart = Cart::new();
        cart.add_item(snapshot(7, 1_000));
        cart.add_item(snapshot(7, 1_000));

        assert!(cart.decrease_quantity(7));
        assert_eq!(cart.quantity_of(7), Some(1));
        assert!(cart.decrease_quantity(7));
        assert_eq!(cart.quantity_of(7), None);
        assert!(cart.is_empty());
    }

    #[test]
    fn mutating_missing_lines_is_a_no_op() {
        let mut cart = Cart::new();
        cart.add_item(snapshot(1, 1_000));
        let before = cart.clone();

        assert!(!cart.increase_quantity(99));
        assert!(!cart.decrease_quantity(99));
        assert!(!cart.remove_item(99));
        assert_eq!(cart, before);
    }

    #[test]
    fn arbitrary_mutation_sequences_keep_invariants() {
        let mut cart = Cart::new();
        // Deterministic pseudo-random walk over four products.
        let mut seed: u64 = 0x2545_f491;
        for _ in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let product = (seed % 4) as i64 + 1;
            match (seed >> 8) % 4 {
                0 => cart.add_item(snapshot(product, 1_000 * product)),
                1 => {
                    cart.increase_quantity(product);
                }
                2 => {
                    cart.decrease_quantity(product);
                }
                _ => {
                    cart.remove_item(product);
                }
            }
            assert_invariants(&cart);
            assert!(cart.subtotal() >= Decimal::ZERO);
        }
    }

    #[test]
    fn subtotal_ignores_insertion_order() {
        let mut forward = Cart::new();
        forward.add_item(snapshot(1, 50_000));
        forward.add_item(snapshot(2, 30_000));
        forward.add_item(snapshot(2, 30_000));

        let mut backward = Cart::new();
        backward.add_item(snapshot(2, 30_000));
        backward.add_item(snapshot(1, 50_000));
        backward.add_item(snapshot(2, 30_000));

        assert_eq!(forward.subtotal(), backward.subtotal());
    }

    #[test]
    fn clear_resets_subtotal() {
        let mut cart = Cart::new();
        cart.add_item(snapshot(1, 50_000));
        cart.clear();
        assert_eq!(cart.subtotal(), Decimal::ZERO);
        assert!(cart.is_empty());
    }

    #[test]
    fn totals_for_local_and_national_destinations() {
        let policy = ShippingPolicy::default();
        let mut cart = Cart::new();
        cart.add_item(snapshot(1, 50_000));
        cart.add_item(snapshot(2, 30_000));
        cart.add_item(snapshot(2, 30_000));

        assert_eq!(cart.subtotal(), Decimal::from(110_000));
        assert_eq!(cart.shipping(&policy, Some("Cali")).amount(), Decimal::from(5_000));
        assert_eq!(cart.total(&policy, Some("Cali")), Decimal::from(115_000));
        assert_eq!(
            cart.shipping(&policy, Some("Medellin")).amount(),
            Decimal::from(16_000)
        );
        assert_eq!(cart.total(&policy, Some("Medellin")), Decimal::from(126_000));
    }

    #[test]
    fn large_orders_ship_free_anywhere() {
        let policy = ShippingPolicy::default();
        let mut cart = Cart::new();
        for _ in 0..6 {
            cart.add_item(snapshot(1, 50_000));
        }

        assert_eq!(cart.subtotal(), Decimal::from(300_000));
        for city in ["Cali", "Bogota", "Pasto"] {
            assert_eq!(cart.shipping(&policy, Some(city)).amount(), Decimal::ZERO);
            assert_eq!(cart.total(&policy, Some(city)), Decimal::from(300_000));
        }
    }

    #[test]
    fn quantities_stop_at_the_line_cap() {
        let mut cart = Cart::new();
        cart.add_item(snapshot(3, 1_000));
        for _ in 0..120 {
            assert!(cart.increase_quantity(3));
        }
        cart.add_item(snapshot(3, 1_000));

        assert_eq!(cart.quantity_of(3), Some(MAX_LINE_QUANTITY));
        assert_eq!(cart.subtotal(), Decimal::from(99_000));
    }

    #[test]
    fn merge_adds_shared_lines_and_appends_new_ones() {
        let mut cart = Cart::new();
        cart.add_item(snapshot(1, 50_000));
        cart.add_item(snapshot(2, 30_000));

        let mut later = Cart::new();
        later.add_item(snapshot(2, 30_000));
        later.add_item(snapshot(5, 10_000));

        cart.merge(later);
        let ids: Vec<i64> = cart.items().iter().map(|l| l.product_id).collect();
        assert_eq!(ids, vec![1, 2, 5]);
        assert_eq!(cart.quantity_of(2), Some(2));
        assert_invariants(&cart);
    }
}
