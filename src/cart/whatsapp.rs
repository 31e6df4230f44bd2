//! Pre-filled WhatsApp order messages.

use std::fmt::Write;

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use rust_decimal::Decimal;
use rusty_money::{Money, iso};

use super::{checkout::CheckoutPayload, shipping::ShippingStatus};

const WA_BASE: &str = "https://wa.me/";

pub fn format_amount(amount: Decimal) -> String {
    Money::from_decimal(amount, iso::COP).to_string()
}

pub fn compose_message(payload: &CheckoutPayload) -> String {
    let mut text = String::from("Hola, quiero hacer este pedido:\n\n");

    for line in &payload.lines {
        let _ = writeln!(
            text,
            "- {} x {} ({})",
            line.quantity,
            line.name,
            format_amount(line.line_total)
        );
    }

    let shipping = match payload.shipping_status {
        ShippingStatus::Free => "Gratis".to_string(),
        ShippingStatus::Pending => "Por confirmar".to_string(),
        ShippingStatus::Local | ShippingStatus::National => format_amount(payload.shipping_cost),
    };

    let _ = writeln!(text, "\nSubtotal: {}", format_amount(payload.subtotal));
    let _ = writeln!(text, "Envío: {shipping}");
    let _ = writeln!(text, "Total: {}", format_amount(payload.total));

    let customer = &payload.customer;
    let _ = writeln!(text, "\nNombre: {}", customer.name.trim());
    let _ = writeln!(text, "Teléfono: {}", customer.phone.trim());
    if let Some(email) = customer.email.as_deref().filter(|e| !e.trim().is_empty()) {
        let _ = writeln!(text, "Correo: {}", email.trim());
    }
    let _ = writeln!(
        text,
        "Dirección: {}, {}",
        customer.address.trim(),
        customer.city.trim()
    );
    if let Some(notes) = customer.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        let _ = writeln!(text, "Notas: {}", notes.trim());
    }

    text.trim_end().to_string()
}

/// Deep link that opens a chat with `store_number` and the order text pre-filled.
/// Non-digit characters in the number (`+`, spaces, dashes) are dropped.
pub fn whatsapp_link(store_number: &str, payload: &CheckoutPayload) -> String {
    let digits: String = store_number.chars().filter(char::is_ascii_digit).collect();
    let message = compose_message(payload);
    format!(
        "{WA_BASE}{digits}?text={}",
        utf8_percent_encode(&message, NON_ALPHANUMERIC)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{
        Cart,
        checkout::{build_checkout_payload, tests::customer},
        shipping::ShippingPolicy,
        tests::snapshot,
    };

    fn payload(city: &str) -> CheckoutPayload {
        let mut cart = Cart::new();
        cart.add_item(snapshot(1, 50_000));
        cart.add_item(snapshot(2, 30_000));
        cart.add_item(snapshot(2, 30_000));
        build_checkout_payload(&cart, customer(city), &ShippingPolicy::default())
    }

    #[test]
    fn message_lists_every_line_and_the_customer() {
        let text = compose_message(&payload("Cali"));

        assert!(text.starts_with("Hola, quiero hacer este pedido:"));
        assert!(text.contains("1 x Producto 1"));
        assert!(text.contains("2 x Producto 2"));
        assert!(text.contains("Nombre: Laura Gómez"));
        assert!(text.contains("Dirección: Calle 5 # 38-25, Cali"));
        assert!(text.contains("Notas: Entregar en portería"));
        assert!(!text.contains("Correo:"));
    }

    #[test]
    fn pending_shipping_is_spelled_out() {
        let text = compose_message(&payload(""));
        assert!(text.contains("Envío: Por confirmar"));
    }

    #[test]
    fn link_keeps_only_digits_and_encodes_text() {
        let link = whatsapp_link("+57 300-123 4567", &payload("Cali"));

        assert!(link.starts_with("https://wa.me/573001234567?text=Hola%2C%20quiero"));
        assert!(!link.contains(' '));
        assert!(!link.contains('\n'));
        assert!(link.contains("%0A"));
    }
}
