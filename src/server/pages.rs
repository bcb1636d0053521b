//! Server-rendered shop and cart pages.

use std::fmt::Write as _;

use crate::shop::{CartView, Product};

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="sr">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<link rel="stylesheet" href="/static/style.css">
<script src="/static/shop.js" defer></script>
"#;

/// Escape text for HTML element and attribute content.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn open_page(title: &str, cart_count: usize) -> String {
    let mut out = String::from(PAGE_HEAD);
    let _ = write!(
        out,
        "<title>{}</title>\n</head>\n<body>\n<nav><a href=\"/\">Početna</a> \
         <a href=\"/shop\">Prodavnica</a> \
         <a href=\"/cart\">Korpa (<span id=\"cart-count\">{cart_count}</span>)</a></nav>\n<main>\n",
        escape_html(title)
    );
    out
}

fn close_page(mut out: String) -> String {
    out.push_str("</main>\n</body>\n</html>\n");
    out
}

/// Render the product catalog.
#[must_use]
pub fn render_shop(products: &[Product], cart_count: usize) -> String {
    let mut out = open_page("Prodavnica", cart_count);
    out.push_str("<h1>Prodavnica</h1>\n<div class=\"products\">\n");
    for product in products {
        let _ = write!(
            out,
            "<div class=\"product\">\n<div class=\"image\">{}</div>\n<h2>{}</h2>\n<p>{}</p>\n\
             <p class=\"price\">{} EUR</p>\n\
             <button onclick=\"addToCart({})\">Dodaj u korpu</button>\n</div>\n",
            escape_html(&product.image),
            escape_html(&product.name),
            escape_html(&product.description),
            product.price,
            product.id
        );
    }
    out.push_str("</div>\n");
    close_page(out)
}

/// Render the cart with its total.
#[must_use]
pub fn render_cart(cart: &CartView) -> String {
    let mut out = open_page("Korpa", cart.items.len());
    out.push_str("<h1>Korpa</h1>\n");
    if cart.items.is_empty() {
        out.push_str("<p>Korpa je prazna.</p>\n");
    } else {
        out.push_str("<ul class=\"cart\">\n");
        for item in &cart.items {
            let _ = write!(
                out,
                "<li>{} {} - {} EUR \
                 <button onclick=\"removeFromCart({})\">Ukloni</button></li>\n",
                escape_html(&item.image),
                escape_html(&item.name),
                item.price,
                item.id
            );
        }
        out.push_str("</ul>\n");
    }
    let _ = writeln!(out, "<p class=\"total\">Ukupno: {} EUR</p>", cart.total);
    close_page(out)
}
