//! Catalog commands: product listing, product detail and reviews.

use std::io::Write;

use cartwheel_core::{ProductId, Rating};
use cartwheel_storefront::Dispatcher;
use cartwheel_storefront::api::Product;

use super::{CliError, heading, settle};

/// List one page of products.
///
/// # Errors
///
/// Returns an error if the listing cannot be loaded.
pub async fn list(
    dispatcher: &Dispatcher,
    page: u32,
    search: Option<String>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let page = settle(dispatcher.list_products(page, search).await)?;
    let wishlist = dispatcher.wishlist();

    if page.items.is_empty() {
        writeln!(out, "No products found.")?;
        return Ok(());
    }

    for product in &page.items {
        let saved = if wishlist.contains(product.id) { " ♥" } else { "" };
        writeln!(
            out,
            "#{:<5} {:<32} {:>10}  {}{saved}",
            product.id,
            product.name,
            product.price.to_string(),
            stock_label(product),
        )?;
    }
    writeln!(
        out,
        "\nPage {} of {} ({} products)",
        page.page, page.total_pages, page.count
    )?;
    if page.has_next() {
        writeln!(out, "Next: cartwheel products --page {}", page.page + 1)?;
    }
    Ok(())
}

/// Show one product with its reviews.
///
/// # Errors
///
/// Returns an error if the product cannot be loaded.
pub async fn show(dispatcher: &Dispatcher, id: ProductId, out: &mut dyn Write) -> Result<(), CliError> {
    let product = settle(dispatcher.fetch_product(id).await)?;
    render_product(&product, out)?;
    Ok(())
}

/// Review a product.
///
/// # Errors
///
/// Returns an error if not signed in or the review is rejected.
pub async fn review(
    dispatcher: &Dispatcher,
    id: ProductId,
    rating: Rating,
    comment: &str,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    settle(dispatcher.submit_review(id, rating, comment).await)?;
    writeln!(out, "Thanks for your review!")?;
    if let Some(product) = dispatcher.state().products.detail.product {
        writeln!(
            out,
            "{} now has {} review(s), average {:.1}.",
            product.name, product.review_count, product.rating
        )?;
    }
    Ok(())
}

fn stock_label(product: &Product) -> String {
    if product.in_stock() {
        format!("{} in stock", product.stock)
    } else {
        "out of stock".to_string()
    }
}

fn render_product(product: &Product, out: &mut dyn Write) -> std::io::Result<()> {
    heading(out, &product.name)?;
    writeln!(out, "Price:   {}", product.price)?;
    writeln!(out, "Stock:   {}", stock_label(product))?;
    if let Some(category) = &product.category {
        writeln!(out, "Category: {}", category.name)?;
    }
    writeln!(
        out,
        "Rating:  {:.1} ({} reviews)",
        product.rating, product.review_count
    )?;
    if let Some(image) = product.image_ref() {
        writeln!(out, "Image:   {image}")?;
    }
    if !product.description.is_empty() {
        writeln!(out, "\n{}", product.description)?;
    }

    if !product.reviews.is_empty() {
        writeln!(out)?;
        heading(out, "Reviews")?;
        for review in &product.reviews {
            let date = review
                .created_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            writeln!(out, "{} {} {date}", review.rating, review.author)?;
            if !review.comment.is_empty() {
                writeln!(out, "  {}", review.comment)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::commands::testing::{dispatcher, output};

    #[tokio::test]
    async fn test_list_products() {
        let (_, d) = dispatcher();
        let mut out = Vec::new();
        list(&d, 1, None, &mut out).await.unwrap();

        let text = output(out);
        assert!(text.contains("Mug"));
        assert!(text.contains("$12.00"));
        assert!(text.contains("Page 1 of 1 (2 products)"));
    }

    #[tokio::test]
    async fn test_search_without_results() {
        let (_, d) = dispatcher();
        let mut out = Vec::new();
        list(&d, 1, Some("kettle".to_string()), &mut out).await.unwrap();
        assert_eq!(output(out), "No products found.\n");
    }

    #[tokio::test]
    async fn test_show_product() {
        let (_, d) = dispatcher();
        let mut out = Vec::new();
        show(&d, ProductId::new(2), &mut out).await.unwrap();

        let text = output(out);
        assert!(text.starts_with("Tea\n---\n"));
        assert!(text.contains("10 in stock"));
    }

    #[tokio::test]
    async fn test_review_requires_login() {
        let (_, d) = dispatcher();
        let result = review(&d, ProductId::new(1), Rating::new(5).unwrap(), "", &mut Vec::new()).await;
        assert!(matches!(result, Err(CliError::AuthRequired)));
    }
}
