//! Catalog browsing and reviews.

use tracing::instrument;

use cartwheel_core::{ProductId, Rating};

use super::Dispatcher;
use crate::api::{NewReview, Product, ProductPage, ProductQuery};
use crate::error::Outcome;
use crate::store::ProductsAction;

impl Dispatcher {
    /// Load one page of the catalog, optionally filtered by name.
    #[instrument(skip(self))]
    pub async fn list_products(&self, page: u32, keyword: Option<String>) -> Outcome<ProductPage> {
        let query = ProductQuery {
            page: page.max(1),
            page_size: self.page_size,
            keyword,
        };
        self.store.dispatch(ProductsAction::ListRequest {
            keyword: query.search_term().map(str::to_string),
        });

        match self.api.list_products(&query).await {
            Ok(page) => {
                self.store.dispatch(ProductsAction::ListLoaded(page.clone()));
                Outcome::Ok(page)
            }
            Err(e) => {
                let message = e.user_message();
                self.store
                    .dispatch(ProductsAction::ListFailed(message.clone()));
                Outcome::Error(message)
            }
        }
    }

    /// Load a product and its reviews.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn fetch_product(&self, id: ProductId) -> Outcome<Product> {
        self.store.dispatch(ProductsAction::DetailRequest);
        match self.api.get_product(id).await {
            Ok(product) => {
                self.store
                    .dispatch(ProductsAction::DetailLoaded(Box::new(product.clone())));
                Outcome::Ok(product)
            }
            Err(e) => {
                let message = e.user_message();
                self.store
                    .dispatch(ProductsAction::DetailFailed(message.clone()));
                Outcome::Error(message)
            }
        }
    }

    /// Review a product, then reload it so the new review shows.
    #[instrument(skip(self, comment), fields(product_id = %id, rating = %rating))]
    pub async fn submit_review(
        &self,
        id: ProductId,
        rating: Rating,
        comment: &str,
    ) -> Outcome<()> {
        if !self.has_credential() {
            return Outcome::AuthRequired;
        }

        self.store.dispatch(ProductsAction::ReviewRequest);
        let review = NewReview {
            rating,
            comment: comment.trim().to_string(),
        };

        match self.api.submit_review(id, &review).await {
            Ok(()) => {
                self.store.dispatch(ProductsAction::ReviewSucceeded);
                self.fetch_product(id).await.map(|_| ())
            }
            Err(e) if e.is_unauthorized() => {
                self.store.dispatch(ProductsAction::ReviewReset);
                self.expire_session();
                Outcome::AuthRequired
            }
            Err(e) => {
                let message = e.user_message();
                self.store
                    .dispatch(ProductsAction::ReviewFailed(message.clone()));
                Outcome::Error(message)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::actions::testing::{harness, logged_in};
    use crate::api::mock::{Endpoint, MockFailure, rating};

    #[tokio::test]
    async fn test_list_products_pagination() {
        let h = harness();
        let d = h.dispatcher.clone().with_page_size(2);

        let page = d.list_products(2, None).await.ok().unwrap();
        assert_eq!(page.count, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 1);

        let state = d.state().products;
        assert_eq!(state.page, 2);
        assert_eq!(state.total_pages, 2);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_default_page_size_matches_initial_state() {
        let h = harness();
        let initial = h.dispatcher.state().products.page_size;

        let page = h.dispatcher.list_products(1, None).await.ok().unwrap();
        assert_eq!(page.page_size, initial);
        assert_eq!(h.dispatcher.state().products.page_size, initial);
    }

    #[tokio::test]
    async fn test_keyword_search() {
        let h = harness();
        let page = h
            .dispatcher
            .list_products(1, Some("  mug ".to_string()))
            .await
            .ok()
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(h.dispatcher.state().products.keyword.as_deref(), Some("mug"));
    }

    #[tokio::test]
    async fn test_list_failure_sets_error() {
        let h = harness();
        h.api.fail_next(
            Endpoint::ListProducts,
            MockFailure::Api {
                status: 503,
                detail: None,
            },
        );
        let outcome = h.dispatcher.list_products(1, None).await;
        assert_eq!(outcome.error(), Some("Request failed with status code 503"));
        assert_eq!(
            h.dispatcher.state().products.error.as_deref(),
            Some("Request failed with status code 503")
        );
    }

    #[tokio::test]
    async fn test_fetch_missing_product() {
        let h = harness();
        let outcome = h.dispatcher.fetch_product(ProductId::new(404)).await;
        assert_eq!(outcome.error(), Some("Product not found"));
        assert!(h.dispatcher.state().products.detail.product.is_none());
    }

    #[tokio::test]
    async fn test_review_requires_auth() {
        let h = harness();
        let outcome = h
            .dispatcher
            .submit_review(ProductId::new(1), rating(5), "Great")
            .await;
        assert!(outcome.is_auth_required());
        assert!(h.api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_review_with_rejected_credential_signs_out() {
        let h = logged_in().await;
        h.api.revoke_tokens();

        let outcome = h
            .dispatcher
            .submit_review(ProductId::new(1), rating(5), "Great")
            .await;
        assert!(outcome.is_auth_required());
        let state = h.dispatcher.state();
        assert!(!state.auth.is_authenticated());
        assert_eq!(state.products.review.error, None);
        assert!(!h.dispatcher.session().has_credential());
    }

    #[tokio::test]
    async fn test_review_refreshes_detail() {
        let h = logged_in().await;
        let outcome = h
            .dispatcher
            .submit_review(ProductId::new(1), rating(4), "  Solid mug ")
            .await;
        assert!(outcome.is_ok());

        let state = h.dispatcher.state().products;
        assert!(state.review.success);
        let product = state.detail.product.unwrap();
        assert_eq!(product.review_count, 1);
        assert_eq!(product.reviews[0].comment, "Solid mug");
        assert_eq!(h.api.count(Endpoint::GetProduct), 1);
    }
}
