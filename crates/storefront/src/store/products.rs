//! Catalog slice: listing page, product detail and review submission.

use crate::api::{Product, ProductPage};
use crate::config::DEFAULT_PAGE_SIZE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductsState {
    pub loading: bool,
    pub error: Option<String>,
    pub items: Vec<Product>,
    pub count: u32,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub keyword: Option<String>,
    pub detail: ProductDetailState,
    pub review: ReviewState,
}

impl Default for ProductsState {
    fn default() -> Self {
        Self {
            loading: false,
            error: None,
            items: Vec::new(),
            count: 0,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total_pages: 1,
            keyword: None,
            detail: ProductDetailState::default(),
            review: ReviewState::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDetailState {
    pub loading: bool,
    pub error: Option<String>,
    pub product: Option<Product>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewState {
    pub loading: bool,
    pub error: Option<String>,
    pub success: bool,
}

impl ProductsState {
    pub(crate) fn reduce(&mut self, action: ProductsAction) {
        match action {
            ProductsAction::ListRequest { keyword } => {
                self.loading = true;
                self.error = None;
                self.keyword = keyword;
            }
            ProductsAction::ListLoaded(page) => {
                self.loading = false;
                self.error = None;
                self.items = page.items;
                self.count = page.count;
                self.page = page.page;
                self.page_size = page.page_size;
                self.total_pages = page.total_pages.max(1);
            }
            ProductsAction::ListFailed(message) => {
                self.loading = false;
                self.error = Some(message);
            }
            ProductsAction::DetailRequest => {
                self.detail.loading = true;
                self.detail.error = None;
            }
            ProductsAction::DetailLoaded(product) => {
                self.detail = ProductDetailState {
                    loading: false,
                    error: None,
                    product: Some(*product),
                };
            }
            ProductsAction::DetailFailed(message) => {
                self.detail.loading = false;
                self.detail.error = Some(message);
            }
            ProductsAction::ReviewRequest => {
                self.review = ReviewState {
                    loading: true,
                    ..ReviewState::default()
                };
            }
            ProductsAction::ReviewSucceeded => {
                self.review = ReviewState {
                    success: true,
                    ..ReviewState::default()
                };
            }
            ProductsAction::ReviewFailed(message) => {
                self.review = ReviewState {
                    error: Some(message),
                    ..ReviewState::default()
                };
            }
            ProductsAction::ReviewReset => self.review = ReviewState::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductsAction {
    ListRequest { keyword: Option<String> },
    ListLoaded(ProductPage),
    ListFailed(String),
    DetailRequest,
    DetailLoaded(Box<Product>),
    DetailFailed(String),
    ReviewRequest,
    ReviewSucceeded,
    ReviewFailed(String),
    ReviewReset,
}
