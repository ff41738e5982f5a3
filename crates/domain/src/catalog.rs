//! Article catalog.
//!
//! The catalog is provisioned once at startup and read during requests. It is
//! the authority on prices at the moment a cart is priced; carts never cache
//! prices.

use std::collections::HashMap;

use common::ArticleCode;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::Money;

/// Mapping from article code to unit price.
pub type PriceList = HashMap<ArticleCode, Money>;

/// A catalog article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Unique article code.
    pub code: ArticleCode,

    /// Human-readable article name.
    pub name: String,

    /// Unit price.
    pub price: Money,
}

impl Article {
    /// Creates a new article.
    pub fn new(code: impl Into<ArticleCode>, name: impl Into<String>, price: Money) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            price,
        }
    }
}

/// Read-mostly article catalog.
pub trait Catalog: Send + Sync {
    /// Adds an article. Returns false if the code is already present.
    fn add_article(&self, article: Article) -> bool;

    /// Returns all articles, sorted by code.
    fn articles(&self) -> Vec<Article>;

    /// Returns an article by code.
    fn get_article(&self, code: &str) -> Option<Article>;

    /// Returns the prices of the given codes.
    ///
    /// Codes absent from the catalog are omitted.
    fn get_prices(&self, codes: &[ArticleCode]) -> PriceList;
}

/// In-memory catalog.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    articles: RwLock<HashMap<ArticleCode, Article>>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding the given articles. Later duplicates are
    /// ignored.
    pub fn with_articles(articles: impl IntoIterator<Item = Article>) -> Self {
        let catalog = Self::new();
        for article in articles {
            catalog.add_article(article);
        }
        catalog
    }

    /// Returns the number of articles.
    pub fn len(&self) -> usize {
        self.articles.read().len()
    }

    /// Returns true if the catalog has no articles.
    pub fn is_empty(&self) -> bool {
        self.articles.read().is_empty()
    }
}

impl Catalog for InMemoryCatalog {
    fn add_article(&self, article: Article) -> bool {
        let mut articles = self.articles.write();
        if articles.contains_key(&article.code) {
            return false;
        }
        articles.insert(article.code.clone(), article);
        true
    }

    fn articles(&self) -> Vec<Article> {
        let mut articles: Vec<Article> = self.articles.read().values().cloned().collect();
        articles.sort_by(|a, b| a.code.cmp(&b.code));
        articles
    }

    fn get_article(&self, code: &str) -> Option<Article> {
        self.articles.read().get(code).cloned()
    }

    fn get_prices(&self, codes: &[ArticleCode]) -> PriceList {
        let articles = self.articles.read();
        codes
            .iter()
            .filter_map(|code| {
                articles
                    .get(code)
                    .map(|article| (code.clone(), article.price))
            })
            .collect()
    }
}
