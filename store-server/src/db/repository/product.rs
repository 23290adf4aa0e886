//! Product Repository

use super::{BaseRepository, RepoError, RepoResult, make_record_id};
use crate::db::models::{Product, ProductCreate, ProductUpdate, Review};
use serde::Deserialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const PRODUCT_TABLE: &str = "product";

/// Catalog search filter (keyword + price range + page)
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    pub keyword: Option<String>,
    pub price_gte: Option<f64>,
    pub price_lte: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: u64,
}

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a new product
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        let product = Product {
            id: None,
            name: data.name,
            price: data.price,
            description: data.description,
            brand: data.brand,
            processor: data.processor,
            ram: data.ram,
            storage: data.storage,
            screen_size: data.screen_size,
            category: data.category,
            stock: data.stock,
            images: data.images.unwrap_or_default(),
            reviews: Vec::new(),
            rating: 0.0,
            num_reviews: 0,
            revision: 0,
            created_at: shared::util::now_millis(),
        };

        let created: Option<Product> = self
            .base
            .db()
            .create(PRODUCT_TABLE)
            .content(product)
            .await?;

        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let rid = make_record_id(PRODUCT_TABLE, id);
        let product: Option<Product> = self.base.db().select(rid).await?;
        Ok(product)
    }

    /// Catalog search: keyword on the name, price range filter, page-based
    /// pagination. Returns the page plus the total match count.
    pub async fn search(
        &self,
        filter: &CatalogFilter,
        page: u32,
        page_size: u32,
    ) -> RepoResult<(Vec<Product>, u64)> {
        let mut conds: Vec<&str> = Vec::new();
        if filter.keyword.is_some() {
            conds.push("string::contains(string::lowercase(name), $kw)");
        }
        if filter.price_gte.is_some() {
            conds.push("price >= $gte");
        }
        if filter.price_lte.is_some() {
            conds.push("price <= $lte");
        }

        let where_clause = if conds.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conds.join(" AND "))
        };

        let page = page.max(1);
        let start = (page - 1) as i64 * page_size as i64;

        // LIMIT/START are server-computed integers, inlined directly
        let page_query = format!(
            "SELECT * FROM product{} ORDER BY created_at ASC, name ASC LIMIT {} START {}",
            where_clause, page_size, start
        );
        let count_query = format!(
            "SELECT count() AS count FROM product{} GROUP ALL",
            where_clause
        );

        let mut query = self.base.db().query(&page_query).query(&count_query);

        if let Some(kw) = &filter.keyword {
            query = query.bind(("kw", kw.to_lowercase()));
        }
        if let Some(gte) = filter.price_gte {
            query = query.bind(("gte", gte));
        }
        if let Some(lte) = filter.price_lte {
            query = query.bind(("lte", lte));
        }

        let mut result = query.await?;
        let products: Vec<Product> = result.take(0)?;
        let counts: Vec<CountRow> = result.take(1)?;
        let total = counts.first().map(|c| c.count).unwrap_or(0);

        Ok((products, total))
    }

    /// Update a product (partial; untouched fields stay as they are)
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let rid = make_record_id(PRODUCT_TABLE, id);

        let mut set_parts: Vec<&str> = Vec::new();
        if data.name.is_some() {
            set_parts.push("name = $name");
        }
        if data.price.is_some() {
            set_parts.push("price = $price");
        }
        if data.description.is_some() {
            set_parts.push("description = $description");
        }
        if data.brand.is_some() {
            set_parts.push("brand = $brand");
        }
        if data.processor.is_some() {
            set_parts.push("processor = $processor");
        }
        if data.ram.is_some() {
            set_parts.push("ram = $ram");
        }
        if data.storage.is_some() {
            set_parts.push("storage = $storage");
        }
        if data.screen_size.is_some() {
            set_parts.push("screen_size = $screen_size");
        }
        if data.category.is_some() {
            set_parts.push("category = $category");
        }
        if data.stock.is_some() {
            set_parts.push("stock = $stock");
        }
        if data.images.is_some() {
            set_parts.push("images = $images");
        }

        if set_parts.is_empty() {
            // No fields to update
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)));
        }

        let query_str = format!("UPDATE $id SET {} RETURN AFTER", set_parts.join(", "));

        let mut query = self.base.db().query(&query_str).bind(("id", rid));
        if let Some(v) = data.name {
            query = query.bind(("name", v));
        }
        if let Some(v) = data.price {
            query = query.bind(("price", v));
        }
        if let Some(v) = data.description {
            query = query.bind(("description", v));
        }
        if let Some(v) = data.brand {
            query = query.bind(("brand", v));
        }
        if let Some(v) = data.processor {
            query = query.bind(("processor", v));
        }
        if let Some(v) = data.ram {
            query = query.bind(("ram", v));
        }
        if let Some(v) = data.storage {
            query = query.bind(("storage", v));
        }
        if let Some(v) = data.screen_size {
            query = query.bind(("screen_size", v));
        }
        if let Some(v) = data.category {
            query = query.bind(("category", v));
        }
        if let Some(v) = data.stock {
            query = query.bind(("stock", v));
        }
        if let Some(v) = data.images {
            query = query.bind(("images", v));
        }

        let mut result = query.await?;
        let products: Vec<Product> = result.take(0)?;
        products
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Hard delete; returns the deleted document so the caller can release
    /// the associated image blobs (best-effort, not transactional)
    pub async fn delete(&self, id: &str) -> RepoResult<Product> {
        let rid = make_record_id(PRODUCT_TABLE, id);
        let deleted: Option<Product> = self.base.db().delete(rid).await?;
        deleted.ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Apply a signed stock delta as a single atomic statement.
    ///
    /// Returns None when the product does not exist. Stock is not clamped
    /// at zero; negative stock signals oversell.
    pub async fn adjust_stock(
        &self,
        product_id: &RecordId,
        delta: i64,
    ) -> RepoResult<Option<Product>> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $id SET stock += $delta RETURN AFTER")
            .bind(("id", product_id.clone()))
            .bind(("delta", delta))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products.into_iter().next())
    }

    /// Write the review set together with the recomputed aggregate, guarded
    /// by a compare-and-swap on the revision counter.
    ///
    /// Returns None when the guard failed (concurrent mutation) or the
    /// product is gone; the caller reloads and retries.
    pub async fn compare_and_set_reviews(
        &self,
        product_id: &RecordId,
        reviews: Vec<Review>,
        rating: f64,
        num_reviews: i64,
        expected_revision: i64,
    ) -> RepoResult<Option<Product>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $id SET reviews = $reviews, rating = $rating, \
                 num_reviews = $num_reviews, revision += 1 \
                 WHERE revision = $expected RETURN AFTER",
            )
            .bind(("id", product_id.clone()))
            .bind(("reviews", reviews))
            .bind(("rating", rating))
            .bind(("num_reviews", num_reviews))
            .bind(("expected", expected_revision))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::Category;

    async fn test_repo() -> ProductRepository {
        let svc = DbService::memory().await.expect("in-memory db");
        ProductRepository::new(svc.db)
    }

    fn laptop(name: &str, price: f64, stock: i64) -> ProductCreate {
        ProductCreate {
            name: name.to_string(),
            price,
            description: "A laptop".to_string(),
            brand: "Acme".to_string(),
            processor: "8-core".to_string(),
            ram: "16GB".to_string(),
            storage: "512GB SSD".to_string(),
            screen_size: "14\"".to_string(),
            category: Category::Ultrabook,
            stock,
            images: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = test_repo().await;
        let created = repo.create(laptop("Swift 14", 999.0, 5)).await.unwrap();
        let id = created.id.as_ref().unwrap().to_string();

        let found = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(found.name, "Swift 14");
        assert_eq!(found.stock, 5);
        assert_eq!(found.rating, 0.0);
        assert_eq!(found.num_reviews, 0);
        assert!(found.reviews.is_empty());
    }

    #[tokio::test]
    async fn test_pagination_page_two_of_twenty() {
        let repo = test_repo().await;
        for i in 1..=20 {
            // Zero-padded names keep the catalog order deterministic
            repo.create(laptop(&format!("Laptop {:02}", i), 500.0 + i as f64, 1))
                .await
                .unwrap();
        }

        let (page, total) = repo
            .search(&CatalogFilter::default(), 2, 8)
            .await
            .unwrap();

        assert_eq!(total, 20);
        assert_eq!(page.len(), 8);
        assert_eq!(page.first().unwrap().name, "Laptop 09");
        assert_eq!(page.last().unwrap().name, "Laptop 16");
    }

    #[tokio::test]
    async fn test_keyword_and_price_filter() {
        let repo = test_repo().await;
        repo.create(laptop("Gamer Pro", 1800.0, 3)).await.unwrap();
        repo.create(laptop("Office Basic", 600.0, 3)).await.unwrap();
        repo.create(laptop("Gamer Lite", 900.0, 3)).await.unwrap();

        let filter = CatalogFilter {
            keyword: Some("gamer".to_string()),
            price_gte: None,
            price_lte: None,
        };
        let (hits, total) = repo.search(&filter, 1, 8).await.unwrap();
        assert_eq!(total, 2);
        assert!(hits.iter().all(|p| p.name.starts_with("Gamer")));

        let filter = CatalogFilter {
            keyword: Some("gamer".to_string()),
            price_gte: Some(1000.0),
            price_lte: Some(2000.0),
        };
        let (hits, total) = repo.search(&filter, 1, 8).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(hits[0].name, "Gamer Pro");
    }

    #[tokio::test]
    async fn test_update_partial() {
        let repo = test_repo().await;
        let created = repo.create(laptop("Swift 14", 999.0, 5)).await.unwrap();
        let id = created.id.as_ref().unwrap().to_string();

        let updated = repo
            .update(
                &id,
                ProductUpdate {
                    name: None,
                    price: Some(899.0),
                    description: None,
                    brand: None,
                    processor: None,
                    ram: None,
                    storage: None,
                    screen_size: None,
                    category: None,
                    stock: None,
                    images: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.price, 899.0);
        assert_eq!(updated.name, "Swift 14");
        assert_eq!(updated.stock, 5);
    }

    #[tokio::test]
    async fn test_adjust_stock_atomic_delta() {
        let repo = test_repo().await;
        let created = repo.create(laptop("Swift 14", 999.0, 10)).await.unwrap();
        let rid = created.id.clone().unwrap();

        let after = repo.adjust_stock(&rid, -3).await.unwrap().unwrap();
        assert_eq!(after.stock, 7);

        // Oversell drives stock negative
        let after = repo.adjust_stock(&rid, -10).await.unwrap().unwrap();
        assert_eq!(after.stock, -3);

        let after = repo.adjust_stock(&rid, 13).await.unwrap().unwrap();
        assert_eq!(after.stock, 10);
    }

    #[tokio::test]
    async fn test_adjust_stock_missing_product() {
        let repo = test_repo().await;
        let rid = make_record_id("product", "does-not-exist");
        let result = repo.adjust_stock(&rid, -1).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_compare_and_set_reviews_guard() {
        let repo = test_repo().await;
        let created = repo.create(laptop("Swift 14", 999.0, 5)).await.unwrap();
        let rid = created.id.clone().unwrap();

        let review = Review {
            id: "r1".to_string(),
            reviewer: make_record_id("user", "alice"),
            name: "Alice".to_string(),
            rating: 5,
            comment: None,
            anonymous: false,
            created_at: 0,
        };

        // Matching revision commits
        let updated = repo
            .compare_and_set_reviews(&rid, vec![review.clone()], 5.0, 1, 0)
            .await
            .unwrap();
        assert!(updated.is_some());
        assert_eq!(updated.unwrap().revision, 1);

        // Stale revision is rejected
        let stale = repo
            .compare_and_set_reviews(&rid, vec![], 0.0, 0, 0)
            .await
            .unwrap();
        assert!(stale.is_none());

        let current = repo
            .find_by_id(&rid.to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.num_reviews, 1);
    }

    #[tokio::test]
    async fn test_delete_returns_document() {
        let repo = test_repo().await;
        let created = repo.create(laptop("Swift 14", 999.0, 5)).await.unwrap();
        let id = created.id.as_ref().unwrap().to_string();

        let deleted = repo.delete(&id).await.unwrap();
        assert_eq!(deleted.name, "Swift 14");

        assert!(repo.find_by_id(&id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(&id).await,
            Err(RepoError::NotFound(_))
        ));
    }
}
