// src/db/products.rs
use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension, Row};

use crate::domain::PriceDisplay;
use crate::errors::ServerError;

pub const PAGE_SIZE: i64 = 12;

#[derive(Debug, Clone)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone)]
pub struct Product {
    pub id: i64,
    pub store_id: i64,
    pub category_id: Option<i64>,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price_cents: i64,
    pub stock: Option<i64>,
    pub negotiable_price: bool,
    pub hide_price: bool,
    pub image_url: Option<String>,
    pub is_archived: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Product {
    pub fn price_display(&self) -> PriceDisplay {
        PriceDisplay::for_product(self.price_cents, self.negotiable_price, self.hide_price)
    }

    pub fn is_special(&self) -> bool {
        self.negotiable_price || self.hide_price
    }
}

/// Fields an admin submits when creating or editing a product.
#[derive(Debug, Clone, Default)]
pub struct ProductInput {
    pub category_id: Option<i64>,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price_cents: i64,
    pub stock: Option<i64>,
    pub negotiable_price: bool,
    pub hide_price: bool,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    #[default]
    Newest,
    Name,
    PriceAsc,
    PriceDesc,
}

impl ProductSort {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.unwrap_or("") {
            "name" => ProductSort::Name,
            "price_asc" => ProductSort::PriceAsc,
            "price_desc" => ProductSort::PriceDesc,
            _ => ProductSort::Newest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductSort::Newest => "newest",
            ProductSort::Name => "name",
            ProductSort::PriceAsc => "price_asc",
            ProductSort::PriceDesc => "price_desc",
        }
    }

    // Hidden prices always sort last.
    fn order_by(&self) -> &'static str {
        match self {
            ProductSort::Newest => "p.created_at desc, p.id desc",
            ProductSort::Name => "p.name collate nocase asc, p.id asc",
            ProductSort::PriceAsc => "p.hide_price asc, p.price_cents asc, p.id asc",
            ProductSort::PriceDesc => "p.hide_price asc, p.price_cents desc, p.id asc",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category_slug: Option<String>,
    pub sort: ProductSort,
    /// 1-based.
    pub page: i64,
    pub include_archived: bool,
}

#[derive(Debug)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: i64,
    pub page: i64,
    pub page_count: i64,
}

const PRODUCT_COLS: &str = "p.id, p.store_id, p.category_id, p.name, p.slug, p.description, \
     p.price_cents, p.stock, p.negotiable_price, p.hide_price, p.image_url, p.is_archived, \
     p.created_at, p.updated_at";

fn map_product(r: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: r.get(0)?,
        store_id: r.get(1)?,
        category_id: r.get(2)?,
        name: r.get(3)?,
        slug: r.get(4)?,
        description: r.get(5)?,
        price_cents: r.get(6)?,
        stock: r.get(7)?,
        negotiable_price: r.get(8)?,
        hide_price: r.get(9)?,
        image_url: r.get(10)?,
        is_archived: r.get(11)?,
        created_at: r.get(12)?,
        updated_at: r.get(13)?,
    })
}

/// `%needle%` for LIKE with the needle's own `%`, `_` and `\` taken literally.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub fn list_products(
    conn: &Connection,
    store_id: i64,
    query: &ProductQuery,
) -> Result<ProductPage, ServerError> {
    let mut filters = vec!["p.store_id = ?".to_string()];
    let mut args: Vec<Value> = vec![Value::Integer(store_id)];

    if !query.include_archived {
        filters.push("p.is_archived = 0".to_string());
    }
    if let Some(q) = query.search.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        filters.push(
            "(lower(p.name) like ? escape '\\' or lower(p.description) like ? escape '\\')".to_string(),
        );
        let pattern = contains_pattern(&q.to_lowercase());
        args.push(Value::Text(pattern.clone()));
        args.push(Value::Text(pattern));
    }
    if let Some(slug) = query.category_slug.as_deref().filter(|s| !s.is_empty()) {
        filters.push("c.slug = ?".to_string());
        args.push(Value::Text(slug.to_string()));
    }

    let where_sql = filters.join(" and ");
    let from_sql = "from products p left join categories c on c.id = p.category_id";

    let total: i64 = conn
        .query_row(
            &format!("select count(*) {from_sql} where {where_sql}"),
            params_from_iter(args.iter()),
            |r| r.get(0),
        )
        .map_err(|e| ServerError::DbError(format!("count products failed: {e}")))?;

    let page_count = ((total + PAGE_SIZE - 1) / PAGE_SIZE).max(1);
    let page = query.page.clamp(1, page_count);
    let offset = (page - 1) * PAGE_SIZE;

    let sql = format!(
        "select {PRODUCT_COLS} {from_sql} where {where_sql} order by {} limit {PAGE_SIZE} offset {offset}",
        query.sort.order_by()
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| ServerError::DbError(format!("prepare list products failed: {e}")))?;
    let products = stmt
        .query_map(params_from_iter(args.iter()), map_product)
        .map_err(|e| ServerError::DbError(format!("list products failed: {e}")))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServerError::DbError(format!("read product row failed: {e}")))?;

    Ok(ProductPage {
        products,
        total,
        page,
        page_count,
    })
}

/// Every product of the store, archived included, for admin screens.
pub fn list_all_products(conn: &Connection, store_id: i64) -> Result<Vec<Product>, ServerError> {
    let mut stmt = conn
        .prepare(&format!(
            "select {PRODUCT_COLS} from products p where p.store_id = ?
             order by p.is_archived, p.name collate nocase, p.id"
        ))
        .map_err(|e| ServerError::DbError(format!("prepare all products failed: {e}")))?;
    let rows = stmt
        .query_map(params![store_id], map_product)
        .map_err(|e| ServerError::DbError(format!("list all products failed: {e}")))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServerError::DbError(format!("read product row failed: {e}")))
}

pub fn find_product(
    conn: &Connection,
    store_id: i64,
    product_id: i64,
) -> Result<Option<Product>, ServerError> {
    conn.query_row(
        &format!("select {PRODUCT_COLS} from products p where p.id = ? and p.store_id = ?"),
        params![product_id, store_id],
        map_product,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select product failed: {e}")))
}

pub fn find_product_by_slug(
    conn: &Connection,
    store_id: i64,
    slug: &str,
) -> Result<Option<Product>, ServerError> {
    conn.query_row(
        &format!("select {PRODUCT_COLS} from products p where p.slug = ? and p.store_id = ?"),
        params![slug, store_id],
        map_product,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select product by slug failed: {e}")))
}

fn slug_taken(
    conn: &Connection,
    store_id: i64,
    slug: &str,
    except_id: Option<i64>,
) -> Result<bool, ServerError> {
    let n: i64 = conn
        .query_row(
            "select count(*) from products where store_id = ? and slug = ? and id != ?",
            params![store_id, slug, except_id.unwrap_or(-1)],
            |r| r.get(0),
        )
        .map_err(|e| ServerError::DbError(format!("check product slug failed: {e}")))?;
    Ok(n > 0)
}

fn check_category(conn: &Connection, store_id: i64, category_id: Option<i64>) -> Result<(), ServerError> {
    if let Some(id) = category_id {
        if find_category(conn, store_id, id)?.is_none() {
            return Err(ServerError::bad_request("unknown category"));
        }
    }
    Ok(())
}

pub fn create_product(
    conn: &Connection,
    store_id: i64,
    input: &ProductInput,
    now: i64,
) -> Result<i64, ServerError> {
    check_category(conn, store_id, input.category_id)?;
    if slug_taken(conn, store_id, &input.slug, None)? {
        return Err(ServerError::Conflict(format!(
            "a product with slug '{}' already exists",
            input.slug
        )));
    }

    conn.execute(
        r#"
        insert into products
            (store_id, category_id, name, slug, description, price_cents, stock,
             negotiable_price, hide_price, image_url, created_at, updated_at)
        values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            store_id,
            input.category_id,
            input.name,
            input.slug,
            input.description,
            input.price_cents,
            input.stock,
            input.negotiable_price,
            input.hide_price,
            input.image_url,
            now,
            now
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert product failed: {e}")))?;

    Ok(conn.last_insert_rowid())
}

pub fn update_product(
    conn: &Connection,
    store_id: i64,
    product_id: i64,
    input: &ProductInput,
    now: i64,
) -> Result<(), ServerError> {
    check_category(conn, store_id, input.category_id)?;
    if slug_taken(conn, store_id, &input.slug, Some(product_id))? {
        return Err(ServerError::Conflict(format!(
            "a product with slug '{}' already exists",
            input.slug
        )));
    }

    let n = conn
        .execute(
            r#"
            update products set
                category_id = ?, name = ?, slug = ?, description = ?, price_cents = ?,
                stock = ?, negotiable_price = ?, hide_price = ?, image_url = ?, updated_at = ?
            where id = ? and store_id = ?
            "#,
            params![
                input.category_id,
                input.name,
                input.slug,
                input.description,
                input.price_cents,
                input.stock,
                input.negotiable_price,
                input.hide_price,
                input.image_url,
                now,
                product_id,
                store_id
            ],
        )
        .map_err(|e| ServerError::DbError(format!("update product failed: {e}")))?;

    if n == 0 {
        return Err(ServerError::NotFound);
    }
    Ok(())
}

pub fn set_archived(
    conn: &Connection,
    store_id: i64,
    product_id: i64,
    archived: bool,
    now: i64,
) -> Result<(), ServerError> {
    let n = conn
        .execute(
            "update products set is_archived = ?, updated_at = ? where id = ? and store_id = ?",
            params![archived, now, product_id, store_id],
        )
        .map_err(|e| ServerError::DbError(format!("archive product failed: {e}")))?;
    if n == 0 {
        return Err(ServerError::NotFound);
    }
    Ok(())
}

/// Moves tracked stock by `delta`. Returns false (and changes nothing) when the
/// result would go negative. Untracked stock is left alone.
pub fn adjust_stock(conn: &Connection, product_id: i64, delta: i64) -> Result<bool, ServerError> {
    let stock: Option<Option<i64>> = conn
        .query_row(
            "select stock from products where id = ?",
            params![product_id],
            |r| r.get(0),
        )
        .optional()
        .map_err(|e| ServerError::DbError(format!("select stock failed: {e}")))?;

    match stock {
        // deleted product or untracked stock
        None | Some(None) => Ok(true),
        Some(Some(current)) if current + delta < 0 => Ok(false),
        Some(Some(_)) => {
            conn.execute(
                "update products set stock = stock + ? where id = ?",
                params![delta, product_id],
            )
            .map_err(|e| ServerError::DbError(format!("update stock failed: {e}")))?;
            Ok(true)
        }
    }
}

pub fn list_categories(conn: &Connection, store_id: i64) -> Result<Vec<Category>, ServerError> {
    let mut stmt = conn
        .prepare("select id, name, slug from categories where store_id = ? order by name collate nocase")
        .map_err(|e| ServerError::DbError(format!("prepare list categories failed: {e}")))?;
    let rows = stmt
        .query_map(params![store_id], |r| {
            Ok(Category {
                id: r.get(0)?,
                name: r.get(1)?,
                slug: r.get(2)?,
            })
        })
        .map_err(|e| ServerError::DbError(format!("list categories failed: {e}")))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServerError::DbError(format!("read category row failed: {e}")))
}

pub fn find_category(
    conn: &Connection,
    store_id: i64,
    category_id: i64,
) -> Result<Option<Category>, ServerError> {
    conn.query_row(
        "select id, name, slug from categories where id = ? and store_id = ?",
        params![category_id, store_id],
        |r| {
            Ok(Category {
                id: r.get(0)?,
                name: r.get(1)?,
                slug: r.get(2)?,
            })
        },
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select category failed: {e}")))
}

pub fn create_category(
    conn: &Connection,
    store_id: i64,
    name: &str,
    slug: &str,
) -> Result<i64, ServerError> {
    let exists: i64 = conn
        .query_row(
            "select count(*) from categories where store_id = ? and slug = ?",
            params![store_id, slug],
            |r| r.get(0),
        )
        .map_err(|e| ServerError::DbError(format!("check category slug failed: {e}")))?;
    if exists > 0 {
        return Err(ServerError::Conflict(format!(
            "a category with slug '{slug}' already exists"
        )));
    }

    conn.execute(
        "insert into categories (store_id, name, slug) values (?, ?, ?)",
        params![store_id, name, slug],
    )
    .map_err(|e| ServerError::DbError(format!("insert category failed: {e}")))?;
    Ok(conn.last_insert_rowid())
}
