use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use rust_decimal::Decimal;
use storefront_api::{
    catalog::normalize::slugify,
    config::AppConfig,
    db::{DbPool, create_orm_conn, create_pool, run_migrations},
};

struct SeedProduct {
    category: &'static str,
    name: &'static str,
    description: &'static str,
    price: i64,
    previous_price: Option<i64>,
    availability: &'static str,
    size: Option<&'static str>,
    color: Option<&'static str>,
    image: &'static str,
}

const CATEGORIES: [&str; 4] = ["Camisetas", "Pantalones", "Accesorios", "Ropa Niños"];

const PRODUCTS: [SeedProduct; 6] = [
    SeedProduct {
        category: "Camisetas",
        name: "Camiseta Oversize",
        description: "Algodón peinado, corte amplio",
        price: 45000,
        previous_price: Some(60000),
        availability: "disponible",
        size: Some("M"),
        color: Some("Negro"),
        image: "camiseta-oversize.jpg",
    },
    SeedProduct {
        category: "Camisetas",
        name: "Camiseta Básica",
        description: "Cuello redondo",
        price: 30000,
        previous_price: None,
        availability: "disponible",
        size: Some("S"),
        color: Some("Blanco"),
        image: "camiseta-basica.jpg",
    },
    SeedProduct {
        category: "Pantalones",
        name: "Jean Slim",
        description: "Denim con elastano",
        price: 110000,
        previous_price: None,
        availability: "disponible",
        size: Some("32"),
        color: Some("Azul"),
        image: "jean-slim.jpg",
    },
    SeedProduct {
        category: "Pantalones",
        name: "Jogger Cargo",
        description: "Bolsillos laterales",
        price: 85000,
        previous_price: Some(95000),
        availability: "agotado",
        size: Some("L"),
        color: Some("Verde oliva"),
        image: "jogger-cargo.jpg",
    },
    SeedProduct {
        category: "Accesorios",
        name: "Gorra Bordada",
        description: "Ajustable",
        price: 35000,
        previous_price: None,
        availability: "disponible",
        size: None,
        color: Some("Beige"),
        image: "gorra.jpg",
    },
    SeedProduct {
        category: "Ropa Niños",
        name: "Conjunto Infantil",
        description: "Camiseta y pantaloneta",
        price: 55000,
        previous_price: None,
        availability: "disponible",
        size: Some("6"),
        color: None,
        image: "conjunto-infantil.jpg",
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&create_orm_conn(&pool)).await?;

    let admin_email =
        std::env::var("SEED_ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".into());
    let admin_password =
        std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".into());
    let admin_id = ensure_admin(&pool, &admin_email, &admin_password).await?;

    for name in CATEGORIES {
        ensure_category(&pool, name).await?;
    }
    let inserted = seed_products(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, new products: {inserted}");
    Ok(())
}

async fn ensure_admin(pool: &DbPool, email: &str, password: &str) -> anyhow::Result<i64> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    sqlx::query(
        r#"
        INSERT INTO users (email, password_hash, role)
        VALUES (?, ?, 'admin')
        ON DUPLICATE KEY UPDATE password_hash = VALUES(password_hash), role = 'admin'
        "#,
    )
    .bind(email.to_lowercase())
    .bind(password_hash)
    .execute(pool)
    .await?;

    let (id,): (i64,) = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(email.to_lowercase())
        .fetch_one(pool)
        .await?;
    Ok(id)
}

async fn ensure_category(pool: &DbPool, name: &str) -> anyhow::Result<()> {
    sqlx::query("INSERT IGNORE INTO categories (name, slug) VALUES (?, ?)")
        .bind(name)
        .bind(slugify(name))
        .execute(pool)
        .await?;
    Ok(())
}

async fn seed_products(pool: &DbPool) -> anyhow::Result<u64> {
    let mut inserted = 0;
    for product in &PRODUCTS {
        let result = sqlx::query(
            r#"
            INSERT INTO products
                (category_id, name, description, price, previous_price, on_offer,
                 availability, size, color, image)
            SELECT c.id, ?, ?, ?, ?, ?, ?, ?, ?, ?
            FROM categories c
            WHERE c.slug = ?
              AND NOT EXISTS (SELECT 1 FROM products p WHERE p.name = ?)
            "#,
        )
        .bind(product.name)
        .bind(product.description)
        .bind(Decimal::from(product.price))
        .bind(product.previous_price.map(Decimal::from))
        .bind(product.previous_price.is_some())
        .bind(product.availability)
        .bind(product.size)
        .bind(product.color)
        .bind(product.image)
        .bind(slugify(product.category))
        .bind(product.name)
        .execute(pool)
        .await?;
        inserted += result.rows_affected();
    }

    println!("Seeded products");
    Ok(inserted)
}
