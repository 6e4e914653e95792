//! Seed the catalog with sample products.
//!
//! # Usage
//!
//! ```bash
//! bramble-cli seed
//! ```
//!
//! Intended for development databases; seeding is additive and does not
//! clear existing products.

use rust_decimal::Decimal;
use thiserror::Error;

use bramble_api::db::products::ProductRepository;
use bramble_api::models::product::NewProduct;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Insert failed.
    #[error("Seed insert failed: {0}")]
    Insert(#[from] bramble_api::db::RepositoryError),
}

/// Sample catalog used for development.
fn sample_products() -> Vec<NewProduct> {
    vec![
        NewProduct {
            name: "Airpods Wireless Bluetooth Headphones".to_owned(),
            image: "/images/airpods.jpg".to_owned(),
            brand: "Apple".to_owned(),
            category: "Electronics".to_owned(),
            description: "Bluetooth technology lets you connect it with compatible devices \
                          wirelessly. High-quality AAC audio offers immersive listening."
                .to_owned(),
            price: Decimal::new(8999, 2),
            count_in_stock: 10,
        },
        NewProduct {
            name: "iPhone 13 Pro 256GB Memory".to_owned(),
            image: "/images/phone.jpg".to_owned(),
            brand: "Apple".to_owned(),
            category: "Electronics".to_owned(),
            description: "Introducing the iPhone 13 Pro. A transformative triple-camera system \
                          that adds tons of capability without complexity."
                .to_owned(),
            price: Decimal::new(59_999, 2),
            count_in_stock: 7,
        },
        NewProduct {
            name: "Cannon EOS 80D DSLR Camera".to_owned(),
            image: "/images/camera.jpg".to_owned(),
            brand: "Cannon".to_owned(),
            category: "Electronics".to_owned(),
            description: "Characterized by versatile imaging specs, the Canon EOS 80D further \
                          clarifies itself using a pair of robust focusing systems."
                .to_owned(),
            price: Decimal::new(92_999, 2),
            count_in_stock: 5,
        },
        NewProduct {
            name: "Sony Playstation 5".to_owned(),
            image: "/images/playstation.jpg".to_owned(),
            brand: "Sony".to_owned(),
            category: "Electronics".to_owned(),
            description: "The ultimate home entertainment center starts with PlayStation. \
                          Whether you are into gaming, HD movies, or music."
                .to_owned(),
            price: Decimal::new(39_999, 2),
            count_in_stock: 11,
        },
        NewProduct {
            name: "Logitech G-Series Gaming Mouse".to_owned(),
            image: "/images/mouse.jpg".to_owned(),
            brand: "Logitech".to_owned(),
            category: "Electronics".to_owned(),
            description: "Get a better handle on your games with this Logitech LIGHTSYNC gaming \
                          mouse. Six programmable buttons allow customization."
                .to_owned(),
            price: Decimal::new(4999, 2),
            count_in_stock: 7,
        },
        NewProduct {
            name: "Amazon Echo Dot 3rd Generation".to_owned(),
            image: "/images/alexa.jpg".to_owned(),
            brand: "Amazon".to_owned(),
            category: "Electronics".to_owned(),
            description: "Meet Echo Dot, our most popular smart speaker with a fabric design. \
                          It is our most compact smart speaker that fits perfectly into small spaces."
                .to_owned(),
            price: Decimal::new(2999, 2),
            count_in_stock: 0,
        },
    ]
}

/// Insert the sample catalog.
///
/// # Errors
///
/// Returns `SeedError` if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), SeedError> {
    let database_url = super::database_url().map_err(SeedError::MissingEnvVar)?;

    tracing::info!("Connecting to database...");
    let pool = bramble_api::db::create_pool(&database_url).await?;

    let repo = ProductRepository::new(&pool);
    let products = sample_products();
    let count = products.len();

    for product in products {
        let created = repo.create(&product).await?;
        tracing::info!("Seeded product {}: {}", created.id, created.name);
    }

    tracing::info!("Seeding complete! {count} products inserted.");
    Ok(())
}
