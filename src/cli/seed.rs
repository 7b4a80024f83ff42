use sqlx::postgres::PgPoolOptions;
use tracing::info;
use uuid::Uuid;

pub struct SeedOpts {
    pub database_url: String,
}

/// The categories every fresh installation starts with. Seeding is
/// idempotent; categories a user already renamed or created are untouched.
const DEFAULT_CATEGORIES: [&str; 12] = [
    "Housing",
    "Food",
    "Transportation",
    "Entertainment",
    "Utilities",
    "Healthcare",
    "Shopping",
    "Education",
    "Salary",
    "Investments",
    "Side Hustle",
    "Other",
];

pub async fn run_seed(opts: SeedOpts) -> anyhow::Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&opts.database_url)
        .await?;

    let mut created = 0u64;

    for name in DEFAULT_CATEGORIES {
        let result = sqlx::query(
            r#"
            INSERT INTO category (id, name)
            VALUES ($1, $2)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .execute(&pool)
        .await?;

        created += result.rows_affected();
    }

    info!(created, "Seeded default categories.");

    Ok(())
}
