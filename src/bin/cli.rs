use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use slateworks::cli::create_admin;
use slateworks::cli::seeder::{SeedConfig, clear_seeded_data, seed_database};

#[derive(Parser)]
#[command(name = "slateworks-cli")]
#[command(about = "Slateworks CLI - Administrative tools for Slateworks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new admin account
    CreateAdmin {
        /// First name of the admin
        #[arg(short = 'f', long)]
        first_name: String,

        /// Last name of the admin
        #[arg(short = 'l', long)]
        last_name: String,

        /// Email address
        #[arg(short = 'e', long)]
        email: String,

        /// Password
        #[arg(short = 'p', long)]
        password: String,
    },
    /// Seed the database with fake classes, users and books
    Seed {
        /// Number of students to create
        #[arg(long, default_value = "50")]
        students: usize,

        /// Number of teachers to create
        #[arg(long, default_value = "10")]
        teachers: usize,

        /// Number of classes to create
        #[arg(long, default_value = "6")]
        classes: usize,

        /// Number of books to create
        #[arg(long, default_value = "40")]
        books: usize,
    },
    /// Clear all seeded data (keeps admins)
    ClearSeed,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    let cli = Cli::parse();

    match cli.command {
        Commands::CreateAdmin {
            first_name,
            last_name,
            email,
            password,
        } => handle_create_admin(&pool, first_name, last_name, email, password).await,
        Commands::Seed {
            students,
            teachers,
            classes,
            books,
        } => handle_seed(&pool, students, teachers, classes, books).await,
        Commands::ClearSeed => handle_clear_seed(&pool).await,
    }
}

async fn handle_create_admin(
    pool: &sqlx::postgres::PgPool,
    first_name: String,
    last_name: String,
    email: String,
    password: String,
) {
    match create_admin(pool, &first_name, &last_name, &email, &password).await {
        Ok(_) => {
            println!("\n✅ Admin created successfully!");
            println!("   Email: {}", email);
            println!("   Name: {} {}", first_name, last_name);
        }
        Err(e) => {
            eprintln!("\n❌ Error creating admin: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_seed(
    pool: &sqlx::postgres::PgPool,
    students: usize,
    teachers: usize,
    classes: usize,
    books: usize,
) {
    let config = SeedConfig {
        students,
        teachers,
        classes,
        books,
    };

    match seed_database(pool, config).await {
        Ok(_) => {}
        Err(e) => {
            eprintln!("\n❌ Error seeding database: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_clear_seed(pool: &sqlx::postgres::PgPool) {
    match clear_seeded_data(pool).await {
        Ok(_) => {}
        Err(e) => {
            eprintln!("\n❌ Error clearing seeded data: {}", e);
            std::process::exit(1);
        }
    }
}
