use classbook_cli::seeder::{self, SeedConfig};
use classbook_config::DatabaseConfig;
use classbook_core::{AppError, hash_password};
use classbook_db::checks::EMAIL_TAKEN;
use classbook_db::{PgStore, SchoolStore, init_db_pool, run_migrations};
use classbook_models::LoginRequest;
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use validator::Validate;

#[derive(Parser)]
#[command(name = "classbook-cli")]
#[command(about = "Classbook CLI - Administrative tools for Classbook", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an API user that can log in and call every endpoint
    CreateUser {
        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed the database with fake grades, classrooms, teachers and students
    Seed {
        /// Number of grades to create
        #[arg(long, default_value = "5")]
        grades: usize,

        /// Number of classrooms to create
        #[arg(long, default_value = "12")]
        classrooms: usize,

        /// Number of students to create
        #[arg(long, default_value = "100")]
        students: usize,

        /// Number of teachers to create
        #[arg(long, default_value = "10")]
        teachers: usize,
    },
    /// Delete all school data (keeps API users)
    Clear,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let database_config = DatabaseConfig::from_env();
    if database_config.url.is_none() {
        eprintln!("❌ DATABASE_URL must be set");
        std::process::exit(1);
    }

    let store = match connect(&database_config).await {
        Ok(store) => store,
        Err(e) => {
            eprintln!("❌ Failed to connect to database: {}", e.error);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::CreateUser { email, password } => {
            handle_create_user(&store, email, password).await
        }
        Commands::Seed {
            grades,
            classrooms,
            students,
            teachers,
        } => handle_seed(&store, grades, classrooms, students, teachers).await,
        Commands::Clear => handle_clear(&store).await,
    }
}

async fn connect(config: &DatabaseConfig) -> Result<PgStore, AppError> {
    let pool = init_db_pool(config).await?;
    run_migrations(&pool).await?;
    Ok(PgStore::new(pool))
}

async fn handle_create_user(store: &PgStore, email: Option<String>, password: Option<String>) {
    let email = email.unwrap_or_else(|| {
        Input::new()
            .with_prompt("Email address")
            .interact_text()
            .expect("Failed to read email")
    });

    let password = password.unwrap_or_else(|| {
        Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .expect("Failed to read password")
    });

    match create_user_internal(store, &email, &password).await {
        Ok(_) => {
            println!("\n✅ User created successfully!");
            println!("   Email: {}", email);
        }
        Err(e) => {
            eprintln!("\n❌ Error creating user: {}", describe(&e));
            std::process::exit(1);
        }
    }
}

async fn create_user_internal(
    store: &dyn SchoolStore,
    email: &str,
    password: &str,
) -> Result<(), AppError> {
    let request = LoginRequest {
        email: email.trim().to_string(),
        password: password.to_string(),
    };
    request
        .validate()
        .map_err(|e| AppError::from_validation(&e))?;

    if store.find_user_by_email(&request.email).await?.is_some() {
        return Err(AppError::invalid_field("email", EMAIL_TAKEN));
    }

    let password_hash = hash_password(&request.password)?;
    store.create_user(&request.email, &password_hash).await?;
    Ok(())
}

async fn handle_seed(
    store: &PgStore,
    grades: usize,
    classrooms: usize,
    students: usize,
    teachers: usize,
) {
    let config = SeedConfig::default()
        .with_grades(grades)
        .with_classrooms(classrooms)
        .with_students(students)
        .with_teachers(teachers);

    if let Err(e) = seeder::seed_all(store, config).await {
        eprintln!("\n❌ Error seeding database: {}", describe(&e));
        std::process::exit(1);
    }
}

async fn handle_clear(store: &PgStore) {
    match seeder::clear_all(store).await {
        Ok(()) => println!("✅ School data cleared"),
        Err(e) => {
            eprintln!("\n❌ Error clearing data: {}", describe(&e));
            std::process::exit(1);
        }
    }
}

/// Flattens field errors into one line for the terminal.
fn describe(error: &AppError) -> String {
    match &error.fields {
        Some(fields) => fields
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect::<Vec<_>>()
            .join("; "),
        None => error.error.to_string(),
    }
}
