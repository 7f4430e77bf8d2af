//! CLI tool to manage user accounts.
//!
//! Usage:
//!   cargo run --bin manage-users -- list
//!   cargo run --bin manage-users -- create --email <email> --password <password> [--name <name>]
//!   cargo run --bin manage-users -- reset-password --email <email> --password <password>

use std::env;

use testplan_lib::config::Config;
use testplan_lib::db::{DbPool, users};
use testplan_lib::services::auth;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let command = &args[1];
    if matches!(command.as_str(), "help" | "--help" | "-h") {
        print_usage();
        return;
    }

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match DbPool::new(&config).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error connecting to database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = pool.run_migrations().await {
        eprintln!("Error running migrations: {}", e);
        std::process::exit(1);
    }

    match command.as_str() {
        "list" | "ls" => list_users(&pool).await,
        "create" => {
            let email = required_arg(&args, "--email");
            let password = required_arg(&args, "--password");
            let name = optional_arg(&args, "--name");
            create_user(&pool, &email, &password, name.as_deref()).await;
        }
        "reset-password" => {
            let email = required_arg(&args, "--email");
            let password = required_arg(&args, "--password");
            reset_password(&pool, &email, &password).await;
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            std::process::exit(1);
        }
    }
}

fn optional_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .skip(2)
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 3))
        .cloned()
}

fn required_arg(args: &[String], flag: &str) -> String {
    match optional_arg(args, flag) {
        Some(value) => value,
        None => {
            eprintln!("Error: {} is required", flag);
            std::process::exit(1);
        }
    }
}

async fn list_users(pool: &DbPool) {
    let all = match users::list(pool.connection()).await {
        Ok(u) => u,
        Err(e) => {
            eprintln!("Error listing users: {}", e);
            std::process::exit(1);
        }
    };

    if all.is_empty() {
        println!("No users found.");
        return;
    }

    println!();
    println!("{:<6} {:<36} {:<24} {:<20}", "ID", "EMAIL", "NAME", "CREATED");
    println!("{}", "-".repeat(88));

    for user in all {
        println!(
            "{:<6} {:<36} {:<24} {:<20}",
            user.id,
            user.email,
            user.name.as_deref().unwrap_or("-"),
            user.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    println!();
}

async fn create_user(pool: &DbPool, email: &str, password: &str, name: Option<&str>) {
    match auth::register(pool, email, password, name).await {
        Ok(user) => {
            println!("Created user {} (id {})", user.email, user.id);
        }
        Err(e) => {
            eprintln!("Error creating user: {}", e);
            std::process::exit(1);
        }
    }
}

async fn reset_password(pool: &DbPool, email: &str, password: &str) {
    let email = match auth::validate_credentials(email, password) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let hash = auth::hash_password(password);
    match users::update_password(pool.connection(), &email, &hash).await {
        Ok(true) => println!("Password reset for {}", email),
        Ok(false) => {
            eprintln!("Error: no user with email {}", email);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error resetting password: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!(
        r#"
Manage user accounts

USAGE:
    manage-users <COMMAND> [OPTIONS]

COMMANDS:
    list, ls          List all users
    create            Create a user
    reset-password    Set a new password for an existing user
    help              Show this help message

OPTIONS:
    --email <EMAIL>         Account email
    --password <PASSWORD>   Password (at least 6 characters)
    --name <NAME>           Display name (create only)

EXAMPLES:
    manage-users list
    manage-users create --email qa@example.com --password secret1 --name "QA Lead"
    manage-users reset-password --email qa@example.com --password newsecret
"#
    );
}
