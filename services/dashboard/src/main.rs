use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use auth::{
    HttpAuthApi, LoginCredentials, PreferencesUpdate, RegisterProfile, SessionManager,
    SessionState,
};
use common::{ClientConfig, FileStore, http::build_client};
use dashboard::models::RestaurantQuery;
use dashboard::{Dashboard, HttpMealPlanApi, RestaurantClient, ToggleOutcome};

/// Meal planner command-line client
#[derive(Parser)]
#[command(name = "mealplan", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "MEALPLAN_PASSWORD")]
        password: String,
    },
    /// Create an account and store the session
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "MEALPLAN_PASSWORD")]
        password: String,
        #[arg(long)]
        budget: Option<f64>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Log out; the local session is cleared even if the backend is down
    Logout,
    /// Show whether a usable session is stored
    Status,
    /// Show today's meals and consumed nutrition
    Today,
    /// Flip a meal's completion flag
    Toggle { meal_id: String },
    /// Show today's grocery list
    Grocery,
    /// Replace dietary preferences and refresh today's plan
    Preferences {
        #[arg(long, value_delimiter = ',')]
        dietary: Option<Vec<String>>,
        #[arg(long, value_delimiter = ',')]
        cuisines: Option<Vec<String>>,
        #[arg(long, value_delimiter = ',')]
        allergies: Option<Vec<String>>,
    },
    /// Find restaurants near a location
    Restaurants {
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        budget: Option<f64>,
        #[arg(long)]
        cuisine: Option<String>,
    },
}

fn print_dashboard(dashboard: &Dashboard) {
    let state = dashboard.snapshot();
    if let Some(week) = &state.week_info {
        if let (Some(number), Some(day)) = (week.week_number, week.day_of_week.as_deref()) {
            println!("Week {}, {}", number, day);
        }
    }
    for entry in &state.entries {
        println!(
            "[{}] {:<24} {:<9} {:>6.0} kcal  (id {})",
            if entry.is_completed { "x" } else { " " },
            entry.title,
            format!("{:?}", entry.category),
            entry.nutrition.calories,
            entry.id
        );
    }
    let consumed = state.consumed;
    let remaining = state.remaining();
    println!(
        "Consumed: {:.0} kcal, {:.0}g protein, {:.0}g carbs, {:.0}g fat",
        consumed.calories, consumed.protein, consumed.carbs, consumed.fat
    );
    println!("Remaining: {:.0} kcal", remaining.calories);
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;
    let client = build_client(&config)?;

    let session = Arc::new(SessionManager::new(
        Arc::new(FileStore::open(config.session_file.clone())),
        Arc::new(HttpAuthApi::new(client.clone(), config.clone())),
    ));
    let dashboard = Dashboard::new(
        Arc::new(HttpMealPlanApi::new(client.clone(), config.clone())),
        session.clone(),
    );

    match cli.command {
        Command::Login { email, password } => {
            let session = session
                .login(&LoginCredentials { email, password })
                .await?;
            println!("Logged in as {} until {}", session.user.name, session.expires_at);
        }
        Command::Register {
            name,
            email,
            password,
            budget,
            location,
        } => {
            let session = session
                .register(&RegisterProfile {
                    name,
                    email,
                    password,
                    budget,
                    location,
                    ..Default::default()
                })
                .await?;
            println!("Welcome, {}", session.user.name);
        }
        Command::Logout => {
            session.logout().await;
            println!("Logged out");
        }
        Command::Status => match session.restore() {
            SessionState::Authenticated => {
                let name = session.stored_user().map(|u| u.name).unwrap_or_default();
                println!("Authenticated as {}", name);
            }
            SessionState::Unauthenticated => println!("Not logged in"),
        },
        Command::Today => {
            dashboard.load_today().await?;
            print_dashboard(&dashboard);
        }
        Command::Toggle { meal_id } => {
            dashboard.load_today().await?;
            match dashboard.toggle_completion(&meal_id).await {
                ToggleOutcome::Ignored => anyhow::bail!("No meal with id {} today", meal_id),
                ToggleOutcome::Confirmed => print_dashboard(&dashboard),
                ToggleOutcome::ReauthRequired => {
                    anyhow::bail!("Session expired, run `mealplan login` again")
                }
                ToggleOutcome::Retryable(err) => {
                    let message = dashboard
                        .snapshot()
                        .notice
                        .map(|n| n.message)
                        .unwrap_or_default();
                    anyhow::bail!("{} ({})", message, err)
                }
            }
        }
        Command::Grocery => {
            let list = dashboard.grocery_list().await?;
            for (category, items) in list.by_category() {
                println!("{}:", category);
                for item in items {
                    let mark = if item.is_checked { "x" } else { " " };
                    match &item.quantity {
                        Some(quantity) => println!("  [{}] {} ({})", mark, item.name, quantity),
                        None => println!("  [{}] {}", mark, item.name),
                    }
                }
            }
        }
        Command::Preferences {
            dietary,
            cuisines,
            allergies,
        } => {
            let update = PreferencesUpdate {
                dietary_preferences: dietary,
                cuisine_preferences: cuisines,
                allergies,
                budget: None,
            };
            dashboard.update_preferences(&session, &update).await?;
            print_dashboard(&dashboard);
        }
        Command::Restaurants {
            location,
            budget,
            cuisine,
        } => {
            let user = session.stored_user();
            let query = RestaurantQuery {
                location: location
                    .or_else(|| user.as_ref().and_then(|u| u.location.clone()))
                    .unwrap_or_default(),
                budget: budget.or_else(|| user.as_ref().and_then(|u| u.budget)),
                cuisine,
            };
            let restaurants = RestaurantClient::new(client, &config)
                .recommend(&query)
                .await?;
            for restaurant in restaurants {
                println!(
                    "{} ({}) {}",
                    restaurant.name,
                    restaurant.cuisine.as_deref().unwrap_or("-"),
                    restaurant.address.as_deref().unwrap_or("")
                );
            }
        }
    }

    dashboard.close();
    info!("Done");
    Ok(())
}
