//! Diet Tracker CLI
//!
//! Terminal front end over the page models:
//! - Browse foods and the forum
//! - Log meals and view the nutrition dashboard
//! - Build, save and schedule meal plans
//! - Manage the session and preferences

use anyhow::{anyhow, bail, Context};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use diet_tracker::api::{ApiClient, FoodSort, FoodsApi, ForumApi, NutritionApi, PostSort, SortOrder};
use diet_tracker::auth::AuthSession;
use diet_tracker::config::{generate_default_config, Config, LoggingConfig};
use diet_tracker::models::{MealType, NewFoodLogEntry};
use diet_tracker::nutrition::write_logs_csv;
use diet_tracker::pages::{
    forum, new_post_cache, render_food, FoodProposalForm, FoodsPage, ForumPage, LikeTracker,
    LoginForm, MealPlanDraft, NutritionDashboard, PostDetail, PostForm, ProfilePage,
    SavedPlansPage, SignupForm,
};
use diet_tracker::storage::{FileStore, KeyValueStore, Language, Preferences, LANGUAGE_KEY};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "diet-tracker")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Track meals, nutrition and meal plans from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: platform config dir, then ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Log in; the password is read from stdin when omitted
    Login {
        username: String,
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Log out and forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Create an account
    Signup {
        username: String,
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        surname: String,
        #[arg(long)]
        password: String,
        /// Password confirmation
        #[arg(long)]
        confirm: String,
    },

    /// Browse the food catalog
    Foods {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Dietary option, e.g. vegan
        #[arg(long)]
        diet: Option<String>,
        /// Sort field (name, calories, protein, carbs, fat, score)
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
        #[arg(short, long, default_value = "1")]
        page: u32,
        /// Hide foods with this allergen (repeatable)
        #[arg(long = "exclude-allergen")]
        exclude_allergens: Vec<String>,
        /// Minimum nutrition score among the loaded foods
        #[arg(long)]
        min_score: Option<f64>,
    },

    /// Show one food
    Food { id: u64 },

    /// Propose a new food for the catalog
    ProposeFood {
        name: String,
        #[arg(long)]
        category: String,
        /// Serving size in grams
        #[arg(long, default_value = "100")]
        serving_size: f64,
        #[arg(long, default_value = "0")]
        calories: f64,
        #[arg(long, default_value = "0")]
        protein: f64,
        #[arg(long, default_value = "0")]
        fat: f64,
        #[arg(long, default_value = "0")]
        carbs: f64,
        #[arg(long = "diet")]
        dietary_options: Vec<String>,
        #[arg(long)]
        image_url: Option<String>,
    },

    /// Browse forum posts
    Forum {
        /// Tag filter (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        /// Ordering (newest, oldest, most-liked)
        #[arg(long, default_value = "newest")]
        sort: String,
        #[arg(short, long)]
        search: Option<String>,
        #[arg(short, long, default_value = "1")]
        page: u32,
        /// List the available tags instead
        #[arg(long)]
        list_tags: bool,
    },

    /// Show a post with its comments and recipe
    Post { id: u64 },

    /// Create a forum post
    NewPost {
        title: String,
        body: String,
        /// Tag id (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<u64>,
    },

    /// Like or unlike a post
    Like { id: u64 },

    /// Comment on a post
    Comment { post_id: u64, body: String },

    /// Show a user's profile
    Profile { username: String },

    /// Follow or unfollow a user
    Follow { username: String },

    /// Nutrition dashboard for a day
    Log {
        /// today, yesterday or YYYY-MM-DD
        #[arg(short, long, default_value = "today")]
        date: String,
    },

    /// Log a food
    LogFood {
        food_id: u64,
        amount: f64,
        #[arg(short, long, default_value = "g")]
        unit: String,
        /// breakfast, lunch, dinner or snack
        #[arg(short, long, default_value = "snack")]
        meal: String,
        #[arg(short, long, default_value = "today")]
        date: String,
    },

    /// Delete a logged food entry
    Unlog {
        entry_id: u64,
        #[arg(short, long, default_value = "today")]
        date: String,
    },

    /// Show nutrition targets
    Targets,

    /// List saved meal plans
    Plans {
        /// Delete this plan instead
        #[arg(long)]
        delete: Option<u64>,
    },

    /// Save a meal plan; items are FOOD_ID:AMOUNT[UNIT]:MEAL, e.g. 12:150g:lunch
    PlanCreate {
        name: String,
        #[arg(short, long = "item", required = true)]
        items: Vec<String>,
    },

    /// Schedule a saved plan on a day
    PlanLog {
        id: u64,
        #[arg(short, long, default_value = "today")]
        date: String,
    },

    /// Export daily logs as CSV
    ExportLogs {
        #[arg(long)]
        from: String,
        #[arg(long, default_value = "today")]
        to: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show or set the interface language (en, tr)
    Language { code: Option<String> },
}

struct App {
    config: Config,
    client: Arc<ApiClient>,
    store: Arc<dyn KeyValueStore>,
    session: AuthSession<ApiClient>,
    json: bool,
}

impl App {
    fn likes(&self) -> LikeTracker {
        LikeTracker::new(Arc::clone(&self.store))
    }

    fn page_size(&self) -> u32 {
        self.config.api.page_size
    }

    fn require_auth(&self) -> anyhow::Result<()> {
        self.session
            .require_auth()
            .map(|_| ())
            .map_err(|_| anyhow!("You need to log in first: diet-tracker login <username>"))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config.logging);

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, &content)?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let storage_path = config.storage.resolved_path();
    let store: Arc<dyn KeyValueStore> = Arc::new(
        FileStore::open(&storage_path)
            .with_context(|| format!("Failed to open storage at {:?}", storage_path))?,
    );
    let client = Arc::new(ApiClient::from_config(&config.api)?);
    tracing::debug!("Using API at {}", client.base_url());

    let session = AuthSession::new(Arc::clone(&client), client.tokens(), Arc::clone(&store));
    if let Err(e) = session.restore().await {
        tracing::warn!(error = %e, "Could not restore session");
    }

    let app = App {
        config,
        client,
        store,
        session,
        json: cli.format == OutputFormat::Json,
    };

    let result = run(&app, cli.command).await;

    // The client may have refreshed or dropped the tokens
    if let Err(e) = app.session.persist_tokens() {
        tracing::warn!(error = %e, "Failed to persist session");
    }
    result
}

async fn run(app: &App, command: Commands) -> anyhow::Result<()> {
    let api = app.client.as_ref();

    match command {
        Commands::Config { .. } => {}

        Commands::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => read_line("Password: ")?,
            };
            let user = LoginForm::new(&username, &password)
                .submit(&app.session)
                .await?;
            println!("Logged in as {}", user.display_name());
        }

        Commands::Logout => {
            app.session.logout().await?;
            println!("Logged out");
        }

        Commands::Whoami => match app.session.current_user() {
            Some(user) if app.json => print_json(&user)?,
            Some(user) => println!("{} (@{}) <{}>", user.display_name(), user.username, user.email),
            None => println!("Not logged in"),
        },

        Commands::Signup {
            username,
            email,
            name,
            surname,
            password,
            confirm,
        } => {
            let form = SignupForm {
                username,
                email,
                password,
                confirm_password: confirm,
                name,
                surname,
            };
            let user = form.submit(api).await?;
            println!("Account created for @{}. You can now log in.", user.username);
        }

        Commands::Foods {
            search,
            category,
            diet,
            sort,
            desc,
            page,
            exclude_allergens,
            min_score,
        } => {
            let mut view = FoodsPage::new(app.page_size());
            view.set_search(search);
            view.set_category(category);
            view.set_dietary_option(diet);
            if let Some(sort) = sort {
                view.sort_by(sort.parse::<FoodSort>().map_err(|e| anyhow!(e))?);
            }
            if desc {
                view.set_order(SortOrder::Desc);
            }
            view.start_at_page(page);

            let filter = view.local_filter_mut();
            filter.exclude_allergens = exclude_allergens;
            filter.min_score = min_score;

            view.load(api).await;
            if app.json {
                print_json(&view.visible_foods())?;
            } else {
                print!("{}", view.render());
            }
        }

        Commands::Food { id } => {
            let food = api.get_food(id).await?;
            if app.json {
                print_json(&food)?;
            } else {
                print!("{}", render_food(&food));
            }
        }

        Commands::ProposeFood {
            name,
            category,
            serving_size,
            calories,
            protein,
            fat,
            carbs,
            dietary_options,
            image_url,
        } => {
            app.require_auth()?;
            let form = FoodProposalForm {
                name,
                category,
                serving_size,
                calories,
                protein,
                fat,
                carbohydrate: carbs,
                dietary_options,
                image_url,
            };
            let proposal = form.submit(api).await?;
            println!("Proposed {}. It will appear once reviewed.", proposal.name);
        }

        Commands::Forum {
            tags,
            sort,
            search,
            page,
            list_tags,
        } => {
            let cache = new_post_cache(app.config.cache.post_ttl());
            let mut view = ForumPage::new(app.page_size(), cache, app.likes());

            if list_tags {
                view.load_tags(api).await;
                match view.tags().value() {
                    Some(tags) if app.json => print_json(tags)?,
                    Some(tags) => {
                        for tag in tags {
                            println!("{:>4}  {}", tag.id, tag.name);
                        }
                    }
                    None => println!("{}", view.tags().error().unwrap_or_default()),
                }
                return Ok(());
            }

            view.set_tags(tags);
            view.set_sort(sort.parse::<PostSort>().map_err(|e| anyhow!(e))?);
            view.set_search(search);
            view.start_at_page(page);
            view.load(api).await;

            if app.json {
                print_json(&view.visible_posts())?;
            } else {
                print!("{}", view.render());
            }
        }

        Commands::Post { id } => {
            let mut detail = PostDetail::new(id);
            detail.load(api, &app.likes()).await;
            match detail.post().value() {
                Some(post) if app.json => print_json(post)?,
                _ => print!("{}", detail.render()),
            }
        }

        Commands::NewPost { title, body, tags } => {
            app.require_auth()?;
            let form = PostForm {
                title,
                body,
                tags,
                recipe: None,
            };
            let post = form.submit(api, None).await?;
            println!("Created post #{}", post.id);
        }

        Commands::Like { id } => {
            app.require_auth()?;
            let likes = app.likes();
            let mut post = api.get_post(id).await?;
            likes.apply(std::slice::from_mut(&mut post));

            let liked = forum::toggle_like(api, &mut post, &likes).await?;
            let verb = if liked { "Liked" } else { "Unliked" };
            println!("{} post #{} ({} likes)", verb, post.id, post.likes);
        }

        Commands::Comment { post_id, body } => {
            app.require_auth()?;
            let mut detail = PostDetail::new(post_id);
            let comment = detail.add_comment(api, &body).await?;
            println!("Comment #{} added", comment.id);
        }

        Commands::Profile { username } => {
            let mut view = ProfilePage::new(&username);
            view.load(api).await;
            match view.profile().value() {
                Some(user) if app.json => print_json(user)?,
                _ => print!("{}", view.render()),
            }
        }

        Commands::Follow { username } => {
            app.require_auth()?;
            let mut view = ProfilePage::new(&username);
            view.load(api).await;
            let following = view.toggle_follow(api).await?;
            let verb = if following { "Following" } else { "Unfollowed" };
            println!("{} @{}", verb, username);
        }

        Commands::Log { date } => {
            app.require_auth()?;
            let mut dashboard = NutritionDashboard::new(parse_date(&date)?);
            dashboard.load(api).await;
            match dashboard.log().value() {
                Some(log) if app.json => print_json(log)?,
                _ => print!("{}", dashboard.render()),
            }
        }

        Commands::LogFood {
            food_id,
            amount,
            unit,
            meal,
            date,
        } => {
            app.require_auth()?;
            let entry = NewFoodLogEntry {
                food_id,
                serving_size: amount,
                serving_unit: unit,
                meal_type: meal.parse::<MealType>().map_err(|e| anyhow!(e))?,
            };
            let mut dashboard = NutritionDashboard::new(parse_date(&date)?);
            let logged = dashboard.log_food(api, &entry).await?;
            println!(
                "Logged {} {}{} of {} for {} ({:.0} kcal)",
                logged.meal_type,
                logged.serving_size,
                logged.serving_unit,
                logged.food_name,
                dashboard.date(),
                logged.calories
            );
        }

        Commands::Unlog { entry_id, date } => {
            app.require_auth()?;
            let mut dashboard = NutritionDashboard::new(parse_date(&date)?);
            dashboard.delete_entry(api, entry_id).await?;
            println!("Removed entry #{}", entry_id);
        }

        Commands::Targets => {
            app.require_auth()?;
            let targets = api.get_nutrition_targets().await?;
            if app.json {
                print_json(&targets)?;
            } else {
                println!("Calories:       {:.0} kcal", targets.calories);
                println!("Protein:        {:.0} g", targets.protein);
                println!("Carbohydrates:  {:.0} g", targets.carbohydrates);
                println!("Fat:            {:.0} g", targets.fat);
                for (key, value) in &targets.micronutrients {
                    println!("  {:<28} {}", key, value);
                }
            }
        }

        Commands::Plans { delete } => {
            app.require_auth()?;
            let mut view = SavedPlansPage::new();
            view.load(api).await;
            if let Some(id) = delete {
                view.delete(api, id).await?;
                println!("Deleted plan #{}", id);
            }
            if app.json {
                print_json(&view.state().items())?;
            } else {
                print!("{}", view.render());
            }
        }

        Commands::PlanCreate { name, items } => {
            app.require_auth()?;
            let mut draft = MealPlanDraft::new(&name);
            for item in &items {
                let (food_id, amount, unit, meal) = parse_plan_item(item)?;
                let food = api.get_food(food_id).await?;
                draft.add(food, amount, &unit, meal);
            }
            print!("{}", draft.render());
            let saved = draft.save(api).await?;
            println!("Saved plan #{} {}", saved.id, saved.name);
        }

        Commands::PlanLog { id, date } => {
            app.require_auth()?;
            let date = parse_date(&date)?;
            SavedPlansPage::new().log_plan(api, id, date).await?;
            println!("Plan #{} scheduled for {}", id, date);
        }

        Commands::ExportLogs { from, to, output } => {
            app.require_auth()?;
            let (from, to) = (parse_date(&from)?, parse_date(&to)?);
            if from > to {
                bail!("--from must not be after --to");
            }
            let logs = api.get_logs_range(from, to).await?;

            match output {
                Some(path) => {
                    let file = std::fs::File::create(&path)?;
                    write_logs_csv(&logs, file)?;
                    println!("Exported {} days to {:?}", logs.len(), path);
                }
                None => write_logs_csv(&logs, std::io::stdout().lock())?,
            }
        }

        Commands::Language { code } => {
            let prefs = Preferences::new(Arc::clone(&app.store));
            match code {
                Some(code) => {
                    let language = code.parse::<Language>().map_err(|e| anyhow!(e))?;
                    prefs.set_language(language)?;
                    println!("Language set to {}", language);
                }
                None => {
                    let language = if app.store.get(LANGUAGE_KEY).is_some() {
                        prefs.language()
                    } else {
                        app.config.ui.language.parse().unwrap_or_default()
                    };
                    println!("{}", language);
                }
            }
        }
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("diet_tracker={}", config.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_line(prompt: &str) -> anyhow::Result<String> {
    eprint!("{}", prompt);
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// "today", "yesterday" or YYYY-MM-DD
fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    let today = Local::now().date_naive();
    match s.trim().to_lowercase().as_str() {
        "today" => Ok(today),
        "yesterday" => today
            .pred_opt()
            .ok_or_else(|| anyhow!("Date out of range")),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
            .with_context(|| format!("Invalid date: {}. Use: today, yesterday, YYYY-MM-DD", s)),
    }
}

/// FOOD_ID:AMOUNT[UNIT]:MEAL, e.g. "12:150g:lunch" or "3:2serving:snack"
fn parse_plan_item(s: &str) -> anyhow::Result<(u64, f64, String, MealType)> {
    let parts: Vec<&str> = s.split(':').map(str::trim).collect();
    let [food_id, amount, meal] = parts.as_slice() else {
        bail!("Invalid plan item: {}. Use FOOD_ID:AMOUNT[UNIT]:MEAL", s);
    };

    let food_id: u64 = food_id
        .parse()
        .with_context(|| format!("Invalid food id in {}", s))?;
    let split = amount
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(amount.len());
    let (number, unit) = amount.split_at(split);
    let amount: f64 = number
        .parse()
        .with_context(|| format!("Invalid amount in {}", s))?;
    let unit = if unit.is_empty() { "g" } else { unit };
    let meal = meal.parse::<MealType>().map_err(|e| anyhow!(e))?;

    Ok((food_id, amount, unit.to_string(), meal))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan_item() {
        let (id, amount, unit, meal) = parse_plan_item("12:150g:lunch").unwrap();
        assert_eq!((id, amount, unit.as_str(), meal), (12, 150.0, "g", MealType::Lunch));

        let (_, amount, unit, _) = parse_plan_item("3:2serving:snack").unwrap();
        assert_eq!((amount, unit.as_str()), (2.0, "serving"));

        let (_, _, unit, _) = parse_plan_item("3:80:dinner").unwrap();
        assert_eq!(unit, "g");

        assert!(parse_plan_item("3:80").is_err());
        assert!(parse_plan_item("x:80g:dinner").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(parse_date("today").unwrap(), Local::now().date_naive());
        assert!(parse_date("29/02/2024").is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "diet-tracker",
            "--format",
            "json",
            "foods",
            "--sort",
            "calories",
            "--desc",
            "--exclude-allergen",
            "gluten",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Foods { desc: true, .. }));
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Cli::try_parse_from(["diet-tracker", "--format", "xml", "whoami"]).is_err());

        let cli = Cli::try_parse_from(["diet-tracker", "whoami"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Table);
    }
}
