/// Storyteller — terminal front end for the bedtime story pipeline.
///
/// Usage: storyteller [--config <path>] [--category <name>] [--prompt <text>] [--json] [--guard]
///
/// Without --prompt, shows the category menu:
///   1-5  pick a category, then accept its default request or type your own
///   6    write a custom request; the category is detected from it
///
/// The API key comes from OPENAI_API_KEY (a .env file is honored).
/// Set RUST_LOG=debug to trace each pipeline stage.

use bedtime_story_engine::core::config::EngineConfig;
use bedtime_story_engine::core::guard::GuardConfig;
use bedtime_story_engine::core::pipeline::ChatPipeline;
use bedtime_story_engine::schema::category::Category;
use bedtime_story_engine::schema::request::StoryRequest;
use bedtime_story_engine::schema::story::StoryResult;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process;

const DEFAULT_CONFIG: &str = "config/storyteller.ron";

struct Options {
    config_path: String,
    category: Option<Category>,
    prompt: Option<String>,
    json: bool,
    guard: bool,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let options = parse_args();

    let mut config = load_config(&options.config_path);
    if options.guard && config.guard.is_none() {
        config.guard = Some(GuardConfig::default());
    }
    let pipeline = match ChatPipeline::from_config(&config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    let request = match options.prompt {
        Some(ref text) => match options.category {
            Some(category) => StoryRequest::for_category(category, text),
            None => match StoryRequest::new(text.as_str()) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("ERROR: {}", e);
                    process::exit(1);
                }
            },
        },
        None => match interactive_request(options.category) {
            Some(r) => r,
            None => {
                println!("Nothing to tell a story about. Goodnight!");
                return;
            }
        },
    };

    if !options.json {
        println!("\nSpinning a bedtime tale...");
    }

    match pipeline.run_request(&request).await {
        Ok(result) if options.json => match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("ERROR: {}", e);
                process::exit(1);
            }
        },
        Ok(result) => print_story(&result),
        Err(e) => {
            eprintln!("Error generating story: {}", e);
            eprintln!("Make sure your environment is properly configured (OPENAI_API_KEY).");
            process::exit(1);
        }
    }
}

fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let mut options = Options {
        config_path: DEFAULT_CONFIG.to_string(),
        category: None,
        prompt: None,
        json: false,
        guard: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                options.config_path = args[i].clone();
            }
            "--category" if i + 1 < args.len() => {
                i += 1;
                match args[i].parse::<Category>() {
                    Ok(c) => options.category = Some(c),
                    Err(e) => {
                        eprintln!("{}", e);
                        print_categories();
                        process::exit(1);
                    }
                }
            }
            "--prompt" if i + 1 < args.len() => {
                i += 1;
                options.prompt = Some(args[i].clone());
            }
            "--json" => options.json = true,
            "--guard" => options.guard = true,
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }
    options
}

fn load_config(path: &str) -> EngineConfig {
    let path = Path::new(path);
    let mut config = match EngineConfig::load_or_default(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: Failed to load config '{}': {}", path.display(), e);
            process::exit(1);
        }
    };
    if let Err(e) = config.apply_process_env() {
        eprintln!("ERROR: {}", e);
        process::exit(1);
    }
    config
}

/// Walk the reader through the menu. Returns `None` when the request is blank.
fn interactive_request(preselected: Option<Category>) -> Option<StoryRequest> {
    if let Some(category) = preselected {
        let custom = prompt_line(&format!(
            "Default: '{}'\nCustom prompt (press Enter for default): ",
            category.default_request()
        ))?;
        return Some(StoryRequest::for_category(category, &custom));
    }

    println!("Welcome to the Bedtime Story Generator!");
    println!("\nChoose an option:");
    for (i, category) in Category::ALL.iter().enumerate() {
        println!("{}. {}", i + 1, category.display_name());
    }
    println!("{}. Custom Story (write your own prompt)", Category::ALL.len() + 1);

    let choice = prompt_line("\nEnter your choice (1-6): ")?;

    if let Some(category) = Category::from_menu(&choice) {
        let custom = prompt_line(&format!(
            "\nGreat choice! You can use the default or customize:\nDefault: '{}'\nCustom prompt (press Enter for default): ",
            category.default_request()
        ))?;
        return Some(StoryRequest::for_category(category, &custom));
    }

    if choice.trim() != "6" {
        println!("Invalid choice. Using custom prompt mode.");
    }
    let text = prompt_line("\nWhat kind of story do you want to hear? ")?;
    StoryRequest::new(text).ok()
}

fn prompt_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    io::stdout().flush().ok();

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
    }
}

fn print_story(result: &StoryResult) {
    println!("\nHere's your {} story\n", result.category.label());
    println!("{}", "=".repeat(60));
    println!("{}", result.title);
    println!("{}", "=".repeat(60));
    println!();
    println!("{}", result.story);
    println!();
    println!("Category: {}", result.category.display_name());
    println!("Words: ~{}", result.word_count());
}

fn print_categories() {
    println!("Categories:");
    for category in Category::ALL {
        println!("  {:<18} {}", category.tag(), category.display_name());
    }
}

fn print_usage() {
    println!("Usage: storyteller [--config <path>] [--category <name>] [--prompt <text>] [--json] [--guard]");
    println!();
    println!("  --config <path>    RON config file (default: {})", DEFAULT_CONFIG);
    println!("  --category <name>  skip detection and use this category");
    println!("  --prompt <text>    tell one story for this request and exit");
    println!("  --json             print the result as JSON");
    println!("  --guard            reject stories that fail the content guard");
    println!();
    print_categories();
}
