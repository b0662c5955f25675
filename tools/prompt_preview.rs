/// Prompt preview — shows what each backend call would be asked, offline.
///
/// Usage: prompt_preview [--category <name>] <request text...>
///
/// Prints the detected category, the storyteller prompt, and the judge and
/// title prompts built around placeholder draft/story text.

use bedtime_story_engine::core::classifier::classify;
use bedtime_story_engine::core::prompt::compose_prompt;
use bedtime_story_engine::core::refine::judge_prompt;
use bedtime_story_engine::core::title::title_prompt;
use bedtime_story_engine::schema::category::Category;
use bedtime_story_engine::schema::story::{Draft, RefinedStory};
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: prompt_preview [--category <name>] <request text...>");
        process::exit(0);
    }

    let mut category = None;
    let mut words = Vec::new();
    let mut i = 1;
    while i < args.len() {
        if args[i] == "--category" && i + 1 < args.len() {
            i += 1;
            match args[i].parse::<Category>() {
                Ok(c) => category = Some(c),
                Err(e) => {
                    eprintln!("ERROR: {}", e);
                    process::exit(1);
                }
            }
        } else {
            words.push(args[i].clone());
        }
        i += 1;
    }

    let request = words.join(" ");
    if request.trim().is_empty() {
        eprintln!("ERROR: story request is empty");
        process::exit(1);
    }

    let detected = classify(&request);
    let category = category.unwrap_or(detected);
    println!("Detected category: {} ({})", detected.display_name(), detected.tag());
    if category != detected {
        println!("Using category:    {} ({})", category.display_name(), category.tag());
    }

    println!("\n--- Draft prompt ---");
    println!("{}", compose_prompt(&request, category));
    println!("\n--- Judge prompt ---");
    println!("{}", judge_prompt(&Draft::new("<draft story>"), &request));
    println!("--- Title prompt ---");
    println!("{}", title_prompt(&RefinedStory::new("<refined story>"), category));
    println!("--- End ---");
}
