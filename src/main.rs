use clap::Parser;

use quiz_hub::api::{HubClient, QuizHubApi};
use quiz_hub::library::Collection;
use quiz_hub::models::{Bucket, CurrentUser, HighScoreEntry, Question};
use quiz_hub::protocol::ImageUpload;
use quiz_hub::{client, library, logging, scores};
use quiz_hub::{load_draft, load_edit, Cli, Command, Config, QuizHubError};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_options(cli.options);

    if let Err(e) = logging::init(&config.log_file, config.log_level) {
        eprintln!("Error setting up logging: {}", e);
        std::process::exit(1);
    }

    let command = cli.command.unwrap_or(Command::Play);
    if let Err(e) = run(command, &config).await {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command, config: &Config) -> Result<(), QuizHubError> {
    match command {
        Command::Play => client::run(config).await,
        Command::Add { draft, image } => {
            let api = HubClient::new(config)?;
            let draft = load_draft(&draft)?;
            let image = image.map(ImageUpload::from_path).transpose()?;
            let user = api.current_user().await?;

            let question = library::create_question(&api, &user, draft, image).await?;
            println!("Created question {} ({})", question.id, question.title);
            Ok(())
        }
        Command::Edit { id, draft, image } => {
            let api = HubClient::new(config)?;
            let image = image.map(ImageUpload::from_path).transpose()?;
            let user = api.current_user().await?;

            let owned = library::fetch_owned(&api, &user, &id).await?;
            let draft = load_edit(&draft, &owned)?;
            let question = library::update_question(&api, &user, &id, draft, image).await?;
            println!("Updated question {} ({})", question.id, question.title);
            Ok(())
        }
        Command::Delete { id } => {
            let api = HubClient::new(config)?;
            let user = api.current_user().await?;

            library::delete_owned(&api, &user, &id).await?;
            println!("Deleted question {}", id);
            Ok(())
        }
        Command::List { all, mine } => {
            let api = HubClient::new(config)?;
            let collection = if mine {
                Collection::Mine
            } else if all {
                Collection::All
            } else {
                Collection::ActiveAll
            };
            let user = if mine {
                api.current_user().await?
            } else {
                CurrentUser::anonymous()
            };
            let questions = library::fetch_collection(&api, collection, &user).await?;
            print_questions(&questions);
            Ok(())
        }
        Command::Scores { bucket } => {
            let api = HubClient::new(config)?;
            match bucket {
                Some(name) => {
                    let bucket = Bucket::parse(&name.to_ascii_uppercase())
                        .ok_or(QuizHubError::UnknownBucket(name))?;
                    let entries = api.high_scores(bucket).await?;
                    print_board(bucket, &entries);
                }
                None => {
                    for (bucket, result) in scores::fetch_all(&api).await {
                        match result {
                            Ok(entries) => print_board(bucket, &entries),
                            Err(e) => println!("{}: {}\n", bucket.display_name(), e),
                        }
                    }
                }
            }
            Ok(())
        }
    }
}

fn print_questions(questions: &[Question]) {
    if questions.is_empty() {
        println!("No questions");
        return;
    }
    for question in questions {
        println!(
            "{:<26} {:<8} {:<18} {:<8} {}",
            question.id,
            question.difficulty.display_name(),
            question.category.display_name(),
            if question.is_active { "active" } else { "inactive" },
            question.title
        );
    }
}

fn print_board(bucket: Bucket, entries: &[HighScoreEntry]) {
    println!("{}", bucket.display_name());
    if entries.is_empty() {
        println!("  no scores yet\n");
        return;
    }
    let mut entries = entries.to_vec();
    entries.sort_by(|a, b| a.score().rank_cmp(&b.score()));
    for (index, entry) in entries.iter().enumerate() {
        let category = entry
            .category
            .map(|category| category.display_name())
            .unwrap_or("-");
        println!(
            "  {:>2}. {:<16} {:<18} {:>2} wrong {:>7.1}s  {}",
            index + 1,
            entry.player_name,
            category,
            entry.wrong_answer_count,
            entry.score_time,
            entry.date.format("%Y-%m-%d")
        );
    }
    println!();
}
