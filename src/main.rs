//! webpilot - a vision-grounded web browsing agent
//!
//! Main entry point for the CLI application.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use webpilot::{Agent, ChromiumBrowser, Config, ConsoleObserver};

/// webpilot - let a local multimodal model browse the web for you
#[derive(Parser, Debug)]
#[command(name = "webpilot")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Task for the agent; read from stdin when omitted
    task: Option<String>,

    /// URL the browsing session starts from
    #[arg(long, default_value = "https://www.google.com")]
    url: String,

    /// Decision model to use
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Maximum decision turns before giving up
    #[arg(long)]
    max_steps: Option<usize>,

    /// Run with a visible browser window
    #[arg(long)]
    headed: bool,

    /// Directory to write per-turn screenshots into
    #[arg(long)]
    screenshot_dir: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webpilot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if let Some(ref model) = args.model {
        config.model.name = model.clone();
    }

    if let Some(max_steps) = args.max_steps {
        config.agent.max_steps = max_steps;
    }

    if args.headed {
        config.browser.headless = false;
    }

    if let Some(ref dir) = args.screenshot_dir {
        config.agent.screenshot_dir = Some(dir.clone());
    }

    let start_url = url::Url::parse(&args.url)?;

    let task = match args.task {
        Some(task) => task,
        None => {
            print!("Please enter the task for the agent: ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line.trim().to_string()
        }
    };

    if task.is_empty() {
        anyhow::bail!("no task given");
    }

    let observer = match config.agent.screenshot_dir.clone() {
        Some(dir) => ConsoleObserver::with_screenshot_dir(dir),
        None => ConsoleObserver::new(),
    };

    let agent = Agent::new(config.clone()).with_observer(Arc::new(observer));
    agent.initialize().await?;

    let browser = ChromiumBrowser::launch(&config.browser).await?;
    let page = Arc::new(browser.new_page(start_url.as_str()).await?);

    let answer = agent.run(&task, page).await;
    browser.close().await?;

    match answer? {
        Some(answer) => println!("Final response: {}", answer),
        None => println!("No answer within the step budget."),
    }

    Ok(())
}
