//! Promptor CLI - fill schema forms and compose prompts

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

use promptor::error::{FixSuggestion, PromptorError};
use promptor::export::{read_input, write_input, write_prompt};
use promptor::{
    derive_ref, generate, render_ansi, FileStore, FormState, KnownRefs, PromptorConfig,
    RefPalette, SchemaStore, Severity, UnresolvedPolicy, Validator,
};

#[derive(Parser)]
#[command(name = "promptor")]
#[command(about = "Promptor - schema-driven forms that compose prompt text")]
#[command(version)]
struct Cli {
    /// Schema directory (overrides config and PROMPTOR_SCHEMA_DIR)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List schema ids in the store
    List,

    /// Print the ref derived from a label
    Slug {
        label: String,
    },

    /// Print a schema's known refs (components, then fragments)
    Refs {
        id: String,
    },

    /// Validate a schema; fails unless it could be published
    Check {
        id: String,
    },

    /// Print the template with refs colored, unknown refs in red
    Highlight {
        id: String,
    },

    /// Fill a schema from a JSON input and print the prompt
    Generate {
        id: String,

        /// JSON object of ref → value
        #[arg(short, long)]
        input: PathBuf,

        /// Also write <id>_prompt.md and <id>_input.json here
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// What to do with placeholders that have no value (keep, blank, error)
        #[arg(long)]
        unresolved: Option<UnresolvedPolicy>,

        /// Seed dropdown defaults before applying the input
        #[arg(long)]
        defaults: bool,
    },

    /// List color schemes
    Schemes,
}

/// Process-wide state, built once and handed to each command
struct App {
    config: PromptorConfig,
    store: FileStore,
}

impl App {
    fn new(dir_override: Option<PathBuf>) -> Result<Self, PromptorError> {
        let mut config = PromptorConfig::load()?.with_env()?;
        if let Some(dir) = dir_override {
            config.store.schema_dir = dir;
        }
        let store = FileStore::new(config.store.schema_dir.clone())
            .with_validator(Validator::new(config.style.fallback_color.clone()));
        Ok(Self { config, store })
    }

    fn validator(&self) -> Validator {
        Validator::new(self.config.style.fallback_color.clone())
    }
}

#[tokio::main]
async fn main() {
    // Load .env file (ignore if not present)
    let _ = dotenvy::dotenv();

    // Logs go to stderr so generated text on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match App::new(cli.dir) {
        Ok(app) => run(&app, cli.command).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

async fn run(app: &App, command: Commands) -> Result<(), PromptorError> {
    match command {
        Commands::List => list(app).await,
        Commands::Slug { label } => {
            println!("{}", derive_ref(&label));
            Ok(())
        }
        Commands::Refs { id } => refs(app, &id).await,
        Commands::Check { id } => check(app, &id).await,
        Commands::Highlight { id } => highlight(app, &id).await,
        Commands::Generate {
            id,
            input,
            out,
            unresolved,
            defaults,
        } => {
            let policy = unresolved.unwrap_or(app.config.generate.unresolved);
            let defaults = defaults || app.config.generate.apply_defaults;
            generate_prompt(app, &id, &input, out, policy, defaults).await
        }
        Commands::Schemes => schemes(app).await,
    }
}

async fn list(app: &App) -> Result<(), PromptorError> {
    let ids = app.store.list().await?;
    if ids.is_empty() {
        eprintln!(
            "{} No schemas in {}",
            "→".cyan(),
            app.store.dir().display()
        );
    }
    for id in ids {
        println!("{}", id);
    }
    Ok(())
}

async fn refs(app: &App, id: &str) -> Result<(), PromptorError> {
    let schema = app.store.load(id).await?;
    let known = KnownRefs::from_schema(&schema);
    let palette = RefPalette::new(&known);
    for reference in known.iter() {
        println!("{}", palette.paint(reference));
    }
    Ok(())
}

async fn check(app: &App, id: &str) -> Result<(), PromptorError> {
    let schema = app.store.load(id).await?;
    let result = app.validator().validate(&schema, id);

    for issue in result.errors.iter().chain(result.warnings.iter()) {
        let (mark, layer) = match issue.severity() {
            Severity::Error => ("✗".red(), format!("[{}]", issue.layer()).red()),
            Severity::Warning => ("⚠".yellow(), format!("[{}]", issue.layer()).yellow()),
        };
        println!("{} {} {}", mark, layer, issue);
        if let Some(suggestion) = issue.suggestion() {
            println!("    {} {}", "→".cyan(), suggestion);
        }
    }

    if !result.is_publishable() {
        return Err(PromptorError::UnpublishableTemplate {
            refs: result.offending_refs(),
        });
    }
    if let Some(first) = result.errors.first() {
        return Err(PromptorError::InvalidSchema {
            count: result.errors.len(),
            first: first.to_string(),
        });
    }

    println!("{} Schema '{}' is publishable", "✓".green(), id);
    println!("  Title: {}", schema.title);
    println!("  Sections: {}", result.section_count);
    println!("  Components: {}", result.component_count);
    println!("  Fragments: {}", schema.fragments.len());
    if result.has_warnings() {
        println!("  Warnings: {}", result.warnings.len());
    }
    Ok(())
}

async fn highlight(app: &App, id: &str) -> Result<(), PromptorError> {
    let schema = app.store.load(id).await?;
    let known = KnownRefs::from_schema(&schema);
    let palette = RefPalette::new(&known);
    println!("{}", render_ansi(&schema.template_text, &known, &palette));
    Ok(())
}

async fn generate_prompt(
    app: &App,
    id: &str,
    input: &std::path::Path,
    out: Option<PathBuf>,
    policy: UnresolvedPolicy,
    defaults: bool,
) -> Result<(), PromptorError> {
    let schema = app.store.load(id).await?;

    let mut form = if defaults {
        FormState::with_defaults(&schema)
    } else {
        FormState::new()
    };
    form.merge(read_input(input).await?);

    let text = generate(&schema, &form, policy)?;
    println!("{}", text);

    if let Some(dir) = out {
        let prompt = write_prompt(&dir, id, &text).await?;
        let input = write_input(&dir, id, &form).await?;
        eprintln!("{} Wrote {}", "✓".green(), prompt.display());
        eprintln!("{} Wrote {}", "✓".green(), input.display());
    }
    Ok(())
}

async fn schemes(app: &App) -> Result<(), PromptorError> {
    let schemes = app.store.color_schemes().await?;
    if schemes.is_empty() {
        eprintln!("{} No color schemes", "→".cyan());
    }
    for scheme in schemes {
        let keys: Vec<&str> = scheme.colors.keys().map(String::as_str).collect();
        println!("{}  {}  [{}]", scheme.id.cyan().bold(), scheme.title, keys.join(", "));
    }
    Ok(())
}
