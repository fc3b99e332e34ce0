use clap::{Args, Parser, Subcommand};
use ogp_head::filters::Filters;
use ogp_head::output;
use ogp_head::render::CapturedPage;
use ogp_head::settings::{self, Submission};
use std::path::PathBuf;

/// The page a command works on: its context and its rendered markup.
#[derive(Args, Clone)]
struct PageArgs {
    /// Page context (JSON): kind, title, content, site, request
    #[arg(long)]
    context: PathBuf,

    /// Rendered page markup (HTML)
    #[arg(long)]
    markup: PathBuf,
}

#[derive(Parser)]
#[command(name = "ogp-head")]
#[command(about = "Open Graph and Facebook meta tags for rendered pages")]
#[command(long_about = "\
Open Graph and Facebook meta tags for rendered pages

Reads a rendered page and a JSON description of it, works out the best
value for every tag, and writes the <meta> block into the page head.

Value resolution (first available wins):
  Title:       page <title> → site name (home/front page) → page title
  Description: <meta name=\"description\"> → excerpt → first 160 characters
               of content (posts/pages) → site description
  Images:      fallback image, then featured image and content images (posts/pages)

No tags are written until settings.toml has admin_ids or app_id.
Run 'ogp-head gen-config' to generate a documented settings.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing settings.toml
    #[arg(long, default_value = ".", global = true)]
    settings: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the meta tag lines for a page
    Render(PageArgs),
    /// Write the page with the OGP prefix and meta tags injected
    Inject {
        #[command(flatten)]
        page: PageArgs,

        /// Output file (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show each resolved value and where it came from
    Explain(PageArgs),
    /// Update settings.toml, rejecting invalid IDs
    Save {
        /// Facebook admin user IDs, comma separated
        #[arg(long)]
        admin_ids: Option<String>,

        /// Facebook application ID
        #[arg(long)]
        app_id: Option<String>,

        /// Image used when a page has none, or always with --force-fallback
        #[arg(long)]
        fallback_image_url: Option<String>,

        /// Use only the fallback image on every page
        #[arg(long)]
        force_fallback: Option<bool>,
    },
    /// Validate settings.toml
    Check,
    /// Print a stock settings.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let filters = Filters::new();

    match cli.command {
        Command::Render(args) => {
            let settings = settings::load_settings(&cli.settings)?;
            let page = CapturedPage::load(&args.context, &args.markup)?;
            for line in page.render_tags(&settings, &filters) {
                println!("{}", line);
            }
        }
        Command::Inject { page, out } => {
            let settings = settings::load_settings(&cli.settings)?;
            let captured = CapturedPage::load(&page.context, &page.markup)?;
            let rendered = captured.render_page(&settings, &filters);
            match out {
                Some(path) => {
                    std::fs::write(&path, rendered)?;
                    println!("==> Wrote {}", path.display());
                }
                None => print!("{}", rendered),
            }
        }
        Command::Explain(args) => {
            let settings = settings::load_settings(&cli.settings)?;
            let page = CapturedPage::load(&args.context, &args.markup)?;
            output::print_resolution(&page.resolve(&settings, &filters));
            if let Some(notice) = settings.setup_notice() {
                println!("Notice: {}", notice);
            }
        }
        Command::Save {
            admin_ids,
            app_id,
            fallback_image_url,
            force_fallback,
        } => {
            let submission = Submission {
                admin_ids,
                app_id,
                fallback_image_url,
                force_fallback,
            };
            let outcome = settings::submit_settings(&cli.settings, &submission)?;
            output::print_save_report(&outcome, &cli.settings.join(settings::SETTINGS_FILE));
        }
        Command::Check => {
            println!("==> Checking {}", cli.settings.join(settings::SETTINGS_FILE).display());
            let settings = settings::check_settings(&cli.settings)?;
            output::print_check(&settings);
        }
        Command::GenConfig => {
            print!("{}", settings::stock_settings_toml());
        }
    }

    Ok(())
}
