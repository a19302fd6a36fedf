use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, Level};

use water_report::prompts::TemplateRegistry;
use water_report::{
    AnalysisRequest, AppError, Configuration, EncodedImage, SourceLabel, WaterReportAnalyzer,
};

#[derive(Parser)]
#[command(name = "water-report")]
#[command(version, about = "Water quality reports from a single photo")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Describe an image and write the Markdown report
    Analyze {
        /// Photo of the water body
        #[arg(short, long)]
        image: PathBuf,
        /// Water source type (clean, river, sea, contaminated, suspected contamination)
        #[arg(short, long)]
        label: String,
        /// Also produce a translated report
        #[arg(short, long)]
        translate: bool,
        /// Translation target, defaults to the configured language
        #[arg(long, requires = "translate")]
        language: Option<String>,
        /// Directory the report files are written to
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// List accepted water source types
    Labels,

    /// Show the prompt templates in use
    Templates,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Labels => {
            for label in SourceLabel::ALL.iter().filter(|label| label.is_set()) {
                println!("{}", label);
            }
        }
        Commands::Templates => {
            let configuration = Configuration::load(cli.config.as_deref())?;
            let registry = match &configuration.templates_dir {
                Some(dir) => TemplateRegistry::default().with_overrides_from(dir)?,
                None => TemplateRegistry::default(),
            };
            for template in registry.iter() {
                println!("{} v{}: {}", template.name, template.version, template.role);
            }
        }
        Commands::Analyze {
            image,
            label,
            translate,
            language,
            out,
        } => {
            let label: SourceLabel = label.parse()?;
            let image = EncodedImage::from_path(&image)?;
            let configuration = Configuration::load(cli.config.as_deref())?;
            let analyzer = WaterReportAnalyzer::from_configuration(&configuration)?;

            let mut request = AnalysisRequest::new(image, label);
            if translate {
                request = request.with_translation(language);
            }

            let report = analyzer.analyze(&request).await?;
            println!("{}", report.primary_markdown);
            if let Some(translated) = report.translated_markdown() {
                println!("\n{}", translated);
            }

            for path in report.write_to(&out)? {
                info!("Report written to {}", path.display());
            }
        }
    }

    Ok(())
}
