use clap::{Parser, Subcommand};
use resize_export::acquire::FilePicker;
use resize_export::catalog::{self, ResolutionOption};
use resize_export::session::Session;
use resize_export::{config, output};
use std::path::PathBuf;
use std::process::ExitCode;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "resize-export")]
#[command(about = "Resize an image to a preset resolution and export it")]
#[command(long_about = "\
Resize an image to a preset resolution and export it

Images are added in order, one of them is chosen, and the chosen image is
resized to exactly the selected resolution (no cropping or letterboxing) and
copied to the export directory.

  resize-export export --image a.jpg --image b.jpg --choose 1 --resolution 1080x1920

Run 'resize-export resolutions' for the available resolutions and
'resize-export gen-config' for a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the supported export resolutions
    Resolutions,
    /// Resize the chosen image and save it to the export directory
    Export {
        /// Image to add; repeat to add several
        #[arg(long = "image", required = true)]
        images: Vec<PathBuf>,
        /// Index of the image to export (0-based, in --image order)
        #[arg(long, default_value_t = 0)]
        choose: usize,
        /// Target resolution label, e.g. 1080x1920
        #[arg(long)]
        resolution: ResolutionOption,
        /// Print the outcome as JSON instead of progress lines
        #[arg(long)]
        json: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Resolutions => {
            output::print_catalog(catalog::all());
        }
        Command::Export {
            images,
            choose,
            resolution,
            json,
        } => {
            let config = config::load_config(&cli.config_dir)?;
            let mut session = Session::from_config(&config);
            for path in images {
                session.acquire(&FilePicker::new(Some(path)))?;
            }
            session.toggle_choice(choose)?;

            let controller = session.open_chosen()?;
            controller.choose_resolution(resolution)?;

            let outcome = if json {
                controller.export().await?
            } else {
                output::print_selection(session.selection().state());
                println!();
                let (tx, rx) = std::sync::mpsc::channel();
                let printer = std::thread::spawn(move || {
                    for event in rx {
                        for line in output::format_export_event(&event) {
                            println!("{line}");
                        }
                    }
                });
                let controller = controller.with_events(tx);
                let outcome = controller.export().await?;
                drop(controller);
                printer
                    .join()
                    .map_err(|_| "progress printer thread panicked")?;
                outcome
            };

            let exported = session.record_outcome(&outcome).is_some();
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else if exported {
                println!();
                output::print_selection(session.selection().state());
            }
            if !exported {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}
