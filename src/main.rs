use clap::Parser;
use std::path::PathBuf;
use tn_gallery::config::{self, GalleryConfig, Overrides, Settings};
use tn_gallery::imaging::Thumbnailer;
use tn_gallery::{output, walk};

#[derive(Parser)]
#[command(name = "tn-gallery")]
#[command(about = "Generate thumbnail galleries for directory trees of images")]
#[command(long_about = "\
Generate thumbnail galleries for directory trees of images

Every directory below each PATH gets a square JPEG thumbnail per image and an
index.html linking its images and subdirectories:

  photos/
  ├── a.jpg
  ├── b.png
  ├── tn/                 # thumbnails (never listed, never walked)
  │   ├── a.jpg
  │   └── b.jpg
  ├── index.html
  └── trip/
      ├── c.jpg
      ├── tn/c.jpg
      └── index.html

Existing thumbnails and pages are kept unless missing or forced. Changing
--columns, --template, --whitelist, or --size forces a full rebuild.

Run 'tn-gallery --gen-config' to print a documented config file.")]
#[command(version)]
struct Cli {
    /// Root directories to turn into galleries
    #[arg(required_unless_present = "gen_config")]
    paths: Vec<PathBuf>,

    /// Rewrite every index.html
    #[arg(short = 'f', long)]
    force_html: bool,

    /// Recreate every thumbnail
    #[arg(short = 'F', long)]
    force_thumbnails: bool,

    /// Cells per row on index pages
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u32).range(1..))]
    columns: Option<u32>,

    /// Custom layout template file
    #[arg(short = 't', long)]
    template: Option<PathBuf>,

    /// Name of the per-directory thumbnail folder
    #[arg(short = 'd', long)]
    thumbnail_dir: Option<String>,

    /// Comma-separated extensions that get thumbnails (default: jpg,png)
    #[arg(short = 'w', long)]
    whitelist: Option<String>,

    /// Thumbnail edge length in pixels
    #[arg(short = 's', long, value_parser = clap::value_parser!(u32).range(1..))]
    size: Option<u32>,

    /// TOML config file; command-line flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a stock config file with all options documented
    #[arg(long)]
    gen_config: bool,

    /// Log debug details to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            force_html: self.force_html,
            force_thumbnails: self.force_thumbnails,
            row_columns: self.columns.map(|c| c as usize),
            template: self.template.clone(),
            thumbnail_directory: self.thumbnail_dir.clone(),
            whitelist: self.whitelist.as_deref().map(config::parse_whitelist),
            thumbnail_size: self.size,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.gen_config {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let settings = match &cli.config {
        Some(path) => config::load_settings(path)?,
        None => Settings::default(),
    };
    let gallery = GalleryConfig::from_settings(settings.apply(cli.overrides()))?;
    let thumbnailer = Thumbnailer::detect();
    log::debug!("Thumbnail backends: {:?}", thumbnailer.backend_names());

    let mut failed_roots = 0;
    for root in &cli.paths {
        println!(
            "{}",
            output::format_root_header(root, &thumbnailer.backend_names())
        );
        let (tx, rx) = std::sync::mpsc::channel();
        let printer = std::thread::spawn(move || {
            for event in rx {
                output::print_walk_event(&event);
            }
        });
        let result = walk::run(root, &gallery, &thumbnailer, Some(tx));
        printer.join().ok();

        match result {
            Ok(stats) => output::print_summary(root, &stats),
            Err(e) => {
                eprintln!("Error in {}: {}", root.display(), e);
                failed_roots += 1;
            }
        }
    }

    if failed_roots > 0 {
        return Err(format!("{failed_roots} of {} roots failed", cli.paths.len()).into());
    }
    Ok(())
}

/// Default `warn`, `debug` with `--verbose`; `RUST_LOG` overrides both.
fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
