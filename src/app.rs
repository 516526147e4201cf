//! Main application orchestration and execution

use crate::{
    benchmark::run_read_write_test,
    cli::{prompt_for_path, Cli, Command},
    client::HttpProbeTransport,
    config::{display_config_summary, load_config},
    error::{ErrorReporter, Result},
    logging,
    models::Config,
    output::{failure_message, format_json, test_title, OutputFormatterFactory},
    sampler::run_internet_test,
    types::TestKind,
};
use tracing::{debug, info};

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
}

impl App {
    /// Create a new application instance with CLI configuration
    pub fn new(cli: Cli) -> Result<Self> {
        Ok(Self { cli })
    }

    /// Run the selected test and print its outcome
    ///
    /// Every failure is reported on stderr before being returned, so the
    /// caller only has to pick the exit code.
    pub async fn run(self) -> Result<()> {
        let config = match load_config(&self.cli) {
            Ok(config) => config,
            Err(e) => {
                ErrorReporter::new(!self.cli.no_color, self.cli.verbose).report_error(&e);
                return Err(e);
            }
        };
        logging::init_from_config(&config)?;

        let use_color = config.enable_color && self.cli.use_colors();
        debug!(summary = %display_config_summary(&config), "configuration loaded");

        let kind = self.kind();
        match self.execute(&config, use_color).await {
            Ok(()) => Ok(()),
            Err(e) => {
                let formatter = OutputFormatterFactory::create_formatter(use_color, config.verbose);
                eprintln!("{}", formatter.format_error(failure_message(kind))?);
                ErrorReporter::new(use_color, config.verbose).report_error(&e);
                Err(e)
            }
        }
    }

    async fn execute(&self, config: &Config, use_color: bool) -> Result<()> {
        let kind = self.kind();
        let formatter = OutputFormatterFactory::create_formatter(use_color, config.verbose);
        info!(test = %kind, "starting test");

        if config.verbose && !config.json_output {
            println!("{}", formatter.format_header(test_title(kind))?);
        }

        let rendered = match &self.cli.command {
            Command::Inet => {
                let transport = HttpProbeTransport::from_config(config)?;
                let result =
                    run_internet_test(transport, &config.upload_jobs, &config.download_jobs).await?;
                if config.json_output {
                    format_json(&result)?
                } else {
                    formatter.format_internet_result(&result)?
                }
            }
            Command::Rw { path } => {
                let dir = match path {
                    Some(path) => path.clone(),
                    None => prompt_for_path()?,
                };
                debug!(dir = %dir.display(), "read/write directory");
                let result = run_read_write_test(dir, &config.rw_jobs).await?;
                if config.json_output {
                    format_json(&result)?
                } else {
                    formatter.format_read_write_result(&result)?
                }
            }
        };

        println!("{}", rendered);
        info!(test = %kind, "test finished");
        Ok(())
    }

    /// Test selected on the command line
    pub fn kind(&self) -> TestKind {
        self.cli.command.kind()
    }
}
