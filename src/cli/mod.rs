// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses the command line with clap, sets up logging and hands
// off to the application layer. Two commands:
//   1. `eval`   — evaluate a model on the validation set
//   2. `models` — list the model zoo
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvalArgs};

use crate::application::eval_use_case::{EvalConfig, EvalUseCase};
use crate::infra::logging;
use crate::ml::zoo;

#[derive(Parser, Debug)]
#[command(
    name = "imagenet-eval",
    version,
    about = "Evaluate a model for image classification (ImageNet-1K)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match &self.command {
            Commands::Eval(args) => self.run_eval(args),
            Commands::Models     => self.run_models(),
        }
    }

    fn run_eval(&self, args: &EvalArgs) -> Result<()> {
        let (log_path, log_file_exist) = logging::initialize_logging(
            &args.save_dir,
            &args.logging_file_name,
            args,
            &args.log_packages,
            &args.log_pip_packages,
        )?;
        if let Some(path) = &log_path {
            tracing::debug!("Logging to '{}' (existed: {})", path.display(), log_file_exist);
        }

        let config: EvalConfig = args.into();
        tracing::info!("Configuration: {}", serde_json::to_string(&config)?);

        EvalUseCase::new(config).execute()?;
        Ok(())
    }

    fn run_models(&self) -> Result<()> {
        logging::init_console()?;
        println!("{:<16} {:<14} {:<11} {}", "model", "layers", "block", "width");
        for m in zoo::MODELS {
            println!(
                "{:<16} {:<14} {:<11} {}",
                m.name,
                format!("{:?}", m.layers),
                if m.bottleneck { "bottleneck" } else { "basic" },
                m.width_scale
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_defaults() {
        let cli = Cli::try_parse_from(["imagenet-eval", "eval", "--model", "resnet18"]).unwrap();
        let Commands::Eval(args) = cli.command else { panic!("expected eval") };
        let cfg: EvalConfig = (&args).into();
        assert_eq!(cfg.model, "resnet18");
        assert!(!cfg.use_pretrained);
        assert_eq!(cfg.dtype, "float32");
        assert_eq!(cfg.input_size, 224);
        assert_eq!(cfg.resize_inv_factor, 0.875);
        assert_eq!(cfg.num_classes, 1000);
        assert_eq!(cfg.in_channels, 3);
        assert_eq!(cfg.num_gpus, 0);
        assert_eq!(cfg.num_workers, 4);
        assert_eq!(cfg.batch_size, 512);
        assert_eq!(args.logging_file_name, "train.log");
        assert!(args.save_dir.is_empty());
    }

    #[test]
    fn test_short_worker_flag_and_pretrained() {
        let cli = Cli::try_parse_from([
            "imagenet-eval", "eval", "--model", "resnet50", "--use-pretrained",
            "-j", "8", "--num-gpus", "2", "--resume", "w.mpk",
        ])
        .unwrap();
        let Commands::Eval(args) = cli.command else { panic!("expected eval") };
        assert!(args.use_pretrained);
        assert_eq!(args.num_workers, 8);
        assert_eq!(args.num_gpus, 2);
        assert_eq!(args.resume, "w.mpk");
    }

    #[test]
    fn test_model_is_required() {
        assert!(Cli::try_parse_from(["imagenet-eval", "eval"]).is_err());
    }

    #[test]
    fn test_models_subcommand() {
        let cli = Cli::try_parse_from(["imagenet-eval", "models"]).unwrap();
        assert!(matches!(cli.command, Commands::Models));
    }
}
