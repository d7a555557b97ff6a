use crate::commands::{
    run_employee_export, run_generate, run_notify, run_training_export, run_verify,
    EmployeeExportArgs, GenerateArgs, NotifyArgs, TrainingExportArgs, VerifyArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use training_compliance::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Training Compliance",
    about = "Track ground-services training certificates, expiry and compliance",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Send due expiry notices, compliance reminders and admin digests
    Notify(NotifyArgs),
    /// Issue or verify certificate numbers
    Certificates {
        #[command(subcommand)]
        command: CertificatesCommand,
    },
    /// Write a CSV export into the configured export directory
    Export {
        #[command(subcommand)]
        command: ExportCommand,
    },
}

#[derive(Subcommand, Debug)]
enum CertificatesCommand {
    /// Assign certificate numbers in batches; exits non-zero if any record failed
    Generate(GenerateArgs),
    /// Look up a certificate number and report its validity
    Verify(VerifyArgs),
}

#[derive(Subcommand, Debug)]
enum ExportCommand {
    TrainingRecords(TrainingExportArgs),
    Employees(EmployeeExportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Notify(args) => run_notify(args),
        Command::Certificates {
            command: CertificatesCommand::Generate(args),
        } => run_generate(args),
        Command::Certificates {
            command: CertificatesCommand::Verify(args),
        } => run_verify(args),
        Command::Export {
            command: ExportCommand::TrainingRecords(args),
        } => run_training_export(args),
        Command::Export {
            command: ExportCommand::Employees(args),
        } => run_employee_export(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use training_compliance::notifications::NotificationCategory;

    #[test]
    fn notify_parses_category_and_window() {
        let cli = Cli::try_parse_from([
            "training-compliance-api",
            "notify",
            "--category",
            "expiry",
            "--days",
            "14",
            "--force",
        ])
        .expect("arguments parse");

        match cli.command {
            Some(Command::Notify(args)) => {
                assert_eq!(args.category, NotificationCategory::Expiry);
                assert_eq!(args.days, Some(14));
                assert!(args.force);
            }
            other => panic!("expected notify command, got {other:?}"),
        }
    }

    #[test]
    fn notify_rejects_zero_days_and_unknown_categories() {
        assert!(Cli::try_parse_from(["training-compliance-api", "notify", "--days", "0"]).is_err());
        assert!(
            Cli::try_parse_from(["training-compliance-api", "notify", "--category", "weekly"])
                .is_err()
        );
    }

    #[test]
    fn generate_accepts_ids_and_filters() {
        let cli = Cli::try_parse_from([
            "training-compliance-api",
            "certificates",
            "generate",
            "--missing-only",
            "--batch-size",
            "25",
            "7",
            "8",
        ])
        .expect("arguments parse");

        match cli.command {
            Some(Command::Certificates {
                command: CertificatesCommand::Generate(args),
            }) => {
                assert!(args.missing_only);
                assert_eq!(args.batch_size, Some(25));
                assert_eq!(args.ids, vec![7, 8]);
            }
            other => panic!("expected generate command, got {other:?}"),
        }
    }

    #[test]
    fn export_parses_department_and_status() {
        let cli = Cli::try_parse_from([
            "training-compliance-api",
            "export",
            "training-records",
            "--department",
            "ramp",
            "--status",
            "expiring_soon",
        ])
        .expect("arguments parse");

        assert!(matches!(
            cli.command,
            Some(Command::Export {
                command: ExportCommand::TrainingRecords(TrainingExportArgs {
                    department: Some(training_compliance::domain::Department::Ramp),
                    status: Some(training_compliance::compliance::ExpiryStatus::ExpiringSoon),
                    ..
                }),
            })
        ));
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["training-compliance-api"]).expect("arguments parse");
        assert!(cli.command.is_none());
    }
}
