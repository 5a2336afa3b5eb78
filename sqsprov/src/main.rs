//! sqsprov - provision an SQS queue for Terraform
//!
//! Creates a queue (and optionally a dead-letter queue with a redrive
//! policy) without touching tag APIs, then prints the queue identifiers as
//! a tfvars JSON document.

mod config;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sqsprov_core::{
    provision::default_dead_letter_name, DeadLetterOptions, OutputTarget, ProvisionRequest,
    Provisioner,
};
use sqsprov_sqs::{ClientOptions, SqsControlPlane};

use crate::config::{AwsSettings, QueueSettings, Settings};

#[derive(Parser, Debug)]
#[command(name = "sqsprov")]
#[command(
    about = "Create an SQS queue (optionally with a DLQ) without tag APIs",
    long_about = None
)]
struct Args {
    /// Main queue name
    #[arg(long)]
    name: String,

    /// AWS region (defaults to AWS_REGION/AWS_DEFAULT_REGION)
    #[arg(long, env = "SQSPROV_REGION")]
    region: Option<String>,

    /// Create a DLQ and attach redrive policy
    #[arg(long)]
    with_dlq: bool,

    /// DLQ name (default: <name>-dlq)
    #[arg(long)]
    dlq_name: Option<String>,

    /// Receives before a message moves to the DLQ (default: 5)
    #[arg(long)]
    max_receive_count: Option<u32>,

    /// Queue visibility timeout in seconds (default: 180)
    #[arg(long)]
    visibility_timeout_seconds: Option<u32>,

    /// Queue message retention in seconds (default: 345600)
    #[arg(long)]
    message_retention_seconds: Option<u32>,

    /// Write tfvars JSON to this path (default: stdout)
    #[arg(long, default_value = "-")]
    out: OutputTarget,

    /// Override the SQS endpoint, e.g. for a local emulator
    #[arg(long, env = "SQSPROV_ENDPOINT_URL")]
    endpoint_url: Option<String>,

    /// Settings file, extension optional
    #[arg(long, default_value = "sqsprov", env = "SQSPROV_CONFIG")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "SQSPROV_LOG_LEVEL")]
    log_level: String,
}

impl Args {
    fn provision_request(&self, defaults: &QueueSettings) -> ProvisionRequest {
        let request = ProvisionRequest::new(&self.name)
            .with_visibility_timeout(
                self.visibility_timeout_seconds
                    .unwrap_or(defaults.visibility_timeout_seconds),
            )
            .with_message_retention(
                self.message_retention_seconds
                    .unwrap_or(defaults.message_retention_seconds),
            );

        if !self.with_dlq {
            return request;
        }
        request.with_dead_letter(DeadLetterOptions {
            name: self
                .dlq_name
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| default_dead_letter_name(&self.name)),
            max_receive_count: self.max_receive_count.unwrap_or(defaults.max_receive_count),
        })
    }

    fn client_options(&self, aws: &AwsSettings) -> ClientOptions {
        ClientOptions {
            region: self.region.clone().or_else(|| aws.region.clone()),
            endpoint_url: self
                .endpoint_url
                .clone()
                .or_else(|| aws.endpoint_url.clone()),
            credentials: None,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries only the result document
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "sqsprov={0},sqsprov_core={0},sqsprov_sqs={0}",
                    args.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = Settings::load(&args.config)
        .with_context(|| format!("failed to load settings from {}", args.config))?;
    let request = args.provision_request(&settings.queue);

    info!(
        queue = %request.name,
        dead_letter = request.dead_letter.as_ref().map_or("none", |d| d.name.as_str()),
        "Provisioning"
    );

    let plane = SqsControlPlane::connect(&args.client_options(&settings.aws)).await;
    Provisioner::new(&plane)
        .provision_to(&request, &args.out)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("sqsprov").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_name_is_required() {
        assert!(Args::try_parse_from(["sqsprov"]).is_err());
    }

    #[test]
    fn test_defaults_without_dlq() {
        let args = parse(&["--name", "orders"]);
        let request = args.provision_request(&QueueSettings::default());

        assert_eq!(request, ProvisionRequest::new("orders"));
        assert_eq!(args.out, OutputTarget::Stdout);
    }

    #[test]
    fn test_dlq_defaults() {
        let args = parse(&["--name", "orders", "--with-dlq", "--max-receive-count", "3"]);
        let request = args.provision_request(&QueueSettings::default());

        let dead_letter = request.dead_letter.unwrap();
        assert_eq!(dead_letter.name, "orders-dlq");
        assert_eq!(dead_letter.max_receive_count, 3);
    }

    #[test]
    fn test_empty_dlq_name_uses_default() {
        let args = parse(&["--name", "orders", "--with-dlq", "--dlq-name", ""]);
        let request = args.provision_request(&QueueSettings::default());

        assert_eq!(request.dead_letter.unwrap().name, "orders-dlq");
    }

    #[test]
    fn test_dlq_flags_ignored_without_with_dlq() {
        let args = parse(&["--name", "orders", "--dlq-name", "other", "--max-receive-count", "9"]);
        let request = args.provision_request(&QueueSettings::default());

        assert!(request.dead_letter.is_none());
    }

    #[test]
    fn test_flags_override_settings() {
        let settings = QueueSettings {
            visibility_timeout_seconds: 60,
            message_retention_seconds: 120,
            max_receive_count: 8,
        };
        let args = parse(&[
            "--name",
            "jobs",
            "--with-dlq",
            "--dlq-name",
            "jobs-poison",
            "--visibility-timeout-seconds",
            "90",
            "--out",
            "queue.tfvars.json",
        ]);

        let request = args.provision_request(&settings);

        assert_eq!(request.visibility_timeout_seconds, 90);
        assert_eq!(request.message_retention_seconds, 120);
        let dead_letter = request.dead_letter.unwrap();
        assert_eq!(dead_letter.name, "jobs-poison");
        assert_eq!(dead_letter.max_receive_count, 8);
        assert_eq!(
            args.out,
            OutputTarget::File(PathBuf::from("queue.tfvars.json"))
        );
    }

    #[test]
    fn test_client_options_fall_back_to_settings() {
        let aws = AwsSettings {
            region: Some("eu-west-1".to_string()),
            endpoint_url: Some("http://localhost:4566".to_string()),
        };
        let args = parse(&["--name", "orders", "--region", "us-west-2"]);

        let options = args.client_options(&aws);

        assert_eq!(options.region.as_deref(), Some("us-west-2"));
        assert_eq!(options.endpoint_url.as_deref(), Some("http://localhost:4566"));
    }
}
