#![allow(clippy::doc_markdown, clippy::uninlined_format_args)]
//! Example: Build a multipart user-data document
//!
//! Combines a boot hook script with a structured cloud-config and prints the
//! text and base64 forms, as you would pass them to a cloud provider when
//! launching an instance.
//!
//! ## Running
//!
//! ```bash
//! RUST_LOG=cloudinit_gen=debug cargo run --package cloudinit-gen --example user_data
//! ```

use cloudinit_gen::{Content, Document};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cloudinit_gen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut user_data = Document::new();

    // MIME type text/cloud-boothook is inferred from the "#boothook" header.
    user_data.add("#boothook\n#!/bin/bash\necho \"Booted on $(date)\" > /var/log/per-boot.log\n")?;

    let docker_config = r#"{"credHelpers":{"public.ecr.aws":"ecr-login"}}"#;
    let cloud_cfg = json!({
        "repo_update": true,
        "repo_upgrade": "all",
        "apt": {
            "sources": {
                "docker.list": {
                    "source": "deb [arch=amd64] https://download.docker.com/linux/ubuntu $RELEASE stable",
                    "keyid": "9DC858229FC7DD38854AE2D88D81803C0EBFCD88"
                }
            }
        },
        "packages": [
            "jq",
            "ca-certificates",
            "curl",
            "gnupg",
            "lsb-release",
            "docker-ce",
            "docker-ce-cli",
            "amazon-ecr-credential-helper"
        ],
        "runcmd": [
            ["bash", "-c", format!(
                "mkdir -p /root/.docker && chmod 700 /root/.docker && echo '{}' > /root/.docker/config.json",
                docker_config
            )],
            ["bash", "-c", "echo \"it works!\""]
        ]
    });

    // Rendered as YAML with implicit MIME type text/cloud-config.
    user_data.add(Content::structured(&cloud_cfg)?)?;

    println!("Final user-data (text):");
    println!("====================");
    println!("{}", user_data.render_text()?.unwrap_or_default());
    println!("====================");
    println!("Final user-data (base64):");
    println!("====================");
    println!("{}", user_data.render_base64(true)?.unwrap_or_default());
    println!("====================");

    Ok(())
}
