use anyhow::Context;
use clap::Subcommand;
use std::fs::{self, File};
use std::path::PathBuf;
use uuid::Uuid;

use crate::api::dto::CertificateFilters;
use crate::app::ConsoleApp;
use crate::reports::write_certificate_report;

#[derive(Debug, Subcommand)]
pub enum CertificateCommand {
    /// List issued certificates of the selected school
    List {
        #[arg(long)]
        batch_id: Option<Uuid>,
        #[arg(long)]
        student_id: Option<Uuid>,
        #[arg(long = "type")]
        certificate_type: Option<String>,
        /// Write the list as CSV to this file instead of printing it
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    Show { id: Uuid },
    /// Revoke a certificate permanently
    Revoke {
        id: Uuid,
        #[arg(long)]
        reason: String,
    },
    /// Save the certificate PDF
    Download {
        id: Uuid,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

pub async fn run(app: &ConsoleApp, command: CertificateCommand) -> anyhow::Result<()> {
    let school = &app.school;
    match command {
        CertificateCommand::List {
            batch_id,
            student_id,
            certificate_type,
            csv,
        } => {
            let filters = CertificateFilters {
                school_id: None,
                student_id,
                batch_id,
                certificate_type,
            };
            let certificates = app.certificates.list(school, filters).await?;

            if let Some(path) = csv {
                let file = File::create(&path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                write_certificate_report(&certificates, file)?;
                println!("Wrote {} certificates to {}", certificates.len(), path.display());
                return Ok(());
            }
            if certificates.is_empty() {
                println!("No certificates found");
            }
            for cert in &certificates {
                println!(
                    "{}  {:<7}  {}  {}",
                    cert.certificate_no,
                    cert.status(),
                    cert.student_id,
                    cert.issued_at.format("%Y-%m-%d")
                );
            }
        }
        CertificateCommand::Show { id } => {
            let cert = app.certificates.get(id, school).await?;
            println!("number:   {}", cert.certificate_no);
            println!("status:   {}", cert.status());
            println!("student:  {}", cert.student_id);
            println!("batch:    {}", cert.batch_id);
            println!("issued:   {}", cert.issued_at.format("%Y-%m-%d %H:%M"));
            println!("verify:   {}", cert.verification_path());
            if let Some(revoked_at) = cert.revoked_at {
                println!("revoked:  {}", revoked_at.format("%Y-%m-%d %H:%M"));
                println!("reason:   {}", cert.revoke_reason.as_deref().unwrap_or("-"));
            }
        }
        CertificateCommand::Revoke { id, reason } => {
            app.certificates.revoke(id, &reason, school).await?;
            println!("Certificate {id} revoked");
        }
        CertificateCommand::Download { id, out_dir } => {
            let cert = app.certificates.get(id, school).await?;
            let file = app.certificates.download(id, cert.school_id, school).await?;

            fs::create_dir_all(&out_dir)
                .with_context(|| format!("Failed to create {}", out_dir.display()))?;
            let name = match file.filename {
                Some(_) => file.safe_file_name(),
                None => format!("{}.pdf", sanitize_filename::sanitize(&cert.certificate_no)),
            };
            let path = out_dir.join(name);
            fs::write(&path, &file.bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(certificate_id = %id, path = %path.display(), "certificate downloaded");
            println!("Saved {}", path.display());
        }
    }
    Ok(())
}
