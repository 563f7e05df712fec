use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::NumberingArgs;
use crate::api::dto::{BatchFilters, CertificateFilters, CreateBatchRequest, UpdateBatchRequest};
use crate::app::ConsoleApp;
use crate::entities::{BatchStatus, GraduationBatch, GraduationType};
use crate::lifecycle;
use crate::reports::BatchSummary;
use crate::repositories::select_default;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GraduationTypeArg {
    FinalYear,
    Promotion,
    Transfer,
}

impl From<GraduationTypeArg> for GraduationType {
    fn from(value: GraduationTypeArg) -> Self {
        match value {
            GraduationTypeArg::FinalYear => GraduationType::FinalYear,
            GraduationTypeArg::Promotion => GraduationType::Promotion,
            GraduationTypeArg::Transfer => GraduationType::Transfer,
        }
    }
}

/// Batch fields shared by `create` and `update`
#[derive(Debug, Clone, Default, Args)]
pub struct BatchFields {
    #[arg(long)]
    pub academic_year_id: Option<Uuid>,
    /// Class for final year batches
    #[arg(long)]
    pub class_id: Option<Uuid>,
    #[arg(long)]
    pub from_class_id: Option<Uuid>,
    #[arg(long)]
    pub to_class_id: Option<Uuid>,
    #[arg(long, value_enum)]
    pub graduation_type: Option<GraduationTypeArg>,
    /// Format: YYYY-MM-DD
    #[arg(long)]
    pub graduation_date: Option<NaiveDate>,
    /// Repeat once per exam
    #[arg(long = "exam-id")]
    pub exam_ids: Vec<Uuid>,
    /// `<EXAM_ID>=<PERCENT>`, repeat once per exam
    #[arg(long = "exam-weight", value_parser = parse_exam_weight)]
    pub exam_weights: Vec<(Uuid, f64)>,
    #[arg(long)]
    pub min_attendance_percentage: Option<f64>,
    #[arg(long)]
    pub require_attendance: Option<bool>,
    #[arg(long)]
    pub exclude_approved_leaves: Option<bool>,
}

#[derive(Debug, Subcommand)]
pub enum BatchCommand {
    /// List batches of the selected school
    List {
        #[arg(long)]
        academic_year_id: Option<Uuid>,
        #[arg(long)]
        class_id: Option<Uuid>,
        #[arg(long)]
        exam_id: Option<Uuid>,
    },
    /// Status, roster summary and allowed actions of one batch
    Show { id: Uuid },
    Create {
        /// Falls back to the selected school
        #[arg(long = "for-school")]
        for_school: Option<Uuid>,
        #[command(flatten)]
        fields: BatchFields,
    },
    /// Edit a draft batch
    Update {
        id: Uuid,
        #[command(flatten)]
        fields: BatchFields,
    },
    /// Delete a draft batch
    Delete { id: Uuid },
    /// Evaluate eligibility again and replace the roster
    Generate { id: Uuid },
    Approve { id: Uuid },
    /// Certificate numbers an issuance would assign
    Preview {
        id: Uuid,
        #[command(flatten)]
        numbering: NumberingArgs,
    },
    /// Issue certificates to every passing student
    Issue {
        id: Uuid,
        /// Defaults to the school's active graduation template
        #[arg(long)]
        template_id: Option<Uuid>,
        #[command(flatten)]
        numbering: NumberingArgs,
        /// Issue without stopping at the preview
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run(app: &ConsoleApp, command: BatchCommand) -> anyhow::Result<()> {
    let school = &app.school;
    match command {
        BatchCommand::List {
            academic_year_id,
            class_id,
            exam_id,
        } => {
            let filters = BatchFilters {
                school_id: None,
                academic_year_id,
                class_id,
                exam_id,
            };
            let batches = app.batches.list(school, filters).await?;
            if batches.is_empty() {
                println!("No graduation batches found");
            }
            for batch in &batches {
                println!("{}", batch_line(batch));
            }
        }
        BatchCommand::Show { id } => show(app, id).await?,
        BatchCommand::Create { for_school, fields } => {
            let school_id = for_school
                .or_else(|| school.resolve(None))
                .ok_or_else(|| school.selection_error())?;
            let request = create_request(school_id, fields)?;
            let batch = app.batches.create(request).await?;
            println!("Created batch {}", batch.id);
        }
        BatchCommand::Update { id, fields } => {
            let batch = app.batches.update(id, &update_request(fields), school).await?;
            println!("Updated batch {}", batch.id);
        }
        BatchCommand::Delete { id } => {
            app.batches.delete(id, school).await?;
            println!("Deleted batch {id}");
        }
        BatchCommand::Generate { id } => {
            let roster = app.batches.generate_students(id, school).await?;
            let passed = roster.iter().filter(|s| s.is_pass()).count();
            println!("Generated {} students, {} passed", roster.len(), passed);
        }
        BatchCommand::Approve { id } => {
            let batch = app.batches.approve(id, school).await?;
            println!("Batch {} is now {}", batch.id, batch.status);
        }
        BatchCommand::Preview { id, numbering } => {
            let config = numbering.to_config()?;
            let batch = app.batches.get(id, school).await?;
            let preview = app.batches.preview_numbers(&batch, &config)?;
            if preview.is_empty() {
                println!("No passing students, nothing would be issued");
            } else {
                println!("{preview}");
            }
        }
        BatchCommand::Issue {
            id,
            template_id,
            numbering,
            yes,
        } => {
            let config = numbering.to_config()?;
            let batch = app.batches.get(id, school).await?;
            let template_id = match template_id {
                Some(template_id) => template_id,
                None => {
                    let templates = app.templates.list_for_batch(&batch).await?;
                    select_default(&templates, batch.school_id)
                        .map(|t| t.id)
                        .context("No active graduation template for this school, pass --template-id")?
                }
            };

            let preview = app.batches.preview_numbers(&batch, &config)?;
            println!(
                "Issuing {} certificates with template {template_id}:",
                batch.pass_count()
            );
            println!("{preview}");
            if !yes {
                println!("Nothing issued. Run again with --yes to confirm.");
                return Ok(());
            }

            let issued = app
                .batches
                .issue_certificates(id, template_id, &config, school)
                .await?;
            println!("Issued {} certificates", issued.len());
            for cert in &issued {
                println!("  {}  {}", cert.certificate_no, cert.student_id);
            }
        }
    }
    Ok(())
}

async fn show(app: &ConsoleApp, id: Uuid) -> anyhow::Result<()> {
    let batch = app.batches.get(id, &app.school).await?;

    let certificates = async {
        if batch.status != BatchStatus::Issued {
            return Ok(Vec::new());
        }
        let filters = CertificateFilters {
            school_id: Some(batch.school_id),
            batch_id: Some(batch.id),
            ..Default::default()
        };
        app.certificates.list(&app.school, filters).await
    };
    let (templates, certificates) =
        futures::try_join!(app.templates.list_for_batch(&batch), certificates)?;

    let summary = BatchSummary::from_batch(&batch);
    println!("{}", batch_line(&batch));
    println!(
        "students: {}  passed: {}  failed: {}  pending: {}  pass rate: {}%",
        summary.student_count,
        summary.pass_count,
        summary.fail_count,
        summary.pending_count,
        summary.pass_rate
    );

    let actions = lifecycle::available_actions(&batch);
    if actions.is_empty() {
        println!("actions: none");
    } else {
        let names: Vec<String> = actions.iter().map(|a| a.to_string()).collect();
        println!("actions: {}", names.join(", "));
    }

    match select_default(&templates, batch.school_id) {
        Some(template) => println!("template: {} ({})", template.title, template.id),
        None => println!("template: none available"),
    }
    if !certificates.is_empty() {
        let revoked = certificates.iter().filter(|c| !c.is_valid()).count();
        println!("certificates: {} issued, {} revoked", certificates.len(), revoked);
    }
    Ok(())
}

fn batch_line(batch: &GraduationBatch) -> String {
    let date = batch
        .graduation_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{}  {:<8}  {:<10}  {}  students: {}",
        batch.id,
        batch.status,
        batch.graduation_type,
        date,
        batch.students.len()
    )
}

fn create_request(school_id: Uuid, fields: BatchFields) -> anyhow::Result<CreateBatchRequest> {
    Ok(CreateBatchRequest {
        school_id,
        academic_year_id: fields
            .academic_year_id
            .context("--academic-year-id is required")?,
        class_id: fields.class_id,
        from_class_id: fields.from_class_id,
        to_class_id: fields.to_class_id,
        exam_ids: fields.exam_ids,
        exam_weights: fields.exam_weights.into_iter().collect(),
        graduation_date: fields
            .graduation_date
            .context("--graduation-date is required")?,
        graduation_type: fields
            .graduation_type
            .map(GraduationType::from)
            .unwrap_or_default(),
        min_attendance_percentage: fields.min_attendance_percentage,
        require_attendance: fields.require_attendance,
        exclude_approved_leaves: fields.exclude_approved_leaves,
    })
}

fn update_request(fields: BatchFields) -> UpdateBatchRequest {
    let exam_weights: BTreeMap<Uuid, f64> = fields.exam_weights.into_iter().collect();
    UpdateBatchRequest {
        academic_year_id: fields.academic_year_id,
        class_id: fields.class_id,
        from_class_id: fields.from_class_id,
        to_class_id: fields.to_class_id,
        exam_ids: (!fields.exam_ids.is_empty()).then_some(fields.exam_ids),
        exam_weights: (!exam_weights.is_empty()).then_some(exam_weights),
        graduation_date: fields.graduation_date,
        graduation_type: fields.graduation_type.map(GraduationType::from),
        min_attendance_percentage: fields.min_attendance_percentage,
        require_attendance: fields.require_attendance,
        exclude_approved_leaves: fields.exclude_approved_leaves,
    }
}

fn parse_exam_weight(value: &str) -> Result<(Uuid, f64), String> {
    let (exam, weight) = value
        .split_once('=')
        .ok_or_else(|| format!("expected <EXAM_ID>=<PERCENT>, got `{value}`"))?;
    let exam = exam
        .trim()
        .parse::<Uuid>()
        .map_err(|e| format!("invalid exam id `{exam}`: {e}"))?;
    let weight = weight
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid weight `{weight}`: {e}"))?;
    Ok((exam, weight))
}
