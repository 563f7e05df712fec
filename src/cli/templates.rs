use clap::Subcommand;
use uuid::Uuid;

use crate::api::dto::{TemplateFilters, TemplatePayload};
use crate::app::ConsoleApp;
use crate::config::GRADUATION_TEMPLATE_TYPE;

#[derive(Debug, Subcommand)]
pub enum TemplateCommand {
    List {
        #[arg(long = "type", default_value = GRADUATION_TEMPLATE_TYPE)]
        template_type: String,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long = "type", default_value = GRADUATION_TEMPLATE_TYPE)]
        template_type: String,
        #[arg(long)]
        description: Option<String>,
        /// Leave out to share the template with every school
        #[arg(long = "for-school")]
        for_school: Option<Uuid>,
        #[arg(long)]
        inactive: bool,
    },
    /// Activate or deactivate a template
    SetActive {
        id: Uuid,
        #[arg(long, action = clap::ArgAction::Set)]
        active: bool,
    },
    Delete { id: Uuid },
}

pub async fn run(app: &ConsoleApp, command: TemplateCommand) -> anyhow::Result<()> {
    match command {
        TemplateCommand::List { template_type } => {
            let filters = TemplateFilters {
                template_type: Some(template_type),
                school_id: app.school.resolve(None),
            };
            let templates = app.templates.list(&filters).await?;
            if templates.is_empty() {
                println!("No templates found");
            }
            for template in &templates {
                let scope = template
                    .school_id
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "shared".to_string());
                let state = if template.is_active { "active" } else { "inactive" };
                println!("{}  {:<8}  {}  {}", template.id, state, scope, template.title);
            }
        }
        TemplateCommand::Create {
            title,
            template_type,
            description,
            for_school,
            inactive,
        } => {
            let payload = TemplatePayload {
                school_id: for_school,
                template_type: Some(template_type),
                description,
                is_active: Some(!inactive),
                ..Default::default()
            }
            .with_title(title);
            let template = app.templates.create(&payload).await?;
            println!("Created template {}", template.id);
        }
        TemplateCommand::SetActive { id, active } => {
            let payload = TemplatePayload {
                is_active: Some(active),
                ..Default::default()
            };
            let template = app.templates.update(id, &payload).await?;
            println!("Template {} is_active={}", template.id, template.is_active);
        }
        TemplateCommand::Delete { id } => {
            app.templates.delete(id).await?;
            println!("Deleted template {id}");
        }
    }
    Ok(())
}
