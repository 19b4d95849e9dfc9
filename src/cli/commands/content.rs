use clap::Subcommand;
use serde_json::json;
use std::sync::Arc;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::content::{ContentRecord, RelatedContent};
use crate::database::models::{Blog, CaseStudy};
use crate::store::ContentStore;

#[derive(Subcommand)]
pub enum RelatedCommands {
    #[command(about = "Related blog posts for a blog id")]
    Blog {
        #[arg(help = "Blog id")]
        id: String,

        #[arg(long, help = "Maximum results (defaults to the configured blog limit)")]
        limit: Option<usize>,
    },

    #[command(about = "Related case studies for a case study id")]
    CaseStudy {
        #[arg(help = "Case study id")]
        id: String,

        #[arg(long, help = "Maximum results (defaults to the configured case study limit)")]
        limit: Option<usize>,
    },
}

pub async fn handle(cmd: RelatedCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let content = &config().content;
    let store = connect_store().await?;

    match cmd {
        RelatedCommands::Blog { id, limit } => {
            let store: Arc<dyn ContentStore<Blog>> = store;
            let limit = limit.unwrap_or(content.related_blog_limit);
            show_related::<Blog>(store, &id, limit, output_format).await
        }
        RelatedCommands::CaseStudy { id, limit } => {
            let store: Arc<dyn ContentStore<CaseStudy>> = store;
            let limit = limit.unwrap_or(content.related_case_study_limit);
            show_related::<CaseStudy>(store, &id, limit, output_format).await
        }
    }
}

async fn show_related<T: ContentRecord>(
    store: Arc<dyn ContentStore<T>>,
    id: &str,
    limit: usize,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let related = RelatedContent::<T>::new(store, config().content.tag_overlap)
        .related(id, limit.min(config().content.max_related_limit))
        .await;

    if related.is_empty() {
        return output_empty_collection(&output_format, "related", &format!("No related {} found", T::KIND.table()));
    }

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "related": related }))?);
        }
        OutputFormat::Text => {
            for (rank, summary) in related.iter().enumerate() {
                let value = serde_json::to_value(summary)?;
                println!(
                    "{:>2}. {:<40} [{}]",
                    rank + 1,
                    value["slug"].as_str().unwrap_or_default(),
                    value["tags"]
                        .as_array()
                        .map(|tags| tags.iter().filter_map(|t| t.as_str()).collect::<Vec<_>>().join(", "))
                        .unwrap_or_default()
                );
            }
        }
    }
    Ok(())
}
