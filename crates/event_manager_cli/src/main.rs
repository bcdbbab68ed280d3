//! Command-line operator for an event manager site database.
//!
//! # Responsibility
//! - Compose `EventManager` from a TOML config with the system clock.
//! - Print rendered fragments, JSON resources and the outgoing mail queue.

use clap::{Parser, Subcommand};
use event_manager_core::db::migrations::latest_version;
use event_manager_core::rest::field_schema;
use event_manager_core::sanitize::sanitize_optional_text;
use event_manager_core::token::{EVENT_DETAILS_ACTION, RSVP_ACTION};
use event_manager_core::{
    init_from_config, Event, EventDate, EventDetailsForm, EventId, EventManager, EventStatus,
    MemoryMailer, NewCategory, RenderTarget, RsvpForm, RsvpOutcome, SiteConfig, SystemClock,
};
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "event-manager")]
#[command(about = "Manage events, categories and RSVPs in a site database")]
#[command(version)]
struct Cli {
    /// Site configuration file
    #[arg(long, default_value = "event-manager.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or migrate the database
    Init,
    /// Manage event categories
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// Manage events
    Event {
        #[command(subcommand)]
        command: EventCommands,
    },
    /// Render the event listing fragment
    List {
        #[arg(long)]
        posts_per_page: Option<String>,
        /// Category slug
        #[arg(long)]
        event_type: Option<String>,
        #[arg(long)]
        upcoming: bool,
    },
    /// Render a published event page with its RSVP form
    Show { id: EventId },
    /// Record an RSVP for a published event
    Rsvp {
        id: EventId,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// List attendees of an event
    Attendees { id: EventId },
    /// Print REST JSON for one event, or for all published events
    Rest {
        id: Option<EventId>,
        #[arg(long, default_value_t = 100)]
        limit: u32,
        /// Print the declared field types instead of resources
        #[arg(long, conflicts_with = "id")]
        schema: bool,
    },
}

#[derive(Subcommand)]
enum CategoryCommands {
    Add {
        label: String,
        #[arg(long)]
        slug: Option<String>,
        /// Parent category slug
        #[arg(long)]
        parent: Option<String>,
    },
    List,
}

#[derive(Subcommand)]
enum EventCommands {
    Create {
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// draft, pending, future, private, publish or trash
        #[arg(long, default_value = "draft")]
        status: String,
        /// Category slugs
        #[arg(long = "category")]
        categories: Vec<String>,
    },
    /// Change the publication status
    Status { id: EventId, status: String },
    /// Edit date and location; an empty value clears the field
    Details {
        id: EventId,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
}

fn parse_status(raw: &str) -> Result<EventStatus, Box<dyn Error>> {
    EventStatus::parse(raw).ok_or_else(|| {
        let known: Vec<&str> = EventStatus::ALL.iter().map(|status| status.as_str()).collect();
        format!("unknown status `{raw}`, expected one of: {}", known.join(", ")).into()
    })
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = SiteConfig::load(&cli.config)?;
    init_from_config(&config.logging)?;
    config.require_database_path()?;

    let mailer = MemoryMailer::new();
    let manager = EventManager::open(config, Arc::new(mailer.clone()), Arc::new(SystemClock))?;

    match cli.command {
        Commands::Init => {
            println!("schema_version={}", latest_version());
        }
        Commands::Category { command } => match command {
            CategoryCommands::Add {
                label,
                slug,
                parent,
            } => {
                let mut category = NewCategory::new(label);
                if let Some(slug) = slug {
                    category = category.with_slug(slug);
                }
                if let Some(parent) = parent {
                    let parent_id = manager
                        .list_categories()?
                        .into_iter()
                        .find(|existing| existing.slug == parent)
                        .map(|existing| existing.id)
                        .ok_or_else(|| format!("unknown parent category `{parent}`"))?;
                    category = category.with_parent(parent_id);
                }
                let created = manager.create_category(&category)?;
                println!("{}\t{}\t{}", created.id, created.slug, created.label);
            }
            CategoryCommands::List => {
                for category in manager.list_categories()? {
                    let parent = category
                        .parent_id
                        .map(|id| id.to_string())
                        .unwrap_or_default();
                    println!(
                        "{}\t{}\t{}\t{}",
                        category.id, category.slug, category.label, parent
                    );
                }
            }
        },
        Commands::Event { command } => match command {
            EventCommands::Create {
                title,
                content,
                date,
                location,
                status,
                categories,
            } => {
                let mut event = Event::new(title);
                event.content = content;
                event.date = date.as_deref().map(EventDate::parse).transpose()?;
                event.location = location.as_deref().and_then(sanitize_optional_text);
                event.status = parse_status(&status)?;

                // Categories are assigned before publishing so the notice sees a complete event.
                let target_status = event.status;
                event.status = EventStatus::Draft;
                let created = manager.create_event(&event)?;
                let slugs: Vec<&str> = categories.iter().map(String::as_str).collect();
                if !slugs.is_empty() {
                    manager.assign_categories(created.event.id, &slugs)?;
                }
                if target_status != EventStatus::Draft {
                    manager.set_status(created.event.id, target_status)?;
                }
                info!(
                    "event=cli_event_create module=cli status=ok event_id={}",
                    created.event.id
                );
                println!("{}", created.event.id);
            }
            EventCommands::Status { id, status } => {
                let result = manager.set_status(id, parse_status(&status)?)?;
                println!(
                    "{} -> {} ({:?})",
                    result.change.previous.map_or("none", EventStatus::as_str),
                    result.change.current,
                    result.notification
                );
            }
            EventCommands::Details { id, date, location } => {
                let token = manager.issue_token(EVENT_DETAILS_ACTION, &id.to_string());
                let form = EventDetailsForm {
                    date,
                    location,
                    nonce: Some(token),
                };
                println!("{:?}", manager.save_event_details(id, &form)?);
            }
        },
        Commands::List {
            posts_per_page,
            event_type,
            upcoming,
        } => {
            let mut attributes = Vec::new();
            if let Some(value) = posts_per_page.as_deref() {
                attributes.push(("posts_per_page", value));
            }
            if let Some(value) = event_type.as_deref() {
                attributes.push(("event_type", value));
            }
            if upcoming {
                attributes.push(("upcoming", "true"));
            }
            println!("{}", manager.render_event_list(attributes));
        }
        Commands::Show { id } => match manager.render_event_page(id, RenderTarget::PrimaryDetail)? {
            Some(page) => println!("{page}"),
            None => return Err(format!("no published event {id}").into()),
        },
        Commands::Rsvp { id, name, email } => {
            let form = RsvpForm {
                name: Some(name),
                email: Some(email),
                submit: Some("1".to_string()),
                nonce: Some(manager.issue_token(RSVP_ACTION, &id.to_string())),
            };
            match manager.submit_rsvp(id, &form) {
                RsvpOutcome::Recorded(attendee) => {
                    println!("recorded attendee {} ({} total)", attendee.id, manager.attendee_count(id)?)
                }
                RsvpOutcome::Ignored(reason) => println!("ignored: {reason}"),
            }
        }
        Commands::Attendees { id } => {
            for attendee in manager.attendees(id)? {
                println!("{}\t{}\t{}", attendee.submitted_at, attendee.name, attendee.email);
            }
        }
        Commands::Rest { id, limit, schema } => {
            let json = if schema {
                field_schema(manager.registry())
            } else {
                match id {
                    Some(id) => match manager.event_resource(id)? {
                        Some(resource) => resource.to_json(),
                        None => return Err(format!("no published event {id}").into()),
                    },
                    None => serde_json::Value::Array(
                        manager
                            .list_resources(limit)?
                            .iter()
                            .map(|resource| resource.to_json())
                            .collect(),
                    ),
                }
            };
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    for message in mailer.sent() {
        println!("\n--- mail to {} ---\nSubject: {}\n\n{}", message.to, message.subject, message.body);
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
