use crate::infra::{dollars, CapturingMailer};
use chrono::{Duration, Utc};
use clap::Args;
use pawhaven::access::Actor;
use pawhaven::accounts::LoginRequest;
use pawhaven::adoptions::{ApplicationStatus, ApplicationView, InterviewRequest, InterviewType};
use pawhaven::catalog::{seed_sample_data, CatalogEntry, CatalogImporter};
use pawhaven::config::EmailConfig;
use pawhaven::error::AppError;
use pawhaven::http::{PageLimits, PageRequest};
use pawhaven::notifications::NotificationRepository;
use pawhaven::stats::PlatformStats;
use pawhaven::store::RecordStore;
use pawhaven::Platform;
use serde::Serialize;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;

type DemoPlatform = Platform<RecordStore, CapturingMailer>;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Stop once the shelter has approved the application.
    #[arg(long)]
    pub(crate) stop_after_approval: bool,
    /// Print the rendered email bodies, not just their subjects.
    #[arg(long)]
    pub(crate) show_emails: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CatalogCheckArgs {
    /// Catalog CSV with a `shelter` column followed by the pet fields
    pub(crate) path: PathBuf,
    /// Print the parsed rows as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Serialize)]
struct CatalogRowCheck {
    shelter: String,
    name: String,
    species: &'static str,
    adoption_fee: String,
    problems: Vec<String>,
}

impl CatalogRowCheck {
    fn from_entry(entry: &CatalogEntry) -> Self {
        let problems = match entry.attributes.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => vec![errors.to_string()],
        };
        Self {
            shelter: entry.shelter.clone(),
            name: entry.attributes.name.clone(),
            species: entry.attributes.species.label(),
            adoption_fee: dollars(entry.attributes.adoption_fee),
            problems,
        }
    }
}

pub(crate) fn run_catalog_check(args: CatalogCheckArgs) -> Result<(), AppError> {
    let CatalogCheckArgs { path, json } = args;
    let entries = CatalogImporter::from_path(&path)?;
    let checks: Vec<CatalogRowCheck> = entries.iter().map(CatalogRowCheck::from_entry).collect();

    if json {
        match serde_json::to_string_pretty(&checks) {
            Ok(rendered) => println!("{}", rendered),
            Err(err) => println!("Catalog JSON unavailable: {}", err),
        }
        return Ok(());
    }

    println!("Catalog {} ({} rows)", path.display(), checks.len());
    for check in &checks {
        let verdict = if check.problems.is_empty() {
            "ok".to_string()
        } else {
            check.problems.join("; ")
        };
        println!(
            "- {} ({}) for {} at {}: {}",
            check.name, check.species, check.shelter, check.adoption_fee, verdict
        );
    }
    let invalid = checks.iter().filter(|check| !check.problems.is_empty()).count();
    println!("{} valid, {} invalid", checks.len() - invalid, invalid);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        stop_after_approval,
        show_emails,
    } = args;

    let mailer = Arc::new(CapturingMailer::default());
    let platform = Platform::new(
        Arc::new(RecordStore::new()),
        mailer.clone(),
        EmailConfig::default(),
        PageLimits::default(),
    );

    println!("PawHaven adoption demo");
    let summary = seed_sample_data(&platform)?;
    println!(
        "- Seeded {} accounts, {} pets and {} applications",
        summary.users, summary.pets, summary.applications
    );
    print_stats("Before review", &platform);

    let Some(shelter) = sign_in(&platform, "happypaws_shelter", "shelter123") else {
        return Ok(());
    };
    let Some(adopter) = sign_in(&platform, "john_doe", "adopter123") else {
        return Ok(());
    };

    let Some(queue) = step(
        "Listing the shelter queue",
        platform.adoptions.list(&shelter, PageRequest::default()),
    ) else {
        return Ok(());
    };
    println!("\nHappy Paws review queue ({} applications)", queue.count);
    for view in &queue.results {
        print_application(view);
    }

    let Some(pending) = queue
        .results
        .iter()
        .find(|view| view.application.status == ApplicationStatus::Pending)
    else {
        println!("  Nothing pending to review");
        return Ok(());
    };
    let application_id = pending.application.id;

    let interview = InterviewRequest {
        interview_type: InterviewType::HomeVisit,
        scheduled_date: Utc::now() + Duration::days(3),
        notes: "Meet the whole household and check the yard fence".to_string(),
    };
    if let Some(interview) = step(
        "Scheduling the home visit",
        platform
            .adoptions
            .schedule_interview(&shelter, application_id, interview),
    ) {
        println!(
            "\n- Home visit {} booked for {}",
            interview.id.0,
            interview.scheduled_date.format("%Y-%m-%d %H:%M UTC")
        );
    }

    let Some(approved) = step(
        "Approving the application",
        platform.adoptions.approve(
            &shelter,
            application_id,
            Some("Lovely home visit, Buddy will fit right in.".to_string()),
        ),
    ) else {
        return Ok(());
    };
    println!("- Approved:");
    print_application(&approved);

    if !stop_after_approval {
        if let Some(completed) = step(
            "Completing the adoption",
            platform.adoptions.complete(&shelter, application_id, None),
        ) {
            println!("- Completed:");
            print_application(&completed);
        }
    }

    println!("\nAdopter inbox");
    match platform.store.notifications_for(adopter.id, None) {
        Ok(notifications) => {
            for notification in notifications {
                let marker = if notification.is_important { "!" } else { " " };
                println!("  {} {}", marker, notification.title);
            }
        }
        Err(err) => println!("  Inbox unavailable: {}", err),
    }

    let messages = mailer.messages();
    println!("\nEmails sent ({})", messages.len());
    for message in messages {
        println!("  - to {}: {}", message.to, message.subject);
        if show_emails {
            for line in message.body.lines() {
                println!("      {}", line);
            }
        }
    }

    print_stats("After review", &platform);
    Ok(())
}

fn step<T, E: Display>(label: &str, result: Result<T, E>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            println!("  {} failed: {}", label, err);
            None
        }
    }
}

fn sign_in(platform: &DemoPlatform, username: &str, password: &str) -> Option<Actor> {
    let session = step(
        "Signing in",
        platform.accounts.login(LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }),
    )?;
    step("Resolving the session", platform.accounts.authenticate(&session.token))
}

fn print_application(view: &ApplicationView) {
    println!(
        "  - #{} {} -> {} by {} ({}) [pet {}]",
        view.application.id.0,
        view.pet.name,
        view.application.status.label(),
        view.applicant.username,
        view.kind.label(),
        view.pet.status.label()
    );
    if !view.application.reviewer_notes.is_empty() {
        println!("    Notes: {}", view.application.reviewer_notes);
    }
}

fn print_stats(heading: &str, platform: &DemoPlatform) {
    let stats: PlatformStats = match platform.stats.summary() {
        Ok(stats) => stats,
        Err(err) => {
            println!("\n{}: stats unavailable ({})", heading, err);
            return;
        }
    };
    println!("\n{}", heading);
    println!(
        "- {} pets | {} available | {} adopted | {} pending applications",
        stats.total_pets, stats.available_pets, stats.adopted_pets, stats.pending_applications
    );
    println!(
        "- {} shelters | {} adopters",
        stats.total_shelters, stats.total_adopters
    );
    for entry in &stats.pets_by_species {
        println!("  - {}: {}", entry.species.label(), entry.count);
    }
    for adoption in &stats.recent_adoptions {
        println!(
            "  - {} went home with {} on {}",
            adoption.pet_name,
            adoption.adopter_first_name,
            adoption.completed_at.format("%Y-%m-%d")
        );
    }
}
