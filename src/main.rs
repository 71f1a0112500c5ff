use anyhow::Context;
use breed_registry::config::cli::{Command, FilterArgs, LitterEditArgs, LogFormat};
use breed_registry::core::geo::{evaluate, DistanceLimit};
use breed_registry::core::ledger::LitterLedger;
use breed_registry::core::pedigree::{resolve_pedigree, PEDIGREE_DEPTH};
use breed_registry::core::search::{PageCount, SearchSession, SearchState, Searchable};
use breed_registry::domain::model::{
    AmountSlot, Article, Breeder, Dog, GeoPoint, Litter, LitterStatus,
};
use breed_registry::utils::{logger, validation::Validate};
use breed_registry::{
    compose_filters, CliConfig, ContentRepository, GraphQlRepository, InMemoryRepository,
    RegistryError, RegistrySettings, SessionContext,
};
use clap::Parser;
use std::sync::Arc;

/// One-line rendering of a search hit.
trait Listing {
    fn summary(&self) -> String;
}

impl Listing for Dog {
    fn summary(&self) -> String {
        let sex = self.sex.map(|s| s.code()).unwrap_or("?");
        let color = self.color.map(|c| c.label()).unwrap_or("unknown colour");
        match self.date_of_birth {
            Some(born) => format!("{} ({}, {}), born {}", self.display_name(), sex, color, born),
            None => format!("{} ({}, {})", self.display_name(), sex, color),
        }
    }
}

impl Listing for Litter {
    fn summary(&self) -> String {
        let date = self
            .relevant_date()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "no date".to_string());
        let mut line = format!("{} [{}] {}", self.title(), self.status, date);
        if self.status == LitterStatus::Littered {
            line.push_str(&format!(
                ", {} of {} puppies available",
                self.amounts.total_available(),
                self.amounts.total_puppies()
            ));
        }
        line
    }
}

impl Listing for Breeder {
    fn summary(&self) -> String {
        let owner = self
            .member
            .as_ref()
            .and_then(|m| m.full_name())
            .unwrap_or_default();
        let mut line = self.display_name().to_string();
        if !owner.is_empty() {
            line.push_str(&format!(" ({})", owner));
        }
        if self.pending_moderation() {
            line.push_str(" *pending moderation*");
        }
        line
    }
}

impl Listing for Article {
    fn summary(&self) -> String {
        let title = self.title.as_deref().unwrap_or("Untitled");
        match self.published_at {
            Some(at) => format!("{} ({})", title, at.date_naive()),
            None => title.to_string(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    match cli.log_format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }

    tracing::info!("Starting breed-registry CLI");

    let settings = match cli.settings().and_then(|s| s.validate().map(|_| s)) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Configuration validation failed: {}", e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    tracing::debug!(
        endpoint = %settings.endpoint,
        page_size = %settings.default_page_size,
        "Resolved settings"
    );

    let repo: Arc<dyn ContentRepository> = match &cli.fixtures {
        Some(path) => Arc::new(
            InMemoryRepository::from_json_file(path)
                .with_context(|| format!("loading fixtures from {}", path.display()))?,
        ),
        None => Arc::new(GraphQlRepository::from_config(&settings)?),
    };
    let session = settings
        .api_token
        .as_deref()
        .map(SessionContext::with_token)
        .unwrap_or_default();

    match run(&cli.command, repo, &settings, &session).await {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(e) => {
            tracing::error!("Command failed: {}", e);
            eprintln!("{}", e.message().unwrap_or_else(|| e.to_string()));
            std::process::exit(if e.is_transient() { 2 } else { 1 });
        }
    }
}

async fn run(
    command: &Command,
    repo: Arc<dyn ContentRepository>,
    settings: &RegistrySettings,
    session: &SessionContext,
) -> breed_registry::Result<i32> {
    match command {
        Command::Dogs(args) => search::<Dog>(repo, args, settings, session).await,
        Command::Litters(args) => search::<Litter>(repo, args, settings, session).await,
        Command::Breeders(args) => search::<Breeder>(repo, args, settings, session).await,
        Command::Articles(args) => search::<Article>(repo, args, settings, session).await,
        Command::Pedigree { id } => pedigree(repo.as_ref(), id, session).await,
        Command::Distance {
            lat1,
            lng1,
            lat2,
            lng2,
            max_km,
        } => {
            let proximity = evaluate(
                GeoPoint::new(*lat1, *lng1),
                GeoPoint::new(*lat2, *lng2),
                DistanceLimit::from(*max_km),
            );
            match proximity.display_km() {
                Some(km) if proximity.exceeded => println!("{} km (beyond limit)", km),
                Some(km) => println!("{} km", km),
                None => println!("unknown (coordinates out of range)"),
            }
            Ok(0)
        }
        Command::LitterEdit(args) => edit_litter(repo.as_ref(), args, session).await,
    }
}

async fn search<T: Searchable + Listing>(
    repo: Arc<dyn ContentRepository>,
    args: &FilterArgs,
    settings: &RegistrySettings,
    session: &SessionContext,
) -> breed_registry::Result<i32> {
    let request = compose_filters(T::COLLECTION, &args.to_raw(settings.default_page_size));
    let page = request.pagination.page;

    let mut orchestrator: SearchSession<dyn ContentRepository, T> = SearchSession::new(repo)
        .with_origin(settings.origin)
        .with_distance_ranking(settings.rank_by_distance);

    if orchestrator.search(request, session).await == SearchState::Error {
        if let Some(err) = orchestrator.error() {
            eprintln!("{}", err);
            return Ok(if err.transient { 2 } else { 1 });
        }
    }

    for hit in orchestrator.results() {
        match hit.proximity.display_km() {
            Some(km) if hit.proximity.exceeded => {
                println!("{}  [{} km, out of range]", hit.entity.summary(), km)
            }
            Some(km) => println!("{}  [{} km]", hit.entity.summary(), km),
            None => println!("{}", hit.entity.summary()),
        }
    }

    match (orchestrator.page_count(), orchestrator.total()) {
        (Some(PageCount::Exact(pages)), Some(total)) => {
            println!("Page {} of {} ({} {} total)", page, pages, total, T::COLLECTION)
        }
        (Some(count), _) => println!("Page {} of at least {}", page, count.value()),
        _ => {}
    }
    Ok(0)
}

async fn pedigree(
    repo: &dyn ContentRepository,
    id: &str,
    session: &SessionContext,
) -> breed_registry::Result<i32> {
    let dog = repo
        .find_dog(id, session)
        .await?
        .ok_or_else(|| RegistryError::NotFound {
            entity: "dog",
            id: id.to_string(),
        })?;
    let tree = resolve_pedigree(&dog);

    for generation in 0..=PEDIGREE_DEPTH {
        for entry in tree.generation(generation) {
            let indent = "  ".repeat(generation);
            match entry.slot.node() {
                Some(node) => {
                    let born = node
                        .date_of_birth
                        .map(|d| format!(" *{}", d))
                        .unwrap_or_default();
                    let died = node
                        .date_of_death
                        .map(|d| format!(" +{}", d))
                        .unwrap_or_default();
                    println!("{}{}: {}{}{}", indent, entry.relation, node.display_name, born, died);
                }
                None => println!("{}{}: {}", indent, entry.relation, entry.slot.label()),
            }
        }
    }
    Ok(0)
}

async fn edit_litter(
    repo: &dyn ContentRepository,
    args: &LitterEditArgs,
    session: &SessionContext,
) -> breed_registry::Result<i32> {
    let litter = repo
        .find_litter(&args.id, session)
        .await?
        .ok_or_else(|| RegistryError::NotFound {
            entity: "litter",
            id: args.id.clone(),
        })?;
    let mut ledger = LitterLedger::new(litter);

    if let Some(raw) = &args.status {
        let status = LitterStatus::parse(raw).ok_or_else(|| RegistryError::ValidationError {
            message: format!("unknown litter status '{}'", raw),
        })?;
        ledger.set_status(status)?;
    }
    if let Some(message) = &args.message {
        ledger.set_status_message(Some(message.clone()))?;
    }
    if args.total.is_some() || args.available.is_some() {
        let raw = args.slot.as_deref().unwrap_or_default();
        let slot = AmountSlot::parse(raw).ok_or_else(|| RegistryError::ValidationError {
            message: format!("--slot must be one of rs, rsm, rb, hs, hsm, hb (got '{}')", raw),
        })?;
        if let Some(total) = args.total {
            ledger.set_total(slot, total)?;
        }
        if let Some(available) = args.available {
            ledger.set_available(slot, available)?;
        }
    }

    for warning in ledger.validate().warnings {
        println!("warning: {}", warning);
    }

    let saved = ledger.save(repo, session).await?;
    println!("{} saved", saved.title());
    for (slot, amount) in saved.amounts.iter() {
        println!("  {:<20} {} / {}", slot.to_string(), amount.available, amount.total);
    }
    Ok(0)
}
