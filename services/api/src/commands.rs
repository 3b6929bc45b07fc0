use crate::cli::{AddArgs, EditArgs, ExportArgs, FilterArgs, LoginArgs, SignupArgs};
use crate::infra::Context;
use crate::render;
use chrono::Local;
use jobtrack::config::{AppConfig, TelemetryConfig};
use jobtrack::error::AppError;
use jobtrack::jobs::{
    filter_jobs, summarize, write_csv, FilterQuery, FilterSpec, JobDraft, JobId, JobRecord,
    RepositoryError, SnapshotOrigin, StoreError,
};
use jobtrack::remote::SignUpRequest;
use jobtrack::telemetry;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::sync::Arc;
use tracing::{info, warn};

/// Loads configuration and installs a quiet subscriber; `RUST_LOG` still takes precedence.
pub(crate) fn context(offline: bool) -> Result<Context, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&TelemetryConfig {
        log_level: "warn".to_string(),
    })?;
    Ok(Context::new(config, offline))
}

pub(crate) async fn signup(ctx: &Context, args: SignupArgs) -> Result<(), AppError> {
    let request = SignUpRequest {
        username: args.username,
        email: args.email,
        password: args.password,
        confirm_password: args.confirm_password,
    };
    ctx.anonymous_client()?.sign_up(&request).await?;
    println!("Account created. Run `jobtrack login` to sign in.");
    Ok(())
}

pub(crate) async fn login(ctx: &Context, args: LoginArgs) -> Result<(), AppError> {
    let token = ctx
        .anonymous_client()?
        .sign_in(&args.email, &args.password)
        .await?;
    let session = ctx.session();
    session.save(&token)?;
    info!(path = %session.path().display(), "session saved");
    println!("Signed in as {}.", args.email);
    Ok(())
}

pub(crate) fn logout(ctx: &Context) -> Result<(), AppError> {
    ctx.session().clear()?;
    println!("Signed out.");
    Ok(())
}

pub(crate) async fn list(ctx: &Context, args: FilterArgs) -> Result<(), AppError> {
    let spec = filter_spec(args)?;
    let jobs = load_snapshot(ctx).await?;
    let view = filter_jobs(&jobs, &spec);
    println!("{}", render::job_list(&view, jobs.len()));
    Ok(())
}

pub(crate) async fn show(ctx: &Context, id: String) -> Result<(), AppError> {
    let id = JobId(id);
    let job = if ctx.offline {
        load_snapshot(ctx)
            .await?
            .iter()
            .find(|job| job.id == id)
            .cloned()
    } else {
        ctx.store()?.get(&id).await?
    };

    match job {
        Some(job) => {
            println!("{}", render::job_detail(&job));
            Ok(())
        }
        None => Err(not_found()),
    }
}

pub(crate) async fn add(ctx: &Context, args: AddArgs) -> Result<(), AppError> {
    let store = ctx.store()?;
    let mut draft = JobDraft::new(
        args.title,
        args.company,
        args.date.unwrap_or_else(|| Local::now().date_naive()),
    );
    draft.status = args.status;
    draft.job_link = args.link.filter(|link| !link.trim().is_empty());
    draft.notes = args.notes.unwrap_or_default();

    store.add(draft).await?;
    println!("Job application added successfully!");
    Ok(())
}

pub(crate) async fn edit(ctx: &Context, args: EditArgs) -> Result<(), AppError> {
    let store = ctx.store()?;
    let id = JobId(args.id);
    let mut job = store.get(&id).await?.ok_or_else(not_found)?;

    if let Some(title) = args.title {
        job.job_title = title;
    }
    if let Some(company) = args.company {
        job.company = company;
    }
    if let Some(date) = args.date {
        job.application_date = Some(date.format("%Y-%m-%d").to_string());
    }
    if let Some(status) = args.status {
        job.status = status;
    }
    if let Some(link) = args.link {
        job.job_link = Some(link).filter(|link| !link.trim().is_empty());
    }
    if let Some(notes) = args.notes {
        job.notes = notes;
    }

    store.update(job).await?;
    println!("Job application updated successfully!");
    Ok(())
}

pub(crate) async fn delete(ctx: &Context, id: String) -> Result<(), AppError> {
    ctx.store()?.delete(&JobId(id)).await?;
    println!("Job application deleted successfully!");
    Ok(())
}

pub(crate) async fn stats(ctx: &Context) -> Result<(), AppError> {
    let jobs = load_snapshot(ctx).await?;
    println!("{}", render::statistics(&summarize(&jobs)));
    Ok(())
}

pub(crate) async fn export(ctx: &Context, args: ExportArgs) -> Result<(), AppError> {
    let spec = filter_spec(args.filter)?;
    let jobs = load_snapshot(ctx).await?;
    let view = filter_jobs(&jobs, &spec);

    match args.output {
        Some(path) => {
            let file = File::create(&path)?;
            write_csv(BufWriter::new(file), &view)?;
            println!("Exported {} applications to {}", view.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_csv(&mut handle, &view)?;
            handle.flush()?;
        }
    }
    Ok(())
}

fn filter_spec(args: FilterArgs) -> Result<FilterSpec, AppError> {
    FilterQuery::from(args).into_spec().map_err(AppError::Usage)
}

/// Current collection: the remote list, or the mirror when offline or when the remote is down
/// and a mirror exists.
async fn load_snapshot(ctx: &Context) -> Result<Arc<Vec<JobRecord>>, AppError> {
    if ctx.offline {
        let mirror = ctx.mirror();
        return mirror.load()?.map(Arc::new).ok_or_else(|| {
            AppError::Usage(format!(
                "no mirrored snapshot at {}; run a command online first",
                mirror.path().display()
            ))
        });
    }

    let store = ctx.store()?;
    match store.refresh().await {
        Ok(jobs) => Ok(jobs),
        Err(err) if store.origin() == SnapshotOrigin::Mirror => {
            warn!(%err, "remote unavailable, showing mirrored snapshot");
            eprintln!("warning: {err}; showing the last mirrored snapshot");
            Ok(store.snapshot())
        }
        Err(err) => Err(err.into()),
    }
}

fn not_found() -> AppError {
    AppError::Store(StoreError::Repository(RepositoryError::NotFound))
}
