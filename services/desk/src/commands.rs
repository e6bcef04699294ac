use crate::cli::{
    ComputeArgs, DashboardArgs, ImportArgs, ParentLoginArgs, ResultSource, SubmitArgs,
    UserLoginArgs,
};
use crate::infra::{connect, signed_in, StdinPrompt};
use crate::render;
use school_desk::api::{DashboardContext, ParentCredentials, UserCredentials};
use school_desk::config::AppConfig;
use school_desk::error::AppError;
use school_desk::ingest::{self, ReportSheet};
use school_desk::scoring::{monthly_standings, Cohort, TestResult, TestScorer};
use school_desk::session::{Role, Section, SessionStore};
use school_desk::submission::{ResultSubmission, SubmissionOutcome};
use tracing::{info, warn};

pub(crate) async fn login_user(config: &AppConfig, args: UserLoginArgs) -> Result<(), AppError> {
    let client = connect(config)?;
    let session = client
        .login_user(&UserCredentials {
            email: args.email,
            password: args.password,
        })
        .await?;
    println!("Signed in as {}", session.role);
    render::sections(session.role);
    Ok(())
}

pub(crate) async fn login_parent(
    config: &AppConfig,
    args: ParentLoginArgs,
) -> Result<(), AppError> {
    let client = connect(config)?;
    let session = client
        .login_parent(&ParentCredentials {
            reg_number: args.reg_number,
            password: args.password,
        })
        .await?;
    println!(
        "Signed in as parent of {}",
        session.reg_number.as_deref().unwrap_or("unknown student")
    );
    render::sections(session.role);
    Ok(())
}

pub(crate) fn logout(config: &AppConfig) -> Result<(), AppError> {
    connect(config)?.logout()?;
    println!("Signed out");
    Ok(())
}

pub(crate) fn whoami(config: &AppConfig) -> Result<(), AppError> {
    let client = connect(config)?;
    match client.sessions().load()? {
        Some(session) => {
            println!("Role: {}", session.role);
            if let Some(reg_number) = &session.reg_number {
                println!("Student: {reg_number}");
            }
            render::sections(session.role);
        }
        None => println!("Not signed in"),
    }
    Ok(())
}

pub(crate) async fn dashboard(config: &AppConfig, args: DashboardArgs) -> Result<(), AppError> {
    let client = connect(config)?;
    let session = client.sessions().require()?;

    if session.role == Role::Parent {
        session.authorize(Section::StudentProfile)?;
        return render::student_profile(&session);
    }

    let context = DashboardContext::load(&client).await?;
    render::dashboard(&context, args.campus.as_deref());
    Ok(())
}

pub(crate) async fn compute_results(config: &AppConfig, args: ComputeArgs) -> Result<(), AppError> {
    let cohorts = score(config, &args.source).await?;

    if args.json {
        println!("{}", cohorts_json(&cohorts)?);
        return Ok(());
    }

    if cohorts.is_empty() {
        println!("No answer sheets found for {}", args.source.test_name);
        return Ok(());
    }

    for cohort in &cohorts {
        render::cohort(cohort, args.top);
    }

    if args.monthly {
        let results: Vec<TestResult> = cohorts
            .iter()
            .flat_map(|cohort| cohort.results.iter().cloned())
            .collect();
        render::monthly(&monthly_standings(&results));
    }

    Ok(())
}

pub(crate) async fn submit_results(config: &AppConfig, args: SubmitArgs) -> Result<(), AppError> {
    let client = connect(config)?;
    signed_in(&client, Section::ResultSubmission)?;

    let cohorts = score(config, &args.source).await?;
    let results: Vec<TestResult> = cohorts
        .into_iter()
        .flat_map(|cohort| cohort.results)
        .collect();

    let prompt = StdinPrompt {
        assume_yes: args.yes,
    };
    match ResultSubmission::new(&client, &prompt).run(&results).await? {
        SubmissionOutcome::Nothing => println!("No results to submit"),
        SubmissionOutcome::Cancelled { existing } => {
            println!("Submission cancelled; {existing} stored results left unchanged")
        }
        SubmissionOutcome::Submitted(receipt) => println!(
            "Submitted {} results ({} created, {} updated)",
            results.len(),
            receipt.created,
            receipt.updated
        ),
    }
    Ok(())
}

pub(crate) async fn import_admissions(config: &AppConfig, args: ImportArgs) -> Result<(), AppError> {
    let client = connect(config)?;
    if !args.dry_run {
        signed_in(&client, Section::Admissions)?;
    }

    let batch = ingest::import_admissions(&args.path, config.ingest.max_upload_bytes)?;
    render::admissions(&batch);

    if args.dry_run || batch.students.is_empty() {
        return Ok(());
    }

    let receipt = client.bulk_create_students(&batch.students).await?;
    info!(
        created = receipt.created,
        skipped = receipt.skipped,
        "admissions uploaded"
    );
    println!(
        "Created {} students, skipped {}",
        receipt.created, receipt.skipped
    );
    for error in &receipt.errors {
        println!("  - {error}");
    }
    Ok(())
}

fn cohorts_json(cohorts: &[Cohort]) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(cohorts)?)
}

/// Load the answer key and sheets from files or the dashboard API, then score every cohort.
async fn score(config: &AppConfig, source: &ResultSource) -> Result<Vec<Cohort>, AppError> {
    let max_bytes = config.ingest.max_upload_bytes;
    let client = connect(config)?;
    if !source.is_local() {
        signed_in(&client, Section::TestReports)?;
    }

    let solutions = match &source.solutions {
        Some(path) => ingest::import_solutions(path, max_bytes)?,
        None => client.solution_bank(&source.test_name).await?,
    };
    if solutions.is_empty() {
        warn!(test = %source.test_name, "answer key is empty, every student scores zero");
    }

    let reports = match &source.reports {
        Some(path) => {
            let ReportSheet { reports, rejected } =
                ingest::import_reports(path, max_bytes, &source.test_name, source.date)?;
            render::row_issues("answer sheet", &rejected);
            reports
        }
        None => {
            client
                .report_bank(&source.test_name, source.from, source.to)
                .await?
        }
    };

    Ok(TestScorer::new(solutions, config.scoring.marking_policy).score(&reports)?)
}
