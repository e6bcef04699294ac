use school_desk::api::DashboardContext;
use school_desk::error::AppError;
use school_desk::ingest::{AdmissionBatch, RowIssue};
use school_desk::scoring::{Cohort, MonthlyStanding};
use school_desk::session::{Role, Session};

pub(crate) fn sections(role: Role) {
    let labels: Vec<&str> = role.sections().iter().map(|section| section.label()).collect();
    println!("Sections: {}", labels.join(", "));
}

pub(crate) fn student_profile(session: &Session) -> Result<(), AppError> {
    println!(
        "Student {}",
        session.reg_number.as_deref().unwrap_or("(not on record)")
    );
    match &session.student_data {
        Some(data) => println!("{}", serde_json::to_string_pretty(data)?),
        None => println!("  No student details on record"),
    }
    Ok(())
}

pub(crate) fn dashboard(context: &DashboardContext, campus: Option<&str>) {
    println!(
        "{} campuses | {} subjects | {} students",
        context.campuses.len(),
        context.subjects.len(),
        context.students.len()
    );
    for entry in &context.campuses {
        println!(
            "  - {}: {} students",
            entry.name,
            context.students_on_campus(&entry.name).count()
        );
    }

    if let Some(campus) = campus {
        println!("\nStudents on {campus}");
        for student in context.students_on_campus(campus) {
            println!(
                "  {:<14} {}",
                student.reg_number,
                student.student_name.as_deref().unwrap_or("-")
            );
        }
    }
}

pub(crate) fn cohort(cohort: &Cohort, top: usize) {
    println!(
        "\n{} on {} (+{} correct / {} wrong)",
        cohort.test_name, cohort.date, cohort.scheme.correct, cohort.scheme.wrong
    );
    println!(
        "{:>4}  {:<14} {:>6} {:>4} {:>4} {:>4} {:>8} {:>10}",
        "Rank", "Reg No", "Marks", "C", "W", "U", "Acc %", "Percentile"
    );
    for result in cohort.standings() {
        println!(
            "{:>4}  {:<14} {:>6} {:>4} {:>4} {:>4} {:>8.2} {:>10.2}",
            result.rank,
            result.reg_number,
            result.total_marks,
            result.correct,
            result.wrong,
            result.unattempted,
            result.accuracy,
            result.percentile
        );
    }

    let summary = cohort.summary(top);
    println!(
        "Highest {} | lowest {} | mean {:.2} | median {:.2} | mean score {:.1}%",
        summary.highest_total,
        summary.lowest_total,
        summary.mean_total,
        summary.median_total,
        summary.mean_percentage
    );
    if !summary.subject_means.is_empty() {
        let means: Vec<String> = summary
            .subject_means
            .iter()
            .map(|(subject, mean)| format!("{subject} {mean:.2}"))
            .collect();
        println!("Subject means: {}", means.join(" | "));
    }
    if !summary.toppers.is_empty() {
        println!("Toppers: {}", summary.toppers.join(", "));
    }
}

pub(crate) fn monthly(standings: &[MonthlyStanding]) {
    println!("\nMonthly standings");
    for standing in standings {
        println!(
            "  {}-{:02} {:<14} tests {} | marks {} | avg {:.1}% | avg percentile {:.1} | best rank {}",
            standing.year,
            standing.month,
            standing.reg_number,
            standing.tests_taken,
            standing.total_marks,
            standing.average_percentage,
            standing.average_percentile,
            standing.best_rank
        );
    }
}

pub(crate) fn admissions(batch: &AdmissionBatch) {
    println!("{} students ready to create", batch.students.len());
    row_issues("admissions sheet", &batch.rejected);
}

pub(crate) fn row_issues(source: &str, issues: &[RowIssue]) {
    if issues.is_empty() {
        return;
    }
    println!("{} rows skipped in {source}:", issues.len());
    for issue in issues {
        println!("  row {} ({}): {}", issue.line, issue.field, issue.message);
    }
}
