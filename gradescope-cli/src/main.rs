use anyhow::{Context, Result, bail};
use app_utils::{init_from_env, init_tracing};
use chrono::TimeDelta;
use clap::{Parser, Subcommand};
use gradescope_api::assignment::AssignmentClient;
use gradescope_api::assignment_selector::AssignmentSelector;
use gradescope_api::client::{Auth, Client};
use gradescope_api::course::{Course, CourseId};
use tracing::debug;

/// Course administration on Gradescope from the command line. Credentials come from `GS_EMAIL` and
/// `GS_PASSWORD`, or a `.env` file.
#[derive(Debug, Parser)]
#[command(name = "gradescope", version, about)]
struct Cli {
    /// Course id, or its URL.
    #[arg(short, long)]
    course: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the course's assignments with their due dates.
    Assignments,

    /// List the students on the roster.
    Roster,

    /// Look a student up by sid or email.
    Student {
        #[arg(long, required_unless_present = "email")]
        sid: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },

    /// Push one student's due date back, relative to the assignment's current due date.
    Extend {
        /// Assignment id, title, or URL.
        #[arg(short, long)]
        assignment: String,

        #[arg(long)]
        email: String,

        #[arg(long, default_value_t = 0)]
        days: i64,

        #[arg(long, default_value_t = 0)]
        hours: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let gradescope = init_from_env().await?;
    debug!("initialized");

    let course = course(&gradescope, &cli.course)?;
    let result = run(&course, cli.command).await;

    gradescope.shutdown();
    result
}

fn course(gradescope: &Client<Auth>, course: &str) -> Result<Course> {
    if course.starts_with("http") {
        return gradescope
            .course_from_url(course)
            .with_context(|| format!("could not read a course id from `{course}`"));
    }
    Ok(gradescope.course(CourseId::from(course)))
}

async fn run(course: &Course, command: Command) -> Result<()> {
    match command {
        Command::Assignments => {
            let assignments = course
                .get_assignments()
                .await
                .context("could not get assignments from Gradescope")?;
            for assignment in &assignments {
                let due_date = assignment
                    .due_date()
                    .map(|due_date| due_date.to_rfc3339())
                    .unwrap_or_else(|| "-".to_owned());
                println!("{}\t{}\t{due_date}", assignment.id(), assignment.title());
            }
        }
        Command::Roster => {
            let roster = course
                .get_roster()
                .await
                .context("could not get roster from Gradescope")?;
            for student in roster {
                println!(
                    "{}\t{}\t{}\t{}",
                    student.user_id(),
                    student.sid().unwrap_or("-"),
                    student.email(),
                    student.full_name().unwrap_or("-"),
                );
            }
        }
        Command::Student { sid, email } => {
            let student = course
                .get_student(sid.as_deref(), email.as_deref())
                .await
                .context("could not get roster from Gradescope")?;
            match student {
                Some(student) => println!("{student:#?}"),
                None => bail!("no student on the roster matches"),
            }
        }
        Command::Extend {
            assignment,
            email,
            days,
            hours,
        } => {
            let offset = TimeDelta::days(days) + TimeDelta::hours(hours);
            if offset == TimeDelta::zero() {
                bail!("an extension needs --days or --hours");
            }

            let assignments;
            let assignment = if assignment.starts_with("http") {
                course.get_assignment(None, Some(&assignment))?
            } else {
                assignments = course
                    .get_assignments()
                    .await
                    .context("could not get assignments from Gradescope")?;
                let selected = AssignmentSelector::new(assignment.clone())
                    .select_from(&assignments)
                    .with_context(|| format!("could not find assignment `{assignment}`"))?;
                course.with_assignment(selected)
            };

            extend(&assignment, &email, offset).await?;
            println!("extended {email} on assignment {} by {offset}", assignment.id());
        }
    }

    Ok(())
}

async fn extend(assignment: &AssignmentClient<'_>, email: &str, offset: TimeDelta) -> Result<()> {
    assignment
        .apply_extension(email, offset)
        .await
        .with_context(|| format!("could not extend {email} on assignment {}", assignment.id()))
}
