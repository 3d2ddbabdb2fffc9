//! Command routing logic for CLI

use crate::args::{Cli, Commands, CourseAction, CoursesAction, MyAction};
use crate::commands::{auth, courses, manage};
use crate::console::CliConsole;
use crate::context;
use anyhow::Result;

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli) -> Result<()> {
    let console = CliConsole::new(cli.verbose);
    let academy = context::connect(console).await?;

    let outcome = match cli.command {
        // Account commands
        Commands::Login { email, password } => {
            auth::login(&academy, console, email, password).await
        }
        Commands::Register {
            name,
            photo_url,
            email,
            password,
        } => auth::register(&academy, console, name, photo_url, email, password).await,
        Commands::Logout => auth::logout(&academy).await,
        Commands::ResetPassword { email } => auth::reset_password(&academy, console, email).await,
        Commands::Whoami => auth::whoami(&academy, console),

        // Catalog commands
        Commands::Courses { action } => match action {
            CoursesAction::List { category, search } => {
                courses::list(&academy, console, category, search).await
            }
            CoursesAction::Show { id } => courses::show(&academy, console, &id).await,
        },
        Commands::Enroll { id } => courses::enroll(&academy, console, &id).await,
        Commands::My { action } => match action {
            MyAction::Enrollments => courses::my_enrollments(&academy, console).await,
            MyAction::Courses => courses::my_courses(&academy, console).await,
        },

        // Publishing commands
        Commands::Course { action } => match action {
            CourseAction::Add(fields) => manage::add(&academy, console, fields).await,
            CourseAction::Update { id, fields } => {
                manage::update(&academy, console, &id, fields).await
            }
            CourseAction::Delete { id, yes } => manage::delete(&academy, console, &id, yes).await,
        },
    };

    academy.teardown();
    outcome
}
