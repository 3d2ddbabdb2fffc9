//! CLI argument definitions using clap

use academy_core::Category;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "academy")]
#[command(about = "Taieba Academy - browse, enroll in and publish courses")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: Option<String>,
        /// Prompted when omitted
        #[arg(long, env = "ACADEMY_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account
    Register {
        #[arg(long)]
        name: Option<String>,
        /// Profile photo URL
        #[arg(long)]
        photo_url: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, env = "ACADEMY_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign out
    Logout,

    /// Email a password reset link
    ResetPassword {
        #[arg(long)]
        email: Option<String>,
    },

    /// Show who is signed in
    Whoami,

    /// Browse the catalog
    Courses {
        #[command(subcommand)]
        action: CoursesAction,
    },

    /// Enroll in a course
    Enroll {
        /// Course id
        id: String,
    },

    /// Your enrollments and published courses
    My {
        #[command(subcommand)]
        action: MyAction,
    },

    /// Publish and maintain your courses
    Course {
        #[command(subcommand)]
        action: CourseAction,
    },
}

#[derive(Subcommand)]
pub enum CoursesAction {
    /// List courses
    List {
        #[arg(long, value_parser = parse_category)]
        category: Option<Category>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one course
    Show { id: String },
}

#[derive(Subcommand)]
pub enum MyAction {
    /// Courses you are enrolled in
    Enrollments,
    /// Courses you published
    Courses,
}

#[derive(Subcommand)]
pub enum CourseAction {
    /// Publish a new course; missing fields are prompted
    Add(CourseFields),
    /// Edit a course; omitted fields keep their current value
    Update {
        id: String,
        #[command(flatten)]
        fields: CourseFields,
    },
    /// Delete a course
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Args, Clone, Default)]
pub struct CourseFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long, value_parser = parse_category)]
    pub category: Option<Category>,
    #[arg(long)]
    pub price: Option<f64>,
    /// e.g. "8h" or "5 weeks"
    #[arg(long)]
    pub duration: Option<String>,
    #[arg(long)]
    pub image_url: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub featured: Option<bool>,
}

fn parse_category(value: &str) -> Result<Category, String> {
    value.parse()
}
