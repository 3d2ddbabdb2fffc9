//! Catalog browsing and enrollment

use super::{reported_api, settle};
use crate::console::CliConsole;
use academy_core::{Academy, Category, Course, CourseFilter};
use anyhow::Result;
use colored::*;

pub async fn list(
    academy: &Academy,
    console: CliConsole,
    category: Option<Category>,
    search: Option<String>,
) -> Result<()> {
    let mut filter = CourseFilter::default();
    if let Some(category) = category {
        filter = filter.with_category(category);
    }
    if let Some(search) = search {
        filter = filter.with_search(search);
    }

    let courses = settle(console, academy.catalog.list_courses(&filter).await)?;
    let title = match filter.category {
        Some(category) => format!("{} courses", category.label()),
        None => "All courses".to_string(),
    };
    console.print_header(&title);
    if courses.is_empty() {
        console.warn("No courses found");
        return Ok(());
    }
    for course in &courses {
        print_row(course);
    }
    Ok(())
}

pub async fn show(academy: &Academy, console: CliConsole, id: &str) -> Result<()> {
    let course = settle(console, academy.catalog.course(id).await)?;

    console.print_header(&course.title);
    let category = course
        .category()
        .map(|c| c.label().to_string())
        .unwrap_or_else(|| course.category.clone());
    console.field("id", &course.id);
    console.field("category", &category);
    console.field("price", &format!("${:.2}", course.price));
    console.field("duration", &course.duration);
    if let Some(name) = course.instructor.as_ref().and_then(|i| i.name.as_deref()) {
        console.field("instructor", name);
    }
    println!();
    println!("{}", course.summary());

    if academy.session.is_authenticated() {
        let status = academy.catalog.enrollment_status(id).await;
        match status.into_result() {
            Ok(Some(status)) if status.enrolled => console.success("You are enrolled"),
            Ok(_) => console.info(&format!("Run `academy enroll {}` to join", id)),
            Err(error) => return Err(reported_api(error)),
        }
    }
    Ok(())
}

pub async fn enroll(academy: &Academy, console: CliConsole, id: &str) -> Result<()> {
    let status = academy.catalog.enrollment_status(id).await;
    if let Ok(Some(status)) = status.into_result() {
        if status.enrolled {
            console.warn("You are already enrolled in this course");
            return Ok(());
        }
    }
    academy.catalog.enroll(id).await.map_err(reported_api)
}

pub async fn my_enrollments(academy: &Academy, console: CliConsole) -> Result<()> {
    let enrollments = settle(console, academy.catalog.my_enrollments().await)?;
    console.print_header("My enrollments");
    if enrollments.is_empty() {
        console.warn("You have not enrolled in any course yet");
    }
    for enrollment in &enrollments {
        print_row(&enrollment.course);
        if let Some(at) = &enrollment.enrolled_at {
            println!("    {}", format!("enrolled {at}").dimmed());
        }
    }
    Ok(())
}

pub async fn my_courses(academy: &Academy, console: CliConsole) -> Result<()> {
    let courses = settle(console, academy.catalog.my_courses().await)?;
    console.print_header("My courses");
    if courses.is_empty() {
        console.warn("You have not published any course yet");
    }
    for course in &courses {
        print_row(course);
    }
    Ok(())
}

fn print_row(course: &Course) {
    let featured = if course.is_featured { "★ " } else { "" };
    println!(
        "{}{} {} {}",
        featured.yellow(),
        course.title.bold(),
        format!("${:.2}", course.price).green(),
        format!("[{}]", course.id).dimmed()
    );
}
