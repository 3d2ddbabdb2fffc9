//! Publishing commands: add, update and delete courses

use super::{ensure_attended, prompt_text, reported_api, settle};
use crate::args::CourseFields;
use crate::console::{CliConsole, Reported};
use academy_core::{Academy, Category, Course, CourseDraft};
use anyhow::Result;
use console::Term;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

pub async fn add(academy: &Academy, console: CliConsole, fields: CourseFields) -> Result<()> {
    if !academy.session.is_authenticated() {
        console.warn("Please login to add a course");
        return Err(Reported.into());
    }
    let draft = prompt_draft(fields, &CourseFields::default())?;
    let created = academy
        .catalog
        .create_course(&draft)
        .await
        .map_err(reported_api)?;
    if let Some(id) = created_id(&created) {
        console.info(&format!("Course id: {}", id));
    }
    Ok(())
}

pub async fn update(
    academy: &Academy,
    console: CliConsole,
    id: &str,
    fields: CourseFields,
) -> Result<()> {
    let course = settle(console, academy.catalog.course(id).await)?;
    let current = current_fields(&course);

    let draft = if is_empty(&fields) {
        prompt_draft(CourseFields::default(), &current)?
    } else {
        prompt_draft(overlay(fields, current.clone()), &current)?
    };
    academy
        .catalog
        .update_course(id, &draft)
        .await
        .map_err(reported_api)
}

pub async fn delete(academy: &Academy, console: CliConsole, id: &str, yes: bool) -> Result<()> {
    if !yes {
        ensure_attended("--yes")?;
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete course {}? This cannot be undone", id))
            .default(false)
            .interact()?;
        if !confirmed {
            console.warn("Cancelled");
            return Ok(());
        }
    }
    academy
        .catalog
        .delete_course(id)
        .await
        .map_err(reported_api)
}

/// Editable fields of an existing course
fn current_fields(course: &Course) -> CourseFields {
    if let Some(draft) = CourseDraft::from_course(course) {
        return CourseFields {
            title: Some(draft.title),
            category: Some(draft.category),
            price: Some(draft.price),
            duration: Some(draft.duration),
            image_url: Some(draft.image_url),
            description: Some(draft.description),
            featured: Some(draft.is_featured),
        };
    }
    // Unknown category: everything else still prefills
    CourseFields {
        title: Some(course.title.clone()),
        category: None,
        price: Some(course.price),
        duration: Some(course.duration.clone()),
        image_url: Some(course.image_url.clone()),
        description: course.description.clone(),
        featured: Some(course.is_featured),
    }
}

fn is_empty(fields: &CourseFields) -> bool {
    fields.title.is_none()
        && fields.category.is_none()
        && fields.price.is_none()
        && fields.duration.is_none()
        && fields.image_url.is_none()
        && fields.description.is_none()
        && fields.featured.is_none()
}

/// Flag values win, gaps come from `base`
fn overlay(fields: CourseFields, base: CourseFields) -> CourseFields {
    CourseFields {
        title: fields.title.or(base.title),
        category: fields.category.or(base.category),
        price: fields.price.or(base.price),
        duration: fields.duration.or(base.duration),
        image_url: fields.image_url.or(base.image_url),
        description: fields.description.or(base.description),
        featured: fields.featured.or(base.featured),
    }
}

/// Build a draft, prompting for whatever `fields` leaves out
fn prompt_draft(fields: CourseFields, initial: &CourseFields) -> Result<CourseDraft> {
    let theme = ColorfulTheme::default();

    let title = match fields.title {
        Some(title) => title,
        None => prompt_text("Course title", initial.title.clone())?,
    };
    let category = match fields.category {
        Some(category) => category,
        None => {
            ensure_attended("Category")?;
            let labels: Vec<&str> = Category::ALL.iter().map(Category::label).collect();
            let default = initial
                .category
                .and_then(|c| Category::ALL.iter().position(|candidate| *candidate == c))
                .unwrap_or(0);
            let index = Select::with_theme(&theme)
                .with_prompt("Category")
                .items(&labels)
                .default(default)
                .interact()?;
            Category::ALL[index]
        }
    };
    let price = match fields.price {
        Some(price) => price,
        None => {
            ensure_attended("Price")?;
            let mut input = Input::<f64>::with_theme(&theme).with_prompt("Price ($)");
            if let Some(price) = initial.price {
                input = input.default(price);
            }
            input.interact_text()?
        }
    };
    let duration = match fields.duration {
        Some(duration) => duration,
        None => prompt_text("Duration (e.g. 8 weeks)", initial.duration.clone())?,
    };
    let image_url = match fields.image_url {
        Some(url) => url,
        None => prompt_text("Image URL", initial.image_url.clone())?,
    };
    let description = match fields.description {
        Some(description) => description,
        None => prompt_text("Description", initial.description.clone())?,
    };
    let is_featured = match fields.featured {
        Some(featured) => featured,
        None if !Term::stderr().features().is_attended() => initial.featured.unwrap_or(false),
        None => Confirm::with_theme(&theme)
            .with_prompt("Feature this course?")
            .default(initial.featured.unwrap_or(false))
            .interact()?,
    };

    Ok(CourseDraft {
        title: title.trim().to_string(),
        category,
        price,
        duration: duration.trim().to_string(),
        image_url: image_url.trim().to_string(),
        description: description.trim().to_string(),
        is_featured,
    })
}

/// The backend answers with either the document or an insert receipt
fn created_id(created: &serde_json::Value) -> Option<&str> {
    created
        .get("insertedId")
        .or_else(|| created.get("_id"))
        .and_then(serde_json::Value::as_str)
}
