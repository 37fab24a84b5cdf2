//! Fake school data for development databases.
//!
//! Generation runs in parallel with `rayon`; inserts go one by one through the
//! store after the same validation an API write would get.

mod members;
mod models;
mod school;

use std::time::Instant;

use chrono::Utc;
use classbook_core::AppError;
use classbook_db::SchoolStore;
use classbook_models::Grade;
use fake::Fake;

pub use members::{
    generate_students, generate_teachers, insert_student, insert_teacher, seed_students,
    seed_teachers,
};
pub use models::{SeedConfig, SeedSummary};
pub use school::{
    generate_classrooms, generate_grades, insert_classroom, insert_grade, seed_classrooms,
    seed_grades,
};

/// Up to `max` distinct items of `items`, sorted. Empty when `items` is.
pub(crate) fn random_subset<T: Copy + Ord>(items: &[T], max: usize) -> Vec<T> {
    if items.is_empty() || max == 0 {
        return Vec::new();
    }
    let count = (1..=max.min(items.len())).fake::<usize>();
    let mut picked: Vec<T> = (0..count)
        .map(|_| items[(0..items.len()).fake::<usize>()])
        .collect();
    picked.sort();
    picked.dedup();
    picked
}

/// Short tag distinguishing this run's identifiers and id documents from
/// earlier runs against the same database.
fn run_tag() -> String {
    format!("{:x}", Utc::now().timestamp())
}

pub async fn seed_all(
    store: &dyn SchoolStore,
    config: SeedConfig,
) -> Result<SeedSummary, AppError> {
    let start_time = Instant::now();
    let tag = run_tag();
    println!("🌱 Starting database seeding (run {})...\n", tag);

    let grades = seed_grades(store, config.grades).await?;
    let grade_ids: Vec<_> = grades.iter().map(|grade: &Grade| grade.id).collect();
    let classrooms = seed_classrooms(store, config.classrooms, &tag, &grade_ids).await?;
    let teachers = seed_teachers(store, config.teachers, &tag, &classrooms).await?;
    let students = seed_students(store, config.students, &tag, &grade_ids, &classrooms).await?;

    let summary = SeedSummary {
        grades: grades.len(),
        classrooms: classrooms.len(),
        students: students.len(),
        teachers: teachers.len(),
    };

    println!("\n✅ Seeding completed in {:?}", start_time.elapsed());
    println!("   Grades: {}", summary.grades);
    println!("   Classrooms: {}", summary.classrooms);
    println!("   Teachers: {}", summary.teachers);
    println!("   Students: {}", summary.students);

    Ok(summary)
}

/// Removes every Grade, Classroom, Student and Teacher. API users survive.
pub async fn clear_all(store: &dyn SchoolStore) -> Result<(), AppError> {
    let start_time = Instant::now();
    println!("🗑️  Clearing school data...");
    store.clear_school_data().await?;
    println!("   ✓ Cleared school data in {:?}", start_time.elapsed());
    Ok(())
}
